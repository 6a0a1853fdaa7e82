//! Members repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::member::{CreateMember, Member, MemberQuery, UpdateMember},
};

#[derive(Clone)]
pub struct MembersRepository {
    pool: Pool<Postgres>,
}

impl MembersRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        sqlx::query_as::<_, Member>("SELECT * FROM members WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Member with id {} not found", id)))
    }

    /// Check if an email is already registered
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM members WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Create a new member with a generated card identifier
    pub async fn create(&self, member: &CreateMember, member_id: &str) -> AppResult<Member> {
        let created = sqlx::query_as::<_, Member>(
            r#"
            INSERT INTO members (full_name, email, phone, member_id)
            VALUES ($1, $2, $3, $4)
            RETURNING *
            "#,
        )
        .bind(&member.full_name)
        .bind(&member.email)
        .bind(&member.phone)
        .bind(member_id)
        .fetch_one(&self.pool)
        .await?;

        Ok(created)
    }

    /// Search members with pagination
    pub async fn search(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        let page = query.page.unwrap_or(1).max(1);
        let per_page = query.per_page.unwrap_or(20).clamp(1, 100);
        let offset = (page - 1) * per_page;

        let pattern = query
            .q
            .as_ref()
            .map(|q| format!("%{}%", q.to_lowercase()))
            .unwrap_or_else(|| "%".to_string());

        let total: i64 = sqlx::query_scalar(
            r#"
            SELECT COUNT(*) FROM members
            WHERE LOWER(full_name) LIKE $1 OR LOWER(email) LIKE $1 OR LOWER(member_id) LIKE $1
            "#,
        )
        .bind(&pattern)
        .fetch_one(&self.pool)
        .await?;

        let members = sqlx::query_as::<_, Member>(&format!(
            r#"
            SELECT * FROM members
            WHERE LOWER(full_name) LIKE $1 OR LOWER(email) LIKE $1 OR LOWER(member_id) LIKE $1
            ORDER BY full_name, id
            LIMIT {} OFFSET {}
            "#,
            per_page, offset
        ))
        .bind(&pattern)
        .fetch_all(&self.pool)
        .await?;

        Ok((members, total))
    }

    /// Update an existing member
    pub async fn update(&self, id: i32, member: &UpdateMember) -> AppResult<Member> {
        // Build dynamic update query
        let mut sets = Vec::new();
        let mut param_idx = 1;

        macro_rules! add_field {
            ($field:expr, $name:expr) => {
                if $field.is_some() {
                    sets.push(format!("{} = ${}", $name, param_idx));
                    param_idx += 1;
                }
            };
        }

        add_field!(member.full_name, "full_name");
        add_field!(member.email, "email");
        add_field!(member.phone, "phone");
        add_field!(member.is_active, "is_active");
        add_field!(member.max_loans, "max_loans");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!("UPDATE members SET {} WHERE id = {}", sets.join(", "), id);

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(ref val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(member.full_name);
        bind_field!(member.email);
        bind_field!(member.phone);
        bind_field!(member.is_active);
        bind_field!(member.max_loans);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Delete a member. Loan history blocks the delete.
    pub async fn delete(&self, id: i32, loan_count: i64) -> AppResult<()> {
        if loan_count > 0 {
            return Err(AppError::HasDependentRecords(format!(
                "Member {} has {} loan records",
                id, loan_count
            )));
        }

        let result = sqlx::query("DELETE FROM members WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Member with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
