//! Staff accounts repository for database operations

use sqlx::{Pool, Postgres};

use crate::{
    error::{AppError, AppResult},
    models::staff::StaffAccount,
};

#[derive(Clone)]
pub struct StaffRepository {
    pool: Pool<Postgres>,
}

impl StaffRepository {
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Get staff account by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<StaffAccount> {
        sqlx::query_as::<_, StaffAccount>("SELECT * FROM staff_accounts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Staff account with id {} not found", id)))
    }

    /// Get staff account by username (login lookup)
    pub async fn get_by_username(&self, username: &str) -> AppResult<Option<StaffAccount>> {
        let account = sqlx::query_as::<_, StaffAccount>(
            "SELECT * FROM staff_accounts WHERE LOWER(username) = LOWER($1)",
        )
        .bind(username)
        .fetch_optional(&self.pool)
        .await?;

        Ok(account)
    }

    /// Check if a username is already taken
    pub async fn username_exists(&self, username: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(username) = LOWER($1) AND id != $2)",
            )
            .bind(username)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(username) = LOWER($1))",
            )
            .bind(username)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// Check if an email is already taken
    pub async fn email_exists(&self, email: &str, exclude_id: Option<i32>) -> AppResult<bool> {
        let exists: bool = if let Some(id) = exclude_id {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(email) = LOWER($1) AND id != $2)",
            )
            .bind(email)
            .bind(id)
            .fetch_one(&self.pool)
            .await?
        } else {
            sqlx::query_scalar(
                "SELECT EXISTS(SELECT 1 FROM staff_accounts WHERE LOWER(email) = LOWER($1))",
            )
            .bind(email)
            .fetch_one(&self.pool)
            .await?
        };
        Ok(exists)
    }

    /// List all staff accounts
    pub async fn list(&self) -> AppResult<Vec<StaffAccount>> {
        let accounts = sqlx::query_as::<_, StaffAccount>(
            "SELECT * FROM staff_accounts ORDER BY username",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(accounts)
    }

    /// Create a new staff account with an already-hashed password
    pub async fn create(
        &self,
        username: &str,
        email: &str,
        password_hash: &str,
        is_superuser: bool,
    ) -> AppResult<StaffAccount> {
        let account = sqlx::query_as::<_, StaffAccount>(
            r#"
            INSERT INTO staff_accounts (username, email, password, is_staff, is_superuser)
            VALUES ($1, $2, $3, TRUE, $4)
            RETURNING *
            "#,
        )
        .bind(username)
        .bind(email)
        .bind(password_hash)
        .bind(is_superuser)
        .fetch_one(&self.pool)
        .await?;

        Ok(account)
    }

    /// Apply an account update; None fields are left untouched
    pub async fn update(
        &self,
        id: i32,
        username: Option<&str>,
        email: Option<&str>,
        password_hash: Option<&str>,
        is_active: Option<bool>,
        is_staff: Option<bool>,
    ) -> AppResult<StaffAccount> {
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

        add_field!(username, "username");
        add_field!(email, "email");
        add_field!(password_hash, "password");
        add_field!(is_active, "is_active");
        add_field!(is_staff, "is_staff");

        if sets.is_empty() {
            return self.get_by_id(id).await;
        }

        let query = format!(
            "UPDATE staff_accounts SET {} WHERE id = {}",
            sets.join(", "),
            id
        );

        let mut builder = sqlx::query(&query);

        macro_rules! bind_field {
            ($field:expr) => {
                if let Some(val) = $field {
                    builder = builder.bind(val);
                }
            };
        }

        bind_field!(username);
        bind_field!(email);
        bind_field!(password_hash);
        bind_field!(is_active);
        bind_field!(is_staff);

        builder.execute(&self.pool).await?;

        self.get_by_id(id).await
    }

    /// Count member records linked to this account
    pub async fn count_linked_members(&self, id: i32) -> AppResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM members WHERE account_id = $1")
                .bind(id)
                .fetch_one(&self.pool)
                .await?;
        Ok(count)
    }

    /// Delete a staff account
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        let result = sqlx::query("DELETE FROM staff_accounts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(AppError::NotFound(format!(
                "Staff account with id {} not found",
                id
            )));
        }

        Ok(())
    }
}
