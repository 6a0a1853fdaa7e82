//! Member (patron) management service

use crate::{
    error::{AppError, AppResult},
    models::member::{generate_member_id, CreateMember, Member, MemberQuery, UpdateMember},
    repository::Repository,
};

#[derive(Clone)]
pub struct MembersService {
    repository: Repository,
}

impl MembersService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Get member by ID
    pub async fn get_by_id(&self, id: i32) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await
    }

    /// Search members
    pub async fn search(&self, query: &MemberQuery) -> AppResult<(Vec<Member>, i64)> {
        self.repository.members.search(query).await
    }

    /// Register a new member
    pub async fn create(&self, member: CreateMember) -> AppResult<Member> {
        if self.repository.members.email_exists(&member.email, None).await? {
            return Err(AppError::Duplicate(format!(
                "A member with email {} already exists",
                member.email
            )));
        }

        let member_id = generate_member_id();
        self.repository.members.create(&member, &member_id).await
    }

    /// Update an existing member
    pub async fn update(&self, id: i32, member: UpdateMember) -> AppResult<Member> {
        self.repository.members.get_by_id(id).await?;

        if let Some(ref email) = member.email {
            if self.repository.members.email_exists(email, Some(id)).await? {
                return Err(AppError::Duplicate(format!(
                    "A member with email {} already exists",
                    email
                )));
            }
        }

        self.repository.members.update(id, &member).await
    }

    /// Delete a member (blocked by loan history)
    pub async fn delete(&self, id: i32) -> AppResult<()> {
        self.repository.members.get_by_id(id).await?;

        let loan_count = self.repository.loans.count_for_member(id).await?;
        self.repository.members.delete(id, loan_count).await
    }
}
