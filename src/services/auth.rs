//! Staff authentication and account lifecycle service

use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};

use crate::{
    error::{AppError, AppResult},
    models::staff::{AdminUpdateStaffAccount, CreateStaffAccount, StaffAccount, UpdateStaffProfile},
    repository::Repository,
};

#[derive(Clone)]
pub struct AuthService {
    repository: Repository,
}

impl AuthService {
    pub fn new(repository: Repository) -> Self {
        Self { repository }
    }

    /// Authenticate a staff member.
    ///
    /// Identity failures (unknown username, wrong password) and privilege
    /// failures (inactive, not staff) are kept as two distinct buckets; the
    /// message never says which individual check failed.
    pub async fn login(&self, username: &str, password: &str) -> AppResult<StaffAccount> {
        let account = self
            .repository
            .staff
            .get_by_username(username)
            .await?
            .ok_or(AppError::InvalidCredentials)?;

        if !self.verify_password(&account.password, password)? {
            return Err(AppError::InvalidCredentials);
        }

        if !account.is_active || !(account.is_staff || account.is_superuser) {
            return Err(AppError::AccessDenied);
        }

        tracing::info!(staff_id = account.id, "Staff login");

        Ok(account)
    }

    /// Create a new staff account
    pub async fn create_account(&self, request: CreateStaffAccount) -> AppResult<StaffAccount> {
        if self
            .repository
            .staff
            .username_exists(&request.username, None)
            .await?
        {
            return Err(AppError::Duplicate(format!(
                "Username {} already exists",
                request.username
            )));
        }

        if self.repository.staff.email_exists(&request.email, None).await? {
            return Err(AppError::Duplicate(format!(
                "Email {} already exists",
                request.email
            )));
        }

        let hash = self.hash_password(&request.password)?;

        self.repository
            .staff
            .create(&request.username, &request.email, &hash, request.is_superuser)
            .await
    }

    /// Self-service profile update; returns the account and whether the
    /// password changed (the caller must invalidate sessions when it did).
    pub async fn update_profile(
        &self,
        staff_id: i32,
        profile: UpdateStaffProfile,
    ) -> AppResult<(StaffAccount, bool)> {
        let account = self.repository.staff.get_by_id(staff_id).await?;

        // Nothing is applied before the current password verifies.
        if !self.verify_password(&account.password, &profile.current_password)? {
            return Err(AppError::InvalidCredentials);
        }

        if let Some(ref username) = profile.new_username {
            if self
                .repository
                .staff
                .username_exists(username, Some(staff_id))
                .await?
            {
                return Err(AppError::Duplicate(format!(
                    "Username {} already exists",
                    username
                )));
            }
        }

        if let Some(ref email) = profile.new_email {
            if self.repository.staff.email_exists(email, Some(staff_id)).await? {
                return Err(AppError::Duplicate(format!("Email {} already exists", email)));
            }
        }

        let password_changed = profile.new_password.is_some();
        let hash = match profile.new_password {
            Some(ref new_password) => Some(self.hash_password(new_password)?),
            None => None,
        };

        let updated = self
            .repository
            .staff
            .update(
                staff_id,
                profile.new_username.as_deref(),
                profile.new_email.as_deref(),
                hash.as_deref(),
                None,
                None,
            )
            .await?;

        Ok((updated, password_changed))
    }

    /// Administrative account update: the acting principal must be an active
    /// superuser. No current-password check applies in this mode.
    pub async fn admin_update_account(
        &self,
        target_id: i32,
        request: AdminUpdateStaffAccount,
    ) -> AppResult<StaffAccount> {
        let acting = self.repository.staff.get_by_id(request.acting_staff_id).await?;
        if !acting.is_active || !acting.is_superuser {
            return Err(AppError::AccessDenied);
        }

        // Target must exist before uniqueness checks reference its row.
        self.repository.staff.get_by_id(target_id).await?;

        if let Some(ref username) = request.new_username {
            if self
                .repository
                .staff
                .username_exists(username, Some(target_id))
                .await?
            {
                return Err(AppError::Duplicate(format!(
                    "Username {} already exists",
                    username
                )));
            }
        }

        if let Some(ref email) = request.new_email {
            if self.repository.staff.email_exists(email, Some(target_id)).await? {
                return Err(AppError::Duplicate(format!("Email {} already exists", email)));
            }
        }

        let hash = match request.new_password {
            Some(ref new_password) => Some(self.hash_password(new_password)?),
            None => None,
        };

        self.repository
            .staff
            .update(
                target_id,
                request.new_username.as_deref(),
                request.new_email.as_deref(),
                hash.as_deref(),
                request.is_active,
                request.is_staff,
            )
            .await
    }

    /// Delete a staff account
    pub async fn delete_account(&self, staff_id: i32) -> AppResult<()> {
        let account = self.repository.staff.get_by_id(staff_id).await?;

        if account.is_superuser {
            return Err(AppError::PermissionDenied(
                "Superuser accounts cannot be deleted".to_string(),
            ));
        }

        let linked = self.repository.staff.count_linked_members(staff_id).await?;
        if linked > 0 {
            return Err(AppError::HasDependentRecords(format!(
                "Staff account {} is linked to {} member records",
                staff_id, linked
            )));
        }

        self.repository.staff.delete(staff_id).await
    }

    /// Get staff account by ID
    pub async fn get_account(&self, id: i32) -> AppResult<StaffAccount> {
        self.repository.staff.get_by_id(id).await
    }

    /// List staff accounts
    pub async fn list_accounts(&self) -> AppResult<Vec<StaffAccount>> {
        self.repository.staff.list().await
    }

    /// Hash a password using Argon2
    pub fn hash_password(&self, password: &str) -> AppResult<String> {
        let salt = SaltString::generate(&mut OsRng);
        let argon2 = Argon2::default();
        let hash = argon2
            .hash_password(password.as_bytes(), &salt)
            .map_err(|e| AppError::Internal(format!("Failed to hash password: {}", e)))?;
        Ok(hash.to_string())
    }

    /// Verify a password against a stored Argon2 hash
    fn verify_password(&self, hash: &str, password: &str) -> AppResult<bool> {
        let parsed_hash = PasswordHash::new(hash)
            .map_err(|_| AppError::Internal("Invalid password hash".to_string()))?;
        Ok(Argon2::default()
            .verify_password(password.as_bytes(), &parsed_hash)
            .is_ok())
    }
}
