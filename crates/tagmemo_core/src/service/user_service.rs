//! User account use-case service.
//!
//! # Responsibility
//! - Create, update, list and delete accounts.
//! - Enforce email uniqueness with a user-facing error.
//!
//! Passwords arrive already hashed; token issuance and welcome mail are
//! handled outside core.

use crate::model::now_epoch_ms;
use crate::model::user::{User, UserValidationError};
use crate::repo::error::RepoError;
use crate::repo::pagination::{PageResult, Pagination, PaginationError};
use crate::repo::user_repo::UserRepository;
use log::info;
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Error)]
pub enum UserServiceError {
    #[error("email already exists")]
    EmailAlreadyExists,
    #[error("user not found: {0}")]
    UserNotFound(String),
    #[error(transparent)]
    InvalidUser(#[from] UserValidationError),
    #[error(transparent)]
    InvalidPage(#[from] PaginationError),
    #[error(transparent)]
    Repo(RepoError),
}

impl From<RepoError> for UserServiceError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound { id, .. } => Self::UserNotFound(id),
            RepoError::UserValidation(err) => Self::InvalidUser(err),
            other => Self::Repo(other),
        }
    }
}

pub type UserServiceResult<T> = Result<T, UserServiceError>;

/// Input for `UserService::create_user`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    /// Already-hashed credential.
    pub password: String,
    pub memo: Option<String>,
}

pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    pub fn create_user(&self, input: NewUser) -> UserServiceResult<User> {
        if self.repo.find_user_by_email(&input.email)?.is_some() {
            return Err(UserServiceError::EmailAlreadyExists);
        }

        let now = now_epoch_ms();
        let user = User {
            id: Uuid::new_v4().to_string(),
            name: input.name,
            email: input.email,
            password: input.password,
            memo: input.memo,
            created_at: now,
            updated_at: now,
        };
        match self.repo.save_user(&user) {
            Ok(()) => {}
            // Lost a race with a concurrent signup for the same email.
            Err(RepoError::ConstraintViolation(_)) => {
                return Err(UserServiceError::EmailAlreadyExists)
            }
            Err(err) => return Err(err.into()),
        }

        info!("event=user_create module=service status=ok user_id={}", user.id);
        Ok(user)
    }

    /// Applies the provided fields; `None` keeps the current value.
    pub fn update_user(
        &self,
        user_id: &str,
        name: Option<String>,
        password: Option<String>,
    ) -> UserServiceResult<User> {
        let mut user = self.get_user(user_id)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(password) = password {
            user.password = password;
        }
        user.updated_at = now_epoch_ms();
        self.repo.update_user(&user)?;
        Ok(user)
    }

    pub fn get_user(&self, user_id: &str) -> UserServiceResult<User> {
        self.repo
            .find_user_by_id(user_id)?
            .ok_or_else(|| UserServiceError::UserNotFound(user_id.to_string()))
    }

    pub fn get_users(&self, page: u32, items_per_page: u32) -> UserServiceResult<PageResult<User>> {
        let page = Pagination::new(page, items_per_page)?;
        Ok(self.repo.list_users(page)?)
    }

    /// Deletes the account and returns the removed record.
    pub fn delete_user(&self, user_id: &str) -> UserServiceResult<User> {
        let user = self.get_user(user_id)?;
        self.repo.delete_user(user_id)?;
        info!("event=user_delete module=service status=ok user_id={}", user.id);
        Ok(user)
    }
}
