//! User account model.
//!
//! # Invariants
//! - `email` is globally unique across all users.
//! - `password` is an opaque, already-hashed secret. Core never hashes or
//!   compares credentials.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Account record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    /// Hashed credential supplied by the caller.
    #[serde(skip_serializing)]
    pub password: String,
    pub memo: Option<String>,
    pub created_at: i64,
    pub updated_at: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UserValidationError {
    #[error("user name must not be blank")]
    BlankName,
    #[error("user email must not be blank")]
    BlankEmail,
    #[error("user password must not be blank")]
    BlankPassword,
}

impl User {
    pub fn validate(&self) -> Result<(), UserValidationError> {
        if self.name.trim().is_empty() {
            return Err(UserValidationError::BlankName);
        }
        if self.email.trim().is_empty() {
            return Err(UserValidationError::BlankEmail);
        }
        if self.password.is_empty() {
            return Err(UserValidationError::BlankPassword);
        }
        Ok(())
    }
}
