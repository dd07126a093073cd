//! Core domain logic for tagmemo.
//! This crate is the single source of truth for note/tag invariants.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, CoreConfig};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{Note, NoteDraft, NoteId, NoteValidationError, Tag, TagId};
pub use model::user::{User, UserValidationError};
pub use repo::error::{RepoError, RepoResult};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::pagination::{PageResult, Pagination, PaginationError};
pub use repo::user_repo::{SqliteUserRepository, UserRepository};
pub use service::note_service::{NoteService, NoteServiceError};
pub use service::user_service::{NewUser, UserService, UserServiceError};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
