//! Core logic for the usercrud console directory.
//! This crate owns the user model, its storage and the persistence gateway.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod validation;

pub use db::{DbError, DbResult, StoreContext, StoreLocation, StoreSettings};
pub use logging::{default_log_level, init_logging, logging_status};
pub use model::user::{NewUser, User, UserId, UserPatch, UserValidationError};
pub use repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
pub use service::user_dao::UserDao;
pub use validation::email::is_valid as is_valid_email;

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
