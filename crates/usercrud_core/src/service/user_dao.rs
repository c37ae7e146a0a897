//! User persistence gateway used by the console front end.
//!
//! # Responsibility
//! - Expose the six user operations with plain `Option`/`Vec`/`bool` results.
//! - Open one session per call against the shared `StoreContext`.
//! - Log failures at the boundary and degrade them to empty results.
//!
//! # Invariants
//! - No error escapes this layer; "not found" and "storage failure" look the
//!   same to callers and only differ in logs.
//! - Write operations roll back on every failure path.

use crate::db::StoreContext;
use crate::model::user::{NewUser, User, UserId, UserPatch};
use crate::repo::user_repo::{RepoError, RepoResult, SqliteUserRepository, UserRepository};
use log::{debug, error, info, warn};

/// Gateway over the user table.
pub struct UserDao<'ctx> {
    context: &'ctx StoreContext,
}

impl<'ctx> UserDao<'ctx> {
    pub fn new(context: &'ctx StoreContext) -> Self {
        Self { context }
    }

    /// Persists `user` and returns its assigned id.
    ///
    /// Duplicate emails, invalid fields and storage errors all yield `None`.
    pub fn create(&self, user: &NewUser) -> Option<UserId> {
        debug!("event=user_create module=dao status=start");
        match self.session().and_then(|repo| repo.create_user(user)) {
            Ok(created) => {
                info!("event=user_create module=dao status=ok id={}", created.id);
                Some(created.id)
            }
            Err(err) => {
                log_failure("user_create", None, &err);
                None
            }
        }
    }

    pub fn get_by_id(&self, id: UserId) -> Option<User> {
        debug!("event=user_get module=dao status=start id={id}");
        self.session()
            .and_then(|repo| repo.get_user(id))
            .unwrap_or_else(|err| {
                log_failure("user_get", Some(id), &err);
                None
            })
    }

    /// Returns every user in store order; failures yield an empty list.
    pub fn get_all(&self) -> Vec<User> {
        debug!("event=user_list module=dao status=start");
        match self.session().and_then(|repo| repo.list_users()) {
            Ok(users) => {
                debug!("event=user_list module=dao status=ok count={}", users.len());
                users
            }
            Err(err) => {
                log_failure("user_list", None, &err);
                Vec::new()
            }
        }
    }

    /// Applies the supplied fields of `patch` to user `id`.
    ///
    /// Returns `false` when the patch is empty, the user does not exist, a
    /// constraint rejects the change or storage fails.
    pub fn update(&self, id: UserId, patch: &UserPatch) -> bool {
        debug!("event=user_update module=dao status=start id={id}");
        match self.session().and_then(|repo| repo.update_user(id, patch)) {
            Ok(()) => {
                info!("event=user_update module=dao status=ok id={id}");
                true
            }
            Err(err) => {
                log_failure("user_update", Some(id), &err);
                false
            }
        }
    }

    /// Hard-deletes user `id`; `false` when no row was removed.
    pub fn delete(&self, id: UserId) -> bool {
        debug!("event=user_delete module=dao status=start id={id}");
        match self.session().and_then(|repo| repo.delete_user(id)) {
            Ok(()) => {
                info!("event=user_delete module=dao status=ok id={id}");
                true
            }
            Err(err) => {
                log_failure("user_delete", Some(id), &err);
                false
            }
        }
    }

    pub fn get_by_email(&self, email: &str) -> Option<User> {
        debug!("event=user_find_email module=dao status=start");
        self.session()
            .and_then(|repo| repo.find_user_by_email(email))
            .unwrap_or_else(|err| {
                log_failure("user_find_email", None, &err);
                None
            })
    }

    fn session(&self) -> RepoResult<SqliteUserRepository<'ctx>> {
        let conn = self.context.connection()?;
        SqliteUserRepository::try_new(conn)
    }
}

fn log_failure(event: &str, id: Option<UserId>, err: &RepoError) {
    let id = id.map_or_else(|| "-".to_string(), |id| id.to_string());
    match err {
        RepoError::NotFound(_) | RepoError::NoFieldsToUpdate => warn!(
            "event={} module=dao status=rejected id={} error_code={}",
            event,
            id,
            err.code()
        ),
        _ => error!(
            "event={} module=dao status=error id={} error_code={} error={}",
            event,
            id,
            err.code(),
            err
        ),
    }
}
