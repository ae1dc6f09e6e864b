//! User store: the record lifecycle on top of a repository.
//!
//! # Responsibility
//! - Run the validation gate before every write.
//! - Enforce email uniqueness and id lifecycle rules.
//! - Stamp `registered_at` on add and `updated_at` on edit.
//!
//! # Invariants
//! - Every operation returns `StoreResult`; nothing is printed from here.
//! - A failed operation leaves storage unchanged.
//! - Log events carry ids and error kinds only, never names or emails.

use crate::model::user::{now_epoch_ms, UserDraft, UserId, UserRecord, ValidationError};
use crate::repo::user_repo::{RepoError, UserRepository};
use log::{debug, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure of one store operation.
#[derive(Debug)]
pub enum StoreError {
    /// Proposed fields failed the validation gate.
    Invalid(ValidationError),
    /// Another user already owns the proposed email.
    DuplicateEmail(String),
    /// No user has the requested id.
    NotFound(UserId),
    /// The persistence backend failed.
    Storage(RepoError),
}

/// Flat error taxonomy for callers that only need to branch on the kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    InvalidName,
    InvalidAge,
    InvalidEmail,
    DuplicateEmail,
    NotFound,
    StorageError,
}

impl StoreErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::InvalidName => "invalid_name",
            Self::InvalidAge => "invalid_age",
            Self::InvalidEmail => "invalid_email",
            Self::DuplicateEmail => "duplicate_email",
            Self::NotFound => "not_found",
            Self::StorageError => "storage_error",
        }
    }
}

impl StoreError {
    pub fn kind(&self) -> StoreErrorKind {
        match self {
            Self::Invalid(ValidationError::InvalidName(_)) => StoreErrorKind::InvalidName,
            Self::Invalid(ValidationError::InvalidAge(_)) => StoreErrorKind::InvalidAge,
            Self::Invalid(ValidationError::InvalidEmail(_)) => StoreErrorKind::InvalidEmail,
            Self::DuplicateEmail(_) => StoreErrorKind::DuplicateEmail,
            Self::NotFound(_) => StoreErrorKind::NotFound,
            Self::Storage(_) => StoreErrorKind::StorageError,
        }
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Invalid(err) => write!(f, "{err}"),
            Self::DuplicateEmail(email) => write!(f, "email `{email}` is already registered"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::Storage(err) => write!(f, "storage error: {err}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Invalid(err) => Some(err),
            Self::Storage(err) => Some(err),
            Self::DuplicateEmail(_) | Self::NotFound(_) => None,
        }
    }
}

impl From<ValidationError> for StoreError {
    fn from(value: ValidationError) -> Self {
        Self::Invalid(value)
    }
}

impl From<RepoError> for StoreError {
    fn from(value: RepoError) -> Self {
        match value {
            RepoError::NotFound(id) => Self::NotFound(id),
            RepoError::DuplicateEmail(email) => Self::DuplicateEmail(email),
            other => Self::Storage(other),
        }
    }
}

/// Capability set of the user store.
pub trait UserStore {
    /// Validates and inserts a new user, returning it with its assigned id.
    fn add(&mut self, draft: &UserDraft) -> StoreResult<UserRecord>;
    /// Lists all users ordered by name, then id. May be empty.
    fn list(&self) -> StoreResult<Vec<UserRecord>>;
    /// Gets one user by id.
    fn get(&self, id: UserId) -> StoreResult<UserRecord>;
    /// Lists users whose name contains `fragment` (case-sensitive).
    fn find_by_name(&self, fragment: &str) -> StoreResult<Vec<UserRecord>>;
    /// Validates and replaces the editable fields of an existing user.
    fn edit(&mut self, id: UserId, draft: &UserDraft) -> StoreResult<UserRecord>;
    /// Removes one user and returns the removed record.
    fn delete(&mut self, id: UserId) -> StoreResult<UserRecord>;
}

/// Store implementation over any `UserRepository`.
pub struct UserService<R: UserRepository> {
    repo: R,
}

impl<R: UserRepository> UserService<R> {
    /// Creates a store using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    fn reject<T>(&self, operation: &str, err: StoreError) -> StoreResult<T> {
        warn!(
            "event=user_{operation} module=service status=rejected error_code={}",
            err.kind().as_str()
        );
        Err(err)
    }
}

impl<R: UserRepository> UserStore for UserService<R> {
    fn add(&mut self, draft: &UserDraft) -> StoreResult<UserRecord> {
        if let Err(err) = draft.validate() {
            return self.reject("add", err.into());
        }
        let draft = draft.normalized();

        if self.repo.email_exists(&draft.email)? {
            return self.reject("add", StoreError::DuplicateEmail(draft.email));
        }

        let user = match self.repo.insert_user(&draft, now_epoch_ms()) {
            Ok(user) => user,
            Err(err) => return self.reject("add", err.into()),
        };
        info!(
            "event=user_add module=service status=ok user_id={}",
            user.id
        );
        Ok(user)
    }

    fn list(&self) -> StoreResult<Vec<UserRecord>> {
        let users = self.repo.list_users()?;
        debug!(
            "event=user_list module=service status=ok count={}",
            users.len()
        );
        Ok(users)
    }

    fn get(&self, id: UserId) -> StoreResult<UserRecord> {
        self.repo.find_user(id)?.ok_or(StoreError::NotFound(id))
    }

    fn find_by_name(&self, fragment: &str) -> StoreResult<Vec<UserRecord>> {
        let users = self.repo.find_users_by_name(fragment)?;
        debug!(
            "event=user_find module=service status=ok count={}",
            users.len()
        );
        Ok(users)
    }

    fn edit(&mut self, id: UserId, draft: &UserDraft) -> StoreResult<UserRecord> {
        if let Err(err) = draft.validate() {
            return self.reject("edit", err.into());
        }
        let draft = draft.normalized();

        let Some(current) = self.repo.find_user(id)? else {
            return self.reject("edit", StoreError::NotFound(id));
        };

        if draft.email != current.email && self.repo.email_exists(&draft.email)? {
            return self.reject("edit", StoreError::DuplicateEmail(draft.email));
        }

        let user = match self.repo.update_user(id, &draft, now_epoch_ms()) {
            Ok(user) => user,
            Err(err) => return self.reject("edit", err.into()),
        };
        info!("event=user_edit module=service status=ok user_id={id}");
        Ok(user)
    }

    fn delete(&mut self, id: UserId) -> StoreResult<UserRecord> {
        let Some(current) = self.repo.find_user(id)? else {
            return self.reject("delete", StoreError::NotFound(id));
        };

        if let Err(err) = self.repo.delete_user(id) {
            return self.reject("delete", err.into());
        }
        info!("event=user_delete module=service status=ok user_id={id}");
        Ok(current)
    }
}
