//! User repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Define the narrow persistence contract the user store depends on.
//! - Keep SQL details inside the core persistence boundary.
//!
//! # Invariants
//! - Listing order is `name ASC, id ASC` for every implementation.
//! - Name search is a case-sensitive substring match.
//! - Read paths reject rows that fail the validation gate.

use crate::db::migrations::{current_version, latest_version};
use crate::db::DbError;
use crate::model::user::{UserDraft, UserId, UserRecord, ValidationError};
use rusqlite::{params, Connection, OptionalExtension, Row};
use std::error::Error;
use std::fmt::{Display, Formatter};

const USER_SELECT_SQL: &str = "SELECT
    id,
    name,
    age,
    email,
    registered_at,
    updated_at
FROM users";

const REQUIRED_USER_COLUMNS: &[&str] = &[
    "id",
    "name",
    "age",
    "email",
    "registered_at",
    "updated_at",
];

pub type RepoResult<T> = Result<T, RepoError>;

/// Backend error for user persistence and query operations.
#[derive(Debug)]
pub enum RepoError {
    Db(DbError),
    /// Target row does not exist.
    NotFound(UserId),
    /// Email uniqueness constraint rejected the write.
    DuplicateEmail(String),
    /// Persisted data does not satisfy domain invariants.
    InvalidData(String),
    /// Connection has not been migrated to the schema this binary expects.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    MissingRequiredTable(&'static str),
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::NotFound(id) => write!(f, "user not found: {id}"),
            Self::DuplicateEmail(_) => write!(f, "email is already registered"),
            Self::InvalidData(message) => write!(f, "invalid persisted user data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "connection schema version {actual_version} does not match expected {expected_version}"
            ),
            Self::MissingRequiredTable(table) => write!(f, "required table `{table}` is missing"),
            Self::MissingRequiredColumn { table, column } => {
                write!(f, "required column `{table}.{column}` is missing")
            }
        }
    }
}

impl Error for RepoError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            _ => None,
        }
    }
}

impl From<DbError> for RepoError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for RepoError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Persistence contract for user records.
///
/// Callers run the validation gate before any write; implementations only
/// enforce storage-level constraints (id assignment, email uniqueness).
pub trait UserRepository {
    /// Inserts a user, assigning the next never-used id.
    fn insert_user(&mut self, draft: &UserDraft, registered_at: i64) -> RepoResult<UserRecord>;
    /// Finds one user by id.
    fn find_user(&self, id: UserId) -> RepoResult<Option<UserRecord>>;
    /// Lists every user ordered by `name ASC, id ASC`.
    fn list_users(&self) -> RepoResult<Vec<UserRecord>>;
    /// Lists users whose name contains `fragment` (case-sensitive).
    fn find_users_by_name(&self, fragment: &str) -> RepoResult<Vec<UserRecord>>;
    /// Overwrites editable fields and stamps `updated_at`.
    fn update_user(
        &mut self,
        id: UserId,
        draft: &UserDraft,
        updated_at: i64,
    ) -> RepoResult<UserRecord>;
    /// Hard-deletes one user.
    fn delete_user(&mut self, id: UserId) -> RepoResult<()>;
    /// Returns whether any user currently owns `email`.
    fn email_exists(&self, email: &str) -> RepoResult<bool>;
}

/// SQLite-backed user repository.
pub struct SqliteUserRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteUserRepository<'conn> {
    /// Constructs a repository from a migrated connection.
    ///
    /// # Errors
    /// - `UninitializedConnection` when migrations are not at the latest version.
    /// - `MissingRequiredTable` / `MissingRequiredColumn` when the schema is
    ///   not the one migrations produce.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl UserRepository for SqliteUserRepository<'_> {
    fn insert_user(&mut self, draft: &UserDraft, registered_at: i64) -> RepoResult<UserRecord> {
        self.conn
            .execute(
                "INSERT INTO users (name, age, email, registered_at)
                 VALUES (?1, ?2, ?3, ?4);",
                params![draft.name, draft.age, draft.email, registered_at],
            )
            .map_err(|err| map_write_error(err, &draft.email))?;

        let id = self.conn.last_insert_rowid();
        self.find_user(id)?.ok_or_else(|| {
            RepoError::InvalidData(format!("inserted user {id} missing on read-back"))
        })
    }

    fn find_user(&self, id: UserId) -> RepoResult<Option<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} WHERE id = ?1;"))?;
        let row = stmt.query_row([id], row_values).optional()?;
        row.map(into_user_record).transpose()
    }

    fn list_users(&self) -> RepoResult<Vec<UserRecord>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{USER_SELECT_SQL} ORDER BY name ASC, id ASC;"))?;
        let rows = stmt.query_map([], row_values)?;
        collect_users(rows)
    }

    fn find_users_by_name(&self, fragment: &str) -> RepoResult<Vec<UserRecord>> {
        // instr() is case-sensitive where LIKE folds ASCII case.
        let mut stmt = self.conn.prepare(&format!(
            "{USER_SELECT_SQL}
             WHERE instr(name, ?1) > 0
             ORDER BY name ASC, id ASC;"
        ))?;
        let rows = stmt.query_map([fragment], row_values)?;
        collect_users(rows)
    }

    fn update_user(
        &mut self,
        id: UserId,
        draft: &UserDraft,
        updated_at: i64,
    ) -> RepoResult<UserRecord> {
        let changed = self
            .conn
            .execute(
                "UPDATE users
                 SET
                    name = ?1,
                    age = ?2,
                    email = ?3,
                    updated_at = ?4
                 WHERE id = ?5;",
                params![draft.name, draft.age, draft.email, updated_at, id],
            )
            .map_err(|err| map_write_error(err, &draft.email))?;

        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }

        self.find_user(id)?.ok_or(RepoError::NotFound(id))
    }

    fn delete_user(&mut self, id: UserId) -> RepoResult<()> {
        let changed = self.conn.execute("DELETE FROM users WHERE id = ?1;", [id])?;
        if changed == 0 {
            return Err(RepoError::NotFound(id));
        }
        Ok(())
    }

    fn email_exists(&self, email: &str) -> RepoResult<bool> {
        let exists: i64 = self.conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM users WHERE email = ?1);",
            [email],
            |row| row.get(0),
        )?;
        Ok(exists == 1)
    }
}

type UserRow = (UserId, String, i64, String, i64, Option<i64>);

fn row_values(row: &Row<'_>) -> rusqlite::Result<UserRow> {
    Ok((
        row.get("id")?,
        row.get("name")?,
        row.get("age")?,
        row.get("email")?,
        row.get("registered_at")?,
        row.get("updated_at")?,
    ))
}

fn into_user_record(row: UserRow) -> RepoResult<UserRecord> {
    let (id, name, age, email, registered_at, updated_at) = row;
    let user = UserRecord {
        id,
        name,
        age,
        email,
        registered_at,
        updated_at,
    };
    user.validate()
        .map_err(|err: ValidationError| RepoError::InvalidData(format!("user {id}: {err}")))?;
    Ok(user)
}

fn collect_users(
    rows: impl Iterator<Item = rusqlite::Result<UserRow>>,
) -> RepoResult<Vec<UserRecord>> {
    rows.map(|row| into_user_record(row?)).collect()
}

fn map_write_error(err: rusqlite::Error, email: &str) -> RepoError {
    match &err {
        rusqlite::Error::SqliteFailure(failure, _)
            if failure.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE =>
        {
            RepoError::DuplicateEmail(email.to_string())
        }
        _ => err.into(),
    }
}

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let actual_version = current_version(conn)?;
    let expected_version = latest_version();
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    let table_exists: i64 = conn.query_row(
        "SELECT EXISTS(
            SELECT 1 FROM sqlite_master WHERE type = 'table' AND name = 'users'
        );",
        [],
        |row| row.get(0),
    )?;
    if table_exists != 1 {
        return Err(RepoError::MissingRequiredTable("users"));
    }

    let mut stmt = conn.prepare("PRAGMA table_info(users);")?;
    let columns = stmt
        .query_map([], |row| row.get::<_, String>("name"))?
        .collect::<rusqlite::Result<Vec<_>>>()?;
    for &required in REQUIRED_USER_COLUMNS {
        if !columns.iter().any(|column| column.as_str() == required) {
            return Err(RepoError::MissingRequiredColumn {
                table: "users",
                column: required,
            });
        }
    }

    Ok(())
}
