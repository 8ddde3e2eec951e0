//! Dojo repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Provide list/get/create/update/remove/clear APIs over `dojos` storage.
//! - Keep SQL details and ordering behavior inside the repository boundary.
//!
//! # Invariants
//! - Listing is ordered by insertion (`seq ASC`), never by name or time.
//! - `remove_dojo` detaches every referencing member and deletes the dojo in
//!   one immediate transaction; nothing changes when the dojo is missing.
//! - `clear_dojos` deletes dojos only and leaves member references as-is.

use crate::db::migrations::latest_version;
use crate::db::DbError;
use crate::model::dojo::{Dojo, DojoId};
use crate::model::member::MemberId;
use rusqlite::{params, Connection, OptionalExtension, Row, Transaction, TransactionBehavior};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

const DOJO_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    location,
    created_at
FROM dojos";

pub type RepoResult<T> = Result<T, RepoError>;

/// Repository error shared by dojo and member persistence.
#[derive(Debug)]
pub enum RepoError {
    /// Underlying SQLite/bootstrap error.
    Db(DbError),
    /// Target dojo does not exist.
    DojoNotFound(DojoId),
    /// Target member does not exist.
    MemberNotFound(MemberId),
    /// Persisted data cannot be converted to a valid record.
    InvalidData(String),
    /// Connection schema is not at the expected migrated version.
    UninitializedConnection {
        expected_version: u32,
        actual_version: u32,
    },
    /// Required table is missing.
    MissingRequiredTable(&'static str),
    /// Required column is missing from expected table.
    MissingRequiredColumn {
        table: &'static str,
        column: &'static str,
    },
}

impl RepoError {
    /// Returns whether this error reports a missing dojo or member.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DojoNotFound(_) | Self::MemberNotFound(_))
    }
}

impl Display for RepoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::DojoNotFound(id) => write!(f, "dojo not found: {id}"),
            Self::MemberNotFound(id) => write!(f, "member not found: {id}"),
            Self::InvalidData(message) => write!(f, "invalid persisted data: {message}"),
            Self::UninitializedConnection {
                expected_version,
                actual_version,
            } => write!(
                f,
                "dojo repository requires schema version {expected_version}, got {actual_version}"
            ),
            Self::MissingRequiredTable(table) => {
                write!(f, "dojo repository requires table `{table}`")
            }
            Self::MissingRequiredColumn { table, column } => write!(
                f,
                "dojo repository requires column `{column}` in table `{table}`"
            ),
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

/// Repository interface for dojo records.
pub trait DojoRepository {
    /// Lists every dojo in insertion order.
    fn list_dojos(&self) -> RepoResult<Vec<Dojo>>;
    /// Loads one dojo by id; `None` when absent.
    fn get_dojo(&self, id: DojoId) -> RepoResult<Option<Dojo>>;
    /// Inserts one dojo and returns its id.
    fn create_dojo(&self, dojo: &Dojo) -> RepoResult<DojoId>;
    /// Overwrites `name` and `location` of an existing dojo.
    fn update_dojo(&self, id: DojoId, name: &str, location: Option<&str>) -> RepoResult<()>;
    /// Detaches referencing members, then deletes the dojo.
    ///
    /// Returns the number of detached members.
    fn remove_dojo(&self, id: DojoId) -> RepoResult<usize>;
    /// Deletes every dojo without touching members. Returns deleted count.
    fn clear_dojos(&self) -> RepoResult<usize>;
}

/// SQLite-backed dojo/member repository.
pub struct SqliteDojoRepository<'conn> {
    pub(crate) conn: &'conn Connection,
}

impl<'conn> SqliteDojoRepository<'conn> {
    /// Creates repository from a migrated connection.
    pub fn try_new(conn: &'conn Connection) -> RepoResult<Self> {
        ensure_connection_ready(conn)?;
        Ok(Self { conn })
    }
}

impl DojoRepository for SqliteDojoRepository<'_> {
    fn list_dojos(&self) -> RepoResult<Vec<Dojo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOJO_SELECT_SQL} ORDER BY seq ASC;"))?;
        let mut rows = stmt.query([])?;

        let mut dojos = Vec::new();
        while let Some(row) = rows.next()? {
            dojos.push(parse_dojo_row(row)?);
        }
        Ok(dojos)
    }

    fn get_dojo(&self, id: DojoId) -> RepoResult<Option<Dojo>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{DOJO_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_dojo_row(row)?));
        }
        Ok(None)
    }

    fn create_dojo(&self, dojo: &Dojo) -> RepoResult<DojoId> {
        self.conn.execute(
            "INSERT INTO dojos (
                uuid,
                name,
                location,
                created_at
            ) VALUES (?1, ?2, ?3, ?4);",
            params![
                dojo.id.to_string(),
                dojo.name.as_str(),
                dojo.location.as_deref(),
                dojo.created_at,
            ],
        )?;
        Ok(dojo.id)
    }

    fn update_dojo(&self, id: DojoId, name: &str, location: Option<&str>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE dojos
             SET name = ?2,
                 location = ?3
             WHERE uuid = ?1;",
            params![id.to_string(), name, location],
        )?;
        if changed == 0 {
            return Err(RepoError::DojoNotFound(id));
        }
        Ok(())
    }

    fn remove_dojo(&self, id: DojoId) -> RepoResult<usize> {
        let tx = Transaction::new_unchecked(self.conn, TransactionBehavior::Immediate)?;

        let detached = tx.execute(
            "UPDATE members
             SET dojo_uuid = NULL
             WHERE dojo_uuid = ?1;",
            [id.to_string()],
        )?;

        let deleted = tx.execute("DELETE FROM dojos WHERE uuid = ?1;", [id.to_string()])?;
        if deleted == 0 {
            // Dropping the transaction rolls the detach back.
            return Err(RepoError::DojoNotFound(id));
        }

        tx.commit()?;
        Ok(detached)
    }

    fn clear_dojos(&self) -> RepoResult<usize> {
        let deleted = self.conn.execute("DELETE FROM dojos;", [])?;
        Ok(deleted)
    }
}

fn parse_dojo_row(row: &Row<'_>) -> RepoResult<Dojo> {
    let uuid_text: String = row.get("uuid")?;
    let id = parse_uuid(&uuid_text, "dojos.uuid")?;
    Ok(Dojo::with_id(
        id,
        row.get::<_, String>("name")?,
        row.get("location")?,
        row.get("created_at")?,
    ))
}

pub(crate) fn parse_uuid(value: &str, column: &'static str) -> RepoResult<Uuid> {
    Uuid::parse_str(value)
        .map_err(|_| RepoError::InvalidData(format!("invalid uuid `{value}` in {column}")))
}

pub(crate) fn int_to_bool(value: i64, column: &'static str) -> RepoResult<bool> {
    match value {
        0 => Ok(false),
        1 => Ok(true),
        other => Err(RepoError::InvalidData(format!(
            "invalid boolean value `{other}` in {column}"
        ))),
    }
}

pub(crate) fn bool_to_int(value: bool) -> i64 {
    if value {
        1
    } else {
        0
    }
}

const REQUIRED_COLUMNS: &[(&str, &[&str])] = &[
    ("dojos", &["seq", "uuid", "name", "location", "created_at"]),
    (
        "members",
        &[
            "seq",
            "uuid",
            "name",
            "dojo_uuid",
            "is_guest",
            "is_archived",
            "created_at",
        ],
    ),
];

fn ensure_connection_ready(conn: &Connection) -> RepoResult<()> {
    let expected_version = latest_version();
    let actual_version: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    if actual_version != expected_version {
        return Err(RepoError::UninitializedConnection {
            expected_version,
            actual_version,
        });
    }

    for &(table, columns) in REQUIRED_COLUMNS {
        if !table_exists(conn, table)? {
            return Err(RepoError::MissingRequiredTable(table));
        }
        for &column in columns {
            if !table_has_column(conn, table, column)? {
                return Err(RepoError::MissingRequiredColumn { table, column });
            }
        }
    }

    Ok(())
}

fn table_exists(conn: &Connection, table: &str) -> RepoResult<bool> {
    let exists: Option<i64> = conn
        .query_row(
            "SELECT 1
             FROM sqlite_master
             WHERE type = 'table' AND name = ?1;",
            [table],
            |row| row.get(0),
        )
        .optional()?;
    Ok(exists.is_some())
}

fn table_has_column(conn: &Connection, table: &str, column: &str) -> RepoResult<bool> {
    let mut stmt = conn.prepare(&format!("PRAGMA table_info({table});"))?;
    let mut rows = stmt.query([])?;
    while let Some(row) = rows.next()? {
        let current: String = row.get(1)?;
        if current == column {
            return Ok(true);
        }
    }
    Ok(false)
}
