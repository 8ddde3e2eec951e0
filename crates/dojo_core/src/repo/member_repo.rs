//! Member repository contracts and SQLite implementation.
//!
//! # Responsibility
//! - Persist members and the weak `dojo_uuid` reference they carry.
//! - Serve the index scan (`idx_members_dojo_uuid`) and guest scan used by
//!   dojo cascades and guest counts.
//!
//! # Invariants
//! - Listing is ordered by insertion (`seq ASC`).
//! - Assigning a dojo does not check that the dojo exists.

use super::dojo_repo::{
    bool_to_int, int_to_bool, parse_uuid, RepoError, RepoResult, SqliteDojoRepository,
};
use crate::model::dojo::DojoId;
use crate::model::member::{Member, MemberId};
use rusqlite::{params, Row};

const MEMBER_SELECT_SQL: &str = "SELECT
    uuid,
    name,
    dojo_uuid,
    is_guest,
    is_archived,
    created_at
FROM members";

/// Repository interface for member records.
pub trait MemberRepository {
    /// Inserts one member and returns its id.
    fn create_member(&self, member: &Member) -> RepoResult<MemberId>;
    /// Loads one member by id; `None` when absent.
    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>>;
    /// Lists members referencing `dojo_id`, archived or not.
    fn list_members_by_dojo(&self, dojo_id: DojoId) -> RepoResult<Vec<Member>>;
    /// Lists every guest member, archived or not.
    fn list_guests(&self) -> RepoResult<Vec<Member>>;
    /// Sets or clears the archived flag.
    fn set_member_archived(&self, id: MemberId, archived: bool) -> RepoResult<()>;
    /// Sets or clears the dojo reference.
    fn assign_member_dojo(&self, id: MemberId, dojo_id: Option<DojoId>) -> RepoResult<()>;
}

impl MemberRepository for SqliteDojoRepository<'_> {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        self.conn.execute(
            "INSERT INTO members (
                uuid,
                name,
                dojo_uuid,
                is_guest,
                is_archived,
                created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6);",
            params![
                member.id.to_string(),
                member.name.as_str(),
                member.dojo_id.map(|value| value.to_string()),
                bool_to_int(member.is_guest),
                bool_to_int(member.archived),
                member.created_at,
            ],
        )?;
        Ok(member.id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        let mut stmt = self
            .conn
            .prepare(&format!("{MEMBER_SELECT_SQL} WHERE uuid = ?1;"))?;
        let mut rows = stmt.query([id.to_string()])?;
        if let Some(row) = rows.next()? {
            return Ok(Some(parse_member_row(row)?));
        }
        Ok(None)
    }

    fn list_members_by_dojo(&self, dojo_id: DojoId) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE dojo_uuid = ?1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([dojo_id.to_string()])?;

        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn list_guests(&self) -> RepoResult<Vec<Member>> {
        let mut stmt = self.conn.prepare(&format!(
            "{MEMBER_SELECT_SQL} WHERE is_guest = 1 ORDER BY seq ASC;"
        ))?;
        let mut rows = stmt.query([])?;

        let mut members = Vec::new();
        while let Some(row) = rows.next()? {
            members.push(parse_member_row(row)?);
        }
        Ok(members)
    }

    fn set_member_archived(&self, id: MemberId, archived: bool) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET is_archived = ?2 WHERE uuid = ?1;",
            params![id.to_string(), bool_to_int(archived)],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        Ok(())
    }

    fn assign_member_dojo(&self, id: MemberId, dojo_id: Option<DojoId>) -> RepoResult<()> {
        let changed = self.conn.execute(
            "UPDATE members SET dojo_uuid = ?2 WHERE uuid = ?1;",
            params![id.to_string(), dojo_id.map(|value| value.to_string())],
        )?;
        if changed == 0 {
            return Err(RepoError::MemberNotFound(id));
        }
        Ok(())
    }
}

fn parse_member_row(row: &Row<'_>) -> RepoResult<Member> {
    let uuid_text: String = row.get("uuid")?;
    let dojo_id = match row.get::<_, Option<String>>("dojo_uuid")? {
        Some(value) => Some(parse_uuid(&value, "members.dojo_uuid")?),
        None => None,
    };

    Ok(Member {
        id: parse_uuid(&uuid_text, "members.uuid")?,
        name: row.get("name")?,
        dojo_id,
        is_guest: int_to_bool(row.get("is_guest")?, "members.is_guest")?,
        archived: int_to_bool(row.get("is_archived")?, "members.is_archived")?,
        created_at: row.get("created_at")?,
    })
}
