//! In-memory dojo/member repository.
//!
//! Implements the same contracts as the SQLite repository over plain
//! vectors, for tests and for callers that do not need a database file.
//!
//! # Invariants
//! - Vector order is insertion order.
//! - `remove_dojo` runs both phases under one mutable borrow, so no caller
//!   can observe a detached-but-not-deleted state.
//! - Not `Sync`; one instance belongs to one thread.

use super::dojo_repo::{DojoRepository, RepoError, RepoResult};
use super::member_repo::MemberRepository;
use crate::model::dojo::{Dojo, DojoId};
use crate::model::member::{Member, MemberId};
use std::cell::RefCell;

#[derive(Debug, Default)]
struct MemoryState {
    dojos: Vec<Dojo>,
    members: Vec<Member>,
}

/// Vector-backed repository with no persistence.
#[derive(Debug, Default)]
pub struct MemoryDojoRepository {
    state: RefCell<MemoryState>,
}

impl MemoryDojoRepository {
    pub fn new() -> Self {
        Self::default()
    }
}

impl DojoRepository for MemoryDojoRepository {
    fn list_dojos(&self) -> RepoResult<Vec<Dojo>> {
        Ok(self.state.borrow().dojos.clone())
    }

    fn get_dojo(&self, id: DojoId) -> RepoResult<Option<Dojo>> {
        Ok(self
            .state
            .borrow()
            .dojos
            .iter()
            .find(|dojo| dojo.id == id)
            .cloned())
    }

    fn create_dojo(&self, dojo: &Dojo) -> RepoResult<DojoId> {
        let mut state = self.state.borrow_mut();
        if state.dojos.iter().any(|existing| existing.id == dojo.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate dojo id `{}`",
                dojo.id
            )));
        }
        state.dojos.push(dojo.clone());
        Ok(dojo.id)
    }

    fn update_dojo(&self, id: DojoId, name: &str, location: Option<&str>) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let dojo = state
            .dojos
            .iter_mut()
            .find(|dojo| dojo.id == id)
            .ok_or(RepoError::DojoNotFound(id))?;
        dojo.name = name.to_string();
        dojo.location = location.map(str::to_string);
        Ok(())
    }

    fn remove_dojo(&self, id: DojoId) -> RepoResult<usize> {
        let mut state = self.state.borrow_mut();
        let position = state
            .dojos
            .iter()
            .position(|dojo| dojo.id == id)
            .ok_or(RepoError::DojoNotFound(id))?;

        let mut detached = 0;
        for member in state
            .members
            .iter_mut()
            .filter(|member| member.dojo_id == Some(id))
        {
            member.dojo_id = None;
            detached += 1;
        }

        state.dojos.remove(position);
        Ok(detached)
    }

    fn clear_dojos(&self) -> RepoResult<usize> {
        let mut state = self.state.borrow_mut();
        let deleted = state.dojos.len();
        state.dojos.clear();
        Ok(deleted)
    }
}

impl MemberRepository for MemoryDojoRepository {
    fn create_member(&self, member: &Member) -> RepoResult<MemberId> {
        let mut state = self.state.borrow_mut();
        if state.members.iter().any(|existing| existing.id == member.id) {
            return Err(RepoError::InvalidData(format!(
                "duplicate member id `{}`",
                member.id
            )));
        }
        state.members.push(member.clone());
        Ok(member.id)
    }

    fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        Ok(self
            .state
            .borrow()
            .members
            .iter()
            .find(|member| member.id == id)
            .cloned())
    }

    fn list_members_by_dojo(&self, dojo_id: DojoId) -> RepoResult<Vec<Member>> {
        Ok(self
            .state
            .borrow()
            .members
            .iter()
            .filter(|member| member.dojo_id == Some(dojo_id))
            .cloned()
            .collect())
    }

    fn list_guests(&self) -> RepoResult<Vec<Member>> {
        Ok(self
            .state
            .borrow()
            .members
            .iter()
            .filter(|member| member.is_guest)
            .cloned()
            .collect())
    }

    fn set_member_archived(&self, id: MemberId, archived: bool) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let member = state
            .members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or(RepoError::MemberNotFound(id))?;
        member.archived = archived;
        Ok(())
    }

    fn assign_member_dojo(&self, id: MemberId, dojo_id: Option<DojoId>) -> RepoResult<()> {
        let mut state = self.state.borrow_mut();
        let member = state
            .members
            .iter_mut()
            .find(|member| member.id == id)
            .ok_or(RepoError::MemberNotFound(id))?;
        member.dojo_id = dojo_id;
        Ok(())
    }
}
