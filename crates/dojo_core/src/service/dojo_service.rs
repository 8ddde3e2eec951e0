//! Dojo use-case service.
//!
//! # Responsibility
//! - Provide the dojo operations called by the endpoint layer.
//! - Compute guest counts from repository scans.
//! - Emit metadata-only mutation events (ids and counts, never names).
//!
//! # Invariants
//! - `remove` never leaves a member referencing the removed dojo.
//! - `clear_all` does not detach members; stale references may remain.
//! - Service layer remains storage-agnostic.

use crate::model::dojo::{Dojo, DojoId};
use crate::model::member::{Member, MemberId};
use crate::repo::dojo_repo::{DojoRepository, RepoResult};
use crate::repo::member_repo::MemberRepository;
use log::{debug, info, warn};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

/// Key used for guests that have no dojo assigned.
pub const UNASSIGNED_KEY: &str = "none";

/// Active guest totals keyed by stringified dojo id, plus `"none"`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct GuestCounts(BTreeMap<String, u64>);

impl GuestCounts {
    /// Count for one dojo; `None` when the dojo was not present in the scan.
    pub fn for_dojo(&self, id: DojoId) -> Option<u64> {
        self.0.get(&id.to_string()).copied()
    }

    /// Count of active guests without a dojo.
    pub fn unassigned(&self) -> u64 {
        self.0.get(UNASSIGNED_KEY).copied().unwrap_or(0)
    }

    /// Number of keys, including `"none"`.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn as_map(&self) -> &BTreeMap<String, u64> {
        &self.0
    }
}

/// Result of a bulk dojo reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ClearAllResult {
    pub deleted: usize,
}

/// Use-case service wrapper over a dojo/member repository.
pub struct DojoService<R> {
    repo: R,
}

impl<R: DojoRepository + MemberRepository> DojoService<R> {
    /// Creates a service using the provided repository implementation.
    pub fn new(repo: R) -> Self {
        Self { repo }
    }

    /// Lists all dojos in insertion order.
    pub fn list(&self) -> RepoResult<Vec<Dojo>> {
        self.repo.list_dojos()
    }

    /// Gets one dojo; a missing id is `Ok(None)`.
    pub fn get(&self, id: DojoId) -> RepoResult<Option<Dojo>> {
        self.repo.get_dojo(id)
    }

    /// Creates a dojo stamped with the current time and returns its id.
    ///
    /// Names are neither validated nor required to be unique.
    pub fn create(&self, name: impl Into<String>, location: Option<String>) -> RepoResult<DojoId> {
        let dojo = Dojo::new(name, location);
        let id = self.repo.create_dojo(&dojo)?;
        info!("event=dojo_create module=service status=ok dojo_id={id}");
        Ok(id)
    }

    /// Overwrites name and location; `None` clears the location.
    pub fn update(&self, id: DojoId, name: &str, location: Option<&str>) -> RepoResult<()> {
        match self.repo.update_dojo(id, name, location) {
            Ok(()) => {
                info!("event=dojo_update module=service status=ok dojo_id={id}");
                Ok(())
            }
            Err(err) => {
                warn!("event=dojo_update module=service status=error dojo_id={id} error={err}");
                Err(err)
            }
        }
    }

    /// Detaches every member of the dojo, then deletes it.
    ///
    /// Returns the number of detached members. Re-running after success
    /// fails with `DojoNotFound` and changes nothing.
    pub fn remove(&self, id: DojoId) -> RepoResult<usize> {
        let started_at = Instant::now();
        match self.repo.remove_dojo(id) {
            Ok(detached) => {
                info!(
                    "event=dojo_remove module=service status=ok dojo_id={id} detached_members={detached} duration_ms={}",
                    started_at.elapsed().as_millis()
                );
                Ok(detached)
            }
            Err(err) => {
                warn!(
                    "event=dojo_remove module=service status=error dojo_id={id} duration_ms={} error={err}",
                    started_at.elapsed().as_millis()
                );
                Err(err)
            }
        }
    }

    /// Counts non-archived guests per dojo and without a dojo.
    ///
    /// Every existing dojo appears, with `0` when it has no guests. Guests
    /// pointing at a dojo that no longer exists are counted nowhere.
    pub fn guest_counts(&self) -> RepoResult<GuestCounts> {
        let dojos = self.repo.list_dojos()?;
        let guests = self.repo.list_guests()?;

        let mut counts = BTreeMap::new();
        for dojo in &dojos {
            let count = guests
                .iter()
                .filter(|guest| guest.dojo_id == Some(dojo.id) && !guest.archived)
                .count();
            counts.insert(dojo.id.to_string(), count as u64);
        }

        let unassigned = guests
            .iter()
            .filter(|guest| guest.dojo_id.is_none() && !guest.archived)
            .count();
        counts.insert(UNASSIGNED_KEY.to_string(), unassigned as u64);

        debug!(
            "event=guest_counts module=service status=ok dojos={} guests_scanned={}",
            dojos.len(),
            guests.len()
        );
        Ok(GuestCounts(counts))
    }

    /// Deletes every dojo without detaching members.
    ///
    /// This is a bulk reset; members keep whatever `dojo_id` they had.
    pub fn clear_all(&self) -> RepoResult<ClearAllResult> {
        let deleted = self.repo.clear_dojos()?;
        info!("event=dojo_clear_all module=service status=ok deleted={deleted}");
        Ok(ClearAllResult { deleted })
    }

    /// Creates a member, optionally assigned to a dojo.
    pub fn create_member(
        &self,
        name: impl Into<String>,
        dojo_id: Option<DojoId>,
        is_guest: bool,
    ) -> RepoResult<MemberId> {
        let member = Member::new(name, dojo_id, is_guest);
        self.repo.create_member(&member)
    }

    /// Gets one member; a missing id is `Ok(None)`.
    pub fn get_member(&self, id: MemberId) -> RepoResult<Option<Member>> {
        self.repo.get_member(id)
    }

    /// Lists members currently referencing the dojo.
    pub fn members_of(&self, dojo_id: DojoId) -> RepoResult<Vec<Member>> {
        self.repo.list_members_by_dojo(dojo_id)
    }

    /// Archives or restores a member.
    pub fn set_member_archived(&self, id: MemberId, archived: bool) -> RepoResult<()> {
        self.repo.set_member_archived(id, archived)
    }

    /// Moves a member to another dojo, or unassigns it with `None`.
    pub fn assign_member(&self, id: MemberId, dojo_id: Option<DojoId>) -> RepoResult<()> {
        self.repo.assign_member_dojo(id, dojo_id)
    }
}
