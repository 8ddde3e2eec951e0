//! Member domain model.
//!
//! Only the fields that matter for dojo integration are modeled here.
//!
//! # Invariants
//! - `dojo_id = None` means "unassigned".
//! - `dojo_id` is a weak reference and may dangle after a bulk dojo reset.

use super::dojo::DojoId;
use super::now_epoch_ms;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Stable identifier of a member record.
pub type MemberId = Uuid;

/// Person record that may belong to one dojo.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Member {
    pub id: MemberId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dojo_id: Option<DojoId>,
    /// Guests are the sub-category reported by guest counts.
    pub is_guest: bool,
    /// Archived members are excluded from active counts.
    pub archived: bool,
    pub created_at: i64,
}

impl Member {
    /// Creates an active member with a generated ID.
    pub fn new(name: impl Into<String>, dojo_id: Option<DojoId>, is_guest: bool) -> Self {
        Self {
            id: Uuid::new_v4(),
            name: name.into(),
            dojo_id,
            is_guest,
            archived: false,
            created_at: now_epoch_ms(),
        }
    }

    /// Creates an active guest member.
    pub fn guest(name: impl Into<String>, dojo_id: Option<DojoId>) -> Self {
        Self::new(name, dojo_id, true)
    }

    /// Returns whether this member counts toward active guest totals.
    pub fn is_active_guest(&self) -> bool {
        self.is_guest && !self.archived
    }
}
