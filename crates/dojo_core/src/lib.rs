//! Core domain logic for the dojo registry.
//! This crate is the single source of truth for dojo/member invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::dojo::{Dojo, DojoId};
pub use model::member::{Member, MemberId};
pub use repo::dojo_repo::{DojoRepository, RepoError, RepoResult, SqliteDojoRepository};
pub use repo::member_repo::MemberRepository;
pub use repo::memory_repo::MemoryDojoRepository;
pub use service::dojo_service::{ClearAllResult, DojoService, GuestCounts, UNASSIGNED_KEY};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
