//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for dojos and members.
//! - Isolate SQLite query details from service orchestration.
//! - Provide an in-memory implementation of the same contracts.
//!
//! # Invariants
//! - Repositories are constructed with an explicit store handle; nothing
//!   reaches storage through ambient global state.
//! - Repository APIs return semantic errors (`DojoNotFound`,
//!   `MemberNotFound`) in addition to DB transport errors.

pub mod dojo_repo;
pub mod member_repo;
pub mod memory_repo;
