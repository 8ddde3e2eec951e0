//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into use-case level APIs.
//! - Keep endpoint/CLI layers decoupled from storage details.

pub mod dojo_service;
