//! Core use-case services.
//!
//! # Responsibility
//! - Orchestrate repository calls into directory, ledger and session APIs.
//! - Keep the CLI decoupled from storage details.
//!
//! # Invariants
//! - Services hold no authoritative state; every call re-reads the store.
//! - Destructive calls (`delete`, `clear_all`, `reset_student`) run
//!   unconditionally; confirmation belongs to the caller.

pub mod directory;
pub mod ledger;
pub mod session;
