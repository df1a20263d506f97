//! Free-text student lookup.
//!
//! # Responsibility
//! - Resolve search text (id, name fragment, or `Name - id` label) to one
//!   student record.
//! - Produce the autocomplete labels that resolve back to their record.

pub mod resolver;
