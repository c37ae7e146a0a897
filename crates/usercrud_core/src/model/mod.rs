//! Domain model for the user directory.
//!
//! # Responsibility
//! - Define the canonical user record and write requests.
//!
//! # Invariants
//! - Users are identified by a store-assigned integer id.
//! - Deletion is a hard delete; there are no tombstones.

pub mod user;
