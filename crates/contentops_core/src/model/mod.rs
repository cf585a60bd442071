//! Domain model for typed content intake.
//!
//! # Responsibility
//! - Define the content aggregate, its kind-specific payloads and the
//!   validation result contract.
//!
//! # Invariants
//! - Every content item is identified by a stable `ContentItemId`.
//! - Items are never hard-deleted; retirement uses `Archived`/`Rejected`.

pub mod issue;
pub mod item;
pub mod kind;
pub mod payload;
