//! Repository layer abstractions and persistence implementations.
//!
//! # Responsibility
//! - Define data access contracts for content items.
//! - Isolate SQLite query details from lifecycle orchestration.
//!
//! # Invariants
//! - Repository writes enforce `ContentItem::validate()` before persistence.
//! - Repository APIs return semantic errors (`NotFound`, `KindImmutable`) in
//!   addition to DB transport errors.

pub mod content_repo;
