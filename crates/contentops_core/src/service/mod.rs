//! Content lifecycle services.
//!
//! # Responsibility
//! - Orchestrate validators and repository calls into intake, update and
//!   promotion use-cases.
//! - Keep CLI and other callers decoupled from storage details.

pub mod audit;
pub mod content_service;
