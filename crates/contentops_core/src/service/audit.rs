//! Audit sink contract for lifecycle mutations.
//!
//! # Invariants
//! - Sinks are fire-and-forget: a failing sink never fails the mutation.
//! - Events carry identifiers and states only, never user text.

use crate::model::item::ContentItemId;
use crate::model::kind::{ContentKind, ContentStatus};
use log::info;
use serde::Serialize;
use std::fmt::{Display, Formatter};

/// Mutation that produced an audit event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditAction {
    Create,
    Update,
    Transition,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Update => "update",
            Self::Transition => "transition",
        }
    }
}

impl Display for AuditAction {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One successful lifecycle mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditEvent {
    pub action: AuditAction,
    pub item_id: ContentItemId,
    pub kind: ContentKind,
    pub status: ContentStatus,
    /// Status before a transition; `None` for create and update.
    pub previous_status: Option<ContentStatus>,
    pub at_ms: i64,
}

/// Receives audit events after successful mutations.
pub trait AuditSink {
    fn record(&self, event: &AuditEvent);
}

impl<T: AuditSink + ?Sized> AuditSink for &T {
    fn record(&self, event: &AuditEvent) {
        (**self).record(event);
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopAuditSink;

impl AuditSink for NoopAuditSink {
    fn record(&self, _event: &AuditEvent) {}
}

/// Writes events through the `log` facade.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogAuditSink;

impl AuditSink for LogAuditSink {
    fn record(&self, event: &AuditEvent) {
        let previous = event.previous_status.map_or("none", ContentStatus::as_str);
        info!(
            "event=content_audit module=audit action={} item_id={} kind={} status={} previous_status={} at_ms={}",
            event.action, event.item_id, event.kind, event.status, previous, event.at_ms
        );
    }
}
