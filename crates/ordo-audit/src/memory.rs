//! In-memory implementation of `AuditSink`.
//!
//! `InMemoryAuditTrail` keeps every event in a `Vec` behind a `Mutex`, so one
//! trail can be shared by the agent and the policy engine across tasks.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::Utc;
use tracing::debug;

use ordo_contracts::{
    audit::AuditEntry,
    error::{OrdoError, OrdoResult},
};
use ordo_core::traits::AuditSink;

use crate::{
    chain::{hash_event, verify_chain},
    event::{AuditEvent, AuditLog},
};

// ── Internal mutable state ────────────────────────────────────────────────────

pub(crate) struct InMemoryState {
    /// All events written so far, in append order.
    pub(crate) events: Vec<AuditEvent>,

    /// The next sequence number to assign.
    pub(crate) sequence: u64,

    /// `this_hash` of the last event, or `GENESIS_HASH` when empty.
    pub(crate) last_hash: String,
}

// ── Public trail ──────────────────────────────────────────────────────────────

/// An append-only audit trail backed by a SHA-256 hash chain.
///
/// Cloning is cheap and every clone appends to the same chain.
#[derive(Clone)]
pub struct InMemoryAuditTrail {
    pub(crate) state: Arc<Mutex<InMemoryState>>,
}

impl Default for InMemoryAuditTrail {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAuditTrail {
    pub fn new() -> Self {
        let state = InMemoryState {
            events: Vec::new(),
            sequence: 0,
            last_hash: AuditEvent::GENESIS_HASH.to_string(),
        };
        Self {
            state: Arc::new(Mutex::new(state)),
        }
    }

    // Appends never leave a half-written event, so a poisoned lock still
    // guards a consistent chain.
    fn read(&self) -> MutexGuard<'_, InMemoryState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Every recorded entry, oldest first.
    pub fn entries(&self) -> Vec<AuditEntry> {
        self.read().events.iter().map(|e| e.entry.clone()).collect()
    }

    /// Entries recorded against `user_id`, oldest first.
    pub fn entries_for_user(&self, user_id: &str) -> Vec<AuditEntry> {
        self.read()
            .events
            .iter()
            .filter(|e| e.entry.user_id == user_id)
            .map(|e| e.entry.clone())
            .collect()
    }

    /// Policy-violation entries only.
    pub fn violations(&self) -> Vec<AuditEntry> {
        self.read()
            .events
            .iter()
            .filter(|e| e.entry.policy_violation)
            .map(|e| e.entry.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.read().events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Export a snapshot of the chain.
    ///
    /// `terminal_hash` is the last event's `this_hash`, or empty when no
    /// events have been recorded.
    pub fn export_log(&self) -> AuditLog {
        let state = self.read();
        let terminal_hash = state
            .events
            .last()
            .map(|e| e.this_hash.clone())
            .unwrap_or_default();

        AuditLog {
            events: state.events.clone(),
            exported_at: Utc::now(),
            terminal_hash,
        }
    }

    /// Verify that the in-memory chain has not been tampered with.
    pub fn verify_integrity(&self) -> bool {
        verify_chain(&self.read().events)
    }
}

// ── AuditSink impl ────────────────────────────────────────────────────────────

impl AuditSink for InMemoryAuditTrail {
    /// Append one entry to the hash chain.
    ///
    /// Fails with `AuditWriteFailed` if the lock is poisoned or the entry
    /// cannot be hashed; the chain is left unchanged in both cases.
    fn record(&self, entry: &AuditEntry) -> OrdoResult<()> {
        let mut state = self.state.lock().map_err(|e| OrdoError::AuditWriteFailed {
            reason: format!("audit state lock poisoned: {}", e),
        })?;

        let prev_hash = state.last_hash.clone();
        let sequence = state.sequence;

        let this_hash = hash_event(sequence, entry, &prev_hash).map_err(|e| {
            OrdoError::AuditWriteFailed {
                reason: format!("failed to hash audit entry: {}", e),
            }
        })?;

        debug!(
            sequence,
            user_id = %entry.user_id,
            action = %entry.action,
            policy_violation = entry.policy_violation,
            "audit entry recorded"
        );

        state.events.push(AuditEvent {
            sequence,
            entry: entry.clone(),
            prev_hash,
            this_hash: this_hash.clone(),
        });
        state.sequence += 1;
        state.last_hash = this_hash;

        Ok(())
    }
}
