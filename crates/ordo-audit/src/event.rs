//! Audit event and log types.
//!
//! `AuditEvent` is one link in the hash chain: an `AuditEntry` plus its
//! position and the SHA-256 hashes that make tampering detectable.
//! `AuditLog` is the snapshot produced by `export_log`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use ordo_contracts::audit::AuditEntry;

/// A single entry in the SHA-256 hash chain.
///
/// Modifying any field, including those of the embedded `entry`, invalidates
/// `this_hash` and every later `prev_hash`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEvent {
    /// Position in the chain, starting at 0.
    pub sequence: u64,

    pub entry: AuditEntry,

    /// Hash (hex) of the previous event, or `GENESIS_HASH` for the first.
    pub prev_hash: String,

    /// Hash (hex) over (sequence, prev_hash, canonical JSON of entry).
    pub this_hash: String,
}

impl AuditEvent {
    /// The `prev_hash` of the first event in every chain.
    pub const GENESIS_HASH: &'static str =
        "0000000000000000000000000000000000000000000000000000000000000000";
}

/// An exported copy of the audit trail.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditLog {
    /// All events in chain order (sequence 0 first).
    pub events: Vec<AuditEvent>,

    pub exported_at: DateTime<Utc>,

    /// The `this_hash` of the last event. Empty if the log is empty.
    pub terminal_hash: String,
}
