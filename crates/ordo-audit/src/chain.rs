//! Hash-chain primitives: hashing and chain integrity verification.
//!
//! Hash input layout (bytes, in order):
//!   1. sequence as 8-byte little-endian
//!   2. prev_hash as UTF-8 bytes (64 ASCII hex chars)
//!   3. canonical JSON of the entry (serde_json, no pretty-printing)

use sha2::{Digest, Sha256};

use ordo_contracts::{audit::AuditEntry, error::OrdoResult};

use crate::event::AuditEvent;

/// Compute the SHA-256 hash for one audit event.
///
/// Returns a lowercase 64-character hex string, or
/// `OrdoError::Serialization` if `entry` cannot be encoded.
pub fn hash_event(sequence: u64, entry: &AuditEntry, prev_hash: &str) -> OrdoResult<String> {
    let entry_json = serde_json::to_vec(entry)?;

    let mut hasher = Sha256::new();
    hasher.update(sequence.to_le_bytes());
    hasher.update(prev_hash.as_bytes());
    hasher.update(&entry_json);

    Ok(hex::encode(hasher.finalize()))
}

/// Verify the integrity of a hash chain.
///
/// Valid when every event's `prev_hash` is the previous event's `this_hash`
/// (`GENESIS_HASH` for event 0), every `this_hash` matches the recomputed
/// value, and sequence numbers run 0, 1, 2, ... An empty chain is valid.
pub fn verify_chain(events: &[AuditEvent]) -> bool {
    let mut expected_prev: &str = AuditEvent::GENESIS_HASH;

    for (idx, event) in events.iter().enumerate() {
        if event.sequence != idx as u64 || event.prev_hash != expected_prev {
            return false;
        }

        match hash_event(event.sequence, &event.entry, &event.prev_hash) {
            Ok(recomputed) if recomputed == event.this_hash => {}
            _ => return false,
        }

        expected_prev = event.this_hash.as_str();
    }

    true
}
