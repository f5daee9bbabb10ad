//! # ordo-audit
//!
//! Append-only, SHA-256 hash-chained audit trail for the Ordo assistant.
//!
//! ## Overview
//!
//! Every tool invocation and every policy violation is recorded as an
//! `AuditEntry`, wrapped in an `AuditEvent` that links to the previous event
//! via its SHA-256 hash. Changing any recorded byte breaks the chain, which
//! `verify_chain` detects.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ordo_audit::InMemoryAuditTrail;
//!
//! let trail = Arc::new(InMemoryAuditTrail::new());
//! let agent = OrdoAgent::new(filter, tools).with_audit(trail.clone());
//! // ...
//! assert!(trail.verify_integrity());
//! let log = trail.export_log();
//! ```

pub mod chain;
pub mod event;
pub mod memory;

pub use chain::{hash_event, verify_chain};
pub use event::{AuditEvent, AuditLog};
pub use memory::InMemoryAuditTrail;

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use serde_json::json;

    use ordo_contracts::{audit::AuditEntry, permission::Surface};
    use ordo_core::traits::AuditSink;

    use super::{AuditEvent, InMemoryAuditTrail};

    // ── Helpers ───────────────────────────────────────────────────────────────

    fn tool_entry(user: &str, tool: &str) -> AuditEntry {
        AuditEntry::tool_invocation(user, Surface::from_tool(tool), true, json!({ "tool": tool }))
    }

    fn violation(user: &str) -> AuditEntry {
        AuditEntry::policy_violation(
            user,
            Surface::Gmail,
            &["OTP_CODE".to_string(), "VERIFICATION_CODE".to_string()],
            json!({ "entry_id": "m2" }),
        )
    }

    fn trail_with_three() -> InMemoryAuditTrail {
        let trail = InMemoryAuditTrail::new();
        trail.record(&tool_entry("alice", "get_wallet_portfolio")).unwrap();
        trail.record(&violation("bob")).unwrap();
        trail.record(&tool_entry("alice", "get_email_content")).unwrap();
        trail
    }

    // ── Tests ─────────────────────────────────────────────────────────────────

    #[test]
    fn test_hash_chain_integrity() {
        assert!(trail_with_three().verify_integrity());
    }

    /// Mutating any stored entry breaks the chain.
    #[test]
    fn test_tamper_detection() {
        let trail = trail_with_three();

        {
            let mut state = trail.state.lock().unwrap();
            state.events[1].entry.policy_violation = false;
        }

        assert!(!trail.verify_integrity(), "chain must detect tampering with a stored event");
    }

    #[test]
    fn test_reordering_is_detected() {
        let trail = trail_with_three();

        {
            let mut state = trail.state.lock().unwrap();
            state.events.swap(0, 2);
        }

        assert!(!trail.verify_integrity());
    }

    #[test]
    fn test_genesis_hash() {
        let trail = InMemoryAuditTrail::new();
        trail.record(&tool_entry("alice", "search_web")).unwrap();

        let log = trail.export_log();
        assert_eq!(log.events.len(), 1);
        assert_eq!(log.events[0].prev_hash, AuditEvent::GENESIS_HASH);
    }

    #[test]
    fn test_sequence_monotonic() {
        let log = trail_with_three().export_log();
        for (idx, event) in log.events.iter().enumerate() {
            assert_eq!(event.sequence, idx as u64);
        }
    }

    #[test]
    fn test_export_log() {
        let log = trail_with_three().export_log();

        assert_eq!(log.events.len(), 3);
        assert_eq!(log.terminal_hash, log.events.last().unwrap().this_hash);
        assert!(super::verify_chain(&log.events), "exported log must pass chain verification");
    }

    #[test]
    fn test_entries_for_user_and_violations() {
        let trail = trail_with_three();

        let alice = trail.entries_for_user("alice");
        assert_eq!(alice.len(), 2);
        assert!(alice.iter().all(|e| e.action == "execute_tool"));

        let violations = trail.violations();
        assert_eq!(violations.len(), 1);
        assert_eq!(violations[0].user_id, "bob");
        assert_eq!(violations[0].blocked_pattern.as_deref(), Some("OTP_CODE,VERIFICATION_CODE"));

        assert_eq!(trail.entries().len(), 3);
    }

    #[test]
    fn test_clones_share_one_chain() {
        let trail = InMemoryAuditTrail::new();
        let clone = trail.clone();
        trail.record(&tool_entry("alice", "get_x_dms")).unwrap();
        clone.record(&tool_entry("alice", "get_telegram_messages")).unwrap();

        assert_eq!(trail.len(), 2);
        assert!(clone.verify_integrity());
    }

    #[test]
    fn test_verify_empty() {
        let trail = InMemoryAuditTrail::new();
        assert!(trail.is_empty());
        assert!(trail.verify_integrity());
        assert!(trail.export_log().terminal_hash.is_empty());
        assert!(super::verify_chain(&[]));
    }
}
