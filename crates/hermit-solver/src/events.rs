//! Settlement event kinds accepted at the ingestion boundary.
//!
//! An external ledger watcher invokes
//! [`crate::Solver::on_settlement_event`] with a kind string and a JSON
//! payload; the solver maps known kinds to store and lifecycle effects
//! and ignores everything else. The transport, retry and backoff policy
//! of the watcher are not the solver's concern.

use serde_json::Value;

/// An on-chain transfer was confirmed.
pub const TRANSFER_CONFIRMED: &str = "transfer_confirmed";

/// A job creator withdrew an open job offer.
pub const JOB_OFFER_WITHDRAWN: &str = "job_offer_withdrawn";

/// A resource provider withdrew an open resource offer.
pub const RESOURCE_OFFER_WITHDRAWN: &str = "resource_offer_withdrawn";

/// Both parties accepted a proposed match.
pub const MATCH_CONFIRMED: &str = "match_confirmed";

/// A party declined a proposed match.
pub const MATCH_REJECTED: &str = "match_rejected";

/// Extracts the `id` field every known payload carries.
#[must_use]
pub fn payload_id(payload: &Value) -> Option<&str> {
    payload.get("id").and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn id_extracted_from_payload() {
        assert_eq!(payload_id(&json!({"id": "abc"})), Some("abc"));
        assert_eq!(payload_id(&json!({"id": 7})), None);
        assert_eq!(payload_id(&json!({})), None);
    }
}
