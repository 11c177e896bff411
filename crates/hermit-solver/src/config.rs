//! Solver configuration.

use std::net::SocketAddr;
use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Whether proposed matches need an external confirmation signal.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum ConfirmPolicy {
    /// Promote every proposal to a deal immediately.
    #[default]
    Auto,
    /// Wait for `match_confirmed` / `match_rejected` settlement events;
    /// unconfirmed proposals expire after their timeout.
    External,
}

/// Configuration for the solver service loop.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolverConfig {
    /// Interval between matching passes.
    pub pass_interval: Duration,
    /// Seconds a proposed match stays open for confirmation.
    pub match_timeout_secs: u64,
    /// Confirmation policy for proposed matches.
    pub confirm_policy: ConfirmPolicy,
    /// Listen address for the submission/query API layer (carried here
    /// for the surrounding server; no core behavior depends on it).
    pub listen_addr: SocketAddr,
}

impl Default for SolverConfig {
    fn default() -> Self {
        Self {
            pass_interval: Duration::from_secs(1),
            match_timeout_secs: 60,
            confirm_policy: ConfirmPolicy::default(),
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 8080)),
        }
    }
}
