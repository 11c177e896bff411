//! The solver service: scheduling driver and event ingestion boundary.
//!
//! One solver owns one [`MatchTracker`] and drives matching passes on a
//! fixed interval or on offer-arrival wakeups. Passes run inline in the
//! loop, so two passes can never overlap and an offer can never be
//! double-consumed. Cancellation is cooperative: the shutdown signal is
//! honored between passes, never mid-pass.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parking_lot::Mutex;
use tokio::sync::{broadcast, Notify};
use tokio::time::interval;
use tracing::{debug, error, info, warn};

use hermit_data::Deal;
use hermit_store::OfferStore;

use crate::config::{ConfirmPolicy, SolverConfig};
use crate::engine::run_pass;
use crate::error::SolverError;
use crate::events;
use crate::lifecycle::MatchTracker;
use crate::resolver::ModuleResolver;
use crate::sink::DealSink;

/// The matching core of the marketplace.
pub struct Solver<R> {
    store: Arc<OfferStore>,
    resolver: R,
    sink: Arc<dyn DealSink>,
    tracker: Mutex<MatchTracker>,
    config: SolverConfig,
    wake: Notify,
}

impl<R: ModuleResolver> Solver<R> {
    /// Creates a solver over the given store, resolver and sink.
    pub fn new(
        store: Arc<OfferStore>,
        resolver: R,
        sink: Arc<dyn DealSink>,
        config: SolverConfig,
    ) -> Self {
        Self {
            store,
            resolver,
            sink,
            tracker: Mutex::new(MatchTracker::new()),
            config,
            wake: Notify::new(),
        }
    }

    /// The offer store this solver matches over.
    #[must_use]
    pub fn store(&self) -> &OfferStore {
        &self.store
    }

    /// Wakes the service loop for an immediate pass; the submission API
    /// calls this after adding an offer.
    pub fn notify_offer(&self) {
        self.wake.notify_one();
    }

    /// Runs one matching pass over the current open, unreserved offers.
    ///
    /// Returns the number of matches proposed. Under
    /// [`ConfirmPolicy::Auto`] each proposal is confirmed into a deal
    /// immediately; under [`ConfirmPolicy::External`] proposals wait for
    /// settlement events.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError`] on an invariant violation; the pass is
    /// aborted and the store left unchanged.
    pub fn run_matching_pass(&self) -> Result<usize, SolverError> {
        let (jobs, resources) = {
            let tracker = self.tracker.lock();
            let jobs: Vec<_> = self
                .store
                .job_offers(None)
                .into_iter()
                .filter(|offer| !tracker.job_reserved(&offer.id))
                .collect();
            let resources: Vec<_> = self
                .store
                .resource_offers(None)
                .into_iter()
                .filter(|offer| !tracker.resource_reserved(&offer.id))
                .collect();
            (jobs, resources)
        };

        let outcome = run_pass(&jobs, &resources, &self.resolver, self.config.match_timeout_secs)?;
        let proposed = outcome.matches.len();
        let now = Utc::now();

        for candidate in outcome.matches {
            candidate.proposal.validate()?;
            let match_id = candidate.proposal.id.clone();
            self.sink.on_match(&candidate.proposal);
            self.tracker.lock().propose(candidate, now);

            if self.config.confirm_policy == ConfirmPolicy::Auto {
                self.confirm_match(&match_id)?;
            }
        }

        if proposed > 0 {
            info!(proposed, "matching pass complete");
        }
        Ok(proposed)
    }

    /// Confirms a proposed match, creating the deal and consuming both
    /// source offers.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MatchNotFound`] or
    /// [`SolverError::InvalidStateTransition`] for unknown or already
    /// settled matches, and [`SolverError::Inconsistent`] if either
    /// offer is no longer in the store; in that case the proposal is
    /// dropped and the store left unchanged.
    pub fn confirm_match(&self, match_id: &str) -> Result<Deal, SolverError> {
        let mut tracker = self.tracker.lock();
        let (job_id, resource_id) = tracker
            .offer_ids(match_id)
            .ok_or_else(|| SolverError::MatchNotFound(match_id.to_string()))?;

        // Verify both offers are still present before mutating anything.
        if self.store.job_offer(&job_id).is_none() {
            tracker.release_offer(&job_id);
            error!(matched = %match_id, offer = %job_id, "job offer vanished under proposal");
            return Err(SolverError::Inconsistent(format!(
                "job offer {job_id} missing for match {match_id}"
            )));
        }
        if self.store.resource_offer(&resource_id).is_none() {
            tracker.release_offer(&resource_id);
            error!(matched = %match_id, offer = %resource_id, "resource offer vanished under proposal");
            return Err(SolverError::Inconsistent(format!(
                "resource offer {resource_id} missing for match {match_id}"
            )));
        }

        let deal = tracker.confirm(match_id)?;
        self.store.remove_job_offer(&job_id);
        self.store.remove_resource_offer(&resource_id);
        tracker.close(match_id)?;
        self.sink.on_deal(&deal);
        Ok(deal)
    }

    /// Rejects a proposed match, releasing both offers back to matching.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MatchNotFound`] or
    /// [`SolverError::InvalidStateTransition`].
    pub fn reject_match(&self, match_id: &str) -> Result<(), SolverError> {
        self.tracker.lock().reject(match_id)
    }

    /// Expires proposals whose deadline has passed as of `now`,
    /// returning both offers of each to the matchable set unchanged.
    pub fn expire_due_at(&self, now: DateTime<Utc>) -> Vec<String> {
        self.tracker.lock().expire_due(now)
    }

    /// Handles an event from the external ledger watcher.
    ///
    /// Known kinds map to store and lifecycle effects; unknown kinds are
    /// ignored without failing.
    pub fn on_settlement_event(&self, kind: &str, payload: &serde_json::Value) {
        match kind {
            events::TRANSFER_CONFIRMED => {
                // Settlement itself is external; the transfer carries no
                // store effect here.
                debug!(?payload, "transfer confirmed");
            }
            events::JOB_OFFER_WITHDRAWN => {
                let Some(id) = events::payload_id(payload) else {
                    warn!(kind, "settlement event without offer id");
                    return;
                };
                self.tracker.lock().release_offer(id);
                self.store.remove_job_offer(id);
            }
            events::RESOURCE_OFFER_WITHDRAWN => {
                let Some(id) = events::payload_id(payload) else {
                    warn!(kind, "settlement event without offer id");
                    return;
                };
                self.tracker.lock().release_offer(id);
                self.store.remove_resource_offer(id);
            }
            events::MATCH_CONFIRMED => {
                let Some(id) = events::payload_id(payload) else {
                    warn!(kind, "settlement event without match id");
                    return;
                };
                if let Err(e) = self.confirm_match(id) {
                    warn!(matched = %id, error = %e, "could not confirm match");
                }
            }
            events::MATCH_REJECTED => {
                let Some(id) = events::payload_id(payload) else {
                    warn!(kind, "settlement event without match id");
                    return;
                };
                if let Err(e) = self.reject_match(id) {
                    warn!(matched = %id, error = %e, "could not reject match");
                }
            }
            other => {
                debug!(kind = other, "ignoring unknown settlement event");
            }
        }
    }

    /// Runs the service loop until the shutdown signal fires.
    ///
    /// Each wakeup expires due proposals and runs at most one matching
    /// pass; passes never overlap.
    pub async fn run(&self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = interval(self.config.pass_interval);

        info!(
            interval_ms = self.config.pass_interval.as_millis() as u64,
            policy = ?self.config.confirm_policy,
            "starting solver loop"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => self.drive(),
                () = self.wake.notified() => self.drive(),
                _ = shutdown.recv() => {
                    info!("solver loop shutting down");
                    break;
                }
            }
        }
    }

    fn drive(&self) {
        self.expire_due_at(Utc::now());
        if let Err(e) = self.run_matching_pass() {
            error!(error = %e, "matching pass aborted");
        }
    }
}
