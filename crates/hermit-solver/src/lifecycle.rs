//! Match confirmation state machine.
//!
//! A proposed match is a reservation, not a removal: both offers stay in
//! the store while the proposal is in flight, and the tracker merely
//! keeps them out of subsequent passes. Only a confirmed match consumes
//! its offers; rejection and expiry release them unchanged.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use hermit_data::{ContentAddressed, Deal};

use crate::engine::CandidateMatch;
use crate::error::SolverError;

/// The state of an in-flight match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchState {
    /// Created by the matching engine; the confirmation timer is running.
    Proposed,
    /// Accepted; deal creation is underway.
    Confirmed,
    /// Deal created and both source offers removed from the store.
    Closed,
    /// Timeout elapsed with no confirmation; offers released.
    Expired,
    /// Either party declined; offers released.
    Rejected,
}

impl MatchState {
    /// Checks if a transition to the target state is valid.
    #[must_use]
    pub const fn can_transition_to(&self, target: &Self) -> bool {
        use MatchState::{Closed, Confirmed, Expired, Proposed, Rejected};

        matches!(
            (self, target),
            (Proposed, Confirmed | Expired | Rejected) | (Confirmed, Closed)
        )
    }
}

impl std::fmt::Display for MatchState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Proposed => write!(f, "Proposed"),
            Self::Confirmed => write!(f, "Confirmed"),
            Self::Closed => write!(f, "Closed"),
            Self::Expired => write!(f, "Expired"),
            Self::Rejected => write!(f, "Rejected"),
        }
    }
}

/// A match the tracker is holding open.
#[derive(Debug, Clone)]
struct TrackedMatch {
    candidate: CandidateMatch,
    state: MatchState,
    deadline: DateTime<Utc>,
}

/// Holds in-flight match proposals and their offer reservations.
///
/// Not internally synchronized; the solver wraps it in its own lock.
#[derive(Debug, Default)]
pub struct MatchTracker {
    matches: HashMap<String, TrackedMatch>,
    reserved_jobs: HashSet<String>,
    reserved_resources: HashSet<String>,
}

impl MatchTracker {
    /// Creates an empty tracker.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a proposal and reserves both offers from matching.
    pub fn propose(&mut self, candidate: CandidateMatch, now: DateTime<Utc>) {
        let deadline = now + Duration::seconds(candidate.proposal.timeout as i64);
        self.reserved_jobs.insert(candidate.proposal.job_offer.clone());
        self.reserved_resources.insert(candidate.proposal.resource_offer.clone());
        debug!(matched = %candidate.proposal.id, %deadline, "tracking proposed match");
        self.matches.insert(
            candidate.proposal.id.clone(),
            TrackedMatch { candidate, state: MatchState::Proposed, deadline },
        );
    }

    /// True if the job offer is reserved by an in-flight proposal.
    #[must_use]
    pub fn job_reserved(&self, offer_id: &str) -> bool {
        self.reserved_jobs.contains(offer_id)
    }

    /// True if the resource offer is reserved by an in-flight proposal.
    #[must_use]
    pub fn resource_reserved(&self, offer_id: &str) -> bool {
        self.reserved_resources.contains(offer_id)
    }

    /// The state of a tracked match, if it is still in flight.
    #[must_use]
    pub fn state(&self, match_id: &str) -> Option<MatchState> {
        self.matches.get(match_id).map(|m| m.state)
    }

    /// Number of in-flight proposals.
    #[must_use]
    pub fn in_flight(&self) -> usize {
        self.matches.len()
    }

    /// The (job offer, resource offer) ids a tracked match pairs.
    #[must_use]
    pub fn offer_ids(&self, match_id: &str) -> Option<(String, String)> {
        self.matches.get(match_id).map(|m| {
            (
                m.candidate.proposal.job_offer.clone(),
                m.candidate.proposal.resource_offer.clone(),
            )
        })
    }

    /// Confirms a proposal and builds the deal it agreed on.
    ///
    /// The match stays tracked in `Confirmed` until [`Self::close`] is
    /// called once the store removals have succeeded.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MatchNotFound`] for an unknown id,
    /// [`SolverError::InvalidStateTransition`] if the match is not
    /// `Proposed`, or [`SolverError::Data`] if the deal id cannot be
    /// derived.
    pub fn confirm(&mut self, match_id: &str) -> Result<Deal, SolverError> {
        let tracked = self
            .matches
            .get_mut(match_id)
            .ok_or_else(|| SolverError::MatchNotFound(match_id.to_string()))?;
        transition(tracked, MatchState::Confirmed)?;

        let candidate = &tracked.candidate;
        let mut deal = Deal {
            id: String::new(),
            resource_provider: candidate.resource_offer.resource_provider.clone(),
            job_creator: candidate.job_offer.job_creator.clone(),
            job_offer: candidate.job_offer.clone(),
            resource_offer: candidate.resource_offer.clone(),
            pricing: candidate.pricing,
        };
        deal.stamp_id()?;
        info!(matched = %match_id, deal = %deal.id, "match confirmed");
        Ok(deal)
    }

    /// Closes a confirmed match after its offers left the store.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MatchNotFound`] or
    /// [`SolverError::InvalidStateTransition`] if the match is not
    /// `Confirmed`.
    pub fn close(&mut self, match_id: &str) -> Result<(), SolverError> {
        let tracked = self
            .matches
            .get_mut(match_id)
            .ok_or_else(|| SolverError::MatchNotFound(match_id.to_string()))?;
        transition(tracked, MatchState::Closed)?;
        self.drop_tracked(match_id);
        Ok(())
    }

    /// Rejects a proposal, releasing both offers back to matching.
    ///
    /// # Errors
    ///
    /// Returns [`SolverError::MatchNotFound`] or
    /// [`SolverError::InvalidStateTransition`] if the match is not
    /// `Proposed`.
    pub fn reject(&mut self, match_id: &str) -> Result<(), SolverError> {
        let tracked = self
            .matches
            .get_mut(match_id)
            .ok_or_else(|| SolverError::MatchNotFound(match_id.to_string()))?;
        transition(tracked, MatchState::Rejected)?;
        info!(matched = %match_id, "match rejected, offers released");
        self.drop_tracked(match_id);
        Ok(())
    }

    /// Expires every proposal whose deadline has passed, releasing its
    /// offers. Returns the expired match ids.
    pub fn expire_due(&mut self, now: DateTime<Utc>) -> Vec<String> {
        let due: Vec<String> = self
            .matches
            .iter()
            .filter(|(_, m)| m.state == MatchState::Proposed && m.deadline <= now)
            .map(|(id, _)| id.clone())
            .collect();

        for id in &due {
            if let Some(tracked) = self.matches.get_mut(id) {
                tracked.state = MatchState::Expired;
                info!(matched = %id, "match expired unconfirmed, offers released");
            }
            self.drop_tracked(id);
        }
        due
    }

    /// Drops any in-flight proposal touching the given offer id,
    /// releasing its counterpart. Used when an offer is withdrawn from
    /// under a proposal.
    pub fn release_offer(&mut self, offer_id: &str) {
        let touching: Vec<String> = self
            .matches
            .iter()
            .filter(|(_, m)| {
                m.candidate.proposal.job_offer == offer_id
                    || m.candidate.proposal.resource_offer == offer_id
            })
            .map(|(id, _)| id.clone())
            .collect();

        for id in touching {
            debug!(matched = %id, offer = %offer_id, "dropping proposal for withdrawn offer");
            self.drop_tracked(&id);
        }
    }

    fn drop_tracked(&mut self, match_id: &str) {
        if let Some(tracked) = self.matches.remove(match_id) {
            self.reserved_jobs.remove(&tracked.candidate.proposal.job_offer);
            self.reserved_resources.remove(&tracked.candidate.proposal.resource_offer);
        }
    }
}

fn transition(tracked: &mut TrackedMatch, target: MatchState) -> Result<(), SolverError> {
    if tracked.state.can_transition_to(&target) {
        tracked.state = target;
        Ok(())
    } else {
        Err(SolverError::InvalidStateTransition {
            from: tracked.state.to_string(),
            to: target.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hermit_data::{JobOffer, MatchProposal, Pricing, ResourceOffer};

    fn candidate(match_id: &str, job_id: &str, resource_id: &str, timeout: u64) -> CandidateMatch {
        CandidateMatch {
            proposal: MatchProposal {
                id: match_id.to_string(),
                timeout,
                resource_offer: resource_id.to_string(),
                job_offer: job_id.to_string(),
            },
            job_offer: JobOffer { id: job_id.to_string(), ..JobOffer::default() },
            resource_offer: ResourceOffer {
                id: resource_id.to_string(),
                ..ResourceOffer::default()
            },
            pricing: Pricing::fixed(80),
        }
    }

    #[test]
    fn legal_transitions() {
        use MatchState::{Closed, Confirmed, Expired, Proposed, Rejected};

        assert!(Proposed.can_transition_to(&Confirmed));
        assert!(Proposed.can_transition_to(&Expired));
        assert!(Proposed.can_transition_to(&Rejected));
        assert!(Confirmed.can_transition_to(&Closed));

        assert!(!Proposed.can_transition_to(&Closed));
        assert!(!Confirmed.can_transition_to(&Rejected));
        assert!(!Expired.can_transition_to(&Confirmed));
        assert!(!Closed.can_transition_to(&Proposed));
    }

    #[test]
    fn propose_reserves_both_offers() {
        let mut tracker = MatchTracker::new();
        tracker.propose(candidate("m1", "j1", "r1", 60), Utc::now());

        assert!(tracker.job_reserved("j1"));
        assert!(tracker.resource_reserved("r1"));
        assert_eq!(tracker.state("m1"), Some(MatchState::Proposed));
    }

    #[test]
    fn confirm_then_close_consumes_reservation() {
        let mut tracker = MatchTracker::new();
        tracker.propose(candidate("m1", "j1", "r1", 60), Utc::now());

        let deal = tracker.confirm("m1").unwrap();
        assert!(!deal.id.is_empty());
        assert_eq!(deal.pricing.instruction_price, 80);
        assert_eq!(tracker.state("m1"), Some(MatchState::Confirmed));

        tracker.close("m1").unwrap();
        assert_eq!(tracker.state("m1"), None);
        assert!(!tracker.job_reserved("j1"));
        assert!(!tracker.resource_reserved("r1"));
    }

    #[test]
    fn double_confirm_is_rejected() {
        let mut tracker = MatchTracker::new();
        tracker.propose(candidate("m1", "j1", "r1", 60), Utc::now());

        tracker.confirm("m1").unwrap();
        let err = tracker.confirm("m1").unwrap_err();
        assert!(matches!(err, SolverError::InvalidStateTransition { .. }));
    }

    #[test]
    fn confirm_unknown_match_fails() {
        let mut tracker = MatchTracker::new();
        assert!(matches!(tracker.confirm("missing"), Err(SolverError::MatchNotFound(_))));
    }

    #[test]
    fn reject_releases_offers() {
        let mut tracker = MatchTracker::new();
        tracker.propose(candidate("m1", "j1", "r1", 60), Utc::now());

        tracker.reject("m1").unwrap();
        assert!(!tracker.job_reserved("j1"));
        assert!(!tracker.resource_reserved("r1"));
        assert_eq!(tracker.in_flight(), 0);
    }

    #[test]
    fn expiry_releases_only_due_proposals() {
        let mut tracker = MatchTracker::new();
        let now = Utc::now();
        tracker.propose(candidate("m1", "j1", "r1", 60), now);
        tracker.propose(candidate("m2", "j2", "r2", 600), now);

        let expired = tracker.expire_due(now + Duration::seconds(120));
        assert_eq!(expired, vec!["m1".to_string()]);
        assert!(!tracker.job_reserved("j1"));
        assert!(tracker.job_reserved("j2"));
    }

    #[test]
    fn withdrawn_offer_drops_proposal_and_frees_counterpart() {
        let mut tracker = MatchTracker::new();
        tracker.propose(candidate("m1", "j1", "r1", 60), Utc::now());

        tracker.release_offer("r1");
        assert_eq!(tracker.in_flight(), 0);
        assert!(!tracker.job_reserved("j1"));
    }
}
