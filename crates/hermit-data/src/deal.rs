//! Solver outputs: proposed matches, binding deals, and job results.

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::identity::ContentAddressed;
use crate::offer::{JobOffer, ResourceOffer};
use crate::pricing::Pricing;

/// A proposed, time-bounded pairing of one job offer and one resource
/// offer. Not yet a binding agreement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchProposal {
    /// Content id of this proposal with `id` set to the empty string.
    pub id: String,
    /// Seconds the proposal stays open for confirmation.
    pub timeout: u64,
    /// Content id of the paired resource offer.
    pub resource_offer: String,
    /// Content id of the paired job offer.
    pub job_offer: String,
}

impl ContentAddressed for MatchProposal {
    const DOMAIN: &'static str = "hermit.match.v1";

    fn with_cleared_id(&self) -> Self {
        Self { id: String::new(), ..self.clone() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

impl MatchProposal {
    /// Validates the proposal's invariants.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] on a zero timeout or a missing
    /// offer reference.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.timeout == 0 {
            return Err(DataError::Validation("match timeout must be positive".to_string()));
        }
        if self.job_offer.is_empty() || self.resource_offer.is_empty() {
            return Err(DataError::Validation("match must reference both offers".to_string()));
        }
        Ok(())
    }
}

/// The binding outcome of a confirmed match.
///
/// Carries full copies of both source offers; once a deal exists those
/// offers are consumed and must never match again.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Deal {
    /// Content id of this deal with `id` set to the empty string.
    pub id: String,
    /// Address of the resource provider.
    pub resource_provider: String,
    /// Address of the job creator.
    pub job_creator: String,
    /// The consumed job offer.
    pub job_offer: JobOffer,
    /// The consumed resource offer.
    pub resource_offer: ResourceOffer,
    /// The agreed terms; must satisfy both offers' pricing constraints.
    pub pricing: Pricing,
}

impl ContentAddressed for Deal {
    const DOMAIN: &'static str = "hermit.deal.v1";

    fn with_cleared_id(&self) -> Self {
        Self { id: String::new(), ..self.clone() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}

/// The result of an executed deal, reported back through settlement.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobResult {
    /// Content id of this result with `id` set to the empty string.
    pub id: String,
    /// The deal this result settles.
    pub deal_id: String,
    /// Content id of the actual result data.
    pub results_id: String,
    /// Instructions executed, used to price the job.
    pub instruction_count: u64,
}

impl ContentAddressed for JobResult {
    const DOMAIN: &'static str = "hermit.result.v1";

    fn with_cleared_id(&self) -> Self {
        Self { id: String::new(), ..self.clone() }
    }

    fn id(&self) -> &str {
        &self.id
    }

    fn set_id(&mut self, id: String) {
        self.id = id;
    }
}
