//! Match and deal emission.
//!
//! The solver hands its outputs to whatever persistence or settlement
//! layer is configured. Emission is one-way and at-least-once: a sink
//! must tolerate seeing the same id more than once.

use tracing::info;

use hermit_data::{Deal, MatchProposal};

/// Receives the solver's match and deal records.
pub trait DealSink: Send + Sync {
    /// A match was proposed.
    fn on_match(&self, proposal: &MatchProposal);

    /// A match was confirmed into a binding deal.
    fn on_deal(&self, deal: &Deal);
}

/// Sink that logs emitted records and otherwise drops them.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogSink;

impl DealSink for LogSink {
    fn on_match(&self, proposal: &MatchProposal) {
        info!(
            matched = %proposal.id,
            job = %proposal.job_offer,
            resource = %proposal.resource_offer,
            timeout = proposal.timeout,
            "match proposed"
        );
    }

    fn on_deal(&self, deal: &Deal) {
        info!(
            deal = %deal.id,
            creator = %deal.job_creator,
            provider = %deal.resource_provider,
            price = deal.pricing.instruction_price,
            "deal agreed"
        );
    }
}
