//! The greedy first-fit matching pass.
//!
//! Given one consistent snapshot of open offers, pairs each job offer
//! with the first compatible resource offer. Both sides are iterated in
//! submission order, so earlier offers win ties and the outcome is fully
//! deterministic. First-fit over best-fit is deliberate: this is not a
//! two-sided auction, and price improvement across all compatible
//! counterparties is out of scope.

use std::collections::HashSet;

use tracing::{debug, warn};

use hermit_data::{ContentAddressed, JobOffer, MatchProposal, Pricing, ResourceOffer};

use crate::error::SolverError;
use crate::evaluator::{effective_pricing, module_accepted, pricing_compatible, spec_satisfies};
use crate::resolver::ModuleResolver;

/// A proposed pairing together with everything needed to build the deal
/// if it confirms.
#[derive(Debug, Clone)]
pub struct CandidateMatch {
    /// The proposal record, id stamped.
    pub proposal: MatchProposal,
    /// Full copy of the paired job offer.
    pub job_offer: JobOffer,
    /// Full copy of the paired resource offer.
    pub resource_offer: ResourceOffer,
    /// The agreed pricing for the eventual deal.
    pub pricing: Pricing,
}

/// What one matching pass produced.
#[derive(Debug, Clone, Default)]
pub struct PassOutcome {
    /// Proposed matches, in job submission order.
    pub matches: Vec<CandidateMatch>,
    /// Ids of job offers skipped because their module did not resolve.
    pub unresolved_jobs: Vec<String>,
}

/// Runs one matching pass over a snapshot of open offers.
///
/// No offer is used twice within a pass. Offers added mid-pass are
/// picked up by the next pass; the snapshot is never re-read.
///
/// # Errors
///
/// Returns [`SolverError::Data`] if a proposal id cannot be derived.
pub fn run_pass(
    jobs: &[JobOffer],
    resources: &[ResourceOffer],
    resolver: &dyn ModuleResolver,
    match_timeout_secs: u64,
) -> Result<PassOutcome, SolverError> {
    let mut outcome = PassOutcome::default();
    let mut consumed: HashSet<&str> = HashSet::new();

    for job in jobs {
        let module = match resolver.resolve(&job.module) {
            Ok(module) => module,
            Err(e) => {
                warn!(offer = %job.id, error = %e, "skipping job offer with unresolved module");
                outcome.unresolved_jobs.push(job.id.clone());
                continue;
            }
        };

        let candidate = resources.iter().find(|resource| {
            !consumed.contains(resource.id.as_str())
                && module_accepted(resource, &job.module_id)
                && spec_satisfies(&resource.spec, &module.spec)
                && pricing_compatible(&job.pricing, effective_pricing(resource, &job.module_id))
                    .is_some()
        });

        let Some(resource) = candidate else {
            debug!(offer = %job.id, "no compatible resource offer this pass");
            continue;
        };

        // The filter above established compatibility; re-derive the terms.
        let Some(pricing) =
            pricing_compatible(&job.pricing, effective_pricing(resource, &job.module_id))
        else {
            continue;
        };

        let mut proposal = MatchProposal {
            id: String::new(),
            timeout: match_timeout_secs,
            resource_offer: resource.id.clone(),
            job_offer: job.id.clone(),
        };
        proposal.stamp_id()?;

        debug!(
            matched = %proposal.id,
            job = %job.id,
            resource = %resource.id,
            price = pricing.instruction_price,
            "proposed match"
        );

        consumed.insert(resource.id.as_str());
        outcome.matches.push(CandidateMatch {
            proposal,
            job_offer: job.clone(),
            resource_offer: resource.clone(),
            pricing,
        });
    }

    Ok(outcome)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::StaticResolver;
    use hermit_data::{Module, ModuleConfig, Spec};

    fn pinned(path: &str) -> ModuleConfig {
        ModuleConfig {
            repo: "https://github.com/hermit-market/modules".to_string(),
            hash: "6a1d4f".to_string(),
            path: path.to_string(),
            ..ModuleConfig::default()
        }
    }

    fn job(creator: &str, path: &str, pricing: Pricing) -> JobOffer {
        let module = pinned(path);
        let mut offer = JobOffer {
            job_creator: creator.to_string(),
            module_id: module.content_id().unwrap(),
            module,
            pricing,
            ..JobOffer::default()
        };
        offer.stamp_id().unwrap();
        offer
    }

    fn resource(provider: &str, index: u64, spec: Spec, ask: Pricing) -> ResourceOffer {
        let mut offer = ResourceOffer {
            resource_provider: provider.to_string(),
            index,
            spec,
            default_pricing: ask,
            ..ResourceOffer::default()
        };
        offer.stamp_id().unwrap();
        offer
    }

    fn resolver_with(path: &str, spec: Spec) -> StaticResolver {
        let resolver = StaticResolver::new();
        resolver.register(&pinned(path), Module { spec }).unwrap();
        resolver
    }

    #[test]
    fn first_fit_selects_earliest_compatible_resource() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 1000, 1024));
        let jobs = vec![job("0xabc", "m/t.yaml", Pricing::market(0))];
        let resources = vec![
            resource("0xaaa", 0, Spec::new(0, 500, 512), Pricing::fixed(10)), // too small
            resource("0xbbb", 0, Spec::new(0, 2000, 2048), Pricing::fixed(90)),
            resource("0xccc", 0, Spec::new(0, 4000, 4096), Pricing::fixed(5)), // cheaper but later
        ];

        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        let m = &outcome.matches[0];
        assert_eq!(m.resource_offer.resource_provider, "0xbbb");
        assert_eq!(m.pricing.instruction_price, 90);
        assert_eq!(m.proposal.timeout, 60);
    }

    #[test]
    fn no_resource_used_twice_in_a_pass() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 100, 128));
        let jobs = vec![
            job("0xabc", "m/t.yaml", Pricing::market(0)),
            job("0xdef", "m/t.yaml", Pricing::market(0)),
        ];
        let resources = vec![resource("0xaaa", 0, Spec::new(0, 1000, 1024), Pricing::fixed(10))];

        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert_eq!(outcome.matches.len(), 1);
        assert_eq!(outcome.matches[0].job_offer.job_creator, "0xabc");
    }

    #[test]
    fn unresolved_module_is_skipped_not_matched() {
        let resolver = StaticResolver::new();
        let jobs = vec![job("0xabc", "m/t.yaml", Pricing::market(0))];
        let resources = vec![resource("0xaaa", 0, Spec::new(0, 1000, 1024), Pricing::fixed(10))];

        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert!(outcome.matches.is_empty());
        assert_eq!(outcome.unresolved_jobs, vec![jobs[0].id.clone()]);
    }

    #[test]
    fn zero_capacity_only_matches_zero_requirement() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 0, 0));
        let jobs = vec![job("0xabc", "m/t.yaml", Pricing::market(0))];
        let resources = vec![resource("0xaaa", 0, Spec::new(0, 0, 0), Pricing::fixed(10))];

        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert_eq!(outcome.matches.len(), 1);

        let resolver = resolver_with("m/t.yaml", Spec::new(1, 0, 0));
        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn incompatible_pricing_blocks_match() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 100, 128));
        let jobs = vec![job("0xabc", "m/t.yaml", Pricing::fixed(50))];
        let resources = vec![resource("0xaaa", 0, Spec::new(0, 1000, 1024), Pricing::fixed(80))];

        let outcome = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        assert!(outcome.matches.is_empty());
    }

    #[test]
    fn allow_list_gates_matching() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 100, 128));
        let jobs = vec![job("0xabc", "m/t.yaml", Pricing::market(0))];
        let mut gated = resource("0xaaa", 0, Spec::new(0, 1000, 1024), Pricing::fixed(10));
        gated.modules = vec!["some-other-module".to_string()];

        let outcome = run_pass(&jobs, &[gated.clone()], &resolver, 60).unwrap();
        assert!(outcome.matches.is_empty());

        gated.modules = vec![jobs[0].module_id.clone()];
        let outcome = run_pass(&jobs, &[gated], &resolver, 60).unwrap();
        assert_eq!(outcome.matches.len(), 1);
    }

    #[test]
    fn pass_is_deterministic() {
        let resolver = resolver_with("m/t.yaml", Spec::new(0, 100, 128));
        let jobs = vec![
            job("0xabc", "m/t.yaml", Pricing::market(0)),
            job("0xdef", "m/t.yaml", Pricing::market(0)),
        ];
        let resources = vec![
            resource("0xaaa", 0, Spec::new(0, 1000, 1024), Pricing::fixed(10)),
            resource("0xbbb", 0, Spec::new(0, 1000, 1024), Pricing::fixed(20)),
        ];

        let first = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        let second = run_pass(&jobs, &resources, &resolver, 60).unwrap();
        let ids = |o: &PassOutcome| {
            o.matches.iter().map(|m| m.proposal.id.clone()).collect::<Vec<_>>()
        };
        assert_eq!(ids(&first), ids(&second));
        assert_eq!(first.matches.len(), 2);
    }
}
