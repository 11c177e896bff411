//! Pure compatibility and pricing decisions.
//!
//! No side effects here: the matching engine calls these over the offer
//! population and acts on the answers.

use hermit_data::{Pricing, PricingMode, ResourceOffer, Spec};

/// True iff the offered capacity covers the requirement on every axis.
#[must_use]
pub const fn spec_satisfies(offered: &Spec, required: &Spec) -> bool {
    offered.satisfies(required)
}

/// True if the resource offer will run the given module.
///
/// An empty allow-list means all modules are accepted.
#[must_use]
pub fn module_accepted(offer: &ResourceOffer, module_id: &str) -> bool {
    offer.modules.is_empty() || offer.modules.iter().any(|m| m == module_id)
}

/// The ask that applies to a module: the per-module override if the
/// provider set one, else the offer's default pricing.
#[must_use]
pub fn effective_pricing<'a>(offer: &'a ResourceOffer, module_id: &str) -> &'a Pricing {
    offer.module_pricing.get(module_id).unwrap_or(&offer.default_pricing)
}

/// Decides whether a bid and an ask are reconcilable.
///
/// Returns the agreed pricing on success:
///
/// - Both sides market: trivially compatible; the resource side's
///   advisory instruction price becomes the agreed price.
/// - One side fixed: the fixed side's price binds.
/// - Both sides fixed: compatible iff the bid covers the ask; the agreed
///   price is the ask.
///
/// Timeout and collateral fields are carried through unmodified from the
/// resource side, whose terms govern the deal. The agreed record is
/// always fixed-price.
#[must_use]
pub fn pricing_compatible(job: &Pricing, resource: &Pricing) -> Option<Pricing> {
    let agreed_price = match (job.mode, resource.mode) {
        (PricingMode::MarketPrice, _) => resource.instruction_price,
        (PricingMode::FixedPrice, PricingMode::MarketPrice) => job.instruction_price,
        (PricingMode::FixedPrice, PricingMode::FixedPrice) => {
            if job.instruction_price < resource.instruction_price {
                return None;
            }
            resource.instruction_price
        }
    };
    Some(Pricing {
        mode: PricingMode::FixedPrice,
        instruction_price: agreed_price,
        ..*resource
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn resource_offer(modules: &[&str]) -> ResourceOffer {
        ResourceOffer {
            resource_provider: "0xdef".to_string(),
            modules: modules.iter().map(ToString::to_string).collect(),
            default_pricing: Pricing::fixed(80),
            ..ResourceOffer::default()
        }
    }

    #[test]
    fn empty_allow_list_accepts_any_module() {
        let offer = resource_offer(&[]);
        assert!(module_accepted(&offer, "m1"));
        assert!(module_accepted(&offer, "m2"));
    }

    #[test]
    fn allow_list_rejects_unlisted_module() {
        let offer = resource_offer(&["m1"]);
        assert!(module_accepted(&offer, "m1"));
        assert!(!module_accepted(&offer, "m2"));
    }

    #[test]
    fn module_override_beats_default_pricing() {
        let mut offer = resource_offer(&[]);
        offer.module_pricing.insert("m1".to_string(), Pricing::fixed(200));

        assert_eq!(effective_pricing(&offer, "m1").instruction_price, 200);
        assert_eq!(effective_pricing(&offer, "m2").instruction_price, 80);
    }

    #[test_case(100, 80, Some(80); "bid covers ask")]
    #[test_case(80, 80, Some(80); "bid equals ask")]
    #[test_case(50, 80, None; "bid below ask")]
    fn fixed_fixed_gate(bid: u64, ask: u64, agreed: Option<u64>) {
        let result = pricing_compatible(&Pricing::fixed(bid), &Pricing::fixed(ask));
        assert_eq!(result.map(|p| p.instruction_price), agreed);
    }

    #[test]
    fn market_bid_takes_fixed_ask() {
        let agreed = pricing_compatible(&Pricing::market(1), &Pricing::fixed(80)).unwrap();
        assert_eq!(agreed.instruction_price, 80);
        assert_eq!(agreed.mode, PricingMode::FixedPrice);
    }

    #[test]
    fn fixed_bid_binds_against_market_ask() {
        let agreed = pricing_compatible(&Pricing::fixed(70), &Pricing::market(999)).unwrap();
        assert_eq!(agreed.instruction_price, 70);
    }

    #[test]
    fn market_market_uses_resource_advisory_price() {
        let agreed = pricing_compatible(&Pricing::market(0), &Pricing::market(42)).unwrap();
        assert_eq!(agreed.instruction_price, 42);
    }

    #[test]
    fn agreed_pricing_carries_resource_collateral_terms() {
        let resource = Pricing {
            mode: PricingMode::FixedPrice,
            instruction_price: 80,
            timeout: 600,
            timeout_collateral: 10,
            payment_collateral: 20,
            results_collateral_multiple: 2,
            mediation_fee: 5,
        };
        let job = Pricing { payment_collateral: 999, ..Pricing::market(0) };

        let agreed = pricing_compatible(&job, &resource).unwrap();
        assert_eq!(agreed.timeout, 600);
        assert_eq!(agreed.timeout_collateral, 10);
        assert_eq!(agreed.payment_collateral, 20);
        assert_eq!(agreed.results_collateral_multiple, 2);
        assert_eq!(agreed.mediation_fee, 5);
    }
}
