//! Pricing terms attached to both sides of the marketplace.

use serde::{Deserialize, Serialize};

/// How a price field is to be interpreted.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub enum PricingMode {
    /// "Get me the best deal" — the default for job creators.
    /// The attached instruction price is advisory, not binding.
    #[default]
    MarketPrice,
    /// "Take it or leave it" — the default for resource providers.
    FixedPrice,
}

/// The cost terms of a job.
///
/// This is both the bid and the ask of the two-sided marketplace: job
/// creators attach it to job offers, resource providers to resource
/// offers. All amounts are in the smallest currency unit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pricing {
    /// Pricing regime for `instruction_price`.
    pub mode: PricingMode,
    /// Price per instruction.
    pub instruction_price: u64,
    /// Seconds after which the job times out.
    pub timeout: u64,
    /// Collateral forfeited on timeout.
    pub timeout_collateral: u64,
    /// Collateral the job creator posts for payment.
    pub payment_collateral: u64,
    /// Results collateral as a multiple of the payment.
    pub results_collateral_multiple: u64,
    /// Fee paid to a mediator on dispute.
    pub mediation_fee: u64,
}

impl Pricing {
    /// A fixed-price ask/bid at the given instruction price, other terms zero.
    #[must_use]
    pub const fn fixed(instruction_price: u64) -> Self {
        Self {
            mode: PricingMode::FixedPrice,
            instruction_price,
            timeout: 0,
            timeout_collateral: 0,
            payment_collateral: 0,
            results_collateral_multiple: 0,
            mediation_fee: 0,
        }
    }

    /// A market-price record with the given advisory instruction price.
    #[must_use]
    pub const fn market(advisory_price: u64) -> Self {
        Self {
            mode: PricingMode::MarketPrice,
            instruction_price: advisory_price,
            timeout: 0,
            timeout_collateral: 0,
            payment_collateral: 0,
            results_collateral_multiple: 0,
            mediation_fee: 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn mode_serializes_as_variant_name() {
        let json = serde_json::to_string(&PricingMode::MarketPrice).unwrap();
        assert_eq!(json, "\"MarketPrice\"");
        let json = serde_json::to_string(&PricingMode::FixedPrice).unwrap();
        assert_eq!(json, "\"FixedPrice\"");
    }

    #[test]
    fn default_mode_is_market() {
        assert_eq!(PricingMode::default(), PricingMode::MarketPrice);
    }

    #[test]
    fn pricing_round_trip() {
        let pricing = Pricing {
            mode: PricingMode::FixedPrice,
            instruction_price: 80,
            timeout: 600,
            timeout_collateral: 10,
            payment_collateral: 20,
            results_collateral_multiple: 2,
            mediation_fee: 5,
        };
        let json = serde_json::to_string(&pricing).unwrap();
        let back: Pricing = serde_json::from_str(&json).unwrap();
        assert_eq!(back, pricing);
    }
}
