//! # hermit-data
//!
//! Data model for the Hermit compute marketplace.
//!
//! This crate provides:
//!
//! - [`Spec`] — resource vectors (milli-GPU, milli-CPU, megabytes)
//! - [`JobOffer`] / [`ResourceOffer`] — the two sides of the marketplace
//! - [`Pricing`] — bid/ask terms with market and fixed regimes
//! - [`MatchProposal`] / [`Deal`] — solver outputs
//! - [`ContentAddressed`] — deterministic content-id derivation

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod deal;
pub mod error;
pub mod identity;
pub mod module;
pub mod offer;
pub mod pricing;
pub mod spec;

pub use deal::{Deal, JobResult, MatchProposal};
pub use error::DataError;
pub use identity::ContentAddressed;
pub use module::{Module, ModuleConfig, ModuleInputs};
pub use offer::{JobOffer, ResourceOffer};
pub use pricing::{Pricing, PricingMode};
pub use spec::Spec;
