//! # hermit-solver
//!
//! The matching core of the Hermit compute marketplace.
//!
//! Job creators post [`hermit_data::JobOffer`]s, resource providers post
//! [`hermit_data::ResourceOffer`]s, and the solver pairs them into
//! binding [`hermit_data::Deal`]s.
//!
//! This crate provides:
//!
//! - [`evaluator`] — pure spec-compatibility and pricing decisions
//! - [`engine`] — the greedy first-fit matching pass
//! - [`lifecycle`] — the match confirmation state machine
//! - [`resolver`] — the module resolution seam
//! - [`Solver`] — the cancellable service loop and event adapter

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod config;
pub mod engine;
pub mod error;
pub mod evaluator;
pub mod events;
pub mod lifecycle;
pub mod resolver;
pub mod service;
pub mod sink;

pub use config::{ConfirmPolicy, SolverConfig};
pub use engine::{run_pass, CandidateMatch, PassOutcome};
pub use error::SolverError;
pub use lifecycle::{MatchState, MatchTracker};
pub use resolver::{ModuleResolver, ResolveError, StaticResolver};
pub use service::Solver;
pub use sink::{DealSink, LogSink};
