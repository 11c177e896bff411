//! Module resolution seam.
//!
//! A job offer pins its module to a git revision; the module file itself
//! declares the minimum spec it needs, so the spec is unknown until the
//! module has been fetched. Retrieval is outside the solver core; this
//! trait is the boundary it happens behind.

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;

use hermit_data::{Module, ModuleConfig};

/// Errors that can occur resolving a module pin to its definition.
#[derive(Debug, Error)]
pub enum ResolveError {
    /// No module known for the given pin.
    #[error("module not resolvable: {0}")]
    NotFound(String),

    /// Retrieval was attempted and failed.
    #[error("module retrieval failed: {0}")]
    Retrieval(String),
}

/// Resolves a pinned module configuration to its definition.
///
/// A job offer whose module does not resolve is skipped by the matching
/// engine and retried next pass; it never matches unresolved.
pub trait ModuleResolver: Send + Sync {
    /// Resolves the pin to a module definition.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError`] if the pin is unknown or retrieval fails.
    fn resolve(&self, config: &ModuleConfig) -> Result<Module, ResolveError>;
}

/// Resolver backed by an in-memory registry keyed by module content id.
///
/// Serves tests and single-process deployments where modules are
/// registered ahead of time.
#[derive(Default)]
pub struct StaticResolver {
    modules: RwLock<HashMap<String, Module>>,
}

impl StaticResolver {
    /// Creates an empty resolver.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a module definition under its configuration's content id.
    ///
    /// # Errors
    ///
    /// Returns [`ResolveError::Retrieval`] if the config cannot be hashed.
    pub fn register(&self, config: &ModuleConfig, module: Module) -> Result<String, ResolveError> {
        let id = config.content_id().map_err(|e| ResolveError::Retrieval(e.to_string()))?;
        self.modules.write().insert(id.clone(), module);
        Ok(id)
    }
}

impl ModuleResolver for StaticResolver {
    fn resolve(&self, config: &ModuleConfig) -> Result<Module, ResolveError> {
        let id = config.content_id().map_err(|e| ResolveError::Retrieval(e.to_string()))?;
        self.modules
            .read()
            .get(&id)
            .copied()
            .ok_or(ResolveError::NotFound(id))
    }
}
