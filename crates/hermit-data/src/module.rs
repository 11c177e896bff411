//! Workload module definitions.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::spec::Spec;

/// User inputs to a module, applied to its template at execution time.
///
/// A `BTreeMap` keeps the wire encoding deterministic regardless of
/// insertion order, which the content-id derivation relies on.
pub type ModuleInputs = BTreeMap<String, String>;

/// A resolved, immutable workload definition.
///
/// The module file lives in the pinned repo and declares the minimum spec
/// it needs (e.g. whether it requires a GPU), so the spec is unknown until
/// the module has been fetched and resolved.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Module {
    /// The minimum spec this module requires.
    pub spec: Spec,
}

/// Pins a workload definition to an exact source revision.
///
/// `(repo, hash, path)` must resolve to exactly one module template.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModuleConfig {
    /// Short name, used by the named-module shortcut registry.
    pub name: String,
    /// Version label for the shortcut registry.
    pub version: String,
    /// HTTP URL of a git repo cloneable without credentials.
    pub repo: String,
    /// Git hash the module is pinned to.
    pub hash: String,
    /// Path to the module template within the repo.
    pub path: String,
}

impl ModuleConfig {
    /// Content id of this configuration.
    ///
    /// A [`crate::JobOffer`]'s `module_id` must equal this digest. The
    /// config carries no id field of its own, so the whole record is
    /// hashed as-is.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Identity`] if the config cannot be encoded.
    pub fn content_id(&self) -> Result<String, DataError> {
        let encoded = serde_json::to_vec(self)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(b"hermit.module_config.v1");
        hasher.update(&encoded);
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Validates that the pin is complete.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] if `repo`, `hash` or `path` is
    /// empty; `name` and `version` are optional shortcut metadata.
    pub fn validate(&self) -> Result<(), DataError> {
        for (field, value) in [("repo", &self.repo), ("hash", &self.hash), ("path", &self.path)] {
            if value.is_empty() {
                return Err(DataError::Validation(format!("module {field} must not be empty")));
            }
        }
        Ok(())
    }
}
