//! Offers posted to the solver by the two sides of the marketplace.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::error::DataError;
use crate::identity::ContentAddressed;
use crate::module::{ModuleConfig, ModuleInputs};
use crate::pricing::Pricing;
use crate::spec::Spec;

/// A job creator's request: a workload module plus bid terms.
///
/// Immutable once its content id has been derived; removed from the open
/// set when matched or withdrawn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOffer {
    /// Content id of this offer with `id` set to the empty string.
    pub id: String,
    /// Address of the job creator.
    pub job_creator: String,
    /// Content id of the module configuration below.
    pub module_id: String,
    /// The pinned module configuration; must hash to `module_id`.
    pub module: ModuleConfig,
    /// User inputs applied to the module template.
    pub inputs: ModuleInputs,
    /// The offered (bid) terms.
    pub pricing: Pricing,
}

impl ContentAddressed for JobOffer {
    const DOMAIN: &'static str = "hermit.job_offer.v1";

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

impl JobOffer {
    /// Validates the offer before it may enter the store.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] on an empty creator address, an
    /// incomplete module pin, or a `module_id` that does not hash from
    /// the embedded module configuration.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.job_creator.is_empty() {
            return Err(DataError::Validation("job_creator must not be empty".to_string()));
        }
        self.module.validate()?;
        if !self.module_id.is_empty() && self.module_id != self.module.content_id()? {
            return Err(DataError::Validation(
                "module_id does not match the embedded module configuration".to_string(),
            ));
        }
        Ok(())
    }
}

/// A resource provider's advertisement of available capacity.
///
/// A provider commonly keeps several essentially identical offers open at
/// once, disambiguated by `index`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceOffer {
    /// Content id of this offer with `id` set to the empty string.
    pub id: String,
    /// Address of the resource provider.
    pub resource_provider: String,
    /// Disambiguates multiple concurrent offers from one provider.
    pub index: u64,
    /// Absolute capacity being offered.
    pub spec: Spec,
    /// Module ids this provider will run; empty means all modules.
    pub modules: Vec<String>,
    /// Ask terms for any module without an override below.
    pub default_pricing: Pricing,
    /// Per-module ask overrides, keyed by module id.
    pub module_pricing: BTreeMap<String, Pricing>,
}

impl ContentAddressed for ResourceOffer {
    const DOMAIN: &'static str = "hermit.resource_offer.v1";

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

impl ResourceOffer {
    /// Validates the offer before it may enter the store.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Validation`] on an empty provider address.
    pub fn validate(&self) -> Result<(), DataError> {
        if self.resource_provider.is_empty() {
            return Err(DataError::Validation("resource_provider must not be empty".to_string()));
        }
        Ok(())
    }
}
