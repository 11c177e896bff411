//! # hermit-store
//!
//! In-memory repository of open offers for the Hermit solver.
//!
//! The store is the single point of truth for open [`JobOffer`]s and
//! [`ResourceOffer`]s. Each side is held twice: an ordered list that
//! preserves submission order (the matching engine iterates it for FIFO
//! fairness) and an id-keyed map for O(1) lookup. One `RwLock` guards
//! both containers together, so every mutation is atomic relative to
//! readers and a reader can never observe a collection mid-rebuild.
//!
//! Queries return owned snapshot copies; mutating a returned sequence
//! never affects the store.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;

use parking_lot::RwLock;
use thiserror::Error;
use tracing::debug;

use hermit_data::{ContentAddressed, DataError, JobOffer, ResourceOffer};

/// Errors that can occur in store operations.
///
/// Lookups of absent ids are not errors; they return `None`.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The offer was rejected before entering the store.
    #[error(transparent)]
    Data(#[from] DataError),
}

#[derive(Default)]
struct Inner {
    job_offers: Vec<JobOffer>,
    resource_offers: Vec<ResourceOffer>,
    job_offer_index: HashMap<String, JobOffer>,
    resource_offer_index: HashMap<String, ResourceOffer>,
}

/// Concurrency-safe repository of open offers.
///
/// Submitting byte-identical offers yields the same content id: the map
/// entry is overwritten (last write wins) while the ordered list gains a
/// duplicate entry. Removal by id drops every list entry carrying that
/// id, so the duplicate never outlives its original.
#[derive(Default)]
pub struct OfferStore {
    inner: RwLock<Inner>,
}

impl OfferStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validates a job offer, stamps its content id and appends it.
    ///
    /// Returns the stored offer with its id filled in.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Data`] if the offer fails validation or its
    /// id cannot be computed; a rejected offer never enters the store.
    pub fn add_job_offer(&self, mut offer: JobOffer) -> Result<JobOffer, StoreError> {
        if offer.module_id.is_empty() {
            offer.module_id = offer.module.content_id()?;
        }
        offer.validate()?;
        offer.stamp_id()?;
        let mut inner = self.inner.write();
        inner.job_offer_index.insert(offer.id.clone(), offer.clone());
        inner.job_offers.push(offer.clone());
        debug!(offer = %offer.id, creator = %offer.job_creator, "added job offer");
        Ok(offer)
    }

    /// Validates a resource offer, stamps its content id and appends it.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Data`] if the offer fails validation or its
    /// id cannot be computed.
    pub fn add_resource_offer(&self, mut offer: ResourceOffer) -> Result<ResourceOffer, StoreError> {
        offer.validate()?;
        offer.stamp_id()?;
        let mut inner = self.inner.write();
        inner.resource_offer_index.insert(offer.id.clone(), offer.clone());
        inner.resource_offers.push(offer.clone());
        debug!(offer = %offer.id, provider = %offer.resource_provider, "added resource offer");
        Ok(offer)
    }

    /// Snapshot of open job offers in submission order, optionally
    /// filtered by job creator address.
    #[must_use]
    pub fn job_offers(&self, job_creator: Option<&str>) -> Vec<JobOffer> {
        let inner = self.inner.read();
        match job_creator {
            Some(creator) => inner
                .job_offers
                .iter()
                .filter(|offer| offer.job_creator == creator)
                .cloned()
                .collect(),
            None => inner.job_offers.clone(),
        }
    }

    /// Snapshot of open resource offers in submission order, optionally
    /// filtered by resource provider address.
    #[must_use]
    pub fn resource_offers(&self, resource_provider: Option<&str>) -> Vec<ResourceOffer> {
        let inner = self.inner.read();
        match resource_provider {
            Some(provider) => inner
                .resource_offers
                .iter()
                .filter(|offer| offer.resource_provider == provider)
                .cloned()
                .collect(),
            None => inner.resource_offers.clone(),
        }
    }

    /// Looks up a job offer by id. Absence is `None`, not an error.
    #[must_use]
    pub fn job_offer(&self, id: &str) -> Option<JobOffer> {
        self.inner.read().job_offer_index.get(id).cloned()
    }

    /// Looks up a resource offer by id. Absence is `None`, not an error.
    #[must_use]
    pub fn resource_offer(&self, id: &str) -> Option<ResourceOffer> {
        self.inner.read().resource_offer_index.get(id).cloned()
    }

    /// Removes a job offer by id.
    ///
    /// Offers are immutable once stamped, so comparing stored ids is
    /// equivalent to recomputing each entry's content id. Removing an
    /// absent id is a no-op.
    pub fn remove_job_offer(&self, id: &str) {
        let mut inner = self.inner.write();
        if inner.job_offer_index.remove(id).is_some() {
            inner.job_offers.retain(|offer| offer.id != id);
            debug!(offer = %id, "removed job offer");
        }
    }

    /// Removes a resource offer by id. Removing an absent id is a no-op.
    pub fn remove_resource_offer(&self, id: &str) {
        let mut inner = self.inner.write();
        if inner.resource_offer_index.remove(id).is_some() {
            inner.resource_offers.retain(|offer| offer.id != id);
            debug!(offer = %id, "removed resource offer");
        }
    }

    /// Number of open job offers (duplicates included).
    #[must_use]
    pub fn job_offer_count(&self) -> usize {
        self.inner.read().job_offers.len()
    }

    /// Number of open resource offers (duplicates included).
    #[must_use]
    pub fn resource_offer_count(&self) -> usize {
        self.inner.read().resource_offers.len()
    }
}
