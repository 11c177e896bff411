//! Content-addressable identity for marketplace records.
//!
//! Every record that carries an `id` derives it from its own contents:
//! the id field is cleared, the record is canonically encoded, hashed
//! with a per-type domain tag, and the digest is stamped back on. Two
//! records with identical contents therefore always share an id, which
//! is what lets the store find a record to delete by value alone.
//!
//! Determinism rests on two properties of the encoding: struct fields
//! serialize in declaration order, and every map in the data model is a
//! `BTreeMap`, so key order never varies.

use serde::Serialize;

use crate::error::DataError;

/// A record whose identity is a digest of its own contents.
pub trait ContentAddressed: Serialize + Clone {
    /// Domain-separation tag mixed into the hash input.
    const DOMAIN: &'static str;

    /// Returns a copy of the record with its id field cleared.
    fn with_cleared_id(&self) -> Self;

    /// The currently stamped id (empty until computed).
    fn id(&self) -> &str;

    /// Stamps an id onto the record.
    fn set_id(&mut self, id: String);

    /// Computes the content id over the record with its id cleared.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Identity`] if the record cannot be encoded.
    fn compute_id(&self) -> Result<String, DataError> {
        let cleared = self.with_cleared_id();
        let encoded = serde_json::to_vec(&cleared)?;
        let mut hasher = blake3::Hasher::new();
        hasher.update(Self::DOMAIN.as_bytes());
        hasher.update(&encoded);
        Ok(hasher.finalize().to_hex().to_string())
    }

    /// Computes the content id and stamps it back onto the record.
    ///
    /// # Errors
    ///
    /// Returns [`DataError::Identity`] if the record cannot be encoded.
    fn stamp_id(&mut self) -> Result<&str, DataError> {
        let id = self.compute_id()?;
        self.set_id(id);
        Ok(self.id())
    }
}
