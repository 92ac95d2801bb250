use crate::Algorithm;
use crate::consts::{FILE_PATH, RDS_NUMBER, RDS_NUMBER_ALIASES, RDS_PREFIX, UPLOADER, VERSION};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Hashes returned by a recompute request, keyed by algorithm name as the
/// server spells it.
pub type ComputedHashes = BTreeMap<String, String>;

/// Per-file metadata as stored by the server.
///
/// The server keeps a flat string map next to every uploaded file: who
/// uploaded it, the version it was given, whatever hashes were computed and
/// whatever an RDS attested. The record is fetched fresh every time it is
/// needed and never cached.
///
/// A field that is missing, or present but blank, means "not known". All of
/// the typed accessors below return `None` in both cases; use [`raw`](Self::raw)
/// to see exactly what the server sent.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FileMetadataRecord {
    fields: BTreeMap<String, String>,
}
impl FileMetadataRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Exactly what the server sent for `key`, blanks included.
    pub fn raw(&self, key: &str) -> Option<&str> {
        self.fields.get(key).map(String::as_str)
    }

    /// Trimmed value for `key`, or `None` when the field is absent or blank.
    pub fn value(&self, key: &str) -> Option<&str> {
        self.raw(key).map(str::trim).filter(|v| !v.is_empty())
    }

    pub fn uploader(&self) -> Option<&str> {
        self.value(UPLOADER)
    }

    pub fn version(&self) -> Option<&str> {
        self.value(VERSION)
    }

    /// The hash the server computed for `algorithm`.
    pub fn computed(&self, algorithm: Algorithm) -> Option<&str> {
        self.value(algorithm.as_str())
    }

    /// The hash an RDS attested for `algorithm`.
    pub fn recorded(&self, algorithm: Algorithm) -> Option<&str> {
        self.value(&algorithm.rds_key())
    }

    /// The RDS reference number and the key it was found under.
    ///
    /// Looks at the canonical key first, then the legacy aliases in order.
    /// The first non-blank value wins.
    pub fn rds_number_entry(&self) -> Option<(&'static str, &str)> {
        std::iter::once(RDS_NUMBER)
            .chain(RDS_NUMBER_ALIASES)
            .find_map(|key| self.value(key).map(|value| (key, value)))
    }

    pub fn rds_number(&self) -> Option<&str> {
        self.rds_number_entry().map(|(_, value)| value)
    }

    /// Whether an RDS has attested to anything about this file: any of the
    /// given algorithms, or the reference number.
    pub fn is_attested(&self, algorithms: &[Algorithm]) -> bool {
        self.rds_number().is_some() || algorithms.iter().any(|a| self.recorded(*a).is_some())
    }

    /// Fields that are neither hashes nor RDS attestations, in key order.
    pub fn general(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields
            .iter()
            .filter(|(key, _)| {
                key.as_str() != FILE_PATH
                    && key.as_str() != "RDS"
                    && !key.starts_with(RDS_PREFIX)
                    && key.parse::<Algorithm>().is_err()
            })
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.fields.insert(key.into(), value.into());
    }

    /// Replace the computed hashes with freshly recalculated ones.
    ///
    /// Keys that do not name a known algorithm are ignored. Recognised keys
    /// are stored under their canonical spelling.
    pub fn overlay_hashes(&mut self, hashes: &ComputedHashes) {
        for (key, value) in hashes {
            match key.parse::<Algorithm>() {
                Ok(algorithm) => self.set(algorithm.as_str(), value.as_str()),
                Err(_) => tracing::debug!(key = %key, "Ignoring unknown algorithm in recomputed hashes"),
            }
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}
impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for FileMetadataRecord {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            fields: iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect(),
        }
    }
}
