use crate::consts::{FILE_PATH, RDS_NUMBER, RDS_NUMBER_ALIASES, UPLOADER, VERSION};
use crate::error::{ErrorKind, Result};
use crate::{Algorithm, FileMetadataRecord};
use serde::Serialize;
use std::collections::BTreeMap;

/// One editable field: its record key, the value it started with and the
/// value it holds now.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormField {
    pub key: String,
    pub original: String,
    pub value: String,
}
impl FormField {
    pub fn is_modified(&self) -> bool {
        self.value != self.original
    }
}

/// The editable view of a [`FileMetadataRecord`].
///
/// Holds `Uploader`, `Version`, the RDS number and one attested hash per
/// configured algorithm, in that order. Computed hashes never appear here.
///
/// The RDS number starts from whichever alias the record used and is written
/// back under the canonical key. Legacy keys that held a value get the same
/// new value, so they can't shadow it on the next read.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditForm {
    fields: Vec<FormField>,
    rds_aliases: Vec<&'static str>,
}
impl EditForm {
    pub fn new(record: &FileMetadataRecord, algorithms: &[Algorithm]) -> Self {
        let initial = |key: &str, value: Option<&str>| FormField {
            key: key.to_string(),
            original: value.unwrap_or_default().to_string(),
            value: value.unwrap_or_default().to_string(),
        };
        let mut fields = vec![
            initial(UPLOADER, record.uploader()),
            initial(VERSION, record.version()),
            initial(RDS_NUMBER, record.rds_number()),
        ];
        fields.extend(algorithms.iter().map(|a| initial(&a.rds_key(), record.recorded(*a))));
        let rds_aliases = RDS_NUMBER_ALIASES
            .into_iter()
            .filter(|key| record.value(key).is_some())
            .collect();
        Self { fields, rds_aliases }
    }

    pub fn fields(&self) -> &[FormField] {
        &self.fields
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        let key = Self::canonical(key);
        self.fields.iter().find(|f| f.key == key).map(|f| f.value.as_str())
    }

    /// Set a field's value. Surrounding whitespace is dropped.
    ///
    /// Legacy RDS number keys are accepted and land on the canonical key.
    /// Anything else that is not an editable field is rejected.
    pub fn set(&mut self, key: &str, value: impl AsRef<str>) -> Result<()> {
        let canonical = Self::canonical(key);
        match self.fields.iter_mut().find(|f| f.key == canonical) {
            Some(field) => {
                field.value = value.as_ref().trim().to_string();
                Ok(())
            },
            None => exn::bail!(ErrorKind::NotEditable(key.to_string())),
        }
    }

    /// Whether any field differs from what the record held.
    pub fn is_dirty(&self) -> bool {
        self.fields.iter().any(FormField::is_modified)
    }

    /// Field-by-field diff against the original record.
    ///
    /// A changed RDS number is also sent under every legacy key the record
    /// held it under.
    pub fn changes(&self) -> Changes {
        let mut changes = BTreeMap::new();
        for field in self.fields.iter().filter(|f| f.is_modified()) {
            if field.key == RDS_NUMBER {
                for alias in &self.rds_aliases {
                    changes.insert(alias.to_string(), field.value.clone());
                }
            }
            changes.insert(field.key.clone(), field.value.clone());
        }
        Changes(changes)
    }

    fn canonical(key: &str) -> &str {
        match RDS_NUMBER_ALIASES.contains(&key) {
            true => RDS_NUMBER,
            false => key,
        }
    }
}

/// Only the fields that were modified, keyed by record key.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Changes(BTreeMap<String, String>);
impl Changes {
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Attach the target path, producing the body for a save request.
    pub fn into_payload(self, file_path: impl Into<String>) -> UpdatePayload {
        UpdatePayload {
            fields: self.0,
            file_path: file_path.into(),
        }
    }
}

/// Body of a save-metadata request: the changed fields plus `FilePath`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UpdatePayload {
    #[serde(flatten)]
    fields: BTreeMap<String, String>,
    #[serde(rename = "FilePath")]
    file_path: String,
}
impl UpdatePayload {
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn fields(&self) -> impl Iterator<Item = (&str, &str)> {
        self.fields.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// All keys that will be sent, `FilePath` included.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.fields.keys().map(String::as_str).collect();
        keys.push(FILE_PATH);
        keys.sort_unstable();
        keys
    }
}
