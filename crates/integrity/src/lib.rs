//! RDS attestation model.
//!
//! A file on the server carries computed hashes next to values attested by a
//! reference dataset (RDS). This crate compares the two, aggregates the
//! result into a per-file [`RowStatus`], and builds the minimal diff an edit
//! sends back. Nothing in here does I/O.

mod algorithm;
pub mod consts;
pub mod error;
mod form;
mod record;
mod status;
mod verdict;

pub use crate::algorithm::{Algorithm, Profile};
pub use crate::form::{Changes, EditForm, FormField, UpdatePayload};
pub use crate::record::{ComputedHashes, FileMetadataRecord};
pub use crate::status::{ExtensionFilter, IntegrityPolicy, RowStatus};
pub use crate::verdict::{Verdict, Verdicts, reconcile};
