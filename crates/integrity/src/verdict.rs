use crate::{Algorithm, FileMetadataRecord};
use std::collections::BTreeMap;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Outcome of comparing a computed hash with its attested counterpart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Verdict {
    /// Both sides present and equal.
    Match,
    /// Both sides present and different.
    Mismatch,
    /// At least one side is missing, so nothing can be said.
    Indeterminate,
}
impl Verdict {
    /// Compare a computed value against a recorded one for `algorithm`.
    ///
    /// Blank values count as absent. Present values are compared exactly as
    /// given, surrounding whitespace included.
    ///
    /// ```
    /// use filestation_integrity::{Algorithm, Verdict};
    /// assert_eq!(Verdict::compare(Algorithm::Crc64, Some("ab"), Some("AB")), Verdict::Match);
    /// assert_eq!(Verdict::compare(Algorithm::Sha1, Some("ab"), Some("AB")), Verdict::Mismatch);
    /// assert_eq!(Verdict::compare(Algorithm::Sha1, Some("ab"), Some(" ")), Verdict::Indeterminate);
    /// assert_eq!(Verdict::compare(Algorithm::Sha1, Some("ab "), Some("ab")), Verdict::Mismatch);
    /// ```
    pub fn compare(algorithm: Algorithm, computed: Option<&str>, recorded: Option<&str>) -> Self {
        match (present(computed), present(recorded)) {
            (Some(computed), Some(recorded)) if algorithm.normalize(computed) == algorithm.normalize(recorded) => {
                Self::Match
            },
            (Some(_), Some(_)) => Self::Mismatch,
            _ => Self::Indeterminate,
        }
    }

    /// Glyph shown next to the hash.
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Match => "✓",
            Self::Mismatch => "✗",
            Self::Indeterminate => "?",
        }
    }

    /// Colour the glyph is rendered in.
    pub fn colour(&self) -> &'static str {
        match self {
            Self::Match => "green",
            Self::Mismatch => "red",
            Self::Indeterminate => "grey",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Match => "match",
            Self::Mismatch => "mismatch",
            Self::Indeterminate => "indeterminate",
        }
    }
}
impl Display for Verdict {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

fn present(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

/// Per-algorithm verdicts for a single record.
pub type Verdicts = BTreeMap<Algorithm, Verdict>;

/// Reconcile every algorithm in `algorithms` against `record`.
///
/// Pure: no I/O, no errors. Algorithms not listed are not looked at, even if
/// the record carries values for them.
pub fn reconcile(record: &FileMetadataRecord, algorithms: &[Algorithm]) -> Verdicts {
    algorithms
        .iter()
        .map(|algorithm| {
            let computed = record.raw(algorithm.as_str());
            let recorded = record.raw(&algorithm.rds_key());
            let verdict = Verdict::compare(*algorithm, computed, recorded);
            (*algorithm, verdict)
        })
        .collect()
}
