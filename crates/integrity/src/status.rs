use crate::consts::DEFAULT_EXCLUDED_EXTENSIONS;
use crate::verdict::{Verdict, Verdicts, reconcile};
use crate::{Algorithm, FileMetadataRecord, Profile};
use std::collections::BTreeSet;
use std::fmt::{Display, Formatter, Result as FmtResult};

/// Aggregate integrity state of one listed file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RowStatus {
    /// At least one algorithm matched its attestation.
    Verified,
    /// Something was attested but nothing matched.
    Broken,
    /// Nothing attested yet.
    Unattested,
    /// Nothing attested and the file type never is; shown as a blank placeholder.
    Hidden,
}
impl RowStatus {
    pub fn symbol(&self) -> &'static str {
        match self {
            Self::Verified => "✓",
            Self::Broken => "✗",
            Self::Unattested => "?",
            Self::Hidden => " ",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Verified => "verified",
            Self::Broken => "broken",
            Self::Unattested => "unattested",
            Self::Hidden => "hidden",
        }
    }
}
impl Display for RowStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}

/// Case-insensitive set of file extensions, stored without the leading dot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtensionFilter {
    extensions: BTreeSet<String>,
}
impl ExtensionFilter {
    pub fn new(extensions: impl IntoIterator<Item = impl AsRef<str>>) -> Self {
        Self {
            extensions: extensions
                .into_iter()
                .map(|ext| ext.as_ref().trim().trim_start_matches('.').to_lowercase())
                .filter(|ext| !ext.is_empty())
                .collect(),
        }
    }

    /// Whether the final extension of `path` is in the set.
    ///
    /// Only the file name is looked at, so a dotted directory never matches.
    pub fn matches(&self, path: &str) -> bool {
        let name = path.rsplit('/').next().unwrap_or(path);
        match name.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() => self.extensions.contains(&ext.to_lowercase()),
            _ => false,
        }
    }
}
impl Default for ExtensionFilter {
    fn default() -> Self {
        Self::new(DEFAULT_EXCLUDED_EXTENSIONS)
    }
}

/// The deployment's integrity rules: which algorithms it computes and which
/// file types are never attested.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IntegrityPolicy {
    algorithms: Vec<Algorithm>,
    excluded: ExtensionFilter,
}
impl IntegrityPolicy {
    /// Algorithms are de-duplicated and put in display order.
    pub fn new(algorithms: impl IntoIterator<Item = Algorithm>, excluded: ExtensionFilter) -> Self {
        let algorithms: BTreeSet<Algorithm> = algorithms.into_iter().collect();
        Self {
            algorithms: algorithms.into_iter().collect(),
            excluded,
        }
    }

    pub fn from_profile(profile: Profile) -> Self {
        Self::new(profile.algorithms().iter().copied(), ExtensionFilter::default())
    }

    pub fn algorithms(&self) -> &[Algorithm] {
        &self.algorithms
    }

    pub fn excluded(&self) -> &ExtensionFilter {
        &self.excluded
    }

    pub fn reconcile(&self, record: &FileMetadataRecord) -> Verdicts {
        reconcile(record, &self.algorithms)
    }

    /// Row status of the file at `path`, given its freshly fetched record.
    pub fn row_status(&self, path: &str, record: &FileMetadataRecord) -> RowStatus {
        let verdicts = self.reconcile(record);
        if verdicts.values().any(|v| *v == Verdict::Match) {
            RowStatus::Verified
        } else if record.is_attested(&self.algorithms) {
            RowStatus::Broken
        } else if self.excluded.matches(path) {
            RowStatus::Hidden
        } else {
            RowStatus::Unattested
        }
    }
}
impl Default for IntegrityPolicy {
    fn default() -> Self {
        Self::from_profile(Profile::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn record(fields: &[(&str, &str)]) -> FileMetadataRecord {
        fields.iter().copied().collect()
    }

    #[rstest]
    #[case("notes.md", true)]
    #[case("README.MD", true)]
    #[case("dir/report.Html", true)]
    #[case("log.txt", true)]
    #[case("image.bin", false)]
    #[case("archive.tar.gz", false)]
    #[case("md", false)]
    #[case(".md", false)]
    #[case("docs.md/firmware", false)]
    fn test_default_extension_filter(#[case] path: &str, #[case] expected: bool) {
        assert_eq!(ExtensionFilter::default().matches(path), expected);
    }

    #[test]
    fn test_extension_filter_normalizes_input() {
        let filter = ExtensionFilter::new([".PDF", " log ", ""]);
        assert!(filter.matches("a.pdf"));
        assert!(filter.matches("b.LOG"));
        assert!(!filter.matches("c.md"));
    }

    #[rstest]
    #[case("fw.bin", &[("CRC32", "AB12"), ("RDS CRC32", "AB12")], RowStatus::Verified)]
    #[case("fw.bin", &[("CRC32", "AB12"), ("RDS CRC32", "CD34")], RowStatus::Broken)]
    #[case("fw.bin", &[("CRC32", "AB12"), ("RDS Number", "4")], RowStatus::Broken)]
    #[case("fw.bin", &[("CRC32", "AB12"), ("RDS", "4")], RowStatus::Broken)]
    #[case("fw.bin", &[("CRC32", "AB12")], RowStatus::Unattested)]
    #[case("fw.bin", &[], RowStatus::Unattested)]
    #[case("notes.md", &[("CRC32", "AB12")], RowStatus::Hidden)]
    #[case("notes.md", &[("CRC32", "AB12"), ("RDS CRC32", "CD34")], RowStatus::Broken)]
    #[case("notes.md", &[("CRC32", "AB12"), ("RDS CRC32", "AB12")], RowStatus::Verified)]
    fn test_row_status(#[case] path: &str, #[case] fields: &[(&str, &str)], #[case] expected: RowStatus) {
        let policy = IntegrityPolicy::default();
        assert_eq!(policy.row_status(path, &record(fields)), expected);
    }

    #[test]
    fn test_any_match_is_enough() {
        let policy = IntegrityPolicy::default();
        let record = record(&[("CRC32", "AB12"), ("RDS CRC32", "AB12"), ("SHA1", "aa"), ("RDS SHA1", "bb")]);
        assert_eq!(policy.row_status("fw.bin", &record), RowStatus::Verified);
    }

    #[test]
    fn test_attestations_outside_the_profile_are_ignored() {
        let policy = IntegrityPolicy::from_profile(Profile::Modern);
        let record = record(&[("MD5", "aa"), ("RDS MD5", "aa")]);
        assert_eq!(policy.row_status("fw.bin", &record), RowStatus::Unattested);
        let legacy = IntegrityPolicy::from_profile(Profile::Legacy);
        assert_eq!(legacy.row_status("fw.bin", &record), RowStatus::Verified);
    }

    #[test]
    fn test_algorithms_are_ordered_and_unique() {
        let policy = IntegrityPolicy::new([Algorithm::Sha256, Algorithm::Crc32, Algorithm::Sha256], Default::default());
        assert_eq!(policy.algorithms(), &[Algorithm::Crc32, Algorithm::Sha256]);
    }
}
