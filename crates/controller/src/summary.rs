use filestation_integrity::consts::RDS_NUMBER;
use filestation_integrity::{Algorithm, FileMetadataRecord, IntegrityPolicy, Verdict};

/// A computed hash with its verdict against the attested value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HashLine {
    pub algorithm: Algorithm,
    /// Display form; CRC64 is always upper-case here.
    pub value: Option<String>,
    pub verdict: Verdict,
}

/// Read-only view of a record, grouped the way the drawer shows it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary {
    pub path: String,
    /// Everything that is neither a hash nor an RDS attestation.
    pub general: Vec<(String, String)>,
    /// One line per configured algorithm.
    pub hashes: Vec<HashLine>,
    /// The RDS number, then one attested value per configured algorithm.
    pub rds: Vec<(String, Option<String>)>,
}
impl Summary {
    pub fn build(path: &str, record: &FileMetadataRecord, policy: &IntegrityPolicy) -> Self {
        let verdicts = policy.reconcile(record);
        let hashes = policy
            .algorithms()
            .iter()
            .map(|algorithm| HashLine {
                algorithm: *algorithm,
                value: record.computed(*algorithm).map(|v| algorithm.normalize(v).into_owned()),
                verdict: verdicts.get(algorithm).copied().unwrap_or(Verdict::Indeterminate),
            })
            .collect();
        let mut rds = vec![(RDS_NUMBER.to_string(), record.rds_number().map(str::to_string))];
        rds.extend(policy.algorithms().iter().map(|algorithm| {
            let value = record.recorded(*algorithm).map(|v| algorithm.normalize(v).into_owned());
            (algorithm.rds_key(), value)
        }));
        Self {
            path: path.to_string(),
            general: record.general().map(|(k, v)| (k.to_string(), v.to_string())).collect(),
            hashes,
            rds,
        }
    }

    pub fn verdict(&self, algorithm: Algorithm) -> Option<Verdict> {
        self.hashes.iter().find(|line| line.algorithm == algorithm).map(|line| line.verdict)
    }
}
