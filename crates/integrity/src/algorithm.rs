use crate::consts::RDS_PREFIX;
use crate::error::{Error, ErrorKind};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::borrow::Cow;
use std::fmt::{Display, Formatter, Result as FmtResult};
use std::str::FromStr;

fn sanitize(s: impl AsRef<str>) -> String {
    s.as_ref().trim().to_lowercase().replace(['-', '_', ' '], "")
}

/// A hash algorithm the server can compute and an RDS can attest to.
///
/// Ordering follows declaration order, which is also the order hashes are
/// displayed in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Algorithm {
    Crc32,
    Md5,
    Sha1,
    Sha256,
    Crc64,
    Blake2sp,
}
impl Algorithm {
    pub const ALL: [Algorithm; 6] = [Self::Crc32, Self::Md5, Self::Sha1, Self::Sha256, Self::Crc64, Self::Blake2sp];

    /// Canonical spelling, as used for record keys.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Crc32 => "CRC32",
            Self::Md5 => "MD5",
            Self::Sha1 => "SHA1",
            Self::Sha256 => "SHA256",
            Self::Crc64 => "CRC64",
            Self::Blake2sp => "BLAKE2sp",
        }
    }

    /// Record key holding the attested value for this algorithm.
    ///
    /// ```
    /// use filestation_integrity::Algorithm;
    /// assert_eq!(Algorithm::Sha256.rds_key(), "RDS SHA256");
    /// ```
    pub fn rds_key(&self) -> String {
        format!("{RDS_PREFIX}{}", self.as_str())
    }

    /// Normalize a hex value before comparison or display.
    ///
    /// CRC64 is always upper-cased, whatever casing the server or the RDS
    /// used. Every other algorithm is compared verbatim.
    pub fn normalize<'a>(&self, value: &'a str) -> Cow<'a, str> {
        match self {
            Self::Crc64 => Cow::Owned(value.to_uppercase()),
            _ => Cow::Borrowed(value),
        }
    }
}
impl FromStr for Algorithm {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "crc32" => Self::Crc32,
            "md5" => Self::Md5,
            "sha1" => Self::Sha1,
            "sha256" => Self::Sha256,
            "crc64" => Self::Crc64,
            "blake2sp" => Self::Blake2sp,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "algorithm",
                value: s.to_string(),
            }),
        })
    }
}
impl Display for Algorithm {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.write_str(self.as_str())
    }
}
impl Serialize for Algorithm {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}
impl<'de> Deserialize<'de> for Algorithm {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(|_| serde::de::Error::custom(format!("unknown hash algorithm: {s}")))
    }
}

/// The algorithm sets shipped by server revisions.
///
/// Older deployments compute MD5 and stop at SHA256; newer ones dropped MD5 in
/// favour of CRC64 and BLAKE2sp. A deployment is one or the other, never both.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Profile {
    #[default]
    Modern,
    Legacy,
}
impl Profile {
    pub fn algorithms(&self) -> &'static [Algorithm] {
        match self {
            Self::Modern => &[
                Algorithm::Crc32,
                Algorithm::Sha1,
                Algorithm::Sha256,
                Algorithm::Crc64,
                Algorithm::Blake2sp,
            ],
            Self::Legacy => &[Algorithm::Crc32, Algorithm::Md5, Algorithm::Sha1, Algorithm::Sha256],
        }
    }
}
impl FromStr for Profile {
    type Err = Error;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match sanitize(s).as_str() {
            "modern" => Self::Modern,
            "legacy" => Self::Legacy,
            _ => exn::bail!(ErrorKind::ParseError {
                field: "profile",
                value: s.to_string(),
            }),
        })
    }
}
