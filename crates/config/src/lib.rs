//! Layered configuration.
//!
//! Values are read, lowest priority first, from:
//!
//! 1. compiled-in defaults;
//! 2. `config.toml` in the platform config directory, or the file given
//!    explicitly (which must then exist);
//! 3. `FILESTATION_*` environment variables, nested with `__`
//!    (`FILESTATION_SERVER__URL`, `FILESTATION_INTEGRITY__PROFILE`).
//!
//! ```toml
//! [server]
//! url = "https://files.example.org"
//!
//! [integrity]
//! profile = "legacy"
//! excluded_extensions = ["md", "html", "txt", "pdf"]
//!
//! [ui]
//! download_policy = "any-selection"
//! hash_worker = false
//! ```

pub mod error;

use crate::error::{ErrorKind, Result};
use directories::ProjectDirs;
use exn::ResultExt;
use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use filestation_controller::DownloadPolicy;
use filestation_integrity::consts::DEFAULT_EXCLUDED_EXTENSIONS;
use filestation_integrity::{Algorithm, ExtensionFilter, IntegrityPolicy, Profile};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::instrument;

pub const ENV_PREFIX: &str = "FILESTATION_";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub url: String,
}
impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            url: "http://localhost:8080".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntegrityConfig {
    pub profile: Profile,
    /// Overrides the profile when set.
    pub algorithms: Option<Vec<Algorithm>>,
    pub excluded_extensions: Vec<String>,
}
impl Default for IntegrityConfig {
    fn default() -> Self {
        Self {
            profile: Profile::default(),
            algorithms: None,
            excluded_extensions: DEFAULT_EXCLUDED_EXTENSIONS.iter().map(|e| e.to_string()).collect(),
        }
    }
}
impl IntegrityConfig {
    pub fn algorithms(&self) -> &[Algorithm] {
        self.algorithms.as_deref().unwrap_or(self.profile.algorithms())
    }

    pub fn policy(&self) -> IntegrityPolicy {
        IntegrityPolicy::new(self.algorithms().iter().copied(), ExtensionFilter::new(&self.excluded_extensions))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    pub download_policy: DownloadPolicy,
    /// Send hash recalculation through a background task.
    pub hash_worker: bool,
}
impl Default for UiConfig {
    fn default() -> Self {
        Self {
            download_policy: DownloadPolicy::default(),
            hash_worker: true,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub integrity: IntegrityConfig,
    pub ui: UiConfig,
}
impl Config {
    /// Load every layer. `path` replaces the platform config file and must
    /// exist; the platform file is optional.
    #[instrument(skip_all)]
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let file = match path {
            Some(path) => {
                if !path.is_file() {
                    exn::bail!(ErrorKind::NotFound(path.display().to_string()));
                }
                Some(path.to_path_buf())
            },
            None => default_path(),
        };
        tracing::debug!(file = ?file, "Loading configuration");
        Self::from_figment(Self::figment(file.as_deref()).merge(Env::prefixed(ENV_PREFIX).split("__")))
    }

    /// Defaults with `file` merged over them, if given. Missing files are
    /// skipped.
    pub fn figment(file: Option<&Path>) -> Figment {
        let figment = Figment::from(Serialized::defaults(Self::default()));
        match file {
            Some(file) => figment.merge(Toml::file(file)),
            None => figment,
        }
    }

    /// Extract and validate.
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: Self = figment.extract().or_raise(|| ErrorKind::Invalid)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<()> {
        if self.integrity.algorithms().is_empty() {
            exn::bail!(ErrorKind::Value {
                key: "integrity.algorithms",
                reason: "at least one algorithm is required".to_string(),
            });
        }
        let url = self.server.url.trim();
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            exn::bail!(ErrorKind::Value {
                key: "server.url",
                reason: format!("expected an http(s) URL, found '{url}'"),
            });
        }
        Ok(())
    }
}

/// `config.toml` in the platform config directory, when there is one.
pub fn default_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "filestation").map(|dirs| dirs.config_dir().join(CONFIG_FILE))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::io::Write;

    fn toml_file(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_defaults() {
        let config = Config::from_figment(Config::figment(None)).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.server.url, "http://localhost:8080");
        assert_eq!(config.integrity.algorithms(), Profile::Modern.algorithms());
        assert_eq!(config.ui.download_policy, DownloadPolicy::FilesOnly);
        assert!(config.ui.hash_worker);
        assert!(config.integrity.policy().excluded().matches("README.md"));
    }

    #[test]
    fn test_file_overrides_defaults() {
        let file = toml_file(
            r#"
            [server]
            url = "https://files.example.org"

            [integrity]
            profile = "legacy"
            excluded_extensions = [".PDF"]

            [ui]
            download_policy = "any-selection"
            "#,
        );
        let config = Config::from_figment(Config::figment(Some(file.path()))).unwrap();
        assert_eq!(config.server.url, "https://files.example.org");
        assert_eq!(config.integrity.algorithms(), Profile::Legacy.algorithms());
        assert_eq!(config.ui.download_policy, DownloadPolicy::AnySelection);
        assert!(config.ui.hash_worker);
        let policy = config.integrity.policy();
        assert!(policy.excluded().matches("report.pdf"));
        assert!(!policy.excluded().matches("README.md"));
    }

    #[test]
    fn test_explicit_algorithms_win() {
        let file = toml_file(
            r#"
            [integrity]
            profile = "legacy"
            algorithms = ["sha-256", "crc64"]
            "#,
        );
        let config = Config::from_figment(Config::figment(Some(file.path()))).unwrap();
        assert_eq!(config.integrity.algorithms(), [Algorithm::Sha256, Algorithm::Crc64]);
    }

    #[test]
    fn test_later_layers_win() {
        let file = toml_file("[integrity]\nprofile = \"legacy\"\n");
        let figment = Config::figment(Some(file.path())).merge(("integrity.profile", "modern"));
        let config = Config::from_figment(figment).unwrap();
        assert_eq!(config.integrity.profile, Profile::Modern);
    }

    #[rstest]
    #[case::profile("[integrity]\nprofile = \"ancient\"\n")]
    #[case::algorithm("[integrity]\nalgorithms = [\"whirlpool\"]\n")]
    #[case::policy("[ui]\ndownload_policy = \"never\"\n")]
    #[case::syntax("[server\n")]
    fn test_bad_values_fail_fast(#[case] contents: &str) {
        let file = toml_file(contents);
        let err = Config::from_figment(Config::figment(Some(file.path()))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Invalid));
    }

    #[rstest]
    #[case::no_algorithms("[integrity]\nalgorithms = []\n", "integrity.algorithms")]
    #[case::url("[server]\nurl = \"ftp://files\"\n", "server.url")]
    fn test_inconsistent_values(#[case] contents: &str, #[case] expected: &str) {
        let file = toml_file(contents);
        let err = Config::from_figment(Config::figment(Some(file.path()))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::Value { key, .. } if *key == expected));
    }

    #[test]
    fn test_missing_explicit_file() {
        let dir = tempfile::tempdir().unwrap();
        let err = Config::load(Some(&dir.path().join("nope.toml"))).unwrap_err();
        assert!(matches!(&*err, ErrorKind::NotFound(_)));
    }
}
