//! TOML run configuration.
//!
//! ```toml
//! [ads]
//! base_url = "https://api.adsabs.harvard.edu/v1"
//! timeout_secs = 10
//! max_retries = 3
//! token_env = "ADS_API_TOKEN"
//!
//! [ranking]
//! citation_bounds = [0, 1, 2, 4, 10]
//! page_cap = 2000
//! library_rows = 1000
//! parallel = false
//! isolate_failures = false
//!
//! [output]
//! directory = "."
//! ```
//!
//! Every key is optional. The API token is never read from this file; it
//! comes from `--token` or the environment variable named by `token_env`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use citerank_core::catalog::ads::{DEFAULT_BASE_URL, DEFAULT_TIMEOUT_SECS};
use citerank_core::catalog::AdsSettings;
use citerank_core::domain::{
    BoundsError, CitationBounds, DEFAULT_CITATION_BOUNDS, DEFAULT_PAGE_CAP, OPEN_END_SENTINEL,
};
use citerank_core::rank::DEFAULT_LIBRARY_ROWS;
use citerank_core::{RankError, RankSettings};
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const DEFAULT_TOKEN_ENV: &str = "ADS_API_TOKEN";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("invalid citation bounds: {0}")]
    Bounds(#[from] BoundsError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Upper bound for `ads.max_retries`.
pub const MAX_RETRIES: u32 = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct RankConfig {
    pub ads: AdsSection,
    pub ranking: RankingSection,
    pub output: OutputSection,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AdsSection {
    pub base_url: String,
    pub timeout_secs: u64,
    pub max_retries: u32,
    pub retry_base_delay_ms: u64,
    /// Environment variable holding the API token.
    pub token_env: String,
}

impl Default for AdsSection {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            max_retries: 3,
            retry_base_delay_ms: 500,
            token_env: DEFAULT_TOKEN_ENV.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RankingSection {
    pub citation_bounds: Vec<u32>,
    pub sentinel: u32,
    pub page_cap: usize,
    pub library_rows: usize,
    pub collection: String,
    pub refereed: bool,
    /// Rank library papers concurrently (results keep library order).
    pub parallel: bool,
    /// Record per-paper failures instead of aborting the batch.
    pub isolate_failures: bool,
}

impl Default for RankingSection {
    fn default() -> Self {
        Self {
            citation_bounds: DEFAULT_CITATION_BOUNDS.to_vec(),
            sentinel: OPEN_END_SENTINEL,
            page_cap: DEFAULT_PAGE_CAP,
            library_rows: DEFAULT_LIBRARY_ROWS,
            collection: citerank_core::catalog::ASTRONOMY_COLLECTION.to_string(),
            refereed: true,
            parallel: false,
            isolate_failures: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputSection {
    pub directory: PathBuf,
}

impl Default for OutputSection {
    fn default() -> Self {
        Self {
            directory: PathBuf::from("."),
        }
    }
}

impl RankConfig {
    /// Load and validate a config file.
    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    /// Parse and validate a TOML string.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        let config: RankConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.ads.timeout_secs == 0 {
            return Err(ConfigError::Invalid("ads.timeout_secs must be > 0".into()));
        }
        if self.ads.max_retries > MAX_RETRIES {
            return Err(ConfigError::Invalid(format!(
                "ads.max_retries must be at most {MAX_RETRIES}"
            )));
        }
        if self.ads.token_env.trim().is_empty() {
            return Err(ConfigError::Invalid("ads.token_env must not be empty".into()));
        }
        self.rank_settings()?;
        Ok(())
    }

    pub fn rank_settings(&self) -> Result<RankSettings, ConfigError> {
        let r = &self.ranking;
        let bounds = CitationBounds::with_sentinel(r.citation_bounds.clone(), r.sentinel)?;
        let settings = RankSettings {
            bounds,
            page_cap: r.page_cap,
            collection: r.collection.clone(),
            refereed: r.refereed,
            library_rows: r.library_rows,
        };
        settings.validate().map_err(|e| match e {
            RankError::InvalidSettings(msg) => ConfigError::Invalid(msg),
            other => ConfigError::Invalid(other.to_string()),
        })?;
        Ok(settings)
    }

    pub fn ads_settings(&self) -> AdsSettings {
        AdsSettings {
            base_url: self.ads.base_url.clone(),
            timeout: Duration::from_secs(self.ads.timeout_secs),
            max_retries: self.ads.max_retries,
            base_delay: Duration::from_millis(self.ads.retry_base_delay_ms),
        }
    }

    pub fn run_options(&self) -> crate::batch::RunOptions {
        crate::batch::RunOptions {
            parallel: self.ranking.parallel,
            isolate_failures: self.ranking.isolate_failures,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_file_gives_defaults() {
        let config = RankConfig::from_toml("").unwrap();
        assert_eq!(config, RankConfig::default());
        let settings = config.rank_settings().unwrap();
        assert_eq!(settings, RankSettings::default());
        assert_eq!(config.ads_settings().timeout, Duration::from_secs(10));
    }

    #[test]
    fn partial_sections_keep_other_defaults() {
        let config = RankConfig::from_toml(
            r#"
            [ranking]
            citation_bounds = [0, 2, 5, 20, 100]
            parallel = true
            "#,
        )
        .unwrap();
        assert_eq!(config.ranking.page_cap, 2000);
        assert!(config.run_options().parallel);
        assert_eq!(
            config.rank_settings().unwrap().bounds.as_slice(),
            &[0, 2, 5, 20, 100]
        );
    }

    #[test]
    fn bad_bounds_rejected() {
        let err = RankConfig::from_toml("[ranking]\ncitation_bounds = [0, 4, 2]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Bounds(_)));
    }

    #[test]
    fn zero_page_cap_rejected() {
        let err = RankConfig::from_toml("[ranking]\npage_cap = 0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn excessive_retries_rejected() {
        let err = RankConfig::from_toml("[ads]\nmax_retries = 40\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(msg) if msg.contains("max_retries")));
        assert!(RankConfig::from_toml("[ads]\nmax_retries = 10\n").is_ok());
    }

    #[test]
    fn unknown_keys_rejected() {
        let err = RankConfig::from_toml("[ads]\ntoken = \"abc\"\n").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn missing_file_is_io_error() {
        let err = RankConfig::from_file(Path::new("/definitely/not/here.toml")).unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
