//! Reference data configuration
//!
//! A data directory, when set, wins over the URL.

use std::path::PathBuf;
use std::time::Duration;

use tracing::debug;

use crate::jurisdiction::{DirectorySource, HttpSource, ReferenceSource};

pub const DEFAULT_REFERENCE_URL: &str =
    "https://raw.githubusercontent.com/opencivicdata/ocd-division-ids/master/identifiers/country-ca";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Where reference tables come from and how long to wait for them
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceConfig {
    pub base_url: String,
    pub data_dir: Option<PathBuf>,
    pub timeout: Duration,
}

impl Default for ReferenceConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_REFERENCE_URL.to_string(),
            data_dir: None,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl ReferenceConfig {
    /// The source these settings describe
    pub fn source(&self) -> Box<dyn ReferenceSource> {
        match &self.data_dir {
            Some(dir) => {
                debug!(dir = %dir.display(), "using reference directory");
                Box::new(DirectorySource::new(dir.clone()))
            }
            None => {
                debug!(url = %self.base_url, timeout = ?self.timeout, "using reference URL");
                Box::new(HttpSource::new(&self.base_url, self.timeout))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ReferenceConfig::default();
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert_eq!(config.data_dir, None);
        assert!(config.base_url.ends_with("/identifiers/country-ca"));
    }

    #[test]
    fn test_directory_source_is_used_when_set() {
        let config = ReferenceConfig {
            data_dir: Some(std::path::Path::new(env!("CARGO_MANIFEST_DIR")).join("../../tests/fixtures/reference")),
            ..ReferenceConfig::default()
        };
        let data = crate::jurisdiction::ReferenceData::load(config.source().as_ref()).unwrap();
        assert_eq!(data.name("ocd-division/country:ca/cd:3521").unwrap(), "Peel");
    }

    #[test]
    fn test_unreachable_url_is_an_error() {
        let config = ReferenceConfig {
            base_url: "http://127.0.0.1:9/country-ca".to_string(),
            timeout: Duration::from_secs(2),
            ..ReferenceConfig::default()
        };
        assert!(crate::jurisdiction::ReferenceData::load(config.source().as_ref()).is_err());
    }
}
