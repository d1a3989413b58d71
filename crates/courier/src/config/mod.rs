//! Configuration types for Courier clients.

mod transport;

use std::path::Path;

use serde::{Deserialize, Serialize};

pub use transport::TransportConfig;

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ClientConfig {
    /// Prepended to every request URL and every non-wildcard filter URL.
    #[serde(default)]
    pub base_url: String,

    /// Substitute mock overrides for real dispatch wherever one is supplied.
    #[serde(default)]
    pub mock: bool,

    #[serde(default)]
    pub transport: TransportConfig,
}

impl ClientConfig {
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            ..Self::default()
        }
    }

    pub fn with_mock(mut self, mock: bool) -> Self {
        self.mock = mock;
        self
    }

    /// Load from a YAML (`.yaml`/`.yml`) or JSON file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, anyhow::Error> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)?;
        let config: ClientConfig = match path.extension().and_then(|e| e.to_str()) {
            Some("json") => serde_json::from_str(&contents)?,
            _ => serde_yaml::from_str(&contents)?,
        };
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), anyhow::Error> {
        if !self.base_url.is_empty()
            && !self.base_url.starts_with("http://")
            && !self.base_url.starts_with("https://")
        {
            anyhow::bail!(
                "Invalid base_url '{}': must start with http:// or https://",
                self.base_url
            );
        }

        // Filter key strings are space separated
        if self.base_url.contains(char::is_whitespace) {
            anyhow::bail!("Invalid base_url '{}': must not contain whitespace", self.base_url);
        }

        if self.transport.connect_timeout_secs == 0 {
            anyhow::bail!("transport.connect_timeout_secs must be greater than 0");
        }

        Ok(())
    }
}
