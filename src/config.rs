use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FeltConfig {
    #[serde(default)]
    pub serial: SerialConfig,
}

/// Serial link parameters. `port` left unset means the daemon runs with
/// notifications disabled.
#[derive(Debug, Clone, Deserialize)]
pub struct SerialConfig {
    #[serde(default)]
    pub port: Option<String>,
    #[serde(default = "default_baud")]
    pub baud: u32,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: f64,
}

impl SerialConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs_f64(self.timeout_secs)
    }
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port: None,
            baud: default_baud(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

fn default_baud() -> u32 {
    9600
}

fn default_timeout_secs() -> f64 {
    1.0
}

impl FeltConfig {
    /// Load a [`FeltConfig`] from a TOML file.
    pub async fn load<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let text = tokio::fs::read_to_string(path).await?;
        Ok(toml::from_str(&text)?)
    }
}
