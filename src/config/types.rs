use serde::{Deserialize, Serialize};
use std::time::Duration;

pub use subforge_av::ToolPaths;

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub tools: ToolPaths,

    #[serde(default)]
    pub extract: ExtractConfig,

    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractConfig {
    /// Containers processed concurrently (default: 1)
    #[serde(default = "default_jobs")]
    pub jobs: usize,

    /// Upper bound for a single decode, in seconds (default: unbounded)
    #[serde(default)]
    pub decode_timeout_secs: Option<u64>,
}

impl ExtractConfig {
    pub fn decode_timeout(&self) -> Option<Duration> {
        self.decode_timeout_secs.map(Duration::from_secs)
    }
}

fn default_jobs() -> usize {
    1
}

impl Default for ExtractConfig {
    fn default() -> Self {
        Self {
            jobs: default_jobs(),
            decode_timeout_secs: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}
