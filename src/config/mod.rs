mod types;

pub use types::*;

use anyhow::{Context, Result};
use std::path::Path;

/// Environment variable that overrides the configured server port.
pub const PORT_ENV: &str = "LISTEN_PORT";

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<Config> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file: {:?}", path))?;

    let config: Config = toml::from_str(&content)
        .with_context(|| format!("Failed to parse config file: {:?}", path))?;

    validate_config(&config)?;

    Ok(config)
}

/// Load config from default locations or return default config
pub fn load_config_or_default(custom_path: Option<&Path>) -> Result<Config> {
    if let Some(path) = custom_path {
        return load_config(path);
    }

    let default_paths = [
        "./subforge.toml",
        "~/.config/subforge/config.toml",
        "/etc/subforge/config.toml",
    ];

    for path_str in default_paths {
        let path = shellexpand::tilde(path_str);
        let path = Path::new(path.as_ref());
        if path.exists() {
            tracing::debug!("Using config file {:?}", path);
            return load_config(path);
        }
    }

    Ok(Config::default())
}

/// Apply `LISTEN_PORT` on top of the loaded server section.
pub fn apply_env_overrides(config: &mut Config) -> Result<()> {
    if let Ok(raw) = std::env::var(PORT_ENV) {
        config.server.port = raw
            .trim()
            .parse()
            .with_context(|| format!("{} is not a valid port: {:?}", PORT_ENV, raw))?;
    }
    validate_config(config)
}

/// Validate configuration
pub fn validate_config(config: &Config) -> Result<()> {
    if config.server.port == 0 {
        anyhow::bail!("Server port cannot be 0");
    }

    if config.extract.jobs == 0 {
        anyhow::bail!("extract.jobs must be at least 1");
    }

    if config.extract.decode_timeout_secs == Some(0) {
        anyhow::bail!("extract.decode_timeout_secs must be greater than 0");
    }

    for (name, path) in [
        ("ffmpeg", &config.tools.ffmpeg_path),
        ("ffprobe", &config.tools.ffprobe_path),
    ] {
        if let Some(path) = path {
            if !path.exists() {
                tracing::warn!("Configured {} path does not exist: {:?}", name, path);
            }
        }
    }

    Ok(())
}
