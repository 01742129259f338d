//! External tool detection.
//!
//! The [`ToolRegistry`] resolves the ffmpeg and ffprobe executables once per
//! run, honouring configured overrides before falling back to `PATH`.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Tools the extraction pipeline cannot run without.
pub const REQUIRED_TOOLS: &[&str] = &["ffmpeg", "ffprobe"];

/// Optional overrides for tool locations.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ToolPaths {
    #[serde(default)]
    pub ffmpeg_path: Option<PathBuf>,

    #[serde(default)]
    pub ffprobe_path: Option<PathBuf>,
}

impl ToolPaths {
    fn override_for(&self, name: &str) -> Option<&Path> {
        match name {
            "ffmpeg" => self.ffmpeg_path.as_deref(),
            "ffprobe" => self.ffprobe_path.as_deref(),
            _ => None,
        }
    }
}

/// Availability information for a tool, returned by [`ToolRegistry::check_all`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolInfo {
    /// Tool name.
    pub name: String,
    /// Whether the tool was found.
    pub available: bool,
    /// Version string (first line of `-version` output), if available.
    pub version: Option<String>,
    /// Resolved path to the executable.
    pub path: Option<PathBuf>,
}

/// Registry holding discovered tool locations.
#[derive(Debug, Clone, Default)]
pub struct ToolRegistry {
    tools: HashMap<String, PathBuf>,
}

impl ToolRegistry {
    /// Discover the required tools.
    ///
    /// A configured path is used when it exists; otherwise [`which::which`]
    /// searches `PATH`. Tools that are not found are left out of the registry.
    pub fn discover(paths: &ToolPaths) -> Self {
        let mut tools = HashMap::new();

        for &name in REQUIRED_TOOLS {
            let resolved = match paths.override_for(name) {
                Some(p) if p.exists() => Some(p.to_path_buf()),
                Some(p) => {
                    tracing::warn!(
                        "Configured {} path {:?} does not exist, searching PATH",
                        name,
                        p
                    );
                    which::which(name).ok()
                }
                None => which::which(name).ok(),
            };

            if let Some(path) = resolved {
                tracing::debug!("Found {} at {:?}", name, path);
                tools.insert(name.to_string(), path);
            }
        }

        Self { tools }
    }

    /// Build a registry from known locations without searching.
    pub fn with_tools<I, S, P>(tools: I) -> Self
    where
        I: IntoIterator<Item = (S, P)>,
        S: Into<String>,
        P: Into<PathBuf>,
    {
        Self {
            tools: tools
                .into_iter()
                .map(|(name, path)| (name.into(), path.into()))
                .collect(),
        }
    }

    /// Path of the given tool, or [`Error::ToolNotFound`].
    pub fn require(&self, name: &str) -> Result<&Path> {
        self.tools
            .get(name)
            .map(PathBuf::as_path)
            .ok_or_else(|| Error::tool_not_found(name))
    }

    /// Verify every required tool was found.
    ///
    /// # Errors
    ///
    /// Returns [`Error::EnvironmentMissing`] naming all missing tools.
    pub fn require_all(&self) -> Result<()> {
        let missing: Vec<String> = REQUIRED_TOOLS
            .iter()
            .filter(|name| !self.tools.contains_key(**name))
            .map(|name| name.to_string())
            .collect();

        if missing.is_empty() {
            Ok(())
        } else {
            Err(Error::EnvironmentMissing { tools: missing })
        }
    }

    /// Check all required tools and return availability information.
    pub fn check_all(&self) -> Vec<ToolInfo> {
        REQUIRED_TOOLS
            .iter()
            .map(|&name| match self.tools.get(name) {
                Some(path) => ToolInfo {
                    name: name.to_string(),
                    available: true,
                    version: detect_version(path),
                    path: Some(path.clone()),
                },
                None => ToolInfo {
                    name: name.to_string(),
                    available: false,
                    version: None,
                    path: None,
                },
            })
            .collect()
    }
}

/// Run `<tool> -version` and return the first line of stdout.
fn detect_version(path: &Path) -> Option<String> {
    let output = std::process::Command::new(path)
        .arg("-version")
        .output()
        .ok()?;

    if !output.status.success() {
        return None;
    }

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .next()
        .map(|s| s.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn discover_with_default_paths_does_not_panic() {
        let registry = ToolRegistry::discover(&ToolPaths::default());
        let infos = registry.check_all();
        let names: Vec<&str> = infos.iter().map(|i| i.name.as_str()).collect();
        assert_eq!(names, vec!["ffmpeg", "ffprobe"]);
    }

    #[test]
    fn require_all_reports_every_missing_tool() {
        let registry = ToolRegistry::default();
        let err = registry.require_all().unwrap_err();
        assert_matches!(err, Error::EnvironmentMissing { ref tools } if tools == &["ffmpeg", "ffprobe"]);

        let registry = ToolRegistry::with_tools([("ffmpeg", "/usr/bin/ffmpeg")]);
        let err = registry.require_all().unwrap_err();
        assert_matches!(err, Error::EnvironmentMissing { ref tools } if tools == &["ffprobe"]);
    }

    #[test]
    fn require_missing_tool_returns_error() {
        let registry = ToolRegistry::with_tools([("ffprobe", "/opt/ffprobe")]);
        assert_eq!(registry.require("ffprobe").unwrap(), Path::new("/opt/ffprobe"));
        assert_matches!(registry.require("ffmpeg"), Err(Error::ToolNotFound { .. }));
    }

    #[test]
    fn configured_path_is_preferred_when_it_exists() {
        let fake = tempfile::NamedTempFile::new().unwrap();
        let paths = ToolPaths {
            ffmpeg_path: Some(fake.path().to_path_buf()),
            ffprobe_path: None,
        };
        let registry = ToolRegistry::discover(&paths);
        assert_eq!(registry.require("ffmpeg").unwrap(), fake.path());
    }

    #[test]
    fn tool_paths_deserialize_from_toml_shape() {
        let paths: ToolPaths =
            serde_json::from_str(r#"{"ffprobe_path": "/opt/ff/ffprobe"}"#).unwrap();
        assert_eq!(paths.ffprobe_path, Some(PathBuf::from("/opt/ff/ffprobe")));
        assert!(paths.ffmpeg_path.is_none());
    }
}
