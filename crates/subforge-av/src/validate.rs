//! Container validation.
//!
//! A container must exist, be readable, be non-empty, and yield basic format
//! metadata from the engine before anything else looks at it.

use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

use crate::engine::MediaEngine;
use crate::error::ContainerDefect;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct ProbeOutput {
    format: Option<ProbeFormat>,
}

#[derive(Debug, Deserialize)]
struct ProbeFormat {
    format_name: Option<String>,
    duration: Option<String>,
}

/// Basic format metadata of a valid container.
#[derive(Debug, Clone, PartialEq)]
pub struct ContainerFormat {
    /// Demuxer name(s) reported by the engine, e.g. `matroska,webm`.
    pub format_name: String,
    /// Duration if the engine reports one.
    pub duration: Option<Duration>,
}

/// Validate a container.
///
/// # Errors
///
/// Returns [`Error::ContainerInvalid`] with the first defect found. The
/// filesystem checks run before the engine is consulted.
pub async fn validate_container(engine: &dyn MediaEngine, path: &Path) -> Result<ContainerFormat> {
    check_file(path).await?;

    let payload = engine
        .probe_format(path)
        .await
        .map_err(|e| Error::container_invalid(path, ContainerDefect::Corrupt(e.to_string())))?;

    parse_probe_output(&payload)
        .map_err(|why| Error::container_invalid(path, ContainerDefect::Corrupt(why)))
}

async fn check_file(path: &Path) -> Result<()> {
    let metadata = match tokio::fs::metadata(path).await {
        Ok(m) => m,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            return Err(Error::container_invalid(path, ContainerDefect::NotFound))
        }
        Err(e) => {
            return Err(Error::container_invalid(
                path,
                ContainerDefect::NotReadable(e.to_string()),
            ))
        }
    };

    if !metadata.is_file() {
        return Err(Error::container_invalid(
            path,
            ContainerDefect::NotReadable("not a regular file".to_string()),
        ));
    }

    if let Err(e) = tokio::fs::File::open(path).await {
        return Err(Error::container_invalid(
            path,
            ContainerDefect::NotReadable(e.to_string()),
        ));
    }

    if metadata.len() == 0 {
        return Err(Error::container_invalid(path, ContainerDefect::Empty));
    }

    Ok(())
}

fn parse_probe_output(payload: &str) -> std::result::Result<ContainerFormat, String> {
    let output: ProbeOutput =
        serde_json::from_str(payload).map_err(|e| format!("unreadable probe output: {}", e))?;

    let format = output
        .format
        .ok_or_else(|| "no format information".to_string())?;

    let format_name = format
        .format_name
        .filter(|name| !name.is_empty())
        .ok_or_else(|| "unknown format".to_string())?;

    let duration = format
        .duration
        .and_then(|s| s.parse::<f64>().ok())
        .and_then(|secs| Duration::try_from_secs_f64(secs).ok());

    Ok(ContainerFormat {
        format_name,
        duration,
    })
}
