//! Shared fixtures for integration tests.
//!
//! [`FakeTools`] writes stand-in `ffprobe`/`ffmpeg` shell scripts into a
//! temp directory. The fake ffprobe prints a container's own contents as its
//! stream listing, so a fixture file *is* its subtitle layout:
//!
//! - a file containing `CORRUPT` fails the format probe;
//! - any other file probes as Matroska and lists the JSON it contains.
//!
//! The fake ffmpeg refuses to overwrite and otherwise writes a short SubRip
//! file to its last argument.

#![allow(dead_code)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use tempfile::TempDir;

const FAKE_FFPROBE: &str = r#"#!/bin/sh
for last; do :; done
case "$*" in
  *-version*)
    echo "ffprobe version 0.0-fake"
    ;;
  *-show_format*)
    if grep -q CORRUPT "$last"; then
      echo "$last: Invalid data found when processing input" >&2
      exit 1
    fi
    echo '{"format": {"format_name": "matroska,webm", "duration": "60.000000"}}'
    ;;
  *-select_streams*)
    cat "$last"
    ;;
esac
"#;

const FAKE_FFMPEG: &str = r#"#!/bin/sh
for last; do :; done
if [ "$1" = "-version" ]; then
  echo "ffmpeg version 0.0-fake"
  exit 0
fi
if [ -e "$last" ]; then
  echo "File '$last' already exists. Exiting." >&2
  exit 1
fi
printf '1\n00:00:01,000 --> 00:00:02,500\nHello there\n\n' > "$last"
"#;

/// Stand-in tools plus a config file pointing at them.
pub struct FakeTools {
    dir: TempDir,
}

impl FakeTools {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        write_script(&dir.path().join("ffprobe"), FAKE_FFPROBE);
        write_script(&dir.path().join("ffmpeg"), FAKE_FFMPEG);
        fs::write(
            dir.path().join("subforge.toml"),
            format!(
                "[tools]\nffmpeg_path = {:?}\nffprobe_path = {:?}\n",
                dir.path().join("ffmpeg"),
                dir.path().join("ffprobe"),
            ),
        )
        .unwrap();
        Self { dir }
    }

    pub fn ffmpeg(&self) -> PathBuf {
        self.dir.path().join("ffmpeg")
    }

    pub fn ffprobe(&self) -> PathBuf {
        self.dir.path().join("ffprobe")
    }

    pub fn config(&self) -> PathBuf {
        self.dir.path().join("subforge.toml")
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, body).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

/// One subtitle stream in a fixture container.
pub fn stream(index: u32, codec: &str, language: Option<&str>) -> serde_json::Value {
    let mut stream = serde_json::json!({
        "index": index,
        "codec_name": codec,
        "codec_type": "subtitle",
    });
    if let Some(language) = language {
        stream["tags"] = serde_json::json!({ "language": language });
    }
    stream
}

/// Write a fixture container listing `streams`.
pub fn container(dir: &Path, name: &str, streams: &[serde_json::Value]) -> PathBuf {
    let path = dir.join(name);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(&path, serde_json::json!({ "streams": streams }).to_string()).unwrap();
    path
}

/// Write a fixture container that fails the format probe.
pub fn corrupt_container(dir: &Path, name: &str) -> PathBuf {
    let path = dir.join(name);
    fs::write(&path, "CORRUPT").unwrap();
    path
}
