//! Container discovery.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use subforge_common::paths::is_container_file;

/// Every Matroska file under `root`, recursively, in sorted order.
///
/// Unreadable subdirectories are logged and skipped.
pub fn discover_containers(root: &Path) -> Vec<PathBuf> {
    let mut found = Vec::new();

    for entry in WalkDir::new(root).follow_links(true).sort_by_file_name() {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!("Skipping unreadable entry under {:?}: {}", root, e);
                continue;
            }
        };

        if !entry.file_type().is_file() {
            continue;
        }

        if is_container_file(entry.path()) {
            found.push(entry.into_path());
        }
    }

    found.sort();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    #[test]
    fn finds_containers_recursively_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        fs::create_dir_all(root.join("season 2/extras")).unwrap();
        fs::create_dir_all(root.join("season 1")).unwrap();

        for name in [
            "season 2/b.mkv",
            "season 2/extras/c.MKV",
            "season 1/a.mkv",
            "season 1/a.eng.srt",
            "season 1/notes.txt",
            "z.mp4",
            "top.Mkv",
        ] {
            fs::write(root.join(name), "x").unwrap();
        }

        let found = discover_containers(root);
        assert_eq!(
            found,
            vec![
                root.join("season 1/a.mkv"),
                root.join("season 2/b.mkv"),
                root.join("season 2/extras/c.MKV"),
                root.join("top.Mkv"),
            ]
        );
    }

    #[test]
    fn directory_named_like_a_container_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        fs::create_dir(dir.path().join("fake.mkv")).unwrap();
        assert!(discover_containers(dir.path()).is_empty());
    }

    #[test]
    fn empty_directory_yields_nothing() {
        let dir = tempfile::tempdir().unwrap();
        assert!(discover_containers(dir.path()).is_empty());
    }
}
