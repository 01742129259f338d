//! Path utilities for detecting container files and deriving output names.
//!
//! Extension checks are case-insensitive, so `Movie.MKV` counts as a
//! container just like `movie.mkv`.

use std::path::{Path, PathBuf};

/// Extension of the one container format subforge processes.
pub const CONTAINER_EXTENSION: &str = "mkv";

/// Extension written for every extracted subtitle.
pub const SUBTITLE_EXTENSION: &str = "srt";

/// Check if a path has the container extension.
///
/// # Examples
///
/// ```
/// use std::path::Path;
/// use subforge_common::paths::is_container_file;
///
/// assert!(is_container_file(Path::new("movie.mkv")));
/// assert!(is_container_file(Path::new("/path/to/Episode.MKV")));
/// assert!(!is_container_file(Path::new("movie.mp4")));
/// ```
pub fn is_container_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case(CONTAINER_EXTENSION))
        .unwrap_or(false)
}

/// The container path with its final extension removed.
///
/// Output files are named by appending labels to this base, so they land in
/// the same directory as the source.
///
/// # Examples
///
/// ```
/// use std::path::{Path, PathBuf};
/// use subforge_common::paths::container_base;
///
/// assert_eq!(
///     container_base(Path::new("/tv/Show.S01E01.mkv")),
///     PathBuf::from("/tv/Show.S01E01")
/// );
/// ```
pub fn container_base(path: &Path) -> PathBuf {
    path.with_extension("")
}

/// Build `<base>.<label>[.<label>...].srt` next to the container.
pub fn subtitle_output_path(container: &Path, labels: &[&str]) -> PathBuf {
    let mut name = container_base(container).into_os_string();
    for label in labels {
        name.push(".");
        name.push(label);
    }
    name.push(".");
    name.push(SUBTITLE_EXTENSION);
    PathBuf::from(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_container_file() {
        assert!(is_container_file(Path::new("movie.mkv")));
        assert!(is_container_file(Path::new("movie.MKV")));
        assert!(is_container_file(Path::new("movie.Mkv")));
        assert!(is_container_file(Path::new("/path/to/movie.mkv")));
        assert!(is_container_file(Path::new("movie.1080p.mkv")));
        assert!(is_container_file(Path::new(".hidden.mkv")));

        assert!(!is_container_file(Path::new("movie.mp4")));
        assert!(!is_container_file(Path::new("movie.mkv.part")));
        assert!(!is_container_file(Path::new("movie.eng.srt")));
        assert!(!is_container_file(Path::new("mkv")));
        assert!(!is_container_file(Path::new("")));
    }

    #[test]
    fn test_container_base_keeps_inner_dots() {
        assert_eq!(
            container_base(Path::new("dir/movie.2024.1080p.mkv")),
            PathBuf::from("dir/movie.2024.1080p")
        );
        assert_eq!(container_base(Path::new("movie")), PathBuf::from("movie"));
    }

    #[test]
    fn test_subtitle_output_path() {
        let container = Path::new("/media/anime/ep01.mkv");
        assert_eq!(
            subtitle_output_path(container, &["eng"]),
            PathBuf::from("/media/anime/ep01.eng.srt")
        );
        assert_eq!(
            subtitle_output_path(container, &["eng", "3"]),
            PathBuf::from("/media/anime/ep01.eng.3.srt")
        );
        assert_eq!(
            subtitle_output_path(Path::new("ep01.MKV"), &["2"]),
            PathBuf::from("ep01.2.srt")
        );
    }
}
