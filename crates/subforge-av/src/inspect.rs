//! Subtitle stream discovery.

use serde::Deserialize;
use std::path::Path;

use subforge_common::{LanguageTag, SubtitleStream};

use crate::engine::MediaEngine;
use crate::{Error, Result};

#[derive(Debug, Deserialize)]
struct StreamListing {
    #[serde(default)]
    streams: Vec<ListedStream>,
}

#[derive(Debug, Deserialize)]
struct ListedStream {
    index: u32,
    codec_name: Option<String>,
    codec_type: Option<String>,
    #[serde(default)]
    tags: ListedTags,
}

#[derive(Debug, Default, Deserialize)]
struct ListedTags {
    // Absent and `null` both deserialize to None; "" stays Some("").
    language: Option<String>,
}

/// List the subtitle streams of a validated container, in engine order.
///
/// An empty list is a normal result for a container without subtitles.
///
/// # Errors
///
/// - [`Error::StreamQueryFailed`] if the engine call fails.
/// - [`Error::MalformedMetadata`] if its payload cannot be parsed.
pub async fn inspect_container(engine: &dyn MediaEngine, path: &Path) -> Result<Vec<SubtitleStream>> {
    let payload = engine
        .list_subtitle_streams(path)
        .await
        .map_err(|e| Error::StreamQueryFailed {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;

    let streams = parse_stream_listing(&payload).map_err(|e| Error::MalformedMetadata {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;

    tracing::debug!("{:?}: {} subtitle stream(s)", path, streams.len());
    Ok(streams)
}

/// Parse an engine stream listing into typed descriptors.
pub fn parse_stream_listing(payload: &str) -> serde_json::Result<Vec<SubtitleStream>> {
    let listing: StreamListing = serde_json::from_str(payload)?;

    Ok(listing
        .streams
        .into_iter()
        .filter(|s| s.codec_type.as_deref().map_or(true, |t| t == "subtitle"))
        .map(|s| SubtitleStream {
            index: s.index,
            codec: s.codec_name.unwrap_or_default(),
            language: LanguageTag::from_raw(s.tags.language.as_deref()),
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::ScriptedEngine;
    use assert_matches::assert_matches;

    #[test]
    fn parses_ffprobe_listing() {
        let payload = r#"{
            "programs": [],
            "streams": [
                {"index": 2, "codec_name": "ass", "codec_type": "subtitle", "tags": {"language": "eng"}},
                {"index": 3, "codec_name": "subrip", "codec_type": "subtitle", "tags": {"language": "jpn"}},
                {"index": 5, "codec_name": "ssa", "codec_type": "subtitle"}
            ]
        }"#;

        let streams = parse_stream_listing(payload).unwrap();
        assert_eq!(
            streams,
            vec![
                SubtitleStream::new(2, "ass", LanguageTag::Code("eng".to_string())),
                SubtitleStream::new(3, "subrip", LanguageTag::Code("jpn".to_string())),
                SubtitleStream::new(5, "ssa", LanguageTag::Absent),
            ]
        );
    }

    #[test]
    fn distinguishes_absent_null_and_empty_language() {
        let payload = r#"{"streams": [
            {"index": 2, "codec_name": "ass"},
            {"index": 3, "codec_name": "ass", "tags": {}},
            {"index": 4, "codec_name": "ass", "tags": {"language": null}},
            {"index": 5, "codec_name": "ass", "tags": {"language": ""}},
            {"index": 6, "codec_name": "ass", "tags": {"language": "null"}},
            {"index": 7, "codec_name": "ass", "tags": {"language": "und"}}
        ]}"#;

        let languages: Vec<LanguageTag> = parse_stream_listing(payload)
            .unwrap()
            .into_iter()
            .map(|s| s.language)
            .collect();
        assert_eq!(
            languages,
            vec![
                LanguageTag::Absent,
                LanguageTag::Absent,
                LanguageTag::Absent,
                LanguageTag::Empty,
                LanguageTag::Null,
                LanguageTag::Undefined,
            ]
        );
    }

    #[test]
    fn empty_listing_is_not_an_error() {
        assert!(parse_stream_listing(r#"{"streams": []}"#).unwrap().is_empty());
        assert!(parse_stream_listing("{}").unwrap().is_empty());
    }

    #[test]
    fn ignores_non_subtitle_entries() {
        let payload = r#"{"streams": [
            {"index": 0, "codec_name": "h264", "codec_type": "video"},
            {"index": 4, "codec_name": "ass", "codec_type": "subtitle"}
        ]}"#;
        let streams = parse_stream_listing(payload).unwrap();
        assert_eq!(streams.len(), 1);
        assert_eq!(streams[0].index, 4);
    }

    #[tokio::test]
    async fn malformed_payload_is_reported() {
        let path = Path::new("/m/weird.mkv");
        let engine = ScriptedEngine::new().with_listing(path, r#"{"streams": [{"codec_name": "ass"}"#);
        let err = inspect_container(&engine, path).await.unwrap_err();
        assert_matches!(err, Error::MalformedMetadata { .. });
    }

    #[tokio::test]
    async fn engine_failure_is_stream_query_failed() {
        let path = Path::new("/m/fail.mkv");
        let engine = ScriptedEngine::new().failing_listing(path);
        let err = inspect_container(&engine, path).await.unwrap_err();
        assert_matches!(err, Error::StreamQueryFailed { .. });
    }
}
