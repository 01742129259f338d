//! Qualifying stream selection.

use subforge_common::SubtitleStream;

/// Keep only streams whose codec is in the qualifying markup family,
/// preserving order.
pub fn select_qualifying(streams: Vec<SubtitleStream>) -> Vec<SubtitleStream> {
    streams.into_iter().filter(|s| s.is_qualifying()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use subforge_common::LanguageTag;

    #[test]
    fn keeps_ass_and_ssa_in_order() {
        let streams = vec![
            SubtitleStream::new(2, "subrip", LanguageTag::Absent),
            SubtitleStream::new(3, "ssa", LanguageTag::Absent),
            SubtitleStream::new(4, "hdmv_pgs_subtitle", LanguageTag::Absent),
            SubtitleStream::new(5, "ass", LanguageTag::Code("eng".to_string())),
            SubtitleStream::new(6, "Ass", LanguageTag::Absent),
        ];

        let indices: Vec<u32> = select_qualifying(streams).iter().map(|s| s.index).collect();
        assert_eq!(indices, vec![3, 5]);
    }

    #[test]
    fn empty_input_yields_empty_output() {
        assert!(select_qualifying(Vec::new()).is_empty());
    }
}
