//! TG-polyT repeat classification
//!
//! Turns the bases a read covers at the locus into a `(TG)<n>-<m>T` label:
//! `n` consecutive `TG` units starting at the first `TG` in the sequence,
//! followed by a run of `m` `T` bases.
//!
//! The scan is strictly left to right and the first decomposition wins.
//! A T run that ends right before a `G` gives up its last `T` to the next
//! `TG` unit, so `TGTGTTTG` reads as `(TG)2-2T` rather than `(TG)2-3T`.
//! Any base other than upper case `T`/`G` (including `N`, gaps and lower
//! case) ends a run.

use crate::types::VariantLabel;

/// Label given to sequences without any `TG` unit, including empty ones
pub const NO_REPEAT: VariantLabel = VariantLabel {
    tg_repeats: 0,
    t_run: 0,
};

/// Classify a subsequence into its repeat label. Never fails.
pub fn classify(subsequence: &str) -> VariantLabel {
    classify_bytes(subsequence.as_bytes())
}

pub fn classify_bytes(seq: &[u8]) -> VariantLabel {
    let Some(first_unit) = seq.windows(2).position(|w| w == b"TG") else {
        return NO_REPEAT;
    };

    let mut pos = first_unit;
    let mut tg_repeats = 0;
    while seq[pos..].starts_with(b"TG") {
        tg_repeats += 1;
        pos += 2;
    }

    let run_start = pos;
    while seq.get(pos) == Some(&b'T') {
        pos += 1;
    }
    let mut t_run = pos - run_start;

    // The last T pairs with the following G as the start of another unit
    if t_run > 0 && seq.get(pos) == Some(&b'G') {
        t_run -= 1;
    }

    VariantLabel::new(tg_repeats, t_run)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(seq: &str) -> String {
        classify(seq).to_string()
    }

    #[test]
    fn test_simple_repeat() {
        assert_eq!(label("ACTTTGTGTGTTTTTATGTG"), "(TG)3-5T");
        assert_eq!(label("ATGTGTGTGTGTGTGTGTGTGTGTTTTTTTA"), "(TG)11-7T");
    }

    #[test]
    fn test_ambiguous_sequence_resolves_to_first_decomposition() {
        // Also readable as (TG)5-7T further along; the first run wins
        assert_eq!(label("ATGTGTGTGTGTTTGTGTGTGTGTTTTTTTA"), "(TG)5-2T");
    }

    #[test]
    fn test_t_run_followed_by_tg() {
        assert_eq!(label("ACTTGTGTGTTTTTGTG"), "(TG)3-4T");
    }

    #[test]
    fn test_interrupted_tg_run() {
        // "AA" breaks the units; counting stops at the first run
        assert_eq!(label("ACTTGAATGTGTTTTTGTG"), "(TG)1-0T");
    }

    #[test]
    fn test_empty_and_repeat_free_input() {
        assert_eq!(classify(""), NO_REPEAT);
        assert_eq!(label(""), "(TG)0-0T");
        assert_eq!(label("AAAAAAAA"), "(TG)0-0T");
        assert_eq!(label("TTTTTTT"), "(TG)0-0T");
        assert_eq!(label("T"), "(TG)0-0T");
    }

    #[test]
    fn test_unexpected_characters_terminate_runs() {
        assert_eq!(label("TGTGNTGTG"), "(TG)2-0T");
        assert_eq!(label("TGTGTTNTT"), "(TG)2-2T");
        assert_eq!(label("tgtgTGTTT"), "(TG)1-3T");
        assert_eq!(label("TG-TG"), "(TG)1-0T");
        assert_eq!(label("NNNN"), "(TG)0-0T");
    }

    #[test]
    fn test_repeat_at_sequence_end() {
        assert_eq!(label("AATGTGTG"), "(TG)3-0T");
        assert_eq!(label("AATGTGTTT"), "(TG)2-3T");
    }

    #[test]
    fn test_classification_is_deterministic() {
        let seqs = [
            "ATGTGTGTGTGTTTGTGTGTGTGTTTTTTTA",
            "ACTTGAATGTGTTTTTGTG",
            "",
            "GATTACA",
        ];
        for seq in seqs {
            assert_eq!(classify(seq), classify(seq));
        }
    }
}
