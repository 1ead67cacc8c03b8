//! Scoring functions for chart-to-catalog matching.
//!
//! This module contains:
//! - The Levenshtein similarity ratio
//! - Per-candidate title/artist scoring
//! - First-acceptable-candidate selection

use crate::models::{CatalogTrack, ChartRow, MatchScores};
use crate::normalize::{normalize_artist, normalize_title};

// ============================================================================
// Score Thresholds
// ============================================================================

/// Title score must be strictly above this to accept a candidate
pub const TITLE_THRESHOLD: u8 = 90;

/// Artist score must be strictly above this to accept a candidate
pub const ARTIST_THRESHOLD: u8 = 80;

/// Acceptance thresholds, both exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchThresholds {
    pub title: u8,
    pub artist: u8,
}

impl Default for MatchThresholds {
    fn default() -> Self {
        Self {
            title: TITLE_THRESHOLD,
            artist: ARTIST_THRESHOLD,
        }
    }
}

impl MatchThresholds {
    pub fn accepts(&self, scores: MatchScores) -> bool {
        scores.title > self.title && scores.artist > self.artist
    }
}

// ============================================================================
// Similarity
// ============================================================================

/// Levenshtein ratio in 0..=100: `100 × (1 − distance / max_len)`, rounded.
/// Lengths count chars, not bytes. An empty side scores 0.
pub fn ratio(a: &str, b: &str) -> u8 {
    if a.is_empty() || b.is_empty() {
        return 0;
    }
    (strsim::normalized_levenshtein(a, b) * 100.0).round() as u8
}

// ============================================================================
// Candidate Scoring
// ============================================================================

/// Score a chart row against one catalog candidate.
/// The chart artist drops "featuring"; the catalog artists are joined with ", ".
pub fn score_candidate(row: &ChartRow, candidate: &CatalogTrack) -> MatchScores {
    MatchScores {
        title: ratio(&normalize_title(&row.title), &normalize_title(&candidate.name)),
        artist: ratio(
            &normalize_artist(&row.artist),
            &normalize_title(&candidate.artist_names()),
        ),
    }
}

/// Return the first candidate (in service order) that clears both thresholds.
pub fn select_match(
    row: &ChartRow,
    candidates: &[CatalogTrack],
    thresholds: MatchThresholds,
) -> Option<(usize, MatchScores)> {
    candidates.iter().enumerate().find_map(|(idx, candidate)| {
        let scores = score_candidate(row, candidate);
        thresholds.accepts(scores).then_some((idx, scores))
    })
}
