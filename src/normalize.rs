//! Text normalization applied before similarity scoring.
//!
//! Chart exports and catalog names disagree mostly on casing and on
//! parenthesized qualifiers ("(feat. X)", "[Remastered]"), so both sides are
//! lowercased and stripped of bracketed text before comparison.

use once_cell::sync::Lazy;
use regex::Regex;

// ============================================================================
// REGEX PATTERNS
// ============================================================================

/// Opening `(` or `[` up to the first following `)` or `]`.
/// Bracket kinds need not pair up: "a (b] c" strips "(b]".
pub static BRACKETED: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\(\[].*?[\)\]]").unwrap());

/// Literal word removed from chart artist credits before comparison.
pub const FEATURING: &str = "featuring";

// ============================================================================
// NORMALIZATION FUNCTIONS
// ============================================================================

/// Remove every bracketed substring. Surrounding whitespace is left alone.
pub fn strip_bracketed(text: &str) -> String {
    BRACKETED.replace_all(text, "").into_owned()
}

/// Normalize a track title (or a catalog artist list) for matching.
pub fn normalize_title(title: &str) -> String {
    strip_bracketed(&title.to_lowercase())
}

/// Normalize a chart artist credit for matching.
/// e.g., "Drake Featuring Rihanna" → "drake  rihanna"
pub fn normalize_artist(artist: &str) -> String {
    strip_bracketed(&artist.to_lowercase().replace(FEATURING, ""))
}

// ============================================================================
// TESTS
// ============================================================================
