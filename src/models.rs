//! Core data models for chart reconciliation.
//!
//! This module contains the chart table, catalog candidates, match records
//! and run statistics shared by the pipeline stages.

use serde::Serialize;

/// Name of the derived identifier column appended to every chart table.
pub const SONG_ID_COLUMN: &str = "SongID";

// ============================================================================
// Chart Models
// ============================================================================

/// One row of the chart dataset.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChartRow {
    /// Zero-based position in the source file (survives deduplication)
    pub index: usize,
    pub title: String,
    pub artist: String,
    /// All column values in header order, `SongID` last
    pub values: Vec<String>,
}

impl ChartRow {
    /// Composite identifier used for deduplication: title followed by artist.
    pub fn song_id(&self) -> String {
        format!("{}{}", self.title, self.artist)
    }
}

/// Chart dataset after column cleanup, in source order.
#[derive(Clone, Debug, Default)]
pub struct ChartTable {
    pub headers: Vec<String>,
    pub rows: Vec<ChartRow>,
}

impl ChartTable {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

// ============================================================================
// Catalog Models
// ============================================================================

/// Track candidate returned by a catalog search, in service order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogTrack {
    pub id: String,
    pub name: String,
    pub artists: Vec<String>, // Credited order
    pub popularity: u32,      // 0-100
    pub uri: String,
    pub album: String,
    pub preview_url: Option<String>,
}

impl CatalogTrack {
    /// Credited artists joined the way they are compared and written out.
    pub fn artist_names(&self) -> String {
        self.artists.join(", ")
    }
}

// ============================================================================
// Match Models
// ============================================================================

/// Similarity scores for one (chart row, candidate) pair, each 0-100.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MatchScores {
    pub title: u8,
    pub artist: u8,
}

/// Chart row paired with the first catalog candidate that cleared both thresholds.
#[derive(Clone, Debug)]
pub struct MatchedRecord {
    pub scores: MatchScores,
    pub track: CatalogTrack,
    pub row: ChartRow,
}

// ============================================================================
// Statistics
// ============================================================================

/// Summary of one run, written as JSON with `--stats`.
#[derive(Default, Debug, Clone, Serialize)]
pub struct RunStats {
    pub rows_read: usize,
    pub duplicates_dropped: usize,
    pub rows_processed: usize,
    pub matched: usize,
    pub unmatched: usize,
    /// Error that stopped the loop early, if any
    pub aborted: Option<String>,
    pub elapsed_seconds: f64,
}

impl RunStats {
    /// Calculate match rate over processed rows as a percentage
    pub fn match_rate(&self) -> f64 {
        if self.rows_processed == 0 {
            0.0
        } else {
            100.0 * self.matched as f64 / self.rows_processed as f64
        }
    }

    /// Write stats to a JSON file
    pub fn write_to_file(&self, path: &std::path::Path) -> anyhow::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)?;
        Ok(())
    }
}
