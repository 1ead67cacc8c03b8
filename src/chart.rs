//! Chart dataset loading and deduplication.

use anyhow::{anyhow, Context, Result};
use rustc_hash::FxHashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use crate::models::{ChartRow, ChartTable, SONG_ID_COLUMN};

pub const TITLE_COLUMN: &str = "title";
pub const ARTIST_COLUMN: &str = "artist";

/// Header fragments marking spreadsheet-export leftovers ("Unnamed: 0.1").
pub const ARTIFACT_COLUMN_MARKERS: &[&str] = &["0.1"];

fn is_artifact_column(header: &str, markers: &[&str]) -> bool {
    markers.iter().any(|m| header.contains(m))
}

/// Read a chart CSV from disk. See [`read_chart_from_reader`].
pub fn read_chart(path: &Path, artifact_markers: &[&str]) -> Result<ChartTable> {
    let file = File::open(path)
        .with_context(|| format!("Failed to open chart file {}", path.display()))?;
    read_chart_from_reader(file, artifact_markers)
        .with_context(|| format!("Failed to read chart file {}", path.display()))
}

/// Parse a chart CSV with a header row.
///
/// Columns whose header contains any of `artifact_markers` are dropped, and a
/// `SongID` column (title followed by artist) is appended. An existing
/// `SongID` column is replaced by the derived one.
pub fn read_chart_from_reader<R: Read>(reader: R, artifact_markers: &[&str]) -> Result<ChartTable> {
    let mut rdr = csv::ReaderBuilder::new().from_reader(reader);
    let source_headers = rdr.headers().context("Failed to read CSV header")?.clone();

    let column = |name: &str| {
        source_headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| anyhow!("Chart CSV has no '{}' column", name))
    };
    let title_idx = column(TITLE_COLUMN)?;
    let artist_idx = column(ARTIST_COLUMN)?;

    let kept: Vec<usize> = source_headers
        .iter()
        .enumerate()
        .filter(|(_, h)| *h != SONG_ID_COLUMN && !is_artifact_column(h, artifact_markers))
        .map(|(i, _)| i)
        .collect();

    let mut headers: Vec<String> = kept.iter().map(|&i| source_headers[i].to_string()).collect();
    headers.push(SONG_ID_COLUMN.to_string());

    let mut rows = Vec::new();
    for (index, record) in rdr.records().enumerate() {
        let record = record.with_context(|| format!("Failed to parse chart row {}", index + 1))?;
        let field = |i: usize| record.get(i).unwrap_or_default().to_string();

        let mut row = ChartRow {
            index,
            title: field(title_idx),
            artist: field(artist_idx),
            values: kept.iter().map(|&i| field(i)).collect(),
        };
        let song_id = row.song_id();
        row.values.push(song_id);
        rows.push(row);
    }

    Ok(ChartTable { headers, rows })
}

/// Drop rows whose `SongID` was already seen, keeping the first occurrence.
/// Returns the number of rows dropped.
pub fn dedupe(table: &mut ChartTable) -> usize {
    let before = table.rows.len();
    let mut seen: FxHashSet<String> = FxHashSet::default();
    table.rows.retain(|row| seen.insert(row.song_id()));
    before - table.rows.len()
}
