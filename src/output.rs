//! CSV writers for the matched and unmatched tables.
//!
//! Both tables start with an unnamed index column: a running number for
//! matched records, the source row position for unmatched rows.

use anyhow::{Context, Result};
use std::io::Write;
use std::path::Path;

use crate::models::{ChartRow, MatchedRecord};

/// Prefix applied to chart columns in the matched table
pub const DEFAULT_CHART_PREFIX: &str = "billboard_";

/// Catalog and score columns leading each matched record
pub const MATCHED_COLUMNS: [&str; 9] = [
    "title_levenshtein",
    "artist_levenshtein",
    "popularity",
    "name",
    "artists",
    "id",
    "uri",
    "album",
    "preview_url",
];

pub fn write_matched(path: &Path, records: &[MatchedRecord], chart_headers: &[String], prefix: &str) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create matched output {}", path.display()))?;
    write_matched_to(file, records, chart_headers, prefix)
        .with_context(|| format!("Failed to write matched output {}", path.display()))
}

pub fn write_matched_to<W: Write>(
    writer: W,
    records: &[MatchedRecord],
    chart_headers: &[String],
    prefix: &str,
) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<String> = vec![String::new()];
    header.extend(MATCHED_COLUMNS.iter().map(|c| c.to_string()));
    header.extend(chart_headers.iter().map(|h| format!("{}{}", prefix, h)));
    wtr.write_record(&header)?;

    for (i, record) in records.iter().enumerate() {
        let track = &record.track;
        let mut fields: Vec<String> = vec![
            i.to_string(),
            record.scores.title.to_string(),
            record.scores.artist.to_string(),
            track.popularity.to_string(),
            track.name.clone(),
            track.artist_names(),
            track.id.clone(),
            track.uri.clone(),
            track.album.clone(),
            track.preview_url.clone().unwrap_or_default(),
        ];
        fields.extend(record.row.values.iter().cloned());
        wtr.write_record(&fields)?;
    }

    wtr.flush()?;
    Ok(())
}

pub fn write_unmatched(path: &Path, rows: &[ChartRow], chart_headers: &[String]) -> Result<()> {
    let file = std::fs::File::create(path)
        .with_context(|| format!("Failed to create unmatched output {}", path.display()))?;
    write_unmatched_to(file, rows, chart_headers)
        .with_context(|| format!("Failed to write unmatched output {}", path.display()))
}

pub fn write_unmatched_to<W: Write>(writer: W, rows: &[ChartRow], chart_headers: &[String]) -> Result<()> {
    let mut wtr = csv::Writer::from_writer(writer);

    let mut header: Vec<&str> = vec![""];
    header.extend(chart_headers.iter().map(String::as_str));
    wtr.write_record(&header)?;

    for row in rows {
        let index = row.index.to_string();
        wtr.write_record(std::iter::once(index.as_str()).chain(row.values.iter().map(String::as_str)))?;
    }

    wtr.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{CatalogTrack, MatchScores};

    fn headers() -> Vec<String> {
        vec!["title".to_string(), "artist".to_string(), "SongID".to_string()]
    }

    fn row(index: usize, title: &str, artist: &str) -> ChartRow {
        ChartRow {
            index,
            title: title.to_string(),
            artist: artist.to_string(),
            values: vec![title.to_string(), artist.to_string(), format!("{}{}", title, artist)],
        }
    }

    fn matched() -> MatchedRecord {
        MatchedRecord {
            scores: MatchScores { title: 100, artist: 93 },
            track: CatalogTrack {
                id: "wk".to_string(),
                name: "Work".to_string(),
                artists: vec!["Rihanna".to_string(), "Drake".to_string()],
                popularity: 75,
                uri: "spotify:track:wk".to_string(),
                album: "ANTI".to_string(),
                preview_url: None,
            },
            row: row(4, "Work", "Rihanna Featuring Drake"),
        }
    }

    #[test]
    fn test_write_matched() {
        let mut buf = Vec::new();
        write_matched_to(&mut buf, &[matched()], &headers(), DEFAULT_CHART_PREFIX).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(
            lines[0],
            ",title_levenshtein,artist_levenshtein,popularity,name,artists,id,uri,album,preview_url,\
             billboard_title,billboard_artist,billboard_SongID"
        );
        assert_eq!(
            lines[1],
            "0,100,93,75,Work,\"Rihanna, Drake\",wk,spotify:track:wk,ANTI,,Work,Rihanna Featuring Drake,WorkRihanna Featuring Drake"
        );
    }

    #[test]
    fn test_write_unmatched_keeps_source_index() {
        let mut buf = Vec::new();
        write_unmatched_to(&mut buf, &[row(0, "Hello", "Adele"), row(7, "Hey", "Nobody")], &headers()).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let lines: Vec<&str> = text.lines().collect();

        assert_eq!(lines, vec![",title,artist,SongID", "0,Hello,Adele,HelloAdele", "7,Hey,Nobody,HeyNobody"]);
    }

    #[test]
    fn test_empty_tables_still_get_headers() {
        let dir = tempfile::tempdir().unwrap();
        let matched_path = dir.path().join("matched.csv");
        let unmatched_path = dir.path().join("unmatched.csv");
        write_matched(&matched_path, &[], &headers(), "chart_").unwrap();
        write_unmatched(&unmatched_path, &[], &headers()).unwrap();

        let matched_text = std::fs::read_to_string(&matched_path).unwrap();
        assert!(matched_text.trim_end().ends_with("chart_title,chart_artist,chart_SongID"));
        assert_eq!(std::fs::read_to_string(&unmatched_path).unwrap().lines().count(), 1);
    }

    #[test]
    fn test_missing_directory_is_an_error() {
        let err = write_unmatched(Path::new("/nonexistent/dir/out.csv"), &[], &headers()).unwrap_err();
        assert!(err.to_string().contains("Failed to create unmatched output"));
    }
}
