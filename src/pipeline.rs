//! End-to-end run: read chart → dedupe → reconcile → write tables → stats.

use anyhow::{Context, Result};
use std::path::PathBuf;
use std::time::Instant;

use crate::catalog::CatalogSearch;
use crate::chart::{dedupe, read_chart, ARTIFACT_COLUMN_MARKERS};
use crate::models::RunStats;
use crate::output::{write_matched, write_unmatched, DEFAULT_CHART_PREFIX};
use crate::progress::format_duration;
use crate::reconcile::{reconcile, ReconcileOptions};
use crate::safety::validate_output_paths;

/// Paths and matching settings for one run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    pub input: PathBuf,
    pub matched: PathBuf,
    pub unmatched: PathBuf,
    /// Prefix for chart columns in the matched table
    pub prefix: String,
    pub options: ReconcileOptions,
    /// Where to write the JSON run summary, if anywhere
    pub stats: Option<PathBuf>,
}

impl RunConfig {
    pub fn new(input: impl Into<PathBuf>, matched: impl Into<PathBuf>, unmatched: impl Into<PathBuf>) -> Self {
        Self {
            input: input.into(),
            matched: matched.into(),
            unmatched: unmatched.into(),
            prefix: DEFAULT_CHART_PREFIX.to_string(),
            options: ReconcileOptions::default(),
            stats: None,
        }
    }
}

/// Run the whole reconciliation.
///
/// Setup problems (unsafe output paths, unreadable chart) fail before the
/// catalog is queried. A catalog failure mid-run does not fail the run: both
/// tables are still written with the rows classified so far and the reason is
/// recorded in `RunStats::aborted`.
pub fn run(config: &RunConfig, catalog: &mut dyn CatalogSearch) -> Result<RunStats> {
    validate_output_paths(&config.matched, &config.unmatched, &[config.input.as_path()])?;

    let start = Instant::now();
    let mut stats = RunStats::default();

    tracing::info!("Reading chart: {:?}", config.input);
    let mut table = read_chart(&config.input, ARTIFACT_COLUMN_MARKERS)?;
    stats.rows_read = table.len();
    stats.duplicates_dropped = dedupe(&mut table);
    tracing::info!(
        "Read {} rows, dropped {} duplicates",
        stats.rows_read,
        stats.duplicates_dropped
    );

    let headers = table.headers;
    let result = reconcile(table.rows, catalog, &config.options);

    if let Some(reason) = &result.aborted {
        tracing::warn!(
            "Stopped early after {} rows ({}); writing partial results",
            result.processed(),
            reason
        );
    }

    write_matched(&config.matched, &result.matched, &headers, &config.prefix)?;
    write_unmatched(&config.unmatched, &result.unmatched, &headers)?;

    stats.rows_processed = result.processed();
    stats.matched = result.matched.len();
    stats.unmatched = result.unmatched.len();
    stats.aborted = result.aborted;
    stats.elapsed_seconds = start.elapsed().as_secs_f64();

    tracing::info!(
        "Matched {}/{} ({:.1}%) in {}",
        stats.matched,
        stats.rows_processed,
        stats.match_rate(),
        format_duration(start.elapsed())
    );
    tracing::info!("Wrote {:?} and {:?}", config.matched, config.unmatched);

    if let Some(path) = &config.stats {
        stats
            .write_to_file(path)
            .with_context(|| format!("Failed to write stats to {}", path.display()))?;
    }

    Ok(stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{track, FakeCatalog};
    use std::path::Path;

    const CHART: &str = "\
title,artist,peak
Hello,Adele,1
Hello,Adele,4
Nothing Like It,Nobody,40
Work,Rihanna Featuring Drake,1
Closer,The Chainsmokers Featuring Halsey,1
";

    fn catalog() -> FakeCatalog {
        FakeCatalog::default()
            .with("Hello", vec![track("ad", "Hello", &["Adele"])])
            .with("Nothing Like It", vec![track("x", "Something Else", &["Nobody"])])
            .with("Work", vec![track("wk", "Work", &["Rihanna", "Drake"])])
    }

    fn setup(dir: &Path) -> RunConfig {
        let input = dir.join("chart.csv");
        std::fs::write(&input, CHART).unwrap();
        let mut config = RunConfig::new(input, dir.join("matched.csv"), dir.join("unmatched.csv"));
        config.stats = Some(dir.join("stats.json"));
        config
    }

    fn lines(path: &Path) -> Vec<String> {
        std::fs::read_to_string(path)
            .unwrap()
            .lines()
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_full_run_writes_both_tables() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let mut catalog = catalog();

        let stats = run(&config, &mut catalog).unwrap();
        assert_eq!(stats.rows_read, 5);
        assert_eq!(stats.duplicates_dropped, 1);
        assert_eq!(stats.rows_processed, 4);
        assert_eq!(stats.matched, 2);
        assert_eq!(stats.unmatched, 2);
        assert!(stats.aborted.is_none());

        let matched = lines(&config.matched);
        assert_eq!(matched.len(), 3);
        assert!(matched[0].ends_with("billboard_title,billboard_artist,billboard_peak,billboard_SongID"));
        assert!(matched[1].starts_with("0,100,100,60,Hello,Adele,ad,"));

        let unmatched = lines(&config.unmatched);
        assert_eq!(
            unmatched,
            vec![
                ",title,artist,peak,SongID",
                "2,Nothing Like It,Nobody,40,Nothing Like ItNobody",
                "4,Closer,The Chainsmokers Featuring Halsey,1,CloserThe Chainsmokers Featuring Halsey",
            ]
        );
    }

    #[test]
    fn test_catalog_failure_still_writes_partial_tables_and_stats() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        let mut catalog = catalog().failing_on("Work");

        let stats = run(&config, &mut catalog).unwrap();
        assert_eq!(stats.rows_processed, 2);
        assert!(stats.aborted.as_deref().unwrap().contains("503"));
        // Nothing searched after the failing row
        assert_eq!(catalog.queries.last().map(|(q, _)| q.as_str()), Some("Work"));

        let matched = lines(&config.matched);
        assert_eq!(matched.len(), 2);
        assert!(matched[1].contains(",Hello,Adele,"));

        let unmatched = lines(&config.unmatched);
        assert_eq!(unmatched.len(), 2);
        assert!(unmatched[1].starts_with("2,Nothing Like It,"));

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(config.stats.as_ref().unwrap()).unwrap()).unwrap();
        assert!(json["aborted"].as_str().unwrap().contains("503"));
        assert_eq!(json["rows_processed"], 2);
        assert_eq!(json["matched"], 1);
    }

    #[test]
    fn test_unsafe_outputs_fail_before_searching() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = setup(dir.path());
        config.unmatched = config.input.clone();
        let mut catalog = catalog();

        assert!(run(&config, &mut catalog).is_err());
        assert!(catalog.queries.is_empty());
        // Input left untouched
        assert_eq!(std::fs::read_to_string(&config.input).unwrap(), CHART);
    }

    #[test]
    fn test_missing_columns_fail_before_searching() {
        let dir = tempfile::tempdir().unwrap();
        let config = setup(dir.path());
        std::fs::write(&config.input, "name,singer\nHello,Adele\n").unwrap();
        let mut catalog = catalog();

        let err = run(&config, &mut catalog).unwrap_err();
        assert!(format!("{:#}", err).contains("'title'"));
        assert!(catalog.queries.is_empty());
        assert!(!config.matched.exists());
    }
}
