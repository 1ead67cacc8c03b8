//! Row-by-row reconciliation of a chart against the catalog.
//!
//! Each row gets one title search; the first candidate clearing both
//! thresholds makes it a match. A search failure ends the pass early and
//! whatever was classified up to that point is kept.

use crate::catalog::{CatalogSearch, DEFAULT_SEARCH_LIMIT};
use crate::models::{ChartRow, MatchedRecord};
use crate::progress::RowProgress;
use crate::scoring::{select_match, MatchThresholds};

/// Rows between progress log lines in log-only mode
const LOG_INTERVAL: u64 = 100;

#[derive(Debug, Clone, Copy)]
pub struct ReconcileOptions {
    pub thresholds: MatchThresholds,
    /// Results requested per search
    pub limit: u32,
}

impl Default for ReconcileOptions {
    fn default() -> Self {
        Self {
            thresholds: MatchThresholds::default(),
            limit: DEFAULT_SEARCH_LIMIT,
        }
    }
}

/// Outcome of one pass. `matched` and `unmatched` keep chart order.
#[derive(Debug, Default)]
pub struct Reconciliation {
    pub matched: Vec<MatchedRecord>,
    pub unmatched: Vec<ChartRow>,
    /// Error that stopped the pass, if any
    pub aborted: Option<String>,
}

impl Reconciliation {
    /// Rows that were classified before the pass ended
    pub fn processed(&self) -> usize {
        self.matched.len() + self.unmatched.len()
    }
}

/// Search the catalog for every row and split rows into matched/unmatched.
///
/// Never fails: a catalog error is logged, recorded in `aborted`, and the
/// remaining rows are left out of both tables.
pub fn reconcile<C>(rows: Vec<ChartRow>, catalog: &mut C, options: &ReconcileOptions) -> Reconciliation
where
    C: CatalogSearch + ?Sized,
{
    let total = rows.len() as u64;
    let progress = RowProgress::new("Matching chart rows", total, LOG_INTERVAL);
    let mut result = Reconciliation::default();

    for row in rows {
        let mut candidates = match catalog.search_tracks(&row.title, options.limit) {
            Ok(candidates) => candidates,
            Err(e) => {
                progress.log(|| {
                    tracing::error!(row = row.index, title = %row.title, "Catalog search failed: {}", e)
                });
                result.aborted = Some(e.to_string());
                break;
            }
        };

        match select_match(&row, &candidates, options.thresholds) {
            Some((idx, scores)) => {
                progress.log(|| {
                    tracing::debug!(
                        title = %row.title,
                        artist = %row.artist,
                        title_score = scores.title,
                        artist_score = scores.artist,
                        "Matched"
                    )
                });
                let track = candidates.swap_remove(idx);
                result.matched.push(MatchedRecord { scores, track, row });
            }
            None => {
                progress.log(|| {
                    tracing::debug!(title = %row.title, artist = %row.artist, candidates = candidates.len(), "No match")
                });
                result.unmatched.push(row);
            }
        }

        progress.advance();
    }

    if result.aborted.is_some() {
        progress.abandon(format!("Stopped after {} rows", result.processed()));
    } else {
        progress.finish(format!(
            "Matched {} of {} rows",
            result.matched.len(),
            result.processed()
        ));
    }
    result
}
