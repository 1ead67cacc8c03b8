//! Shared fixtures for unit tests.

use reqwest::StatusCode;
use rustc_hash::FxHashMap;

use crate::catalog::{CatalogError, CatalogSearch};
use crate::models::CatalogTrack;

/// Catalog answering from a title → results map, recording every query.
#[derive(Default)]
pub struct FakeCatalog {
    pub results: FxHashMap<String, Vec<CatalogTrack>>,
    /// Title whose search returns a 503
    pub fail_on: Option<String>,
    pub queries: Vec<(String, u32)>,
}

impl FakeCatalog {
    pub fn with(mut self, title: &str, tracks: Vec<CatalogTrack>) -> Self {
        self.results.insert(title.to_string(), tracks);
        self
    }

    pub fn failing_on(mut self, title: &str) -> Self {
        self.fail_on = Some(title.to_string());
        self
    }
}

impl CatalogSearch for FakeCatalog {
    fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<CatalogTrack>, CatalogError> {
        self.queries.push((query.to_string(), limit));
        if self.fail_on.as_deref() == Some(query) {
            return Err(CatalogError::Search {
                status: StatusCode::SERVICE_UNAVAILABLE,
                body: "unavailable".to_string(),
            });
        }
        Ok(self.results.get(query).cloned().unwrap_or_default())
    }
}

pub fn track(id: &str, name: &str, artists: &[&str]) -> CatalogTrack {
    CatalogTrack {
        id: id.to_string(),
        name: name.to_string(),
        artists: artists.iter().map(|a| a.to_string()).collect(),
        popularity: 60,
        uri: format!("spotify:track:{}", id),
        album: "Album".to_string(),
        preview_url: None,
    }
}
