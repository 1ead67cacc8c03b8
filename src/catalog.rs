//! Music catalog search client.
//!
//! [`CatalogSearch`] is the seam the reconciliation loop talks to;
//! [`SpotifyClient`] implements it against the Spotify Web API using the
//! client-credentials flow.

use reqwest::blocking::Client;
use reqwest::StatusCode;
use serde::Deserialize;
use std::time::{Duration, Instant};

use crate::models::CatalogTrack;

pub const SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const SPOTIFY_API_BASE: &str = "https://api.spotify.com/v1";

/// Results per search when not overridden
pub const DEFAULT_SEARCH_LIMIT: u32 = 10;

/// Maximum `limit` the search endpoint accepts
pub const MAX_SEARCH_LIMIT: u32 = 50;

/// Refresh the access token when it has less than this left
const TOKEN_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const USER_AGENT: &str = concat!("chart-match/", env!("CARGO_PKG_VERSION"));

#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    #[error("Failed to send http request: {0}")]
    Request(#[from] reqwest::Error),
    #[error("Token request rejected ({status}): {body}")]
    Auth { status: StatusCode, body: String },
    #[error("Search request failed ({status}): {body}")]
    Search { status: StatusCode, body: String },
    #[error("Failed to parse response: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Free-text track search, results in the service's ranking order.
pub trait CatalogSearch {
    fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<CatalogTrack>, CatalogError>;
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: u64,
}

#[derive(Deserialize)]
struct SearchResponse {
    tracks: TrackPage,
}

#[derive(Deserialize)]
struct TrackPage {
    // The API occasionally returns null entries
    items: Vec<Option<TrackItem>>,
}

#[derive(Deserialize)]
struct TrackItem {
    id: Option<String>,
    name: String,
    #[serde(default)]
    artists: Vec<ArtistItem>,
    #[serde(default)]
    popularity: u32,
    #[serde(default)]
    uri: String,
    album: Option<AlbumItem>,
    preview_url: Option<String>,
}

#[derive(Deserialize)]
struct ArtistItem {
    name: String,
}

#[derive(Deserialize)]
struct AlbumItem {
    name: String,
}

impl From<TrackItem> for CatalogTrack {
    fn from(item: TrackItem) -> Self {
        CatalogTrack {
            id: item.id.unwrap_or_default(),
            name: item.name,
            artists: item.artists.into_iter().map(|a| a.name).collect(),
            popularity: item.popularity,
            uri: item.uri,
            album: item.album.map(|a| a.name).unwrap_or_default(),
            preview_url: item.preview_url,
        }
    }
}

/// Parse a `/search?type=track` response body into candidates.
pub fn parse_search_response(body: &str) -> Result<Vec<CatalogTrack>, CatalogError> {
    let response: SearchResponse = serde_json::from_str(body)?;
    Ok(response
        .tracks
        .items
        .into_iter()
        .flatten()
        .map(CatalogTrack::from)
        .collect())
}

// ============================================================================
// Spotify Client
// ============================================================================

/// Connection settings for [`SpotifyClient`].
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    pub timeout: Duration,
    pub token_url: String,
    pub api_base: String,
}

impl SpotifyConfig {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            timeout: Duration::from_secs(30),
            token_url: SPOTIFY_TOKEN_URL.to_string(),
            api_base: SPOTIFY_API_BASE.to_string(),
        }
    }
}

struct AccessToken {
    value: String,
    expires_at: Instant,
}

impl AccessToken {
    fn is_fresh(&self, now: Instant) -> bool {
        now + TOKEN_REFRESH_MARGIN < self.expires_at
    }
}

/// Blocking Spotify Web API client
pub struct SpotifyClient {
    config: SpotifyConfig,
    client: Client,
    token: Option<AccessToken>,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Result<Self, CatalogError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(USER_AGENT)
            .build()?;
        Ok(Self::with_client(config, client))
    }

    /// Use a preconfigured HTTP client; `config.timeout` is not applied.
    pub fn with_client(config: SpotifyConfig, client: Client) -> Self {
        Self {
            config,
            client,
            token: None,
        }
    }

    /// Return a valid access token, requesting a new one when missing or near expiry.
    /// https://developer.spotify.com/documentation/web-api/tutorials/client-credentials-flow
    fn access_token(&mut self) -> Result<String, CatalogError> {
        if let Some(token) = &self.token {
            if token.is_fresh(Instant::now()) {
                return Ok(token.value.clone());
            }
        }

        tracing::debug!("Requesting Spotify access token");
        let requested_at = Instant::now();
        let response = self
            .client
            .post(&self.config.token_url)
            .basic_auth(&self.config.client_id, Some(&self.config.client_secret))
            // Serializes to x-www-form-urlencoded as the token endpoint requires
            .form(&[("grant_type", "client_credentials")])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(CatalogError::Auth { status, body });
        }

        let token: TokenResponse = serde_json::from_str(&body)?;
        let value = token.access_token;
        self.token = Some(AccessToken {
            value: value.clone(),
            expires_at: requested_at + Duration::from_secs(token.expires_in),
        });
        Ok(value)
    }
}

impl CatalogSearch for SpotifyClient {
    fn search_tracks(&mut self, query: &str, limit: u32) -> Result<Vec<CatalogTrack>, CatalogError> {
        let token = self.access_token()?;
        let limit = limit.clamp(1, MAX_SEARCH_LIMIT).to_string();

        let response = self
            .client
            .get(format!("{}/search", self.config.api_base))
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())])
            .send()?;

        let status = response.status();
        let body = response.text()?;
        if !status.is_success() {
            return Err(CatalogError::Search { status, body });
        }

        let tracks = parse_search_response(&body)?;
        tracing::debug!(query, results = tracks.len(), "Catalog search");
        Ok(tracks)
    }
}
