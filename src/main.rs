use anyhow::{Context, Result};
use clap::Parser;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

use chart_match::catalog::{SpotifyClient, SpotifyConfig, DEFAULT_SEARCH_LIMIT, MAX_SEARCH_LIMIT};
use chart_match::output::DEFAULT_CHART_PREFIX;
use chart_match::pipeline::{run, RunConfig};
use chart_match::progress::set_log_only;
use chart_match::reconcile::ReconcileOptions;
use chart_match::scoring::{MatchThresholds, ARTIST_THRESHOLD, TITLE_THRESHOLD};

#[derive(Parser)]
#[command(name = "chart-match")]
#[command(about = "Match chart rows (title, artist) against Spotify track search")]
struct Args {
    /// Chart CSV with at least `title` and `artist` columns
    #[arg(long, default_value = "datasets/billboard.csv")]
    input: PathBuf,

    #[arg(long, default_value = "datasets/spotify_billboard.csv")]
    matched: PathBuf,

    #[arg(long, default_value = "datasets/unmatched_spotify_billboard.csv")]
    unmatched: PathBuf,

    /// Prefix for chart columns in the matched table
    #[arg(long, default_value = DEFAULT_CHART_PREFIX)]
    prefix: String,

    /// Title score must exceed this (0-100)
    #[arg(long, default_value_t = TITLE_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
    title_threshold: u8,

    /// Artist score must exceed this (0-100)
    #[arg(long, default_value_t = ARTIST_THRESHOLD, value_parser = clap::value_parser!(u8).range(0..=100))]
    artist_threshold: u8,

    /// Search results requested per row
    #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, value_parser = clap::value_parser!(u32).range(1..=MAX_SEARCH_LIMIT as i64))]
    limit: u32,

    /// HTTP request timeout in seconds
    #[arg(long, default_value = "30")]
    timeout_secs: u64,

    #[arg(long, env = "SPOTIFY_CLIENT_ID", hide_env_values = true)]
    client_id: String,

    #[arg(long, env = "SPOTIFY_CLIENT_SECRET", hide_env_values = true)]
    client_secret: String,

    /// Write a JSON run summary to this path
    #[arg(long)]
    stats: Option<PathBuf>,

    /// Hide progress bars and log periodic progress lines instead
    #[arg(long)]
    log_only: bool,
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_tracing();
    set_log_only(args.log_only);

    let mut spotify = SpotifyConfig::new(args.client_id, args.client_secret);
    spotify.timeout = Duration::from_secs(args.timeout_secs);
    let mut client = SpotifyClient::new(spotify).context("Failed to build HTTP client")?;

    let config = RunConfig {
        input: args.input,
        matched: args.matched,
        unmatched: args.unmatched,
        prefix: args.prefix,
        options: ReconcileOptions {
            thresholds: MatchThresholds {
                title: args.title_threshold,
                artist: args.artist_threshold,
            },
            limit: args.limit,
        },
        stats: args.stats,
    };

    let stats = run(&config, &mut client)?;
    println!("Unmatched tracks: {}", stats.unmatched);

    Ok(())
}
