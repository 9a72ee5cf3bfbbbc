// Top-level wiring for the board process: error taxonomy, configuration
// merging and the run modes.

use std::fs;
use std::time::Duration;

use log::{debug, info, warn};
use snafu::{prelude::*, Snafu};

use leaderboard::{snapshot_from_csv, DocumentError, Snapshot};

use crate::args::Args;

pub mod config_reader;
pub mod controller;
pub mod output;
pub mod placeholder;
pub mod source;

use crate::board::config_reader::BoardConfig;
use crate::board::controller::{BoardController, ControllerOptions, RetryPolicy};
use crate::board::source::HttpSource;

#[derive(Debug, Snafu)]
pub enum BoardError {
    #[snafu(display("Error opening input file {path}"))]
    OpeningCsv {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error opening {path}"))]
    OpeningJson {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error parsing JSON document {path}"))]
    ParsingJson {
        source: serde_json::Error,
        path: String,
    },
    #[snafu(display("Error rendering JSON output"))]
    RenderingJson { source: serde_json::Error },
    #[snafu(display("Error writing output to {path}"))]
    WritingOutput {
        source: std::io::Error,
        path: String,
    },
    #[snafu(display("Error building the HTTP client"))]
    BuildingClient { source: reqwest::Error },
    #[snafu(display("Transport failure fetching the source document"))]
    Transport { source: reqwest::Error },
    #[snafu(display("HTTP status {status} from the source document"))]
    SourceStatus { status: u16 },
    #[snafu(display("Unusable source document"))]
    DocumentShape { source: DocumentError },

    #[snafu(whatever, display("{message}"))]
    Whatever {
        message: String,
        #[snafu(source(from(Box<dyn std::error::Error>, Some)))]
        source: Option<Box<dyn std::error::Error>>,
    },
}

pub type BoardResult<T> = Result<T, BoardError>;

const DEFAULT_POLL_SECONDS: u64 = 60;

// Command line flags win over the configuration document; anything left
// unset falls back to the declared defaults.
fn effective_options(args: &Args, config: &BoardConfig) -> ControllerOptions {
    let defaults = RetryPolicy::DEFAULT;
    ControllerOptions {
        poll_interval: Duration::from_secs(
            args.poll_interval
                .or(config.poll_interval_seconds)
                .unwrap_or(DEFAULT_POLL_SECONDS),
        ),
        retry: RetryPolicy {
            max_attempts: config
                .initial_retry_attempts
                .unwrap_or(defaults.max_attempts),
            base_delay: config
                .initial_retry_base_millis
                .map(Duration::from_millis)
                .unwrap_or(defaults.base_delay),
        },
        adopt_empty: config.adopt_empty_snapshots.unwrap_or(true),
    }
}

fn finish_snapshot(snapshot: &Snapshot, args: &Args) -> BoardResult<()> {
    let js = output::snapshot_to_json(snapshot);
    let pretty = serde_json::to_string_pretty(&js).context(RenderingJsonSnafu {})?;
    if let Some(out) = &args.out {
        output::write_snapshot(out, &pretty)?;
    }
    if let Some(reference) = &args.reference {
        output::check_reference(reference, &pretty)?;
    }
    Ok(())
}

// One-shot reconciliation of a local CSV file.
fn run_local(path: &str, args: &Args) -> BoardResult<()> {
    info!("Attempting to read source file {:?}", path);
    let text = fs::read_to_string(path).context(OpeningCsvSnafu { path })?;
    let snapshot = snapshot_from_csv(&text).context(DocumentShapeSnafu)?;
    info!(
        "reconciled {} participants, {} reviews from {}",
        snapshot.participants.len(),
        snapshot.reviews.len(),
        path
    );
    finish_snapshot(&snapshot, args)
}

/// Entry point once arguments are parsed.
pub async fn run_board(args: Args) -> BoardResult<()> {
    let config = match &args.config {
        Some(path) => config_reader::read_config(path)?,
        None => BoardConfig::default(),
    };

    if let Some(path) = &args.input {
        return run_local(path, &args);
    }

    let source_url = args
        .source_url
        .clone()
        .or_else(|| config.source_url.clone())
        .unwrap_or_default();
    let options = effective_options(&args, &config);

    let source = if source_url.is_empty() {
        info!("no source URL configured, serving placeholder content");
        None
    } else {
        info!("polling {} every {:?}", source_url, options.poll_interval);
        Some(HttpSource::new(source_url)?)
    };

    let mut controller = BoardController::new(source, options);
    controller.subscribe(|snapshot: &Snapshot| {
        debug!(
            "snapshot pushed: {} participants, {} reviews",
            snapshot.participants.len(),
            snapshot.reviews.len()
        );
    });

    if args.once {
        controller.run_initial().await;
        if controller.last_success().is_none() {
            warn!("no fetch succeeded; the snapshot reflects fallback content");
        }
        let snapshot = controller.snapshot();
        return finish_snapshot(&snapshot, &args);
    }

    if let Some(out) = args.out.clone() {
        controller.subscribe(move |snapshot: &Snapshot| {
            let js = output::snapshot_to_json(snapshot);
            match serde_json::to_string_pretty(&js) {
                Ok(pretty) => {
                    if let Err(e) = output::write_snapshot(&out, &pretty) {
                        warn!("failed to write snapshot: {}", e);
                    }
                }
                Err(e) => warn!("failed to render snapshot: {}", e),
            }
        });
    }

    controller.run().await;
    Ok(())
}
