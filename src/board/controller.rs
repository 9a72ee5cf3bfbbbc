// Snapshot ownership and the reconcile policy under network unreliability.

use std::time::{Duration, Instant};

use log::{debug, info, warn};
use snafu::prelude::*;

use leaderboard::{snapshot_from_csv, Snapshot};

use crate::board::placeholder::placeholder_snapshot;
use crate::board::source::DocumentSource;
use crate::board::{BoardError, DocumentShapeSnafu};

/// Bounded retry with exponential backoff for the initial fetch.
#[derive(Eq, PartialEq, Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    /// Delay before the first retry; it doubles after every failed attempt.
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub const DEFAULT: RetryPolicy = RetryPolicy {
        max_attempts: 3,
        base_delay: Duration::from_secs(1),
    };

    fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay * 2u32.saturating_pow(attempt.saturating_sub(1))
    }
}

#[derive(Eq, PartialEq, Debug, Clone)]
pub struct ControllerOptions {
    pub poll_interval: Duration,
    pub retry: RetryPolicy,
    /// Whether an empty-but-valid document replaces held non-empty data.
    /// A spreadsheet can legitimately become empty, so the default is to
    /// adopt.
    pub adopt_empty: bool,
}

impl Default for ControllerOptions {
    fn default() -> Self {
        ControllerOptions {
            poll_interval: Duration::from_secs(60),
            retry: RetryPolicy::DEFAULT,
            adopt_empty: true,
        }
    }
}

// Terminal states of one fetch cycle.
#[derive(Debug)]
enum FetchOutcome {
    ParseOk(Snapshot),
    ParseFailed(BoardError),
    NetworkFailed(BoardError),
}

type Listener = Box<dyn Fn(&Snapshot)>;
type VisibilityProbe = Box<dyn Fn() -> bool>;

/// Owns the process-wide snapshot and applies the reconciliation policy.
///
/// The held snapshot is only ever swapped whole, and [`snapshot`] hands
/// out a clone, so no reader can observe a partial update. Failures keep
/// the previous snapshot; the built-in placeholder only shows before the
/// first success.
///
/// [`snapshot`]: BoardController::snapshot
pub struct BoardController<S: DocumentSource> {
    source: Option<S>,
    options: ControllerOptions,
    snapshot: Snapshot,
    last_success: Option<Instant>,
    in_flight: bool,
    fetch_seq: u64,
    listeners: Vec<Listener>,
    visibility: VisibilityProbe,
}

impl<S: DocumentSource> BoardController<S> {
    pub fn new(source: Option<S>, options: ControllerOptions) -> BoardController<S> {
        BoardController {
            source,
            options,
            snapshot: placeholder_snapshot(),
            last_success: None,
            in_flight: false,
            fetch_seq: 0,
            listeners: Vec::new(),
            visibility: Box::new(|| true),
        }
    }

    /// Replaces the default always-visible probe. Poll ticks are skipped
    /// while the probe reports the viewing surface hidden; the probe is
    /// read fresh at every tick.
    #[allow(dead_code)]
    pub fn with_visibility_probe(mut self, probe: impl Fn() -> bool + 'static) -> Self {
        self.visibility = Box::new(probe);
        self
    }

    /// Registers a callback invoked once at startup with the held content
    /// and after every adopted reconciliation.
    pub fn subscribe(&mut self, listener: impl Fn(&Snapshot) + 'static) {
        self.listeners.push(Box::new(listener));
    }

    /// The current snapshot, as an atomic value.
    pub fn snapshot(&self) -> Snapshot {
        self.snapshot.clone()
    }

    pub fn last_success(&self) -> Option<Instant> {
        self.last_success
    }

    pub fn has_succeeded(&self) -> bool {
        self.last_success.is_some()
    }

    fn notify(&self) {
        for listener in &self.listeners {
            listener(&self.snapshot);
        }
    }

    // One full cycle: Idle -> Fetching -> outcome -> Idle. Returns None
    // when no source is configured or a fetch is already in flight.
    async fn fetch_cycle(&mut self) -> Option<(u64, FetchOutcome)> {
        if self.in_flight {
            // The interval timer alone does not guarantee this.
            debug!("fetch_cycle: previous fetch still in flight, skipping");
            return None;
        }
        self.in_flight = true;
        self.fetch_seq += 1;
        let seq = self.fetch_seq;

        let fetched = match self.source.as_mut() {
            Some(source) => source.fetch(seq).await,
            None => {
                self.in_flight = false;
                return None;
            }
        };
        let outcome = match fetched {
            Err(e) => FetchOutcome::NetworkFailed(e),
            Ok(text) => match snapshot_from_csv(&text).context(DocumentShapeSnafu) {
                Ok(snapshot) => FetchOutcome::ParseOk(snapshot),
                Err(e) => FetchOutcome::ParseFailed(e),
            },
        };
        self.in_flight = false;
        Some((seq, outcome))
    }

    fn apply(&mut self, seq: u64, outcome: FetchOutcome) {
        if seq != self.fetch_seq {
            // A newer cycle has started; this resolution is stale.
            debug!("apply: discarding stale outcome of fetch {}", seq);
            return;
        }
        match outcome {
            FetchOutcome::ParseOk(snapshot) => {
                if snapshot.is_empty() && !self.options.adopt_empty && !self.snapshot.is_empty() {
                    info!("reconcile: empty snapshot rejected by policy, keeping previous");
                    self.last_success = Some(Instant::now());
                    return;
                }
                self.snapshot = snapshot;
                self.last_success = Some(Instant::now());
                info!(
                    "updated: {} participants, {} reviews",
                    self.snapshot.participants.len(),
                    self.snapshot.reviews.len()
                );
                self.notify();
            }
            FetchOutcome::ParseFailed(e) => {
                warn!(
                    "reconcile: unusable response, keeping previous snapshot: {}",
                    e
                );
            }
            FetchOutcome::NetworkFailed(e) => {
                warn!("reconcile: fetch failed, keeping previous snapshot: {}", e);
            }
        }
    }

    /// Initial reconciliation: the startup push, then bounded retries with
    /// exponential backoff, falling back to the held placeholder content
    /// when every attempt fails.
    pub async fn run_initial(&mut self) {
        // Startup content is whatever is held, the built-in placeholder.
        self.notify();
        if self.source.is_none() {
            return;
        }
        let retry = self.options.retry;
        for attempt in 1..=retry.max_attempts {
            match self.fetch_cycle().await {
                Some((seq, outcome)) => {
                    let adopted = matches!(outcome, FetchOutcome::ParseOk(_));
                    self.apply(seq, outcome);
                    if adopted {
                        return;
                    }
                }
                None => return,
            }
            if attempt < retry.max_attempts {
                let delay = retry.delay_after(attempt);
                debug!(
                    "initial fetch attempt {} failed, retrying after {:?}",
                    attempt, delay
                );
                tokio::time::sleep(delay).await;
            }
        }
        warn!(
            "initial fetch failed after {} attempts, serving placeholder content",
            retry.max_attempts
        );
    }

    /// One visibility-gated poll tick.
    pub async fn poll_once(&mut self) {
        // Read the probe fresh at every tick.
        if !(self.visibility)() {
            debug!("poll: viewing surface hidden, skipping tick");
            return;
        }
        if let Some((seq, outcome)) = self.fetch_cycle().await {
            self.apply(seq, outcome);
        }
    }

    /// Runs the initial reconciliation and then polls on a fixed interval
    /// until the task is dropped. With no source configured this returns
    /// after the startup push.
    pub async fn run(&mut self) {
        self.run_initial().await;
        if self.source.is_none() {
            return;
        }
        let mut ticker = tokio::time::interval(self.options.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        // The first tick of a tokio interval fires immediately.
        ticker.tick().await;
        loop {
            ticker.tick().await;
            self.poll_once().await;
        }
    }
}
