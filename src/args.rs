use clap::Parser;

/// Reconciliation service for a reading-challenge leaderboard.
#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None)]
pub struct Args {
    /// (file path, optional) A JSON configuration document. Command line
    /// flags override the values it carries.
    #[clap(short, long, value_parser)]
    pub config: Option<String>,

    /// (url, optional) The published CSV export to poll. Overrides the
    /// configuration document. When neither is set, the board serves the
    /// built-in placeholder content and never touches the network.
    #[clap(short, long, value_parser)]
    pub source_url: Option<String>,

    /// (file path, optional) A local CSV file to reconcile once instead of
    /// fetching from the network.
    #[clap(short, long, value_parser)]
    pub input: Option<String>,

    /// (file path or 'stdout') If specified, the reconciled snapshot will be
    /// written in JSON format to the given location. In polling mode the file
    /// is rewritten after every adopted snapshot.
    #[clap(short, long, value_parser)]
    pub out: Option<String>,

    /// (file path) A reference snapshot in JSON format. If provided, one-shot
    /// runs check that the reconciled output matches the reference.
    #[clap(short, long, value_parser)]
    pub reference: Option<String>,

    /// (seconds) Interval between reconciliation polls.
    #[clap(long, value_parser)]
    pub poll_interval: Option<u64>,

    /// Fetch and reconcile a single time, then exit instead of polling.
    #[clap(long, takes_value = false)]
    pub once: bool,

    // Other arguments
    /// If passed as an argument, will turn on verbose logging to the standard
    /// output.
    #[clap(long, takes_value = false)]
    pub verbose: bool,
}
