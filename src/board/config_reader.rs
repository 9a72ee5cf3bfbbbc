// On-disk configuration for the board.

use std::fs;

use log::debug;
use serde::{Deserialize, Serialize};
use snafu::prelude::*;

use crate::board::{BoardResult, OpeningJsonSnafu, ParsingJsonSnafu};

/// The JSON configuration document, camelCase keyed. Every field is
/// optional; command line flags override whatever is present.
#[derive(Eq, PartialEq, Debug, Clone, Default, Serialize, Deserialize)]
pub struct BoardConfig {
    #[serde(rename = "sourceUrl")]
    pub source_url: Option<String>,
    #[serde(rename = "pollIntervalSeconds")]
    pub poll_interval_seconds: Option<u64>,
    #[serde(rename = "adoptEmptySnapshots")]
    pub adopt_empty_snapshots: Option<bool>,
    #[serde(rename = "initialRetryAttempts")]
    pub initial_retry_attempts: Option<u32>,
    #[serde(rename = "initialRetryBaseMillis")]
    pub initial_retry_base_millis: Option<u64>,
}

pub fn read_config(path: &str) -> BoardResult<BoardConfig> {
    let contents = fs::read_to_string(path).context(OpeningJsonSnafu { path })?;
    let config: BoardConfig =
        serde_json::from_str(contents.as_str()).context(ParsingJsonSnafu { path })?;
    debug!("read_config: {:?}", config);
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_a_full_document() {
        let text = r#"{
            "sourceUrl": "https://sheet/export?format=csv",
            "pollIntervalSeconds": 30,
            "adoptEmptySnapshots": false,
            "initialRetryAttempts": 5,
            "initialRetryBaseMillis": 250
        }"#;
        let config: BoardConfig = serde_json::from_str(text).unwrap();
        assert_eq!(
            config.source_url.as_deref(),
            Some("https://sheet/export?format=csv")
        );
        assert_eq!(config.poll_interval_seconds, Some(30));
        assert_eq!(config.adopt_empty_snapshots, Some(false));
        assert_eq!(config.initial_retry_attempts, Some(5));
        assert_eq!(config.initial_retry_base_millis, Some(250));
    }

    #[test]
    fn every_field_is_optional() {
        let config: BoardConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, BoardConfig::default());
    }
}
