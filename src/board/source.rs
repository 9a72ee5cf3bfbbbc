// Retrieval of the published CSV document.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use log::debug;
use snafu::prelude::*;

use crate::board::{BoardResult, BuildingClientSnafu, SourceStatusSnafu, TransportSnafu};

const USER_AGENT: &str = "readboard/0.1.0";
const FETCH_TIMEOUT: Duration = Duration::from_secs(30);

/// Where the raw source document comes from.
///
/// The controller scripts this in tests and swaps in HTTP in production.
#[allow(async_fn_in_trait)]
pub trait DocumentSource {
    /// Retrieves the document text. `seq` is the controller's fetch
    /// sequence token; HTTP sources fold it into a cache-defeating query
    /// parameter.
    async fn fetch(&mut self, seq: u64) -> BoardResult<String>;
}

/// The source document changes externally, so staleness from an
/// intermediate cache is unacceptable: every request carries a changing
/// query parameter on top of the no-cache headers.
pub fn cache_busted(url: &str, token: &str) -> String {
    let sep = if url.contains('?') { '&' } else { '?' };
    format!("{}{}cachebust={}", url, sep, token)
}

/// Fetches the published spreadsheet export over HTTP.
pub struct HttpSource {
    url: String,
    client: reqwest::Client,
}

impl HttpSource {
    pub fn new(url: String) -> BoardResult<HttpSource> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(FETCH_TIMEOUT)
            .build()
            .context(BuildingClientSnafu {})?;
        Ok(HttpSource { url, client })
    }
}

impl DocumentSource for HttpSource {
    async fn fetch(&mut self, seq: u64) -> BoardResult<String> {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or(0);
        let url = cache_busted(&self.url, &format!("{}-{}", millis, seq));
        debug!("fetch: GET {}", url);

        let response = self
            .client
            .get(&url)
            .header("Cache-Control", "no-cache")
            .header("Pragma", "no-cache")
            .send()
            .await
            .context(TransportSnafu {})?;

        let status = response.status();
        ensure!(
            status.is_success(),
            SourceStatusSnafu {
                status: status.as_u16()
            }
        );
        response.text().await.context(TransportSnafu {})
    }
}
