// src/ingest/mod.rs
pub mod providers;
pub mod types;

use std::time::Duration;

use anyhow::{anyhow, Context, Result};
use metrics::{describe_counter, describe_gauge, describe_histogram};
use once_cell::sync::OnceCell;
use serde::de::DeserializeOwned;
use tokio_util::sync::CancellationToken;

const USER_AGENT: &str = concat!("smartfeed/", env!("CARGO_PKG_VERSION"));

/// One-time metrics registration (so series show up on /metrics).
pub(crate) fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(describe_metrics);
}

/// Registers HELP text for every feed series on the current recorder.
pub fn describe_metrics() {
    describe_counter!(
        "feed_cache_hits_total",
        "Merged article reads served from cache."
    );
    describe_counter!(
        "feed_cache_misses_total",
        "Merged article reads that triggered a provider fan-out."
    );
    describe_counter!(
        "feed_provider_errors_total",
        "Provider listing failures (abort the whole aggregation)."
    );
    describe_counter!(
        "feed_items_skipped_total",
        "Single items skipped after a fetch/decode failure."
    );
    describe_counter!("cache_swept_total", "Expired cache entries removed by sweep.");
    describe_gauge!("feed_merged_articles", "Size of the last merged article set.");
    describe_histogram!("feed_fetch_ms", "Full fan-out time in milliseconds.");
}

/// Shared HTTP client for all providers. `timeout` bounds each request.
pub fn http_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .connect_timeout(timeout.min(Duration::from_secs(4)))
        .timeout(timeout)
        .build()
        .context("building reqwest client")
}

/// GET `url` and decode the JSON body, racing the request against `cancel`.
/// Non-2xx statuses are errors.
pub(crate) async fn get_json<T: DeserializeOwned>(
    client: &reqwest::Client,
    url: &str,
    cancel: &CancellationToken,
) -> Result<T> {
    let fetch = async {
        let resp = client
            .get(url)
            .send()
            .await
            .with_context(|| format!("GET {url}"))?
            .error_for_status()
            .with_context(|| format!("GET {url} status"))?;
        resp.json::<T>()
            .await
            .with_context(|| format!("decoding {url}"))
    };

    tokio::select! {
        biased;
        _ = cancel.cancelled() => Err(anyhow!("request cancelled: {url}")),
        res = fetch => res,
    }
}

/// Trim a base URL so `format!("{base}/path")` never doubles the slash.
pub(crate) fn trim_base(base: impl Into<String>) -> String {
    let mut s = base.into();
    while s.ends_with('/') {
        s.pop();
    }
    s
}
