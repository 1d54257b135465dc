//! Prometheus exposition for the feed's `metrics` series.

use anyhow::Context;
use axum::{routing::get, Router};
use metrics::{describe_gauge, gauge};
use metrics_exporter_prometheus::{PrometheusBuilder, PrometheusHandle};

use crate::ingest::describe_metrics;

pub struct Metrics {
    pub handle: PrometheusHandle,
}

impl Metrics {
    /// Install the Prometheus recorder, then register HELP text on it.
    pub fn init(cache_ttl_secs: u64) -> anyhow::Result<Self> {
        let handle = PrometheusBuilder::new()
            .install_recorder()
            .context("prometheus: install recorder")?;

        register(cache_ttl_secs);
        Ok(Self { handle })
    }

    pub fn router(&self) -> Router {
        let handle = self.handle.clone();
        Router::new().route(
            "/metrics",
            get(move || {
                let h = handle.clone();
                async move { h.render() }
            }),
        )
    }
}

// Must run against the live recorder; descriptions sent to the no-op one are lost.
fn register(cache_ttl_secs: u64) {
    describe_metrics();
    describe_gauge!("feed_cache_ttl_secs", "Configured freshness window of the merged set.");
    gauge!("feed_cache_ttl_secs").set(cache_ttl_secs as f64);
}
