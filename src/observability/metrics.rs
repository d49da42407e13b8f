//! Metrics collection and exposition.
//!
//! # Metrics
//! - `wallet_sends_total` (counter): send attempts by outcome
//! - `wallet_account_state_updates_total` (counter): snapshots by outcome (applied, stale)
//! - `wallet_account_nonce` (gauge): nonce of the cached account state
//! - `wallet_last_block_height` (gauge): last reported block height
//!
//! Without an installed recorder every call is a no-op.

use ::metrics::{counter, gauge};
use metrics_exporter_prometheus::{BuildError, PrometheusBuilder};
use std::net::SocketAddr;

/// Install the Prometheus exporter with an HTTP listener on `addr`.
///
/// Must be called from within a Tokio runtime.
pub fn init_metrics(addr: SocketAddr) -> Result<(), BuildError> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    tracing::info!(address = %addr, "Metrics exporter listening");
    Ok(())
}

pub fn record_send(outcome: &'static str) {
    counter!("wallet_sends_total", "outcome" => outcome).increment(1);
}

pub fn record_account_state_update(outcome: &'static str) {
    counter!("wallet_account_state_updates_total", "outcome" => outcome).increment(1);
}

pub fn record_account_nonce(nonce: u64) {
    gauge!("wallet_account_nonce").set(nonce as f64);
}

pub fn record_block_height(height: u64) {
    gauge!("wallet_last_block_height").set(height as f64);
}
