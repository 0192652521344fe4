//! Desk metrics.

use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;

/// Installs the global Prometheus recorder and serves `/metrics` on `addr`.
///
/// Must be called from within a tokio runtime; the exporter runs on it.
pub fn build_exporter(addr: SocketAddr) -> eyre::Result<()> {
    PrometheusBuilder::new().with_http_listener(addr).install()?;
    Ok(())
}
