//! # Desk CLI
use crate::{
    chain::RpcChainClient,
    config::DeskConfig,
    metrics::build_exporter,
    rpc::{Desk, DeskApiServer},
    storage::DeskStorage,
    swap::SwapEngine,
};
use alloy::{primitives::Address, providers::ProviderBuilder};
use clap::Parser;
use http::header;
use jsonrpsee::server::Server;
use std::{
    net::{IpAddr, Ipv4Addr},
    path::PathBuf,
    sync::Arc,
};
use tower::ServiceBuilder;
use tower_http::cors::{AllowMethods, AllowOrigin, CorsLayer};
use tracing::{info, warn};
use url::Url;

/// The Desk service executes custodial buy and sell swaps on behalf of chat
/// sessions.
#[derive(Debug, Parser)]
#[command(author, version = crate::version::DESK_SHORT_VERSION, about = "Desk", long_about = None)]
pub struct Args {
    /// The configuration file.
    ///
    /// If missing, a default one will be used and stored in the working
    /// directory under `desk.yaml`.
    #[arg(long, value_name = "CONFIG", env = "DESK_CONFIG", default_value = "desk.yaml")]
    pub config: PathBuf,
    /// The address to serve the RPC on.
    #[arg(long = "http.addr", value_name = "ADDR", default_value_t = IpAddr::V4(Ipv4Addr::LOCALHOST))]
    pub address: IpAddr,
    /// The port to serve the RPC on.
    #[arg(long = "http.port", value_name = "PORT", default_value_t = 9229)]
    pub port: u16,
    /// The port to serve the metrics on.
    #[arg(long = "http.metrics-port", value_name = "PORT", default_value_t = 9000)]
    pub metrics_port: u16,
    /// The RPC endpoint of the chain to send transactions to.
    /// Must be a valid HTTP or HTTPS URL pointing to an Ethereum JSON-RPC
    /// endpoint.
    #[arg(long, value_name = "RPC_ENDPOINT", env = "DESK_UPSTREAM")]
    pub upstream: Url,
    /// The address service fees are sent to. Overrides the config file.
    #[arg(long = "fee-recipient", value_name = "ADDRESS")]
    pub fee_recipient: Option<Address>,
}

impl Args {
    /// Runs the service until the server shuts down.
    pub async fn run(self) -> eyre::Result<()> {
        let mut config = if self.config.exists() {
            DeskConfig::load_from_file(&self.config)?
        } else {
            let config = DeskConfig::default();
            config.write_to_file(&self.config)?;
            config
        };
        if let Some(recipient) = self.fee_recipient {
            config.fees.recipient = recipient;
        }
        if config.fees.recipient == Address::ZERO {
            warn!("fee recipient is unset; service fees will be burned");
        }

        build_exporter((self.address, self.metrics_port).into())?;

        let provider = ProviderBuilder::new().connect_http(self.upstream.clone()).erased();
        let chain = Arc::new(RpcChainClient::new(provider));
        let engine = SwapEngine::new(chain.clone(), config.clone());
        let storage = DeskStorage::in_memory();

        let cors = CorsLayer::new()
            .allow_methods(AllowMethods::any())
            .allow_origin(AllowOrigin::any())
            .allow_headers([header::CONTENT_TYPE]);
        let middleware = ServiceBuilder::new().layer(cors);

        let server = Server::builder()
            .set_http_middleware(middleware)
            .build((self.address, self.port))
            .await?;
        let addr = server.local_addr()?;
        let handle = server.start(Desk::new(engine, storage, chain, config).into_rpc());
        info!(%addr, upstream = %self.upstream, "desk RPC started");

        handle.stopped().await;
        Ok(())
    }
}
