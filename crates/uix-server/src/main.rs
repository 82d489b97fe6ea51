//! uixd: host for the uix command server
//!
//! `uixd serve` runs the line-protocol server against a simulated device
//! whose UI is loaded from a JSON fixture. `uixd send` is a small client for
//! poking a running server from a shell.

mod cli;
mod client;
mod constants;
mod errors;
mod simulator;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, CliCommand, SendArgs, ServeArgs};
use client::CommandClient;
use simulator::{SimulatedDevice, load_fixture};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uix_agent::{Dispatcher, SnapshotStore, UixAgent};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries `send` output, so logs go to stderr
    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(
            EnvFilter::builder()
                .with_default_directive(cli.log_level.into())
                .from_env_lossy(),
        )
        .init();

    match cli.command {
        CliCommand::Serve(args) => serve(args).await,
        CliCommand::Send(args) => send(args).await,
    }
}

async fn serve(args: ServeArgs) -> Result<()> {
    let store = Arc::new(SnapshotStore::new());
    if let Some(path) = &args.fixture {
        let root = load_fixture(path)?;
        tracing::info!(
            "Loaded fixture {} ({} nodes)",
            path.display(),
            root.subtree_len()
        );
        store.replace(Some(root));
    }

    let device = Arc::new(SimulatedDevice::new(Arc::clone(&store)));
    let dispatcher = Dispatcher::new(Arc::clone(&store), device.clone(), device);
    let agent = UixAgent::from_parts(store, dispatcher);

    let mut server = agent
        .start_server(&args.server_config())
        .context("Failed to start command server")?;
    tracing::info!("uixd listening on {}", server.local_addr());

    let interrupted = tokio::select! {
        result = server.join() => {
            result?;
            false
        }
        signal = tokio::signal::ctrl_c() => {
            signal.context("Failed to listen for Ctrl-C")?;
            true
        }
    };

    if interrupted {
        tracing::info!("Shutting down, waiting for in-flight commands");
        server.shutdown();
        server.join().await?;
    }

    tracing::info!("uixd stopped");
    Ok(())
}

async fn send(args: SendArgs) -> Result<()> {
    let addr = SocketAddr::new(args.host, args.port);
    let client =
        CommandClient::new(addr).with_response_timeout(Duration::from_millis(args.timeout_ms));
    let context = || format!("Failed to talk to {}", addr);

    if args.pretty {
        let value = client.send(&args.line()).await.with_context(context)?;
        println!("{}", serde_json::to_string_pretty(&value)?);
    } else {
        let line = client.send_line(&args.line()).await.with_context(context)?;
        println!("{}", line);
    }
    Ok(())
}
