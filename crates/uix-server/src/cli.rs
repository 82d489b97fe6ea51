//! Command-line interface

use crate::constants::{DEFAULT_READ_TIMEOUT_MS, DEFAULT_RESPONSE_TIMEOUT_MS};
use clap::{Args, Parser, Subcommand};
use std::net::IpAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::filter::LevelFilter;
use uix_agent::{DEFAULT_BACKLOG, ServerConfig};
use uix_protocol::{DEFAULT_BIND_ADDR, DEFAULT_PORT};

#[derive(Debug, Parser)]
#[command(name = "uixd", version, about = "Remote UI control over a line protocol")]
pub struct Cli {
    /// Log level used when RUST_LOG is not set
    #[arg(long, env = "UIX_LOG", default_value = "info", global = true)]
    pub log_level: LevelFilter,

    #[command(subcommand)]
    pub command: CliCommand,
}

#[derive(Debug, Subcommand)]
pub enum CliCommand {
    /// Run the command server against a simulated device
    Serve(ServeArgs),
    /// Send one command to a running server and print the response
    Send(SendArgs),
}

#[derive(Debug, Args)]
pub struct ServeArgs {
    /// Address to listen on
    #[arg(long, env = "UIX_BIND", default_value_t = DEFAULT_BIND_ADDR)]
    pub bind: IpAddr,

    #[arg(short, long, env = "UIX_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    #[arg(long, env = "UIX_BACKLOG", default_value_t = DEFAULT_BACKLOG)]
    pub backlog: u32,

    /// Time a client has to send its command, in milliseconds
    #[arg(long, env = "UIX_READ_TIMEOUT_MS", default_value_t = DEFAULT_READ_TIMEOUT_MS)]
    pub read_timeout_ms: u64,

    /// JSON UI tree to publish as the initial snapshot
    #[arg(long, env = "UIX_FIXTURE")]
    pub fixture: Option<PathBuf>,
}

impl ServeArgs {
    pub fn server_config(&self) -> ServerConfig {
        ServerConfig {
            bind: self.bind,
            port: self.port,
            backlog: self.backlog,
            read_timeout: Duration::from_millis(self.read_timeout_ms),
        }
    }
}

#[derive(Debug, Args)]
pub struct SendArgs {
    #[arg(long, default_value_t = DEFAULT_BIND_ADDR)]
    pub host: IpAddr,

    #[arg(short, long, env = "UIX_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Time to wait for the response, in milliseconds
    #[arg(long, default_value_t = DEFAULT_RESPONSE_TIMEOUT_MS)]
    pub timeout_ms: u64,

    /// Pretty-print the response instead of echoing the raw line
    #[arg(long)]
    pub pretty: bool,

    /// Command verb and arguments, joined with single spaces
    #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
    pub command: Vec<String>,
}

impl SendArgs {
    pub fn line(&self) -> String {
        self.command.join(" ")
    }
}
