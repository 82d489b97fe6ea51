//! TCP command server
//!
//! One command per connection: read a line, dispatch it on a blocking
//! worker, write one JSON line back, close. Every accepted connection gets
//! its own task, so a long `WAIT_*` or gesture never holds up the accept
//! loop. Blocking work runs on tokio's blocking pool, which grows on demand
//! (up to its configured thread cap). Consider a tighter explicit cap before
//! exposing the server beyond a trusted loopback client.

use crate::dispatcher::Dispatcher;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::io::{AsyncWriteExt, BufReader};
use tokio::net::{TcpListener, TcpSocket, TcpStream};
use tokio::sync::Notify;
use tokio::task::JoinHandle;
use uix_protocol::{
    CommandError, DEFAULT_BIND_ADDR, DEFAULT_PORT, ProtocolError, Response, read_line,
    write_response,
};

/// Default listen backlog
pub const DEFAULT_BACKLOG: u32 = 8;

/// Default time a client has to deliver its command line
pub const DEFAULT_READ_TIMEOUT: Duration = Duration::from_secs(30);

/// How long unread client input is drained after the response is sent
const LINGER_TIMEOUT: Duration = Duration::from_secs(1);

/// Command server configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub bind: IpAddr,
    pub port: u16,
    pub backlog: u32,
    pub read_timeout: Duration,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND_ADDR,
            port: DEFAULT_PORT,
            backlog: DEFAULT_BACKLOG,
            read_timeout: DEFAULT_READ_TIMEOUT,
        }
    }
}

impl ServerConfig {
    pub fn addr(&self) -> SocketAddr {
        SocketAddr::new(self.bind, self.port)
    }
}

/// Listener-level failures. These stop the server.
#[derive(Debug, Error)]
pub enum ServerError {
    #[error("Failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    #[error("Accept failed: {0}")]
    Accept(#[source] std::io::Error),
    #[error("Server task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

/// Handle to a running server
pub struct ServerHandle {
    local_addr: SocketAddr,
    shutdown: Arc<Notify>,
    task: JoinHandle<Result<(), ServerError>>,
}

impl ServerHandle {
    /// The address actually bound (useful with port 0)
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Stop accepting new connections. In-flight commands run to completion.
    pub fn shutdown(&self) {
        self.shutdown.notify_one();
    }

    /// Wait for the accept loop to exit.
    ///
    /// Must not be awaited again once it has returned.
    pub async fn join(&mut self) -> Result<(), ServerError> {
        (&mut self.task).await?
    }
}

/// Command server
pub struct CommandServer;

impl CommandServer {
    /// Bind the listener with the configured backlog
    pub fn bind(config: &ServerConfig) -> Result<TcpListener, ServerError> {
        let addr = config.addr();
        let bind_err = |source| ServerError::Bind { addr, source };

        if !addr.ip().is_loopback() {
            tracing::warn!("Binding command server to non-loopback address {}", addr);
        }

        let socket = match addr {
            SocketAddr::V4(_) => TcpSocket::new_v4(),
            SocketAddr::V6(_) => TcpSocket::new_v6(),
        }
        .map_err(bind_err)?;
        #[cfg(unix)]
        socket.set_reuseaddr(true).map_err(bind_err)?;
        socket.bind(addr).map_err(bind_err)?;
        socket.listen(config.backlog).map_err(bind_err)
    }

    /// Bind and run the accept loop on a background task
    pub fn spawn(
        config: &ServerConfig,
        dispatcher: Arc<Dispatcher>,
    ) -> Result<ServerHandle, ServerError> {
        let listener = Self::bind(config)?;
        let local_addr = listener.local_addr().map_err(|source| ServerError::Bind {
            addr: config.addr(),
            source,
        })?;
        let shutdown = Arc::new(Notify::new());

        let task = tokio::spawn(Self::run(
            listener,
            dispatcher,
            config.read_timeout,
            Arc::clone(&shutdown),
        ));

        Ok(ServerHandle {
            local_addr,
            shutdown,
            task,
        })
    }

    /// Accept connections until `shutdown` is notified or accept fails
    pub async fn run(
        listener: TcpListener,
        dispatcher: Arc<Dispatcher>,
        read_timeout: Duration,
        shutdown: Arc<Notify>,
    ) -> Result<(), ServerError> {
        match listener.local_addr() {
            Ok(addr) => tracing::info!("Command server listening on {}", addr),
            Err(e) => tracing::debug!("Could not read local address: {}", e),
        }

        loop {
            let accepted = tokio::select! {
                _ = shutdown.notified() => {
                    tracing::info!("Command server stopped accepting connections");
                    return Ok(());
                }
                accepted = listener.accept() => accepted,
            };

            match accepted {
                Ok((stream, peer)) => {
                    let dispatcher = Arc::clone(&dispatcher);
                    tokio::spawn(async move {
                        if let Err(e) =
                            Self::handle_connection(stream, dispatcher, read_timeout).await
                        {
                            match e {
                                ProtocolError::ConnectionClosed => {
                                    tracing::debug!("Client {} closed without a command", peer);
                                }
                                _ => {
                                    tracing::error!("Connection error from {}: {}", peer, e);
                                }
                            }
                        }
                    });
                }
                Err(e) => {
                    tracing::error!("Accept error, command server stopping: {}", e);
                    return Err(ServerError::Accept(e));
                }
            }
        }
    }

    /// Handle a single connection: exactly one command, exactly one response
    async fn handle_connection(
        stream: TcpStream,
        dispatcher: Arc<Dispatcher>,
        read_timeout: Duration,
    ) -> Result<(), ProtocolError> {
        let (reader, mut writer) = stream.into_split();
        let mut reader = BufReader::new(reader);

        let line = match tokio::time::timeout(read_timeout, read_line(&mut reader)).await {
            Ok(line) => line,
            Err(_) => {
                tracing::warn!("No command received within {:?}, closing", read_timeout);
                return Ok(());
            }
        };

        let response = match line {
            Ok(line) => {
                tracing::debug!("Received command: {:?}", line);
                match tokio::task::spawn_blocking(move || dispatcher.dispatch_line(&line)).await
                {
                    Ok(response) => response,
                    Err(e) => {
                        tracing::error!("Command handler failed: {}", e);
                        Response::Error(CommandError::ActionFailed)
                    }
                }
            }
            Err(ProtocolError::LineTooLong(max)) => {
                tracing::warn!("Rejected command longer than {} bytes", max);
                Response::Error(CommandError::CommandTooLong)
            }
            Err(e) => return Err(e),
        };

        tracing::debug!("Sending response: {:?}", response);
        write_response(&mut writer, &response).await?;
        writer.shutdown().await?;

        // Closing with unread input would reset the connection and could
        // discard the response before the client reads it.
        let _ = tokio::time::timeout(
            LINGER_TIMEOUT,
            tokio::io::copy(&mut reader, &mut tokio::io::sink()),
        )
        .await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 9001);
        assert_eq!(config.backlog, 8);
        assert!(config.bind.is_loopback());
        assert_eq!(config.addr().to_string(), "127.0.0.1:9001");
    }

    #[tokio::test]
    async fn test_bind_ephemeral_port() {
        let config = ServerConfig {
            port: 0,
            ..Default::default()
        };
        let listener = CommandServer::bind(&config).unwrap();
        let addr = listener.local_addr().unwrap();
        assert_eq!(addr.ip(), IpAddr::V4(Ipv4Addr::LOCALHOST));
        assert_ne!(addr.port(), 0);
    }

    #[tokio::test]
    async fn test_bind_conflict_is_reported() {
        let first = CommandServer::bind(&ServerConfig {
            port: 0,
            ..Default::default()
        })
        .unwrap();
        let taken = first.local_addr().unwrap().port();

        let err = CommandServer::bind(&ServerConfig {
            port: taken,
            ..Default::default()
        })
        .unwrap_err();
        assert!(matches!(err, ServerError::Bind { .. }));
        assert!(err.to_string().contains(&taken.to_string()));
    }
}
