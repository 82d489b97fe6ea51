//! Line-protocol client for a running command server

use crate::constants::{DEFAULT_CONNECT_TIMEOUT_MS, DEFAULT_RESPONSE_TIMEOUT_MS};
use std::io::ErrorKind;
use std::net::SocketAddr;
use std::time::Duration;
use tokio::io::BufReader;
use tokio::net::TcpStream;
use uix_protocol::{ProtocolError, read_line, write_command};

/// Sends one command per connection, as the server expects
pub struct CommandClient {
    addr: SocketAddr,
    connect_timeout: Duration,
    response_timeout: Duration,
}

impl CommandClient {
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connect_timeout: Duration::from_millis(DEFAULT_CONNECT_TIMEOUT_MS),
            response_timeout: Duration::from_millis(DEFAULT_RESPONSE_TIMEOUT_MS),
        }
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    /// Send a command and return the raw response line
    pub async fn send_line(&self, command: &str) -> Result<String, ProtocolError> {
        let stream = tokio::time::timeout(self.connect_timeout, TcpStream::connect(self.addr))
            .await
            .map_err(|_| timed_out("connect"))??;
        let (reader, mut writer) = stream.into_split();

        write_command(&mut writer, command).await?;
        let mut reader = BufReader::new(reader);
        tokio::time::timeout(self.response_timeout, read_line(&mut reader))
            .await
            .map_err(|_| timed_out("response"))?
    }

    /// Send a command and parse the response object
    pub async fn send(&self, command: &str) -> Result<serde_json::Value, ProtocolError> {
        let line = self.send_line(command).await?;
        Ok(serde_json::from_str(&line)?)
    }
}

fn timed_out(what: &str) -> ProtocolError {
    ProtocolError::Io(std::io::Error::new(
        ErrorKind::TimedOut,
        format!("Timed out waiting for {}", what),
    ))
}
