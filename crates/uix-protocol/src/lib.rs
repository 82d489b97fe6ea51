//! Common protocol definitions for uix
//!
//! This crate defines the UI tree model and the line-oriented wire protocol
//! shared by the device-side command server and its clients: one command line
//! in, one JSON object line out, one command per connection.

use std::net::{IpAddr, Ipv4Addr};
use thiserror::Error;
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncReadExt, AsyncWrite, AsyncWriteExt};

mod command;
mod node;
mod response;

pub use command::{
    Command, DEFAULT_SWIPE_DURATION_MS, DEFAULT_TAP_DURATION_MS, DEFAULT_WAIT_TIMEOUT_MS,
    GlobalAction, Request, SET_TEXT_ID_USAGE, SWIPE_USAGE, WAIT_ID_USAGE, WAIT_TEXT_USAGE,
};
pub use node::{Bounds, Point, UiNode};
pub use response::{CommandError, Response};

/// Default TCP port of the command server
pub const DEFAULT_PORT: u16 = 9001;

/// Default bind address (loopback only)
pub const DEFAULT_BIND_ADDR: IpAddr = IpAddr::V4(Ipv4Addr::LOCALHOST);

/// Maximum length of a command line in bytes (64 KiB)
pub const MAX_LINE_SIZE: usize = 64 * 1024;

/// Protocol errors
#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("Line too long: more than {0} bytes")]
    LineTooLong(usize),
}

/// Read one newline-terminated line.
///
/// The terminator (`\n` or `\r\n`) is stripped. A final line without a
/// terminator is accepted when the peer closes the stream after it. Invalid
/// UTF-8 is replaced rather than rejected.
pub async fn read_line<R: AsyncBufRead + Unpin>(reader: &mut R) -> Result<String, ProtocolError> {
    let mut buf = Vec::new();
    let read = reader
        .take(MAX_LINE_SIZE as u64 + 1)
        .read_until(b'\n', &mut buf)
        .await?;
    if read == 0 {
        return Err(ProtocolError::ConnectionClosed);
    }

    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    } else if buf.len() > MAX_LINE_SIZE {
        return Err(ProtocolError::LineTooLong(MAX_LINE_SIZE));
    }

    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write one line followed by `\n` and flush
pub async fn write_line<W: AsyncWrite + Unpin>(
    writer: &mut W,
    line: &str,
) -> Result<(), ProtocolError> {
    writer.write_all(line.as_bytes()).await?;
    writer.write_all(b"\n").await?;
    writer.flush().await?;
    Ok(())
}

/// Serialize and write a response line
pub async fn write_response<W: AsyncWrite + Unpin>(
    writer: &mut W,
    response: &Response,
) -> Result<(), ProtocolError> {
    let data = response.to_json()?;
    write_line(writer, &data).await
}

/// Write a command line (client side)
pub async fn write_command<W: AsyncWrite + Unpin>(
    writer: &mut W,
    command: &str,
) -> Result<(), ProtocolError> {
    write_line(writer, command.trim_end_matches(['\r', '\n'])).await
}

/// Read and parse a response line (client side)
pub async fn read_response<R: AsyncBufRead + Unpin>(
    reader: &mut R,
) -> Result<serde_json::Value, ProtocolError> {
    let line = read_line(reader).await?;
    let value = serde_json::from_str(&line)?;
    Ok(value)
}
