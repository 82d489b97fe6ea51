//! Constants used throughout the uixd binary

/// Time allowed to establish a client connection, in milliseconds
pub const DEFAULT_CONNECT_TIMEOUT_MS: u64 = 2_000;

/// Time `send` waits for a response, in milliseconds.
///
/// Generous because `WAIT_*` commands legitimately block for their own
/// timeout before answering.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 60_000;

/// Time the server gives a client to deliver its command line, in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 30_000;
