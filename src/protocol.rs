//! Dispatch wire protocol
//!
//! Workers hold one persistent TCP connection to the dispatcher and exchange
//! plain string payloads over it:
//!
//! ```text
//! Worker                          Dispatcher
//!   |--------- request ------------->|   any non-empty bytes; the literal
//!   |                                |   "quit" closes this session
//!   |<-------- response -------------|   a script path, "wait", or "quit"
//! ```
//!
//! # Message Framing
//!
//! Each message is prefixed with a 4-byte length field (little-endian u32):
//!
//! ```text
//! [4 bytes: payload length][N bytes: UTF-8 payload]
//! ```
//!
//! The source protocol this replaces relied on a fixed-size receive buffer
//! with no framing, which silently truncates long script paths. Explicit
//! framing removes that defect without changing the request/response
//! semantics.

use anyhow::{Context, Result};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};

/// Maximum frame payload size
///
/// Bounds the longest script path a response can carry; anything larger is a
/// protocol error, not a truncation.
pub const MAX_FRAME_LEN: usize = 4096;

/// Request payload a session closes on
pub const TOKEN_QUIT: &str = "quit";

/// Request token workers send; the dispatcher ignores its content
pub const TOKEN_NEXT: &str = "next";

/// Response payload for an empty queue
pub const TOKEN_WAIT: &str = "wait";

/// Dispatcher response as seen by a worker
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Response {
    /// Path of a script to execute
    Item(String),
    /// Queue is currently empty; ask again later
    Wait,
    /// Terminate this worker
    Quit,
}

impl Response {
    /// Parse a frame payload into a response
    ///
    /// Only the literals "wait" and "quit" are distinguished; everything else
    /// is a script path.
    pub fn parse(payload: &[u8]) -> Result<Self> {
        let text = std::str::from_utf8(payload).context("Response payload is not valid UTF-8")?;
        Ok(match text {
            TOKEN_WAIT => Response::Wait,
            TOKEN_QUIT => Response::Quit,
            path => Response::Item(path.to_string()),
        })
    }

    /// Wire payload for this response
    pub fn payload(&self) -> &str {
        match self {
            Response::Item(path) => path,
            Response::Wait => TOKEN_WAIT,
            Response::Quit => TOKEN_QUIT,
        }
    }
}

/// Read one framed message from a stream
///
/// Reads the length prefix, then the complete payload. Zero-length and
/// oversized frames are rejected.
pub async fn read_frame(stream: &mut (impl AsyncRead + Unpin)) -> Result<Vec<u8>> {
    let mut len_buf = [0u8; 4];
    stream
        .read_exact(&mut len_buf)
        .await
        .context("Failed to read frame length")?;

    let len = u32::from_le_bytes(len_buf) as usize;
    if len == 0 {
        anyhow::bail!("Empty frame");
    }
    if len > MAX_FRAME_LEN {
        anyhow::bail!("Frame too large: {} bytes (max {})", len, MAX_FRAME_LEN);
    }

    let mut payload = vec![0u8; len];
    stream
        .read_exact(&mut payload)
        .await
        .context("Failed to read frame payload")?;

    Ok(payload)
}

/// Write one framed message to a stream
pub async fn write_frame(stream: &mut (impl AsyncWrite + Unpin), payload: &[u8]) -> Result<()> {
    if payload.is_empty() {
        anyhow::bail!("Refusing to send empty frame");
    }
    if payload.len() > MAX_FRAME_LEN {
        anyhow::bail!(
            "Frame too large: {} bytes (max {})",
            payload.len(),
            MAX_FRAME_LEN
        );
    }

    let len = payload.len() as u32;
    let mut framed = Vec::with_capacity(4 + payload.len());
    framed.extend_from_slice(&len.to_le_bytes());
    framed.extend_from_slice(payload);

    stream
        .write_all(&framed)
        .await
        .context("Failed to write frame")?;
    stream.flush().await.context("Failed to flush stream")?;

    Ok(())
}
