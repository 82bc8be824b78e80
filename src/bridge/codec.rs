//! # Bridge wire format.
//!
//! ```text
//! ┌──────────────────────┬─────────────────────────────────┐
//! │ length: u32 (BE)     │ payload: postcard(Value)        │
//! └──────────────────────┴─────────────────────────────────┘
//! ```
//!
//! Requests and responses use the same encoding. Serialization is the
//! optional `bridge` capability; without it every call returns
//! [`DependencyError::Unavailable`] with the remediation text.

use bytes::Bytes;
#[cfg(unix)]
use tokio::net::UnixStream;
#[cfg(unix)]
use tokio_util::codec::Framed;
use tokio_util::codec::LengthDelimitedCodec;

use super::value::Value;
use crate::error::{BridgeError, DependencyError};

/// Default upper bound for one frame (8 MiB).
pub const DEFAULT_MAX_FRAME: usize = 8 * 1024 * 1024;

/// Length-prefixed framing over a local socket.
#[cfg(unix)]
pub type FramedStream = Framed<UnixStream, LengthDelimitedCodec>;

fn unavailable() -> DependencyError {
    DependencyError::Unavailable {
        capability: "bridge serialization (postcard)",
        remedy: "rebuild with the `bridge` feature enabled to use external processors",
    }
}

/// Fails when the serialization capability is not compiled in.
pub fn ensure_available() -> Result<(), DependencyError> {
    if cfg!(feature = "bridge") {
        Ok(())
    } else {
        Err(unavailable())
    }
}

/// Encodes one payload.
#[cfg(feature = "bridge")]
pub fn encode(value: &Value) -> Result<Bytes, BridgeError> {
    postcard::to_allocvec(value)
        .map(Bytes::from)
        .map_err(|e| BridgeError::Encode {
            reason: e.to_string(),
        })
}

/// Encodes one payload.
#[cfg(not(feature = "bridge"))]
pub fn encode(_value: &Value) -> Result<Bytes, BridgeError> {
    Err(unavailable().into())
}

/// Decodes one payload.
#[cfg(feature = "bridge")]
pub fn decode(bytes: &[u8]) -> Result<Value, BridgeError> {
    postcard::from_bytes(bytes).map_err(|e| BridgeError::Decode {
        reason: e.to_string(),
    })
}

/// Decodes one payload.
#[cfg(not(feature = "bridge"))]
pub fn decode(_bytes: &[u8]) -> Result<Value, BridgeError> {
    Err(unavailable().into())
}

/// Length-delimited codec with a 4-byte big-endian prefix.
pub fn codec(max_frame: usize) -> LengthDelimitedCodec {
    LengthDelimitedCodec::builder()
        .length_field_length(4)
        .big_endian()
        .max_frame_length(max_frame.max(1))
        .new_codec()
}

/// Wraps a connected socket into a framed stream.
#[cfg(unix)]
pub fn framed(stream: UnixStream, max_frame: usize) -> FramedStream {
    Framed::new(stream, codec(max_frame))
}
