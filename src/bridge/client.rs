//! # Request/response client for bridge endpoints.

use std::path::Path;

use futures::{SinkExt, StreamExt};
use tokio::net::UnixStream;

use super::codec::{self, DEFAULT_MAX_FRAME, FramedStream};
use super::value::Value;
use crate::error::BridgeError;

/// Connection to one external processor endpoint.
pub struct BridgeClient {
    framed: FramedStream,
}

impl BridgeClient {
    /// Connects to the endpoint at `path`.
    pub async fn connect(path: impl AsRef<Path>) -> Result<Self, BridgeError> {
        Self::connect_with_max_frame(path, DEFAULT_MAX_FRAME).await
    }

    /// Connects with an explicit frame size limit.
    pub async fn connect_with_max_frame(
        path: impl AsRef<Path>,
        max_frame: usize,
    ) -> Result<Self, BridgeError> {
        codec::ensure_available()?;
        let stream = UnixStream::connect(path).await?;
        Ok(Self {
            framed: codec::framed(stream, max_frame),
        })
    }

    /// Sends one request and waits for its reply.
    ///
    /// Processor failures come back as `Ok(Value::Error(..))`.
    pub async fn call(&mut self, request: &Value) -> Result<Value, BridgeError> {
        self.framed.send(codec::encode(request)?).await?;
        match self.framed.next().await {
            Some(Ok(frame)) => codec::decode(&frame),
            Some(Err(e)) => Err(e.into()),
            None => Err(BridgeError::Closed),
        }
    }
}
