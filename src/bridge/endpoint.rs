//! # External processor endpoints and their worker pool.
//!
//! Each `(component, key, function)` gets one local socket at
//! `{dir}/{component}_{key}_{function}.socket`, served by one pooled worker:
//!
//! ```text
//! loop {
//!   accept (cancellable; errors retried with BackoffPolicy)
//!   ├─► BridgeConnected
//!   ├─► loop { recv frame → decode → processor (blocking pool) → encode → send }
//!   │     ├─ EOF             → BridgeDisconnected, accept next peer
//!   │     ├─ bad payload     → reply Value::Error, keep the connection
//!   │     ├─ empty frame     → reply Value::Error("empty payload")
//!   │     └─ frame/io error  → BridgeError, accept next peer
//!   └─ token cancelled while idle → exit, remove socket file
//! }
//! ```
//!
//! A request already being processed is never interrupted; cancellation is
//! observed between requests.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use futures::{SinkExt, StreamExt};
use tokio::net::{UnixListener, UnixStream};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::codec;
use super::processor::Processor;
use super::value::Value;
use crate::error::BridgeError;
use crate::policies::BackoffPolicy;
use crate::signals::{Bus, Signal, SignalKind};

/// Error text answered to an empty request frame.
const EMPTY_PAYLOAD: &str = "empty payload";

/// Socket path for one `(component, key, function)`.
pub fn endpoint_address(dir: &Path, component: &str, key: &str, function: &str) -> PathBuf {
    dir.join(format!("{component}_{key}_{function}.socket"))
}

/// Everything needed to bind one endpoint.
#[derive(Clone, Debug)]
pub struct EndpointSpec {
    /// Owning component.
    pub component: String,
    /// Logical key grouping processors.
    pub key: String,
    /// Function served.
    pub processor: Processor,
    /// Socket directory.
    pub dir: PathBuf,
    /// Largest accepted frame.
    pub max_frame: usize,
    /// Delay policy for accept retries.
    pub backoff: BackoffPolicy,
}

/// A bound endpoint. Dropping it removes the socket file.
pub struct Endpoint {
    component: Arc<str>,
    address: PathBuf,
    label: Arc<str>,
    processor: Processor,
    listener: UnixListener,
    max_frame: usize,
    backoff: BackoffPolicy,
    bus: Bus,
}

impl Endpoint {
    /// Removes a stale socket at the address, then binds.
    ///
    /// Must be called inside a tokio runtime.
    pub fn bind(spec: EndpointSpec, bus: Bus) -> Result<Self, BridgeError> {
        let address = endpoint_address(
            &spec.dir,
            &spec.component,
            &spec.key,
            spec.processor.name(),
        );
        remove_stale(&address)?;
        let listener = UnixListener::bind(&address)?;
        let label: Arc<str> = Arc::from(address.display().to_string());

        info!(
            component = %spec.component,
            socket_path = %label,
            "bridge endpoint listening"
        );
        bus.publish(
            Signal::new(SignalKind::BridgeListening)
                .with_component(spec.component.as_str())
                .with_address(Arc::clone(&label)),
        );

        Ok(Self {
            component: Arc::from(spec.component),
            address,
            label,
            processor: spec.processor,
            listener,
            max_frame: spec.max_frame,
            backoff: spec.backoff,
            bus,
        })
    }

    /// Socket path.
    pub fn address(&self) -> &Path {
        &self.address
    }

    /// Serves peers one at a time until `token` is cancelled.
    pub async fn serve(self, token: CancellationToken) {
        let mut failures: u32 = 0;
        loop {
            let accepted = tokio::select! {
                _ = token.cancelled() => break,
                res = self.listener.accept() => res,
            };

            let stream = match accepted {
                Ok((stream, _addr)) => {
                    failures = 0;
                    stream
                }
                Err(e) => {
                    self.publish_error(&e.to_string());
                    let delay = self.backoff.next(failures);
                    failures = failures.saturating_add(1);
                    tokio::select! {
                        _ = token.cancelled() => break,
                        _ = tokio::time::sleep(delay) => continue,
                    }
                }
            };

            self.publish(SignalKind::BridgeConnected);
            self.handle_connection(stream, &token).await;
            if token.is_cancelled() {
                break;
            }
            self.publish(SignalKind::BridgeDisconnected);
        }
        debug!(socket_path = %self.label, "bridge endpoint stopped");
    }

    async fn handle_connection(&self, stream: UnixStream, token: &CancellationToken) {
        let mut framed = codec::framed(stream, self.max_frame);
        loop {
            let frame = tokio::select! {
                _ = token.cancelled() => return,
                frame = framed.next() => frame,
            };
            let bytes = match frame {
                None => return,
                Some(Err(e)) => {
                    self.publish_error(&e.to_string());
                    return;
                }
                Some(Ok(bytes)) => bytes,
            };

            let reply = if bytes.is_empty() {
                debug!(socket_path = %self.label, "empty frame received");
                Value::Error(EMPTY_PAYLOAD.to_string())
            } else {
                match codec::decode(&bytes) {
                    Ok(input) => self.process(input).await,
                    Err(e) => {
                        self.publish_error(&e.to_string());
                        Value::Error(e.to_string())
                    }
                }
            };

            let out = match codec::encode(&reply) {
                Ok(out) => out,
                Err(e) => {
                    self.publish_error(&e.to_string());
                    match codec::encode(&Value::Error(e.to_string())) {
                        Ok(out) => out,
                        Err(_) => return,
                    }
                }
            };
            if let Err(e) = framed.send(out).await {
                self.publish_error(&e.to_string());
                return;
            }
        }
    }

    async fn process(&self, input: Value) -> Value {
        let processor = self.processor.clone();
        match tokio::task::spawn_blocking(move || processor.call(input)).await {
            Ok(output) => output,
            Err(e) => {
                let reason = format!("processor '{}' panicked: {e}", self.processor.name());
                self.publish_error(&reason);
                Value::Error(reason)
            }
        }
    }

    fn publish(&self, kind: SignalKind) {
        self.bus.publish(
            Signal::new(kind)
                .with_component(Arc::clone(&self.component))
                .with_address(Arc::clone(&self.label)),
        );
    }

    fn publish_error(&self, reason: &str) {
        warn!(socket_path = %self.label, error = %reason, "bridge endpoint error");
        self.bus.publish(
            Signal::new(SignalKind::BridgeError)
                .with_component(Arc::clone(&self.component))
                .with_address(Arc::clone(&self.label))
                .with_reason(reason),
        );
    }
}

impl Drop for Endpoint {
    fn drop(&mut self) {
        match std::fs::remove_file(&self.address) {
            Ok(()) => {}
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(socket_path = %self.label, "failed to remove socket file: {e}"),
        }
    }
}

fn remove_stale(path: &Path) -> Result<(), BridgeError> {
    match std::fs::remove_file(path) {
        Ok(()) => {
            debug!(path = %path.display(), "removed stale socket file");
            Ok(())
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(BridgeError::Io(io::Error::new(
            e.kind(),
            format!("failed to remove stale socket {}: {e}", path.display()),
        ))),
    }
}

/// Pool of endpoint workers sharing one cancellation token.
///
/// With a limit, at most that many endpoints serve at once; the others wait
/// for a free slot.
pub struct BridgePool {
    workers: JoinSet<()>,
    token: CancellationToken,
    permits: Option<Arc<Semaphore>>,
}

impl BridgePool {
    /// Creates a pool; `limit = None` means unbounded.
    pub fn new(limit: Option<usize>, token: CancellationToken) -> Self {
        Self {
            workers: JoinSet::new(),
            token,
            permits: limit.map(|n| Arc::new(Semaphore::new(n))),
        }
    }

    /// Starts serving `endpoint`.
    pub fn submit(&mut self, endpoint: Endpoint) {
        let token = self.token.child_token();
        let permits = self.permits.clone();
        self.workers.spawn(async move {
            let _permit = match permits {
                Some(sem) => {
                    let acquired = tokio::select! {
                        _ = token.cancelled() => return,
                        p = sem.acquire_owned() => p,
                    };
                    match acquired {
                        Ok(p) => Some(p),
                        Err(_closed) => return,
                    }
                }
                None => None,
            };
            endpoint.serve(token).await;
        });
    }

    /// Number of workers still running.
    pub fn len(&self) -> usize {
        self.workers.len()
    }

    /// True if no worker is running.
    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }

    /// Cancels every worker and waits for them to drain.
    pub async fn shutdown(mut self) {
        self.token.cancel();
        while let Some(res) = self.workers.join_next().await {
            if let Err(e) = res {
                warn!("bridge worker ended abnormally: {e}");
            }
        }
    }
}
