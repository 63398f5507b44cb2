use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::{Mutex, PoisonError, TryLockError};
use std::time::Duration;
use tokio::runtime::{Builder, Runtime};
use tokio::time::{Instant, MissedTickBehavior, interval_at, timeout, timeout_at};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zeromq::{DealerSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::client::config::RpcClientConfig;
use crate::client::reply::Reply;
use crate::client::worker::WorkerProxy;
use crate::endpoint::Endpoint;
use crate::error::RpcClientError;
use crate::protocol::{Arguments, CallReply, CallRequest, ReplyStatus, decode_frame, encode_frame};

/// Observable lifecycle of a connected client.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClientState {
    /// Connected and idle; a call may be issued.
    Connected,
    /// A call has been sent and its reply is outstanding.
    AwaitingReply,
    /// The socket has been released.
    Closed,
}

/// A blocking client for calling methods on named workers.
///
/// The client owns a DEALER socket connected to the broker and a private
/// single-threaded runtime that drives it. Only one call may be outstanding
/// at a time; a second call issued while the first is awaiting its reply
/// fails with [`RpcClientError::CallInProgress`].
///
/// The socket is released by [`RpcClient::close`] or when the client is
/// dropped. Must not be used from within an async context.
pub struct RpcClient {
    endpoint: Endpoint,
    config: RpcClientConfig,
    socket: Mutex<Option<DealerSocket>>,
    runtime: Runtime,
}

impl RpcClient {
    /// Connect to the broker with the default configuration.
    pub fn connect(endpoint: Endpoint) -> Result<Self, RpcClientError> {
        Self::connect_with(endpoint, RpcClientConfig::default())
    }

    /// Connect to the broker.
    ///
    /// Fails with [`RpcClientError::Connection`] if the transport cannot be
    /// reached within `config.connect_timeout`. No retry is attempted.
    pub fn connect_with(
        endpoint: Endpoint,
        config: RpcClientConfig,
    ) -> Result<Self, RpcClientError> {
        let runtime = Builder::new_current_thread()
            .enable_all()
            .build()
            .map_err(RpcClientError::Runtime)?;

        let address = endpoint.to_string();
        debug!(endpoint = %address, "Connecting to broker");

        let socket = runtime.block_on(async {
            let mut socket = DealerSocket::new();
            match timeout(config.connect_timeout, socket.connect(&address)).await {
                Ok(Ok(())) => Ok(socket),
                Ok(Err(e)) => Err(RpcClientError::Connection {
                    endpoint: address.clone(),
                    reason: e.to_string(),
                }),
                Err(_) => Err(RpcClientError::Connection {
                    endpoint: address.clone(),
                    reason: format!(
                        "no connection within {} ms (is the broker running?)",
                        config.connect_timeout.as_millis()
                    ),
                }),
            }
        })?;

        info!(endpoint = %address, "Connected to broker");

        Ok(Self {
            endpoint,
            config,
            socket: Mutex::new(Some(socket)),
            runtime,
        })
    }

    /// Get a handle bound to the worker `name`. No I/O happens here.
    pub fn worker(&self, name: impl Into<String>) -> WorkerProxy<'_> {
        WorkerProxy::new(self, name.into())
    }

    /// Call `method` on `worker` and block until its reply arrives.
    ///
    /// Exactly one request is sent and exactly one matching reply consumed.
    /// Replies carrying another call's id (late answers to calls that timed
    /// out earlier) are discarded. If the broker connection drops while the
    /// reply is outstanding the call fails with
    /// [`RpcClientError::Disconnected`].
    pub fn call(
        &self,
        worker: &str,
        method: &str,
        arguments: Arguments,
    ) -> Result<Reply, RpcClientError> {
        let mut guard = match self.socket.try_lock() {
            Ok(guard) => guard,
            Err(TryLockError::WouldBlock) => return Err(RpcClientError::CallInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner(),
        };
        let socket = guard.as_mut().ok_or(RpcClientError::Closed)?;

        let request = CallRequest::new(Uuid::new_v4().to_string(), worker, method, arguments);
        let path = format!("{worker}/{method}");
        let endpoint = self.endpoint.to_string();

        // The DEALER panics on a read error from its peer.
        let exchange = exchange(socket, &request, &path, &endpoint, &self.config);
        match self.runtime.block_on(AssertUnwindSafe(exchange).catch_unwind()) {
            Ok(result) => result,
            Err(_) => {
                warn!(call_id = %request.id, path = %path, "Socket failed while awaiting reply");
                Err(RpcClientError::Disconnected { endpoint, path })
            }
        }
    }

    /// Current lifecycle state.
    pub fn state(&self) -> ClientState {
        match self.socket.try_lock() {
            Ok(guard) if guard.is_some() => ClientState::Connected,
            Ok(_) => ClientState::Closed,
            Err(TryLockError::WouldBlock) => ClientState::AwaitingReply,
            Err(TryLockError::Poisoned(poisoned)) => {
                if poisoned.into_inner().is_some() {
                    ClientState::Connected
                } else {
                    ClientState::Closed
                }
            }
        }
    }

    /// Release the socket. Calling it again is a no-op.
    pub fn close(&self) -> Result<(), RpcClientError> {
        let socket = match self.socket.try_lock() {
            Ok(mut guard) => guard.take(),
            Err(TryLockError::WouldBlock) => return Err(RpcClientError::CallInProgress),
            Err(TryLockError::Poisoned(poisoned)) => poisoned.into_inner().take(),
        };
        self.release(socket);
        Ok(())
    }

    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    pub fn config(&self) -> &RpcClientConfig {
        &self.config
    }

    fn release(&self, socket: Option<DealerSocket>) {
        let Some(socket) = socket else {
            return;
        };
        let errors = self.runtime.block_on(socket.close());
        for error in errors {
            warn!(endpoint = %self.endpoint, %error, "Error while closing socket");
        }
        debug!(endpoint = %self.endpoint, "Socket released");
    }
}

impl Drop for RpcClient {
    fn drop(&mut self) {
        let socket = self
            .socket
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        self.release(socket);
    }
}

enum Waiting {
    Received(Result<Result<ZmqMessage, zeromq::ZmqError>, tokio::time::error::Elapsed>),
    Heartbeat,
}

/// One request/reply round trip bounded by `config.timeout`.
///
/// While the reply is outstanding a heartbeat goes out every
/// `config.heartbeat_interval`; the DEALER only reports a lost peer when a
/// send to it fails.
async fn exchange(
    socket: &mut DealerSocket,
    request: &CallRequest,
    path: &str,
    endpoint: &str,
    config: &RpcClientConfig,
) -> Result<Reply, RpcClientError> {
    let deadline = Instant::now() + config.timeout;
    let timed_out = || RpcClientError::Timeout {
        path: path.to_owned(),
        millis: config.timeout.as_millis(),
    };
    let disconnected = || RpcClientError::Disconnected {
        endpoint: endpoint.to_owned(),
        path: path.to_owned(),
    };

    debug!(call_id = %request.id, path, args = request.arguments.len(), "Sending request");

    let frame = ZmqMessage::from(encode_frame(request));
    timeout_at(deadline, socket.send(frame))
        .await
        .map_err(|_| timed_out())?
        .map_err(RpcClientError::Transport)?;

    let heartbeat = encode_frame(&CallRequest::new_heartbeat(&request.id));
    let period = config.heartbeat_interval.max(Duration::from_millis(1));
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

    loop {
        let waiting = tokio::select! {
            received = timeout_at(deadline, socket.recv()) => Waiting::Received(received),
            _ = ticker.tick() => Waiting::Heartbeat,
        };

        let message = match waiting {
            Waiting::Received(received) => received
                .map_err(|_| {
                    warn!(call_id = %request.id, path, "Timed out waiting for reply");
                    timed_out()
                })?
                .map_err(RpcClientError::Transport)?,
            Waiting::Heartbeat => {
                let beat = ZmqMessage::from(heartbeat.clone());
                match timeout_at(deadline, socket.send(beat)).await {
                    Ok(Ok(())) => {}
                    Ok(Err(e)) => {
                        warn!(call_id = %request.id, path, error = %e, "Broker connection lost");
                        return Err(disconnected());
                    }
                    Err(_) => return Err(timed_out()),
                }
                continue;
            }
        };

        let Some(frame) = message.get(0) else {
            warn!(call_id = %request.id, "Discarding empty reply message");
            continue;
        };

        let reply: CallReply = decode_frame(frame)?;
        // Rejections of undecodable requests carry no id; with a single
        // outstanding call they can only be ours.
        let uncorrelated_failure = reply.id.is_empty() && reply.status != ReplyStatus::Ok as i32;
        if reply.id != request.id && !uncorrelated_failure {
            debug!(
                call_id = %request.id,
                stale_id = %reply.id,
                "Discarding reply to an earlier call"
            );
            continue;
        }

        debug!(call_id = %request.id, path, status = reply.status, "Received reply");
        return Reply::from_wire(reply);
    }
}
