use thiserror::Error;

use crate::protocol::ReplyStatus;

/// Errors that can occur while parsing a broker endpoint.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum EndpointError {
    #[error("invalid endpoint '{endpoint}': {reason}")]
    Invalid { endpoint: String, reason: String },

    #[error("unsupported endpoint scheme '{0}' (expected tcp or ipc)")]
    UnsupportedScheme(String),
}

/// Errors that can occur while building a `worker/method` call path.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum CallPathError {
    #[error("invalid call path: {0}")]
    Invalid(String),
}

/// Errors surfaced by the blocking RPC client.
///
/// The variants keep remote-application failures apart from transport
/// failures so callers can tell them apart without parsing messages.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcClientError {
    /// The broker endpoint could not be reached.
    #[error("cannot connect to {endpoint}: {reason}")]
    Connection { endpoint: String, reason: String },

    /// The worker host answered with an error status.
    #[error("remote error ({status:?}): {message}")]
    Remote { status: ReplyStatus, message: String },

    /// No matching reply arrived within the configured bound.
    #[error("no reply from {path} within {millis} ms")]
    Timeout { path: String, millis: u128 },

    /// The socket failed while a call was in flight.
    #[error("transport error: {0}")]
    Transport(#[source] zeromq::ZmqError),

    /// The broker connection dropped before the reply arrived.
    #[error("connection to {endpoint} lost while calling {path}")]
    Disconnected { endpoint: String, path: String },

    /// The reply frame was not a valid envelope.
    #[error("failed to decode reply: {0}")]
    Decode(#[from] prost::DecodeError),

    /// The reply carried a payload of a different kind than requested.
    #[error("unexpected reply payload: expected {expected}, got {actual}")]
    UnexpectedPayload {
        expected: &'static str,
        actual: &'static str,
    },

    /// Another call on this client is still awaiting its reply.
    #[error("a call is already awaiting its reply on this client")]
    CallInProgress,

    /// The client has been closed.
    #[error("RPC client closed")]
    Closed,

    /// The client's private runtime could not be started.
    #[error("failed to start client runtime: {0}")]
    Runtime(#[source] std::io::Error),
}

/// Errors that can occur while running the worker host.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcServerError {
    /// Failed to bind the listening socket.
    #[error("failed to bind {endpoint}: {source}")]
    Bind {
        endpoint: String,
        #[source]
        source: zeromq::ZmqError,
    },

    /// The listening socket failed while serving.
    #[error("transport error: {0}")]
    Transport(#[from] zeromq::ZmqError),

    /// A handler is already registered for this worker and method.
    #[error("handler already registered for '{0}'")]
    DuplicateHandler(String),

    #[error(transparent)]
    Path(#[from] CallPathError),
}

/// An application-level failure raised by a worker method.
///
/// The message travels back to the caller inside an `Application` reply.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct MethodError {
    message: String,
}

impl MethodError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn missing_argument(name: &str) -> Self {
        Self::new(format!("missing required argument '{name}'"))
    }

    pub fn invalid_argument(name: &str, expected: &str) -> Self {
        Self::new(format!("argument '{name}' must be {expected}"))
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Errors that can occur on the wire after a request has been read.
///
/// Each variant maps onto the `ReplyStatus` carried back to the caller.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RpcWireError {
    /// No worker with this name is hosted here.
    #[error("unknown worker '{0}'")]
    NoWorker(String),

    /// The worker exists but has no such method.
    #[error("worker '{worker}' has no method '{method}'")]
    NoMethod { worker: String, method: String },

    /// The request frame could not be decoded.
    #[error("failed to decode request")]
    Decode,

    /// The method itself failed.
    #[error(transparent)]
    Application(#[from] MethodError),

    /// Internal host failure while handling the request.
    #[error("internal error: {0}")]
    Internal(String),
}

impl RpcWireError {
    pub fn status(&self) -> ReplyStatus {
        match self {
            RpcWireError::NoWorker(_) => ReplyStatus::NoWorker,
            RpcWireError::NoMethod { .. } => ReplyStatus::NoMethod,
            RpcWireError::Decode => ReplyStatus::Decode,
            RpcWireError::Application(_) => ReplyStatus::Application,
            RpcWireError::Internal(_) => ReplyStatus::Internal,
        }
    }
}
