//! Method calls on named workers over a ZeroMQ request/reply transport.
//!
//! A caller connects an [`RpcClient`] to a broker endpoint, takes a
//! [`WorkerProxy`] for a worker name and issues blocking calls with named
//! arguments. The serving side is an [`RpcRouter`] that hosts workers and
//! dispatches each call to the registered method.

pub mod client;
pub mod connection;
pub mod endpoint;
pub mod error;
pub mod path;
pub mod protocol;
pub mod server;

pub use client::{ClientState, Reply, RpcClient, RpcClientConfig, WorkerProxy};
pub use endpoint::{DEFAULT_ENDPOINT, Endpoint};
pub use error::{MethodError, RpcClientError, RpcServerError};
pub use path::CallPath;
pub use protocol::{Arguments, ReplyStatus, Value};
pub use server::{BoundRouter, RpcRouter, RpcRouterConfig};
