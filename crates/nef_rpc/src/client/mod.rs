//! Client-side types for nef_rpc.
//!
//! This module contains the blocking `RpcClient` and the `WorkerProxy`
//! handle used to call methods on named workers.
//!
//! # Example
//!
//! ```ignore
//! use nef_rpc::client::{RpcClient, RpcClientConfig};
//! use nef_rpc::{Arguments, Endpoint};
//! use std::time::Duration;
//!
//! let endpoint: Endpoint = "tcp://127.0.0.1:5557".parse()?;
//! let config = RpcClientConfig::new().with_timeout(Duration::from_secs(10));
//! let client = RpcClient::connect_with(endpoint, config)?;
//!
//! let sysconfig = client.worker("sysconfig");
//! let text = sysconfig.call0("exportConfiguration")?.into_text()?;
//! sysconfig.call(
//!     "importConfiguration",
//!     Arguments::new().with("configuration", text),
//! )?;
//! ```

mod config;
mod reply;
mod rpc_client;
mod worker;

pub use config::RpcClientConfig;
pub use reply::Reply;
pub use rpc_client::{ClientState, RpcClient};
pub use worker::WorkerProxy;
