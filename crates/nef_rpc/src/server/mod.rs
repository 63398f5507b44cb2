//! Serving side: hosts named workers behind a ROUTER socket.

mod config;
mod handler;
mod router;

pub use config::RpcRouterConfig;
pub use handler::{MethodFn, MethodFuture, make_method};
pub use router::{BoundRouter, RpcRouter};
