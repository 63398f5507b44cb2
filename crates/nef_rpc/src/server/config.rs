use crate::endpoint::Endpoint;

/// Configuration for the worker host.
#[derive(Debug, Clone, Default)]
pub struct RpcRouterConfig {
    /// Address the ROUTER socket binds to (e.g., "tcp://127.0.0.1:5557").
    /// A tcp port of `0` picks a free port; see `BoundRouter::endpoint`.
    pub bind: Endpoint,
}

impl RpcRouterConfig {
    pub fn new(bind: Endpoint) -> Self {
        Self { bind }
    }
}
