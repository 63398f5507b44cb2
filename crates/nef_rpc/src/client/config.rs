use std::time::Duration;

/// Configuration for the RPC client.
#[derive(Debug, Clone)]
pub struct RpcClientConfig {
    /// Bound on waiting for the reply to a single call.
    pub timeout: Duration,

    /// Bound on establishing the transport connection.
    pub connect_timeout: Duration,

    /// How often a liveness frame is sent while a reply is outstanding.
    ///
    /// A failed heartbeat is how a dropped broker connection is noticed
    /// before `timeout` runs out.
    pub heartbeat_interval: Duration,
}

impl Default for RpcClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(5),
            heartbeat_interval: Duration::from_millis(250),
        }
    }
}

impl RpcClientConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the timeout for waiting for a reply.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set the timeout for connecting to the broker.
    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_heartbeat_interval(mut self, interval: Duration) -> Self {
        self.heartbeat_interval = interval;
        self
    }
}
