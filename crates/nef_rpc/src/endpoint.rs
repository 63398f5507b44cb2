use std::fmt;
use std::str::FromStr;
use url::Url;

use crate::error::EndpointError;

/// Broker address used when none is configured.
pub const DEFAULT_ENDPOINT: &str = "tcp://127.0.0.1:5557";

/// A validated transport address, e.g. `tcp://127.0.0.1:5557` or
/// `ipc:///tmp/nef.sock`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    transport: Transport,
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Transport {
    Tcp { host: String, port: u16 },
    Ipc { path: String },
}

impl Endpoint {
    pub fn parse(endpoint: &str) -> Result<Self, EndpointError> {
        let endpoint = endpoint.trim();
        let invalid = |reason: &str| EndpointError::Invalid {
            endpoint: endpoint.to_owned(),
            reason: reason.to_owned(),
        };

        let url = Url::parse(endpoint).map_err(|e| invalid(&e.to_string()))?;

        let transport = match url.scheme() {
            "tcp" => {
                let host = url
                    .host_str()
                    .filter(|h| !h.is_empty())
                    .ok_or_else(|| invalid("missing host"))?;
                let port = url.port().ok_or_else(|| invalid("missing port"))?;
                Transport::Tcp {
                    host: host.to_owned(),
                    port,
                }
            }
            "ipc" => {
                let path = url.path();
                if path.is_empty() || path == "/" {
                    return Err(invalid("missing socket path"));
                }
                Transport::Ipc {
                    path: path.to_owned(),
                }
            }
            other => return Err(EndpointError::UnsupportedScheme(other.to_owned())),
        };

        Ok(Endpoint { transport })
    }

    pub fn is_tcp(&self) -> bool {
        matches!(self.transport, Transport::Tcp { .. })
    }

    /// Port of a tcp endpoint; `None` for ipc.
    pub fn port(&self) -> Option<u16> {
        match &self.transport {
            Transport::Tcp { port, .. } => Some(*port),
            Transport::Ipc { .. } => None,
        }
    }
}

impl Default for Endpoint {
    fn default() -> Self {
        Endpoint {
            transport: Transport::Tcp {
                host: "127.0.0.1".to_owned(),
                port: 5557,
            },
        }
    }
}

impl fmt::Display for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.transport {
            Transport::Tcp { host, port } => write!(f, "tcp://{host}:{port}"),
            Transport::Ipc { path } => write!(f, "ipc://{path}"),
        }
    }
}

impl FromStr for Endpoint {
    type Err = EndpointError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Endpoint::parse(s)
    }
}
