use crate::client::reply::Reply;
use crate::client::rpc_client::RpcClient;
use crate::error::RpcClientError;
use crate::protocol::Arguments;

/// A handle bound to one worker name.
///
/// Creating a proxy performs no I/O; every call goes through the owning
/// client's connection.
#[derive(Clone)]
pub struct WorkerProxy<'a> {
    client: &'a RpcClient,
    name: String,
}

impl<'a> WorkerProxy<'a> {
    pub(crate) fn new(client: &'a RpcClient, name: String) -> Self {
        Self { client, name }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Call `method` on this worker with named arguments.
    pub fn call(&self, method: &str, arguments: Arguments) -> Result<Reply, RpcClientError> {
        self.client.call(&self.name, method, arguments)
    }

    /// Call `method` with no arguments.
    pub fn call0(&self, method: &str) -> Result<Reply, RpcClientError> {
        self.call(method, Arguments::new())
    }
}

impl std::fmt::Debug for WorkerProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WorkerProxy")
            .field("name", &self.name)
            .field("endpoint", &self.client.endpoint().to_string())
            .finish()
    }
}
