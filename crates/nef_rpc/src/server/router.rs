use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use zeromq::{RouterSocket, Socket, SocketRecv, SocketSend, ZmqMessage};

use crate::connection::{RpcInbound, RpcOutbound};
use crate::error::{MethodError, RpcServerError, RpcWireError};
use crate::path::CallPath;
use crate::protocol::{Arguments, CallReply, CallRequest, Value, decode_frame};
use crate::server::config::RpcRouterConfig;
use crate::server::handler::{MethodFn, make_method, spawn_call};

/// worker name -> method name -> method
type WorkerTable = HashMap<String, HashMap<String, MethodFn>>;

/// Hosts named workers and dispatches incoming calls to their methods.
pub struct RpcRouter {
    workers: WorkerTable,
    config: RpcRouterConfig,
}

impl RpcRouter {
    pub fn new(config: RpcRouterConfig) -> Self {
        Self {
            workers: HashMap::new(),
            config,
        }
    }

    /// Register a method on a worker.
    ///
    /// # Example
    /// ```ignore
    /// router.register("sysconfig", "exportConfiguration", move |_args| {
    ///     let store = Arc::clone(&store);
    ///     async move { Ok(Some(Value::text(store.read().await.clone()))) }
    /// })?;
    /// ```
    pub fn register<F, Fut>(
        &mut self,
        worker: &str,
        method: &str,
        handler: F,
    ) -> Result<(), RpcServerError>
    where
        F: Fn(Arguments) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<Option<Value>, MethodError>> + Send + 'static,
    {
        let path = CallPath::new(worker, method)?;
        let methods = self.workers.entry(path.worker.clone()).or_default();
        if methods.contains_key(&path.method) {
            return Err(RpcServerError::DuplicateHandler(path.full_path()));
        }
        methods.insert(path.method.clone(), make_method(handler));

        info!(path = %path, "Registered worker method");
        Ok(())
    }

    /// Check if any method is registered for the given worker.
    pub fn has_worker(&self, worker: &str) -> bool {
        self.workers.contains_key(worker)
    }

    /// Check if a method is registered for the given path.
    pub fn has_handler(&self, path: &CallPath) -> bool {
        self.workers
            .get(&path.worker)
            .is_some_and(|methods| methods.contains_key(&path.method))
    }

    /// Bind the ROUTER socket. Calls are served once [`BoundRouter::run`]
    /// is awaited.
    pub async fn bind(self) -> Result<BoundRouter, RpcServerError> {
        let address = self.config.bind.to_string();
        let mut socket = RouterSocket::new();
        let bound = socket
            .bind(&address)
            .await
            .map_err(|source| RpcServerError::Bind {
                endpoint: address.clone(),
                source,
            })?;
        let endpoint = bound.to_string();

        info!(endpoint = %endpoint, workers = self.workers.len(), "Worker host bound");

        Ok(BoundRouter {
            socket,
            endpoint,
            workers: Arc::new(self.workers),
        })
    }
}

/// A worker host with a bound socket.
pub struct BoundRouter {
    socket: RouterSocket,
    endpoint: String,
    workers: Arc<WorkerTable>,
}

impl BoundRouter {
    /// The address the socket is actually bound to. For a tcp bind on port
    /// `0` this carries the port the OS picked.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Serve calls until the socket fails.
    pub async fn run(self) -> Result<(), RpcServerError> {
        self.run_until(std::future::pending()).await
    }

    /// Serve calls until `shutdown` resolves or the socket fails.
    ///
    /// Each call runs in its own task; replies come back over a channel so
    /// the socket is only ever touched from this loop.
    pub async fn run_until<F>(self, shutdown: F) -> Result<(), RpcServerError>
    where
        F: Future<Output = ()>,
    {
        let BoundRouter {
            mut socket,
            endpoint,
            workers,
        } = self;

        let (tx, mut rx) = mpsc::unbounded_channel();
        let outbound = RpcOutbound::new(tx);
        tokio::pin!(shutdown);

        info!(endpoint = %endpoint, "Worker host serving");

        let result = loop {
            tokio::select! {
                _ = &mut shutdown => {
                    info!(endpoint = %endpoint, "Shutdown requested");
                    break Ok(());
                }

                Some(outgoing) = rx.recv() => {
                    let message: ZmqMessage = outgoing.into_message();
                    if let Err(e) = socket.send(message).await {
                        // The peer may have gone away while its call ran.
                        warn!(error = %e, "Failed to send reply");
                    }
                }

                received = socket.recv() => {
                    match received {
                        Ok(message) => dispatch(&workers, &outbound, message),
                        Err(e) => break Err(RpcServerError::Transport(e)),
                    }
                }
            }
        };

        let errors = socket.close().await;
        for error in errors {
            warn!(%error, "Error while closing socket");
        }
        info!(endpoint = %endpoint, "Worker host stopped");

        result
    }
}

/// Route one received message to its method, or answer with an error.
fn dispatch(workers: &WorkerTable, outbound: &RpcOutbound, message: ZmqMessage) {
    let Some(inbound) = RpcInbound::from_message(message) else {
        warn!("Dropping message without a body frame");
        return;
    };

    let request: CallRequest = match decode_frame(&inbound.body) {
        Ok(request) => request,
        Err(e) => {
            warn!(error = %e, "Failed to decode request");
            // No id to correlate with; the caller matches on status.
            let err = RpcWireError::Decode;
            outbound.reply(&inbound, &CallReply::failed("", err.status(), err.to_string()));
            return;
        }
    };

    if request.heartbeat {
        debug!(call_id = %request.id, "Heartbeat");
        return;
    }

    let path = format!("{}/{}", request.worker, request.method);
    debug!(call_id = %request.id, path = %path, "Received request");

    let method = match resolve(workers, &request) {
        Ok(method) => Arc::clone(method),
        Err(err) => {
            warn!(call_id = %request.id, path = %path, error = %err, "Rejecting call");
            outbound.reply(
                &inbound,
                &CallReply::failed(&request.id, err.status(), err.to_string()),
            );
            return;
        }
    };

    let arguments = Arguments::from(request.arguments);
    spawn_call(method, request.id, path, arguments, inbound, outbound.clone());
}

fn resolve<'a>(
    workers: &'a WorkerTable,
    request: &CallRequest,
) -> Result<&'a MethodFn, RpcWireError> {
    let methods = workers
        .get(&request.worker)
        .ok_or_else(|| RpcWireError::NoWorker(request.worker.clone()))?;
    methods
        .get(&request.method)
        .ok_or_else(|| RpcWireError::NoMethod {
            worker: request.worker.clone(),
            method: request.method.clone(),
        })
}
