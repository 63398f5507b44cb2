use futures::FutureExt;
use futures::future::BoxFuture;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;

use crate::connection::{RpcInbound, RpcOutbound};
use crate::error::{MethodError, RpcWireError};
use crate::protocol::{Arguments, CallReply, Value};

/// The future a worker method resolves to: an optional payload or an
/// application error.
pub type MethodFuture = BoxFuture<'static, Result<Option<Value>, MethodError>>;

/// A registered worker method.
///
/// The method receives the call's named arguments and returns its payload.
/// `None` means the method only acknowledges.
pub type MethodFn = Arc<dyn Fn(Arguments) -> MethodFuture + Send + Sync + 'static>;

/// Helper to create a boxed method from an async closure.
pub fn make_method<F, Fut>(f: F) -> MethodFn
where
    F: Fn(Arguments) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = Result<Option<Value>, MethodError>> + Send + 'static,
{
    Arc::new(move |arguments| f(arguments).boxed())
}

/// Spawn a task that runs `method` and queues its reply.
pub(crate) fn spawn_call(
    method: MethodFn,
    call_id: String,
    path: String,
    arguments: Arguments,
    inbound: RpcInbound,
    outbound: RpcOutbound,
) {
    tokio::spawn(async move {
        let result = AssertUnwindSafe(method(arguments)).catch_unwind().await;

        let reply = match result {
            Ok(Ok(payload)) => CallReply::ok(&call_id, payload),
            Ok(Err(e)) => {
                tracing::warn!(call_id = %call_id, path = %path, error = %e, "Method failed");
                let err = RpcWireError::from(e);
                CallReply::failed(&call_id, err.status(), err.to_string())
            }
            Err(_) => {
                tracing::error!(call_id = %call_id, path = %path, "Method panicked");
                let err = RpcWireError::Internal("method panicked".to_owned());
                CallReply::failed(&call_id, err.status(), err.to_string())
            }
        };

        if !outbound.reply(&inbound, &reply) {
            tracing::warn!(call_id = %call_id, path = %path, "Socket loop gone, dropping reply");
        }

        tracing::debug!(call_id = %call_id, path = %path, "Call completed");
    });
}
