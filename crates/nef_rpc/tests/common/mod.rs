use nef_rpc::{Endpoint, MethodError, RpcRouter, RpcRouterConfig, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;

/// A worker host running on its own thread and runtime.
///
/// The blocking client under test owns a separate runtime, so the host
/// cannot share the test thread.
pub struct TestHost {
    pub endpoint: Endpoint,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl TestHost {
    pub fn spawn<F>(build: F) -> Self
    where
        F: FnOnce(&mut RpcRouter) + Send + 'static,
    {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Builder::new_multi_thread()
                .worker_threads(2)
                .enable_all()
                .build()
                .expect("host runtime");

            runtime.block_on(async move {
                let bind = Endpoint::parse("tcp://127.0.0.1:0").expect("bind endpoint");
                let mut router = RpcRouter::new(RpcRouterConfig::new(bind));
                build(&mut router);

                let bound = router.bind().await.expect("bind router");
                ready_tx
                    .send(bound.endpoint().to_owned())
                    .expect("report endpoint");

                bound
                    .run_until(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("router run");
            });
        });

        let endpoint = ready_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("router did not bind")
            .parse()
            .expect("bound endpoint parses");

        Self {
            endpoint,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }
}

impl Drop for TestHost {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// In-memory configuration store with a call counter per method.
#[derive(Clone, Default)]
pub struct SysconfigState {
    pub config: Arc<Mutex<String>>,
    pub exports: Arc<AtomicUsize>,
    pub imports: Arc<AtomicUsize>,
}

impl SysconfigState {
    pub fn with_config(text: &str) -> Self {
        let state = Self::default();
        *state.config.lock().unwrap() = text.to_owned();
        state
    }

    pub fn register(&self, router: &mut RpcRouter) {
        let state = self.clone();
        router
            .register("sysconfig", "exportConfiguration", move |_| {
                let state = state.clone();
                async move {
                    state.exports.fetch_add(1, Ordering::SeqCst);
                    let text = state.config.lock().unwrap().clone();
                    Ok(Some(Value::text(text)))
                }
            })
            .unwrap();

        let state = self.clone();
        router
            .register("sysconfig", "importConfiguration", move |args| {
                let state = state.clone();
                async move {
                    state.imports.fetch_add(1, Ordering::SeqCst);
                    let Some(text) = args.text("configuration") else {
                        return Err(MethodError::missing_argument("configuration"));
                    };
                    *state.config.lock().unwrap() = text.to_owned();
                    Ok(None)
                }
            })
            .unwrap();
    }
}
