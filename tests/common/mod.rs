use nef_rpc::{Endpoint, RpcRouter, RpcRouterConfig};
use nef_tools::sysconfig::SysconfigWorker;
use std::process::Command;
use std::thread::JoinHandle;
use std::time::Duration;
use tokio::sync::oneshot;

/// A `sysconfig` worker served from a background thread.
pub struct Host {
    pub endpoint: String,
    pub worker: SysconfigWorker,
    shutdown: Option<oneshot::Sender<()>>,
    thread: Option<JoinHandle<()>>,
}

impl Host {
    pub fn sysconfig(configuration: &str) -> Self {
        let worker = SysconfigWorker::new(configuration);
        let registered = worker.clone();
        Self::spawn(worker, move |router| {
            registered.register(router, "sysconfig").expect("register sysconfig");
        })
    }

    pub fn spawn<F>(worker: SysconfigWorker, build: F) -> Self
    where
        F: FnOnce(&mut RpcRouter) + Send + 'static,
    {
        let (ready_tx, ready_rx) = std::sync::mpsc::channel();
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let thread = std::thread::spawn(move || {
            let runtime = tokio::runtime::Runtime::new().expect("host runtime");
            runtime.block_on(async move {
                let bind = Endpoint::parse("tcp://127.0.0.1:0").expect("bind endpoint");
                let mut router = RpcRouter::new(RpcRouterConfig::new(bind));
                build(&mut router);

                let bound = router.bind().await.expect("bind");
                ready_tx.send(bound.endpoint().to_owned()).expect("report endpoint");
                bound
                    .run_until(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .expect("serve");
            });
        });

        let endpoint = ready_rx
            .recv_timeout(Duration::from_secs(10))
            .expect("host did not bind");

        Self {
            endpoint,
            worker,
            shutdown: Some(shutdown_tx),
            thread: Some(thread),
        }
    }

    /// Current configuration held by the worker.
    pub fn configuration(&self) -> Vec<u8> {
        tokio::runtime::Runtime::new()
            .expect("runtime")
            .block_on(self.worker.configuration())
    }
}

impl Drop for Host {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        if let Some(thread) = self.thread.take() {
            let _ = thread.join();
        }
    }
}

/// A tool invocation with the `NEF_*` environment cleared.
pub fn tool(bin: &str) -> Command {
    let mut cmd = Command::new(bin);
    cmd.env_remove("NEF_ENDPOINT")
        .env_remove("NEF_WORKER")
        .env_remove("NEF_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

pub const EXPORT_CONFIG: &str = env!("CARGO_BIN_EXE_export-config");
pub const IMPORT_CONFIG: &str = env!("CARGO_BIN_EXE_import-config");
