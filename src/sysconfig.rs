//! The `sysconfig` worker: holds one configuration blob and serves it over
//! `exportConfiguration` / `importConfiguration`.
//!
//! The configuration is opaque. Valid UTF-8 travels as text, anything else
//! as a blob, and the bytes come back out unchanged.

use nef_rpc::{Arguments, MethodError, RpcRouter, RpcServerError, Value};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::tools::{CONFIGURATION_ARG, EXPORT_METHOD, IMPORT_METHOD};

#[derive(Debug, Clone, Default)]
pub struct SysconfigWorker {
    configuration: Arc<RwLock<Vec<u8>>>,
    state_file: Option<PathBuf>,
}

impl SysconfigWorker {
    pub fn new(configuration: impl Into<Vec<u8>>) -> Self {
        Self {
            configuration: Arc::new(RwLock::new(configuration.into())),
            state_file: None,
        }
    }

    /// Load the configuration from `state_file`; a missing file starts empty.
    pub async fn load(state_file: PathBuf) -> io::Result<Self> {
        let configuration = match tokio::fs::read(&state_file).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                info!(path = %state_file.display(), "No saved configuration, starting empty");
                Vec::new()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            configuration: Arc::new(RwLock::new(configuration)),
            state_file: Some(state_file),
        })
    }

    pub async fn configuration(&self) -> Vec<u8> {
        self.configuration.read().await.clone()
    }

    /// Register both methods under `worker`.
    pub fn register(&self, router: &mut RpcRouter, worker: &str) -> Result<(), RpcServerError> {
        let this = self.clone();
        router.register(worker, EXPORT_METHOD, move |_| {
            let this = this.clone();
            async move { Ok(Some(Value::from_bytes(this.configuration().await))) }
        })?;

        let this = self.clone();
        router.register(worker, IMPORT_METHOD, move |args| {
            let this = this.clone();
            async move { this.import(args).await }
        })?;

        Ok(())
    }

    async fn import(&self, args: Arguments) -> Result<Option<Value>, MethodError> {
        let bytes = match args.get(CONFIGURATION_ARG) {
            Some(value) => value
                .as_bytes()
                .ok_or_else(|| MethodError::invalid_argument(CONFIGURATION_ARG, "text or blob"))?,
            None => return Err(MethodError::missing_argument(CONFIGURATION_ARG)),
        };

        let mut configuration = self.configuration.write().await;
        if let Some(path) = &self.state_file {
            // Persist first so memory and disk never disagree.
            if let Err(e) = tokio::fs::write(path, bytes).await {
                warn!(path = %path.display(), error = %e, "Failed to save configuration");
                return Err(MethodError::new(format!(
                    "failed to save configuration to {}: {e}",
                    path.display()
                )));
            }
        }
        *configuration = bytes.to_vec();

        info!(bytes = bytes.len(), "Configuration imported");
        Ok(None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nef_rpc::CallPath;

    #[tokio::test]
    async fn test_import_replaces_configuration() {
        let worker = SysconfigWorker::new("old=1\n");
        let reply = worker
            .import(Arguments::new().with(CONFIGURATION_ARG, "new=2\n"))
            .await
            .unwrap();
        assert!(reply.is_none());
        assert_eq!(worker.configuration().await, b"new=2\n");
    }

    #[tokio::test]
    async fn test_import_keeps_non_utf8_bytes() {
        let worker = SysconfigWorker::default();
        let latin1 = b"name=Zo\xeb\n".to_vec();

        worker
            .import(Arguments::new().with(CONFIGURATION_ARG, Value::blob(latin1.clone())))
            .await
            .unwrap();
        assert_eq!(worker.configuration().await, latin1);
    }

    #[tokio::test]
    async fn test_import_requires_configuration_argument() {
        let worker = SysconfigWorker::new("old=1\n");

        let missing = worker.import(Arguments::new()).await.unwrap_err();
        assert_eq!(missing, MethodError::missing_argument(CONFIGURATION_ARG));

        let wrong = worker
            .import(Arguments::new().with(CONFIGURATION_ARG, 42i64))
            .await
            .unwrap_err();
        assert_eq!(
            wrong,
            MethodError::invalid_argument(CONFIGURATION_ARG, "text or blob")
        );

        assert_eq!(worker.configuration().await, b"old=1\n");
    }

    #[tokio::test]
    async fn test_state_file_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("sysconfig.cfg");

        let worker = SysconfigWorker::load(path.clone()).await.unwrap();
        assert!(worker.configuration().await.is_empty());

        worker
            .import(Arguments::new().with(CONFIGURATION_ARG, "persisted=yes\n"))
            .await
            .unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"persisted=yes\n");

        let reloaded = SysconfigWorker::load(path).await.unwrap();
        assert_eq!(reloaded.configuration().await, b"persisted=yes\n");
    }

    #[test]
    fn test_register_both_methods() {
        let mut router = RpcRouter::new(Default::default());
        SysconfigWorker::default().register(&mut router, "sysconfig").unwrap();
        for path in ["sysconfig/exportConfiguration", "sysconfig/importConfiguration"] {
            assert!(router.has_handler(&CallPath::parse(path).unwrap()));
        }
    }
}
