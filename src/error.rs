use nef_rpc::RpcClientError;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use thiserror::Error;

/// Failure of a configuration tool run.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum ToolError {
    /// Bad command line, reported before any connection is attempted.
    #[error("{0}")]
    Usage(#[from] clap::Error),

    /// A local file or stream could not be read or written.
    #[error("{}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Rpc(#[from] RpcClientError),
}

impl ToolError {
    pub fn io(path: impl AsRef<Path>, source: std::io::Error) -> Self {
        ToolError::Io {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Name of the failure kind shown in diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            ToolError::Usage(_) => "UsageError",
            ToolError::Io { .. } => "IOError",
            ToolError::Rpc(err) => match err {
                RpcClientError::Connection { .. } => "ConnectionError",
                RpcClientError::Remote { .. } => "RemoteError",
                RpcClientError::Timeout { .. } => "TimeoutError",
                _ => "TransportError",
            },
        }
    }

    pub fn exit_code(&self) -> u8 {
        match self {
            ToolError::Usage(_) => 2,
            ToolError::Io { .. } => 3,
            ToolError::Rpc(err) => match err {
                RpcClientError::Connection { .. } => 4,
                RpcClientError::Remote { .. } => 5,
                RpcClientError::Timeout { .. } => 6,
                _ => 7,
            },
        }
    }
}

/// Print the diagnostic for `result` to stderr and turn it into an exit code.
///
/// `--help` and `--version` arrive as clap errors that print to stdout and
/// exit 0.
pub fn report(result: Result<(), ToolError>) -> ExitCode {
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(ToolError::Usage(err)) if !err.use_stderr() => {
            let _ = err.print();
            ExitCode::SUCCESS
        }
        Err(ToolError::Usage(err)) => {
            let _ = err.print();
            ExitCode::from(2)
        }
        Err(err) => {
            eprintln!("error: {}: {err}", err.kind());
            ExitCode::from(err.exit_code())
        }
    }
}
