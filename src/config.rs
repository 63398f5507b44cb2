use clap::{Args, Parser};
use nef_rpc::{DEFAULT_ENDPOINT, Endpoint, RpcClientConfig};
use std::ffi::OsString;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ToolError;

/// Worker the configuration tools talk to unless told otherwise.
pub const DEFAULT_WORKER: &str = "sysconfig";

/// Where the broker is and which worker to address.
#[derive(Debug, Clone, Args)]
pub struct ConnectionArgs {
    /// Broker endpoint (tcp://host:port or ipc:///path)
    #[arg(long, env = "NEF_ENDPOINT", default_value = DEFAULT_ENDPOINT)]
    pub endpoint: Endpoint,

    /// Name of the worker holding the configuration
    #[arg(long, env = "NEF_WORKER", default_value = DEFAULT_WORKER)]
    pub worker: String,

    /// Seconds to wait for the worker's reply (at least 1)
    #[arg(
        long = "timeout-secs",
        env = "NEF_TIMEOUT_SECS",
        default_value_t = 30,
        value_parser = clap::value_parser!(u64).range(1..)
    )]
    pub timeout_secs: u64,
}

impl ConnectionArgs {
    pub fn client_config(&self) -> RpcClientConfig {
        RpcClientConfig::new().with_timeout(Duration::from_secs(self.timeout_secs))
    }
}

/// Fetch a worker's configuration.
#[derive(Debug, Parser)]
#[command(name = "export-config", version)]
pub struct ExportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// File to write the configuration to (standard output if omitted)
    pub output: Option<PathBuf>,
}

/// Push a configuration file to a worker.
#[derive(Debug, Parser)]
#[command(name = "import-config", version)]
pub struct ImportArgs {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    /// Configuration file to send
    pub input: PathBuf,
}

/// Host the sysconfig worker.
#[derive(Debug, Parser)]
#[command(name = "sysconfig-worker", version)]
pub struct WorkerArgs {
    /// Endpoint to bind (tcp://host:port or ipc:///path)
    #[arg(long, env = "NEF_BIND", default_value = DEFAULT_ENDPOINT)]
    pub bind: Endpoint,

    /// Name the worker answers to
    #[arg(long, env = "NEF_WORKER", default_value = DEFAULT_WORKER)]
    pub worker: String,

    /// File the configuration is loaded from and saved to after each import
    #[arg(long)]
    pub state: Option<PathBuf>,
}

/// Parse a command line, turning clap failures into [`ToolError::Usage`].
pub fn parse_args<T, I, A>(argv: I) -> Result<T, ToolError>
where
    T: Parser,
    I: IntoIterator<Item = A>,
    A: Into<OsString> + Clone,
{
    T::try_parse_from(argv).map_err(ToolError::Usage)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_export_defaults() {
        let args: ExportArgs = parse_args(["export-config"]).unwrap();
        assert!(args.output.is_none());
        assert_eq!(args.connection.worker, "sysconfig");
        assert_eq!(args.connection.endpoint.to_string(), "tcp://127.0.0.1:5557");
        assert_eq!(
            args.connection.client_config().timeout,
            Duration::from_secs(30)
        );
    }

    #[test]
    fn test_export_with_output_and_overrides() {
        let args: ExportArgs = parse_args([
            "export-config",
            "--endpoint",
            "tcp://10.1.2.3:6000",
            "--worker",
            "netconfig",
            "--timeout-secs",
            "5",
            "out.cfg",
        ])
        .unwrap();
        assert_eq!(args.output, Some(PathBuf::from("out.cfg")));
        assert_eq!(args.connection.endpoint.port(), Some(6000));
        assert_eq!(args.connection.worker, "netconfig");
        assert_eq!(args.connection.timeout_secs, 5);
    }

    #[test]
    fn test_import_requires_exactly_one_file() {
        let none = parse_args::<ImportArgs, _, _>(["import-config"]);
        assert!(matches!(none, Err(ToolError::Usage(_))));

        let two = parse_args::<ImportArgs, _, _>(["import-config", "a.cfg", "b.cfg"]);
        assert!(matches!(two, Err(ToolError::Usage(_))));

        let one: ImportArgs = parse_args(["import-config", "a.cfg"]).unwrap();
        assert_eq!(one.input, PathBuf::from("a.cfg"));
    }

    #[test]
    fn test_export_rejects_two_outputs() {
        let result = parse_args::<ExportArgs, _, _>(["export-config", "a.cfg", "b.cfg"]);
        assert!(matches!(result, Err(ToolError::Usage(_))));
    }

    #[test]
    fn test_zero_timeout_is_usage_error() {
        let result = parse_args::<ExportArgs, _, _>(["export-config", "--timeout-secs", "0"]);
        assert!(matches!(result, Err(ToolError::Usage(_))));

        let one: ExportArgs = parse_args(["export-config", "--timeout-secs", "1"]).unwrap();
        assert_eq!(one.connection.timeout_secs, 1);
    }

    #[test]
    fn test_bad_endpoint_is_usage_error() {
        let result = parse_args::<ExportArgs, _, _>(["export-config", "--endpoint", "http://x:1"]);
        assert!(matches!(result, Err(ToolError::Usage(_))));
    }

    #[test]
    fn test_help_is_not_a_failure() {
        match parse_args::<ImportArgs, _, _>(["import-config", "--help"]) {
            Err(ToolError::Usage(err)) => assert!(!err.use_stderr()),
            other => panic!("expected help output, got {other:?}"),
        }
    }

    #[test]
    fn test_worker_args() {
        let args: WorkerArgs =
            parse_args(["sysconfig-worker", "--bind", "tcp://127.0.0.1:0", "--state", "s.cfg"])
                .unwrap();
        assert_eq!(args.bind.port(), Some(0));
        assert_eq!(args.worker, "sysconfig");
        assert_eq!(args.state, Some(PathBuf::from("s.cfg")));
    }
}
