//! The export and import operations behind the two command-line tools.

use nef_rpc::{Arguments, RpcClient, RpcClientError, Value};
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

use crate::config::{ExportArgs, ImportArgs};
use crate::error::ToolError;

pub const EXPORT_METHOD: &str = "exportConfiguration";
pub const IMPORT_METHOD: &str = "importConfiguration";
pub const CONFIGURATION_ARG: &str = "configuration";

/// Fetch the configuration held by `worker` as raw bytes.
pub fn export_configuration(client: &RpcClient, worker: &str) -> Result<Vec<u8>, RpcClientError> {
    client.worker(worker).call0(EXPORT_METHOD)?.into_bytes()
}

/// Hand `configuration` to `worker`. The reply carries no payload.
///
/// UTF-8 content is sent as text, anything else as a blob.
pub fn import_configuration(
    client: &RpcClient,
    worker: &str,
    configuration: Vec<u8>,
) -> Result<(), RpcClientError> {
    client.worker(worker).call(
        IMPORT_METHOD,
        Arguments::new().with(CONFIGURATION_ARG, Value::from_bytes(configuration)),
    )?;
    Ok(())
}

/// Export to `args.output`, or to `stdout` when no output file is given.
///
/// The payload is written verbatim; nothing is written when the call fails.
pub fn run_export(args: &ExportArgs, stdout: &mut impl Write) -> Result<(), ToolError> {
    let connection = &args.connection;
    let client = RpcClient::connect_with(connection.endpoint.clone(), connection.client_config())?;
    let configuration = export_configuration(&client, &connection.worker)?;
    client.close()?;

    match &args.output {
        Some(path) => {
            fs::write(path, &configuration).map_err(|e| ToolError::io(path, e))?;
            info!(path = %path.display(), bytes = configuration.len(), "Configuration exported");
        }
        None => {
            stdout
                .write_all(&configuration)
                .and_then(|()| stdout.flush())
                .map_err(|e| ToolError::io("<stdout>", e))?;
        }
    }
    Ok(())
}

/// Read `args.input` and import it. The file is read, as raw bytes, before
/// connecting.
pub fn run_import(args: &ImportArgs) -> Result<(), ToolError> {
    let configuration = read_configuration(&args.input)?;

    let connection = &args.connection;
    let client = RpcClient::connect_with(connection.endpoint.clone(), connection.client_config())?;
    let bytes = configuration.len();
    import_configuration(&client, &connection.worker, configuration)?;
    client.close()?;

    info!(path = %args.input.display(), bytes, "Configuration imported");
    Ok(())
}

fn read_configuration(path: &Path) -> Result<Vec<u8>, ToolError> {
    fs::read(path).map_err(|e| ToolError::io(path, e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::parse_args;

    #[test]
    fn test_missing_input_fails_before_connecting() {
        // Nothing listens on the endpoint; the I/O error must come first.
        let args: ImportArgs = parse_args([
            "import-config",
            "--endpoint",
            "tcp://127.0.0.1:1",
            "/nonexistent/dir/in.cfg",
        ])
        .unwrap();

        let err = run_import(&args).unwrap_err();
        assert_eq!(err.kind(), "IOError");
    }

    #[test]
    fn test_non_utf8_input_is_read_verbatim() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("latin1.cfg");
        std::fs::write(&path, b"name=Zo\xeb\n").unwrap();

        let bytes = read_configuration(&path).unwrap();
        assert_eq!(bytes, b"name=Zo\xeb\n");
        assert_eq!(Value::from_bytes(bytes).kind_name(), "blob");
    }
}
