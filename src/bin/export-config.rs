use nef_tools::config::{ExportArgs, parse_args};
use nef_tools::{report, telemetry, tools};
use std::process::ExitCode;

fn main() -> ExitCode {
    telemetry::init("warn");

    let result = parse_args::<ExportArgs, _, _>(std::env::args_os())
        .and_then(|args| tools::run_export(&args, &mut std::io::stdout().lock()));

    report(result)
}
