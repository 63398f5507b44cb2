use nef_tools::config::{ImportArgs, parse_args};
use nef_tools::{report, telemetry, tools};
use std::process::ExitCode;

fn main() -> ExitCode {
    telemetry::init("warn");

    let result = parse_args::<ImportArgs, _, _>(std::env::args_os())
        .and_then(|args| tools::run_import(&args));

    report(result)
}
