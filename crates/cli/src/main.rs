use std::process::ExitCode;

fn main() -> ExitCode {
    platewise_cli::run()
}
