use std::process::ExitCode;

fn main() -> ExitCode {
    behuman_cli::run()
}
