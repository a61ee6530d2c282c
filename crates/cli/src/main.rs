use std::process::ExitCode;

fn main() -> ExitCode {
    proposer_cli::run()
}
