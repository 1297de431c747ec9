//! rank - Multi-factor task prioritization

use std::process::ExitCode;

fn main() -> ExitCode {
    if let Err(e) = rank_cli::cli::run() {
        eprintln!("Error: {:#}", e);
        ExitCode::FAILURE
    } else {
        ExitCode::SUCCESS
    }
}
