use std::process::ExitCode;

use vepkit::{config, error, normalise};

fn main() -> ExitCode {
    error::finish(config::handle_normalise_cli().and_then(|cfg| normalise::run(&cfg)))
}
