use std::process::ExitCode;

use vepkit::{config, error, runner};

fn main() -> ExitCode {
    error::finish(config::handle_run_cli().and_then(|cfg| runner::run(&cfg)))
}
