use std::process::ExitCode;

use vepkit::{config, error, overview};

fn main() -> ExitCode {
    error::finish(config::handle_overview_cli().and_then(|cfg| overview::run(&cfg)))
}
