use std::process::ExitCode;

use vepkit::{config, error, filter};

fn main() -> ExitCode {
    error::finish(config::handle_filter_cli().and_then(|cfg| filter::run(&cfg)))
}
