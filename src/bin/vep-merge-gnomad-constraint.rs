use std::process::ExitCode;

use vepkit::{config, error, merge};

fn main() -> ExitCode {
    error::finish(config::handle_merge_cli().and_then(|cfg| merge::run(&cfg)))
}
