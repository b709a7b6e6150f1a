use std::process::ExitCode;

use vepkit::{config, error, pipeline};

fn main() -> ExitCode {
    error::finish(config::handle_pipeline_cli().and_then(|cfg| pipeline::run(&cfg)))
}
