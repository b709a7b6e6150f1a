#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;

pub mod cli;
pub mod config;
pub mod error;
pub mod filter;
pub mod merge;
pub mod normalise;
pub mod overview;
pub mod pipeline;
pub mod runner;
pub mod table;
pub mod utils;
