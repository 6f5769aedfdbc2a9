#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

#[cfg(test)]
use tempfile as _;

// Used by the binary only
use dotenvy as _;
use tracing_subscriber as _;

pub mod bootstrap;
pub mod commands;
pub mod handlers;
pub mod parser;

pub use bootstrap::{CliConfig, CliContext, bootstrap};
pub use commands::{Commands, ServeArgs};
pub use parser::Cli;
