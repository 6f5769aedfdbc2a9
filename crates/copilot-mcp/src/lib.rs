#![doc = include_str!("../README.md")]
#![deny(unused_crate_dependencies)]

pub mod client;
pub mod connector;
pub mod protocol;
pub mod toolset;
pub mod transport;

pub use client::McpClient;
pub use connector::HttpMcpConnector;
pub use toolset::{ToolSession, ToolSetBuilder};

#[cfg(test)]
use axum as _;
