#![doc = include_str!("../README.md")]
#![deny(unsafe_code)]
#![deny(unused_crate_dependencies)]

// Test-only dependencies of the integration tests
#[cfg(test)]
use http_body_util as _;
#[cfg(test)]
use tempfile as _;
#[cfg(test)]
use tower as _;

pub mod bootstrap;
pub mod error;
pub mod handlers;
pub mod llm;
pub mod routes;
pub mod state;

// Re-export primary types
pub use bootstrap::{AxumContext, CorsConfig, ServerConfig, bootstrap, start_server};
pub use error::HttpError;
pub use llm::{ByteStream, ChatModelError, ChatModelPort, ChatModelRequest, ProviderChatModel};
pub use routes::create_router;
pub use state::AppState;
