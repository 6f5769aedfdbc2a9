//! Core services - the application's business logic layer.
//!
//! The header resolver, token selector and product router are pure
//! functions over domain values. The registry and workspace services
//! orchestrate them over the key/value storage port.

pub mod header_resolver;
pub mod product_router;
pub mod registry;
pub mod token_selector;
pub mod workspace;

pub use product_router::{Product, RouteDecision};
pub use registry::{McpRegistry, RegistryEntry, RegistryError, SessionOverrides};
pub use token_selector::{provider_for_model, select_token};
pub use workspace::{FeatureFlags, WorkspaceError, WorkspaceService};
