//! Command handlers.

pub mod presets;
pub mod serve;
pub mod servers;
pub mod transfer;
