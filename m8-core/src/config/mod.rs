//! Configuration types
//!
//! Host-side settings for the session and the renderer, loadable from TOML
//! or stored as postcard binary data.

mod store;
mod types;

pub use store::ConfigError;
pub use types::*;
