//! Transport layer for the MCP tool server.

pub mod http;

pub use http::{create_app, AppState};
