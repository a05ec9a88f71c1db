//! Server-side features.

pub mod tools;

pub use tools::{ToolDefinition, ToolHandler, ToolRegistry};
