//! # MCP Keygate
//!
//! A small Model Context Protocol tool server whose endpoints are gated by an
//! authorization layer that tolerates clients unable to send headers.
//!
//! A credential is accepted from, in order of precedence:
//!
//! 1. `Authorization: Bearer <key>`
//! 2. `Authorization: ApiKey <key>`
//! 3. `Authorization: <key>`
//! 4. the `?key=<key>` query parameter
//! 5. the `?auth=<key>` query parameter
//!
//! Query parameters leak into proxy logs and browser history, so requests
//! authorized that way are flagged and logged at warning level. With no keys
//! configured the server runs in open mode and accepts every request.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use mcp_keygate::server::McpServerBuilder;
//!
//! #[actix_web::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let server = McpServerBuilder::new()
//!         .port(8000)
//!         .keys(["abc123"])
//!         .build()?;
//!
//!     server.run().await?;
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;
pub mod utils;

// Re-export main types for convenience
pub use auth::{authorize, AuthorizationVerdict, AuthorizedKeySet, CredentialSource, IncomingRequest};
pub use config::Config;
pub use error::{Result, ServerError};
pub use server::McpServer;

/// Default server information
pub const SERVER_NAME: &str = "mcp-keygate";
pub const SERVER_VERSION: &str = env!("CARGO_PKG_VERSION");
