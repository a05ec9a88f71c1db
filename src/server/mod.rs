//! MCP tool server.
//!
//! [`McpServer`] owns the validated configuration, the authorized key set and
//! the tool registry, and serves them over HTTP until the process receives
//! SIGINT or SIGTERM.

pub mod features;

use actix_web::{web, HttpServer};
use tracing::{info, warn};

use crate::auth::AuthorizedKeySet;
use crate::config::Config;
use crate::error::Result;
use crate::transport::{create_app, AppState};
use features::tools::ToolRegistry;

/// Main MCP tool server
pub struct McpServer {
    config: Config,
    keys: AuthorizedKeySet,
    tools: ToolRegistry,
}

impl McpServer {
    /// Create a server with the built-in tools
    pub fn new(config: Config) -> Result<Self> {
        Self::with_tools(config, ToolRegistry::with_default_tools()?)
    }

    /// Create a server with a custom tool registry
    pub fn with_tools(config: Config, tools: ToolRegistry) -> Result<Self> {
        config.validate()?;
        let keys = AuthorizedKeySet::new(config.auth.api_keys.iter().cloned())?;

        Ok(Self {
            config,
            keys,
            tools,
        })
    }

    /// Get server configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Get the authorized key set
    pub fn keys(&self) -> &AuthorizedKeySet {
        &self.keys
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    /// Log how the server is about to authorize requests
    fn log_startup(&self) {
        if self.keys.is_open() {
            warn!("No authorized keys configured - all requests will be allowed");
        } else {
            info!(
                "Server configured with {} authorized key(s)",
                self.keys.len()
            );
        }

        info!("Authorization methods supported:");
        info!("  1. Authorization header: 'Authorization: Bearer <key>' or 'Authorization: ApiKey <key>'");
        info!("  2. URL parameter fallback: '?key=<key>' or '?auth=<key>'");
        info!("  Note: URL parameters are less secure and should only be used when headers are not supported");
    }

    /// Run the server until it is shut down
    pub async fn run(self) -> Result<()> {
        self.log_startup();

        let http_config = self.config.http.clone();
        let bind_addr = http_config.bind_addr();
        let state = web::Data::new(AppState::new(self.config, self.keys, self.tools));

        let app_config = http_config.clone();
        let mut server = HttpServer::new(move || create_app(state.clone(), &app_config));
        if let Some(workers) = http_config.workers {
            server = server.workers(workers);
        }

        let server = server.bind(&bind_addr)?;
        info!("MCP server starting on {}", bind_addr);

        server.run().await?;

        info!("MCP server stopped");
        Ok(())
    }
}

/// Server builder for easier configuration
pub struct McpServerBuilder {
    config: Config,
    tools: Option<ToolRegistry>,
}

impl McpServerBuilder {
    /// Create a new server builder with default configuration
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            tools: None,
        }
    }

    /// Set the server configuration
    pub fn config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    /// Set the server name
    pub fn name(mut self, name: String) -> Self {
        self.config.server.name = name;
        self
    }

    /// Set the server version
    pub fn version(mut self, version: String) -> Self {
        self.config.server.version = version;
        self
    }

    /// Set server instructions
    pub fn instructions(mut self, instructions: String) -> Self {
        self.config.server.instructions = Some(instructions);
        self
    }

    /// Set the bind address
    pub fn host(mut self, host: String) -> Self {
        self.config.http.bind_address = host;
        self
    }

    /// Set the port
    pub fn port(mut self, port: u16) -> Self {
        self.config.http.port = port;
        self
    }

    /// Replace the authorized keys
    pub fn keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.auth.api_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    /// Use a custom tool registry
    pub fn tools(mut self, tools: ToolRegistry) -> Self {
        self.tools = Some(tools);
        self
    }

    /// Build the server
    pub fn build(self) -> Result<McpServer> {
        match self.tools {
            Some(tools) => McpServer::with_tools(self.config, tools),
            None => McpServer::new(self.config),
        }
    }
}

impl Default for McpServerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let server = McpServerBuilder::new()
            .name("test-server".to_string())
            .version("1.0.0".to_string())
            .instructions("Test server instructions".to_string())
            .host("127.0.0.1".to_string())
            .port(9090)
            .keys(["abc123", "def456"])
            .build();

        assert!(server.is_ok());
        let server = server.unwrap();
        assert_eq!(server.config().server.name, "test-server");
        assert_eq!(server.config().server.version, "1.0.0");
        assert_eq!(
            server.config().server.instructions,
            Some("Test server instructions".to_string())
        );
        assert_eq!(server.config().http.bind_addr(), "127.0.0.1:9090");
        assert_eq!(server.keys().len(), 2);
        assert!(!server.keys().is_open());
        assert_eq!(server.tools().len(), 2);
    }

    #[test]
    fn test_builder_defaults_to_open_mode() {
        let server = McpServerBuilder::new().build().unwrap();
        assert!(server.keys().is_open());
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        let result = McpServerBuilder::new().keys(["abc", "abc"]).build();
        assert!(result.is_err());

        let result = McpServerBuilder::new().port(0).build();
        assert!(result.is_err());
    }

    #[test]
    fn test_custom_tool_registry() {
        let server = McpServerBuilder::new()
            .tools(ToolRegistry::new())
            .build()
            .unwrap();
        assert!(server.tools().is_empty());
    }
}
