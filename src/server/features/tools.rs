//! Tool management for the MCP tool server.
//!
//! Tools are registered once at startup into a [`ToolRegistry`], which is then
//! shared read-only between request handlers. Each invocation receives a
//! [`ToolContext`] describing how the caller authorized, but never the key
//! itself.

use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::collections::HashMap;
use tracing::{debug, info};

use crate::auth::{AuthorizationVerdict, AuthorizedKeySet, CredentialSource};
use crate::error::{Result, ServerError};
use crate::utils::http_date;

/// Tool handler trait for executing tools
#[async_trait::async_trait]
pub trait ToolHandler: Send + Sync {
    /// Get the handler name
    fn name(&self) -> &str;

    /// Get the tool description
    fn description(&self) -> Option<String> {
        None
    }

    /// Describe accepted parameters as `{ name: { "type": .., "required": .. } }`
    fn parameters(&self) -> Value {
        json!({})
    }

    /// Get the complete tool definition
    fn tool_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description(),
            parameters: self.parameters(),
        }
    }

    /// Execute the tool with the given parameters
    async fn execute(&self, parameters: &Value, ctx: &ToolContext) -> Result<Value>;

    /// Validate parameters before execution (optional)
    async fn validate_parameters(&self, parameters: &Value) -> Result<()> {
        let _ = parameters;
        Ok(())
    }
}

/// Tool definition as listed by `GET /tools`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    pub parameters: Value,
}

/// What a tool may know about the authorization of the current request
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolContext {
    pub source: CredentialSource,
    pub insecure_transport: bool,
    pub key_present: bool,
    pub open_mode: bool,
}

impl ToolContext {
    pub fn from_verdict(verdict: &AuthorizationVerdict, keys: &AuthorizedKeySet) -> Self {
        Self {
            source: verdict.source,
            insecure_transport: verdict.insecure_transport,
            key_present: verdict.key_present(),
            open_mode: keys.is_open(),
        }
    }
}

/// Body of `POST /execute`
#[derive(Debug, Clone, Deserialize)]
pub struct ExecuteRequest {
    pub tool: String,
    #[serde(default = "empty_object")]
    pub parameters: Value,
}

fn empty_object() -> Value {
    json!({})
}

/// Response of `POST /execute`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExecuteResponse {
    pub tool: String,
    pub result: Value,
}

/// Registry of tool handlers, keyed by name
#[derive(Default)]
pub struct ToolRegistry {
    handlers: HashMap<String, Box<dyn ToolHandler>>,
}

impl ToolRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry holding the built-in tools
    pub fn with_default_tools() -> Result<Self> {
        let mut registry = Self::new();
        for handler in default_tool_handlers() {
            registry.register(handler)?;
        }
        Ok(registry)
    }

    /// Register a tool handler
    pub fn register(&mut self, handler: Box<dyn ToolHandler>) -> Result<()> {
        let name = handler.name().to_string();
        if self.handlers.contains_key(&name) {
            return Err(ServerError::Config(format!(
                "Tool already registered: {}",
                name
            )));
        }

        self.handlers.insert(name.clone(), handler);
        info!("Registered tool: {}", name);
        Ok(())
    }

    /// Tool definitions sorted by name
    pub fn list(&self) -> Vec<ToolDefinition> {
        let mut tools: Vec<ToolDefinition> = self
            .handlers
            .values()
            .map(|handler| handler.tool_definition())
            .collect();
        tools.sort_by(|a, b| a.name.cmp(&b.name));
        tools
    }

    pub fn contains(&self, name: &str) -> bool {
        self.handlers.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.handlers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handlers.is_empty()
    }

    /// Execute a tool
    pub async fn call(&self, request: ExecuteRequest, ctx: &ToolContext) -> Result<ExecuteResponse> {
        let handler = self
            .handlers
            .get(&request.tool)
            .ok_or_else(|| ServerError::unknown_tool(&request.tool))?;

        if !request.parameters.is_object() {
            return Err(ServerError::malformed("Parameters must be an object"));
        }

        handler.validate_parameters(&request.parameters).await?;

        debug!(tool = %request.tool, source = %ctx.source, "Executing tool");
        let result = handler.execute(&request.parameters, ctx).await?;

        info!("Executed tool: {}", request.tool);
        Ok(ExecuteResponse {
            tool: request.tool,
            result,
        })
    }
}

/// Echoes a message back to the caller
pub struct EchoToolHandler;

#[async_trait::async_trait]
impl ToolHandler for EchoToolHandler {
    fn name(&self) -> &str {
        "echo"
    }

    fn description(&self) -> Option<String> {
        Some("Echo back the provided message".to_string())
    }

    fn parameters(&self) -> Value {
        json!({
            "message": { "type": "string", "required": true }
        })
    }

    async fn execute(&self, parameters: &Value, _ctx: &ToolContext) -> Result<Value> {
        let message = parameters
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or("No message provided");

        Ok(json!({
            "echoed_message": message,
            "timestamp": http_date(),
        }))
    }

    async fn validate_parameters(&self, parameters: &Value) -> Result<()> {
        if let Some(message) = parameters.get("message") {
            if !message.is_string() {
                return Err(ServerError::malformed("Message must be a string"));
            }
        }

        Ok(())
    }
}

/// Reports how the current request was authorized
pub struct AuthInfoToolHandler;

#[async_trait::async_trait]
impl ToolHandler for AuthInfoToolHandler {
    fn name(&self) -> &str {
        "auth_info"
    }

    fn description(&self) -> Option<String> {
        Some("Show information about the authorization method used".to_string())
    }

    async fn execute(&self, _parameters: &Value, ctx: &ToolContext) -> Result<Value> {
        Ok(json!({
            "authorization_method": ctx.source,
            "insecure_transport": ctx.insecure_transport,
            "key_present": ctx.key_present,
            "open_mode": ctx.open_mode,
            "timestamp": http_date(),
        }))
    }
}

/// Handlers registered by [`ToolRegistry::with_default_tools`]
pub fn default_tool_handlers() -> Vec<Box<dyn ToolHandler>> {
    vec![Box::new(EchoToolHandler), Box::new(AuthInfoToolHandler)]
}
