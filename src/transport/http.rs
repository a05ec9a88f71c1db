//! HTTP transport for the MCP tool server.
//!
//! Every request passes through [`authorize_request`] before routing. The
//! middleware resolves the authorization verdict exactly once, rejects the
//! request with a generic 401 when it fails, and otherwise stores the verdict
//! in the request extensions for handlers that describe it.

use actix_cors::Cors;
use actix_web::body::{EitherBody, MessageBody};
use actix_web::dev::{ServiceFactory, ServiceRequest, ServiceResponse};
use actix_web::http::header;
use actix_web::middleware::{from_fn, Condition, Next};
use actix_web::{web, App, HttpMessage, HttpRequest, HttpResponse};
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;

use crate::auth::{self, AuthorizationVerdict, AuthorizedKeySet, IncomingRequest};
use crate::config::{Config, HttpConfig};
use crate::error::{Result, ServerError};
use crate::server::features::tools::{ExecuteRequest, ExecuteResponse, ToolContext, ToolRegistry};
use crate::utils::http_date;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub keys: Arc<AuthorizedKeySet>,
    pub tools: Arc<ToolRegistry>,
}

impl AppState {
    pub fn new(config: Config, keys: AuthorizedKeySet, tools: ToolRegistry) -> Self {
        Self {
            config: Arc::new(config),
            keys: Arc::new(keys),
            tools: Arc::new(tools),
        }
    }
}

/// Body of `GET /auth-test`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthTestResponse {
    pub authorized: bool,
    pub source: String,
    pub insecure_transport: bool,
    pub key_present: bool,
    pub open_mode: bool,
}

/// Create the Actix Web application
pub fn create_app(
    state: web::Data<AppState>,
    config: &HttpConfig,
) -> App<
    impl ServiceFactory<
        ServiceRequest,
        Config = (),
        Response = ServiceResponse<impl MessageBody>,
        Error = actix_web::Error,
        InitError = (),
    >,
> {
    App::new()
        .app_data(state)
        .route("/", web::get().to(handle_index))
        .route("/health", web::get().to(handle_health))
        .route("/tools", web::get().to(handle_list_tools))
        .route("/auth-test", web::get().to(handle_auth_test))
        .route("/execute", web::post().to(handle_execute))
        .default_service(web::to(handle_not_found))
        .wrap(from_fn(authorize_request))
        .wrap(Condition::new(config.enable_cors, cors(config)))
        .wrap(TracingLogger::default())
}

/// CORS policy; preflight requests are answered here, before authorization
fn cors(config: &HttpConfig) -> Cors {
    let mut cors = Cors::default()
        .allowed_methods(vec!["GET", "POST", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::AUTHORIZATION])
        .max_age(3600);

    if config.cors_origins.iter().any(|origin| origin == "*") {
        cors = cors.allow_any_origin();
    } else {
        for origin in &config.cors_origins {
            cors = cors.allowed_origin(origin);
        }
    }

    cors
}

/// Copy the credential-bearing parts of an actix request
pub fn incoming_request(req: &HttpRequest) -> IncomingRequest {
    let mut incoming = IncomingRequest::new().with_query(req.query_string());

    // Non-UTF-8 values are kept lossily so a malformed header still outranks
    // the query parameters.
    for (name, value) in req.headers() {
        let value = String::from_utf8_lossy(value.as_bytes());
        incoming = incoming.with_header(name.as_str(), &value);
    }

    let info = req.connection_info();
    if let Some(addr) = info.realip_remote_addr() {
        incoming = incoming.with_client_addr(addr);
    }

    incoming
}

/// Authorization middleware
async fn authorize_request<B: MessageBody + 'static>(
    req: ServiceRequest,
    next: Next<B>,
) -> std::result::Result<ServiceResponse<EitherBody<B>>, actix_web::Error> {
    let state = req
        .app_data::<web::Data<AppState>>()
        .cloned()
        .ok_or_else(|| ServerError::internal("Application state is not configured"))?;

    let verdict = auth::authorize(&incoming_request(req.request()), &state.keys);

    if !verdict.authorized {
        return Ok(req
            .error_response(ServerError::Unauthorized)
            .map_into_right_body());
    }

    req.extensions_mut().insert(verdict);
    next.call(req).await.map(ServiceResponse::map_into_left_body)
}

/// `GET /` - server information
async fn handle_index(state: web::Data<AppState>) -> HttpResponse {
    let server = &state.config.server;

    HttpResponse::Ok().json(json!({
        "name": server.name,
        "version": server.version,
        "description": "Model Context Protocol server with header and URL parameter authorization fallback",
        "instructions": server.instructions,
        "authorization_methods": [
            "Authorization header (Bearer <token>)",
            "Authorization header (ApiKey <key>)",
            "Authorization header (<key>)",
            "URL parameter (?key=<key>)",
            "URL parameter (?auth=<key>)"
        ],
        "endpoints": {
            "/": "Server information",
            "/health": "Health check",
            "/tools": "Available tools",
            "/auth-test": "Test authorization",
            "/execute": "Execute a tool (POST)"
        }
    }))
}

/// `GET /health`
async fn handle_health() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "timestamp": http_date(),
        "authorized": true
    }))
}

/// `GET /tools`
async fn handle_list_tools(state: web::Data<AppState>) -> HttpResponse {
    HttpResponse::Ok().json(json!({ "tools": state.tools.list() }))
}

/// `GET /auth-test` - describe how this request was authorized
async fn handle_auth_test(
    verdict: web::ReqData<AuthorizationVerdict>,
    state: web::Data<AppState>,
) -> HttpResponse {
    HttpResponse::Ok().json(AuthTestResponse {
        authorized: verdict.authorized,
        source: verdict.source.to_string(),
        insecure_transport: verdict.insecure_transport,
        key_present: verdict.key_present(),
        open_mode: state.keys.is_open(),
    })
}

/// `POST /execute` - dispatch to a registered tool
async fn handle_execute(
    verdict: web::ReqData<AuthorizationVerdict>,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> Result<HttpResponse> {
    let value: serde_json::Value = serde_json::from_slice(&body)
        .map_err(|_| ServerError::malformed("Invalid JSON in request body"))?;

    let request: ExecuteRequest = serde_json::from_value(value)
        .map_err(|e| ServerError::malformed(format!("Invalid execute request: {}", e)))?;

    let ctx = ToolContext::from_verdict(&verdict, &state.keys);
    let response: ExecuteResponse = state.tools.call(request, &ctx).await?;

    Ok(HttpResponse::Ok().json(response))
}

/// Fallback for unknown paths
async fn handle_not_found() -> Result<HttpResponse> {
    Err(ServerError::UnknownRoute)
}
