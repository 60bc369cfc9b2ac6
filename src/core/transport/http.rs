//! HTTP transport implementation.
//!
//! HTTP server with JSON-RPC over POST requests, plus a few plain GET
//! endpoints describing the server. This allows standard HTTP clients
//! (curl, browsers, etc.) to communicate with the MCP server.

use axum::{
    Json, Router,
    extract::{DefaultBodyLimit, State, rejection::JsonRejection},
    response::{IntoResponse, Response},
    routing::{get, post},
};
use http::{HeaderValue, StatusCode};
use rmcp::ServerHandler;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use tower_http::cors::{AllowOrigin, Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{debug, info, instrument, warn};

use super::{TransportError, TransportResult, config::HttpConfig};
use crate::core::McpServer;
use crate::domains::resources::ResourceError;

/// JSON-RPC error codes used by this transport.
mod codes {
    pub const PARSE_ERROR: i32 = -32700;
    pub const INVALID_REQUEST: i32 = -32600;
    pub const METHOD_NOT_FOUND: i32 = -32601;
    pub const INVALID_PARAMS: i32 = -32602;
    pub const INTERNAL_ERROR: i32 = -32603;
    pub const RESOURCE_NOT_FOUND: i32 = -32002;
}

/// HTTP transport handler.
pub struct HttpTransport {
    config: HttpConfig,
}

/// JSON-RPC request structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcRequest {
    pub jsonrpc: String,
    #[serde(default)]
    pub id: Option<Value>,
    pub method: String,
    #[serde(default)]
    pub params: Option<Value>,
}

/// JSON-RPC response structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcResponse {
    pub jsonrpc: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<JsonRpcError>,
}

/// JSON-RPC error structure.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JsonRpcError {
    pub code: i32,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

impl JsonRpcResponse {
    /// Create a success response.
    pub fn success(id: Option<Value>, result: Value) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Create an error response.
    pub fn error(id: Option<Value>, code: i32, message: impl Into<String>) -> Self {
        Self {
            jsonrpc: "2.0".to_string(),
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.into(),
                data: None,
            }),
        }
    }

    /// Parse error.
    pub fn parse_error(msg: impl Into<String>) -> Self {
        Self::error(None, codes::PARSE_ERROR, msg)
    }

    /// Method not found error.
    pub fn method_not_found(id: Option<Value>) -> Self {
        Self::error(id, codes::METHOD_NOT_FOUND, "Method not found")
    }

    /// Invalid request error.
    pub fn invalid_request(id: Option<Value>) -> Self {
        Self::error(id, codes::INVALID_REQUEST, "Invalid Request")
    }

    /// Invalid params error.
    pub fn invalid_params(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, codes::INVALID_PARAMS, msg)
    }

    /// Internal error.
    pub fn internal_error(id: Option<Value>, msg: impl Into<String>) -> Self {
        Self::error(id, codes::INTERNAL_ERROR, msg)
    }

    /// Serialize `value` as the result, or report an internal error.
    fn from_serializable<T: Serialize>(id: Option<Value>, value: &T) -> Self {
        match serde_json::to_value(value) {
            Ok(result) => Self::success(id, result),
            Err(e) => Self::internal_error(id, e.to_string()),
        }
    }
}

/// Application state shared across HTTP handlers.
#[derive(Clone)]
pub struct AppState {
    /// The MCP server instance.
    server: McpServer,
    /// Path of the JSON-RPC endpoint, reported by the info endpoints.
    rpc_path: String,
}

impl AppState {
    pub fn new(server: McpServer, rpc_path: impl Into<String>) -> Self {
        Self {
            server,
            rpc_path: rpc_path.into(),
        }
    }
}

fn cors_layer(origins: &[String]) -> Option<CorsLayer> {
    if origins.is_empty() {
        return None;
    }
    let allow_origin = if origins.iter().any(|o| o == "*") {
        AllowOrigin::from(Any)
    } else {
        let values: Vec<HeaderValue> = origins
            .iter()
            .filter_map(|origin| match HeaderValue::from_str(origin) {
                Ok(value) => Some(value),
                Err(_) => {
                    warn!("Ignoring invalid CORS origin: {}", origin);
                    None
                }
            })
            .collect();
        AllowOrigin::list(values)
    };
    Some(
        CorsLayer::new()
            .allow_origin(allow_origin)
            .allow_methods(Any)
            .allow_headers(Any),
    )
}

/// Build the axum router for the given server and settings.
pub fn router(server: McpServer, config: &HttpConfig) -> Router {
    let state = AppState::new(server, config.rpc_path.clone());

    let mut app = Router::new()
        .route(&config.rpc_path, post(handle_rpc))
        .route("/health", get(health_check))
        .route("/", get(root_handler))
        .route("/.well-known/mcp", get(well_known))
        .route("/.well-known/mcp/resources", get(well_known_resources))
        .route("/.well-known/mcp/tools", get(well_known_tools))
        .with_state(state)
        .layer(DefaultBodyLimit::max(config.max_request_size))
        .layer(TraceLayer::new_for_http());

    if let Some(cors) = cors_layer(&config.cors_origins) {
        app = app.layer(cors);
    }
    app
}

impl HttpTransport {
    /// Create a new HTTP transport with the given config.
    pub fn new(config: HttpConfig) -> Self {
        Self { config }
    }

    /// Get the bind address.
    pub fn address(&self) -> String {
        format!("{}:{}", self.config.host, self.config.port)
    }

    /// Run the HTTP transport until the server stops.
    pub async fn run(self, server: McpServer) -> TransportResult<()> {
        let addr = self.address();
        let app = router(server, &self.config);

        let listener = tokio::net::TcpListener::bind(&addr)
            .await
            .map_err(|e| TransportError::bind(&addr, e))?;

        let cors_status = if self.config.cors_origins.is_empty() {
            "disabled".to_string()
        } else {
            self.config.cors_origins.join(", ")
        };
        info!(
            "Ready - listening on {} (JSON-RPC over HTTP, CORS {})",
            addr, cors_status
        );
        info!("  → JSON-RPC: POST {}", self.config.rpc_path);
        info!("  → Health:   GET /health");
        info!("  → Info:     GET /.well-known/mcp");

        axum::serve(listener, app)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| TransportError::http(e.to_string()))?;

        Ok(())
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

/// Root handler - provides API info.
async fn root_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({
        "name": state.server.name(),
        "version": state.server.version(),
        "transport": "HTTP",
        "endpoints": {
            "rpc": state.rpc_path,
            "health": "/health",
            "info": "/.well-known/mcp"
        },
        "protocol": "JSON-RPC 2.0",
        "documentation": format!("Send POST requests to {} with JSON-RPC messages", state.rpc_path)
    }))
}

/// Health check endpoint.
async fn health_check() -> impl IntoResponse {
    Json(json!({
        "status": "ok",
        "timestamp": chrono::Utc::now().to_rfc3339()
    }))
}

async fn resource_names(server: &McpServer) -> Vec<String> {
    server
        .list_resources()
        .await
        .into_iter()
        .map(|r| r.raw.name)
        .collect()
}

/// Server description with branding and the enabled capabilities.
async fn well_known(State(state): State<AppState>) -> impl IntoResponse {
    let branding = &state.server.config().branding;
    Json(json!({
        "name": branding.name,
        "description": branding.description,
        "version": state.server.version(),
        "branding": branding,
        "resources": resource_names(&state.server).await,
        "tools": state.server.tool_names(),
        "endpoints": { "rpc": state.rpc_path }
    }))
}

async fn well_known_resources(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "resources": resource_names(&state.server).await }))
}

async fn well_known_tools(State(state): State<AppState>) -> impl IntoResponse {
    Json(json!({ "tools": state.server.tool_names() }))
}

/// Handle JSON-RPC requests.
#[instrument(skip_all, fields(method))]
async fn handle_rpc(
    State(state): State<AppState>,
    request: Result<Json<JsonRpcRequest>, JsonRejection>,
) -> Response {
    let Json(request) = match request {
        Ok(request) => request,
        Err(rejection) if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE => {
            warn!("Rejected oversized request");
            return rejection.into_response();
        }
        Err(rejection) => {
            warn!("Malformed JSON-RPC request: {}", rejection.body_text());
            return Json(JsonRpcResponse::parse_error(rejection.body_text())).into_response();
        }
    };

    tracing::Span::current().record("method", request.method.as_str());
    info!("Received JSON-RPC request: {}", request.method);

    if request.method.starts_with("notifications/") {
        handle_notification(&request);
        if request.id.is_none() {
            return StatusCode::ACCEPTED.into_response();
        }
        return Json(JsonRpcResponse::success(request.id, Value::Null)).into_response();
    }

    let response = process_request(&state, request).await;
    (StatusCode::OK, Json(response)).into_response()
}

/// Process a JSON-RPC request and return the response.
async fn process_request(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    if request.jsonrpc != "2.0" {
        return JsonRpcResponse::invalid_request(request.id);
    }

    match request.method.as_str() {
        "initialize" => handle_initialize(state, request).await,
        "ping" => JsonRpcResponse::success(request.id, json!({})),
        "tools/list" => handle_tools_list(state, request).await,
        "tools/call" => handle_tools_call(state, request).await,
        "resources/list" => handle_resources_list(state, request).await,
        "resources/templates/list" => handle_resources_templates_list(state, request).await,
        "resources/read" => handle_resources_read(state, request).await,
        "prompts/list" => handle_prompts_list(state, request).await,
        "prompts/get" => handle_prompts_get(state, request).await,
        _ => {
            warn!("Unknown method: {}", request.method);
            JsonRpcResponse::method_not_found(request.id)
        }
    }
}

/// Extract a required string parameter.
fn string_param(params: &Option<Value>, key: &str) -> Option<String> {
    params
        .as_ref()
        .and_then(|p| p.get(key))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Handle initialize request.
async fn handle_initialize(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let info = state.server.get_info();
    if let Some(version) = string_param(&request.params, "protocolVersion") {
        debug!("Client requested protocol version {}", version);
    }
    JsonRpcResponse::from_serializable(request.id, &info)
}

async fn handle_tools_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let tools = state.server.list_tools();
    JsonRpcResponse::from_serializable(request.id, &json!({ "tools": tools }))
}

async fn handle_tools_call(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(name) = string_param(&request.params, "name") else {
        return JsonRpcResponse::invalid_params(request.id, "Missing tool name");
    };
    let arguments = request
        .params
        .as_ref()
        .and_then(|p| p.get("arguments"))
        .cloned()
        .unwrap_or_else(|| json!({}));

    match state.server.call_tool(&name, arguments).await {
        Ok(result) => JsonRpcResponse::from_serializable(request.id, &result),
        Err(e) => JsonRpcResponse::invalid_params(request.id, e.to_string()),
    }
}

async fn handle_resources_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let resources = state.server.list_resources().await;
    JsonRpcResponse::from_serializable(request.id, &json!({ "resources": resources }))
}

async fn handle_resources_templates_list(
    state: &AppState,
    request: JsonRpcRequest,
) -> JsonRpcResponse {
    let templates = state.server.list_resource_templates().await;
    JsonRpcResponse::from_serializable(request.id, &json!({ "resourceTemplates": templates }))
}

async fn handle_resources_read(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(uri) = string_param(&request.params, "uri") else {
        return JsonRpcResponse::invalid_params(request.id, "Missing resource URI");
    };

    match state.server.read_resource(&uri).await {
        Ok(result) => JsonRpcResponse::from_serializable(request.id, &result),
        Err(e @ ResourceError::NotFound(_)) => {
            JsonRpcResponse::error(request.id, codes::RESOURCE_NOT_FOUND, e.to_string())
        }
        Err(e @ ResourceError::InvalidUri(_)) => {
            JsonRpcResponse::invalid_params(request.id, e.to_string())
        }
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

async fn handle_prompts_list(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let prompts = state.server.list_prompts().await;
    JsonRpcResponse::from_serializable(request.id, &json!({ "prompts": prompts }))
}

async fn handle_prompts_get(state: &AppState, request: JsonRpcRequest) -> JsonRpcResponse {
    let Some(name) = string_param(&request.params, "name") else {
        return JsonRpcResponse::invalid_params(request.id, "Missing prompt name");
    };
    let arguments = request
        .params
        .as_ref()
        .and_then(|p| p.get("arguments"))
        .and_then(Value::as_object)
        .cloned();

    match state.server.get_prompt(&name, arguments).await {
        Ok(result) => JsonRpcResponse::from_serializable(request.id, &result),
        Err(e) if e.is_client_error() => {
            JsonRpcResponse::invalid_params(request.id, e.to_string())
        }
        Err(e) => JsonRpcResponse::internal_error(request.id, e.to_string()),
    }
}

/// Handle notifications (no response body needed).
fn handle_notification(request: &JsonRpcRequest) {
    match request.method.as_str() {
        "notifications/initialized" => info!("Client initialized"),
        _ => debug!("Received notification: {}", request.method),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::Config;
    use axum::body::Body;
    use http::{Request, header};
    use http_body_util::BodyExt;
    use tempfile::TempDir;
    use tower::ServiceExt;

    fn app(dir: &TempDir, http: HttpConfig) -> Router {
        let mut config = Config::default();
        config.resources.docs_dir = dir.path().join("docs");
        config.prompts.prompts_dir = dir.path().join("prompts");
        router(McpServer::new(config), &http)
    }

    async fn body_json(response: Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    async fn rpc(app: Router, body: Value) -> Value {
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        body_json(response).await
    }

    #[tokio::test]
    async fn test_health() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, HttpConfig::default())
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["status"], "ok");
    }

    #[tokio::test]
    async fn test_well_known() {
        let dir = TempDir::new().unwrap();
        let response = app(&dir, HttpConfig::default())
            .oneshot(Request::get("/.well-known/mcp").body(Body::empty()).unwrap())
            .await
            .unwrap();
        let body = body_json(response).await;
        assert_eq!(body["name"], "Aytch4K MCP");
        assert_eq!(body["tools"], json!(["echo", "weather", "calculator"]));
        assert_eq!(body["resources"], json!(["system_info", "documentation"]));
        assert_eq!(body["branding"]["primary_color"], "#4A90E2");

        let response = app(&dir, HttpConfig::default())
            .oneshot(Request::get("/.well-known/mcp/tools").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(body_json(response).await["tools"][2], "calculator");
    }

    #[tokio::test]
    async fn test_initialize() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}}),
        )
        .await;
        assert_eq!(body["id"], 1);
        assert_eq!(body["result"]["serverInfo"]["name"], "aytch-mcp");
        assert!(body["result"]["capabilities"]["tools"].is_object());
    }

    #[tokio::test]
    async fn test_tools_call_calculator() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({
                "jsonrpc": "2.0", "id": 7, "method": "tools/call",
                "params": {"name": "calculator", "arguments": {"expression": "2^10"}}
            }),
        )
        .await;
        assert_eq!(body["result"]["structuredContent"]["result"], 1024);
        assert_eq!(body["result"]["isError"], false);
    }

    #[tokio::test]
    async fn test_tools_call_unknown_tool() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({
                "jsonrpc": "2.0", "id": 2, "method": "tools/call",
                "params": {"name": "teleport", "arguments": {}}
            }),
        )
        .await;
        assert_eq!(body["error"]["code"], codes::INVALID_PARAMS);
    }

    #[tokio::test]
    async fn test_resources_read_not_found() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({
                "jsonrpc": "2.0", "id": 3, "method": "resources/read",
                "params": {"uri": "nothing://here"}
            }),
        )
        .await;
        assert_eq!(body["error"]["code"], codes::RESOURCE_NOT_FOUND);
    }

    #[tokio::test]
    async fn test_prompts_get_missing_argument() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({
                "jsonrpc": "2.0", "id": 4, "method": "prompts/get",
                "params": {"name": "calculate"}
            }),
        )
        .await;
        assert_eq!(body["error"]["code"], codes::INVALID_PARAMS);
        assert!(body["error"]["message"].as_str().unwrap().contains("problem"));
    }

    #[tokio::test]
    async fn test_unknown_method_and_bad_version() {
        let dir = TempDir::new().unwrap();
        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({"jsonrpc": "2.0", "id": 5, "method": "nope"}),
        )
        .await;
        assert_eq!(body["error"]["code"], codes::METHOD_NOT_FOUND);

        let body = rpc(
            app(&dir, HttpConfig::default()),
            json!({"jsonrpc": "1.0", "id": 6, "method": "tools/list"}),
        )
        .await;
        assert_eq!(body["error"]["code"], codes::INVALID_REQUEST);
    }

    #[tokio::test]
    async fn test_notification_is_accepted() {
        let dir = TempDir::new().unwrap();
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                json!({"jsonrpc": "2.0", "method": "notifications/initialized"}).to_string(),
            ))
            .unwrap();
        let response = app(&dir, HttpConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::ACCEPTED);
    }

    #[tokio::test]
    async fn test_initialize_is_stateless() {
        let dir = TempDir::new().unwrap();
        let app = app(&dir, HttpConfig::default());
        let initialize = json!({"jsonrpc": "2.0", "id": 1, "method": "initialize", "params": {}});

        let first = rpc(app.clone(), initialize.clone()).await;
        let second = rpc(app.clone(), initialize).await;
        assert_eq!(first["result"], second["result"]);

        let notification = json!({"jsonrpc": "2.0", "id": 9, "method": "notifications/initialized"});
        let body = rpc(app, notification).await;
        assert_eq!(body["id"], 9);
        assert!(body["result"].is_null());
    }

    #[tokio::test]
    async fn test_malformed_json_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{ not json"))
            .unwrap();
        let response = app(&dir, HttpConfig::default()).oneshot(request).await.unwrap();
        assert_eq!(body_json(response).await["error"]["code"], codes::PARSE_ERROR);
    }

    #[tokio::test]
    async fn test_body_limit() {
        let dir = TempDir::new().unwrap();
        let http = HttpConfig {
            max_request_size: 64,
            ..HttpConfig::default()
        };
        let big = json!({"jsonrpc": "2.0", "id": 1, "method": "x".repeat(200)});
        let request = Request::post("/mcp")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(big.to_string()))
            .unwrap();
        let response = app(&dir, http).oneshot(request).await.unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }

    #[tokio::test]
    async fn test_cors_origin_list() {
        let dir = TempDir::new().unwrap();
        let http = HttpConfig {
            cors_origins: vec!["https://app.example".to_string()],
            ..HttpConfig::default()
        };
        let request = Request::get("/health")
            .header(header::ORIGIN, "https://app.example")
            .body(Body::empty())
            .unwrap();
        let response = app(&dir, http).oneshot(request).await.unwrap();
        assert_eq!(
            response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
            "https://app.example"
        );
    }
}
