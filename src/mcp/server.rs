/// MCP server implementation that handles JSON-RPC communication
///
/// This module implements the actual MCP server that:
/// 1. Reads JSON-RPC requests from stdin, one per line
/// 2. Routes tool calls to the tracker services
/// 3. Writes JSON-RPC responses to stdout

use jsonrpc_core::ErrorCode;
use schemars::{schema_for, JsonSchema};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::{debug, error, info, warn};

use crate::mcp::protocol::*;
use crate::services::TrackerError;
use crate::tools::{self, *};
use crate::{AddictionTrackerServer, ServerError};

/// Build a tool definition whose input schema is derived from `P`
fn tool<P: JsonSchema>(name: &str, description: &str) -> ToolDefinition {
    ToolDefinition {
        name: name.to_string(),
        description: description.to_string(),
        input_schema: serde_json::to_value(schema_for!(P)).unwrap_or_else(|_| json!({"type": "object"})),
    }
}

/// Every tool this server exposes
pub fn tool_definitions() -> Vec<ToolDefinition> {
    vec![
        tool::<CreateAddictionParams>(
            "addiction_create",
            "Start tracking a new addiction; a reminder is scheduled based on its level",
        ),
        tool::<UpdateAddictionParams>(
            "addiction_update",
            "Change the name, description or level of an addiction",
        ),
        tool::<DeleteAddictionParams>(
            "addiction_delete",
            "Delete an addiction with all of its entries, streak and reminder",
        ),
        tool::<ListAddictionsParams>("addiction_list", "List all tracked addictions, newest first"),
        tool::<LogEntryParams>(
            "entry_log",
            "Log an occurrence of an addiction and update its streak",
        ),
        tool::<UpdateEntryParams>("entry_update", "Edit the notes, image or barcode of an entry"),
        tool::<DeleteEntryParams>("entry_delete", "Delete an entry and update the streak"),
        tool::<ListEntriesParams>("entry_list", "List logged entries, newest first"),
        tool::<StreakStatusParams>(
            "streak_status",
            "Show current and longest streaks for one or all addictions",
        ),
        tool::<ReminderIntervalParams>(
            "reminder_interval",
            "Show how often a level (or an addiction) triggers reminders",
        ),
        tool::<SignInParams>(
            "session_sign_in",
            "Sign in and restart reminders for all of the user's addictions",
        ),
        tool::<SignOutParams>("session_sign_out", "Cancel all reminders and sign out"),
    ]
}

/// Why a tool call did not produce a result
enum CallError {
    /// Arguments did not match the tool's schema
    InvalidParams(String),
    UnknownTool,
    /// The tool ran and failed
    Tool(TrackerError),
}

impl From<TrackerError> for CallError {
    fn from(e: TrackerError) -> Self {
        CallError::Tool(e)
    }
}

fn parse_args<P: DeserializeOwned>(args: Map<String, Value>) -> Result<P, CallError> {
    serde_json::from_value(Value::Object(args)).map_err(|e| CallError::InvalidParams(e.to_string()))
}

/// Tool responses carry a human-readable `message`
trait ToolMessage {
    fn into_message(self) -> String;
}

impl ToolMessage for String {
    fn into_message(self) -> String {
        self
    }
}

macro_rules! tool_message {
    ($($ty:ty),* $(,)?) => {
        $(impl ToolMessage for $ty {
            fn into_message(self) -> String {
                self.message
            }
        })*
    };
}

tool_message!(
    AddictionResponse,
    ListAddictionsResponse,
    LogEntryResponse,
    ListEntriesResponse,
    StreakStatusResponse,
    ReminderIntervalResponse,
);

/// MCP server that handles communication with clients
pub struct McpServer {
    tracker: AddictionTrackerServer,
    initialized: bool,
}

impl McpServer {
    pub fn new(tracker: AddictionTrackerServer) -> Self {
        Self {
            tracker,
            initialized: false,
        }
    }

    pub fn tracker(&self) -> &AddictionTrackerServer {
        &self.tracker
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Run the MCP server, handling JSON-RPC over stdin/stdout
    pub async fn run(&mut self) -> Result<(), ServerError> {
        info!("Starting MCP server, waiting for JSON-RPC requests...");

        let stdin = tokio::io::stdin();
        let mut reader = BufReader::new(stdin);
        let mut stdout = tokio::io::stdout();

        let mut line = String::new();

        loop {
            line.clear();

            match reader.read_line(&mut line).await {
                Ok(0) => {
                    info!("MCP server shutting down (stdin closed)");
                    break;
                }
                Ok(_) => {
                    if let Some(response) = self.handle_line(&line).await {
                        let response_str = serde_json::to_string(&response)?;

                        stdout.write_all(response_str.as_bytes()).await?;
                        stdout.write_all(b"\n").await?;
                        stdout.flush().await?;

                        debug!("Sent response: {}", response_str);
                    }
                }
                Err(e) => {
                    error!("Failed to read from stdin: {}", e);
                    break;
                }
            }
        }

        // Timers must not outlive the server
        if let Err(e) = self.tracker.reminders().cancel_all().await {
            warn!("Failed to cancel reminders on shutdown: {}", e);
        }
        Ok(())
    }

    /// Process a single line of JSON-RPC input
    ///
    /// Returns `None` for blank lines and notifications.
    pub async fn handle_line(&mut self, line: &str) -> Option<JsonRpcResponse> {
        let line = line.trim();
        if line.is_empty() {
            return None;
        }

        debug!("Processing request: {}", line);

        let request: JsonRpcRequest = match serde_json::from_str(line) {
            Ok(req) => req,
            Err(e) => {
                error!("Failed to parse JSON-RPC request: {}", e);
                return Some(JsonRpcResponse::error(
                    Value::Null,
                    ErrorCode::ParseError,
                    format!("Invalid JSON: {}", e),
                ));
            }
        };

        if request.is_notification() {
            self.handle_notification(&request.method);
            return None;
        }

        Some(self.handle_request(request).await)
    }

    fn handle_notification(&mut self, method: &str) {
        match method {
            "initialized" | "notifications/initialized" => self.initialized = true,
            other => debug!("Ignoring notification '{}'", other),
        }
    }

    async fn handle_request(&mut self, request: JsonRpcRequest) -> JsonRpcResponse {
        let id = request.id.unwrap_or(Value::Null);

        match request.method.as_str() {
            "initialize" => self.handle_initialize(id),
            "initialized" => {
                self.initialized = true;
                JsonRpcResponse::success(id, Value::Null)
            }
            "tools/list" => JsonRpcResponse::success(id, json!({ "tools": tool_definitions() })),
            "tools/call" => self.handle_tools_call(id, request.params).await,
            _ => JsonRpcResponse::error(
                id,
                ErrorCode::MethodNotFound,
                format!("Method '{}' not found", request.method),
            ),
        }
    }

    fn handle_initialize(&mut self, id: Value) -> JsonRpcResponse {
        info!("MCP client connected");

        let result = InitializeResult {
            protocol_version: MCP_VERSION.to_string(),
            capabilities: ServerCapabilities {
                tools: Some(ToolsCapability { list_changed: false }),
            },
            server_info: ServerInfo {
                name: "Addiction Tracker MCP".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
        };

        to_response(id, &result)
    }

    async fn handle_tools_call(&mut self, id: Value, params: Option<Value>) -> JsonRpcResponse {
        let tool_params: ToolCallParams = match params.map(serde_json::from_value) {
            Some(Ok(p)) => p,
            Some(Err(e)) => {
                return JsonRpcResponse::error(
                    id,
                    ErrorCode::InvalidParams,
                    format!("Invalid parameters: {}", e),
                );
            }
            None => {
                return JsonRpcResponse::error(id, ErrorCode::InvalidParams, "Missing parameters".to_string());
            }
        };

        let name = tool_params.name;
        match self.call_tool(&name, tool_params.arguments).await {
            Ok(text) => to_response(id, &ToolCallResult::success(text)),
            Err(CallError::InvalidParams(reason)) => JsonRpcResponse::error(
                id,
                ErrorCode::InvalidParams,
                format!("Invalid arguments for '{}': {}", name, reason),
            ),
            Err(CallError::UnknownTool) => to_response(id, &ToolCallResult::error(format!("Unknown tool: {}", name))),
            Err(CallError::Tool(e)) => {
                warn!("Tool '{}' failed: {}", name, e);
                to_response(id, &ToolCallResult::error(e.to_string()))
            }
        }
    }

    async fn call_tool(&self, name: &str, args: Map<String, Value>) -> Result<String, CallError> {
        let t = &self.tracker;

        let message = match name {
            "addiction_create" => tools::create_addiction(t.addictions(), parse_args(args)?).await?.into_message(),
            "addiction_update" => tools::update_addiction(t.addictions(), parse_args(args)?).await?.into_message(),
            "addiction_delete" => tools::delete_addiction(t.addictions(), parse_args(args)?).await?.into_message(),
            "addiction_list" => tools::list_addictions(t.addictions(), parse_args(args)?).await?.into_message(),
            "entry_log" => tools::log_entry(t.entries(), t.streaks(), parse_args(args)?).await?.into_message(),
            "entry_update" => tools::update_entry(t.entries(), parse_args(args)?).await?.into_message(),
            "entry_delete" => tools::delete_entry(t.entries(), t.streaks(), parse_args(args)?).await?.into_message(),
            "entry_list" => tools::list_entries(t.entries(), parse_args(args)?).await?.into_message(),
            "streak_status" => {
                tools::streak_status(t.addictions(), t.streaks(), parse_args(args)?).await?.into_message()
            }
            "reminder_interval" => {
                tools::reminder_interval(t.addictions(), t.reminders(), parse_args(args)?).await?.into_message()
            }
            "session_sign_in" => {
                tools::sign_in(t.sessions(), t.default_user(), parse_args(args)?).await?.into_message()
            }
            "session_sign_out" => tools::sign_out(t.sessions(), parse_args(args)?).await?.into_message(),
            _ => return Err(CallError::UnknownTool),
        };

        Ok(message)
    }
}

fn to_response<T: Serialize>(id: Value, result: &T) -> JsonRpcResponse {
    match serde_json::to_value(result) {
        Ok(value) => JsonRpcResponse::success(id, value),
        Err(e) => JsonRpcResponse::error(id, ErrorCode::InternalError, format!("Failed to encode result: {}", e)),
    }
}
