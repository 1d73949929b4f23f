/// MCP protocol layer
///
/// JSON-RPC message types plus the stdio server that routes tool calls to
/// the tracker services.

pub mod protocol;
pub mod server;

pub use server::{tool_definitions, McpServer};
