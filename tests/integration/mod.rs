/// End-to-end tests driving the server through JSON-RPC
mod mcp_workflow;
mod persistence;
