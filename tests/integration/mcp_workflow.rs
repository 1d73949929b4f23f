/// JSON-RPC workflow tests against a real database file
use addiction_tracker::mcp::McpServer;
use addiction_tracker::*;
use serde_json::{json, Value};
use tempfile::TempDir;

struct Client {
    server: McpServer,
    next_id: u64,
    _dir: TempDir,
}

impl Client {
    async fn start() -> Self {
        let dir = tempfile::tempdir().expect("Failed to create temp dir");
        let tracker = AddictionTrackerServer::with_database(dir.path().join("tracker.db"), UserId::new())
            .await
            .expect("Failed to create server");

        Self {
            server: McpServer::new(tracker),
            next_id: 1,
            _dir: dir,
        }
    }

    async fn request(&mut self, method: &str, params: Value) -> Value {
        let id = self.next_id;
        self.next_id += 1;

        let line = json!({"jsonrpc": "2.0", "id": id, "method": method, "params": params}).to_string();
        let response = self.server.handle_line(&line).await.expect("expected a response");
        let response = serde_json::to_value(&response).unwrap();
        assert_eq!(response["id"], id);
        response
    }

    /// Call a tool and return (text, is_error)
    async fn call(&mut self, name: &str, arguments: Value) -> (String, bool) {
        let response = self
            .request("tools/call", json!({"name": name, "arguments": arguments}))
            .await;
        let result = &response["result"];
        (
            result["content"][0]["text"].as_str().unwrap_or_default().to_string(),
            result["isError"].as_bool().unwrap_or(true),
        )
    }
}

fn extract_id(text: &str, label: &str) -> String {
    text.lines()
        .find_map(|line| line.trim().strip_prefix(label))
        .map(|id| id.trim().to_string())
        .expect("id in tool output")
}

#[tokio::test]
async fn test_initialize_and_list_tools() {
    let mut client = Client::start().await;

    let init = client.request("initialize", json!({})).await;
    assert_eq!(init["result"]["protocolVersion"], "2024-11-05");

    assert!(client
        .server
        .handle_line(r#"{"jsonrpc":"2.0","method":"notifications/initialized"}"#)
        .await
        .is_none());
    assert!(client.server.is_initialized());

    let list = client.request("tools/list", json!({})).await;
    let names: Vec<&str> = list["result"]["tools"]
        .as_array()
        .unwrap()
        .iter()
        .map(|t| t["name"].as_str().unwrap())
        .collect();
    for expected in ["addiction_create", "entry_log", "streak_status", "session_sign_out"] {
        assert!(names.contains(&expected), "missing {}", expected);
    }
}

#[tokio::test]
async fn test_protocol_errors() {
    let mut client = Client::start().await;

    let bad_json = client.server.handle_line("{not json").await.unwrap();
    assert_eq!(serde_json::to_value(&bad_json).unwrap()["error"]["code"], -32700);

    let unknown = client.request("resources/list", json!({})).await;
    assert_eq!(unknown["error"]["code"], -32601);

    let bad_args = client
        .request("tools/call", json!({"name": "addiction_create", "arguments": {"level": 3}}))
        .await;
    assert_eq!(bad_args["error"]["code"], -32602);
}

#[tokio::test]
async fn test_create_log_and_streak() {
    let mut client = Client::start().await;

    let (text, is_error) = client
        .call("addiction_create", json!({"name": "Coffee", "level": 10}))
        .await;
    assert!(!is_error, "{}", text);
    assert!(text.contains("5 minutes"));
    let addiction_id = extract_id(&text, "Addiction ID:");

    let yesterday = (chrono::Utc::now() - chrono::Duration::days(1)).to_rfc3339();
    let (text, is_error) = client
        .call("entry_log", json!({"addiction_id": addiction_id, "entry_date": yesterday}))
        .await;
    assert!(!is_error, "{}", text);

    let (text, _) = client
        .call("entry_log", json!({"addiction_id": addiction_id, "notes": "after lunch"}))
        .await;
    assert!(text.contains("Current streak: 2 days"), "{}", text);

    let (text, is_error) = client.call("streak_status", json!({"addiction_id": addiction_id})).await;
    assert!(!is_error);
    assert!(text.contains("**Coffee**: 2 days (best 2)"), "{}", text);

    let (text, _) = client.call("entry_list", json!({"addiction_id": addiction_id})).await;
    assert!(text.contains("Showing 2 of 2"));
    assert!(text.contains("after lunch"));

    let (text, _) = client.call("reminder_interval", json!({"addiction_id": addiction_id})).await;
    assert!(text.contains("reminds you every 5 minutes"), "{}", text);
}

#[tokio::test]
async fn test_invalid_input_is_a_tool_error() {
    let mut client = Client::start().await;

    let (text, is_error) = client.call("addiction_create", json!({"name": "   "})).await;
    assert!(is_error);
    assert!(text.starts_with("Error:"));

    let (_, is_error) = client
        .call("entry_log", json!({"addiction_id": "not-a-uuid"}))
        .await;
    assert!(is_error);

    let (_, is_error) = client.call("reminder_interval", json!({})).await;
    assert!(is_error);
}

#[tokio::test]
async fn test_sign_out_requires_sign_in_again() {
    let mut client = Client::start().await;
    client.call("addiction_create", json!({"name": "Sugar", "level": 4})).await;
    assert_eq!(client.server.tracker().reminders().registry().active_count().await, 1);

    let (text, is_error) = client.call("session_sign_out", json!({})).await;
    assert!(!is_error);
    assert!(text.contains("Signed out"));
    assert_eq!(client.server.tracker().reminders().registry().active_count().await, 0);

    let (text, is_error) = client.call("addiction_list", json!({})).await;
    assert!(is_error);
    assert!(text.contains("Authentication required"));

    let (_, is_error) = client.call("session_sign_in", json!({})).await;
    assert!(!is_error);
    assert_eq!(client.server.tracker().reminders().registry().active_count().await, 1);

    let (text, _) = client.call("addiction_list", json!({})).await;
    assert!(text.contains("Sugar"));
}

#[tokio::test]
async fn test_delete_addiction_removes_entries() {
    let mut client = Client::start().await;

    let (text, _) = client.call("addiction_create", json!({"name": "Soda"})).await;
    let addiction_id = extract_id(&text, "Addiction ID:");
    client.call("entry_log", json!({"addiction_id": addiction_id})).await;

    let (text, is_error) = client.call("addiction_delete", json!({"addiction_id": addiction_id})).await;
    assert!(!is_error, "{}", text);

    let (text, _) = client.call("entry_list", json!({})).await;
    assert_eq!(text, "No entries logged yet.");
    assert_eq!(client.server.tracker().reminders().registry().active_count().await, 0);
}
