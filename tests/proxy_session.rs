//! Full MCP sessions over an in-memory duplex against a mock backend

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use kbridge::config::{Env, API_KEY_VAR, API_URL_VAR, CLIENT_NAME_VAR};
use kbridge::{serve, BackendClient, ProxyServer, SessionConfig};
use serde_json::{json, Value};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, DuplexStream, Lines, ReadHalf, WriteHalf};
use tokio::task::JoinHandle;
use wiremock::matchers::{body_partial_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

struct Session {
    lines: Lines<BufReader<ReadHalf<DuplexStream>>>,
    writer: WriteHalf<DuplexStream>,
    handle: JoinHandle<anyhow::Result<()>>,
}

impl Session {
    fn start(backend_url: &str) -> Self {
        let env = Env::from_pairs([
            (API_URL_VAR, backend_url),
            (API_KEY_VAR, "session-key"),
            (CLIENT_NAME_VAR, "github-copilot"),
        ]);
        let config = Arc::new(SessionConfig::from_env(&env).unwrap());
        let backend = BackendClient::from_config(config).unwrap();
        let server = ProxyServer::new(Arc::new(backend));

        let (client, server_io) = tokio::io::duplex(256 * 1024);
        let (server_read, server_write) = tokio::io::split(server_io);
        let handle = tokio::spawn(serve(server, server_read, server_write));

        let (client_read, writer) = tokio::io::split(client);
        Self {
            lines: BufReader::new(client_read).lines(),
            writer,
            handle,
        }
    }

    async fn send(&mut self, message: Value) {
        let mut line = serde_json::to_string(&message).unwrap();
        line.push('\n');
        self.writer.write_all(line.as_bytes()).await.unwrap();
    }

    async fn recv(&mut self) -> Value {
        let line = self.lines.next_line().await.unwrap().expect("transport closed");
        serde_json::from_str(&line).unwrap()
    }

    async fn close(mut self) {
        self.writer.shutdown().await.unwrap();
        self.handle.await.unwrap().unwrap();
    }
}

fn call(id: u64, tool: &str, request: &str) -> Value {
    json!({
        "jsonrpc": "2.0",
        "id": id,
        "method": "tools/call",
        "params": { "name": tool, "arguments": { "request": request } }
    })
}

fn text_of(response: &Value) -> &str {
    response["result"]["content"][0]["text"].as_str().unwrap()
}

async fn mount_routing(server: &MockServer, delay: Duration) {
    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({ "use_rag": true })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "from the knowledge base" }))
                .set_delay(delay),
        )
        .mount(server)
        .await;

    Mock::given(method("POST"))
        .and(path("/api/chat/message"))
        .and(body_partial_json(json!({ "use_rag": false })))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({ "message": "general answer" }))
                .set_delay(delay),
        )
        .mount(server)
        .await;
}

#[tokio::test]
async fn test_handshake_list_and_call() {
    let backend = MockServer::start().await;
    mount_routing(&backend, Duration::ZERO).await;
    let mut session = Session::start(&backend.uri());

    session
        .send(json!({
            "jsonrpc": "2.0",
            "id": 0,
            "method": "initialize",
            "params": {
                "protocolVersion": "2025-03-26",
                "capabilities": {},
                "clientInfo": { "name": "test-host", "version": "1.0" }
            }
        }))
        .await;
    let init = session.recv().await;
    assert_eq!(init["result"]["protocolVersion"], json!("2025-03-26"));

    session
        .send(json!({ "jsonrpc": "2.0", "method": "notifications/initialized" }))
        .await;

    session
        .send(json!({ "jsonrpc": "2.0", "id": 1, "method": "tools/list" }))
        .await;
    let list = session.recv().await;
    assert_eq!(list["id"], json!(1));
    assert_eq!(list["result"]["tools"].as_array().unwrap().len(), 2);

    session.send(call(2, "search_knowledge_base", "where?")).await;
    let resp = session.recv().await;
    assert_eq!(resp["id"], json!(2));
    assert_eq!(text_of(&resp), "from the knowledge base");

    session.send(call(3, "ask_question", "why?")).await;
    let resp = session.recv().await;
    assert_eq!(resp["id"], json!(3));
    assert_eq!(text_of(&resp), "general answer");

    session.close().await;
}

#[tokio::test]
async fn test_backend_error_is_tool_text() {
    let backend = MockServer::start().await;
    Mock::given(method("POST"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&backend)
        .await;
    let mut session = Session::start(&backend.uri());

    session.send(call(7, "ask_question", "q")).await;
    let resp = session.recv().await;

    assert_eq!(resp["id"], json!(7));
    assert!(resp.get("error").is_none());
    let text = text_of(&resp);
    assert!(text.starts_with("ERROR:"), "got: {}", text);
    assert!(text.contains("boom"));

    session.close().await;
}

#[tokio::test]
async fn test_unreachable_backend_is_tool_text() {
    let mut session = Session::start("http://127.0.0.1:1");

    session.send(call(1, "search_knowledge_base", "q")).await;
    let resp = session.recv().await;
    assert!(text_of(&resp).starts_with("ERROR:"));

    session.close().await;
}

#[tokio::test]
async fn test_concurrent_calls_keep_headers_and_fresh_conversations() {
    let backend = MockServer::start().await;
    let delay = Duration::from_millis(500);
    mount_routing(&backend, delay).await;
    let mut session = Session::start(&backend.uri());

    let started = Instant::now();
    let tools = ["ask_question", "search_knowledge_base"];
    for id in 0..6u64 {
        session
            .send(call(id, tools[(id % 2) as usize], &format!("question {}", id)))
            .await;
    }

    let mut answers = HashMap::new();
    for _ in 0..6 {
        let resp = session.recv().await;
        answers.insert(resp["id"].as_u64().unwrap(), text_of(&resp).to_string());
    }
    let elapsed = started.elapsed();

    // Six sequential calls would take at least 3s
    assert!(elapsed < delay * 4, "calls did not overlap: {:?}", elapsed);

    for (id, text) in &answers {
        let expected = if id % 2 == 0 {
            "general answer"
        } else {
            "from the knowledge base"
        };
        assert_eq!(text, expected, "call {}", id);
    }

    let received = backend.received_requests().await.unwrap();
    assert_eq!(received.len(), 6);
    for req in &received {
        assert_eq!(req.headers.get("x-api-key").unwrap(), "session-key");
        assert_eq!(req.headers.get("x-client-type").unwrap(), "github-copilot");
        let body: Value = req.body_json().unwrap();
        assert!(body["conversation_id"].is_null());
        assert!(body.as_object().unwrap().contains_key("conversation_id"));
    }

    session.close().await;
}
