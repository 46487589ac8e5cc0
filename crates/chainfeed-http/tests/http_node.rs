//! End-to-end tests against an in-process HTTP JSON-RPC node.
//!
//! The node is a bare `TcpListener` answering one request per connection,
//! which is all `reqwest` needs when the response says `Connection: close`.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use alloy_primitives::Address;
use futures::StreamExt;
use serde_json::{json, Value};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

use chainfeed_core::{FeedConfig, LogFilter, LogSource};
use chainfeed_http::Connection;

// ─── Helpers ──────────────────────────────────────────────────────────────────

type Handler = Arc<dyn Fn(&str, &Value) -> Value + Send + Sync>;

struct TestNode {
    url: String,
    methods: Arc<Mutex<Vec<String>>>,
}

impl TestNode {
    async fn start(handler: Handler) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let url = format!("http://{}", listener.local_addr().unwrap());
        let methods = Arc::new(Mutex::new(Vec::new()));

        let seen = methods.clone();
        tokio::spawn(async move {
            while let Ok((socket, _)) = listener.accept().await {
                let handler = handler.clone();
                let seen = seen.clone();
                tokio::spawn(async move {
                    let _ = answer(socket, handler, seen).await;
                });
            }
        });

        Self { url, methods }
    }

    fn methods(&self) -> Vec<String> {
        self.methods.lock().unwrap().clone()
    }
}

async fn answer(
    mut socket: TcpStream,
    handler: Handler,
    seen: Arc<Mutex<Vec<String>>>,
) -> std::io::Result<()> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 4096];

    let header_end = loop {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
        if let Some(pos) = buf.windows(4).position(|w| w == b"\r\n\r\n") {
            break pos + 4;
        }
    };

    let head = String::from_utf8_lossy(&buf[..header_end]).to_ascii_lowercase();
    let body_len: usize = head
        .lines()
        .find_map(|line| line.strip_prefix("content-length:"))
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(0);

    while buf.len() < header_end + body_len {
        let n = socket.read(&mut chunk).await?;
        if n == 0 {
            return Ok(());
        }
        buf.extend_from_slice(&chunk[..n]);
    }

    let req: Value = serde_json::from_slice(&buf[header_end..header_end + body_len])?;
    let method = req["method"].as_str().unwrap_or_default().to_string();
    seen.lock().unwrap().push(method.clone());
    let result = handler(&method, &req["params"]);

    let body = json!({ "jsonrpc": "2.0", "id": req["id"], "result": result }).to_string();
    let response = format!(
        "HTTP/1.1 200 OK\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{}",
        body.len(),
        body
    );
    socket.write_all(response.as_bytes()).await?;
    socket.shutdown().await
}

fn coinbase() -> Address {
    Address::repeat_byte(0xcb)
}

fn basic_node() -> Handler {
    Arc::new(|method: &str, _params: &Value| match method {
        "eth_coinbase" => json!(coinbase()),
        "net_version" => json!("3"),
        _ => Value::Null,
    })
}

// ─── Bootstrap ────────────────────────────────────────────────────────────────

#[tokio::test]
async fn connect_probes_and_selects_coinbase() {
    let node = TestNode::start(basic_node()).await;
    let config = FeedConfig::default().with_url(node.url.clone());

    let conn = Connection::connect(&config).await.unwrap();

    assert_eq!(conn.url(), node.url);
    assert_eq!(conn.network_id(), 3);
    assert_eq!(conn.account(), Some(coinbase()));
    assert_eq!(node.methods(), vec!["eth_coinbase", "net_version"]);
}

#[tokio::test]
async fn connect_to_closed_port_is_unreachable() {
    // Bind then drop to get a port nothing listens on.
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let url = format!("http://{}", listener.local_addr().unwrap());
    drop(listener);

    let err = Connection::connect(&FeedConfig::default().with_url(url.clone()))
        .await
        .unwrap_err();
    assert!(err.is_rpc_unreachable());
    assert_eq!(err.attempted_url(), Some(url.as_str()));
}

// ─── Filters ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn polled_filter_delivers_logs_and_uninstalls() {
    let polls = Arc::new(Mutex::new(0u32));
    let counter = polls.clone();
    let handler: Handler = Arc::new(move |method: &str, params: &Value| match method {
        "eth_coinbase" => json!(coinbase()),
        "net_version" => json!("1"),
        "eth_newFilter" => {
            assert_eq!(params[0]["fromBlock"], "latest");
            json!("0xf1")
        }
        "eth_getFilterChanges" => {
            assert_eq!(params[0], "0xf1");
            let mut n = counter.lock().unwrap();
            *n += 1;
            if *n == 1 {
                json!([{ "topics": ["0xaa", "0x2a"] }, { "topics": ["0xaa", "0x2b"] }])
            } else {
                json!([])
            }
        }
        "eth_uninstallFilter" => json!(true),
        _ => Value::Null,
    });
    let node = TestNode::start(handler).await;

    let config = FeedConfig {
        poll_interval_ms: 10,
        ..FeedConfig::default()
    }
    .with_url(node.url.clone());
    let conn = Connection::connect(&config).await.unwrap();

    let (handle, mut logs) = conn
        .log_source()
        .subscribe_logs(LogFilter::new().from_block("latest"))
        .await
        .unwrap()
        .into_parts();
    assert_eq!(handle.id(), "0xf1");

    let first = logs.next().await.unwrap().unwrap();
    let second = logs.next().await.unwrap().unwrap();
    assert_eq!(first["topics"][1], "0x2a");
    assert_eq!(second["topics"][1], "0x2b");

    handle.cancel();
    let end = tokio::time::timeout(Duration::from_secs(5), logs.next())
        .await
        .expect("stream should close after cancel");
    assert!(end.is_none());
    assert!(node.methods().iter().any(|m| m == "eth_uninstallFilter"));
}
