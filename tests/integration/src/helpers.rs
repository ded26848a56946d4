//! Test helpers for integration tests
//!
//! Provides utilities for spawning a real signaling server on an ephemeral
//! port and driving it with WebSocket clients.

use std::net::SocketAddr;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use futures_util::{SinkExt, StreamExt};
use serde_json::Value;
use signal_common::{AppConfig, AppSettings, Environment, ServerConfig};
use signal_gateway::server::{create_app, GatewayState};
use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinHandle;
use tokio::time::timeout;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// Timeout for a single expected message
const RECV_TIMEOUT: Duration = Duration::from_secs(2);

/// How long to wait when asserting that nothing arrives
const SILENCE_WINDOW: Duration = Duration::from_millis(250);

/// Create a test configuration (ephemeral port, development logging)
pub fn test_config() -> AppConfig {
    AppConfig {
        app: AppSettings {
            name: "signal-relay-test".to_string(),
            env: Environment::Development,
        },
        gateway: ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 0,
        },
    }
}

/// Test server instance that manages lifecycle
pub struct TestServer {
    pub addr: SocketAddr,
    _handle: JoinHandle<()>,
}

impl TestServer {
    /// Start a new test server on an ephemeral port
    pub async fn start() -> Result<Self> {
        let state = GatewayState::new(test_config());
        let app = create_app(state);

        let listener = TcpListener::bind("127.0.0.1:0")
            .await
            .context("failed to bind test listener")?;
        let addr = listener.local_addr()?;

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.ok();
        });

        // Give the server a moment to start accepting
        tokio::time::sleep(Duration::from_millis(50)).await;

        Ok(Self {
            addr,
            _handle: handle,
        })
    }

    /// WebSocket URL of the signaling endpoint
    pub fn ws_url(&self) -> String {
        format!("ws://{}/signal", self.addr)
    }

    /// HTTP base URL for the server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Connect a new WebSocket client to this server
    pub async fn client(&self) -> Result<WsClient> {
        WsClient::connect(&self.ws_url()).await
    }
}

/// A WebSocket client for driving the signaling server
pub struct WsClient {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

impl WsClient {
    /// Connect to the given WebSocket URL
    pub async fn connect(url: &str) -> Result<Self> {
        let (stream, _response) = connect_async(url)
            .await
            .context("failed to connect WebSocket client")?;
        Ok(Self { stream })
    }

    /// Send raw text
    pub async fn send_text(&mut self, text: &str) -> Result<()> {
        self.stream.send(Message::Text(text.to_string())).await?;
        Ok(())
    }

    /// Send a binary frame (not part of the protocol; servers drop it)
    pub async fn send_binary(&mut self, bytes: &[u8]) -> Result<()> {
        self.stream.send(Message::Binary(bytes.to_vec())).await?;
        Ok(())
    }

    /// Send a JSON value as text
    pub async fn send_json(&mut self, value: &Value) -> Result<()> {
        self.send_text(&value.to_string()).await
    }

    /// Send a join request for the given room key
    pub async fn join(&mut self, room: &Value) -> Result<()> {
        self.send_json(&serde_json::json!({ "type": "join", "room": room }))
            .await
    }

    /// Receive the next text frame, skipping control frames
    pub async fn recv_text(&mut self) -> Result<String> {
        loop {
            let msg = timeout(RECV_TIMEOUT, self.stream.next())
                .await
                .context("timed out waiting for a message")?
                .context("connection closed while waiting for a message")??;

            match msg {
                Message::Text(text) => return Ok(text),
                Message::Ping(_) | Message::Pong(_) => {}
                other => bail!("unexpected frame: {other:?}"),
            }
        }
    }

    /// Receive the next text frame parsed as JSON
    pub async fn recv_json(&mut self) -> Result<Value> {
        let text = self.recv_text().await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Receive the next frame and assert its `type` field
    pub async fn expect_type(&mut self, expected: &str) -> Result<Value> {
        let msg = self.recv_json().await?;
        let ty = msg
            .get("type")
            .and_then(Value::as_str)
            .context("message without a type field")?;
        if ty != expected {
            bail!("expected type {expected:?}, got {msg}");
        }
        Ok(msg)
    }

    /// Assert that no frame arrives within the silence window
    pub async fn expect_silence(&mut self) -> Result<()> {
        match timeout(SILENCE_WINDOW, self.stream.next()).await {
            Err(_elapsed) => Ok(()),
            Ok(Some(Ok(Message::Ping(_) | Message::Pong(_)))) => Ok(()),
            Ok(frame) => bail!("expected silence, got {frame:?}"),
        }
    }

    /// Close the connection
    pub async fn close(mut self) -> Result<()> {
        self.stream.close(None).await?;
        Ok(())
    }
}

/// Wait for server-side state to settle after disconnects
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}
