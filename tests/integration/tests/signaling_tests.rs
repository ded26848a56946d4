//! End-to-end tests for the signaling relay
//!
//! Each test spawns a real server on an ephemeral port and drives it with
//! WebSocket clients.

use anyhow::Result;
use integration_tests::{settle, TestServer};
use serde_json::json;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = TestServer::start().await?;

    let response = reqwest::get(format!("{}/health", server.base_url())).await?;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await?, "OK");

    Ok(())
}

#[tokio::test]
async fn pairing_fills_room_and_rejects_third() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.join(&json!("42")).await?;
    let joined = x.expect_type("joined").await?;
    assert_eq!(joined["count"], 1);

    let mut y = server.client().await?;
    y.join(&json!("42")).await?;
    let joined = y.expect_type("joined").await?;
    assert_eq!(joined["count"], 2);

    // The first-admitted member is told to initiate, never the newcomer
    x.expect_type("start-offer").await?;
    y.expect_silence().await?;

    let mut z = server.client().await?;
    z.join(&json!("42")).await?;
    z.expect_type("full").await?;

    // The room still holds exactly {x, y}: x's relay reaches y only
    x.send_json(&json!({ "type": "offer", "offer": { "sdp": "v=0" } }))
        .await?;
    y.expect_type("offer").await?;
    z.expect_silence().await?;

    Ok(())
}

#[tokio::test]
async fn relay_is_verbatim_without_echo() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.join(&json!("ice-room")).await?;
    x.expect_type("joined").await?;

    let mut y = server.client().await?;
    y.join(&json!("ice-room")).await?;
    y.expect_type("joined").await?;
    x.expect_type("start-offer").await?;

    // Odd spacing and field order must survive the relay untouched
    let raw = r#"{ "candidate": {"sdpMid":"0","sdpMLineIndex":0},"type":"ice" }"#;
    x.send_text(raw).await?;

    assert_eq!(y.recv_text().await?, raw);
    x.expect_silence().await?;

    Ok(())
}

#[tokio::test]
async fn disconnect_notifies_partner_and_resets_room() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.join(&json!("42")).await?;
    x.expect_type("joined").await?;

    let mut y = server.client().await?;
    y.join(&json!("42")).await?;
    y.expect_type("joined").await?;
    x.expect_type("start-offer").await?;

    y.close().await?;
    x.expect_type("partner-left").await?;

    // Once the last member leaves, the key starts fresh at count 1
    x.close().await?;
    settle().await;

    let mut w = server.client().await?;
    w.join(&json!("42")).await?;
    let joined = w.expect_type("joined").await?;
    assert_eq!(joined["count"], 1);

    Ok(())
}

#[tokio::test]
async fn rooms_are_isolated() -> Result<()> {
    let server = TestServer::start().await?;

    let mut a1 = server.client().await?;
    a1.join(&json!("room-a")).await?;
    a1.expect_type("joined").await?;

    let mut a2 = server.client().await?;
    a2.join(&json!("room-a")).await?;
    a2.expect_type("joined").await?;
    a1.expect_type("start-offer").await?;

    let mut b1 = server.client().await?;
    b1.join(&json!("room-b")).await?;
    b1.expect_type("joined").await?;

    a1.send_json(&json!({ "type": "answer", "answer": { "sdp": "v=0" } }))
        .await?;

    a2.expect_type("answer").await?;
    b1.expect_silence().await?;

    Ok(())
}

#[tokio::test]
async fn malformed_frames_do_not_kill_the_connection() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.send_text("not json at all").await?;
    x.send_text(r#"{"type":"chat","text":"hi"}"#).await?;
    x.send_json(&json!({ "type": "join", "room": "" })).await?;
    x.send_binary(&[0xde, 0xad, 0xbe, 0xef]).await?;
    x.expect_silence().await?;

    // The connection is still served afterwards
    x.join(&json!("42")).await?;
    let joined = x.expect_type("joined").await?;
    assert_eq!(joined["count"], 1);

    Ok(())
}

#[tokio::test]
async fn numeric_room_key_coerces_to_string() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.join(&json!(42)).await?;
    x.expect_type("joined").await?;

    // A string key with the same digits lands in the same room
    let mut y = server.client().await?;
    y.join(&json!("42")).await?;
    let joined = y.expect_type("joined").await?;
    assert_eq!(joined["count"], 2);
    x.expect_type("start-offer").await?;

    Ok(())
}

#[tokio::test]
async fn relay_before_join_is_dropped() -> Result<()> {
    let server = TestServer::start().await?;

    let mut y = server.client().await?;
    y.join(&json!("7")).await?;
    y.expect_type("joined").await?;

    let mut x = server.client().await?;
    x.send_json(&json!({ "type": "ice", "candidate": { "sdpMid": "0" } }))
        .await?;
    y.expect_silence().await?;

    // x can still join normally afterwards
    x.join(&json!("7")).await?;
    let joined = x.expect_type("joined").await?;
    assert_eq!(joined["count"], 2);
    y.expect_type("start-offer").await?;

    Ok(())
}

#[tokio::test]
async fn second_join_is_ignored() -> Result<()> {
    let server = TestServer::start().await?;

    let mut x = server.client().await?;
    x.join(&json!("a")).await?;
    x.expect_type("joined").await?;

    x.join(&json!("b")).await?;
    x.expect_silence().await?;

    // x was not moved into room "b"
    let mut y = server.client().await?;
    y.join(&json!("b")).await?;
    let joined = y.expect_type("joined").await?;
    assert_eq!(joined["count"], 1);

    Ok(())
}
