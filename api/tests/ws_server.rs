//! End-to-end tests over a real WebSocket connection.

use std::time::Duration;

use futures::{SinkExt, StreamExt};
use mempulse_api::{router, AppState, ServerConfig, WsState};
use mempulse_chain::{Block, ChainEvent, ChainState};
use serde_json::{json, Value};
use tokio::net::TcpListener;
use tokio::net::TcpStream;
use tokio::sync::mpsc;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

type Client = WebSocketStream<MaybeTlsStream<TcpStream>>;

async fn start_server(state: WsState) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, router(state)).await.expect("serve");
    });
    format!("ws://{addr}/ws")
}

async fn send_json(client: &mut Client, value: Value) {
    client
        .send(Message::text(value.to_string()))
        .await
        .expect("send");
}

async fn next_json(client: &mut Client) -> Value {
    loop {
        let msg = tokio::time::timeout(Duration::from_secs(5), client.next())
            .await
            .expect("timed out waiting for message")
            .expect("stream ended")
            .expect("websocket error");
        if let Message::Text(text) = msg {
            return serde_json::from_str(text.as_str()).expect("json");
        }
    }
}

/// Wants blocks, then waits for a pong so the subscription is applied.
async fn subscribe_blocks(client: &mut Client) {
    send_json(client, json!({"action": "want", "data": ["blocks"]})).await;
    send_json(client, json!({"action": "ping"})).await;
    assert_eq!(next_json(client).await["pong"], true);
}

fn make_block(height: u64) -> Block {
    Block {
        id: format!("{height:064x}"),
        height,
        timestamp: 1_713_571_767,
        tx_count: 1,
        size: 250,
        weight: 1000,
        previousblockhash: None,
    }
}

#[tokio::test]
async fn test_ping_then_block_broadcast() {
    let state = WsState::new(AppState::default());
    let url = start_server(state.clone()).await;
    let (mut client, _) = connect_async(url.as_str()).await.expect("connect");

    subscribe_blocks(&mut client).await;

    let dispatcher = state.dispatcher().expect("dispatcher");
    let delivered = dispatcher.on_new_block(&make_block(840_000), &[], &mut []).await;
    assert_eq!(delivered, 1);

    let message = next_json(&mut client).await;
    assert_eq!(message["block"]["height"], 840_000);
    assert!(message.get("txConfirmed").is_none());
}

#[tokio::test]
async fn test_init_returns_snapshot() {
    let mut chain = ChainState::new();
    chain.push_block(make_block(1));
    chain.push_block(make_block(2));
    chain.set_fiat_tick("BTCUSD", 64_000.0);
    let app_state = AppState::new(ServerConfig::default(), chain, "deadbeef".to_string());
    let url = start_server(WsState::new(app_state)).await;
    let (mut client, _) = connect_async(url.as_str()).await.expect("connect");

    send_json(&mut client, json!({"action": "init"})).await;
    let reply = next_json(&mut client).await;

    assert_eq!(reply["git-commit"], "deadbeef");
    assert_eq!(reply["conversions"], 64_000.0);
    assert_eq!(reply["blocks"].as_array().map(Vec::len), Some(2));
}

#[tokio::test]
async fn test_chain_events_reach_subscribed_clients() {
    let state = WsState::new(AppState::default());
    let url = start_server(state.clone()).await;
    let (mut subscribed, _) = connect_async(url.as_str()).await.expect("connect");
    let (mut idle, _) = connect_async(url.as_str()).await.expect("connect");

    subscribe_blocks(&mut subscribed).await;
    send_json(&mut idle, json!({"action": "ping"})).await;
    assert_eq!(next_json(&mut idle).await["pong"], true);

    let dispatcher = state.dispatcher().expect("dispatcher");
    let (tx, rx) = mpsc::channel(8);
    let task = tokio::spawn(async move { dispatcher.run(rx).await });

    tx.send(ChainEvent::NewBlock {
        block: make_block(7),
        txids: Vec::new(),
        transactions: Vec::new(),
    })
    .await
    .expect("send event");

    let message = next_json(&mut subscribed).await;
    assert_eq!(message["block"]["height"], 7);

    drop(tx);
    task.await.expect("dispatcher task");

    let idle_next = tokio::time::timeout(Duration::from_millis(200), idle.next()).await;
    assert!(idle_next.is_err());
}
