//! End-to-end tests for the relay
//!
//! Each test boots the router on an ephemeral port and drives it with real
//! WebSocket clients.

use drawguess_rs::client::{connect_and_register, RelayStream};
use drawguess_rs::game::{GameState, WordPool};
use drawguess_rs::room::Relay;
use drawguess_rs::websocket::{ClientMessage, ClientRole, ServerMessage};
use drawguess_rs::{app, AppState};
use futures_util::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::path::Path;
use std::time::Duration;
use tempfile::TempDir;
use tokio_tungstenite::tungstenite::Message;

async fn start_server(static_dir: &Path) -> (SocketAddr, AppState) {
    let pool = WordPool::new(vec!["banana", "cherry"]).unwrap();
    let game = GameState::with_initial_word(pool, "banana").unwrap();
    let state = AppState::new(Relay::new(game));
    let router = app(state.clone(), static_dir);

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    (addr, state)
}

async fn join(addr: SocketAddr, role: ClientRole) -> RelayStream {
    let url = format!("ws://{}/ws", addr);
    let mut stream = connect_and_register(&url, role).await.unwrap();
    // Registration is confirmed by the game_state reply
    match recv(&mut stream).await {
        ServerMessage::GameState {
            current_word,
            is_game_active,
        } => {
            assert_eq!(current_word, "banana");
            assert!(is_game_active);
        }
        other => panic!("expected game_state, got {:?}", other),
    }
    stream
}

async fn send(stream: &mut RelayStream, msg: ClientMessage) {
    stream
        .send(Message::Text(msg.to_json().unwrap()))
        .await
        .unwrap();
}

async fn recv(stream: &mut RelayStream) -> ServerMessage {
    loop {
        let next = tokio::time::timeout(Duration::from_secs(5), stream.next())
            .await
            .expect("timed out waiting for server message")
            .expect("stream ended")
            .unwrap();
        if let Message::Text(text) = next {
            return ServerMessage::parse(&text).unwrap();
        }
    }
}

async fn assert_silent(stream: &mut RelayStream) {
    let next = tokio::time::timeout(Duration::from_millis(200), stream.next()).await;
    assert!(next.is_err(), "unexpected message: {:?}", next);
}

fn draw(x: i32, y: i32) -> ClientMessage {
    ClientMessage::Draw {
        x,
        y,
        drawing: true,
        color: None,
    }
}

/// Drawer draws, guesser misses then hits, round resets
#[tokio::test]
async fn test_full_round() {
    let static_dir = TempDir::new().unwrap();
    let (addr, _state) = start_server(static_dir.path()).await;

    let mut drawer = join(addr, ClientRole::Drawer).await;
    let mut guesser = join(addr, ClientRole::Guesser).await;

    send(&mut drawer, draw(10, 10)).await;
    send(&mut drawer, draw(50, 50)).await;

    for _ in 0..2 {
        match recv(&mut guesser).await {
            ServerMessage::CanvasUpdate { canvas } => assert!(!canvas.is_empty()),
            other => panic!("expected canvas_update, got {:?}", other),
        }
    }

    send(&mut guesser, ClientMessage::Guess { guess: "apple".into() }).await;
    for stream in [&mut drawer, &mut guesser] {
        match recv(stream).await {
            ServerMessage::GuessResult {
                guess, is_correct, ..
            } => {
                assert_eq!(guess, "apple");
                assert!(!is_correct);
            }
            other => panic!("expected guess_result, got {:?}", other),
        }
    }

    send(&mut guesser, ClientMessage::Guess { guess: "banana".into() }).await;
    for stream in [&mut drawer, &mut guesser] {
        match recv(stream).await {
            ServerMessage::GuessResult {
                is_correct,
                guesses,
                ..
            } => {
                assert!(is_correct);
                assert_eq!(guesses.len(), 2);
            }
            other => panic!("expected guess_result, got {:?}", other),
        }
        match recv(stream).await {
            ServerMessage::GameReset { current_word } => assert_eq!(current_word, "cherry"),
            other => panic!("expected game_reset, got {:?}", other),
        }
    }

    // Draw events never reach the drawer
    assert_silent(&mut drawer).await;
}

#[tokio::test]
async fn test_malformed_messages_keep_connection_open() {
    let static_dir = TempDir::new().unwrap();
    let (addr, _state) = start_server(static_dir.path()).await;
    let mut guesser = join(addr, ClientRole::Guesser).await;

    for junk in ["not json", r#"{"type":"dance"}"#, r#"{"type":"guess"}"#] {
        guesser.send(Message::Text(junk.to_string())).await.unwrap();
    }
    assert_silent(&mut guesser).await;

    send(&mut guesser, ClientMessage::Guess { guess: "kiwi".into() }).await;
    assert!(matches!(
        recv(&mut guesser).await,
        ServerMessage::GuessResult {
            is_correct: false,
            ..
        }
    ));
}

#[tokio::test]
async fn test_relayed_canvas_and_clear() {
    let static_dir = TempDir::new().unwrap();
    let (addr, state) = start_server(static_dir.path()).await;
    let mut drawer = join(addr, ClientRole::Drawer).await;
    let mut guesser = join(addr, ClientRole::Guesser).await;

    send(
        &mut drawer,
        ClientMessage::CanvasUpdate {
            canvas: Some("aGVsbG8=".to_string()),
        },
    )
    .await;
    assert_eq!(
        recv(&mut guesser).await,
        ServerMessage::CanvasUpdate {
            canvas: "aGVsbG8=".to_string()
        }
    );

    send(&mut drawer, draw(5, 5)).await;
    send(&mut drawer, draw(300, 200)).await;
    send(&mut drawer, ClientMessage::Clear).await;
    for _ in 0..3 {
        assert!(matches!(
            recv(&mut guesser).await,
            ServerMessage::CanvasUpdate { .. }
        ));
    }
    assert!(state.relay.read().await.game().canvas().is_blank());
    assert_silent(&mut drawer).await;
}

#[tokio::test]
async fn test_disconnect_removes_connection() {
    let static_dir = TempDir::new().unwrap();
    let (addr, state) = start_server(static_dir.path()).await;
    let mut drawer = join(addr, ClientRole::Drawer).await;
    let mut guesser = join(addr, ClientRole::Guesser).await;
    assert_eq!(state.relay.read().await.connection_count(), 2);

    guesser.close(None).await.unwrap();

    let mut remaining = 2;
    for _ in 0..50 {
        remaining = state.relay.read().await.connection_count();
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert_eq!(remaining, 1);

    // Broadcasting afterwards still works for the survivor
    send(&mut drawer, ClientMessage::Reset).await;
    assert!(matches!(
        recv(&mut drawer).await,
        ServerMessage::GameReset { .. }
    ));
}

#[tokio::test]
async fn test_serves_static_client() {
    let static_dir = TempDir::new().unwrap();
    std::fs::write(static_dir.path().join("index.html"), "<h1>drawguess</h1>").unwrap();
    let (addr, _state) = start_server(static_dir.path()).await;

    let body = reqwest::get(format!("http://{}/", addr))
        .await
        .unwrap()
        .text()
        .await
        .unwrap();
    assert!(body.contains("drawguess"));
}
