use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Path, State,
    },
    http::StatusCode,
    response::IntoResponse,
};
use mongodb::bson::oid::ObjectId;

use tokio::time::{interval, Duration};

use crate::AppState;

// GET /ws/alerts/:user_id
pub async fn ws_alerts(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> impl IntoResponse {
    let owner = match ObjectId::parse_str(&user_id) {
        Ok(x) => x,
        Err(_) => return (StatusCode::BAD_REQUEST, "invalid user id").into_response(),
    };

    ws.on_upgrade(move |socket| handle_alerts_socket(socket, state, owner))
}

async fn handle_alerts_socket(mut socket: WebSocket, state: AppState, owner: ObjectId) {
    let (session_id, mut rx) = state.sessions.register(owner);

    tracing::info!(owner = %owner.to_hex(), session_id, "WS session connected");

    // Ping browser to keep alive
    let mut ping = interval(Duration::from_secs(25));

    loop {
        tokio::select! {
            _ = ping.tick() => {
                if socket.send(Message::Ping(b"ping".to_vec())).await.is_err() {
                    break;
                }
            }

            event = rx.recv() => {
                match event {
                    Some(payload) => {
                        if socket.send(Message::Text(payload)).await.is_err() {
                            break;
                        }
                    }
                    // registry shut down, no more events will arrive
                    None => break,
                }
            }

            client_msg = socket.recv() => {
                match client_msg {
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Ok(_)) => {}
                    Some(Err(_)) => break,
                }
            }
        }
    }

    state.sessions.deregister(owner, session_id);
    tracing::info!(owner = %owner.to_hex(), session_id, "WS session closed");

    let _ = socket.close().await;
}
