//! WebSocket endpoint for the realtime user-list feed.
//!
//! A connecting client lazily starts the process-wide broadcaster, receives a
//! one-off greeting, and from then on gets the periodic `user_response`
//! events forwarded from the feed channel. Incoming `echo` / `connect_event`
//! messages are answered to the same client only.

use axum::{
    extract::{
        State,
        ws::{Message, WebSocket, WebSocketUpgrade},
    },
    response::Response,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{debug, warn};

use super::AppState;
use crate::realtime::{FeedEvent, UserDto};

/// Server-to-client wire events: `{"event": ..., "data": ...}`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "event", content = "data", rename_all = "snake_case")]
pub enum ServerEvent {
    ServerResponse(serde_json::Value),
    UserResponse(Vec<UserDto>),
}

impl ServerEvent {
    /// One-off greeting sent to a newly connected subscriber only. Distinct
    /// from the periodic `user_response` broadcast.
    #[must_use]
    pub fn greeting() -> Self {
        Self::ServerResponse(serde_json::json!("connected to user feed"))
    }
}

#[derive(Debug, Deserialize)]
struct ClientEvent {
    event: String,

    #[serde(default)]
    data: serde_json::Value,
}

pub async fn user_refresh(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

async fn handle_socket(mut socket: WebSocket, state: Arc<AppState>) {
    let broadcaster = state.broadcaster();
    broadcaster.ensure_started();
    let mut feed = broadcaster.subscribe();

    if !send_event(&mut socket, &ServerEvent::greeting()).await {
        return;
    }

    loop {
        tokio::select! {
            event = feed.recv() => match event {
                Ok(FeedEvent::UserList(users)) => {
                    if !send_event(&mut socket, &ServerEvent::UserResponse(users)).await {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(count)) => {
                    warn!("Feed subscriber lagged by {} events", count);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            },

            incoming = socket.recv() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let Some(reply) = answer_client_event(text.as_str()) {
                        if !send_event(&mut socket, &reply).await {
                            break;
                        }
                    }
                }
                Some(Ok(Message::Close(_))) | None => break,
                Some(Ok(_)) => {}
                Some(Err(e)) => {
                    debug!("WebSocket receive error: {}", e);
                    break;
                }
            },
        }
    }
}

/// Malformed or unknown client messages are dropped without escalating; the
/// feed keeps running regardless.
fn answer_client_event(text: &str) -> Option<ServerEvent> {
    let event: ClientEvent = match serde_json::from_str(text) {
        Ok(event) => event,
        Err(e) => {
            debug!("Ignoring malformed client message: {}", e);
            return None;
        }
    };

    match event.event.as_str() {
        // Echo back exactly what the client sent.
        "echo" | "connect_event" => Some(ServerEvent::ServerResponse(event.data)),
        other => {
            debug!("Ignoring unknown client event '{}'", other);
            None
        }
    }
}

async fn send_event(socket: &mut WebSocket, event: &ServerEvent) -> bool {
    let json = match serde_json::to_string(event) {
        Ok(json) => json,
        Err(e) => {
            warn!("Failed to serialize feed event: {}", e);
            return true;
        }
    };

    socket.send(Message::Text(json.into())).await.is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_greeting_is_server_response() {
        let json = serde_json::to_string(&ServerEvent::greeting()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["event"], "server_response");
    }

    #[test]
    fn test_user_response_wire_shape() {
        let event = ServerEvent::UserResponse(vec![UserDto {
            id: 1,
            username: "用户一".to_string(),
            email: "a@example.com".to_string(),
            status: true,
            role: false,
        }]);

        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&event).unwrap()).unwrap();
        assert_eq!(value["event"], "user_response");
        assert_eq!(value["data"][0]["username"], "用户一");
        assert_eq!(value["data"][0]["status"], true);
        assert_eq!(value["data"][0]["role"], false);
    }

    #[test]
    fn test_echo_is_answered_with_same_payload() {
        let reply = answer_client_event(r#"{"event": "echo", "data": {"n": 7}}"#).unwrap();
        let value: serde_json::Value =
            serde_json::from_str(&serde_json::to_string(&reply).unwrap()).unwrap();
        assert_eq!(value["event"], "server_response");
        assert_eq!(value["data"]["n"], 7);
    }

    #[test]
    fn test_malformed_and_unknown_events_are_dropped() {
        assert!(answer_client_event("not json").is_none());
        assert!(answer_client_event(r#"{"event": "mystery"}"#).is_none());
    }
}
