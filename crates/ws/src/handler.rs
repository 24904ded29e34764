//! The `/ws` endpoint: upgrade, first-message auth, subscription loop

use std::time::Duration;

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        FromRef, State,
    },
    response::Response,
};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::mpsc;
use uuid::Uuid;

use clubdesk_auth::AuthBackend;

use crate::registry::ConnectionRegistry;

/// How long a client has to send its auth frame after connecting.
const AUTH_TIMEOUT: Duration = Duration::from_secs(10);

/// First frame the client must send after the upgrade.
#[derive(Debug, Deserialize)]
struct AuthFrame {
    token: String,
}

/// Frames the client may send after authenticating.
#[derive(Debug, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
enum ClientAction {
    SubscribeTeam { team_id: Uuid },
    UnsubscribeTeam { team_id: Uuid },
    Ping,
}

/// **GET /ws**
///
/// Protocol:
/// 1. Client connects and sends `{"token": "<access token>"}` within 10s
/// 2. Server replies `{"type": "connected"}`
/// 3. Client sends `{"action": "subscribe_team", "team_id": "..."}`,
///    `unsubscribe_team` or `ping`; subscriptions are checked against the
///    caller's visibility scope
pub async fn websocket_handler<S>(ws: WebSocketUpgrade, State(state): State<S>) -> Response
where
    S: Send + Sync + Clone + 'static,
    AuthBackend: FromRef<S>,
    ConnectionRegistry: FromRef<S>,
{
    let auth = AuthBackend::from_ref(&state);
    let registry = ConnectionRegistry::from_ref(&state);
    ws.on_upgrade(move |socket| handle_socket(socket, auth, registry))
}

async fn handle_socket(mut socket: WebSocket, auth: AuthBackend, registry: ConnectionRegistry) {
    // First frame must be the auth token.
    let first = match tokio::time::timeout(AUTH_TIMEOUT, socket.recv()).await {
        Ok(Some(Ok(Message::Text(text)))) => text,
        _ => {
            let _ = socket
                .send(error_frame("Expected auth message"))
                .await;
            return;
        }
    };

    let identity = match serde_json::from_str::<AuthFrame>(first.as_str()) {
        Ok(frame) => match auth.authenticate(&frame.token).await {
            Ok(identity) => identity,
            Err(_) => {
                let _ = socket
                    .send(error_frame("Could not validate credentials"))
                    .await;
                return;
            }
        },
        Err(_) => {
            let _ = socket.send(error_frame("Expected auth message")).await;
            return;
        }
    };

    let scope = match auth.scope_for(&identity).await {
        Ok(scope) => scope,
        Err(e) => {
            tracing::error!(user_id = %identity.id, error = %e, "failed to derive scope");
            let _ = socket.send(error_frame("Internal error")).await;
            return;
        }
    };

    let user_id = identity.id;
    let (tx, mut rx) = mpsc::unbounded_channel::<String>();
    registry.connect(user_id, tx.clone()).await;
    tracing::info!(%user_id, "websocket connected");

    let _ = tx.send(json!({"type": "connected"}).to_string());

    let (mut sink, mut stream) = socket.split();

    // Forward queued payloads to the socket until the sender side is dropped.
    let forward = tokio::spawn(async move {
        while let Some(payload) = rx.recv().await {
            if sink.send(Message::Text(payload.into())).await.is_err() {
                break;
            }
        }
    });

    while let Some(message) = stream.next().await {
        let text = match message {
            Ok(Message::Text(text)) => text,
            Ok(Message::Close(_)) | Err(_) => break,
            Ok(_) => continue,
        };

        let action = match serde_json::from_str::<ClientAction>(text.as_str()) {
            Ok(action) => action,
            Err(_) => {
                let _ = tx.send(
                    json!({"type": "error", "message": "Unknown action"}).to_string(),
                );
                continue;
            }
        };

        match action {
            ClientAction::SubscribeTeam { team_id } => {
                if scope.allows_team(Some(team_id)) {
                    registry.subscribe(user_id, team_id).await;
                    let _ = tx.send(
                        json!({"type": "subscribed", "team_id": team_id}).to_string(),
                    );
                } else {
                    let _ = tx.send(
                        json!({"type": "error", "message": "Team not visible"}).to_string(),
                    );
                }
            }
            ClientAction::UnsubscribeTeam { team_id } => {
                registry.unsubscribe(user_id, team_id).await;
                let _ = tx.send(
                    json!({"type": "unsubscribed", "team_id": team_id}).to_string(),
                );
            }
            ClientAction::Ping => {
                let _ = tx.send(json!({"type": "pong"}).to_string());
            }
        }
    }

    registry.disconnect(user_id).await;
    forward.abort();
    tracing::info!(%user_id, "websocket disconnected");
}

fn error_frame(message: &str) -> Message {
    Message::Text(json!({"type": "error", "message": message}).to_string().into())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_action_parsing() {
        let team = Uuid::new_v4();
        let raw = format!(r#"{{"action": "subscribe_team", "team_id": "{team}"}}"#);
        let action: ClientAction = serde_json::from_str(&raw).unwrap();
        assert!(matches!(action, ClientAction::SubscribeTeam { team_id } if team_id == team));

        let action: ClientAction = serde_json::from_str(r#"{"action": "ping"}"#).unwrap();
        assert!(matches!(action, ClientAction::Ping));

        assert!(serde_json::from_str::<ClientAction>(r#"{"action": "nope"}"#).is_err());
    }

    #[test]
    fn test_auth_frame_parsing() {
        let frame: AuthFrame = serde_json::from_str(r#"{"token": "abc"}"#).unwrap();
        assert_eq!(frame.token, "abc");
    }
}
