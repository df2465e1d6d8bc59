//! WebSocket upgrade + message loop. Each client message is parsed as JSON and
//! forwarded to core logic. We reply with a single JSON message per request.

use std::sync::Arc;
use axum::{
  extract::{
    ws::{Message, WebSocket},
    State, WebSocketUpgrade,
  },
  response::IntoResponse,
};
use tracing::{debug, error, info, instrument};

use crate::logic::*;
use crate::protocol::{to_out, ClientWsMessage, ServerWsMessage};
use crate::state::AppState;

#[instrument(level = "info", skip(state))]
pub async fn ws_upgrade(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
  info!(target: "talentia_backend", "WebSocket upgrade requested");
  ws.on_upgrade(move |socket| handle_ws(socket, state))
}

#[instrument(level = "info", skip(socket, state))]
async fn handle_ws(mut socket: WebSocket, state: Arc<AppState>) {
  info!(target: "talentia_backend", "WebSocket connected");
  while let Some(Ok(msg)) = socket.recv().await {
    match msg {
      Message::Text(txt) => {
        let reply_msg = handle_text(&txt, &state).await;
        let out = serde_json::to_string(&reply_msg).unwrap_or_else(|e| {
          serde_json::json!({ "type": "error", "message": format!("Serialization error: {}", e) }).to_string()
        });

        if let Err(e) = socket.send(Message::Text(out)).await {
          error!(target: "talentia_backend", error = %e, "WS send error");
          break;
        }
      }
      Message::Ping(payload) => { let _ = socket.send(Message::Pong(payload)).await; }
      Message::Close(_) => break,
      _ => {}
    }
  }
  info!(target: "talentia_backend", "WebSocket disconnected");
}

async fn handle_text(txt: &str, state: &AppState) -> ServerWsMessage {
  match serde_json::from_str::<ClientWsMessage>(txt) {
    Ok(incoming) => {
      debug!(target: "talentia_backend", "WS received: {:?}", &incoming);
      handle_client_ws(incoming, state).await
    }
    Err(e) => ServerWsMessage::Error { message: format!("Invalid JSON: {}", e) },
  }
}

#[instrument(level = "info", skip(state))]
async fn handle_client_ws(msg: ClientWsMessage, state: &AppState) -> ServerWsMessage {
  match msg {
    ClientWsMessage::Ping => ServerWsMessage::Pong,

    ClientWsMessage::StartSession { island, track } => match start_session(state, island, track).await {
      Ok(session) => {
        info!(target: "session", id = %session.id, "WS session served");
        ServerWsMessage::Session { session: to_out(&session) }
      }
      Err(e) => ServerWsMessage::Error { message: e.to_string() },
    },

    ClientWsMessage::SubmitAnswer { session_id, task_index, answer } => {
      match submit_answer(state, &session_id, task_index, &answer).await {
        Ok(outcome) => {
          info!(target: "session", id = %session_id, correct = outcome.correct, completed = outcome.completed, "WS submit_answer evaluated");
          ServerWsMessage::AnswerResult(outcome.into())
        }
        Err(e) => ServerWsMessage::Error { message: e.to_string() },
      }
    }

    ClientWsMessage::GetProfile => ServerWsMessage::Profile { profile: current_profile(state) },
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::logic::tests::memory_state;

  #[tokio::test]
  async fn text_frames_get_one_reply_each() {
    let state = memory_state();
    assert!(matches!(handle_text(r#"{"type":"ping"}"#, &state).await, ServerWsMessage::Pong));
    assert!(matches!(handle_text("not json", &state).await, ServerWsMessage::Error { .. }));

    let ServerWsMessage::Session { session } = handle_text(r#"{"type":"start_session"}"#, &state).await else {
      panic!("expected a session");
    };
    let first = serde_json::to_string(&session.tasks[0].correct_answer).expect("json");
    let submit = format!(r#"{{"type":"submit_answer","sessionId":"{}","taskIndex":0,"answer":{}}}"#, session.session_id, first);
    match handle_text(&submit, &state).await {
      ServerWsMessage::AnswerResult(out) => {
        assert!(out.correct);
        assert_eq!(out.next_task, Some(1));
      }
      other => panic!("unexpected {other:?}"),
    }

    let locked = handle_text(r#"{"type":"start_session","island":3}"#, &state).await;
    assert!(matches!(locked, ServerWsMessage::Error { message } if message.contains("locked")));
    assert!(matches!(handle_text(r#"{"type":"get_profile"}"#, &state).await, ServerWsMessage::Profile { .. }));
  }
}
