use axum::{
    extract::{State, ws::{WebSocket, WebSocketUpgrade, Message}},
    response::IntoResponse,
};
use std::sync::Arc;
use tokio::time::{interval, Duration};
use futures::{SinkExt, StreamExt};
use crate::api::rest::AppState;
use crate::sources::PoolListKind;

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_socket(socket, state))
}

fn pool_update_message(pools: &[crate::models::PoolStats]) -> String {
    serde_json::json!({
        "type": "pool_update",
        "count": pools.len(),
        "data": pools,
    })
    .to_string()
}

async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let (mut sender, mut receiver) = socket.split();
    let mut ticker = interval(Duration::from_secs(state.update_interval.max(1)));

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let pools = match state.collector.pool_stats(PoolListKind::Top).await {
                    Ok(pools) => pools,
                    Err(e) => {
                        tracing::warn!("Pool update skipped: {}", e);
                        continue;
                    }
                };

                let send = sender.send(Message::Text(pool_update_message(&pools)));
                match tokio::time::timeout(Duration::from_secs(5), send).await {
                    Ok(Ok(_)) => {},
                    _ => break,
                }
            }

            msg = receiver.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        if let Ok(cmd) = serde_json::from_str::<serde_json::Value>(&text) {
                            if cmd["type"] == "ping" {
                                let _ = sender.send(Message::Text(r#"{"type":"pong"}"#.to_string())).await;
                            }
                        }
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    _ => {}
                }
            }
        }
    }
    tracing::debug!("Websocket client disconnected");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_update_message() {
        let msg: serde_json::Value = serde_json::from_str(&pool_update_message(&[])).unwrap();
        assert_eq!(msg["type"], "pool_update");
        assert_eq!(msg["count"], 0);
        assert!(msg["data"].as_array().unwrap().is_empty());
    }
}
