use crate::{
    db,
    error::{AppError, AppResult},
    utils::codes::normalize_code,
    websocket::messages::{ClientMessage, ServerMessage},
    AppState,
};
use axum::{
    extract::{
        ws::{Message, WebSocket},
        Path, State, WebSocketUpgrade,
    },
    response::{IntoResponse, Response},
};
use futures::{sink::SinkExt, stream::StreamExt};
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// WebSocket upgrade handler for a campaign's live feed. Spectating needs
/// no account.
pub async fn handle_campaign_feed(
    Path(code): Path<String>,
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> AppResult<Response> {
    let code = normalize_code(&code);
    if db::queries::get_campaign_by_code(&state.db, &code)
        .await?
        .is_none()
    {
        return Err(AppError::NotFound("Campaign"));
    }

    Ok(ws
        .on_upgrade(move |socket| handle_socket(socket, state, code))
        .into_response())
}

/// Handle individual WebSocket connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>, code: String) {
    let (mut sender, mut receiver) = socket.split();
    let (tx, mut rx) = mpsc::channel::<ServerMessage>(16);

    // Subscribe before reading the snapshot so no call falls in between.
    let mut feed = state.feeds.subscribe(&code);

    let snapshot = match db::queries::load_campaign_view(&state.db, &code).await {
        Ok(Some(campaign)) => ServerMessage::snapshot(&campaign),
        Ok(None) => ServerMessage::CampaignClosed,
        Err(e) => {
            tracing::error!("Failed to load snapshot for campaign {}: {}", code, e);
            ServerMessage::Error {
                message: "Failed to load campaign".to_string(),
            }
        }
    };
    let closed = matches!(snapshot, ServerMessage::CampaignClosed);
    if send_message(&mut sender, &snapshot).await.is_err() || closed {
        return;
    }

    tracing::info!(
        "Live feed opened for campaign {} ({} watching)",
        code,
        state.feeds.subscriber_count(&code)
    );

    // Forward campaign events and direct replies to the client
    let feed_code = code.clone();
    let mut send_task = tokio::spawn(async move {
        loop {
            let msg = tokio::select! {
                event = feed.recv() => match event {
                    Ok(msg) => msg,
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        tracing::warn!(
                            "Spectator of campaign {} lagged, {} events skipped",
                            feed_code,
                            skipped
                        );
                        continue;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                },
                reply = rx.recv() => match reply {
                    Some(msg) => msg,
                    None => break,
                },
            };

            let closing = matches!(msg, ServerMessage::CampaignClosed);
            if send_message(&mut sender, &msg).await.is_err() || closing {
                break;
            }
        }
        let _ = sender.close().await;
    });

    // Handle incoming messages from the client
    let mut recv_task = tokio::spawn(async move {
        while let Some(Ok(msg)) = receiver.next().await {
            match msg {
                Message::Text(text) => {
                    let reply = match serde_json::from_str::<ClientMessage>(&text) {
                        Ok(ClientMessage::Ping) => ServerMessage::Pong,
                        Err(e) => {
                            tracing::debug!("Failed to parse message: {}", e);
                            ServerMessage::Error {
                                message: format!("Invalid message format: {}", e),
                            }
                        }
                    };
                    if tx.send(reply).await.is_err() {
                        break;
                    }
                }
                Message::Close(_) => break,
                _ => {}
            }
        }
    });

    // Wait for either task to finish
    tokio::select! {
        _ = (&mut send_task) => {
            recv_task.abort();
        }
        _ = (&mut recv_task) => {
            send_task.abort();
        }
    }

    tracing::info!("Live feed closed for campaign {}", code);
}

async fn send_message<S>(sender: &mut S, message: &ServerMessage) -> Result<(), ()>
where
    S: futures::Sink<Message> + Unpin,
{
    match serde_json::to_string(message) {
        Ok(json) => sender.send(Message::Text(json.into())).await.map_err(|_| ()),
        Err(e) => {
            tracing::error!("Failed to serialize message: {}", e);
            Ok(())
        }
    }
}
