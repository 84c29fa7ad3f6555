//! WebSocket handler
//!
//! Authenticates the upgrade request, then pumps the socket: one task
//! receives and dispatches client events, another drains the connection's
//! outbound queue into the socket.

use std::sync::Arc;

use axum::{
    extract::{ws::Message, ws::WebSocket, Query, State, WebSocketUpgrade},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use futures_util::{Sink, SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;

use pulse_core::{ConnectionId, PrincipalId, ServerEvent};
use pulse_engine::Connection;

use crate::handlers::EventDispatcher;
use crate::protocol::{ClientEvent, CloseCode};
use crate::server::GatewayState;

/// Channel buffer size for outgoing events
const EVENT_BUFFER_SIZE: usize = 100;

/// Query parameters for the upgrade request
#[derive(Debug, Deserialize)]
pub struct WsParams {
    /// Bearer token issued by the credential service
    token: String,
}

/// WebSocket gateway handler
///
/// The credential is verified and the principal resolved before the
/// upgrade; a rejected connection is never registered and produces no
/// events.
pub async fn gateway_handler(
    State(state): State<GatewayState>,
    Query(params): Query<WsParams>,
    ws: WebSocketUpgrade,
) -> Response {
    let principal_id = match state.verifier().verify_principal(&params.token) {
        Ok(id) => id,
        Err(e) => {
            tracing::warn!(error = %e, "WebSocket handshake rejected");
            return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
        }
    };

    match state.principals().find_by_id(principal_id).await {
        Ok(Some(_)) => {}
        Ok(None) => {
            tracing::warn!(principal_id = %principal_id, "Token for unknown principal");
            return (StatusCode::UNAUTHORIZED, "unknown principal").into_response();
        }
        Err(e) => {
            tracing::error!(error = %e, "Principal lookup failed during handshake");
            return (StatusCode::INTERNAL_SERVER_ERROR, "lookup failed").into_response();
        }
    }

    ws.on_upgrade(move |socket| handle_socket(state, socket, principal_id))
        .into_response()
}

/// Handle an upgraded, authenticated WebSocket connection
async fn handle_socket(state: GatewayState, socket: WebSocket, principal_id: PrincipalId) {
    let (tx, rx) = mpsc::channel::<ServerEvent>(EVENT_BUFFER_SIZE);

    let connection = match state.hub().connect(principal_id, tx).await {
        Ok(conn) => conn,
        Err(e) => {
            tracing::error!(principal_id = %principal_id, error = %e, "Registration failed");
            return;
        }
    };

    tracing::info!(
        connection_id = %connection.id(),
        principal_id = %principal_id,
        "WebSocket connection established"
    );

    let (ws_sink, mut ws_stream) = socket.split();

    let state_recv = state.clone();
    let connection_recv = connection.clone();

    // Receive and dispatch client events
    let recv_task = tokio::spawn(async move {
        while let Some(msg) = ws_stream.next().await {
            match msg {
                Ok(Message::Text(text)) => {
                    if let Err(close_code) =
                        handle_text_message(&state_recv, &connection_recv, &text).await
                    {
                        return Some(close_code);
                    }
                }
                Ok(Message::Binary(_)) => {
                    tracing::debug!(
                        connection_id = %connection_recv.id(),
                        "Binary messages not supported"
                    );
                    return Some(CloseCode::DecodeError);
                }
                Ok(Message::Ping(_) | Message::Pong(_)) => {
                    // Pong replies are handled by axum
                }
                Ok(Message::Close(_)) => {
                    tracing::info!(
                        connection_id = %connection_recv.id(),
                        "Client closed connection"
                    );
                    return None;
                }
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection_recv.id(),
                        error = %e,
                        "WebSocket error"
                    );
                    return Some(CloseCode::UnknownError);
                }
            }
        }
        None
    });

    // Drain the outbound queue into the socket. The task captures only the
    // connection id: holding the `Connection` here would keep its sender
    // alive and the queue would never close after teardown.
    let send_task = tokio::spawn(pump_outbound(connection.id(), rx, ws_sink));

    tokio::select! {
        result = recv_task => {
            if let Ok(Some(close_code)) = result {
                tracing::debug!(
                    connection_id = %connection.id(),
                    close_code = ?close_code,
                    "Receive task ended with close code"
                );
            }
        }
        _ = send_task => {
            tracing::debug!(connection_id = %connection.id(), "Send task ended");
        }
    }

    state.hub().disconnect(connection.id()).await;
    tracing::info!(connection_id = %connection.id(), "WebSocket connection closed");
}

/// Pump queued server events into the socket sink until the queue closes
/// or the transport rejects a write
///
/// Ends once every `Connection` handle for this id has been dropped and
/// the remaining queued events are flushed.
async fn pump_outbound<S>(
    connection_id: ConnectionId,
    mut rx: mpsc::Receiver<ServerEvent>,
    mut ws_sink: S,
) where
    S: Sink<Message> + Unpin,
{
    while let Some(event) = rx.recv().await {
        match event.to_json() {
            Ok(json) => {
                if ws_sink.send(Message::Text(json.into())).await.is_err() {
                    tracing::debug!(
                        connection_id = %connection_id,
                        "Socket write failed; stopping send task"
                    );
                    break;
                }
            }
            Err(e) => {
                tracing::error!(
                    connection_id = %connection_id,
                    error = %e,
                    "Event serialization failed"
                );
            }
        }
    }

    let _ = ws_sink.close().await;
}

/// Handle a text frame from the client
async fn handle_text_message(
    state: &GatewayState,
    connection: &Arc<Connection>,
    text: &str,
) -> Result<(), CloseCode> {
    let event = match ClientEvent::from_json(text) {
        Ok(event) => event,
        Err(e) => {
            tracing::debug!(
                connection_id = %connection.id(),
                error = %e,
                "Failed to parse client event"
            );
            return Err(CloseCode::DecodeError);
        }
    };

    match EventDispatcher::dispatch(state, connection, event).await {
        Ok(Some(close_code)) => Err(close_code),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::warn!(
                connection_id = %connection.id(),
                error = %e,
                "Handler error"
            );
            match e.to_close_code() {
                Some(close_code) => Err(close_code),
                None => Ok(()),
            }
        }
    }
}
