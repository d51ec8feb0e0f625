use std::{collections::HashMap, sync::Arc};

use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        Query,
    },
    response::IntoResponse,
    Extension,
};
use futures::{sink::SinkExt, stream::StreamExt};
use serde::Deserialize;
use serde_json::json;
use tokio::sync::{broadcast, mpsc};
use uuid::Uuid;

use crate::{
    db::userdb::UserExt,
    models::usermodel::UserRole,
    service::events::{booking_room, role_room, user_room, RoomEvent},
    utils::token,
    AppState,
};

const OUTBOUND_BUFFER: usize = 64;

#[derive(Debug, Deserialize)]
pub struct WsQuery {
    token: Option<String>,
}

/// Messages a connected dashboard may send. Room joins and relays are only
/// honored once the connection is verified.
#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ClientFrame {
    #[serde(rename = "authenticate")]
    Authenticate { token: String },

    #[serde(rename = "join-booking")]
    JoinBooking { booking_id: Uuid },

    #[serde(rename = "leave-booking")]
    LeaveBooking { booking_id: Uuid },

    #[serde(rename = "provider:location-update")]
    ProviderLocationUpdate {
        booking_id: Uuid,
        lat: f64,
        lng: f64,
    },

    #[serde(rename = "customer:location-update")]
    CustomerLocationUpdate {
        booking_id: Uuid,
        lat: f64,
        lng: f64,
    },

    #[serde(rename = "chat:message")]
    ChatMessage {
        booking_id: Uuid,
        message: String,
        sender_name: Option<String>,
    },

    #[serde(rename = "booking:status-update")]
    BookingStatusUpdate { booking_id: Uuid, status: String },

    #[serde(rename = "emergency:request")]
    EmergencyRequest {
        location: Option<serde_json::Value>,
        service_type: Option<String>,
        description: Option<String>,
    },

    #[serde(rename = "emergency:accept")]
    EmergencyAccept {
        request_id: Option<Uuid>,
        customer_id: Uuid,
    },
}

/// Connection identity: pending until the JWT has been re-resolved
/// server-side. A forged room name never reaches the broadcaster because
/// joins are derived from this state, not from client-supplied ids.
#[derive(Debug, Clone, Copy)]
enum ConnState {
    Pending,
    Verified { user_id: Uuid, role: UserRole },
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    Query(params): Query<WsQuery>,
    Extension(app_state): Extension<Arc<AppState>>,
) -> impl IntoResponse {
    // A token on the query string verifies the connection up front; the
    // client may also send an `authenticate` frame later.
    let initial = match params.token {
        Some(token) => resolve_identity(&app_state, &token).await,
        None => None,
    };

    ws.on_upgrade(move |socket| handle_socket(socket, app_state, initial))
}

async fn resolve_identity(app_state: &Arc<AppState>, raw_token: &str) -> Option<ConnState> {
    let user_id_str =
        token::decode_token(raw_token.to_string(), app_state.env.jwt_secret.as_bytes()).ok()?;

    if app_state.db_client.is_token_blacklisted(raw_token).await {
        return None;
    }

    let user_id = Uuid::parse_str(&user_id_str).ok()?;
    let user = app_state.db_client.get_user(Some(user_id), None).await.ok()??;

    Some(ConnState::Verified {
        user_id: user.id,
        role: user.role,
    })
}

async fn handle_socket(socket: WebSocket, app_state: Arc<AppState>, initial: Option<ConnState>) {
    let (mut sender, mut receiver) = socket.split();

    let (out_tx, mut out_rx) = mpsc::channel::<RoomEvent>(OUTBOUND_BUFFER);

    // Outbound pump: room events plus a heartbeat ping.
    let mut send_task = tokio::spawn(async move {
        let mut heartbeat = tokio::time::interval(tokio::time::Duration::from_secs(30));
        loop {
            tokio::select! {
                _ = heartbeat.tick() => {
                    if sender.send(Message::Ping(Vec::new())).await.is_err() {
                        break;
                    }
                }
                event = out_rx.recv() => {
                    let Some(event) = event else { break };
                    let json = match serde_json::to_string(&event) {
                        Ok(j) => j,
                        Err(e) => {
                            tracing::error!("failed to serialize event: {}", e);
                            continue;
                        }
                    };
                    if sender.send(Message::Text(json)).await.is_err() {
                        break;
                    }
                }
            }
        }
    });

    let mut state = ConnState::Pending;
    // room name -> forwarding task
    let mut room_tasks: HashMap<String, tokio::task::JoinHandle<()>> = HashMap::new();

    if let Some(verified) = initial {
        state = verified;
        join_identity_rooms(&app_state, &mut room_tasks, &out_tx, verified).await;
        notify_authenticated(&out_tx, verified).await;
    }

    loop {
        tokio::select! {
            incoming = receiver.next() => {
                let Some(Ok(msg)) = incoming else { break };
                match msg {
                    Message::Text(text) => {
                        handle_frame(&app_state, &mut state, &mut room_tasks, &out_tx, &text).await;
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            _ = &mut send_task => break,
        }
    }

    for (_, task) in room_tasks {
        task.abort();
    }
    send_task.abort();

    tracing::debug!("websocket connection closed");
}

async fn handle_frame(
    app_state: &Arc<AppState>,
    state: &mut ConnState,
    room_tasks: &mut HashMap<String, tokio::task::JoinHandle<()>>,
    out_tx: &mpsc::Sender<RoomEvent>,
    text: &str,
) {
    let frame: ClientFrame = match serde_json::from_str(text) {
        Ok(f) => f,
        Err(e) => {
            tracing::debug!("ignoring malformed frame: {}", e);
            return;
        }
    };

    if let ClientFrame::Authenticate { token } = &frame {
        match resolve_identity(app_state, token).await {
            Some(verified) => {
                *state = verified;
                join_identity_rooms(app_state, room_tasks, out_tx, verified).await;
                notify_authenticated(out_tx, verified).await;
            }
            None => {
                let _ = out_tx
                    .send(RoomEvent {
                        event: "authenticated".to_string(),
                        payload: json!({ "success": false }),
                    })
                    .await;
            }
        }
        return;
    }

    // Everything below requires a verified connection.
    let ConnState::Verified { user_id, role } = *state else {
        tracing::debug!("dropping frame from unverified connection");
        return;
    };

    match frame {
        ClientFrame::Authenticate { .. } => unreachable!(),

        ClientFrame::JoinBooking { booking_id } => {
            subscribe_room(app_state, room_tasks, out_tx, booking_room(booking_id)).await;
        }

        ClientFrame::LeaveBooking { booking_id } => {
            if let Some(task) = room_tasks.remove(&booking_room(booking_id)) {
                task.abort();
            }
        }

        ClientFrame::ProviderLocationUpdate { booking_id, lat, lng } => {
            app_state
                .events
                .publish(
                    &booking_room(booking_id),
                    "provider:location",
                    json!({ "booking_id": booking_id, "lat": lat, "lng": lng }),
                )
                .await;
        }

        ClientFrame::CustomerLocationUpdate { booking_id, lat, lng } => {
            app_state
                .events
                .publish(
                    &booking_room(booking_id),
                    "customer:location",
                    json!({ "booking_id": booking_id, "lat": lat, "lng": lng }),
                )
                .await;
        }

        ClientFrame::ChatMessage {
            booking_id,
            message,
            sender_name,
        } => {
            app_state
                .events
                .publish(
                    &booking_room(booking_id),
                    "chat:message",
                    json!({
                        "booking_id": booking_id,
                        "message": ammonia::clean(&message),
                        "sender_id": user_id,
                        "sender_name": sender_name,
                        "sender_role": role,
                        "timestamp": chrono::Utc::now(),
                    }),
                )
                .await;
        }

        ClientFrame::BookingStatusUpdate { booking_id, status } => {
            app_state
                .events
                .publish(
                    &booking_room(booking_id),
                    "booking:status-changed",
                    json!({ "booking_id": booking_id, "status": status }),
                )
                .await;
        }

        ClientFrame::EmergencyRequest {
            location,
            service_type,
            description,
        } => {
            app_state
                .events
                .publish(
                    &role_room(UserRole::Provider),
                    "emergency:new-request",
                    json!({
                        "customer_id": user_id,
                        "location": location,
                        "service_type": service_type,
                        "description": description,
                        "timestamp": chrono::Utc::now(),
                    }),
                )
                .await;
        }

        ClientFrame::EmergencyAccept {
            request_id,
            customer_id,
        } => {
            app_state
                .events
                .publish(
                    &user_room(customer_id),
                    "emergency:accepted",
                    json!({
                        "request_id": request_id,
                        "provider_id": user_id,
                        "timestamp": chrono::Utc::now(),
                    }),
                )
                .await;
        }
    }
}

async fn join_identity_rooms(
    app_state: &Arc<AppState>,
    room_tasks: &mut HashMap<String, tokio::task::JoinHandle<()>>,
    out_tx: &mpsc::Sender<RoomEvent>,
    verified: ConnState,
) {
    let ConnState::Verified { user_id, role } = verified else {
        return;
    };

    subscribe_room(app_state, room_tasks, out_tx, user_room(user_id)).await;
    subscribe_room(app_state, room_tasks, out_tx, role_room(role)).await;
}

async fn notify_authenticated(out_tx: &mpsc::Sender<RoomEvent>, verified: ConnState) {
    if let ConnState::Verified { user_id, role } = verified {
        let _ = out_tx
            .send(RoomEvent {
                event: "authenticated".to_string(),
                payload: json!({ "success": true, "user_id": user_id, "role": role }),
            })
            .await;
    }
}

/// Forward a room's broadcast stream into this connection until the room is
/// left or the connection drops.
async fn subscribe_room(
    app_state: &Arc<AppState>,
    room_tasks: &mut HashMap<String, tokio::task::JoinHandle<()>>,
    out_tx: &mpsc::Sender<RoomEvent>,
    room: String,
) {
    if room_tasks.contains_key(&room) {
        return;
    }

    let mut rx = app_state.events.subscribe(&room).await;
    let out_tx = out_tx.clone();
    let room_name = room.clone();

    let task = tokio::spawn(async move {
        loop {
            match rx.recv().await {
                Ok(event) => {
                    if out_tx.send(event).await.is_err() {
                        break;
                    }
                }
                Err(broadcast::error::RecvError::Lagged(n)) => {
                    // Best-effort channel: a slow client just misses events.
                    tracing::warn!("connection lagged {} events in {}", n, room_name);
                }
                Err(broadcast::error::RecvError::Closed) => break,
            }
        }
    });

    room_tasks.insert(room, task);
}
