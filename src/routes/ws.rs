//! WebSocket handler — bidirectional message relay over the shared board.
//!
//! DESIGN
//! ======
//! On upgrade, registers the connection and enters a `select!` loop:
//! - Incoming client text → classify + dispatch one engine transition
//! - Broadcast text from peers → forward to this socket
//!
//! `apply_inbound` is pure decision logic: it mutates the board under the
//! caller's lock and returns an [`Outcome`] saying who hears about it. The
//! dispatch layer owns all delivery, so transitions never interleave with
//! sends from other connections.
//!
//! LIFECYCLE
//! =========
//! 1. Upgrade → register → `welcome`, `user-list`, `canvas-state` (if any)
//!    queued to the new member; `user-joined` broadcast to peers
//! 2. Client sends messages → dispatch → engine transition → broadcast
//! 3. Close → unregister → broadcast `user-left`

use axum::extract::State;
use axum::extract::ws::{Message, WebSocket, WebSocketUpgrade};
use axum::response::Response;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::message::{self, ClientMessage, Inbound, ServerMessage};
use crate::services::session::MemberInfo;
use crate::state::{AppState, Board};

/// Outbound queue depth per connection. A member that falls this far behind
/// starts missing broadcasts (fire-and-forget, never backpressure).
const OUTBOUND_QUEUE: usize = 256;

// =============================================================================
// OUTCOME
// =============================================================================

/// Delivery decision returned by [`apply_inbound`]. Transition logic never
/// sends anything itself.
#[derive(Debug)]
enum Outcome {
    /// Serialized text for every member including the sender.
    BroadcastAll(String),
    /// Serialized text for every member except the sender.
    BroadcastPeers(String),
    /// State committed (or no-op); nothing to send.
    Silent,
}

// =============================================================================
// UPGRADE
// =============================================================================

pub async fn handle_ws(State(state): State<AppState>, ws: WebSocketUpgrade) -> Response {
    ws.on_upgrade(move |socket| run_ws(socket, state))
}

// =============================================================================
// CONNECTION
// =============================================================================

async fn run_ws(mut socket: WebSocket, state: AppState) {
    let (tx, mut rx) = mpsc::channel::<String>(OUTBOUND_QUEUE);

    // Register and queue onboarding under one lock so the welcome sequence
    // cannot interleave with a concurrent transition.
    let me = {
        let mut board = state.board.lock().await;
        let me = board.members.register(tx);
        onboard(&board, &me);
        board
            .members
            .broadcast(&join_notice(&me).to_text(), Some(&me.id));
        me
    };

    info!(user_id = %me.id, name = %me.name, "ws: member connected");

    loop {
        tokio::select! {
            inbound = socket.recv() => {
                let Some(Ok(msg)) = inbound else { break };
                match msg {
                    Message::Text(text) => {
                        let mut board = state.board.lock().await;
                        dispatch(&mut board, &me, text.as_str());
                    }
                    Message::Close(_) => break,
                    _ => {}
                }
            }
            outbound = rx.recv() => {
                let Some(text) = outbound else { break };
                if socket.send(Message::Text(text.into())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Drop the registry entry first so the leave notice skips the closing
    // socket's queue.
    {
        let mut board = state.board.lock().await;
        if let Some(left) = board.members.unregister(&me.id) {
            let notice = ServerMessage::UserLeft { user_id: left.id };
            board.members.broadcast(&notice.to_text(), None);
        }
    }
    info!(user_id = %me.id, "ws: member disconnected");
}

/// Queue the onboarding sequence for a freshly registered member: identity,
/// full membership, and the current canvas when history is non-empty. No
/// intermediate history replay.
fn onboard(board: &Board, me: &MemberInfo) {
    let welcome = ServerMessage::Welcome {
        user_id: me.id.clone(),
        color: me.color.clone(),
        name: me.name.clone(),
    };
    board.members.send_to(&me.id, &welcome.to_text());

    let roster = ServerMessage::UserList { data: board.members.list() };
    board.members.send_to(&me.id, &roster.to_text());

    if let Some(snapshot) = board.history.current_snapshot() {
        let catch_up = ServerMessage::CanvasState {
            state_index: board.history.current_index(),
            state_data: snapshot.to_owned(),
        };
        board.members.send_to(&me.id, &catch_up.to_text());
    }
}

fn join_notice(me: &MemberInfo) -> ServerMessage {
    ServerMessage::UserJoined {
        user_id: me.id.clone(),
        color: me.color.clone(),
        name: me.name.clone(),
    }
}

// =============================================================================
// DISPATCH
// =============================================================================

/// Classify one inbound text frame, apply its transition, deliver the result.
fn dispatch(board: &mut Board, sender: &MemberInfo, text: &str) {
    let inbound = match message::parse_inbound(text) {
        Ok(inbound) => inbound,
        Err(e) => {
            // Malformed input is dropped, never fatal: the connection stays
            // open and no state changes.
            warn!(user_id = %sender.id, error = %e, "ws: dropping inbound message");
            return;
        }
    };

    match apply_inbound(board, sender, inbound) {
        Outcome::BroadcastAll(payload) => board.members.broadcast(&payload, None),
        Outcome::BroadcastPeers(payload) => board.members.broadcast(&payload, Some(&sender.id)),
        Outcome::Silent => {}
    }
}

/// One engine/registry transition per inbound event. Runs under the board
/// lock; returns the delivery decision.
fn apply_inbound(board: &mut Board, sender: &MemberInfo, inbound: Inbound) -> Outcome {
    match inbound {
        Inbound::Known(ClientMessage::DrawStart { x, y, color, size }) => {
            let relay = ServerMessage::DrawStart { user_id: sender.id.clone(), x, y, color, size };
            Outcome::BroadcastPeers(relay.to_text())
        }
        Inbound::Known(ClientMessage::DrawMove { x, y, color, size }) => {
            let relay = ServerMessage::DrawMove { user_id: sender.id.clone(), x, y, color, size };
            Outcome::BroadcastPeers(relay.to_text())
        }
        Inbound::Known(ClientMessage::DrawEnd) => {
            // Ask every client to report its rendered canvas; the drawer's id
            // tells clients whose stroke just ended.
            let request = ServerMessage::SaveState { user_id: sender.id.clone() };
            Outcome::BroadcastAll(request.to_text())
        }
        Inbound::Known(ClientMessage::SaveState { state_data }) => {
            board.history.push(state_data);
            debug!(
                user_id = %sender.id,
                state_index = board.history.current_index(),
                entries = board.history.len(),
                "ws: snapshot committed"
            );
            Outcome::Silent
        }
        Inbound::Known(ClientMessage::Undo) => match board.history.undo() {
            Some(step) => {
                let msg = ServerMessage::Undo {
                    state_index: step.state_index,
                    state_data: step.state_data,
                };
                Outcome::BroadcastAll(msg.to_text())
            }
            None => Outcome::Silent,
        },
        Inbound::Known(ClientMessage::Redo) => match board.history.redo() {
            Some(step) => {
                let msg = ServerMessage::Redo {
                    state_index: step.state_index,
                    state_data: step.state_data,
                };
                Outcome::BroadcastAll(msg.to_text())
            }
            None => Outcome::Silent,
        },
        Inbound::Known(ClientMessage::Clear) => {
            board.history.clear();
            let msg = ServerMessage::Clear { user_id: sender.id.clone() };
            Outcome::BroadcastAll(msg.to_text())
        }
        Inbound::Unknown(record) => {
            let text = message::stamp_passthrough(record, &sender.id, &sender.color);
            Outcome::BroadcastPeers(text)
        }
    }
}

#[cfg(test)]
#[path = "ws_test.rs"]
mod tests;
