//! Session registry — connection bookkeeping for the shared board.
//!
//! DESIGN
//! ======
//! A pure membership table: id, presence color, display name, and the
//! outbound channel for each connected member, in registration order. The
//! registry owns zero domain data and never inspects history; join/leave
//! notifications are broadcast by the WS handler, not from here.
//!
//! Broadcast is fire-and-forget: `try_send` per member, failures skipped
//! silently. A member whose channel is full or closed misses that message
//! and nothing else happens — no retry, no queuing.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

/// Fixed presence palette. Uniform-random pick per registration; collisions
/// across members are allowed (cosmetic only).
pub const COLOR_PALETTE: [&str; 8] = [
    "#e6194b", "#3cb44b", "#4363d8", "#f58231", "#911eb4", "#0e7490", "#f032e6", "#9a6324",
];

// =============================================================================
// TYPES
// =============================================================================

/// Public identity of a connected member.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberInfo {
    pub id: String,
    pub color: String,
    pub name: String,
}

struct Member {
    info: MemberInfo,
    tx: mpsc::Sender<String>,
}

/// Connected members in registration order.
#[derive(Default)]
pub struct SessionRegistry {
    members: Vec<Member>,
}

// =============================================================================
// REGISTRATION
// =============================================================================

/// Millisecond timestamp plus a random hex suffix. Unique enough among
/// currently-connected members; collisions are accepted as negligible.
fn generate_member_id() -> String {
    let ms = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_or(0, |d| d.as_millis());
    let suffix: u16 = rand::rng().random();
    format!("{ms:x}-{suffix:04x}")
}

impl SessionRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self { members: Vec::new() }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.members.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Register a connection: fresh id, random palette color, name derived
    /// from the current member count. Returns the public identity.
    pub fn register(&mut self, tx: mpsc::Sender<String>) -> MemberInfo {
        let color = COLOR_PALETTE[rand::rng().random_range(0..COLOR_PALETTE.len())];
        let info = MemberInfo {
            id: generate_member_id(),
            color: color.to_owned(),
            name: format!("Guest {}", self.members.len() + 1),
        };
        self.members.push(Member { info: info.clone(), tx });
        info
    }

    /// Remove a member. Returns the removed identity, `None` if absent.
    pub fn unregister(&mut self, id: &str) -> Option<MemberInfo> {
        let pos = self.members.iter().position(|m| m.info.id == id)?;
        Some(self.members.remove(pos).info)
    }

    /// Membership snapshot in registration order.
    #[must_use]
    pub fn list(&self) -> Vec<MemberInfo> {
        self.members.iter().map(|m| m.info.clone()).collect()
    }

    // =========================================================================
    // DELIVERY
    // =========================================================================

    /// Send serialized text to every member except `exclude`, best-effort.
    pub fn broadcast(&self, text: &str, exclude: Option<&str>) {
        for member in &self.members {
            if exclude == Some(member.info.id.as_str()) {
                continue;
            }
            let _ = member.tx.try_send(text.to_owned());
        }
    }

    /// Send serialized text to one member. Returns whether the enqueue
    /// succeeded; a `false` is not an error, just a missed delivery.
    pub fn send_to(&self, id: &str, text: &str) -> bool {
        let Some(member) = self.members.iter().find(|m| m.info.id == id) else {
            return false;
        };
        member.tx.try_send(text.to_owned()).is_ok()
    }
}

#[cfg(test)]
#[path = "session_test.rs"]
mod tests;
