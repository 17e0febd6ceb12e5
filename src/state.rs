//! Shared application state.
//!
//! DESIGN
//! ======
//! `AppState` is injected into Axum handlers via the `State` extractor. The
//! whole process shares one `Board`: a membership registry plus one global
//! snapshot timeline — there is no per-user or per-room partition. The board
//! lives behind a single `tokio::sync::Mutex`; every inbound message is
//! handled start-to-finish under the lock, which serializes transitions the
//! same way a single-threaded event loop would.

use std::sync::Arc;

use tokio::sync::Mutex;

use crate::services::history::CanvasHistory;
use crate::services::session::SessionRegistry;

// =============================================================================
// BOARD
// =============================================================================

/// The only shared mutable state: who is connected, and the timeline.
#[derive(Default)]
pub struct Board {
    pub members: SessionRegistry,
    pub history: CanvasHistory,
}

impl Board {
    #[must_use]
    pub fn new() -> Self {
        Self { members: SessionRegistry::new(), history: CanvasHistory::new() }
    }
}

// =============================================================================
// APP STATE
// =============================================================================

/// Shared application state. Clone is required by Axum — the board is
/// Arc-wrapped.
#[derive(Clone)]
pub struct AppState {
    pub board: Arc<Mutex<Board>>,
}

impl AppState {
    #[must_use]
    pub fn new() -> Self {
        Self { board: Arc::new(Mutex::new(Board::new())) }
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// TEST HELPERS
// =============================================================================
