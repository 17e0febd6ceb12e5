//! Canvas history engine — the single shared undo/redo timeline.
//!
//! DESIGN
//! ======
//! History is snapshot-based: one opaque full-canvas blob per committed
//! stroke, with a cursor into the sequence. Undo/redo move the cursor;
//! a push after an undo truncates the redo tail (no branching). This trades
//! bandwidth for never needing an operational-transform merge: strokes are
//! coalesced into one snapshot per stroke, not per point.
//!
//! All transitions are pure and synchronous. The WS dispatch layer holds the
//! board mutex across each one, so transitions are atomic with respect to
//! every other connection and to the retention sweep.

use serde::{Deserialize, Serialize};

/// Maximum snapshots retained. Oldest entries are evicted first.
pub const RETENTION_CAP: usize = 50;

// =============================================================================
// TYPES
// =============================================================================

/// Result of a successful undo transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UndoStep {
    /// New cursor position; `-1` means blank canvas.
    pub state_index: i64,
    /// Snapshot to display, `None` when the canvas is now blank.
    pub state_data: Option<String>,
}

/// Result of a successful redo transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RedoStep {
    pub state_index: i64,
    pub state_data: String,
}

/// The shared timeline: ordered snapshots plus a cursor.
///
/// Invariant: `-1 <= current <= snapshots.len() - 1` after every transition.
#[derive(Debug, Default)]
pub struct CanvasHistory {
    snapshots: Vec<String>,
    current: i64,
}

// =============================================================================
// TRANSITIONS
// =============================================================================

impl CanvasHistory {
    #[must_use]
    pub fn new() -> Self {
        Self { snapshots: Vec::new(), current: -1 }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor into the timeline; `-1` denotes the blank canvas.
    #[must_use]
    pub fn current_index(&self) -> i64 {
        self.current
    }

    /// Snapshot the cursor points at, if any.
    #[must_use]
    pub fn current_snapshot(&self) -> Option<&str> {
        usize::try_from(self.current)
            .ok()
            .and_then(|i| self.snapshots.get(i))
            .map(String::as_str)
    }

    /// Commit a new snapshot. Discards any redo tail beyond the cursor,
    /// appends, advances the cursor, and enforces the retention cap.
    pub fn push(&mut self, snapshot: String) {
        let keep = usize::try_from(self.current + 1).unwrap_or(0);
        self.snapshots.truncate(keep);
        self.snapshots.push(snapshot);
        self.current = i64::try_from(self.snapshots.len()).unwrap_or(i64::MAX) - 1;
        self.trim_to_cap();
    }

    /// Step the cursor back. `None` when already at the blank canvas.
    pub fn undo(&mut self) -> Option<UndoStep> {
        if self.current < 0 {
            return None;
        }
        self.current -= 1;
        Some(UndoStep {
            state_index: self.current,
            state_data: self.current_snapshot().map(ToOwned::to_owned),
        })
    }

    /// Step the cursor forward into the redo tail. `None` at the newest entry.
    pub fn redo(&mut self) -> Option<RedoStep> {
        let last = i64::try_from(self.snapshots.len()).unwrap_or(i64::MAX) - 1;
        if self.current >= last {
            return None;
        }
        self.current += 1;
        let state_data = self.current_snapshot().map(ToOwned::to_owned)?;
        Some(RedoStep { state_index: self.current, state_data })
    }

    /// Reset to the empty timeline.
    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current = -1;
    }

    /// Drop oldest entries over [`RETENTION_CAP`], shifting the cursor down
    /// by the number removed so it keeps pointing at the same snapshot.
    /// Clamped at `-1`: trimming never drives the cursor below blank.
    /// Returns how many entries were evicted.
    pub fn trim_to_cap(&mut self) -> usize {
        let excess = self.snapshots.len().saturating_sub(RETENTION_CAP);
        if excess == 0 {
            return 0;
        }
        self.snapshots.drain(..excess);
        let shift = i64::try_from(excess).unwrap_or(i64::MAX);
        self.current = (self.current - shift).max(-1);
        excess
    }
}

#[cfg(test)]
impl CanvasHistory {
    /// Load raw state directly, bypassing the inline cap. Lets sweep tests
    /// construct over-cap timelines that real pushes can never produce.
    pub(crate) fn force_load(&mut self, snapshots: Vec<String>, current: i64) {
        self.snapshots = snapshots;
        self.current = current;
    }
}

#[cfg(test)]
#[path = "history_test.rs"]
mod tests;
