//! Realtime collaborative drawing board relay.
//!
//! Fans drawing events out between connected websocket clients and keeps a
//! single linear undo/redo history of full-canvas snapshots. Exposed as a
//! library so the end-to-end tests can assemble the same router the binary
//! serves.

pub mod message;
pub mod routes;
pub mod services;
pub mod state;
