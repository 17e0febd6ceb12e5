//! Domain services behind the websocket route.
//!
//! ARCHITECTURE
//! ============
//! Service modules own the board's business logic — membership bookkeeping,
//! the snapshot timeline, and its background maintenance — so the route
//! layer stays focused on protocol translation and delivery.

pub mod history;
pub mod retention;
pub mod session;
