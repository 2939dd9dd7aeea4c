//! Room Directory Service
//!
//! Authoritative registry of active rooms and the WebSocket push that keeps
//! every connected client's room list live.

mod registry;
pub mod ws;

pub use registry::RoomRegistry;
