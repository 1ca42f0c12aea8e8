//! WebSocket session management and broadcasting.

pub mod broadcast;
pub mod connection;
pub mod registry;
pub mod session;
