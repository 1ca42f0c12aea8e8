//! # tracker-server
//!
//! Axum HTTP + `WebSocket` server for the shared daily checklist.
//!
//! - HTTP endpoints: `/api/load`, `/api/add`, `/api/check`, `/health`, `/metrics`
//! - `WebSocket` gateway: session registry, `ping`/`pong` keepalive
//! - Change notifications fanned out to every open session after each
//!   successful store mutation
//! - Graceful shutdown via `CancellationToken`, aborting the serve task
//!   after a grace period

#![deny(unsafe_code)]

pub mod api;
pub mod checklist;
pub mod config;
pub mod health;
pub mod server;
pub mod shutdown;
pub mod websocket;

pub use checklist::{ChecklistError, ChecklistService};
pub use config::{ChecklistConfig, ServerConfig};
pub use server::{AppState, TrackerServer};
pub use shutdown::{ShutdownCoordinator, StopOutcome};
pub use websocket::broadcast::{BroadcastDispatcher, BroadcastReport};
pub use websocket::registry::ConnectionRegistry;
