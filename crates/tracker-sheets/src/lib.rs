//! # tracker-sheets
//!
//! Row storage for the checklist.
//!
//! - [`RowStore`]: async read / append / update over A1 ranges
//! - [`SheetsClient`]: Google Sheets v4 values API, authenticated with a
//!   service-account key ([`ServiceAccountAuth`])
//! - [`InMemoryRowStore`]: process-local grid for tests and offline runs

#![deny(unsafe_code)]

pub mod auth;
pub mod client;
pub mod error;
pub mod memory;
pub mod range;
pub mod store;

pub use auth::{ServiceAccountAuth, ServiceAccountKey, StaticToken, TokenProvider};
pub use client::{SheetsClient, SheetsConfig, build_http_client};
pub use error::SheetsError;
pub use memory::InMemoryRowStore;
pub use range::{CellRange, Column};
pub use store::RowStore;
