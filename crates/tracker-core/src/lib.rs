//! # tracker-core
//!
//! Domain types shared by the tracker crates.
//!
//! - [`events`]: the tagged payloads pushed to every connected client
//! - [`items`]: sheet row layout, checked-marker rules, date filtering
//! - [`clock`]: fixed-offset clock and the cutoff-hour date rollover

#![deny(unsafe_code)]

pub mod clock;
pub mod events;
pub mod items;

pub use clock::{Clock, FixedClock, SystemClock, format_date, format_time, target_date};
pub use events::ChecklistEvent;
pub use items::{CHECKED_MARKER, ChecklistItem, is_checked_marker, items_for_date};
