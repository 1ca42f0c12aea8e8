//! Server configuration.

use serde::{Deserialize, Serialize};

/// Bind address for the tracker server.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host to bind (default `"127.0.0.1"`).
    pub host: String,
    /// Port to bind (default `0` for auto-assign).
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 0,
        }
    }
}

impl ServerConfig {
    /// `host:port` for `TcpListener::bind`.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

/// Sheet layout and date rollover for the checklist.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ChecklistConfig {
    /// Sheet (tab) holding the rows.
    pub sheet_name: String,
    /// Hour (0-23) from which new items are filed under tomorrow.
    pub cutoff_hour: u32,
}

impl Default for ChecklistConfig {
    fn default() -> Self {
        Self {
            sheet_name: "データ".into(),
            cutoff_hour: 18,
        }
    }
}
