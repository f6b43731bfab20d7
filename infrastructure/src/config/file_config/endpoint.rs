//! Chat endpoint from TOML (`[endpoint]` section)

use serde::{Deserialize, Serialize};

/// Raw endpoint configuration from TOML
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileEndpointConfig {
    /// Host name or IP address of the chat backend
    pub host: String,
    /// TCP port of the chat backend
    pub port: u16,
}

impl Default for FileEndpointConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8765,
        }
    }
}

impl FileEndpointConfig {
    /// `host:port` for [`TcpTransport`](crate::transport::TcpTransport).
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
