use rmcp::schemars;
use serde::{Deserialize, Serialize};

pub const DEFAULT_PING_MESSAGE: &str = "pong";

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema, Default)]
pub struct PingRequest {
    /// Text to echo back
    #[schemars(description = "Message to echo back (default: 'pong')")]
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}
