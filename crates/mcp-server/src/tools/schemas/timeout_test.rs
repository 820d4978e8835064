use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema)]
pub struct TimeoutTestRequest {
    /// Total time to spend, in milliseconds
    #[schemars(description = "Duration to sleep in milliseconds (>= 10)")]
    pub duration: u64,
}
