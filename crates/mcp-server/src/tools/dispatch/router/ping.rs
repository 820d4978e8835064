use super::super::{CallToolResult, GeminiService, McpError};
use super::error::tool_text;
use crate::tools::schemas::ping::{PingRequest, DEFAULT_PING_MESSAGE};

pub(in crate::tools::dispatch) async fn ping(
    _service: &GeminiService,
    request: PingRequest,
) -> Result<CallToolResult, McpError> {
    let message = request
        .message
        .unwrap_or_else(|| DEFAULT_PING_MESSAGE.to_string());
    Ok(tool_text(message))
}
