use super::super::{CallToolResult, GeminiService, McpError};
use super::error::{backend_error, tool_text};

pub(in crate::tools::dispatch) async fn help(
    service: &GeminiService,
) -> Result<CallToolResult, McpError> {
    match service.backend.help_text().await {
        Ok(text) => Ok(tool_text(text)),
        Err(err) => Ok(backend_error(&err)),
    }
}
