use super::super::{CallToolResult, Content};
use gemini_backend::BackendError;

/// Domain failure reported to the caller as tool output (`isError: true`)
pub(in crate::tools::dispatch) fn tool_error(message: impl Into<String>) -> CallToolResult {
    CallToolResult::error(vec![Content::text(message.into())])
}

pub(in crate::tools::dispatch) fn tool_text(text: impl Into<String>) -> CallToolResult {
    CallToolResult::success(vec![Content::text(text.into())])
}

pub(in crate::tools::dispatch) fn backend_error(err: &BackendError) -> CallToolResult {
    log::warn!("gemini invocation failed: {err}");
    tool_error(err.to_string())
}

pub(in crate::tools::dispatch) fn internal_error(
    context: &str,
    err: impl std::fmt::Display,
) -> CallToolResult {
    log::error!("{context}: {err}");
    tool_error(format!("{context}: {err}"))
}
