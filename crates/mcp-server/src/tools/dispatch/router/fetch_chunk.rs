use super::super::{CallToolResult, GeminiService, McpError};
use super::error::{internal_error, tool_text};
use crate::tools::schemas::fetch_chunk::FetchChunkRequest;
use gemini_change_mode::CacheMiss;

pub(in crate::tools::dispatch) async fn fetch_chunk(
    service: &GeminiService,
    request: FetchChunkRequest,
) -> Result<CallToolResult, McpError> {
    let pipeline = service.pipeline.clone();
    let key = request.cache_key.trim().to_string();
    let index = request.chunk_index;
    let fetched = tokio::task::spawn_blocking(move || pipeline.fetch(&key, index)).await;

    let text = match fetched {
        Ok(Ok(result)) => result.text,
        Ok(Err(miss @ CacheMiss::Absent { .. })) => format!(
            "{miss}. TTL {} minutes.",
            service.pipeline.store().ttl().as_secs() / 60
        ),
        Ok(Err(miss)) => miss.to_string(),
        Err(err) => return Ok(internal_error("chunk lookup failed", err)),
    };
    Ok(tool_text(text))
}
