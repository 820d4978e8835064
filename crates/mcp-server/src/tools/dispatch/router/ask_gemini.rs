use super::super::{CallToolResult, GeminiService, McpError};
use super::error::{backend_error, internal_error, tool_error, tool_text};
use crate::tools::schemas::ask_gemini::AskGeminiRequest;
use gemini_backend::{change_mode_prompt, GenerateOptions};
use gemini_change_mode::CacheMiss;

pub(in crate::tools::dispatch) const CHANGE_MODE_CACHE_MISS: &str =
    "Cache miss. Re-run changeMode prompt.";

pub(in crate::tools::dispatch) async fn ask_gemini(
    service: &GeminiService,
    request: AskGeminiRequest,
) -> Result<CallToolResult, McpError> {
    let change_mode = request.change_mode.unwrap_or(false);

    // Paging an earlier change-mode result never touches the backend.
    if change_mode {
        let key = request
            .chunk_cache_key
            .as_deref()
            .map(str::trim)
            .filter(|k| !k.is_empty());
        if let (Some(index), Some(key)) = (request.chunk_index, key) {
            return Ok(cached_chunk(service, key.to_string(), index).await);
        }
    }

    if request.prompt.trim().is_empty() {
        return Ok(tool_error("Please provide a prompt."));
    }

    let effective_prompt = if change_mode {
        change_mode_prompt(&request.prompt)
    } else {
        request.prompt.clone()
    };
    let options = GenerateOptions {
        model: request.model,
        sandbox: request.sandbox.unwrap_or(false),
    };
    let raw = match service.backend.generate(&effective_prompt, &options).await {
        Ok(raw) => raw,
        Err(err) => return Ok(backend_error(&err)),
    };

    if !change_mode {
        return Ok(tool_text(format!("Gemini response:\n{raw}")));
    }

    let pipeline = service.pipeline.clone();
    let prompt = request.prompt;
    match tokio::task::spawn_blocking(move || pipeline.run(&prompt, &raw)).await {
        Ok(Ok(outcome)) => Ok(tool_text(outcome.render())),
        Ok(Err(err)) => Ok(internal_error("change-mode processing failed", err)),
        Err(err) => Ok(internal_error("change-mode processing failed", err)),
    }
}

async fn cached_chunk(service: &GeminiService, key: String, index: usize) -> CallToolResult {
    let pipeline = service.pipeline.clone();
    match tokio::task::spawn_blocking(move || pipeline.fetch(&key, index)).await {
        Ok(Ok(result)) => tool_text(result.text),
        Ok(Err(CacheMiss::Absent { .. })) => tool_text(CHANGE_MODE_CACHE_MISS),
        Ok(Err(miss)) => tool_text(miss.to_string()),
        Err(err) => internal_error("chunk lookup failed", err),
    }
}
