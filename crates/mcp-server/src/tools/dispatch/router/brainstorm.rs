use super::super::{CallToolResult, GeminiService, McpError};
use super::error::{backend_error, tool_error, tool_text};
use crate::tools::schemas::brainstorm::BrainstormRequest;
use gemini_backend::{brainstorm_prompt, BrainstormOptions, GenerateOptions};

pub(in crate::tools::dispatch) async fn brainstorm(
    service: &GeminiService,
    request: BrainstormRequest,
) -> Result<CallToolResult, McpError> {
    if request.prompt.trim().is_empty() {
        return Ok(tool_error("You must provide a brainstorming prompt."));
    }

    let defaults = BrainstormOptions::new(request.prompt.as_str());
    let options = BrainstormOptions {
        methodology: request
            .methodology
            .unwrap_or_else(|| defaults.methodology.clone()),
        domain: request.domain,
        constraints: request.constraints,
        existing_context: request.existing_context,
        idea_count: request.idea_count.unwrap_or(defaults.idea_count),
        include_analysis: request.include_analysis.unwrap_or(defaults.include_analysis),
        ..defaults
    };
    let generate = GenerateOptions {
        model: request.model,
        sandbox: false,
    };

    match service
        .backend
        .generate(&brainstorm_prompt(&options), &generate)
        .await
    {
        Ok(text) => Ok(tool_text(text)),
        Err(err) => Ok(backend_error(&err)),
    }
}
