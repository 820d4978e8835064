use rmcp::schemars;
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize, Serialize, schemars::JsonSchema, Default)]
#[serde(rename_all = "camelCase")]
pub struct AskGeminiRequest {
    /// Question or task for the model
    #[schemars(
        description = "Prompt for Gemini. May be empty only when paging a cached change-mode result."
    )]
    #[serde(default)]
    pub prompt: String,

    #[schemars(
        description = "Fallback model used when the preview model fails (default: gemini-2.5-pro)"
    )]
    pub model: Option<String>,

    #[schemars(description = "Run the Gemini CLI in sandbox mode (-s). Default: false")]
    pub sandbox: Option<bool>,

    /// Structured edit output
    #[schemars(
        description = "Ask for structured **FILE: path:line** OLD/NEW edits and return them in pageable chunks. Default: false"
    )]
    pub change_mode: Option<bool>,

    #[schemars(
        description = "1-based chunk to return from a cached change-mode result (requires changeMode and chunkCacheKey)"
    )]
    pub chunk_index: Option<usize>,

    #[schemars(description = "Cache key printed with the first chunk of a change-mode result")]
    pub chunk_cache_key: Option<String>,
}
