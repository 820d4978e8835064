use super::schemas::ask_gemini::AskGeminiRequest;
use super::schemas::brainstorm::BrainstormRequest;
use super::schemas::fetch_chunk::FetchChunkRequest;
use super::schemas::ping::PingRequest;
use super::schemas::timeout_test::TimeoutTestRequest;
use gemini_backend::TextBackend;
use gemini_change_mode::ChangeModePipeline;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::{CallToolResult, Content};
use rmcp::{tool, tool_router, ErrorData as McpError};
use std::sync::Arc;

mod router;
mod service;

/// Gemini MCP Service
#[derive(Clone)]
pub struct GeminiService {
    /// Text generator (the gemini CLI in production)
    backend: Arc<dyn TextBackend>,
    /// Change-mode parsing, chunking and chunk cache (shared across connections)
    pipeline: Arc<ChangeModePipeline>,
    /// Tool router
    tool_router: ToolRouter<Self>,
}

#[tool_router]
impl GeminiService {
    /// Connectivity check
    #[tool(description = "Echo a message back. Use it to check that the server is reachable.")]
    pub async fn ping(
        &self,
        Parameters(request): Parameters<PingRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::ping::ping(self, request).await
    }

    /// Gemini CLI usage
    #[tool(description = "Show the Gemini CLI help text.")]
    pub async fn help(&self) -> Result<CallToolResult, McpError> {
        router::help::help(self).await
    }

    /// Ask Gemini, optionally as structured change-mode edits
    #[tool(
        description = "Ask Gemini a question. With changeMode=true the answer is parsed into **FILE: path:line** OLD/NEW edits; large edit sets are split into chunks and the first reply carries a cacheKey. Pass changeMode, chunkIndex and chunkCacheKey to read another chunk without re-running the model."
    )]
    pub async fn ask_gemini(
        &self,
        Parameters(request): Parameters<AskGeminiRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::ask_gemini::ask_gemini(self, request).await
    }

    /// Structured idea generation
    #[tool(
        description = "Brainstorm ideas for a challenge using a methodology (divergent, convergent, scamper, design-thinking, lateral, auto), optionally scoring each idea."
    )]
    pub async fn brainstorm(
        &self,
        Parameters(request): Parameters<BrainstormRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::brainstorm::brainstorm(self, request).await
    }

    /// Read one chunk of a cached change-mode result
    #[tool(
        description = "Return chunk chunkIndex (1-based) of a cached change-mode result identified by cacheKey."
    )]
    pub async fn fetch_chunk(
        &self,
        Parameters(request): Parameters<FetchChunkRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::fetch_chunk::fetch_chunk(self, request).await
    }

    /// Long-running call for client timeout checks
    #[tool(
        description = "Sleep for `duration` milliseconds in steps of at most 5s and report progress. Use it to check client timeouts."
    )]
    pub async fn timeout_test(
        &self,
        Parameters(request): Parameters<TimeoutTestRequest>,
    ) -> Result<CallToolResult, McpError> {
        router::timeout_test::timeout_test(self, request).await
    }
}
