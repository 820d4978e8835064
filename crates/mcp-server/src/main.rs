//! Gemini MCP Server
//!
//! Exposes the local Gemini CLI to AI agents via the MCP protocol.
//!
//! ## Tools
//!
//! - `ask_gemini` - Ask a question; `changeMode` returns structured, pageable edits
//! - `fetch_chunk` - Read further chunks of a cached change-mode result
//! - `brainstorm` - Methodology-driven idea generation
//! - `help`, `ping`, `timeout_test` - Diagnostics
//!
//! ## Usage
//!
//! Add to your MCP client configuration:
//! ```json
//! {
//!   "mcpServers": {
//!     "gemini": {
//!       "command": "gemini-mcp"
//!     }
//!   }
//! }
//! ```

use anyhow::Result;
use rmcp::transport::stdio;
use rmcp::ServiceExt;

mod config;
mod tools;

use tools::GeminiService;

#[tokio::main]
async fn main() -> Result<()> {
    // Configure logging to stderr only (stdout is for MCP protocol)
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
        .target(env_logger::Target::Stderr)
        .init();

    log::info!("Starting Gemini MCP server");

    let service = GeminiService::new()?;
    let server = service.serve(stdio()).await?;

    server.waiting().await?;

    log::info!("Gemini MCP server stopped");
    Ok(())
}
