// Per-tool dispatch functions used by the MCP tool router.

pub(super) mod ask_gemini;
pub(super) mod brainstorm;
pub(super) mod error;
pub(super) mod fetch_chunk;
pub(super) mod help;
pub(super) mod ping;
