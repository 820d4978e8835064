//! Gemini MCP tool surface.
//!
//! Schemas, dispatch and per-tool implementations live in separate submodules.

pub(crate) mod catalog;
mod dispatch;
mod schemas;

pub use dispatch::GeminiService;
