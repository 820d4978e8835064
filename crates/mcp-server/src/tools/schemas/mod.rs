//! Request schemas for every tool. Field names follow the camelCase wire format.

pub(crate) mod ask_gemini;
pub(crate) mod brainstorm;
pub(crate) mod fetch_chunk;
pub(crate) mod ping;
pub(crate) mod timeout_test;
