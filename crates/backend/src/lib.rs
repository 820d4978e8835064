//! # Gemini Backend
//!
//! Text generation through the local `gemini` CLI.
//!
//! Every request tries [`PRIMARY_MODEL`] first, then the requested model (or
//! [`MODEL_PRO`]). When that attempt fails on the Pro quota the request is
//! retried once with [`MODEL_FLASH`].
//!
//! Callers depend on [`TextBackend`] so the server can be exercised without a
//! real CLI installed.

mod cli;
mod error;
mod prompts;

pub use cli::{
    model_attempts, GeminiCli, GenerateOptions, TextBackend, DEFAULT_TIMEOUT, MODEL_FLASH,
    MODEL_PRO, PRIMARY_MODEL, QUOTA_EXCEEDED_MARKER,
};
pub use error::{BackendError, Result};
pub use prompts::{
    brainstorm_prompt, change_mode_prompt, BrainstormOptions, Methodology, DEFAULT_IDEA_COUNT,
};
