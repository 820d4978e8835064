//! # Gemini Change Mode
//!
//! Turns free-form model output into ordered, pageable file edits.
//!
//! ## Architecture
//!
//! ```text
//! Backend output (text)
//!     │
//!     ├──> Parser      **FILE: path:line** + OLD:/NEW: blocks → Vec<Edit>
//!     │
//!     ├──> Validator   structural defects short-circuit everything below
//!     │
//!     ├──> Chunker     size- or count-bounded, order-preserving partition
//!     │
//!     ├──> ChunkStore  only multi-chunk groups; TTL + oldest-first eviction
//!     │
//!     └──> Formatter   first chunk + pagination hint (cacheKey, next index)
//! ```
//!
//! A cached group is later served chunk by chunk through [`ChangeModePipeline::fetch`]
//! without re-running the backend.
//!
//! ## Example
//!
//! ```rust
//! use gemini_change_mode::{ChangeModePipeline, ChunkStore, Chunker, PipelineOutcome, StoreConfig};
//! use std::sync::Arc;
//!
//! let store = Arc::new(ChunkStore::new(&StoreConfig::in_memory()).unwrap());
//! let pipeline = ChangeModePipeline::new(Chunker::default(), store);
//!
//! let raw = "**FILE: a.py:1**\n```\nOLD:\nfoo\nNEW:\nbar\n```";
//! match pipeline.run("rename foo", raw).unwrap() {
//!     PipelineOutcome::Formatted(result) => {
//!         assert_eq!(result.chunk_count, 1);
//!         assert!(result.cache_key.is_none());
//!     }
//!     other => panic!("unexpected outcome: {other:?}"),
//! }
//! ```

mod chunker;
mod config;
mod error;
mod formatter;
mod key;
mod parser;
mod pipeline;
mod store;
mod types;
mod validator;

pub use chunker::{estimate_edit_chars, Chunker, EDIT_RENDER_OVERHEAD};
pub use config::{
    CacheBackend, ChangeModeConfig, ChunkBudget, StoreConfig, CACHE_DIR_NAME, DEFAULT_CACHE_LIMIT,
    DEFAULT_CACHE_TTL, DEFAULT_MAX_CHUNK_CHARS,
};
pub use error::{ChangeModeError, Result};
pub use formatter::{format_chunk, format_summary};
pub use key::{cache_key_for_prompt, is_well_formed_key, prompt_digest, CACHE_KEY_LEN};
pub use parser::parse_edits;
pub use pipeline::{ChangeModePipeline, FormattedResult, PipelineOutcome, ValidationFailure};
pub use store::{CacheMiss, ChunkHit, ChunkStore, Clock, ManualClock, SystemClock};
pub use types::{Chunk, ChunkGroup, Edit, LineRange};
pub use validator::{validate_edits, DefectKind, EditDefect};
