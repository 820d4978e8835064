use crate::chunker::Chunker;
use crate::config::ChangeModeConfig;
use crate::error::Result;
use crate::formatter::{format_chunk, format_summary};
use crate::parser::parse_edits;
use crate::store::{CacheMiss, ChunkStore};
use crate::types::ChunkGroup;
use crate::validator::{validate_edits, EditDefect};
use std::sync::Arc;

/// Caller-facing rendering of one chunk
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormattedResult {
    pub text: String,
    /// 1-based index of the rendered chunk
    pub chunk_index: usize,
    pub chunk_count: usize,
    /// Present when the group was cached for paging
    pub cache_key: Option<String>,
}

/// Extracted edits failed validation; nothing was chunked or cached
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationFailure {
    pub defects: Vec<EditDefect>,
    pub raw: String,
}

impl ValidationFailure {
    /// Defects followed by the raw backend text, for a human to diagnose
    #[must_use]
    pub fn render(&self) -> String {
        let defects: Vec<String> = self.defects.iter().map(ToString::to_string).collect();
        format!(
            "Edit validation failed:\n{}\nRaw output:\n{}",
            defects.join("\n"),
            self.raw
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PipelineOutcome {
    /// First (or only) chunk, ready to return
    Formatted(FormattedResult),
    /// The backend text contained no edit blocks
    NoEdits { raw: String },
    ValidationFailed(ValidationFailure),
}

impl PipelineOutcome {
    /// Text to hand back to the caller
    #[must_use]
    pub fn render(&self) -> String {
        match self {
            Self::Formatted(result) => result.text.clone(),
            Self::NoEdits { raw } => {
                format!(
                    "[CHANGEMODE OUTPUT]\n\nNo edits found in backend output.\nRaw output:\n{raw}"
                )
            }
            Self::ValidationFailed(failure) => failure.render(),
        }
    }
}

/// Parse → validate → chunk → cache → format, plus cached chunk retrieval
#[derive(Debug, Clone)]
pub struct ChangeModePipeline {
    chunker: Chunker,
    store: Arc<ChunkStore>,
}

impl ChangeModePipeline {
    #[must_use]
    pub const fn new(chunker: Chunker, store: Arc<ChunkStore>) -> Self {
        Self { chunker, store }
    }

    /// Build the chunker and store described by `config`
    pub fn from_config(config: &ChangeModeConfig) -> Result<Self> {
        let chunker = Chunker::new(config.budget)?;
        let store = ChunkStore::new(&config.store)?;
        Ok(Self::new(chunker, Arc::new(store)))
    }

    #[must_use]
    pub fn store(&self) -> &Arc<ChunkStore> {
        &self.store
    }

    /// Turn raw backend output for `prompt` into the first chunk to show.
    ///
    /// Only results spanning more than one chunk are cached, under a key derived from
    /// `prompt`, so re-running the same prompt reuses the same key. When caching fails the
    /// first chunk is still returned, without pagination.
    pub fn run(&self, prompt: &str, raw_backend_output: &str) -> Result<PipelineOutcome> {
        let edits = parse_edits(raw_backend_output);
        if let Err(defects) = validate_edits(&edits) {
            log::info!("Change-mode output failed validation ({} defects)", defects.len());
            return Ok(PipelineOutcome::ValidationFailed(ValidationFailure {
                defects,
                raw: raw_backend_output.to_string(),
            }));
        }

        let chunks = self.chunker.chunk(&edits);
        if chunks.is_empty() {
            return Ok(PipelineOutcome::NoEdits {
                raw: raw_backend_output.to_string(),
            });
        }

        let chunk_count = chunks.len();
        if chunk_count == 1 {
            let text = format_chunk(&chunks[0], 1, 1, None);
            return Ok(PipelineOutcome::Formatted(FormattedResult {
                text,
                chunk_index: 1,
                chunk_count,
                cache_key: None,
            }));
        }

        let first = chunks[0].clone();
        let key = match self.store.put(ChunkGroup::new(prompt, chunks)) {
            Ok(key) => key,
            Err(err) => {
                log::warn!("Failed to cache {chunk_count} change-mode chunks: {err}");
                let text = format!(
                    "{}\n\nChunks 2..{chunk_count} could not be cached: {err}",
                    format_chunk(&first, 1, chunk_count, None)
                );
                return Ok(PipelineOutcome::Formatted(FormattedResult {
                    text,
                    chunk_index: 1,
                    chunk_count,
                    cache_key: None,
                }));
            }
        };
        log::debug!(
            "Change-mode produced {} edits in {chunk_count} chunks (key {key})",
            edits.len()
        );

        let text = format!(
            "{}{}",
            format_summary(edits.len(), chunk_count, &key),
            format_chunk(&first, 1, chunk_count, Some(&key))
        );
        Ok(PipelineOutcome::Formatted(FormattedResult {
            text,
            chunk_index: 1,
            chunk_count,
            cache_key: Some(key),
        }))
    }

    /// Render chunk `index` (1-based) of a previously cached group
    pub fn fetch(
        &self,
        key: &str,
        index: usize,
    ) -> std::result::Result<FormattedResult, CacheMiss> {
        let hit = self.store.get(key, index)?;
        Ok(FormattedResult {
            text: format_chunk(&hit.chunk, hit.index, hit.total, Some(key)),
            chunk_index: hit.index,
            chunk_count: hit.total,
            cache_key: Some(key.to_string()),
        })
    }
}
