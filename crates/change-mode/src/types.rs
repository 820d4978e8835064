use serde::{Deserialize, Serialize};

/// Inclusive 1-indexed line range
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineRange {
    /// Start line (1-indexed)
    pub start: usize,

    /// End line (1-indexed, inclusive)
    pub end: usize,
}

impl LineRange {
    #[must_use]
    pub const fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// Range covering `line_count` lines starting at `start`.
    ///
    /// An empty block still anchors at `start` (zero lines collapse to `start..=start`).
    /// The end saturates at `usize::MAX`.
    #[must_use]
    pub const fn spanning(start: usize, line_count: usize) -> Self {
        let end = if line_count == 0 {
            start
        } else {
            start.saturating_add(line_count - 1)
        };
        Self { start, end }
    }

    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.start <= self.end
    }
}

/// One proposed replacement of `old_text` by `new_text` in `file`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Edit {
    /// File identifier as produced by the backend (not checked against a filesystem)
    pub file: String,

    /// Exact text expected in the file; empty means pure insertion
    pub old_text: String,

    /// Replacement text; empty means pure deletion
    pub new_text: String,

    /// Advisory range of the old text, derived from the header line number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub old_range: Option<LineRange>,

    /// Advisory range of the new text, derived from the header line number
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_range: Option<LineRange>,
}

impl Edit {
    /// Create an edit without positional hints
    #[must_use]
    pub fn new(
        file: impl Into<String>,
        old_text: impl Into<String>,
        new_text: impl Into<String>,
    ) -> Self {
        Self {
            file: file.into(),
            old_text: old_text.into(),
            new_text: new_text.into(),
            old_range: None,
            new_range: None,
        }
    }

    /// Builder: set both advisory ranges
    #[must_use]
    pub const fn with_ranges(mut self, old_range: LineRange, new_range: LineRange) -> Self {
        self.old_range = Some(old_range);
        self.new_range = Some(new_range);
        self
    }

    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.old_text.is_empty() && self.new_text.is_empty()
    }
}

/// Contiguous slice of an edit sequence delivered as one page
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Chunk {
    pub edits: Vec<Edit>,
}

impl Chunk {
    #[must_use]
    pub const fn new(edits: Vec<Edit>) -> Self {
        Self { edits }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.edits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.edits.is_empty()
    }
}

/// All chunks produced from one backend response, plus provenance
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ChunkGroup {
    /// Hex SHA-256 digest of the originating prompt
    pub prompt_digest: String,

    /// Chunks in delivery order
    pub chunks: Vec<Chunk>,

    /// Creation time (unix ms); stamped by the store when the group is cached
    #[serde(default)]
    pub created_unix_ms: u64,
}

impl ChunkGroup {
    /// Build a group for `prompt`; the timestamp is left for the store to stamp
    #[must_use]
    pub fn new(prompt: &str, chunks: Vec<Chunk>) -> Self {
        Self {
            prompt_digest: crate::key::prompt_digest(prompt),
            chunks,
            created_unix_ms: 0,
        }
    }

    /// Cache key derived from the prompt digest
    #[must_use]
    pub fn cache_key(&self) -> String {
        crate::key::key_from_digest(&self.prompt_digest)
    }

    #[must_use]
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    #[must_use]
    pub fn edit_count(&self) -> usize {
        self.chunks.iter().map(Chunk::len).sum()
    }
}
