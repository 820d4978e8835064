use crate::config::ChunkBudget;
use crate::error::{ChangeModeError, Result};
use crate::types::{Chunk, Edit};

/// Fixed per-edit allowance for the headings and fences the formatter wraps around an edit.
///
/// Must stay constant across calls: identical sequences have to chunk identically so a cached
/// group matches what a re-run would produce.
pub const EDIT_RENDER_OVERHEAD: usize = 250;

/// Approximate rendered size of one edit.
///
/// The file name is counted twice because it appears in the heading and is usually repeated in
/// the surrounding prose of the response.
#[must_use]
pub fn estimate_edit_chars(edit: &Edit) -> usize {
    edit.file
        .len()
        .saturating_mul(2)
        .saturating_add(edit.old_text.len())
        .saturating_add(edit.new_text.len())
        .saturating_add(EDIT_RENDER_OVERHEAD)
}

/// Splits edit sequences into ordered, budget-bounded chunks
#[derive(Debug, Clone, Copy)]
pub struct Chunker {
    budget: ChunkBudget,
}

impl Chunker {
    /// Create a chunker, rejecting zero budgets
    pub fn new(budget: ChunkBudget) -> Result<Self> {
        budget.validate().map_err(ChangeModeError::invalid_config)?;
        Ok(Self { budget })
    }

    #[must_use]
    pub const fn budget(&self) -> ChunkBudget {
        self.budget
    }

    /// Partition `edits` into chunks, preserving order.
    ///
    /// An empty sequence yields no chunks. An edit larger than the whole budget is placed in a
    /// chunk of its own rather than rejected.
    #[must_use]
    pub fn chunk(&self, edits: &[Edit]) -> Vec<Chunk> {
        match self.budget {
            ChunkBudget::MaxEdits(max) => edits
                .chunks(max)
                .map(|slice| Chunk::new(slice.to_vec()))
                .collect(),
            ChunkBudget::MaxChars(max) => Self::chunk_by_size(edits, max),
        }
    }

    fn chunk_by_size(edits: &[Edit], max_chars: usize) -> Vec<Chunk> {
        let mut chunks = Vec::new();
        let mut current: Vec<Edit> = Vec::new();
        let mut size = 0usize;

        for edit in edits {
            let estimate = estimate_edit_chars(edit);
            if !current.is_empty() && size.saturating_add(estimate) > max_chars {
                chunks.push(Chunk::new(std::mem::take(&mut current)));
                size = 0;
            }
            current.push(edit.clone());
            size = size.saturating_add(estimate);
        }

        if !current.is_empty() {
            chunks.push(Chunk::new(current));
        }
        chunks
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self {
            budget: ChunkBudget::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn edits(n: usize) -> Vec<Edit> {
        (0..n)
            .map(|i| Edit::new(format!("src/file_{i}.rs"), format!("old {i}"), format!("new {i}")))
            .collect()
    }

    fn flatten(chunks: &[Chunk]) -> Vec<Edit> {
        chunks.iter().flat_map(|c| c.edits.iter().cloned()).collect()
    }

    #[test]
    fn count_budget_splits_twelve_into_five_five_two() {
        let input = edits(12);
        let chunker = Chunker::new(ChunkBudget::MaxEdits(5)).unwrap();
        let chunks = chunker.chunk(&input);
        let sizes: Vec<_> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![5, 5, 2]);
        assert_eq!(flatten(&chunks), input);
    }

    #[test]
    fn empty_sequence_yields_no_chunks() {
        assert!(Chunker::default().chunk(&[]).is_empty());
        assert!(Chunker::new(ChunkBudget::MaxEdits(3))
            .unwrap()
            .chunk(&[])
            .is_empty());
    }

    #[test]
    fn size_budget_keeps_small_sequences_together() {
        let input = edits(3);
        let chunks = Chunker::default().chunk(&input);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].edits, input);
    }

    #[test]
    fn size_budget_respects_capacity() {
        let input = edits(10);
        let per_edit = estimate_edit_chars(&input[0]);
        let chunker = Chunker::new(ChunkBudget::MaxChars(per_edit * 3)).unwrap();
        let chunks = chunker.chunk(&input);

        let sizes: Vec<_> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![3, 3, 3, 1]);
        for chunk in &chunks {
            let total: usize = chunk.edits.iter().map(estimate_edit_chars).sum();
            assert!(total <= per_edit * 3);
        }
        assert_eq!(flatten(&chunks), input);
    }

    #[test]
    fn oversized_edit_gets_its_own_chunk() {
        let mut input = edits(2);
        input.insert(1, Edit::new("huge.txt", "x".repeat(5_000), "y".repeat(5_000)));
        let chunker = Chunker::new(ChunkBudget::MaxChars(1_000)).unwrap();
        let chunks = chunker.chunk(&input);

        let sizes: Vec<_> = chunks.iter().map(Chunk::len).collect();
        assert_eq!(sizes, vec![1, 1, 1]);
        assert_eq!(chunks[1].edits[0].file, "huge.txt");
        assert_eq!(flatten(&chunks), input);
    }

    #[test]
    fn chunking_is_deterministic_and_lossless() {
        let input: Vec<Edit> = (0..40)
            .map(|i| Edit::new(format!("f{i}"), "a".repeat(i * 37 % 500), "b".repeat(i * 53 % 700)))
            .collect();
        for budget in [
            ChunkBudget::MaxChars(300),
            ChunkBudget::MaxChars(1_200),
            ChunkBudget::MaxChars(20_000),
            ChunkBudget::MaxEdits(1),
            ChunkBudget::MaxEdits(7),
        ] {
            let chunker = Chunker::new(budget).unwrap();
            let first = chunker.chunk(&input);
            let second = chunker.chunk(&input);
            assert_eq!(first, second, "{budget:?}");
            assert_eq!(flatten(&first), input, "{budget:?}");
            assert!(first.iter().all(|c| !c.is_empty()), "{budget:?}");
        }
    }

    #[test]
    fn zero_budget_is_rejected() {
        assert!(Chunker::new(ChunkBudget::MaxChars(0)).is_err());
        assert!(Chunker::new(ChunkBudget::MaxEdits(0)).is_err());
    }
}
