use crate::types::Chunk;
use std::fmt::Write;

/// Render one chunk for the caller.
///
/// Edits keep their original order. Pagination lines appear only when `total > 1`; the
/// "next chunk" hint additionally needs a cache key and a following chunk.
#[must_use]
pub fn format_chunk(chunk: &Chunk, index: usize, total: usize, cache_key: Option<&str>) -> String {
    let mut out = if total > 1 {
        format!("[CHANGEMODE OUTPUT - Chunk {index} of {total}]\n\n")
    } else {
        "[CHANGEMODE OUTPUT]\n\n".to_string()
    };

    let body: Vec<String> = chunk
        .edits
        .iter()
        .enumerate()
        .map(|(i, edit)| {
            format!(
                "### Edit {}: {}\n\nReplace this exact text:\n```\n{}\n```\n\nWith this text:\n```\n{}\n```\n",
                i + 1,
                edit.file,
                edit.old_text,
                edit.new_text
            )
        })
        .collect();
    out.push_str(&body.join("\n"));

    out.push_str("\nApply these edits in order.");
    if let Some(key) = cache_key {
        if index < total {
            let _ = write!(
                out,
                "\n\nNext chunk: fetch-chunk cacheKey=\"{key}\" chunkIndex={}",
                index + 1
            );
        }
    }
    out
}

/// Header line that precedes the first chunk of a multi-chunk result
#[must_use]
pub fn format_summary(edit_count: usize, chunk_count: usize, cache_key: &str) -> String {
    format!(
        "ChangeMode Summary: {edit_count} edits across {chunk_count} chunks.\nCacheKey: {cache_key}\n\n"
    )
}
