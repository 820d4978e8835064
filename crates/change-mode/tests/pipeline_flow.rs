use gemini_change_mode::{
    cache_key_for_prompt, CacheMiss, ChangeModePipeline, ChunkBudget, ChunkStore, Chunker, Edit,
    ManualClock, PipelineOutcome, StoreConfig,
};
use pretty_assertions::assert_eq;
use std::sync::Arc;
use std::time::Duration;

fn edit_block(i: usize) -> String {
    format!(
        "**FILE: src/mod_{i}.rs:{}**\n```\nOLD:\nfn old_{i}() {{}}\nNEW:\nfn new_{i}() {{}}\n```\n\n",
        i * 10 + 1
    )
}

fn backend_output(n: usize) -> String {
    let mut out = String::from("Sure, here are the changes.\n\n");
    for i in 0..n {
        out.push_str(&edit_block(i));
    }
    out.push_str("Let me know if you need anything else.");
    out
}

fn pipeline_with(
    budget: ChunkBudget,
    config: StoreConfig,
) -> (ChangeModePipeline, Arc<ManualClock>) {
    let clock = Arc::new(ManualClock::starting_at(1_700_000_000_000));
    let store = ChunkStore::with_clock(&config, clock.clone()).expect("store");
    let chunker = Chunker::new(budget).expect("chunker");
    (ChangeModePipeline::new(chunker, Arc::new(store)), clock)
}

fn formatted(outcome: PipelineOutcome) -> gemini_change_mode::FormattedResult {
    match outcome {
        PipelineOutcome::Formatted(result) => result,
        other => panic!("expected formatted result, got {other:?}"),
    }
}

#[test]
fn single_edit_is_returned_directly_without_caching() {
    let (pipeline, _) = pipeline_with(ChunkBudget::default(), StoreConfig::in_memory());
    let raw = "**FILE: a.py:1**\n```\nOLD:\nfoo\nNEW:\nbar\n```";

    let result = formatted(pipeline.run("swap foo", raw).unwrap());
    assert_eq!(result.chunk_count, 1);
    assert_eq!(result.cache_key, None);
    assert!(result.text.starts_with("[CHANGEMODE OUTPUT]\n\n### Edit 1: a.py"));
    assert!(pipeline.store().is_empty());
    assert!(pipeline.fetch(&cache_key_for_prompt("swap foo"), 1).is_err());
}

#[test]
fn multi_chunk_result_is_cached_and_pageable() {
    let (pipeline, _) = pipeline_with(ChunkBudget::MaxEdits(5), StoreConfig::in_memory());
    let prompt = "rename every old_ function";

    let first = formatted(pipeline.run(prompt, &backend_output(12)).unwrap());
    let key = cache_key_for_prompt(prompt);
    assert_eq!(first.cache_key.as_deref(), Some(key.as_str()));
    assert_eq!(first.chunk_count, 3);
    assert!(first.text.starts_with(&format!(
        "ChangeMode Summary: 12 edits across 3 chunks.\nCacheKey: {key}\n\n"
    )));
    assert!(first.text.contains("[CHANGEMODE OUTPUT - Chunk 1 of 3]"));
    assert!(first
        .text
        .ends_with(&format!("Next chunk: fetch-chunk cacheKey=\"{key}\" chunkIndex=2")));

    let second = pipeline.fetch(&key, 2).unwrap();
    assert!(second.text.starts_with("[CHANGEMODE OUTPUT - Chunk 2 of 3]"));
    assert!(second.text.contains("### Edit 1: src/mod_5.rs"));
    assert!(second.text.contains("chunkIndex=3"));

    let third = pipeline.fetch(&key, 3).unwrap();
    assert!(third.text.contains("### Edit 2: src/mod_11.rs"));
    assert!(!third.text.contains("Next chunk"));

    assert_eq!(
        pipeline.fetch(&key, 4),
        Err(CacheMiss::IndexOutOfRange {
            index: 4,
            available: 3
        })
    );
}

#[test]
fn same_prompt_reuses_the_same_key() {
    let (pipeline, _) = pipeline_with(ChunkBudget::MaxEdits(2), StoreConfig::in_memory());
    let a = formatted(pipeline.run("same prompt", &backend_output(4)).unwrap());
    let b = formatted(pipeline.run("same prompt", &backend_output(4)).unwrap());
    assert_eq!(a, b);
    assert_eq!(pipeline.store().len(), 1);
}

#[test]
fn validation_failure_skips_chunking_and_reports_raw_text() {
    let (pipeline, _) = pipeline_with(ChunkBudget::MaxEdits(1), StoreConfig::in_memory());
    let raw = format!("{}**FILE: empty.rs:4**\n```\nOLD:\n\nNEW:\n\n```\n", edit_block(0));

    let outcome = pipeline.run("broken", &raw).unwrap();
    let PipelineOutcome::ValidationFailed(failure) = &outcome else {
        panic!("expected validation failure, got {outcome:?}");
    };
    assert_eq!(failure.defects.len(), 1);
    assert_eq!(
        outcome.render(),
        format!("Edit validation failed:\nempty.rs: empty edit\nRaw output:\n{raw}")
    );
    assert!(pipeline.store().is_empty());
}

#[test]
fn no_edits_is_a_reportable_outcome() {
    let (pipeline, _) = pipeline_with(ChunkBudget::default(), StoreConfig::in_memory());
    let outcome = pipeline.run("p", "I could not find anything to change.").unwrap();
    assert_eq!(
        outcome,
        PipelineOutcome::NoEdits {
            raw: "I could not find anything to change.".to_string()
        }
    );
    assert!(outcome.render().contains("No edits found"));
}

#[test]
fn cached_group_expires_after_ttl() {
    let config = StoreConfig {
        ttl: Duration::from_secs(30 * 60),
        ..StoreConfig::in_memory()
    };
    let (pipeline, clock) = pipeline_with(ChunkBudget::MaxEdits(1), config);
    let key = formatted(pipeline.run("p", &backend_output(2)).unwrap())
        .cache_key
        .unwrap();

    clock.advance(Duration::from_secs(29 * 60));
    assert!(pipeline.fetch(&key, 2).is_ok());

    clock.advance(Duration::from_secs(2 * 60));
    assert_eq!(pipeline.fetch(&key, 2), Err(CacheMiss::Absent { key }));
}

#[test]
fn file_backend_round_trips_and_evicts_oldest() {
    let tmp = tempfile::tempdir().unwrap();
    let config = StoreConfig {
        capacity: 2,
        ..StoreConfig::on_disk(tmp.path().join("chunks"))
    };
    let (pipeline, clock) = pipeline_with(ChunkBudget::MaxEdits(1), config);

    let mut keys = Vec::new();
    for i in 0..3 {
        clock.advance(Duration::from_secs(1));
        let result = formatted(pipeline.run(&format!("prompt {i}"), &backend_output(2)).unwrap());
        keys.push(result.cache_key.unwrap());
    }

    assert!(matches!(pipeline.fetch(&keys[0], 1), Err(CacheMiss::Absent { .. })));
    for key in &keys[1..] {
        let second = pipeline.fetch(key, 2).unwrap();
        assert!(second.text.contains("### Edit 1: src/mod_1.rs"));
    }

    let records = std::fs::read_dir(tmp.path().join("chunks"))
        .unwrap()
        .flatten()
        .filter(|e| e.path().extension().is_some_and(|ext| ext == "json"))
        .count();
    assert_eq!(records, 2);
}

#[test]
fn file_backend_treats_corrupt_records_as_misses() {
    let tmp = tempfile::tempdir().unwrap();
    let (pipeline, _) = pipeline_with(ChunkBudget::MaxEdits(1), StoreConfig::on_disk(tmp.path()));
    let key = formatted(pipeline.run("p", &backend_output(2)).unwrap())
        .cache_key
        .unwrap();

    let record = tmp.path().join(format!("{key}.json"));
    std::fs::write(&record, b"{ not json").unwrap();

    assert_eq!(pipeline.fetch(&key, 1), Err(CacheMiss::Absent { key }));
    assert!(!record.exists());
}

#[test]
fn file_backend_is_shared_between_store_instances() {
    let tmp = tempfile::tempdir().unwrap();
    let config = StoreConfig::on_disk(tmp.path());
    let (writer, _) = pipeline_with(ChunkBudget::MaxEdits(2), config.clone());
    let key = formatted(writer.run("shared", &backend_output(5)).unwrap())
        .cache_key
        .unwrap();

    let (reader, _) = pipeline_with(ChunkBudget::MaxEdits(2), config);
    let hit = reader.store().get(&key, 3).unwrap();
    assert_eq!(hit.total, 3);
    assert_eq!(
        hit.chunk.edits,
        vec![Edit::new("src/mod_4.rs", "fn old_4() {}", "fn new_4() {}")
            .with_ranges(
                gemini_change_mode::LineRange::new(41, 41),
                gemini_change_mode::LineRange::new(41, 41)
            )]
    );
}

#[test]
fn failed_cache_write_still_returns_first_chunk() {
    let tmp = tempfile::tempdir().unwrap();
    let dir = tmp.path().join("chunks");
    let (pipeline, _) = pipeline_with(ChunkBudget::MaxEdits(2), StoreConfig::on_disk(&dir));

    // Replace the cache directory with a plain file so the record write fails.
    std::fs::remove_dir_all(&dir).unwrap();
    std::fs::write(&dir, b"not a directory").unwrap();

    let result = formatted(pipeline.run("unlucky", &backend_output(3)).unwrap());
    assert_eq!(result.cache_key, None);
    assert_eq!(result.chunk_count, 2);
    assert!(result.text.starts_with("[CHANGEMODE OUTPUT - Chunk 1 of 2]"));
    assert!(result.text.contains("### Edit 2: src/mod_1.rs"));
    assert!(!result.text.contains("Next chunk"));
    assert!(result.text.contains("Chunks 2..2 could not be cached"));
}
