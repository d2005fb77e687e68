mod common;

use common::*;
use recollect_core::EntryType;
use recollect_extract::PatternStrategy;
use recollect_import::{import, AcceptAll};

#[test]
fn test_imported_entries_answer_why() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);

    let ranked = recollect_rank::why(&store, "why did we pick postgresql?", 5).unwrap();
    assert_eq!(ranked.len(), 1);
    assert_eq!(ranked[0].entry.entry_type, EntryType::Decision);
    assert!(ranked[0].score.reasoning > 0.0);

    let by_reason = recollect_rank::search(&store, "ACID", None, 5).unwrap();
    assert_eq!(by_reason.len(), 1);
    assert_eq!(by_reason[0].entry.id, ranked[0].entry.id);
}

#[test]
fn test_null_reasoning_ranks_without_error() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);

    let ranked = recollect_rank::search(&store, "lock files", None, 5).unwrap();
    assert_eq!(ranked.len(), 1);
    assert!(ranked[0].entry.reasoning.is_none());
    assert_eq!(ranked[0].score.reasoning, 0.0);
}

#[test]
fn test_why_order_is_stable() {
    let temp = tempfile::TempDir::new().unwrap();
    let path = write_transcript(temp.path(), "s.jsonl", &sample_lines());
    let mut store = open_store(temp.path());
    import(&mut store, &[path], &PatternStrategy::new(), &execute(), &mut AcceptAll);

    let order = |q: &str| -> Vec<String> {
        recollect_rank::why(&store, q, 10)
            .unwrap()
            .into_iter()
            .map(|r| r.entry.id)
            .collect()
    };
    let first = order("database lock postgresql columns");
    assert_eq!(first.len(), 3);
    for _ in 0..3 {
        assert_eq!(order("database lock postgresql columns"), first);
    }
}
