use chrono::Utc;
use criterion::{criterion_group, criterion_main, Criterion};
use recollect_extract::{ExtractionStrategy, PatternStrategy};
use recollect_transcript::{ContentBlock, Message, Role};
use std::hint::black_box;

fn sample_messages(n: usize) -> Vec<Message> {
    let texts = [
        "Let's use PostgreSQL because we need ACID guarantees for the ledger.",
        "Watch out for stale lock files after a crash. The problem was a missing fsync on close.",
        "I prefer snake_case for all database columns.",
        "## Summary\n\nThe importer now resumes from the last processed message and keeps the ledger monotonic across runs.",
        "ok",
    ];
    (0..n)
        .map(|i| Message {
            line: i + 1,
            id: Some(format!("m{i}")),
            parent_id: None,
            session_id: None,
            role: if i % 2 == 0 { Role::User } else { Role::Assistant },
            blocks: vec![ContentBlock::Text(texts[i % texts.len()].to_string())],
            timestamp: Utc::now(),
        })
        .collect()
}

fn bench_extract_500_messages(c: &mut Criterion) {
    let strategy = PatternStrategy::new();
    let messages = sample_messages(500);

    c.bench_function("extract_500_messages", |b| {
        b.iter(|| {
            for message in &messages {
                black_box(strategy.extract(black_box(message)).unwrap());
            }
        });
    });
}

criterion_group!(benches, bench_extract_500_messages);
criterion_main!(benches);
