// tests/digest_gate.rs
//
// The scheduled `summary` operation: minimum-batch gate, mark-used
// atomicity w.r.t. digest success, and the happy path.

use std::sync::Arc;

use ai_news_curator::curate::{Curator, CuratorConfig, SummaryOutcome};
use ai_news_curator::fingerprint::Fingerprint;
use ai_news_curator::model::{ArticleRecord, SourceLang};
use ai_news_curator::oracle::MockOracle;
use ai_news_curator::store::{ArticleStore, MemoryStore};
use chrono::{Duration, Utc};

fn unused_record(id: &str, importance: u8, age_hours: i64) -> ArticleRecord {
    ArticleRecord {
        id: id.to_string(),
        title: format!("Article {id}"),
        url: format!("https://example.com/{id}"),
        summary: "s".into(),
        source_name: "Example Wire".into(),
        source_lang: SourceLang::En,
        fingerprint: Fingerprint::of(&format!("https://example.com/{id}"), id),
        primary_source: None,
        importance_score: importance,
        used_in_digest: false,
        created_at: Some(Utc::now() - Duration::hours(age_hours)),
        date: None,
    }
}

fn curator(oracle: Arc<MockOracle>, store: Arc<MemoryStore>) -> Curator {
    Curator::new(
        oracle.clone(),
        oracle.clone(),
        oracle.clone(),
        oracle,
        store,
        CuratorConfig::default(),
    )
}

#[tokio::test]
async fn below_minimum_skips_without_touching_oracle_or_store() {
    for unused_count in 0..3usize {
        let oracle = Arc::new(MockOracle::new());
        let records = (0..unused_count)
            .map(|i| unused_record(&format!("r{i}"), 3, 1))
            .collect();
        let store = Arc::new(MemoryStore::with_records(records));
        let c = curator(oracle.clone(), store.clone());

        let outcome = c.summary().await;
        assert!(
            matches!(outcome, SummaryOutcome::Skipped { unused, minimum: 3 } if unused == unused_count),
            "expected skip at {unused_count} records"
        );
        // Zero digest-oracle calls and zero mark-used flips.
        assert_eq!(oracle.thread_calls(), 0);
        assert_eq!(store.unused().await.unwrap().len(), unused_count);
    }
}

#[tokio::test]
async fn digest_failure_marks_nothing_used() {
    let oracle = Arc::new(MockOracle::new().with_failing_thread());
    let store = Arc::new(MemoryStore::with_records(vec![
        unused_record("a", 5, 1),
        unused_record("b", 4, 2),
        unused_record("c", 3, 3),
    ]));
    let c = curator(oracle.clone(), store.clone());

    let outcome = c.summary().await;
    assert!(matches!(outcome, SummaryOutcome::Failed { unused: 3 }));
    assert_eq!(oracle.thread_calls(), 1);
    // Marking-used is strictly downstream of digest success.
    assert_eq!(store.unused().await.unwrap().len(), 3);
}

#[tokio::test]
async fn successful_digest_consumes_all_selected_records() {
    let oracle = Arc::new(MockOracle::new());
    let store = Arc::new(MemoryStore::with_records(vec![
        unused_record("a", 5, 1),
        unused_record("b", 4, 2),
        unused_record("c", 3, 3),
    ]));
    let c = curator(oracle.clone(), store.clone());

    let outcome = c.summary().await;
    let SummaryOutcome::Created {
        digest,
        articles_used,
    } = outcome
    else {
        panic!("expected Created");
    };
    assert_eq!(articles_used, 3);
    assert!(digest.contains("Article a"));
    assert!(store.unused().await.unwrap().is_empty());
}

#[tokio::test]
async fn stale_records_fall_outside_the_window() {
    // Three unused records, but only two inside the 24h window -> skip.
    let oracle = Arc::new(MockOracle::new());
    let store = Arc::new(MemoryStore::with_records(vec![
        unused_record("fresh1", 4, 1),
        unused_record("fresh2", 4, 2),
        unused_record("stale", 5, 40),
    ]));
    let c = curator(oracle.clone(), store.clone());

    let outcome = c.summary().await;
    assert!(matches!(
        outcome,
        SummaryOutcome::Skipped {
            unused: 2,
            minimum: 3
        }
    ));
    assert_eq!(oracle.thread_calls(), 0);
}

#[tokio::test]
async fn digest_prompt_blocks_follow_selection_order() {
    // The mock thread echoes its input, so the block order is observable:
    // importance descending, timestamp tie-break.
    let oracle = Arc::new(MockOracle::new());
    let store = Arc::new(MemoryStore::with_records(vec![
        unused_record("low", 2, 1),
        unused_record("five-old", 5, 6),
        unused_record("five-new", 5, 1),
    ]));
    let c = curator(oracle.clone(), store.clone());

    let SummaryOutcome::Created { digest, .. } = c.summary().await else {
        panic!("expected Created");
    };
    let pos = |needle: &str| digest.find(needle).expect(needle);
    assert!(pos("Article five-new") < pos("Article five-old"));
    assert!(pos("Article five-old") < pos("Article low"));
}
