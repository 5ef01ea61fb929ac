// tests/ingest_pipeline.rs
//
// Ingestion orchestration end-to-end against the in-memory store and the
// deterministic mock oracle: dedup, relevance gating, fallback summaries,
// and score clamping.

use std::collections::HashSet;
use std::sync::Arc;

use ai_news_curator::curate::ingest::{IngestionOrchestrator, FAILURE_SUMMARY};
use ai_news_curator::model::{Candidate, SourceLang};
use ai_news_curator::oracle::MockOracle;
use ai_news_curator::store::{ArticleStore, MemoryStore};

fn candidate(title: &str, url: &str) -> Candidate {
    Candidate {
        title: title.to_string(),
        url: url.to_string(),
        raw_content: format!("Content of {title}"),
        source_name: "Example Wire".to_string(),
        source_lang: SourceLang::En,
    }
}

fn orchestrator(
    oracle: Arc<MockOracle>,
    store: Arc<MemoryStore>,
) -> IngestionOrchestrator {
    IngestionOrchestrator::new(oracle.clone(), oracle.clone(), oracle, store)
}

#[tokio::test]
async fn dedup_and_relevance_filter_leave_two_of_five() {
    // Five candidates: two share (url, title), one fails relevance, the
    // remaining two are distinct and relevant -> exactly 2 records. The
    // off-topic pair member and the duplicate never reach the store.
    let oracle = Arc::new(MockOracle::new().with_irrelevant_title("Celebrity gossip"));
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(oracle, store.clone());

    let batch = vec![
        candidate("Model X released", "https://example.com/x"),
        candidate("Model X released", "https://example.com/x"), // duplicate
        candidate("Celebrity gossip", "https://example.com/gossip"), // off-topic
        candidate("New GPU cluster", "https://example.com/gpu"),
        candidate("Model X released", "https://example.com/x"), // duplicate again
    ];

    let mut known = HashSet::new();
    let report = orch.ingest(batch, &mut known, 1).await;

    assert_eq!(report.accepted_count, 2);
    assert_eq!(report.feeds_checked, 1);
    assert_eq!(store.snapshot().len(), 2);

    let titles: Vec<String> = report.accepted.iter().map(|r| r.title.clone()).collect();
    assert_eq!(titles, ["Model X released", "New GPU cluster"]);
}

#[tokio::test]
async fn reingesting_across_batches_with_reseeded_set_is_idempotent() {
    let oracle = Arc::new(MockOracle::new());
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(oracle, store.clone());

    let mut known = store.known_fingerprints().await.unwrap();
    orch.ingest(
        vec![candidate("Model X released", "https://example.com/x")],
        &mut known,
        1,
    )
    .await;

    // A later run reseeds the known-set from the store, as the collect
    // operation does.
    let mut reseeded = store.known_fingerprints().await.unwrap();
    let report = orch
        .ingest(
            vec![candidate("Model X released", "https://example.com/x")],
            &mut reseeded,
            1,
        )
        .await;

    assert_eq!(report.accepted_count, 0);
    assert_eq!(store.snapshot().len(), 1);
}

#[tokio::test]
async fn summarization_failure_synthesizes_summary_and_keeps_the_batch() {
    let oracle = Arc::new(
        MockOracle::new()
            .with_failing_summary("Broken summary")
            .with_summary("Fine article", "All good.", 4),
    );
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(oracle, store.clone());

    let mut known = HashSet::new();
    let report = orch
        .ingest(
            vec![
                candidate("Broken summary", "https://example.com/broken"),
                candidate("Fine article", "https://example.com/fine"),
            ],
            &mut known,
            1,
        )
        .await;

    // One oracle failure never blocks siblings.
    assert_eq!(report.accepted_count, 2);

    let broken = &report.accepted[0];
    assert_eq!(broken.summary, FAILURE_SUMMARY);
    assert_eq!(broken.importance_score, 3);

    let fine = &report.accepted[1];
    assert_eq!(fine.summary, "All good.");
    assert_eq!(fine.importance_score, 4);
}

#[tokio::test]
async fn out_of_range_importance_is_clamped_at_persistence() {
    let oracle = Arc::new(
        MockOracle::new()
            .with_summary("Overrated", "s", 9)
            .with_summary("Underrated", "s", 0),
    );
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(oracle, store.clone());

    let mut known = HashSet::new();
    let report = orch
        .ingest(
            vec![
                candidate("Overrated", "https://example.com/over"),
                candidate("Underrated", "https://example.com/under"),
            ],
            &mut known,
            1,
        )
        .await;

    assert_eq!(report.accepted[0].importance_score, 5);
    assert_eq!(report.accepted[1].importance_score, 1);
}

#[tokio::test]
async fn primary_source_flows_into_the_record() {
    let oracle = Arc::new(MockOracle::new().with_primary_source("https://vendor.example/press"));
    let store = Arc::new(MemoryStore::new());
    let orch = orchestrator(oracle, store.clone());

    let mut known = HashSet::new();
    let report = orch
        .ingest(
            vec![candidate("Launch", "https://example.com/launch")],
            &mut known,
            1,
        )
        .await;

    assert_eq!(
        report.accepted[0].primary_source.as_deref(),
        Some("https://vendor.example/press")
    );
    assert!(!report.accepted[0].used_in_digest);
}
