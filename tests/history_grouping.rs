// tests/history_grouping.rs
//
// Retroactive grouping of used records through the Curator: the day-window
// filter, the created_at requirement, and the read-only contract.

use std::sync::Arc;

use ai_news_curator::curate::{Curator, CuratorConfig};
use ai_news_curator::fingerprint::Fingerprint;
use ai_news_curator::model::{ArticleRecord, SourceLang};
use ai_news_curator::oracle::MockOracle;
use ai_news_curator::store::MemoryStore;
use chrono::{DateTime, Duration, Utc};

fn used_record(id: &str, importance: u8, created_at: Option<DateTime<Utc>>) -> ArticleRecord {
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
        used_in_digest: true,
        created_at,
        date: None,
    }
}

fn curator(store: Arc<MemoryStore>) -> Curator {
    let oracle = Arc::new(MockOracle::new());
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
async fn old_records_and_legacy_records_are_excluded() {
    let now = Utc::now();
    let store = Arc::new(MemoryStore::with_records(vec![
        used_record("recent", 4, Some(now - Duration::hours(3))),
        used_record("last-week", 3, Some(now - Duration::days(10))),
        used_record("legacy", 5, None),
    ]));
    let c = curator(store);

    let buckets = c.history(7).await;
    let all: Vec<&str> = buckets
        .values()
        .flatten()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(all, ["recent"]);
}

#[tokio::test]
async fn unused_records_never_appear_in_history() {
    let now = Utc::now();
    let mut pending = used_record("pending", 4, Some(now - Duration::hours(1)));
    pending.used_in_digest = false;
    let store = Arc::new(MemoryStore::with_records(vec![
        pending,
        used_record("consumed", 4, Some(now - Duration::hours(1))),
    ]));
    let c = curator(store);

    let buckets = c.history(7).await;
    let all: Vec<&str> = buckets
        .values()
        .flatten()
        .map(|r| r.id.as_str())
        .collect();
    assert_eq!(all, ["consumed"]);
}

#[tokio::test]
async fn records_hours_apart_land_in_distinct_buckets() {
    // 26 and 1 hours ago can never share a 6-hour bucket.
    let now = Utc::now();
    let store = Arc::new(MemoryStore::with_records(vec![
        used_record("yesterday", 3, Some(now - Duration::hours(26))),
        used_record("today", 3, Some(now - Duration::hours(1))),
    ]));
    let c = curator(store);

    let buckets = c.history(7).await;
    assert_eq!(buckets.len(), 2);
    for (start, records) in &buckets {
        for r in records {
            let ts = r.created_at.expect("history records carry created_at");
            assert!(*start <= ts && ts < *start + Duration::hours(6));
        }
    }
}
