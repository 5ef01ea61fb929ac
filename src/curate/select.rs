// src/curate/select.rs
//! Time-windowed candidate selection and importance ranking.
//!
//! Pure core (`rank_unused`) + a thin store-backed wrapper. The pure part
//! takes `now` as a parameter so ordering is fully deterministic under test.

use chrono::{DateTime, Duration, Utc};
use tracing::warn;

use crate::model::ArticleRecord;
use crate::store::DynArticleStore;

/// Filter to the trailing window and rank.
///
/// Window policy: a record's effective timestamp is `created_at`, else
/// `date`; a record with neither is never excluded (legacy rows must not
/// silently vanish). Ordering: importance descending, then effective
/// timestamp descending; records without a timestamp sort as oldest for the
/// tie-break only. The sort is stable, so equal keys keep input order.
pub fn rank_unused(
    mut records: Vec<ArticleRecord>,
    now: DateTime<Utc>,
    window_hours: i64,
) -> Vec<ArticleRecord> {
    let cutoff = now - Duration::hours(window_hours);
    records.retain(|r| match r.effective_timestamp() {
        None => true,
        Some(t) => t >= cutoff,
    });

    records.sort_by(|a, b| {
        b.importance_score
            .cmp(&a.importance_score)
            .then_with(|| {
                let ta = a.effective_timestamp().unwrap_or(DateTime::<Utc>::MIN_UTC);
                let tb = b.effective_timestamp().unwrap_or(DateTime::<Utc>::MIN_UTC);
                tb.cmp(&ta)
            })
    });
    records
}

pub struct SelectionEngine {
    store: DynArticleStore,
}

impl SelectionEngine {
    pub fn new(store: DynArticleStore) -> Self {
        Self { store }
    }

    /// Unused records inside the trailing window, ranked. A store read
    /// failure surfaces as an empty sequence, not an error.
    pub async fn select_unused(&self, window_hours: i64) -> Vec<ArticleRecord> {
        let records = match self.store.unused().await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "unused query failed; selecting nothing");
                return Vec::new();
            }
        };
        rank_unused(records, Utc::now(), window_hours)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fingerprint::Fingerprint;
    use crate::model::SourceLang;
    use chrono::TimeZone;

    fn record(id: &str, importance: u8, created_at: Option<DateTime<Utc>>) -> ArticleRecord {
        ArticleRecord {
            id: id.to_string(),
            title: id.to_string(),
            url: format!("https://example.com/{id}"),
            summary: "s".into(),
            source_name: "Example".into(),
            source_lang: SourceLang::En,
            fingerprint: Fingerprint::of(&format!("https://example.com/{id}"), id),
            primary_source: None,
            importance_score: importance,
            used_in_digest: false,
            created_at,
            date: None,
        }
    }

    fn at(h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 6, 1, h, 0, 0).unwrap()
    }

    #[test]
    fn importance_first_then_newest() {
        // Scores [2,5,5] with timestamps t1<t2<t3; the two fives are t3, t1.
        let now = at(12);
        let records = vec![
            record("low", 2, Some(at(10))),
            record("five-old", 5, Some(at(8))),
            record("five-new", 5, Some(at(11))),
        ];
        let ranked = rank_unused(records, now, 24);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["five-new", "five-old", "low"]);
    }

    #[test]
    fn window_excludes_old_records_but_keeps_timestampless_ones() {
        let now = at(12);
        let records = vec![
            record("recent", 3, Some(now - Duration::hours(2))),
            record("stale", 3, Some(now - Duration::hours(30))),
            record("legacy", 3, None),
        ];
        let ranked = rank_unused(records, now, 24);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["recent", "legacy"]);
    }

    #[test]
    fn date_is_the_fallback_timestamp() {
        let now = at(12);
        let mut fallback = record("fallback", 3, None);
        fallback.date = Some(now - Duration::hours(30));
        let ranked = rank_unused(vec![fallback], now, 24);
        assert!(ranked.is_empty(), "out-of-window `date` must exclude");
    }

    #[test]
    fn timestampless_records_lose_ties() {
        let now = at(12);
        let records = vec![
            record("legacy", 4, None),
            record("dated", 4, Some(at(11))),
        ];
        let ranked = rank_unused(records, now, 24);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["dated", "legacy"]);
    }

    #[test]
    fn equal_keys_keep_input_order() {
        let now = at(12);
        let ts = Some(at(9));
        let records = vec![
            record("first", 4, ts),
            record("second", 4, ts),
            record("third", 4, ts),
        ];
        let ranked = rank_unused(records, now, 24);
        let ids: Vec<&str> = ranked.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(ids, ["first", "second", "third"]);
    }
}
