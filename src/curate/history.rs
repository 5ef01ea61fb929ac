// src/curate/history.rs
//! Retrospective grouping of used records into fixed-width time buckets.
//!
//! The 6-hour width matches the digest cadence, so each bucket approximates
//! "the records one digest run consumed". Unlike selection, ordering inside
//! a bucket is by importance only — no timestamp tie-break.

use std::collections::BTreeMap;

use chrono::{DateTime, Duration, Timelike, Utc};
use tracing::warn;

use crate::model::ArticleRecord;
use crate::store::DynArticleStore;

pub const DEFAULT_BUCKET_HOURS: u32 = 6;

/// Start of the fixed-width window enclosing `ts`: hour integer-divided by
/// the width and re-multiplied, minutes and below zeroed.
pub fn bucket_start(ts: DateTime<Utc>, width_hours: u32) -> DateTime<Utc> {
    let width = width_hours.clamp(1, 24);
    let hour = (ts.hour() / width) * width;
    ts.date_naive()
        .and_hms_opt(hour, 0, 0)
        .expect("in-range bucket time")
        .and_utc()
}

/// Bucket records by `created_at`; records without it are dropped (history
/// requires a trustworthy timestamp). Empty buckets are never materialized.
pub fn group_by_bucket(
    records: Vec<ArticleRecord>,
    width_hours: u32,
) -> BTreeMap<DateTime<Utc>, Vec<ArticleRecord>> {
    let mut buckets: BTreeMap<DateTime<Utc>, Vec<ArticleRecord>> = BTreeMap::new();
    for record in records {
        let Some(ts) = record.created_at else {
            continue;
        };
        buckets.entry(bucket_start(ts, width_hours)).or_default().push(record);
    }
    for bucket in buckets.values_mut() {
        bucket.sort_by(|a, b| b.importance_score.cmp(&a.importance_score));
    }
    buckets
}

pub struct HistoryGrouper {
    store: DynArticleStore,
    bucket_width_hours: u32,
}

impl HistoryGrouper {
    pub fn new(store: DynArticleStore) -> Self {
        Self {
            store,
            bucket_width_hours: DEFAULT_BUCKET_HOURS,
        }
    }

    /// Used records from the last `days` days, bucketed. A store read
    /// failure surfaces as an empty mapping.
    pub async fn group(&self, days: i64) -> BTreeMap<DateTime<Utc>, Vec<ArticleRecord>> {
        let cutoff = Utc::now() - Duration::days(days);
        let records = match self.store.used_since(cutoff).await {
            Ok(v) => v,
            Err(e) => {
                warn!(error = %e, "used_since query failed; empty history");
                return BTreeMap::new();
            }
        };
        group_by_bucket(records, self.bucket_width_hours)
    }
}
