// src/oracle/parse.rs
//! Parser for the summarization oracle's labeled two-line response.
//!
//! Grammar: a `Summary:` line and an `Importance:` line, in any order.
//! Fallback policy: importance missing or unparseable → 3; importance out of
//! range → clamped into [1,5]; summary label missing → the entire raw output
//! becomes the summary.

use super::ArticleSummary;

pub const DEFAULT_IMPORTANCE: u8 = 3;

pub const SUMMARY_LABEL: &str = "Summary:";
pub const IMPORTANCE_LABEL: &str = "Importance:";

/// Parse an oracle response into a summary + importance pair. Never fails;
/// malformed input degrades per the fallback policy above.
pub fn parse_summary_response(raw: &str) -> ArticleSummary {
    let mut summary = String::new();
    let mut importance = DEFAULT_IMPORTANCE;

    for line in raw.lines() {
        let line = line.trim_start();
        if let Some(rest) = line.strip_prefix(SUMMARY_LABEL) {
            summary = rest.trim().to_string();
        } else if let Some(rest) = line.strip_prefix(IMPORTANCE_LABEL) {
            importance = match rest.trim().parse::<i64>() {
                Ok(n) => n.clamp(1, 5) as u8,
                Err(_) => DEFAULT_IMPORTANCE,
            };
        }
    }

    if summary.is_empty() {
        // Different output shape than asked for; keep whatever came back.
        summary = raw.trim().to_string();
    }

    ArticleSummary {
        summary,
        importance,
    }
}

/// Render an importance score as stars, one per point padded to five.
pub fn stars(score: u8) -> String {
    let filled = score.clamp(1, 5) as usize;
    let mut out = String::with_capacity(5 * '★'.len_utf8());
    for _ in 0..filled {
        out.push('★');
    }
    for _ in filled..5 {
        out.push('☆');
    }
    out
}
