// Durable posting store. The store is the sole long-lived owner of posting
// data; callers only hold transient read-only views.

pub mod csv;
pub mod postgres;

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::Serialize;

use crate::error::AppError;
use crate::models::posting::Posting;

pub use self::csv::CsvStore;
pub use self::postgres::PgStore;

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct MergeStats {
    /// Rows newly added to the store.
    pub inserted: usize,
    /// Rows refreshed because an incoming posting collided on (employer, title).
    pub refreshed: usize,
    /// Rows removed by the expiry sweep, incoming ones included.
    pub purged: usize,
}

/// Backend-agnostic store contract. One merge call per run; the backend is
/// responsible for making the write atomic.
#[async_trait]
pub trait PostingStore: Send + Sync {
    /// Merge newly normalized postings into the durable state, sweeping
    /// expired and unknown-liveness rows as of `today`.
    async fn merge(&self, new: Vec<Posting>, today: NaiveDate) -> Result<MergeStats, AppError>;

    /// Read back the postings whose searched titles intersect `titles`.
    /// This is deliberately not "everything in the store": the store
    /// accumulates across searches, but each search only sees its own view.
    async fn for_titles(&self, titles: &[String]) -> Result<Vec<Posting>, AppError>;
}

/// Liveness rule shared by both backends: a posting is shown only when its
/// expiry date is strictly in the future. Null means unknown liveness and
/// counts as not live. The Postgres sweep statement is the SQL negation of
/// this predicate.
pub fn is_live(expiry: Option<NaiveDate>, today: NaiveDate) -> bool {
    expiry.is_some_and(|d| d > today)
}

/// Pure merge used by the file backend (the database backend expresses the
/// same rules in SQL).
///
/// Collisions on (employer, title) keep the row's position, take the incoming
/// posting's field values, and union searched titles (existing order first,
/// unseen ones appended). Fresh postings append after all existing rows. The
/// final sweep keeps only rows whose expiry date is strictly after `today`;
/// a null expiry date means unknown liveness and is purged rather than shown.
pub fn merge_postings(
    existing: Vec<Posting>,
    incoming: Vec<Posting>,
    today: NaiveDate,
) -> (Vec<Posting>, MergeStats) {
    let mut merged = existing;
    let mut index: HashMap<(String, String), usize> = merged
        .iter()
        .enumerate()
        .map(|(i, p)| (p.key(), i))
        .collect();
    let mut stats = MergeStats::default();

    for mut posting in incoming {
        match index.get(&posting.key()) {
            Some(&i) => {
                let mut titles = merged[i].searched_titles.clone();
                for title in posting.searched_titles.drain(..) {
                    if !titles.contains(&title) {
                        titles.push(title);
                    }
                }
                posting.searched_titles = titles;
                merged[i] = posting;
                stats.refreshed += 1;
            }
            None => {
                index.insert(posting.key(), merged.len());
                merged.push(posting);
                stats.inserted += 1;
            }
        }
    }

    let before = merged.len();
    merged.retain(|p| is_live(p.expiry_date, today));
    stats.purged = before - merged.len();

    (merged, stats)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::NOT_LISTED;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 8, 29).unwrap()
    }

    fn posting(employer: &str, title: &str, searched: &str, expiry: Option<&str>) -> Posting {
        Posting {
            employer: employer.to_string(),
            title: title.to_string(),
            publisher: "LinkedIn".to_string(),
            responsibilities: NOT_LISTED.to_string(),
            qualifications: NOT_LISTED.to_string(),
            max_salary: NOT_LISTED.to_string(),
            application_link: "https://example.test/apply".to_string(),
            expiry_date: expiry.map(|d| d.parse().unwrap()),
            searched_titles: vec![searched.to_string()],
        }
    }

    #[test]
    fn merging_the_same_posting_twice_unions_searched_titles() {
        let first = posting("Acme", "Backend Intern", "Data Engineer Intern", Some("2026-12-31"));
        let second = posting("Acme", "Backend Intern", "Software Engineer Intern", Some("2026-12-31"));

        let (merged, _) = merge_postings(Vec::new(), vec![first], today());
        let (merged, stats) = merge_postings(merged, vec![second], today());

        assert_eq!(merged.len(), 1);
        assert_eq!(
            merged[0].searched_titles,
            vec!["Data Engineer Intern", "Software Engineer Intern"]
        );
        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.inserted, 0);
    }

    #[test]
    fn union_is_idempotent_for_a_repeated_title() {
        let p = posting("Acme", "Backend Intern", "Data Engineer Intern", Some("2026-12-31"));
        let (merged, _) = merge_postings(Vec::new(), vec![p.clone()], today());
        let (merged, _) = merge_postings(merged, vec![p], today());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].searched_titles, vec!["Data Engineer Intern"]);
    }

    #[test]
    fn collision_refreshes_other_fields_from_the_incoming_posting() {
        let old = posting("Acme", "Backend Intern", "A", Some("2026-09-01"));
        let mut new = posting("Acme", "Backend Intern", "B", Some("2026-12-31"));
        new.publisher = "Indeed".to_string();
        new.max_salary = "80000".to_string();

        let (merged, _) = merge_postings(vec![old], vec![new], today());

        assert_eq!(merged[0].publisher, "Indeed");
        assert_eq!(merged[0].max_salary, "80000");
        assert_eq!(merged[0].expiry_date, Some("2026-12-31".parse().unwrap()));
        assert_eq!(merged[0].searched_titles, vec!["A", "B"]);
    }

    #[test]
    fn refreshing_to_a_past_expiry_purges_the_row() {
        // A stored live posting rediscovered with an expiry in the past must
        // disappear: the collision refreshes the row first, then the sweep
        // removes it. Skipping the expired incoming would leave the stale
        // future-dated row visible.
        let stored = posting("Acme", "Backend Intern", "A", Some("2026-08-30"));
        let rediscovered = posting("Acme", "Backend Intern", "A", Some("2026-08-28"));

        let (merged, stats) = merge_postings(vec![stored], vec![rediscovered], today());

        assert!(merged.is_empty());
        assert_eq!(stats.refreshed, 1);
        assert_eq!(stats.purged, 1);
    }

    #[test]
    fn refreshing_to_a_null_expiry_purges_the_row() {
        let stored = posting("Acme", "Backend Intern", "A", Some("2026-08-30"));
        let rediscovered = posting("Acme", "Backend Intern", "A", None);

        let (merged, _) = merge_postings(vec![stored], vec![rediscovered], today());

        assert!(merged.is_empty());
    }

    #[test]
    fn expiry_sweep_purges_past_and_null_keeps_future() {
        let incoming = vec![
            posting("Past", "Intern", "A", Some("2026-08-28")),
            posting("Today", "Intern", "A", Some("2026-08-29")),
            posting("Unknown", "Intern", "A", None),
            posting("Future", "Intern", "A", Some("2026-08-30")),
        ];

        let (merged, stats) = merge_postings(Vec::new(), incoming, today());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].employer, "Future");
        assert_eq!(stats.purged, 3);
    }

    #[test]
    fn existing_rows_keep_relative_order_and_new_rows_append() {
        let existing = vec![
            posting("First", "Intern", "A", Some("2026-12-31")),
            posting("Second", "Intern", "A", Some("2026-12-31")),
        ];
        let incoming = vec![
            posting("Second", "Intern", "B", Some("2026-12-31")),
            posting("Third", "Intern", "B", Some("2026-12-31")),
        ];

        let (merged, stats) = merge_postings(existing, incoming, today());

        let employers: Vec<&str> = merged.iter().map(|p| p.employer.as_str()).collect();
        assert_eq!(employers, vec!["First", "Second", "Third"]);
        assert_eq!(stats.inserted, 1);
        assert_eq!(stats.refreshed, 1);
    }

    #[test]
    fn in_batch_duplicates_collapse_to_one_row() {
        let incoming = vec![
            posting("Acme", "Backend Intern", "A", Some("2026-12-31")),
            posting("Acme", "Backend Intern", "B", Some("2026-12-31")),
        ];

        let (merged, _) = merge_postings(Vec::new(), incoming, today());

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].searched_titles, vec!["A", "B"]);
    }
}
