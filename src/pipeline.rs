use chrono::Utc;
use serde::Serialize;

use crate::error::AppError;
use crate::models::company::{Grouped, group_by_employer};
use crate::models::posting::{Posting, normalize};
use crate::source::JobSource;
use crate::store::{MergeStats, PostingStore};

#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct RunStats {
    /// Raw records returned by the source across all titles.
    pub fetched: usize,
    /// Records dropped because a required field was missing.
    pub skipped: usize,
    /// Whether the source's quota cut the title loop short.
    pub quota_exceeded: bool,
    #[serde(flatten)]
    pub merge: MergeStats,
}

#[derive(Debug)]
pub struct SearchOutcome {
    pub grouped: Grouped,
    pub stats: RunStats,
}

/// Run one aggregation pass: fetch each title sequentially, normalize,
/// merge into the store at the current wall-clock date, then read back and
/// group only the postings visible to this search's titles.
///
/// A quota error stops further title queries but everything fetched so far
/// still flows through the merge. Any other source error fails the run.
pub async fn run(
    source: &dyn JobSource,
    store: &dyn PostingStore,
    titles: &[String],
    location: &str,
) -> Result<SearchOutcome, AppError> {
    if titles.is_empty() {
        return Err(AppError::BadRequest("no search titles given".to_string()));
    }

    let mut stats = RunStats::default();
    let mut normalized: Vec<Posting> = Vec::new();

    for title in titles {
        tracing::info!("Querying {} for '{title}' in {location}", source.name());
        let raw = match source.search(title, location).await {
            Ok(records) => records,
            Err(AppError::QuotaExceeded) => {
                tracing::warn!("Source quota exceeded; keeping results gathered so far");
                stats.quota_exceeded = true;
                break;
            }
            Err(e) => return Err(e),
        };

        stats.fetched += raw.len();
        for record in raw {
            match normalize(record, title) {
                Ok(posting) => normalized.push(posting),
                Err(e) => {
                    stats.skipped += 1;
                    tracing::warn!("Skipping malformed record: {e}");
                }
            }
        }
    }

    let today = Utc::now().date_naive();
    stats.merge = store.merge(normalized, today).await?;
    tracing::info!(
        "Merge complete: {} fetched, {} skipped, {} inserted, {} refreshed, {} purged",
        stats.fetched,
        stats.skipped,
        stats.merge.inserted,
        stats.merge.refreshed,
        stats.merge.purged
    );

    let visible = store.for_titles(titles).await?;
    Ok(SearchOutcome {
        grouped: group_by_employer(visible),
        stats,
    })
}
