use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::PgPool;

use crate::error::AppError;
use crate::models::posting::Posting;
use crate::store::{MergeStats, PostingStore};

/// Database-backed store. The `postings` table carries a uniqueness
/// constraint over (employer, job_title) and a text[] column for searched
/// titles; the merge is one transaction, so readers never see a partial
/// sweep-plus-upsert.
pub struct PgStore {
    pool: PgPool,
}

#[derive(Debug, sqlx::FromRow)]
struct PostingRow {
    employer: String,
    job_title: String,
    publisher: String,
    responsibilities: String,
    qualifications: String,
    max_salary: String,
    application_link: String,
    expiry_date: Option<NaiveDate>,
    searched_titles: Vec<String>,
}

impl From<PostingRow> for Posting {
    fn from(row: PostingRow) -> Self {
        Posting {
            employer: row.employer,
            title: row.job_title,
            publisher: row.publisher,
            responsibilities: row.responsibilities,
            qualifications: row.qualifications,
            max_salary: row.max_salary,
            application_link: row.application_link,
            expiry_date: row.expiry_date,
            searched_titles: row.searched_titles,
        }
    }
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        PgStore { pool }
    }
}

// SQL mirror of the shared liveness rule (`store::is_live`): a row stays
// only when its expiry date is strictly after today.
const SWEEP_SQL: &str = "DELETE FROM postings WHERE expiry_date IS NULL OR expiry_date <= $1";

// On conflict the incoming posting wins for every scalar field; the
// searched_titles union appends only titles the row has not seen, keeping
// first-seen order. Deliberately no liveness filter here: expired incoming
// rows must refresh their targets before the sweep runs.
const UPSERT_SQL: &str = "\
    INSERT INTO postings (employer, job_title, publisher, responsibilities, qualifications, max_salary, application_link, expiry_date, searched_titles) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9) \
    ON CONFLICT (employer, job_title) DO UPDATE SET \
        publisher = EXCLUDED.publisher, \
        responsibilities = EXCLUDED.responsibilities, \
        qualifications = EXCLUDED.qualifications, \
        max_salary = EXCLUDED.max_salary, \
        application_link = EXCLUDED.application_link, \
        expiry_date = EXCLUDED.expiry_date, \
        searched_titles = postings.searched_titles || (\
            SELECT COALESCE(ARRAY_AGG(t), '{}'::text[]) \
            FROM UNNEST(EXCLUDED.searched_titles) AS t \
            WHERE NOT (t = ANY (postings.searched_titles))\
        ), \
        updated_at = NOW() \
    RETURNING (xmax = 0) AS inserted";

#[async_trait]
impl PostingStore for PgStore {
    async fn merge(&self, new: Vec<Posting>, today: NaiveDate) -> Result<MergeStats, AppError> {
        let mut stats = MergeStats::default();
        let mut tx = self.pool.begin().await?;

        // Upsert first, sweep second, same order as merge_postings. Every
        // incoming posting lands, so a rediscovery that reports an expired
        // or unknown expiry refreshes the stored row before the sweep takes
        // the now-dead row out.
        for posting in new {
            let inserted: bool = sqlx::query_scalar(UPSERT_SQL)
                .bind(&posting.employer)
                .bind(&posting.title)
                .bind(&posting.publisher)
                .bind(&posting.responsibilities)
                .bind(&posting.qualifications)
                .bind(&posting.max_salary)
                .bind(&posting.application_link)
                .bind(posting.expiry_date)
                .bind(&posting.searched_titles)
                .fetch_one(&mut *tx)
                .await?;

            if inserted {
                stats.inserted += 1;
            } else {
                stats.refreshed += 1;
            }
        }

        let swept = sqlx::query(SWEEP_SQL)
            .bind(today)
            .execute(&mut *tx)
            .await?
            .rows_affected();
        stats.purged = swept as usize;

        tx.commit().await?;
        Ok(stats)
    }

    async fn for_titles(&self, titles: &[String]) -> Result<Vec<Posting>, AppError> {
        // This backend declares a lexical sort; grouping preserves it.
        let rows = sqlx::query_as::<_, PostingRow>(
            "SELECT employer, job_title, publisher, responsibilities, qualifications, max_salary, application_link, expiry_date, searched_titles \
             FROM postings WHERE searched_titles && $1 ORDER BY employer, job_title",
        )
        .bind(titles)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows.into_iter().map(Posting::from).collect())
    }
}
