// Job source boundary. A source turns (search title, location) into raw
// records; everything downstream works on normalized Postings.

pub mod jsearch;

use async_trait::async_trait;
use serde::Deserialize;

use crate::error::AppError;

pub use jsearch::JSearchSource;

/// One record as the search API returns it, before normalization. The field
/// names mirror the JSearch response; anything may be absent.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawPosting {
    pub employer_name: Option<String>,
    pub job_title: Option<String>,
    pub job_publisher: Option<String>,
    #[serde(default)]
    pub job_highlights: RawHighlights,
    pub job_max_salary: Option<f64>,
    pub job_apply_link: Option<String>,
    pub job_offer_expiration_datetime_utc: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawHighlights {
    #[serde(rename = "Responsibilities")]
    pub responsibilities: Option<Vec<String>>,
    #[serde(rename = "Qualifications")]
    pub qualifications: Option<Vec<String>>,
}

/// Trait all job sources implement. A source must signal a hard quota limit
/// with [`AppError::QuotaExceeded`], distinctly from an empty result set.
#[async_trait]
pub trait JobSource: Send + Sync {
    /// Human-readable source name, used in logs.
    fn name(&self) -> &str;

    /// Fetch raw postings for one search title in one location.
    async fn search(&self, title: &str, location: &str) -> Result<Vec<RawPosting>, AppError>;
}
