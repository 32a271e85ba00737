use chrono::NaiveDate;

use crate::source::RawPosting;

/// Placeholder for "field present but the source listed nothing". Distinct
/// from a null expiry date, which means unknown liveness.
pub const NOT_LISTED: &str = "Not Listed";

/// One canonical job listing as held by the durable store.
#[derive(Debug, Clone, PartialEq)]
pub struct Posting {
    pub employer: String,
    pub title: String,
    pub publisher: String,
    pub responsibilities: String,
    pub qualifications: String,
    pub max_salary: String,
    pub application_link: String,
    pub expiry_date: Option<NaiveDate>,
    /// Every search query that surfaced this posting, in first-seen order.
    /// Grows by union when the same (employer, title) is rediscovered.
    pub searched_titles: Vec<String>,
}

impl Posting {
    /// Dedup key. (employer, title) is unique in the store.
    pub fn key(&self) -> (String, String) {
        (self.employer.clone(), self.title.clone())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum NormalizeError {
    #[error("record is missing required field `{0}`")]
    MissingField(&'static str),
}

/// Convert a raw source record into a canonical [`Posting`].
///
/// Employer, title and application link are structurally required; a record
/// without them is rejected so the caller can skip it without aborting the
/// batch. Responsibilities, qualifications and max salary fall back to the
/// [`NOT_LISTED`] sentinel. Only the calendar-date part of an ISO-8601
/// expiry timestamp is kept; a missing or unparsable one stays null.
pub fn normalize(raw: RawPosting, searched_title: &str) -> Result<Posting, NormalizeError> {
    let employer = required(raw.employer_name, "employer_name")?;
    let title = required(raw.job_title, "job_title")?;
    let application_link = required(raw.job_apply_link, "job_apply_link")?;

    Ok(Posting {
        employer,
        title,
        publisher: raw.job_publisher.unwrap_or_default(),
        responsibilities: highlight_text(raw.job_highlights.responsibilities),
        qualifications: highlight_text(raw.job_highlights.qualifications),
        max_salary: salary_text(raw.job_max_salary),
        application_link,
        expiry_date: expiry_date(raw.job_offer_expiration_datetime_utc.as_deref()),
        searched_titles: vec![searched_title.to_string()],
    })
}

fn required(value: Option<String>, field: &'static str) -> Result<String, NormalizeError> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(NormalizeError::MissingField(field)),
    }
}

fn highlight_text(lines: Option<Vec<String>>) -> String {
    match lines {
        Some(lines) if !lines.is_empty() => lines.join("; "),
        _ => NOT_LISTED.to_string(),
    }
}

fn salary_text(salary: Option<f64>) -> String {
    match salary {
        Some(v) if v.fract() == 0.0 => format!("{}", v as i64),
        Some(v) => v.to_string(),
        None => NOT_LISTED.to_string(),
    }
}

fn expiry_date(timestamp: Option<&str>) -> Option<NaiveDate> {
    let date_part = timestamp?.split('T').next()?;
    match NaiveDate::parse_from_str(date_part, "%Y-%m-%d") {
        Ok(date) => Some(date),
        Err(_) => {
            tracing::warn!("Unparsable expiry timestamp '{}', treating as unknown", date_part);
            None
        }
    }
}
