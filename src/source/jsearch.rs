use async_trait::async_trait;
use serde_json::Value;

use crate::error::AppError;
use crate::source::{JobSource, RawPosting};

const SEARCH_URL: &str = "https://jsearch.p.rapidapi.com/search";
const RAPID_API_HOST: &str = "jsearch.p.rapidapi.com";

/// Job source backed by RapidAPI's JSearch endpoint.
pub struct JSearchSource {
    client: reqwest::Client,
    api_key: String,
}

impl JSearchSource {
    pub fn new(api_key: String) -> Self {
        JSearchSource {
            client: reqwest::Client::new(),
            api_key,
        }
    }
}

#[async_trait]
impl JobSource for JSearchSource {
    fn name(&self) -> &str {
        "jsearch"
    }

    async fn search(&self, title: &str, location: &str) -> Result<Vec<RawPosting>, AppError> {
        let resp = self
            .client
            .get(SEARCH_URL)
            .header("X-RapidAPI-Key", &self.api_key)
            .header("X-RapidAPI-Host", RAPID_API_HOST)
            .query(&[
                ("query", format!("{title} in {location}")),
                ("page", "1".to_string()),
                ("num_pages", "10".to_string()),
                ("date_posted", "month".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Source(format!("JSearch request failed: {e}")))?;

        if resp.status().as_u16() == 429 {
            return Err(AppError::QuotaExceeded);
        }
        if !resp.status().is_success() {
            return Err(AppError::Source(format!(
                "JSearch returned {}",
                resp.status()
            )));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| AppError::Source(format!("Failed to parse JSearch response: {e}")))?;

        parse_search_response(&body)
    }
}

/// Extract raw postings from a JSearch response body. A body without the
/// `data` array is how the API reports an exhausted monthly quota, so that
/// case maps to [`AppError::QuotaExceeded`]; an empty array is simply zero
/// results.
fn parse_search_response(body: &Value) -> Result<Vec<RawPosting>, AppError> {
    let records = body
        .get("data")
        .and_then(|v| v.as_array())
        .ok_or(AppError::QuotaExceeded)?;

    let mut postings = Vec::with_capacity(records.len());
    for record in records {
        match serde_json::from_value::<RawPosting>(record.clone()) {
            Ok(raw) => postings.push(raw),
            Err(e) => tracing::warn!("Skipping undecodable JSearch record: {e}"),
        }
    }
    Ok(postings)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn parses_records_from_the_data_array() {
        let body = json!({
            "status": "OK",
            "data": [{
                "employer_name": "Acme",
                "job_title": "Backend Intern",
                "job_publisher": "LinkedIn",
                "job_highlights": { "Qualifications": ["Rust"] },
                "job_max_salary": 70000,
                "job_apply_link": "https://acme.example/apply",
                "job_offer_expiration_datetime_utc": "2026-09-30T00:00:00Z"
            }]
        });

        let postings = parse_search_response(&body).unwrap();
        assert_eq!(postings.len(), 1);
        assert_eq!(postings[0].employer_name.as_deref(), Some("Acme"));
        assert_eq!(
            postings[0].job_highlights.qualifications,
            Some(vec!["Rust".to_string()])
        );
    }

    #[test]
    fn missing_data_key_signals_quota() {
        let body = json!({ "message": "You have exceeded the MONTHLY quota" });
        assert!(matches!(
            parse_search_response(&body),
            Err(AppError::QuotaExceeded)
        ));
    }

    #[test]
    fn empty_data_is_zero_results_not_an_error() {
        let body = json!({ "status": "OK", "data": [] });
        assert!(parse_search_response(&body).unwrap().is_empty());
    }

    #[test]
    fn undecodable_records_are_skipped() {
        let body = json!({ "data": [ "not an object", { "employer_name": "Acme" } ] });
        let postings = parse_search_response(&body).unwrap();
        assert_eq!(postings.len(), 1);
    }
}
