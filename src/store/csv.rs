use std::fs;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::AppError;
use crate::models::posting::Posting;
use crate::store::{MergeStats, PostingStore, merge_postings};

/// Separator for the multi-valued Searched Titles column. Separator and
/// escape characters inside a title are backslash-escaped so any title
/// round-trips losslessly.
const TITLE_SEPARATOR: char = ';';
const TITLE_ESCAPE: char = '\\';

fn join_titles(titles: &[String]) -> String {
    let escaped: Vec<String> = titles
        .iter()
        .map(|title| {
            let mut out = String::with_capacity(title.len());
            for c in title.chars() {
                if c == TITLE_SEPARATOR || c == TITLE_ESCAPE {
                    out.push(TITLE_ESCAPE);
                }
                out.push(c);
            }
            out
        })
        .collect();
    escaped.join(&TITLE_SEPARATOR.to_string())
}

fn split_titles(joined: &str) -> Vec<String> {
    let mut titles = Vec::new();
    let mut current = String::new();
    let mut chars = joined.chars();
    while let Some(c) = chars.next() {
        if c == TITLE_ESCAPE {
            if let Some(escaped) = chars.next() {
                current.push(escaped);
            }
        } else if c == TITLE_SEPARATOR {
            if !current.is_empty() {
                titles.push(std::mem::take(&mut current));
            }
        } else {
            current.push(c);
        }
    }
    if !current.is_empty() {
        titles.push(current);
    }
    titles
}

/// File-backed store: one CSV row per posting. A missing file is an empty
/// store; a present-but-unreadable file is fatal so a run never overwrites
/// state it could not parse. Writes replace the whole file via a temp file
/// and rename.
pub struct CsvStore {
    path: PathBuf,
}

#[derive(Debug, Serialize, Deserialize)]
struct CsvRow {
    #[serde(rename = "Employer")]
    employer: String,
    #[serde(rename = "Job Title")]
    title: String,
    #[serde(rename = "Publisher")]
    publisher: String,
    #[serde(rename = "Responsibilities")]
    responsibilities: String,
    #[serde(rename = "Qualifications")]
    qualifications: String,
    #[serde(rename = "Max Salary")]
    max_salary: String,
    #[serde(rename = "Application Page")]
    application_link: String,
    #[serde(rename = "Expiry Date")]
    expiry_date: String,
    #[serde(rename = "Searched Titles")]
    searched_titles: String,
}

impl From<Posting> for CsvRow {
    fn from(posting: Posting) -> Self {
        CsvRow {
            employer: posting.employer,
            title: posting.title,
            publisher: posting.publisher,
            responsibilities: posting.responsibilities,
            qualifications: posting.qualifications,
            max_salary: posting.max_salary,
            application_link: posting.application_link,
            expiry_date: posting
                .expiry_date
                .map(|d| d.to_string())
                .unwrap_or_default(),
            searched_titles: join_titles(&posting.searched_titles),
        }
    }
}

impl CsvStore {
    pub fn new(path: PathBuf) -> Self {
        CsvStore { path }
    }

    fn parse_error(&self, reason: impl ToString) -> AppError {
        AppError::StoreParse {
            path: self.path.display().to_string(),
            reason: reason.to_string(),
        }
    }

    fn load(&self) -> Result<Vec<Posting>, AppError> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }

        let mut reader =
            csv::Reader::from_path(&self.path).map_err(|e| self.parse_error(e))?;
        let mut postings = Vec::new();
        for row in reader.deserialize::<CsvRow>() {
            let row = row.map_err(|e| self.parse_error(e))?;
            postings.push(self.row_to_posting(row)?);
        }
        Ok(postings)
    }

    fn row_to_posting(&self, row: CsvRow) -> Result<Posting, AppError> {
        let expiry_date = if row.expiry_date.is_empty() {
            None
        } else {
            let date = NaiveDate::parse_from_str(&row.expiry_date, "%Y-%m-%d")
                .map_err(|e| self.parse_error(format!("bad expiry date '{}': {e}", row.expiry_date)))?;
            Some(date)
        };

        Ok(Posting {
            employer: row.employer,
            title: row.title,
            publisher: row.publisher,
            responsibilities: row.responsibilities,
            qualifications: row.qualifications,
            max_salary: row.max_salary,
            application_link: row.application_link,
            expiry_date,
            searched_titles: split_titles(&row.searched_titles),
        })
    }

    /// Serialize the full row set and swap it into place. The rename makes
    /// the replacement atomic; readers never observe a half-written file.
    fn persist(&self, postings: Vec<Posting>) -> Result<(), AppError> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for posting in postings {
            writer
                .serialize(CsvRow::from(posting))
                .map_err(|e| AppError::StoreWrite(e.to_string()))?;
        }
        let data = writer
            .into_inner()
            .map_err(|e| AppError::StoreWrite(e.to_string()))?;

        let tmp = tmp_path(&self.path);
        fs::write(&tmp, data).map_err(|e| AppError::StoreWrite(e.to_string()))?;
        fs::rename(&tmp, &self.path).map_err(|e| AppError::StoreWrite(e.to_string()))?;
        Ok(())
    }
}

fn tmp_path(path: &Path) -> PathBuf {
    let mut name = path.file_name().unwrap_or_default().to_os_string();
    name.push(".tmp");
    path.with_file_name(name)
}

#[async_trait]
impl PostingStore for CsvStore {
    async fn merge(&self, new: Vec<Posting>, today: NaiveDate) -> Result<MergeStats, AppError> {
        let existing = self.load()?;
        let (merged, stats) = merge_postings(existing, new, today);
        self.persist(merged)?;
        Ok(stats)
    }

    async fn for_titles(&self, titles: &[String]) -> Result<Vec<Posting>, AppError> {
        let postings = self.load()?;
        Ok(postings
            .into_iter()
            .filter(|p| p.searched_titles.iter().any(|t| titles.contains(t)))
            .collect())
    }
}
