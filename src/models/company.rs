use std::collections::HashMap;

use chrono::NaiveDate;
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;

use crate::models::posting::Posting;

/// A posting as shown under its employer: everything except the employer
/// itself and the searched-titles bookkeeping. Sentinel "Not Listed" values
/// are kept; hiding them is the renderer's job.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RoleView {
    #[serde(rename = "Job Title")]
    pub title: String,
    #[serde(rename = "Publisher")]
    pub publisher: String,
    #[serde(rename = "Responsibilities")]
    pub responsibilities: String,
    #[serde(rename = "Qualifications")]
    pub qualifications: String,
    #[serde(rename = "Max Salary")]
    pub max_salary: String,
    #[serde(rename = "Application Page")]
    pub application_link: String,
    #[serde(rename = "Expiry Date")]
    pub expiry_date: Option<NaiveDate>,
}

impl From<Posting> for RoleView {
    fn from(posting: Posting) -> Self {
        RoleView {
            title: posting.title,
            publisher: posting.publisher,
            responsibilities: posting.responsibilities,
            qualifications: posting.qualifications,
            max_salary: posting.max_salary,
            application_link: posting.application_link,
            expiry_date: posting.expiry_date,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompanyJobs {
    pub name: String,
    pub roles: Vec<RoleView>,
}

/// Employer → roles view over a set of postings. Derived fresh on every
/// read, never persisted. Serializes as a JSON map in grouping order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Grouped {
    pub companies: Vec<CompanyJobs>,
}

impl Grouped {
    pub fn is_empty(&self) -> bool {
        self.companies.is_empty()
    }

    pub fn role_count(&self) -> usize {
        self.companies.iter().map(|c| c.roles.len()).sum()
    }
}

impl Serialize for Grouped {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.companies.len()))?;
        for company in &self.companies {
            map.serialize_entry(&company.name, &company.roles)?;
        }
        map.end()
    }
}

/// Group postings by employer, preserving the input sequence: employers
/// appear in first-seen order and each employer's roles keep their relative
/// order. No deduplication happens here; the store owns that.
pub fn group_by_employer(postings: Vec<Posting>) -> Grouped {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut companies: Vec<CompanyJobs> = Vec::new();

    for posting in postings {
        match index.get(&posting.employer) {
            Some(&i) => companies[i].roles.push(RoleView::from(posting)),
            None => {
                index.insert(posting.employer.clone(), companies.len());
                companies.push(CompanyJobs {
                    name: posting.employer.clone(),
                    roles: vec![RoleView::from(posting)],
                });
            }
        }
    }

    Grouped { companies }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::posting::NOT_LISTED;

    fn posting(employer: &str, title: &str) -> Posting {
        Posting {
            employer: employer.to_string(),
            title: title.to_string(),
            publisher: "LinkedIn".to_string(),
            responsibilities: NOT_LISTED.to_string(),
            qualifications: NOT_LISTED.to_string(),
            max_salary: NOT_LISTED.to_string(),
            application_link: format!("https://{}.example/apply", employer.to_lowercase()),
            expiry_date: NaiveDate::from_ymd_opt(2026, 12, 31),
            searched_titles: vec!["Software Engineer Intern".to_string()],
        }
    }

    #[test]
    fn groups_in_first_seen_order() {
        let grouped = group_by_employer(vec![
            posting("Acme", "Backend Intern"),
            posting("Globex", "Data Intern"),
            posting("Acme", "Frontend Intern"),
        ]);

        let names: Vec<&str> = grouped.companies.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["Acme", "Globex"]);
        let acme_roles: Vec<&str> = grouped.companies[0]
            .roles
            .iter()
            .map(|r| r.title.as_str())
            .collect();
        assert_eq!(acme_roles, vec!["Backend Intern", "Frontend Intern"]);
        assert_eq!(grouped.role_count(), 3);
    }

    #[test]
    fn grouping_is_deterministic() {
        let input = vec![
            posting("Initech", "ML Intern"),
            posting("Acme", "Backend Intern"),
            posting("Initech", "Platform Intern"),
        ];
        assert_eq!(
            group_by_employer(input.clone()),
            group_by_employer(input)
        );
    }

    #[test]
    fn does_not_deduplicate_repeated_pairs() {
        let grouped = group_by_employer(vec![
            posting("Acme", "Backend Intern"),
            posting("Acme", "Backend Intern"),
        ]);
        assert_eq!(grouped.companies[0].roles.len(), 2);
    }

    #[test]
    fn role_view_drops_employer_and_searched_titles() {
        let grouped = group_by_employer(vec![posting("Acme", "Backend Intern")]);
        let json = serde_json::to_value(&grouped).unwrap();
        let role = &json["Acme"][0];
        assert_eq!(role["Job Title"], "Backend Intern");
        assert!(role.get("Employer").is_none());
        assert!(role.get("Searched Titles").is_none());
    }
}
