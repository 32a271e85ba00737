//! Console sink: plain-text report of the grouped results.

use std::io::{self, Write};

use crate::models::company::Grouped;
use crate::models::posting::NOT_LISTED;

pub fn print_report(grouped: &Grouped) -> io::Result<()> {
    let stdout = io::stdout();
    write_report(&mut stdout.lock(), grouped)
}

/// Write the "company → roles" report. Sentinel "Not Listed" fields are
/// suppressed at display time only; the data keeps them.
pub fn write_report<W: Write>(out: &mut W, grouped: &Grouped) -> io::Result<()> {
    if grouped.is_empty() {
        writeln!(out, "No live postings found.")?;
        return Ok(());
    }

    for company in &grouped.companies {
        let roles = if company.roles.len() == 1 { "role" } else { "roles" };
        writeln!(out, "Company: {} has {} {roles}", company.name, company.roles.len())?;

        for (i, role) in company.roles.iter().enumerate() {
            writeln!(out, "  {}. {}", i + 1, role.title)?;
            for (label, value) in [
                ("Publisher", &role.publisher),
                ("Responsibilities", &role.responsibilities),
                ("Qualifications", &role.qualifications),
                ("Max Salary", &role.max_salary),
            ] {
                if !value.is_empty() && value.as_str() != NOT_LISTED {
                    writeln!(out, "     {label}: {value}")?;
                }
            }
            writeln!(out, "     Apply: {}", role.application_link)?;
            if let Some(date) = role.expiry_date {
                writeln!(out, "     Expires: {date}")?;
            }
        }
        writeln!(out)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::company::{CompanyJobs, RoleView};
    use chrono::NaiveDate;

    fn grouped() -> Grouped {
        Grouped {
            companies: vec![CompanyJobs {
                name: "Acme".to_string(),
                roles: vec![RoleView {
                    title: "Backend Intern".to_string(),
                    publisher: "LinkedIn".to_string(),
                    responsibilities: NOT_LISTED.to_string(),
                    qualifications: "Rust".to_string(),
                    max_salary: NOT_LISTED.to_string(),
                    application_link: "https://acme.example/apply".to_string(),
                    expiry_date: NaiveDate::from_ymd_opt(2026, 9, 30),
                }],
            }],
        }
    }

    #[test]
    fn report_suppresses_sentinel_fields() {
        let mut out = Vec::new();
        write_report(&mut out, &grouped()).unwrap();
        let text = String::from_utf8(out).unwrap();

        assert!(text.contains("Company: Acme has 1 role"));
        assert!(text.contains("Qualifications: Rust"));
        assert!(!text.contains("Responsibilities"));
        assert!(!text.contains("Max Salary"));
        assert!(text.contains("Expires: 2026-09-30"));
    }

    #[test]
    fn empty_grouping_prints_a_notice() {
        let mut out = Vec::new();
        write_report(&mut out, &Grouped::default()).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No live postings found.\n");
    }
}
