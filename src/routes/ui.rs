use askama::Template;
use axum::Form;
use axum::Router;
use axum::extract::State;
use axum::response::Html;
use axum::routing::{get, post};
use serde::Deserialize;

use crate::error::{AppError, HtmlError};
use crate::models::company::Grouped;
use crate::models::posting::NOT_LISTED;
use crate::pipeline;
use crate::routes::AppState;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/search", post(search))
        .with_state(state)
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {
    location: String,
}

#[derive(Template)]
#[template(path = "results.html")]
struct ResultsTemplate {
    companies: Vec<CompanyView>,
    role_total: usize,
    quota_exceeded: bool,
}

struct CompanyView {
    name: String,
    roles: Vec<RoleRow>,
}

struct RoleRow {
    title: String,
    link: String,
    details: Vec<Detail>,
}

struct Detail {
    label: &'static str,
    value: String,
}

#[derive(Debug, Deserialize)]
pub struct SearchForm {
    pub titles: String,
    pub location: String,
}

async fn index() -> Result<Html<String>, HtmlError> {
    let page = IndexTemplate {
        location: "Singapore".to_string(),
    };
    Ok(Html(page.render().map_err(AppError::from)?))
}

async fn search(
    State(state): State<AppState>,
    Form(form): Form<SearchForm>,
) -> Result<Html<String>, HtmlError> {
    let titles = parse_titles(&form.titles);
    if titles.is_empty() || form.location.trim().is_empty() {
        return Err(HtmlError(AppError::BadRequest(
            "Please fill in at least one job title and a location".to_string(),
        )));
    }

    let outcome = pipeline::run(
        state.source.as_ref(),
        state.store.as_ref(),
        &titles,
        form.location.trim(),
    )
    .await?;

    let page = ResultsTemplate {
        role_total: outcome.grouped.role_count(),
        companies: company_views(outcome.grouped),
        quota_exceeded: outcome.stats.quota_exceeded,
    };
    Ok(Html(page.render().map_err(AppError::from)?))
}

/// One title per line; commas also accepted.
fn parse_titles(input: &str) -> Vec<String> {
    let mut titles: Vec<String> = Vec::new();
    for part in input.split(['\n', ',']) {
        let title = part.trim();
        if !title.is_empty() && !titles.iter().any(|t| t == title) {
            titles.push(title.to_string());
        }
    }
    titles
}

/// Flatten the grouped mapping into display-ready rows, dropping sentinel
/// fields here so the template stays logic-free.
fn company_views(grouped: Grouped) -> Vec<CompanyView> {
    grouped
        .companies
        .into_iter()
        .map(|company| CompanyView {
            name: company.name,
            roles: company
                .roles
                .into_iter()
                .map(|role| {
                    let mut details = Vec::new();
                    for (label, value) in [
                        ("Publisher", role.publisher),
                        ("Responsibilities", role.responsibilities),
                        ("Qualifications", role.qualifications),
                        ("Max Salary", role.max_salary),
                    ] {
                        if !value.is_empty() && value != NOT_LISTED {
                            details.push(Detail { label, value });
                        }
                    }
                    if let Some(date) = role.expiry_date {
                        details.push(Detail {
                            label: "Expires",
                            value: date.to_string(),
                        });
                    }
                    RoleRow {
                        title: role.title,
                        link: role.application_link,
                        details,
                    }
                })
                .collect(),
        })
        .collect()
}
