use std::path::PathBuf;

use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(name = "internscout", about = "Internship posting aggregator grouped by company")]
pub struct Config {
    /// RapidAPI key for the JSearch endpoint
    #[arg(long, env = "RAPID_API_KEY", hide_env_values = true)]
    pub api_key: String,

    /// Storage backend for aggregated postings
    #[arg(long, env = "STORE_BACKEND", value_enum, default_value = "csv")]
    pub store_backend: StoreBackend,

    /// Path of the CSV store (csv backend)
    #[arg(long, env = "CSV_PATH", default_value = "jobs.csv")]
    pub csv_path: PathBuf,

    /// Database connection URL (postgres backend)
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    /// Run database migrations on startup (postgres backend)
    #[arg(long, env = "RUN_MIGRATIONS", default_value = "true")]
    pub run_migrations: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(clap::ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    Csv,
    Postgres,
}

#[derive(clap::Subcommand, Debug, Clone)]
pub enum Command {
    /// Run one search and print the grouped report to stdout
    Search {
        /// Job title to search for; repeat for multiple titles
        #[arg(long = "title", required = true)]
        titles: Vec<String>,

        /// Location to search in
        #[arg(long, default_value = "Singapore")]
        location: String,
    },
    /// Serve the interactive search form and JSON API
    Serve {
        /// Listen address
        #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8080")]
        listen_addr: String,
    },
}
