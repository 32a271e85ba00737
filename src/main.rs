use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use internscout::config::{Command, Config, StoreBackend};
use internscout::db;
use internscout::pipeline;
use internscout::render;
use internscout::routes::{self, AppState};
use internscout::source::{JSearchSource, JobSource};
use internscout::store::{CsvStore, PgStore, PostingStore};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("internscout=info,tower_http=info")),
        )
        .init();

    let config = Config::parse();
    let store = build_store(&config).await?;
    let source: Arc<dyn JobSource> = Arc::new(JSearchSource::new(config.api_key.clone()));

    match config.command {
        Command::Search { titles, location } => {
            let outcome =
                pipeline::run(source.as_ref(), store.as_ref(), &titles, &location).await?;
            if outcome.stats.quota_exceeded {
                tracing::warn!("Results are partial: the source quota was exceeded mid-run");
            }
            render::print_report(&outcome.grouped)?;
        }
        Command::Serve { listen_addr } => {
            let app = routes::router(AppState { source, store });
            let listener = tokio::net::TcpListener::bind(&listen_addr).await?;
            tracing::info!("Listening on {listen_addr}");
            axum::serve(listener, app).await?;
        }
    }

    Ok(())
}

async fn build_store(config: &Config) -> anyhow::Result<Arc<dyn PostingStore>> {
    match config.store_backend {
        StoreBackend::Csv => {
            tracing::info!("Using CSV store at {}", config.csv_path.display());
            Ok(Arc::new(CsvStore::new(config.csv_path.clone())))
        }
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .ok_or_else(|| anyhow::anyhow!("--database-url is required for the postgres backend"))?;
            tracing::info!("Connecting to database...");
            let pool = db::create_pool(url).await?;
            if config.run_migrations {
                tracing::info!("Running database migrations...");
                db::run_migrations(&pool).await?;
            }
            Ok(Arc::new(PgStore::new(pool)))
        }
    }
}
