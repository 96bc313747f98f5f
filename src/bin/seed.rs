use tracing_subscriber::EnvFilter;

use portfolio_api::{
    content::{event_drafts, project_drafts},
    db::postgres::{create_pool, run_migrations},
    repositories::{
        event::EventRepository,
        project::ProjectRepository,
        sqlx_repo::{SqlxEventRepo, SqlxProjectRepo},
    },
    settings::AppConfig,
};

/// Replaces every project and event with the bundled content.
#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = AppConfig::new()?;
    let database_url = config
        .database_url
        .as_deref()
        .ok_or_else(|| anyhow::anyhow!("APP_DATABASE_URL must be set to seed the database"))?;

    let pool = create_pool(database_url).await?;
    run_migrations(&pool).await?;

    let projects = project_drafts()?;
    let events = event_drafts()?;

    let inserted_projects = SqlxProjectRepo::new(pool.clone()).replace_all_projects(&projects).await?;
    tracing::info!("✓ Seeded {} projects", inserted_projects);

    let inserted_events = SqlxEventRepo::new(pool.clone()).replace_all_events(&events).await?;
    tracing::info!("✓ Seeded {} events", inserted_events);

    pool.close().await;
    Ok(())
}
