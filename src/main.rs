use actix_cors::Cors;
use actix_web::{http::header, middleware::NormalizePath, web, App, HttpServer};
use once_cell::sync::Lazy;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{fmt, EnvFilter};

use portfolio_api::{
    background_task::start_limiter_eviction_task,
    constants::START_TIME,
    db::{
        postgres::{create_pool, run_migrations},
        Storage,
    },
    email::mailer_from_config,
    errors::expose_internal_details,
    graceful_shutdown::shutdown_signal,
    routes::configure_routes,
    settings::AppConfig,
    shared_repos::SharedRepositories,
    AppState,
};

fn init_tracing(config: &AppConfig) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    if config.is_production() {
        fmt().with_env_filter(filter).json().init();
    } else {
        fmt().with_env_filter(filter).init();
    }
}

/// Postgres when it is configured and reachable, the bundled content in
/// memory otherwise.
async fn connect_storage(config: &AppConfig) -> anyhow::Result<(SharedRepositories, Storage)> {
    let Some(database_url) = config.database_url.as_deref() else {
        tracing::warn!("No database configured, serving bundled content from memory");
        return Ok((SharedRepositories::in_memory()?, Storage::InMemory));
    };

    match create_pool(database_url).await {
        Ok(pool) => {
            run_migrations(&pool).await?;
            Ok((SharedRepositories::new(pool.clone()), Storage::Postgres(pool)))
        }
        Err(e) => {
            tracing::error!(error = %e, "Database unreachable, serving bundled content from memory");
            Ok((SharedRepositories::in_memory()?, Storage::InMemory))
        }
    }
}

fn cors(config: &AppConfig) -> Cors {
    config
        .cors_origins()
        .iter()
        .fold(Cors::default(), |cors, origin| {
            if origin == "*" {
                cors.allow_any_origin()
            } else {
                cors.allowed_origin(origin)
            }
        })
        .allowed_methods(vec!["GET", "POST", "PUT", "PATCH", "DELETE", "OPTIONS"])
        .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT, header::AUTHORIZATION])
        .supports_credentials()
        .max_age(3600)
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    Lazy::force(&START_TIME);

    let config = match AppConfig::new() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("Configuration error: {}", e);
            std::process::exit(1);
        }
    };

    init_tracing(&config);
    tracing::info!("Loaded configuration: {:?}", config);
    expose_internal_details(config.is_development());

    let (repos, storage) = connect_storage(&config).await?;
    let mailer = mailer_from_config(&config);

    let app_state = web::Data::new(AppState::new(&config, repos, storage, mailer));

    let server_addr = format!("{}:{}", config.host, config.port);

    tracing::info!(
        "🚀 Starting {} v{} on {} ({})",
        config.name,
        env!("CARGO_PKG_VERSION"),
        server_addr,
        config.env
    );

    if let Some(limiter) = app_state.limiter() {
        tokio::spawn(start_limiter_eviction_task(limiter));
    }

    let server_config = config.clone();
    let server = HttpServer::new(move || {
        App::new()
            .app_data(app_state.clone())
            .wrap(cors(&server_config))
            .wrap(NormalizePath::trim())
            .wrap(TracingLogger::default())
            .configure(configure_routes)
    })
    .workers(config.worker_count)
    .bind(server_addr)?
    .run();

    tokio::select! {
        res = server => res?,
        _ = shutdown_signal() => {},
    }

    Ok(())
}
