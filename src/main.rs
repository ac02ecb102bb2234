use std::time::Duration;

use actix_cors::Cors;
use actix_web::{http::header, App, HttpServer};
use anyhow::Context;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use school_fees::config::{database, Config, StorageBackend};
use school_fees::{AppServices, InMemoryStore, Repositories};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // Load configuration
    let config = Config::from_env().context("Failed to load configuration")?;
    config.validate().context("Configuration validation failed")?;

    init_tracing(&config);

    tracing::info!("Starting school fee service");
    tracing::info!("Environment: {}", config.app.env);
    tracing::info!("Server binding to: {}", config.server.bind_address());

    let repos = match config.storage.backend {
        StorageBackend::MySql => {
            let db_config = config
                .database
                .as_ref()
                .context("DATABASE_URL is required for the mysql backend")?;

            let db_pool = db_config
                .create_pool()
                .await
                .context("Failed to create database pool")?;

            tracing::info!(
                "Database pool initialized ({} connections)",
                db_config.pool_size
            );

            if config.storage.run_migrations {
                database::run_migrations(&db_pool)
                    .await
                    .context("Failed to run migrations")?;
                tracing::info!("Database migrations applied");
            }

            Repositories::mysql(db_pool)
        }
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage; data is lost on shutdown");
            Repositories::in_memory(InMemoryStore::new(Duration::from_millis(
                config.storage.lock_timeout_ms,
            )))
        }
    };

    let services = AppServices::new(
        repos,
        config.allocation.clone(),
        config.generation.clone(),
    );
    let cors_origin = config.app.cors_allowed_origin.clone();

    // Start HTTP server
    let bind_address = config.server.bind_address();
    let server = HttpServer::new(move || {
        let cors = match &cors_origin {
            Some(origin) => Cors::default()
                .allowed_origin(origin)
                .allowed_methods(vec!["GET", "POST", "PUT"])
                .allowed_headers(vec![header::CONTENT_TYPE, header::ACCEPT])
                .max_age(3600),
            None => Cors::default(),
        };

        let services = services.clone();
        App::new()
            .wrap(TracingLogger::default())
            .wrap(cors)
            .configure(move |cfg| services.configure(cfg))
    })
    .workers(config.server.workers)
    .bind(&bind_address)
    .with_context(|| format!("Failed to bind {}", bind_address))?
    .run();

    tracing::info!("Server started at http://{}", bind_address);

    server.await.context("HTTP server error")
}

fn init_tracing(config: &Config) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "school_fees=debug,actix_web=info".into());

    let (json, pretty) = if config.json_logs() {
        (Some(tracing_subscriber::fmt::layer().json()), None)
    } else {
        (None, Some(tracing_subscriber::fmt::layer()))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(json)
        .with(pretty)
        .init();
}
