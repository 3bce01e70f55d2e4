use actix_cors::Cors;
use actix_web::{web, App, HttpServer};
use anyhow::{anyhow, Context};
use tracing_actix_web::TracingLogger;

use feed_api::config::{Config, StoreBackend};
use feed_api::db::{MemoryStore, PgStore};
use feed_api::storage::ImageStore;
use feed_api::{routes, telemetry, AppState};

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    // A missing .env file is fine
    let _ = dotenvy::dotenv();

    let config = Config::from_env().map_err(|e| anyhow!("invalid configuration: {}", e))?;
    telemetry::init_tracing(config.logging.format);

    tracing::info!(
        env = %config.app.env,
        store = ?config.store.backend,
        "starting feed-api"
    );

    let images = ImageStore::new(&config.storage.root, config.storage.max_image_bytes);
    tokio::fs::create_dir_all(images.image_dir())
        .await
        .with_context(|| format!("failed to create {}", images.image_dir().display()))?;

    let state = match config.store.backend {
        StoreBackend::Postgres => {
            let store = PgStore::connect(&config.database.url, config.database.max_connections)
                .await
                .context("failed to connect to database")?;
            if config.database.run_migrations {
                store.migrate().await.context("failed to run migrations")?;
                tracing::info!("database migrations applied");
            }
            AppState::postgres(store, images)
        }
        StoreBackend::Memory => {
            tracing::warn!("using in-memory store; data is lost on restart");
            AppState::in_memory(MemoryStore::new(), images)
        }
    };

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("listening on {}", bind_address);

    let state = web::Data::new(state);
    let cors_config = config.cors.clone();

    HttpServer::new(move || {
        let mut cors = Cors::default();
        if cors_config.allows_any() {
            cors = cors.allow_any_origin();
        } else {
            for origin in cors_config.origins() {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(state.clone())
            .wrap(cors)
            .wrap(TracingLogger::default())
            .configure(routes::configure)
    })
    .bind(&bind_address)
    .with_context(|| format!("failed to bind {}", bind_address))?
    .run()
    .await
    .context("server error")?;

    tracing::info!("feed-api stopped");
    Ok(())
}
