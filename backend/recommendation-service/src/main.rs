use actix_web::{web, App, HttpServer};
use anyhow::Context;
use db_pool::{create_pool, DbConfig};
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use recommendation_service::config::Config;
use recommendation_service::db::Repositories;
use recommendation_service::handlers;
use recommendation_service::services::RecommendationService;

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info,sqlx=warn".into());

    if log_format.eq_ignore_ascii_case("json") {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_current_span(true)
                    .with_target(true)
                    .with_line_number(true),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().map_err(anyhow::Error::msg)?;
    init_tracing(&config.app.log_format);

    tracing::info!(
        "Starting {} v{}",
        config.app.service_name,
        env!("CARGO_PKG_VERSION")
    );
    tracing::info!("Environment: {}", config.app.env);

    let db_config = DbConfig {
        database_url: config.database.url.clone(),
        max_connections: config.database.max_connections,
        ..DbConfig::for_service(&config.app.service_name)
    };
    db_config.log_config();
    let pool = create_pool(db_config)
        .await
        .context("Failed to create database pool")?;

    if config.database.run_migrations {
        sqlx::migrate!("./migrations")
            .run(&pool)
            .await
            .context("Failed to run database migrations")?;
        tracing::info!("Database migrations applied");
    }

    let service = web::Data::new(RecommendationService::new(Repositories::postgres(pool)));

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(service.clone())
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}
