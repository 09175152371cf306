use actix_web::{web, App, HttpServer};
use anyhow::Context;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use trust_safety_service::{
    config::Config,
    handlers::{self, AdminAuth},
    services::{ContentClassifier, ModerationGate, ModerationStats, OpenAiModerationClient},
};

fn init_tracing(log_format: &str) {
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info,actix_web=info".into());

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
            .with(tracing_subscriber::fmt::layer().with_thread_ids(true))
            .init();
    }
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env().context("Failed to load configuration")?;
    init_tracing(&config.app.log_format);

    tracing::info!(
        service = %config.app.service_name,
        environment = %config.app.environment,
        port = config.app.port,
        "Starting Trust & Safety Service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let classifier = OpenAiModerationClient::from_config(&config.moderation)
        .context("Failed to build moderation classifier")?
        .map(|client| Arc::new(client) as Arc<dyn ContentClassifier>);

    match (&classifier, config.app.environment.is_development()) {
        (Some(c), _) => tracing::info!(
            classifier = c.name(),
            model = %config.moderation.model,
            "External classifier enabled"
        ),
        (None, true) => tracing::warn!("No OPENAI_API_KEY set, using keyword screen"),
        (None, false) => tracing::error!(
            "No OPENAI_API_KEY set outside development, all content will be rejected"
        ),
    }

    let gate = web::Data::new(ModerationGate::new(
        classifier,
        config.app.environment,
        Arc::new(ModerationStats::new()),
    ));
    let admin = web::Data::new(AdminAuth::new(config.admin.api_key.clone()));

    let bind_addr = (config.app.host.clone(), config.app.port);
    tracing::info!("Listening on {}:{}", bind_addr.0, bind_addr.1);

    HttpServer::new(move || {
        App::new()
            .wrap(TracingLogger::default())
            .app_data(gate.clone())
            .app_data(admin.clone())
            .configure(handlers::configure)
    })
    .bind(bind_addr)
    .context("Failed to bind HTTP listener")?
    .run()
    .await
    .context("HTTP server terminated with an error")?;

    Ok(())
}
