//! TelAPI server
//!
//! Twilio-compatible call-management backend: serves the 2010-04-01 call
//! resource API and runs the hourly expiry scheduler that sweeps calls stuck
//! in transient states.

use actix_cors::Cors;
use actix_web::{middleware, web, App, HttpResponse, HttpServer};
use std::env;
use std::sync::Arc;
use std::time::Duration;
use telapi_api::handlers::configure_calls;
use telapi_core::{traits::JobQueue, AppConfig};
use telapi_db::{create_pool, PgPhoneCallRepository};
use telapi_jobs::{
    ExecuteWorkflowJob, HourlyJob, JobWorker, TokioJobQueue, WorkflowRegistry,
    SCHEDULED_WORKFLOWS,
};
use tokio::time::MissedTickBehavior;
use tracing::info;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Health check endpoint
async fn health_check() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({
        "status": "healthy",
        "service": "telapi",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Initialize tracing/logging
fn init_tracing() {
    let log_level = env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "telapi={},telapi_api={},telapi_db={},telapi_jobs={},actix_web=info,sqlx=warn",
            log_level, log_level, log_level, log_level
        ))
    });

    tracing_subscriber::registry()
        .with(env_filter)
        .with(
            fmt::layer()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true),
        )
        .init();
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    init_tracing();

    info!("Starting TelAPI v{}", env!("CARGO_PKG_VERSION"));

    let config = AppConfig::load().expect("Failed to load configuration");

    info!("Connecting to database...");
    let pool = create_pool(&config.database.url, Some(config.database.max_connections))
        .await
        .expect("Failed to create database pool");

    let repo = Arc::new(PgPhoneCallRepository::new(pool));

    // Fixed workflow catalog, validated before the scheduler starts so a
    // missing registration fails the boot instead of an hourly job
    let registry = Arc::new(WorkflowRegistry::standard(repo.clone(), &config.expiry));
    registry
        .verify_scheduled(SCHEDULED_WORKFLOWS)
        .expect("Scheduled workflow is not registered");

    let dispatcher = Arc::new(ExecuteWorkflowJob::new(registry));
    let (queue, receiver) = TokioJobQueue::new();
    let queue: Arc<dyn JobQueue> = Arc::new(queue);

    tokio::spawn(JobWorker::new(receiver, dispatcher).run());

    if config.scheduler.enabled {
        let scheduler = HourlyJob::new(queue.clone());
        let cadence = Duration::from_secs(config.scheduler.interval_secs);
        info!("Starting expiry scheduler with cadence {:?}", cadence);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(cadence);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            // First tick fires immediately: sweep at startup, then on cadence
            loop {
                ticker.tick().await;
                let submitted = scheduler.perform().await;
                info!("Scheduler tick: {} workflows enqueued", submitted);
            }
        });
    }

    let bind_addr = config.server_addr();
    let workers = config.server.workers;
    info!(
        "Starting HTTP server on {} with {} workers",
        bind_addr, workers
    );

    let repo_data = web::Data::from(repo);

    HttpServer::new(move || {
        App::new()
            .app_data(repo_data.clone())
            // Local emulator: browsers and test harnesses hit it directly
            .wrap(Cors::permissive())
            .wrap(middleware::Logger::new("%a \"%r\" %s %b %Dms"))
            .wrap(middleware::NormalizePath::trim())
            .route("/health", web::get().to(health_check))
            .configure(configure_calls)
    })
    .workers(workers)
    .bind(&bind_addr)?
    .run()
    .await
}
