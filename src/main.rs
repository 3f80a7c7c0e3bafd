use actix_multipart::form::MultipartFormConfig;
use actix_web::{App, HttpServer, web};
use tracing::info;
use tracing_subscriber::{Layer, filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod api;
mod config;
mod db;
mod plan;
mod schema;
mod shutdown;

use crate::api::{
    application::{ApplicationService, application_config},
    auth::TokenVerifier,
    health::health_config,
    job::{JobService, job_config},
    profile::profile_config,
    quote::quote_config,
    upload::{UploadStore, upload_config},
    validation,
};
use crate::plan::PlanClient;
use crate::shutdown::ShutdownCoordinator;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from environment
    let config::Config {
        database_url,
        host,
        port,
        max_payload_size,
        max_db_connections,
        log_dir,
        upload_root,
        upload_base_url,
        token_secret,
        planner_base_url,
        planner_api_key,
        planner_model,
    } = config::Config::from_env().expect("Failed to load configuration");

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(&log_dir).expect("Failed to create logs directory");

    // Initialize file-based logging with daily rotation and level separation
    // Log files will be created as: logs/info.2024-12-22.log, logs/error.2024-12-22.log, etc.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Create daily rotating file appenders for each log level
    let info_file = tracing_appender::rolling::daily(&log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(&log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(&log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    // Create console/stdout layer for terminal output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .init();

    // Get database connection pool
    let pool = db::connection::get_connection(&database_url, max_db_connections)
        .await
        .expect("Failed to connect to database");

    info!("Starting cleanboard application");
    info!("Configuration loaded successfully:");
    info!("  - Bind address: {}:{}", host, port);
    info!("  - Max payload size: {} bytes", max_payload_size);
    info!("  - Max database connections: {}", max_db_connections);
    info!("  - Upload root: {}", upload_root);
    info!("Database connection pool established");

    // Run migrations on startup (auto-migrate when starting server)
    db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");

    std::fs::create_dir_all(&upload_root).expect("Failed to create uploads directory");

    // Shared infrastructure handed to every worker
    let verifier = web::Data::new(TokenVerifier::new(&token_secret));
    let upload_store = web::Data::new(UploadStore::new(upload_root, upload_base_url));
    let plan_client = web::Data::new(
        PlanClient::new(planner_api_key, planner_base_url, planner_model)
            .expect("Failed to configure plan client"),
    );

    // Clone pool for HTTP server (original will be used for shutdown)
    let server_pool = pool.clone();

    let server = HttpServer::new(move || {
        let job_service = web::Data::new(JobService::new(server_pool.clone()));
        let application_service = web::Data::new(ApplicationService::new(server_pool.clone()));

        // Configure payload size limits globally
        let payload_config = web::PayloadConfig::default().limit(max_payload_size);
        let multipart_config = MultipartFormConfig::default().total_limit(max_payload_size);

        App::new()
            .app_data(web::Data::new(server_pool.clone())) // Share DB pool across workers
            .app_data(job_service)
            .app_data(application_service)
            .app_data(verifier.clone())
            .app_data(upload_store.clone())
            .app_data(plan_client.clone())
            .app_data(payload_config) // Global payload size limit
            .app_data(multipart_config) // Global multipart/file upload size limit
            .app_data(validation::json_config()) // Global validation config
            .configure(health_config)
            .configure(job_config)
            .configure(application_config)
            .configure(profile_config)
            .configure(upload_config)
            .configure(quote_config)
    });

    info!("Server starting on http://{}:{}", host, port);

    // Bind and start the server
    let server = server.bind((host.as_str(), port))?.run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn server in background
    let server_task = tokio::spawn(server);

    // Create shutdown coordinator and wait for shutdown signal
    let coordinator = ShutdownCoordinator::new(server_handle, server_task, pool);

    coordinator.wait_for_shutdown().await
}
