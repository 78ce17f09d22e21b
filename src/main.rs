use actix_web::{App, HttpServer, middleware::Logger, web};
use anyhow::Context;
use chrono::Local;
use env_logger::{Env, Target};
use std::io::Write;

use subs_backend::{
    config::Config,
    database::{create_pool, run_migrations},
    handlers,
    middlewares::create_cors,
    services::SubscriptionService,
    swagger::swagger_config,
};

fn init_logging() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info"))
        .format(|buf, record| {
            let ts = Local::now().format("%Y-%m-%dT%H:%M:%S%.3f%:z");
            let level = record.level().as_str().to_ascii_lowercase();
            let msg_json = serde_json::to_string(&format!("{}", record.args()))
                .unwrap_or_else(|_| "\"<invalid utf8>\"".to_string());
            writeln!(
                buf,
                "{{\"timestamp\":\"{}\",\"level\":\"{}\",\"message\":{},\"target\":\"{}\"}}",
                ts,
                level,
                msg_json,
                record.target(),
            )
        })
        .target(Target::Stdout)
        .init();
}

#[actix_web::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::from_toml().context("Failed to load configuration")?;

    let pool = create_pool(&config.database)
        .await
        .context("Failed to create database connection pool")?;

    run_migrations(&pool)
        .await
        .context("Failed to run database migrations")?;

    let subscription_service = SubscriptionService::new(pool.clone());

    log::info!(
        "Starting HTTP server at {}:{}",
        config.server.host,
        config.server.port
    );

    // SIGINT/SIGTERM stop the listener and let in-flight requests drain
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(create_cors())
            .app_data(web::Data::new(subscription_service.clone()))
            .app_data(handlers::json_config())
            .app_data(handlers::query_config())
            .configure(swagger_config)
            .service(web::scope("/api/v1").configure(handlers::subscription_config))
    })
    .shutdown_timeout(config.server.shutdown_timeout)
    .bind((config.server.host.as_str(), config.server.port))?
    .run()
    .await?;

    log::info!("HTTP server stopped, closing database pool");
    pool.close()
        .await
        .context("Failed to close database connection pool")?;

    Ok(())
}
