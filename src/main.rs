use std::sync::Arc;

use dotenvy::dotenv;
use marketplace_service::infrastructure::DieselStore;
use marketplace_service::{build_server, create_pool, run_migrations, Config, Marketplace};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenv().ok();
    env_logger::init_from_env(env_logger::Env::default().default_filter_or("info"));

    let config = Config::from_env().unwrap_or_else(|e| {
        log::error!("invalid configuration: {e}");
        std::process::exit(1);
    });

    let pool = create_pool(&config.database_url).expect("Failed to create database connection pool");
    run_migrations(&pool).expect("Failed to run database migrations");

    let market = Marketplace::new(Arc::new(DieselStore::new(pool)));

    log::info!("Starting server at http://{}:{}", config.host, config.port);

    build_server(market, &config.host, config.port)?.await
}
