use std::sync::Arc;

use color_eyre::eyre::{Result, WrapErr};
use counselbook_api::config::ApiConfig;
use counselbook_db::{create_pool, schema::initialize_database, PgStore};
use dotenv::dotenv;

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize error handling
    color_eyre::install()?;

    // Load environment variables
    dotenv().ok();

    // Load configuration
    let config = ApiConfig::from_env()?;

    // Create database connection pool
    let db_pool = create_pool(&config.database_url, config.database_max_connections)
        .await
        .wrap_err("Failed to connect to the database")?;

    // Tables and the double-booking index must exist before serving
    initialize_database(&db_pool).await?;

    // Start API server
    counselbook_api::start_server(config, Arc::new(PgStore::new(db_pool))).await?;

    Ok(())
}
