//! # Counselbook API
//!
//! The API crate provides the web server for counselor appointment booking.
//! It exposes RESTful endpoints for booking sessions, checking a counselor's
//! free slots, moving appointments through their lifecycle and listing them
//! per student or per counselor.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Validate input, enforce booking rules, call the store
//! - **Middleware**: Caller identity extraction and error mapping
//! - **Config**: Environment and application configuration
//!
//! Handlers only see the [`BookingStore`] trait, so the same router runs on
//! Postgres in production and on the in-memory store in tests.

/// Configuration module for API settings
pub mod config;
/// Request handlers that implement business logic
pub mod handlers;
/// Middleware for caller identity and error handling
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;

use axum::Router;
use counselbook_core::availability::CancelledSlotPolicy;
use counselbook_db::BookingStore;
use eyre::{Result, WrapErr};
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    /// Persistence for users, counselors and appointments
    pub store: Arc<dyn BookingStore>,

    /// Whether cancelled appointments keep blocking their slot
    pub cancelled_slots: CancelledSlotPolicy,
}

impl ApiState {
    pub fn new(store: Arc<dyn BookingStore>, cancelled_slots: CancelledSlotPolicy) -> Self {
        Self {
            store,
            cancelled_slots,
        }
    }
}

/// Builds the application router with all routes attached to `state`.
pub fn app(state: Arc<ApiState>) -> Router {
    Router::new()
        // Health check endpoints
        .merge(routes::health::routes())
        // Appointment booking and lifecycle endpoints
        .merge(routes::appointment::routes())
        // Counselor directory and availability endpoints
        .merge(routes::counselor::routes())
        // Student directory endpoints
        .merge(routes::user::routes())
        // Attach shared state to all routes
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}

/// Starts the API server with the provided configuration and store
///
/// This function initializes logging, configures routes and middleware,
/// and serves HTTP until the listener fails.
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use counselbook_api::config::ApiConfig;
/// use counselbook_db::{create_pool, PgStore};
///
/// let config = ApiConfig::from_env()?;
/// let pool = create_pool(&config.database_url, config.database_max_connections).await?;
/// counselbook_api::start_server(config, Arc::new(PgStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn BookingStore>) -> Result<()> {
    // Initialize tracing for logging
    let subscriber = FmtSubscriber::builder()
        .with_max_level(config.log_level)
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    // Create shared state with dependencies
    let state = Arc::new(ApiState::new(store, config.cancelled_slots));
    info!("Cancelled slot policy: {:?}", config.cancelled_slots);

    let app = app(state);

    // Apply CORS configuration if origins are specified
    let app = if let Some(origins) = &config.cors_origins {
        let origins = origins
            .iter()
            .map(|origin| origin.parse())
            .collect::<Result<Vec<axum::http::HeaderValue>, _>>()
            .wrap_err("Invalid API_CORS_ORIGINS entry")?;

        let cors = tower_http::cors::CorsLayer::new()
            .allow_methods([
                axum::http::Method::GET,
                axum::http::Method::POST,
                axum::http::Method::PUT,
                axum::http::Method::OPTIONS,
            ])
            .allow_headers([
                axum::http::header::CONTENT_TYPE,
                axum::http::header::AUTHORIZATION,
                axum::http::header::ACCEPT,
                middleware::auth::USER_ID_HEADER,
                middleware::auth::USER_ROLE_HEADER,
            ])
            .allow_origin(origins)
            .allow_credentials(true);

        app.layer(cors)
    } else {
        app
    };

    // Add request timeout middleware
    let app = app.layer(
        tower::ServiceBuilder::new()
            .layer(axum::error_handling::HandleErrorLayer::new(
                middleware::error_handling::handle_timeout,
            ))
            .timeout(std::time::Duration::from_secs(config.request_timeout)),
    );

    // Start the HTTP server
    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
