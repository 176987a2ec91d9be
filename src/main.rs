//! Vetstore storefront backend
//!
//! Holds the catalog filter state, category projection and cart for the
//! storefront UI, persisted in SQLite and fed from the catalog REST backend.

mod api;
mod auth;
mod config;
mod db;
mod errors;
mod fetch;
mod models;
mod projection;
mod store;

use std::sync::Arc;

use axum::{
    middleware,
    routing::{delete, get, post, put},
    Router,
};
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use config::Config;
use db::Repository;
use fetch::CatalogFetcher;
use store::Storefront;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub storefront: Arc<RwLock<Storefront>>,
    pub catalog: Arc<CatalogFetcher>,
    pub repo: Arc<Repository>,
    pub config: Arc<Config>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Vetstore storefront backend");
    tracing::info!("Catalog API: {}", config.api_url);
    tracing::info!("Database path: {:?}", config.db_path);
    tracing::info!("Bind address: {}", config.bind_addr);

    if config.admin_token.is_none() {
        tracing::warn!("No admin token configured (VETSTORE_ADMIN_TOKEN). Admin routes are open!");
    }

    // Initialize database and rehydrate persisted stores
    let pool = db::init_database(&config.db_path).await?;
    let repo = Arc::new(Repository::new(pool));
    let storefront = repo.load_storefront().await?;
    tracing::info!(
        "Rehydrated storefront at revision {} (language {}, {} cart items)",
        storefront.revision(),
        storefront.categories.language().as_str(),
        storefront.cart.item_count()
    );
    let storefront = Arc::new(RwLock::new(storefront));

    // The category tree is never persisted; fetch it for this session
    let catalog = Arc::new(CatalogFetcher::new(&config)?);
    if let Err(e) = catalog.load_categories(&storefront).await {
        tracing::warn!("Initial category fetch failed, will retry on demand: {}", e);
    }

    let state = AppState {
        storefront,
        catalog,
        repo,
        config: Arc::new(config.clone()),
    };

    // Build router
    let app = create_router(state);

    // Start server
    let listener = tokio::net::TcpListener::bind(&config.bind_addr).await?;
    tracing::info!("Server listening on {}", config.bind_addr);

    axum::serve(listener, app).await?;

    Ok(())
}

/// Create the application router with all routes.
pub fn create_router(state: AppState) -> Router {
    // CORS configuration
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let admin_token = state.config.admin_token.clone();

    let admin_routes = Router::new()
        .route("/catalog/invalidate", post(api::invalidate_catalog))
        .layer(middleware::from_fn(move |req, next| {
            auth::admin_auth_layer(admin_token.clone(), req, next)
        }));

    let api_routes = Router::new()
        // Categories
        .route("/catalog", get(api::get_catalog))
        .route("/sections", get(api::get_sections))
        .route("/language", put(api::set_language))
        .route("/categories/active", put(api::set_active_category))
        .route("/categories/{id}/toggle", post(api::toggle_category))
        // Filters
        .route("/filters", get(api::get_filters))
        .route("/filters", delete(api::clear_filters))
        .route("/filters/sections/{id}/toggle", post(api::toggle_section))
        .route("/filters/sections/{id}/select", post(api::select_section))
        .route("/filters/subsections/{id}/toggle", post(api::toggle_subsection))
        .route("/filters/creators/toggle", post(api::toggle_creator))
        // Products
        .route("/products", get(api::list_products))
        .route("/products/{id}", get(api::get_product))
        .route("/manufacturers", get(api::list_manufacturers))
        .route("/news", get(api::list_news))
        // Cart
        .route("/cart", get(api::get_cart))
        .route("/cart", delete(api::clear_cart))
        .route("/cart/items", post(api::add_cart_item))
        .route("/cart/items/{id}", put(api::update_cart_item))
        .route("/cart/items/{id}", delete(api::remove_cart_item))
        .route("/cart/items/{id}/increase", post(api::increase_cart_item))
        .route("/cart/items/{id}/decrease", post(api::decrease_cart_item))
        // Revision
        .route("/revision", get(api::get_revision))
        .nest("/admin", admin_routes);

    // Health check
    let health_routes = Router::new().route("/health", get(health_check));

    Router::new()
        .nest("/api", api_routes)
        .merge(health_routes)
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(cors),
        )
        .with_state(state)
}

/// Health check endpoint.
async fn health_check() -> &'static str {
    "OK"
}

#[cfg(test)]
mod tests;
