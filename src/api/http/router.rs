// src/api/http/router.rs
// HTTP router composition for REST API endpoints

use axum::{
    Router,
    http::{HeaderName, HeaderValue, Method, header},
    routing::{get, post},
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use super::{chat, commands, handlers, models, navigation, pages, settings};
use crate::state::AppState;

/// Reported in the `x-api-version` header on every response
pub const API_VERSION: &str = "1";

fn cors_layer(origin: &str) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]);

    if origin.trim() == "*" {
        return cors.allow_origin(Any);
    }
    match HeaderValue::from_str(origin.trim()) {
        Ok(value) => cors.allow_origin(value),
        Err(_) => {
            warn!("Invalid CORS origin '{}', allowing any origin", origin);
            cors.allow_origin(Any)
        }
    }
}

/// Create the router with all endpoints
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.cors_origin);

    let version_header = SetResponseHeaderLayer::if_not_present(
        HeaderName::from_static("x-api-version"),
        HeaderValue::from_static(API_VERSION),
    );

    let api_router = Router::new()
        .route("/health", get(handlers::health_handler))
        .route("/providers", get(handlers::providers_handler))
        // Chat
        .route("/chat", post(chat::chat_handler))
        .route("/ai", post(chat::legacy_ai_handler))
        .route("/ai/models", get(models::models_handler))
        .route(
            "/ai/settings",
            get(settings::get_ai_settings).post(settings::save_ai_settings),
        )
        // Settings
        .route("/settings/get-api-keys", get(settings::get_api_keys))
        .route("/settings/save-api-keys", post(settings::save_api_keys))
        .route("/settings/delete-api-key", post(settings::delete_api_key))
        .route(
            "/settings/header",
            get(settings::get_header_settings)
                .patch(settings::update_header_settings)
                .delete(settings::reset_header_settings),
        )
        .route(
            "/favorites",
            get(models::get_favorites).post(models::toggle_favorite),
        )
        .route(
            "/navigation",
            get(navigation::get_navigation).post(navigation::set_visibility),
        )
        // Pages
        .route("/pages", get(pages::list_pages).post(pages::create_page))
        .route(
            "/pages/{slug}",
            get(pages::get_page)
                .put(pages::update_page)
                .delete(pages::delete_page),
        )
        .route("/commands", post(commands::execute_command));

    Router::new()
        .nest("/api", api_router)
        .layer(version_header)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Bind and serve until ctrl-c
pub async fn run(state: AppState) -> anyhow::Result<()> {
    let addr = state.config.bind_address();
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!("Server listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("Shutdown signal received");
            }
        })
        .await?;
    Ok(())
}
