//! HTTP route handlers for the shop API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /health                    - Liveness
//! GET    /health/ready              - Readiness (database reachable)
//!
//! # Auth (rate limited)
//! POST   /api/auth/register         - Create account, log in
//! POST   /api/auth/login            - Log in
//! POST   /api/auth/logout           - Log out
//! GET    /api/auth/me               - Current user
//!
//! # Products
//! GET    /api/products[?category=]  - Listing
//! GET    /api/products/{id}         - Detail
//! POST   /api/products              - Create (admin)
//! PUT    /api/products/{id}         - Replace (admin)
//! DELETE /api/products/{id}         - Delete (admin)
//!
//! # Orders
//! POST   /api/orders                - Submit (guest or user)
//! GET    /api/orders                - All orders (admin)
//! GET    /api/orders/mine           - Caller's orders
//! GET    /api/orders/{id}           - Detail (owner or admin)
//! PUT    /api/orders/{id}/pay       - Mark paid (admin)
//! PUT    /api/orders/{id}/deliver   - Mark delivered (admin)
//!
//! # Users (admin)
//! GET    /api/users                 - Listing
//! GET    /api/users/{id}            - Detail
//! PUT    /api/users/{id}            - Edit name, email, role
//! DELETE /api/users/{id}            - Delete
//! ```

pub mod auth;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    extract::State,
    http::StatusCode,
    routing::{get, post, put},
};

use crate::middleware::auth_rate_limiter;
use crate::state::AppState;

/// Create the auth routes router.
pub fn auth_routes() -> Router<AppState> {
    let router = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/logout", post(auth::logout))
        .route("/me", get(auth::me));

    match auth_rate_limiter() {
        Some(limiter) => router.layer(limiter),
        None => {
            tracing::warn!("auth rate limiter misconfigured, auth routes are not limited");
            router
        }
    }
}

/// Create the product routes router.
pub fn product_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(products::index).post(products::create))
        .route(
            "/{id}",
            get(products::show)
                .put(products::update)
                .delete(products::delete),
        )
}

/// Create the order routes router.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(orders::index).post(orders::create))
        .route("/mine", get(orders::mine))
        .route("/{id}", get(orders::show))
        .route("/{id}/pay", put(orders::pay))
        .route("/{id}/deliver", put(orders::deliver))
}

/// Create the user administration routes router.
pub fn user_routes() -> Router<AppState> {
    Router::new().route("/", get(users::index)).route(
        "/{id}",
        get(users::show).put(users::update).delete(users::delete),
    )
}

/// Create all API routes.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api/auth", auth_routes())
        .nest("/api/products", product_routes())
        .nest("/api/orders", order_routes())
        .nest("/api/users", user_routes())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness health check endpoint.
///
/// Returns 503 Service Unavailable if the database is not reachable.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match sqlx::query("SELECT 1").fetch_one(state.pool()).await {
        Ok(_) => StatusCode::OK,
        Err(e) => {
            tracing::warn!(error = %e, "readiness check failed");
            StatusCode::SERVICE_UNAVAILABLE
        }
    }
}
