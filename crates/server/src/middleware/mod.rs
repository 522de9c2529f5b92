//! HTTP middleware stack for the shop server.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. CORS (only when origins are configured)
//! 5. Session layer (tower-sessions with `PostgreSQL` store)
//! 6. Rate limiting on auth routes (governor)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod session;

pub use auth::{OptionalAuth, RequireAdmin, RequireAuth, clear_current_user, set_current_user};
pub use rate_limit::auth_rate_limiter;
pub use request_id::request_id_middleware;
pub use session::create_session_layer;
