//! User Endpoint Service
//!
//! HTTP surface for user management (register, login, list, get, update,
//! delete) built with Actix-web. Handlers delegate to an injected
//! `UserService`; protected routes sit behind a JWT bearer-token middleware.

pub mod auth;
pub mod config;
pub mod health;
pub mod types;
pub mod user;

use actix_web::web;
use std::sync::Arc;

use crate::auth::{jwt::TokenProvider, middleware::JwtMiddleware};
use crate::types::StatusMapping;
use crate::user::{handlers::UserEndpoint, routes::configure_user_routes, service::UserService};

// Re-export commonly used types and functions
pub use crate::config::load_config;
pub use crate::health::health_check;
pub use crate::types::{ApiError, AppConfig};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const SERVICE_NAME: &str = "user-endpoint";

/// Mount `/health` and the versioned user routes
pub fn configure_app(
    api_prefix: &str,
    service: Arc<dyn UserService>,
    tokens: Arc<dyn TokenProvider>,
    mapping: StatusMapping,
) -> impl FnOnce(&mut web::ServiceConfig) {
    let api_prefix = api_prefix.to_string();
    move |cfg: &mut web::ServiceConfig| {
        let endpoint = web::Data::new(UserEndpoint::new(service, mapping));
        cfg.route("/health", web::get().to(health_check)).service(
            web::scope(&api_prefix)
                .service(configure_user_routes(endpoint, JwtMiddleware::new(tokens))),
        );
    }
}
