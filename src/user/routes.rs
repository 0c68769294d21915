//! User management routes
//!
//! Configuration of all user-related HTTP endpoints.

use crate::{
    auth::middleware::JwtMiddleware,
    types::ApiError,
    user::handlers::{self, UserEndpoint},
};
use actix_web::{web, Scope};

/// JSON extractor settings: any body that fails to deserialize becomes the
/// invalid-request envelope.
pub fn json_config() -> web::JsonConfig {
    web::JsonConfig::default().error_handler(|err, _req| {
        log::debug!("Rejected request body: {}", err);
        ApiError::invalid_request(err).into()
    })
}

/// Configure user management routes
///
/// `register` and `login` are public; everything else sits behind `auth`.
pub fn configure_user_routes(endpoint: web::Data<UserEndpoint>, auth: JwtMiddleware) -> Scope {
    web::scope("/users")
        .app_data(endpoint)
        .app_data(json_config())
        .route("/register", web::post().to(handlers::register))
        .route("/login", web::post().to(handlers::login))
        .service(
            web::scope("")
                .wrap(auth)
                .route("", web::get().to(handlers::list_users))
                .route("/", web::get().to(handlers::list_users))
                .route("/{id}", web::get().to(handlers::get_user))
                .route("/{id}", web::patch().to(handlers::update_user))
                .route("/{id}", web::delete().to(handlers::delete_user)),
        )
}
