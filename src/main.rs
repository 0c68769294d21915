use actix_cors::Cors;
use actix_web::{middleware::Logger, App, HttpServer};
use std::sync::Arc;

use user_endpoint::{
    auth::jwt::{JwtService, TokenProvider},
    configure_app, load_config,
    types::{AppConfig, StartupError},
    user::service::{InMemoryUserService, UserService},
    SERVICE_NAME, VERSION,
};

fn cors(origins: &[String]) -> Cors {
    if origins.iter().any(|origin| origin == "*") {
        return Cors::permissive();
    }
    origins
        .iter()
        .fold(Cors::default(), |cors, origin| cors.allowed_origin(origin))
        .allow_any_method()
        .allow_any_header()
}

async fn run(config: AppConfig) -> Result<(), StartupError> {
    let tokens: Arc<dyn TokenProvider> =
        Arc::new(JwtService::new(&config.jwt_secret, config.token_ttl_seconds));
    let service: Arc<dyn UserService> = Arc::new(InMemoryUserService::new(tokens.clone()));

    log::info!("Starting {} v{} on {}", SERVICE_NAME, VERSION, config.bind_address);
    log::info!("Service errors use {:?} status mapping", config.status_mapping);

    let bind_address = config.bind_address.clone();
    HttpServer::new(move || {
        App::new()
            .wrap(Logger::default())
            .wrap(cors(&config.cors_origins))
            .configure(configure_app(
                &config.api_prefix,
                service.clone(),
                tokens.clone(),
                config.status_mapping,
            ))
    })
    .bind(&bind_address)
    .map_err(|e| StartupError::ServerBind(format!("{}: {}", bind_address, e)))?
    .run()
    .await
    .map_err(|e| StartupError::ServerBind(e.to_string()))
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    dotenvy::dotenv().ok();
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let config = load_config().map_err(|e| {
        log::error!("{}", e);
        std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string())
    })?;

    run(config).await.map_err(|e| {
        log::error!("{}", e);
        std::io::Error::other(e.to_string())
    })
}
