//! User API handlers
//!
//! `UserEndpoint` translates HTTP requests into `UserService` calls. Every
//! handler validates its input first, then makes exactly one service call and
//! maps the outcome to a status code and a JSON envelope.

use actix_web::{http::StatusCode, web, HttpResponse};
use std::sync::Arc;
use uuid::Uuid;
use validator::Validate;

use crate::{
    types::{ApiError, ApiResponse, StatusMapping},
    user::{
        error::UserError,
        models::{UserCreate, UserLogin, UserUpdate},
        service::UserService,
    },
};

/// Stateless adapter between the HTTP transport and a `UserService`
#[derive(Clone)]
pub struct UserEndpoint {
    service: Arc<dyn UserService>,
    mapping: StatusMapping,
}

impl UserEndpoint {
    pub fn new(service: Arc<dyn UserService>, mapping: StatusMapping) -> Self {
        Self {
            service,
            mapping,
        }
    }

    fn fail(&self, err: UserError) -> ApiError {
        let err = ApiError::service(err, self.mapping);
        match &err {
            ApiError::Service {
                status,
                ..
            } if status.is_server_error() => log::error!("User service failure: {}", err),
            _ => log::warn!("User service rejected request: {}", err),
        }
        err
    }
}

/// Parse a path segment as a user id
fn parse_id(raw: &str) -> Result<Uuid, ApiError> {
    Uuid::parse_str(raw).map_err(|e| {
        log::debug!("Rejected user id {:?}: {}", raw, e);
        ApiError::invalid_request(e)
    })
}

/// Run the body's validation rules
fn validated<T: Validate>(payload: web::Json<T>) -> Result<T, ApiError> {
    let payload = payload.into_inner();
    payload.validate().map_err(|e| {
        log::debug!("Rejected request body: {}", e);
        ApiError::invalid_request(e)
    })?;
    Ok(payload)
}

/// `POST /users/register`
pub async fn register(
    endpoint: web::Data<UserEndpoint>,
    body: web::Json<UserCreate>,
) -> Result<HttpResponse, ApiError> {
    let data = validated(body)?;
    let id = endpoint.service.register(data).await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::Created().json(ApiResponse::new(id)))
}

/// `POST /users/login`
pub async fn login(
    endpoint: web::Data<UserEndpoint>,
    body: web::Json<UserLogin>,
) -> Result<HttpResponse, ApiError> {
    let data = validated(body)?;
    let token = endpoint.service.login(data).await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(token)))
}

/// `GET /users/`
pub async fn list_users(endpoint: web::Data<UserEndpoint>) -> Result<HttpResponse, ApiError> {
    let users = endpoint.service.get_all_users().await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(users)))
}

/// `GET /users/{id}`
pub async fn get_user(
    endpoint: web::Data<UserEndpoint>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    let user = endpoint.service.get_user_by_id(id).await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(user)))
}

/// `PATCH /users/{id}`
///
/// A bad id is reported before a bad body.
pub async fn update_user(
    endpoint: web::Data<UserEndpoint>,
    path: web::Path<String>,
    body: Result<web::Json<UserUpdate>, actix_web::Error>,
) -> Result<HttpResponse, actix_web::Error> {
    let id = parse_id(&path)?;
    let data = validated(body?)?;
    endpoint.service.update_user(id, data).await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::Ok().json(ApiResponse::new(id)))
}

/// `DELETE /users/{id}`
pub async fn delete_user(
    endpoint: web::Data<UserEndpoint>,
    path: web::Path<String>,
) -> Result<HttpResponse, ApiError> {
    let id = parse_id(&path)?;
    endpoint.service.delete_user(id).await.map_err(|e| endpoint.fail(e))?;
    Ok(HttpResponse::build(StatusCode::NO_CONTENT).finish())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::jwt::Token;
    use crate::types::ErrorResponse;
    use crate::user::models::{User, UserRole, UserStatus};
    use actix_web::{test, App};
    use async_trait::async_trait;
    use chrono::Utc;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted `UserService` that counts how often it was called
    #[derive(Default)]
    struct MockUserService {
        calls: AtomicUsize,
        user: Option<User>,
        error: Option<UserError>,
        registered_id: Option<Uuid>,
    }

    impl MockUserService {
        fn failing(error: UserError) -> Self {
            Self {
                error: Some(error),
                ..Self::default()
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn outcome(&self) -> Result<(), UserError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match &self.error {
                Some(error) => Err(error.clone()),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl UserService for MockUserService {
        async fn register(&self, _data: UserCreate) -> Result<Uuid, UserError> {
            self.outcome()?;
            Ok(self.registered_id.unwrap_or_else(Uuid::new_v4))
        }

        async fn login(&self, _data: UserLogin) -> Result<Token, UserError> {
            self.outcome()?;
            Ok(Token {
                token: "mock_access_token".to_string(),
                created: Utc::now(),
                expiry: 3600,
            })
        }

        async fn get_all_users(&self) -> Result<Vec<User>, UserError> {
            self.outcome()?;
            Ok(self.user.clone().into_iter().collect())
        }

        async fn update_user(&self, _id: Uuid, _data: UserUpdate) -> Result<(), UserError> {
            self.outcome()
        }

        async fn delete_user(&self, _id: Uuid) -> Result<(), UserError> {
            self.outcome()
        }

        async fn get_user_by_id(&self, id: Uuid) -> Result<User, UserError> {
            self.outcome()?;
            self.user.clone().filter(|user| user.id == id).ok_or(UserError::NotFound)
        }
    }

    fn sample_user() -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            email: "jane@example.com".to_string(),
            first_name: "Jane".to_string(),
            last_name: "Doe".to_string(),
            phone: None,
            role: UserRole::User,
            status: UserStatus::Active,
            password_hash: "$argon2id$hidden".to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    fn register_body() -> Value {
        json!({
            "email": "jane@example.com",
            "password": "password123",
            "first_name": "Jane",
            "last_name": "Doe"
        })
    }

    macro_rules! test_app {
        ($service:expr, $mapping:expr) => {
            test::init_service(
                App::new()
                    .app_data(crate::user::routes::json_config())
                    .app_data(web::Data::new(UserEndpoint::new($service.clone(), $mapping)))
                    .route("/users/register", web::post().to(register))
                    .route("/users/login", web::post().to(login))
                    .route("/users/", web::get().to(list_users))
                    .route("/users/{id}", web::get().to(get_user))
                    .route("/users/{id}", web::patch().to(update_user))
                    .route("/users/{id}", web::delete().to(delete_user)),
            )
            .await
        };
        ($service:expr) => {
            test_app!($service, StatusMapping::Typed)
        };
    }

    async fn assert_invalid_request(resp: actix_web::dev::ServiceResponse) {
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.status_code, 400);
        assert_eq!(body.message, "invalid request");
        assert_eq!(body.error_key, "ErrInvalidRequest");
        assert!(!body.log.is_empty());
    }

    #[actix_web::test]
    async fn test_register_returns_created_with_id() {
        let id = Uuid::new_v4();
        let service = Arc::new(MockUserService {
            registered_id: Some(id),
            ..MockUserService::default()
        });
        let app = test_app!(service);

        let req =
            test::TestRequest::post().uri("/users/register").set_json(register_body()).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::CREATED);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "data": id }));
        assert_eq!(service.calls(), 1);
    }

    #[actix_web::test]
    async fn test_malformed_bodies_never_reach_the_service() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);
        let id = Uuid::new_v4();

        let requests = vec![
            test::TestRequest::post().uri("/users/register"),
            test::TestRequest::post().uri("/users/login"),
            test::TestRequest::patch().uri(&format!("/users/{}", id)),
        ];

        for builder in requests {
            let req = builder
                .insert_header(("Content-Type", "application/json"))
                .set_payload("{\"email\": ")
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_invalid_request(resp).await;
        }

        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_missing_fields_and_failed_validation_are_invalid_requests() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let missing_password = json!({ "email": "jane@example.com" });
        let req =
            test::TestRequest::post().uri("/users/login").set_json(missing_password).to_request();
        assert_invalid_request(test::call_service(&app, req).await).await;

        let mut short_password = register_body();
        short_password["password"] = json!("short");
        let req =
            test::TestRequest::post().uri("/users/register").set_json(short_password).to_request();
        assert_invalid_request(test::call_service(&app, req).await).await;

        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_non_uuid_path_segments_never_reach_the_service() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req = test::TestRequest::get().uri("/users/not-a-uuid").to_request();
        assert_invalid_request(test::call_service(&app, req).await).await;

        let req = test::TestRequest::patch()
            .uri("/users/42")
            .set_json(json!({ "first_name": "Jane" }))
            .to_request();
        assert_invalid_request(test::call_service(&app, req).await).await;

        let req = test::TestRequest::delete().uri("/users/123").to_request();
        assert_invalid_request(test::call_service(&app, req).await).await;

        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_invalid_id_wins_over_invalid_body() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req = test::TestRequest::patch()
            .uri("/users/zzzzzzzz-zzzz-zzzz-zzzz-zzzzzzzzzzzz")
            .insert_header(("Content-Type", "application/json"))
            .set_payload("not json")
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_key, "ErrInvalidRequest");
        assert!(body.log.contains("invalid character"), "unexpected log: {}", body.log);
        assert!(!body.log.contains("Json"), "body was parsed first: {}", body.log);
        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_missing_content_type_is_invalid_request() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/users/register")
            .set_payload(register_body().to_string())
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_key, "ErrInvalidRequest");
        assert!(body.log.contains("Content type"), "unexpected log: {}", body.log);
        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_oversized_body_is_invalid_request() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        // Default JSON limit is 2 MiB
        let payload = json!({ "first_name": "a".repeat(3 * 1024 * 1024) }).to_string();
        let req = test::TestRequest::patch()
            .uri(&format!("/users/{}", Uuid::new_v4()))
            .insert_header(("Content-Type", "application/json"))
            .set_payload(payload)
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_key, "ErrInvalidRequest");
        assert!(body.log.contains("limit"), "unexpected log: {}", body.log);
        assert_eq!(service.calls(), 0);
    }

    #[actix_web::test]
    async fn test_login_error_under_legacy_mapping_is_bad_request() {
        let service = Arc::new(MockUserService::failing(UserError::InvalidCredentials));
        let app = test_app!(service, StatusMapping::Legacy);

        let req = test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({ "email": "jane@example.com", "password": "nope" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.message, "Invalid email or password");
        assert_eq!(body.error_key, "INVALID_CREDENTIALS");
        assert_eq!(service.calls(), 1);
    }

    #[actix_web::test]
    async fn test_login_success_wraps_token() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req = test::TestRequest::post()
            .uri("/users/login")
            .set_json(json!({ "email": "jane@example.com", "password": "password123" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body["data"]["token"], "mock_access_token");
        assert_eq!(body["data"]["expiry"], 3600);
    }

    #[actix_web::test]
    async fn test_typed_mapping_statuses() {
        let cases = vec![
            (UserError::NotFound, StatusCode::NOT_FOUND),
            (UserError::EmailTaken, StatusCode::CONFLICT),
            (UserError::Internal("db down".to_string()), StatusCode::INTERNAL_SERVER_ERROR),
        ];

        for (error, expected) in cases {
            let service = Arc::new(MockUserService::failing(error));
            let app = test_app!(service);

            let req = test::TestRequest::post()
                .uri("/users/register")
                .set_json(register_body())
                .to_request();
            let resp = test::call_service(&app, req).await;
            assert_eq!(resp.status(), expected);
        }
    }

    #[actix_web::test]
    async fn test_list_users_wraps_array() {
        let user = sample_user();
        let service = Arc::new(MockUserService {
            user: Some(user.clone()),
            ..MockUserService::default()
        });
        let app = test_app!(service);

        let req = test::TestRequest::get().uri("/users/").to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        let users = body["data"].as_array().unwrap();
        assert_eq!(users.len(), 1);
        assert_eq!(users[0]["id"], json!(user.id));
        assert!(users[0].get("password_hash").is_none());
    }

    #[actix_web::test]
    async fn test_get_user_returns_data_envelope_and_is_repeatable() {
        let user = sample_user();
        let service = Arc::new(MockUserService {
            user: Some(user.clone()),
            ..MockUserService::default()
        });
        let app = test_app!(service);
        let uri = format!("/users/{}", user.id);

        let req = test::TestRequest::get().uri(&uri).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);
        let first = test::read_body(resp).await;

        let body: Value = serde_json::from_slice(&first).unwrap();
        assert_eq!(body["data"]["email"], "jane@example.com");
        assert!(body["data"].get("password_hash").is_none());

        let req = test::TestRequest::get().uri(&uri).to_request();
        let second = test::read_body(test::call_service(&app, req).await).await;
        assert_eq!(first, second);
    }

    #[actix_web::test]
    async fn test_get_unknown_user_is_not_found() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req = test::TestRequest::get().uri(&format!("/users/{}", Uuid::new_v4())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NOT_FOUND);

        let body: ErrorResponse = test::read_body_json(resp).await;
        assert_eq!(body.error_key, "USER_NOT_FOUND");
    }

    #[actix_web::test]
    async fn test_update_returns_path_id() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);
        let id = Uuid::new_v4();

        let req = test::TestRequest::patch()
            .uri(&format!("/users/{}", id))
            .set_json(json!({ "phone": "+33 6 12 34 56 78" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::OK);

        let body: Value = test::read_body_json(resp).await;
        assert_eq!(body, json!({ "data": id }));
        assert_eq!(service.calls(), 1);
    }

    #[actix_web::test]
    async fn test_delete_returns_no_content() {
        let service = Arc::new(MockUserService::default());
        let app = test_app!(service);

        let req =
            test::TestRequest::delete().uri(&format!("/users/{}", Uuid::new_v4())).to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), StatusCode::NO_CONTENT);

        let body = test::read_body(resp).await;
        assert!(body.is_empty());
        assert_eq!(service.calls(), 1);
    }
}
