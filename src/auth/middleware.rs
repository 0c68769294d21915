use actix_web::{
    body::EitherBody,
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error, HttpMessage, ResponseError,
};
use futures_util::future::{ready, LocalBoxFuture, Ready};
use std::sync::Arc;

use crate::{auth::jwt::TokenProvider, types::ApiError};

/// Rejects requests without a valid bearer token and stores the decoded
/// `Claims` in the request extensions.
pub struct JwtMiddleware {
    provider: Arc<dyn TokenProvider>,
}

impl JwtMiddleware {
    pub fn new(provider: Arc<dyn TokenProvider>) -> Self {
        Self {
            provider,
        }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddleware
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Transform = JwtMiddlewareService<S>;
    type InitError = ();
    type Future = Ready<Result<Self::Transform, Self::InitError>>;

    fn new_transform(&self, service: S) -> Self::Future {
        ready(Ok(JwtMiddlewareService {
            service,
            provider: Arc::clone(&self.provider),
        }))
    }
}

pub struct JwtMiddlewareService<S> {
    service: S,
    provider: Arc<dyn TokenProvider>,
}

/// Extract the token from an `Authorization: Bearer <token>` header
fn bearer_token(req: &ServiceRequest) -> Result<&str, ApiError> {
    let header = req
        .headers()
        .get(AUTHORIZATION)
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".to_string()))?;

    header
        .to_str()
        .ok()
        .and_then(|value| value.strip_prefix("Bearer "))
        .filter(|token| !token.is_empty())
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization header format".to_string()))
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error>,
    S::Future: 'static,
    B: 'static,
{
    type Response = ServiceResponse<EitherBody<B>>;
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let claims = match bearer_token(&req).and_then(|token| self.provider.validate(token)) {
            Ok(claims) => claims,
            Err(err) => {
                log::debug!("Rejected {} {}: {}", req.method(), req.path(), err.to_response().log);
                let response = req.into_response(err.error_response()).map_into_right_body::<B>();
                return Box::pin(async move { Ok(response) });
            },
        };

        req.extensions_mut().insert(claims);

        let fut = self.service.call(req);
        Box::pin(async move { fut.await.map(ServiceResponse::map_into_left_body) })
    }
}
