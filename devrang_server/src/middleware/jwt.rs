//! Session middleware.
//!
//! Checks the `Authorization: Bearer <token>` header of every request in the wrapped scope, and makes the validated
//! [`JwtClaims`] available to later middleware and handlers via the request extensions. Requests without a valid
//! session token are answered with a 401.
use std::rc::Rc;

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    http::header::AUTHORIZATION,
    Error,
    HttpMessage,
};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::*;

use crate::{
    auth::{JwtClaims, TokenIssuer},
    errors::{AuthError, ServerError},
};

pub struct JwtMiddlewareFactory {
    issuer: Rc<TokenIssuer>,
}

impl JwtMiddlewareFactory {
    pub fn new(issuer: TokenIssuer) -> Self {
        Self { issuer: Rc::new(issuer) }
    }
}

impl<S, B> Transform<S, ServiceRequest> for JwtMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = JwtMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(JwtMiddlewareService { issuer: Rc::clone(&self.issuer), service: Rc::new(service) })
    }
}

pub struct JwtMiddlewareService<S> {
    issuer: Rc<TokenIssuer>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for JwtMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let claims = bearer_token(&req)
            .ok_or(AuthError::MissingSessionToken)
            .and_then(|token| self.issuer.validate_token(token));
        Box::pin(async move {
            let claims = claims.map_err(|e| {
                debug!("🔐️ {} {} refused. {e}", req.method(), req.path());
                ServerError::AuthenticationError(e)
            })?;
            trace!("🔐️ Session token for {} is valid", claims.email());
            req.extensions_mut().insert::<JwtClaims>(claims);
            service.call(req).await
        })
    }
}

fn bearer_token(req: &ServiceRequest) -> Option<&str> {
    req.headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.strip_prefix("Bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}
