//! Access control list middleware.
//! This middleware can be placed on any route or service that sits behind the access gate.
//!
//! It checks the role of the caller's profile (loaded by the access gate) against the required roles for the route.
//! Admins satisfy every role. Otherwise, a 403 Forbidden response is returned.

use std::{pin::Pin, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    Error,
    HttpMessage,
};
use devrang_engine::db_types::{Role, UserProfile};
use futures::{
    future::{ok, Ready},
    Future,
};
use log::*;

use crate::errors::ServerError;

pub struct AclMiddlewareFactory {
    required_roles: Vec<Role>,
}

impl AclMiddlewareFactory {
    pub fn new(required_roles: &[Role]) -> Self {
        AclMiddlewareFactory { required_roles: required_roles.to_vec() }
    }
}

impl<S, B> Transform<S, ServiceRequest> for AclMiddlewareFactory
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<B>;
    type Transform = AclMiddlewareService<S>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(AclMiddlewareService { required_roles: self.required_roles.clone(), service: Rc::new(service) })
    }
}

pub struct AclMiddlewareService<S> {
    required_roles: Vec<Role>,
    service: Rc<S>,
}

impl<S, B> Service<ServiceRequest> for AclMiddlewareService<S>
where
    S: Service<ServiceRequest, Response = ServiceResponse<B>, Error = Error> + 'static,
    S::Future: 'static,
    B: 'static,
{
    type Error = Error;
    type Future = Pin<Box<dyn Future<Output = Result<Self::Response, Self::Error>>>>;
    type Response = ServiceResponse<B>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let required_roles = self.required_roles.clone();
        Box::pin(async move {
            let role = req
                .extensions()
                .get::<UserProfile>()
                .map(|p| p.role)
                .ok_or_else(|| {
                    warn!("🚦️ {} {} reached the ACL without a profile", req.method(), req.path());
                    ServerError::Unspecified("No profile found in request extensions".into())
                })?;
            if role == Role::Admin || required_roles.iter().all(|r| *r == role) {
                service.call(req).await
            } else {
                debug!("🚦️ {} {} requires {required_roles:?}", req.method(), req.path());
                Err(ServerError::InsufficientPermissions("Admin access is required".into()).into())
            }
        })
    }
}
