//! The access gate.
//!
//! Sits behind the session middleware on every marketplace route. The caller's profile is loaded fresh on every
//! request, so approvals, rejections and role changes take effect immediately, whatever the session token says.
//!
//! * No profile: 403.
//! * Profile not approved: `303 See Other` to `/auth/error?error=NOT_APPROVED`. The handler never runs.
//! * Approved user or admin: the profile is stored in the request extensions (see [`crate::auth::ActiveUser`]).
use std::{marker::PhantomData, rc::Rc};

use actix_web::{
    dev::{forward_ready, Service, ServiceRequest, ServiceResponse, Transform},
    web,
    Error,
    HttpMessage,
};
use devrang_engine::{db_types::AccessState, traits::ProfileManagement, AuthApi};
use futures::future::{ok, LocalBoxFuture, Ready};
use log::*;

use crate::{
    auth::JwtClaims,
    errors::{AuthError, ServerError},
};

pub struct ApprovalGateFactory<B> {
    _backend: PhantomData<fn() -> B>,
}

impl<B> ApprovalGateFactory<B> {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        Self { _backend: PhantomData }
    }
}

impl<S, Body, B> Transform<S, ServiceRequest> for ApprovalGateFactory<B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    Body: 'static,
    B: ProfileManagement + 'static,
{
    type Error = Error;
    type Future = Ready<Result<Self::Transform, Self::InitError>>;
    type InitError = ();
    type Response = ServiceResponse<Body>;
    type Transform = ApprovalGateService<S, B>;

    fn new_transform(&self, service: S) -> Self::Future {
        ok(ApprovalGateService { service: Rc::new(service), _backend: PhantomData })
    }
}

pub struct ApprovalGateService<S, B> {
    service: Rc<S>,
    _backend: PhantomData<fn() -> B>,
}

impl<S, Body, B> Service<ServiceRequest> for ApprovalGateService<S, B>
where
    S: Service<ServiceRequest, Response = ServiceResponse<Body>, Error = Error> + 'static,
    S::Future: 'static,
    Body: 'static,
    B: ProfileManagement + 'static,
{
    type Error = Error;
    type Future = LocalBoxFuture<'static, Result<Self::Response, Self::Error>>;
    type Response = ServiceResponse<Body>;

    forward_ready!(service);

    fn call(&self, req: ServiceRequest) -> Self::Future {
        let service = Rc::clone(&self.service);
        let api = req.app_data::<web::Data<AuthApi<B>>>().cloned();
        Box::pin(async move {
            let api = api.ok_or_else(|| {
                error!("🚦️ AuthApi is not registered with the app. Denying access.");
                ServerError::Unspecified("Access gate is misconfigured".into())
            })?;
            let email = req
                .extensions()
                .get::<JwtClaims>()
                .map(|c| c.email().to_string())
                .ok_or(ServerError::AuthenticationError(AuthError::MissingSessionToken))?;
            let profile = api.profile(&email).await.map_err(ServerError::from)?;
            let Some(profile) = profile else {
                info!("🚦️ {email} has a session but no profile. Denying access.");
                return Err(ServerError::InsufficientPermissions(format!("No profile exists for {email}")).into());
            };
            match profile.access_state() {
                AccessState::Approved | AccessState::Admin => {
                    trace!("🚦️ {email} may pass ({:?})", profile.access_state());
                    req.extensions_mut().insert(profile);
                    service.call(req).await
                },
                state => {
                    debug!("🚦️ {email} is {state:?}. Redirecting.");
                    Err(ServerError::NotApproved(email).into())
                },
            }
        })
    }
}
