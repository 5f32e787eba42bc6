//! Session and identity tokens.
//!
//! Two kinds of HS256 JWT pass through the server:
//! * Identity tokens are minted by the identity provider and presented once, in the `x-identity-token` header of
//!   `POST /auth`. They are checked against `DRG_IDENTITY_SECRET`.
//! * Session tokens are issued by this server in response to a successful sign-in and are sent as
//!   `Authorization: Bearer <token>` on every other call. They are signed with `DRG_JWT_SECRET`.
//!
//! A session token only says who the caller is. Approval and the admin role are always read from the stored profile.
use std::future::{ready, Ready};

use actix_web::{dev::Payload, FromRequest, HttpMessage, HttpRequest};
use chrono::{Duration, Utc};
use devrang_engine::{
    db_types::{Role, UserProfile},
    normalise_email,
    Identity,
};
use jsonwebtoken::{decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::AuthConfig,
    errors::{AuthError, ServerError},
};

pub const IDENTITY_TOKEN_HEADER: &str = "x-identity-token";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtClaims {
    /// The profile's email address
    pub sub: String,
    /// The role at the time the token was issued
    pub role: Role,
    pub iat: i64,
    pub exp: i64,
}

impl JwtClaims {
    pub fn email(&self) -> &str {
        self.sub.as_str()
    }
}

/// Claims carried by an identity assertion.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IdentityClaims {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub picture: Option<String>,
    pub iat: i64,
    pub exp: i64,
}

impl IdentityClaims {
    pub fn new(email: &str, name: &str, ttl: Duration) -> Self {
        let now = Utc::now();
        Self {
            email: email.to_string(),
            name: name.to_string(),
            picture: None,
            iat: now.timestamp(),
            exp: (now + ttl).timestamp(),
        }
    }
}

impl From<IdentityClaims> for Identity {
    fn from(claims: IdentityClaims) -> Self {
        Identity { email: normalise_email(&claims.email), name: claims.name, image: claims.picture }
    }
}

/// Signs an identity assertion. The server itself never does this; it is here for tooling and tests.
pub fn sign_identity_token(secret: &str, claims: &IdentityClaims) -> Result<String, AuthError> {
    encode(&Header::new(Algorithm::HS256), claims, &EncodingKey::from_secret(secret.as_bytes()))
        .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
}

/// Checks the signature and expiry of an identity assertion.
pub fn check_identity_token(secret: &str, token: &str) -> Result<Identity, AuthError> {
    let validation = Validation::new(Algorithm::HS256);
    let data = decode::<IdentityClaims>(token, &DecodingKey::from_secret(secret.as_bytes()), &validation).map_err(
        |e| {
            debug!("🔐️ Identity token rejected. {e}");
            AuthError::InvalidIdentityToken(describe(e.kind()))
        },
    )?;
    trace!("🔐️ Identity token validated for {}", data.claims.email);
    Ok(data.claims.into())
}

fn describe(kind: &ErrorKind) -> String {
    match kind {
        ErrorKind::ExpiredSignature => "Token has expired.".into(),
        ErrorKind::InvalidSignature => "Signature has failed verification.".into(),
        _ => "Token is not in the correct format.".into(),
    }
}

/// Issues and validates session tokens.
#[derive(Clone)]
pub struct TokenIssuer {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    identity_secret: String,
    ttl: Duration,
}

impl TokenIssuer {
    pub fn new(config: &AuthConfig) -> Self {
        let secret = config.jwt_secret.reveal().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            identity_secret: config.identity_secret.reveal().clone(),
            ttl: config.session_ttl,
        }
    }

    pub fn check_identity_token(&self, token: &str) -> Result<Identity, AuthError> {
        check_identity_token(&self.identity_secret, token)
    }

    /// Issue a new session token for the given profile.
    /// This method DOES NOT check whether the profile is approved. The access gate does that on every request.
    pub fn issue_token(&self, profile: &UserProfile) -> Result<String, AuthError> {
        let now = Utc::now();
        let claims =
            JwtClaims { sub: profile.email.clone(), role: profile.role, iat: now.timestamp(), exp: (now + self.ttl).timestamp() };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| AuthError::CouldNotIssueToken(e.to_string()))
    }

    pub fn validate_token(&self, token: &str) -> Result<JwtClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<JwtClaims>(token, &self.decoding_key, &validation).map_err(|e| {
            debug!("🔐️ Session token rejected. {e}");
            AuthError::InvalidSessionToken(describe(e.kind()))
        })?;
        Ok(data.claims)
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

/// Handlers behind the session middleware take the validated claims as an argument.
impl FromRequest for JwtClaims {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let claims = req.extensions().get::<JwtClaims>().cloned();
        ready(claims.ok_or(ServerError::AuthenticationError(AuthError::MissingSessionToken)))
    }
}

/// The profile of an approved caller, as loaded by the access gate.
#[derive(Debug, Clone)]
pub struct ActiveUser(pub UserProfile);

impl ActiveUser {
    pub fn profile(&self) -> &UserProfile {
        &self.0
    }
}

impl FromRequest for ActiveUser {
    type Error = ServerError;
    type Future = Ready<Result<Self, Self::Error>>;

    fn from_request(req: &HttpRequest, _: &mut Payload) -> Self::Future {
        let user = req.extensions().get::<UserProfile>().cloned().map(ActiveUser);
        ready(user.ok_or_else(|| {
            warn!("💻️ No profile found in request extensions. Is the access gate missing from this route?");
            ServerError::AuthenticationError(AuthError::MissingSessionToken)
        }))
    }
}
