use anyhow::{bail, Result};
use chrono::{Duration, TimeZone, Utc};
use devrang_server::auth::{sign_identity_token, IdentityClaims};

use crate::IdentityTokenParams;

pub fn identity_token(params: &IdentityTokenParams) -> Result<(IdentityClaims, String)> {
    if params.hours <= 0 {
        bail!("--hours must be a positive number of hours");
    }
    if params.secret.trim().is_empty() {
        bail!("The identity secret is empty");
    }
    let claims = IdentityClaims::new(&params.email, &params.name, Duration::hours(params.hours));
    let token = sign_identity_token(&params.secret, &claims)?;
    Ok((claims, token))
}

pub fn print_identity_token(params: IdentityTokenParams) -> Result<()> {
    let (claims, token) = identity_token(&params)?;
    let expiry = Utc.timestamp_opt(claims.exp, 0).single().map(|t| t.to_rfc3339()).unwrap_or_default();
    println!("---------------------------- Identity Token ----------------------------");
    println!("email: {}", claims.email);
    println!("name: {}", claims.name);
    println!("expires: {expiry}");
    println!("header: x-identity-token");
    println!("token:\n{token}");
    println!("------------------------------------------------------------------------");
    Ok(())
}
