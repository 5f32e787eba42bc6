use std::env;

use chrono::Duration;
use drg_common::{
    helpers::{parse_boolean_flag, parse_comma_list},
    Secret,
};
use log::*;
use rand::{distributions::Alphanumeric, thread_rng, Rng};
use razorpay_tools::RazorpayConfig;

use crate::errors::ServerError;

const DEFAULT_DRG_HOST: &str = "127.0.0.1";
const DEFAULT_DRG_PORT: u16 = 8460;
const DEFAULT_DATABASE_URL: &str = "sqlite://data/devrang.db";
const DEFAULT_SESSION_TTL: Duration = Duration::hours(24);

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub database_url: String,
    pub auth: AuthConfig,
    pub razorpay: RazorpayConfig,
    /// If true, the X-Forwarded-For header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_x_forwarded_for: bool,
    /// If true, the Forwarded header will be used to determine the client's IP address, rather than the
    /// connection's remote address.
    pub use_forwarded: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_DRG_HOST.to_string(),
            port: DEFAULT_DRG_PORT,
            database_url: DEFAULT_DATABASE_URL.to_string(),
            auth: AuthConfig::default(),
            razorpay: RazorpayConfig::default(),
            use_x_forwarded_for: false,
            use_forwarded: false,
        }
    }
}

impl ServerConfig {
    pub fn new(host: &str, port: u16) -> Self {
        Self { host: host.to_string(), port, ..Default::default() }
    }

    pub fn from_env_or_default() -> Self {
        let host = env::var("DRG_HOST").ok().unwrap_or_else(|| DEFAULT_DRG_HOST.into());
        let port = env::var("DRG_PORT")
            .map(|s| {
                s.parse::<u16>().unwrap_or_else(|e| {
                    error!(
                        "🪛️ {s} is not a valid port for DRG_PORT. {e} Using the default, {DEFAULT_DRG_PORT}, instead."
                    );
                    DEFAULT_DRG_PORT
                })
            })
            .ok()
            .unwrap_or(DEFAULT_DRG_PORT);
        let database_url = env::var("DRG_DATABASE_URL").ok().unwrap_or_else(|| {
            warn!("🪛️ DRG_DATABASE_URL is not set. Using {DEFAULT_DATABASE_URL}.");
            DEFAULT_DATABASE_URL.to_string()
        });
        let auth = AuthConfig::from_env_or_default();
        let razorpay = RazorpayConfig::new_from_env_or_default();
        let use_x_forwarded_for = parse_boolean_flag(env::var("DRG_USE_X_FORWARDED_FOR").ok(), false);
        let use_forwarded = parse_boolean_flag(env::var("DRG_USE_FORWARDED").ok(), false);
        Self { host, port, database_url, auth, razorpay, use_x_forwarded_for, use_forwarded }
    }
}

//-------------------------------------------------  AuthConfig  -------------------------------------------------------
#[derive(Clone, Debug)]
pub struct AuthConfig {
    /// HS256 key for the session tokens that this server issues.
    pub jwt_secret: Secret<String>,
    /// HS256 key shared with the identity provider. Identity assertions presented at sign-in are checked against it.
    pub identity_secret: Secret<String>,
    pub session_ttl: Duration,
    /// Profiles created for these addresses get the admin role. Existing profiles are never changed.
    pub admin_emails: Vec<String>,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: Secret::new(random_secret()),
            identity_secret: Secret::new(random_secret()),
            session_ttl: DEFAULT_SESSION_TTL,
            admin_emails: Vec::new(),
        }
    }
}

impl AuthConfig {
    pub fn from_env_or_default() -> Self {
        let jwt_secret = secret_from_env("DRG_JWT_SECRET").unwrap_or_else(|e| {
            warn!(
                "🚨️🚨️🚨️ {e}. I'm using a random session key for this session. Every session token will be invalid \
                 after a restart. DO NOT operate on production like this. 🚨️🚨️🚨️"
            );
            Secret::new(random_secret())
        });
        let identity_secret = secret_from_env("DRG_IDENTITY_SECRET").unwrap_or_else(|e| {
            warn!(
                "🚨️🚨️🚨️ {e}. I'm using a random identity key for this session, so nobody will be able to sign in. \
                 🚨️🚨️🚨️"
            );
            Secret::new(random_secret())
        });
        let session_ttl = env::var("DRG_SESSION_TTL_HOURS")
            .map_err(|_| {
                info!(
                    "🪛️ DRG_SESSION_TTL_HOURS is not set. Using the default value of {} hrs.",
                    DEFAULT_SESSION_TTL.num_hours()
                )
            })
            .and_then(|s| {
                s.parse::<i64>()
                    .ok()
                    .filter(|h| *h > 0)
                    .map(Duration::hours)
                    .ok_or_else(|| warn!("🪛️ Invalid configuration value for DRG_SESSION_TTL_HOURS: {s}"))
            })
            .unwrap_or(DEFAULT_SESSION_TTL);
        let admin_emails = env::var("DRG_ADMIN_EMAILS").map(|s| parse_comma_list(&s)).unwrap_or_default();
        if admin_emails.is_empty() {
            info!("🪛️ DRG_ADMIN_EMAILS is empty. New profiles will all be created as unapproved users.");
        } else {
            info!("🪛️ {} bootstrap admin address(es) configured", admin_emails.len());
        }
        Self { jwt_secret, identity_secret, session_ttl, admin_emails }
    }
}

fn secret_from_env(name: &str) -> Result<Secret<String>, ServerError> {
    let value = env::var(name).map_err(|e| ServerError::ConfigurationError(format!("{e} [{name}]")))?;
    if value.trim().is_empty() {
        return Err(ServerError::ConfigurationError(format!("{name} is empty")));
    }
    Ok(Secret::new(value))
}

fn random_secret() -> String {
    thread_rng().sample_iter(&Alphanumeric).take(48).map(char::from).collect()
}

//-------------------------------------------------  ServerOptions  ----------------------------------------------------
/// A subset of the server configuration that route handlers are allowed to see. It carries no secrets.
#[derive(Clone, Copy, Debug, Default)]
pub struct ServerOptions {
    pub use_x_forwarded_for: bool,
    pub use_forwarded: bool,
}

impl ServerOptions {
    pub fn from_config(config: &ServerConfig) -> Self {
        Self { use_x_forwarded_for: config.use_x_forwarded_for, use_forwarded: config.use_forwarded }
    }
}
