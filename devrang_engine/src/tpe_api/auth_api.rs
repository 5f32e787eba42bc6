//! The access control gate.
//!
//! Identity comes from an external provider; this API decides what that identity may do. The profile's role is the
//! only authority. The bootstrap admin list is consulted once, when a profile is first created.
use std::fmt::Debug;

use log::*;
use serde::{Deserialize, Serialize};

use crate::{
    db_types::{AccessState, NewUserProfile, Role, UserProfile},
    traits::{AuthApiError, ProfileManagement},
};

/// An identity asserted by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    pub email: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignIn {
    pub profile: UserProfile,
    /// The profile was created by this sign-in
    pub first_sign_in: bool,
}

pub struct AuthApi<B> {
    db: B,
    bootstrap_admins: Vec<String>,
}

impl<B: Debug> Debug for AuthApi<B> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "AuthApi ({:?})", self.db)
    }
}

impl<B> AuthApi<B> {
    pub fn new(db: B) -> Self {
        Self { db, bootstrap_admins: Vec::new() }
    }

    /// Emails that are given the admin role when their profile is first created.
    pub fn with_bootstrap_admins(mut self, emails: &[String]) -> Self {
        self.bootstrap_admins = emails.iter().map(|e| normalise_email(e)).collect();
        self
    }
}

impl<B> AuthApi<B>
where B: ProfileManagement
{
    /// Completes a sign-in.
    ///
    /// A first sign-in always succeeds and creates the profile. Existing profiles must be approved (or admin);
    /// otherwise [`AuthApiError::NotApproved`] is returned.
    pub async fn sign_in(&self, identity: Identity) -> Result<SignIn, AuthApiError> {
        let email = normalise_email(&identity.email);
        if email.is_empty() {
            return Err(AuthApiError::ValidationError("Identity has no email address".into()));
        }
        match self.db.fetch_profile(&email).await? {
            None => {
                let is_admin = self.bootstrap_admins.contains(&email);
                let profile = NewUserProfile {
                    email: email.clone(),
                    name: identity.name,
                    image: identity.image,
                    role: if is_admin { Role::Admin } else { Role::User },
                    approved: is_admin,
                };
                let profile = self.db.create_profile(profile).await?;
                info!("🚦️ First sign-in for {email}. Profile created with role {}", profile.role);
                Ok(SignIn { profile, first_sign_in: true })
            },
            Some(profile) if !profile.access_state().can_use_marketplace() => {
                info!("🚦️ {email} signed in, but is not approved yet");
                Err(AuthApiError::NotApproved(email))
            },
            Some(_) => {
                let profile = self.db.touch_profile(&email).await?;
                debug!("🚦️ {email} signed in");
                Ok(SignIn { profile, first_sign_in: false })
            },
        }
    }

    /// Where `email` stands with respect to the gate. `None` means no identity was presented.
    pub async fn access_state(&self, email: Option<&str>) -> Result<AccessState, AuthApiError> {
        let Some(email) = email else {
            return Ok(AccessState::Anonymous);
        };
        let state = match self.db.fetch_profile(&normalise_email(email)).await? {
            Some(profile) => profile.access_state(),
            None => AccessState::Authenticating,
        };
        Ok(state)
    }

    pub async fn profile(&self, email: &str) -> Result<Option<UserProfile>, AuthApiError> {
        self.db.fetch_profile(&normalise_email(email)).await
    }

    /// Approves a user. Approving an approved user is a no-op.
    pub async fn approve(&self, email: &str) -> Result<UserProfile, AuthApiError> {
        let profile = self.db.set_approved(&normalise_email(email), true).await?;
        info!("🚦️ {} has been approved", profile.email);
        Ok(profile)
    }

    /// Rejects a user by removing their profile. They may sign in again, and will be back in the approval queue.
    pub async fn reject(&self, email: &str) -> Result<(), AuthApiError> {
        let email = normalise_email(email);
        self.db.delete_profile(&email).await?;
        info!("🚦️ {email} has been rejected and their profile removed");
        Ok(())
    }

    pub async fn pending_users(&self) -> Result<Vec<UserProfile>, AuthApiError> {
        self.db.fetch_pending_profiles().await
    }
}

pub fn normalise_email(email: &str) -> String {
    email.trim().to_lowercase()
}
