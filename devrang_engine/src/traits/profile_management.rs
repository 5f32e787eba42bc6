use thiserror::Error;

use crate::db_types::{NewUserProfile, UserProfile};

#[derive(Debug, Clone, Error)]
pub enum AuthApiError {
    #[error("Database error: {0}")]
    DatabaseError(String),
    #[error("No profile exists for {0}")]
    ProfileNotFound(String),
    #[error("A profile already exists for {0}")]
    ProfileAlreadyExists(String),
    #[error("{0} has not been approved yet")]
    NotApproved(String),
    #[error("{0}")]
    ValidationError(String),
}

impl From<sqlx::Error> for AuthApiError {
    fn from(e: sqlx::Error) -> Self {
        AuthApiError::DatabaseError(e.to_string())
    }
}

/// Storage for user profiles. Emails are stored and looked up in lower case.
#[allow(async_fn_in_trait)]
pub trait ProfileManagement {
    async fn fetch_profile(&self, email: &str) -> Result<Option<UserProfile>, AuthApiError>;

    async fn create_profile(&self, profile: NewUserProfile) -> Result<UserProfile, AuthApiError>;

    /// Refreshes the `updated_at` timestamp, which doubles as the "last signed in" time.
    async fn touch_profile(&self, email: &str) -> Result<UserProfile, AuthApiError>;

    async fn set_approved(&self, email: &str, approved: bool) -> Result<UserProfile, AuthApiError>;

    async fn delete_profile(&self, email: &str) -> Result<(), AuthApiError>;

    /// Users (not admins) that are waiting for approval, oldest first.
    async fn fetch_pending_profiles(&self) -> Result<Vec<UserProfile>, AuthApiError>;
}
