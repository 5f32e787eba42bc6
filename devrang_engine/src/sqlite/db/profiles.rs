use log::debug;
use sqlx::SqliteConnection;

use crate::{
    db_types::{NewUserProfile, UserProfile},
    traits::AuthApiError,
};

pub async fn fetch_profile(email: &str, conn: &mut SqliteConnection) -> Result<Option<UserProfile>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM user_profiles WHERE email = $1").bind(email).fetch_optional(conn).await
}

pub async fn create_profile(
    profile: NewUserProfile,
    conn: &mut SqliteConnection,
) -> Result<UserProfile, AuthApiError> {
    if fetch_profile(&profile.email, conn).await?.is_some() {
        return Err(AuthApiError::ProfileAlreadyExists(profile.email));
    }
    let profile: UserProfile = sqlx::query_as(
        r#"
        INSERT INTO user_profiles (email, name, image, role, approved)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(profile.email)
    .bind(profile.name)
    .bind(profile.image)
    .bind(profile.role)
    .bind(profile.approved)
    .fetch_one(conn)
    .await?;
    debug!("👤️ Profile created for {} with role {}. Approved: {}", profile.email, profile.role, profile.approved);
    Ok(profile)
}

pub async fn touch_profile(email: &str, conn: &mut SqliteConnection) -> Result<UserProfile, AuthApiError> {
    let profile: Option<UserProfile> =
        sqlx::query_as("UPDATE user_profiles SET updated_at = CURRENT_TIMESTAMP WHERE email = $1 RETURNING *")
            .bind(email)
            .fetch_optional(conn)
            .await?;
    profile.ok_or_else(|| AuthApiError::ProfileNotFound(email.to_string()))
}

pub async fn set_approved(
    email: &str,
    approved: bool,
    conn: &mut SqliteConnection,
) -> Result<UserProfile, AuthApiError> {
    let profile: Option<UserProfile> = sqlx::query_as(
        "UPDATE user_profiles SET approved = $1, updated_at = CURRENT_TIMESTAMP WHERE email = $2 RETURNING *",
    )
    .bind(approved)
    .bind(email)
    .fetch_optional(conn)
    .await?;
    profile.ok_or_else(|| AuthApiError::ProfileNotFound(email.to_string()))
}

pub async fn delete_profile(email: &str, conn: &mut SqliteConnection) -> Result<(), AuthApiError> {
    let result = sqlx::query("DELETE FROM user_profiles WHERE email = $1").bind(email).execute(conn).await?;
    if result.rows_affected() == 0 {
        return Err(AuthApiError::ProfileNotFound(email.to_string()));
    }
    debug!("👤️ Profile for {email} deleted");
    Ok(())
}

/// Users that are waiting for approval, oldest first. Admin profiles never appear here.
pub async fn fetch_pending_profiles(conn: &mut SqliteConnection) -> Result<Vec<UserProfile>, sqlx::Error> {
    sqlx::query_as(
        "SELECT * FROM user_profiles WHERE approved = 0 AND role = 'user' ORDER BY created_at ASC, rowid ASC",
    )
    .fetch_all(conn)
    .await
}
