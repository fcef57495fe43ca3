//! Sign-in against an external identity provider and the session lifecycle.

mod gotrue;
mod manager;

use aarambh_core::model::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Utc};

pub use crate::error::AuthError;
pub use gotrue::{GoTrueAuth, GoTrueConfig};
pub use manager::SessionManager;

/// What an identity provider hands back after a password sign-in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthGrant {
    pub user_id: UserId,
    pub email: Option<String>,
    pub access_token: String,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Identity of the holder of an access token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    pub user_id: UserId,
    pub email: Option<String>,
    pub email_confirmed: bool,
}

#[async_trait]
pub trait AuthBackend: Send + Sync {
    /// # Errors
    ///
    /// Returns `AuthError::InvalidCredentials` for a rejected login.
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthGrant, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the request.
    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the token is not accepted.
    async fn current_user(&self, access_token: &str) -> Result<AuthUser, AuthError>;

    /// # Errors
    ///
    /// Returns `AuthError` if the provider rejects the request.
    async fn resend_verification(&self, email: &str) -> Result<(), AuthError>;
}
