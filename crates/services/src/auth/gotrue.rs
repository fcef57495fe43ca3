use std::env;

use aarambh_core::model::UserId;
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use serde_json::json;

use super::{AuthBackend, AuthError, AuthGrant, AuthUser};

#[derive(Clone, Debug)]
pub struct GoTrueConfig {
    pub base_url: String,
    pub anon_key: String,
}

impl GoTrueConfig {
    /// Reads `AARAMBH_AUTH_URL` and `AARAMBH_AUTH_ANON_KEY`; both must be set.
    #[must_use]
    pub fn from_env() -> Option<Self> {
        let base_url = env::var("AARAMBH_AUTH_URL").ok()?;
        let anon_key = env::var("AARAMBH_AUTH_ANON_KEY").ok()?;
        if base_url.trim().is_empty() || anon_key.trim().is_empty() {
            return None;
        }
        Some(Self { base_url, anon_key })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/auth/v1/{path}", self.base_url.trim_end_matches('/'))
    }
}

/// Password auth against a GoTrue-compatible `/auth/v1` API.
#[derive(Clone)]
pub struct GoTrueAuth {
    client: Client,
    config: GoTrueConfig,
}

impl GoTrueAuth {
    #[must_use]
    pub fn new(config: GoTrueConfig) -> Self {
        Self {
            client: Client::new(),
            config,
        }
    }

    fn parse_user_id(raw: &str) -> Result<UserId, AuthError> {
        raw.parse()
            .map_err(|_| AuthError::InvalidResponse(format!("bad user id: {raw}")))
    }
}

#[async_trait]
impl AuthBackend for GoTrueAuth {
    async fn sign_in(
        &self,
        email: &str,
        password: &str,
        now: DateTime<Utc>,
    ) -> Result<AuthGrant, AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("token?grant_type=password"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "email": email, "password": password }))
            .send()
            .await?;

        match response.status() {
            s if s.is_success() => {}
            StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => {
                return Err(AuthError::InvalidCredentials);
            }
            other => return Err(AuthError::HttpStatus(other)),
        }

        let body: TokenResponse = response.json().await?;
        Ok(AuthGrant {
            user_id: Self::parse_user_id(&body.user.id)?,
            email: body.user.email,
            access_token: body.access_token,
            expires_at: body.expires_in.map(|secs| now + Duration::seconds(secs)),
        })
    }

    async fn sign_out(&self, access_token: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("logout"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status()));
        }
        Ok(())
    }

    async fn current_user(&self, access_token: &str) -> Result<AuthUser, AuthError> {
        let response = self
            .client
            .get(self.config.endpoint("user"))
            .header("apikey", &self.config.anon_key)
            .bearer_auth(access_token)
            .send()
            .await?;
        if response.status() == StatusCode::UNAUTHORIZED {
            return Err(AuthError::Expired);
        }
        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status()));
        }

        let user: UserBody = response.json().await?;
        Ok(AuthUser {
            user_id: Self::parse_user_id(&user.id)?,
            email_confirmed: user.email_confirmed_at.is_some(),
            email: user.email,
        })
    }

    async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let response = self
            .client
            .post(self.config.endpoint("resend"))
            .header("apikey", &self.config.anon_key)
            .json(&json!({ "type": "signup", "email": email }))
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(AuthError::HttpStatus(response.status()));
        }
        Ok(())
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    expires_in: Option<i64>,
    user: UserBody,
}

#[derive(Debug, Deserialize)]
struct UserBody {
    id: String,
    email: Option<String>,
    email_confirmed_at: Option<String>,
}
