use chrono::{DateTime, Utc};
use serde_json::Value;
use thiserror::Error;

use crate::model::ids::UserId;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum UserError {
    #[error("unknown role: {0}")]
    UnknownRole(String),
}

//
// ─── ROLE ─────────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Role {
    #[default]
    Student,
    Instructor,
    Admin,
}

impl Role {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Student => "student",
            Self::Instructor => "instructor",
            Self::Admin => "admin",
        }
    }

    /// # Errors
    ///
    /// Returns `UserError::UnknownRole` for unrecognised values.
    pub fn parse(value: &str) -> Result<Self, UserError> {
        match value.trim() {
            "student" => Ok(Self::Student),
            "instructor" => Ok(Self::Instructor),
            "admin" => Ok(Self::Admin),
            other => Err(UserError::UnknownRole(other.to_string())),
        }
    }
}

//
// ─── PROFILE ──────────────────────────────────────────────────────────────────
//

/// Directory entry for a user, created the first time they sign in.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Profile {
    user_id: UserId,
    name: Option<String>,
    email: Option<String>,
    created_at: DateTime<Utc>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Profile {
    #[must_use]
    pub fn new(
        user_id: UserId,
        name: Option<String>,
        email: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            name: non_blank(name),
            email: non_blank(email),
            created_at,
        }
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Name, else email, else the short form of the id.
    #[must_use]
    pub fn display_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| self.email.clone())
            .unwrap_or_else(|| {
                let id = self.user_id.to_string();
                format!("user {}", &id[..8.min(id.len())])
            })
    }
}

//
// ─── SESSION ──────────────────────────────────────────────────────────────────
//

/// An authenticated user, valid from sign-in until sign-out or `expires_at`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserSession {
    user_id: UserId,
    email: Option<String>,
    access_token: Option<String>,
    role: Role,
    expires_at: Option<DateTime<Utc>>,
}

impl UserSession {
    #[must_use]
    pub fn new(
        user_id: UserId,
        email: Option<String>,
        access_token: Option<String>,
        role: Role,
        expires_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            user_id,
            email,
            access_token,
            role,
            expires_at,
        }
    }

    /// A session that never expires and carries no token (offline use).
    #[must_use]
    pub fn local(user_id: UserId, role: Role) -> Self {
        Self::new(user_id, None, None, role, None)
    }

    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    #[must_use]
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.expires_at
    }

    #[must_use]
    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|at| at <= now)
    }

    #[must_use]
    pub fn with_role(mut self, role: Role) -> Self {
        self.role = role;
        self
    }
}

//
// ─── STATISTICS ───────────────────────────────────────────────────────────────
//

/// Gamification counters kept in the user-statistics table.
///
/// `achievements` is stored as free-form JSON; rows written by older
/// clients may hold `null` or an object instead of a list.
#[derive(Debug, Clone, PartialEq)]
pub struct UserStats {
    pub user_id: UserId,
    pub current_streak: u32,
    pub total_points: u32,
    pub achievements: Option<Value>,
}

impl UserStats {
    #[must_use]
    pub fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            current_streak: 0,
            total_points: 0,
            achievements: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;
    use chrono::Duration;

    #[test]
    fn role_parsing() {
        assert_eq!(Role::parse("admin").unwrap(), Role::Admin);
        assert_eq!(Role::parse(Role::Instructor.as_str()).unwrap(), Role::Instructor);
        assert!(matches!(Role::parse("root"), Err(UserError::UnknownRole(_))));
    }

    #[test]
    fn profile_falls_back_to_email_then_id() {
        let id = UserId::random();
        let named = Profile::new(id, Some(" Asha ".into()), Some("asha@example.com".into()), fixed_now());
        assert_eq!(named.name(), Some("Asha"));
        assert_eq!(named.display_name(), "Asha");

        let unnamed = Profile::new(id, Some("  ".into()), Some("asha@example.com".into()), fixed_now());
        assert_eq!(unnamed.name(), None);
        assert_eq!(unnamed.display_name(), "asha@example.com");

        let bare = Profile::new(id, None, None, fixed_now());
        assert!(bare.display_name().starts_with("user "));
    }

    #[test]
    fn session_expiry() {
        let now = fixed_now();
        let session = UserSession::new(
            UserId::random(),
            Some("a@example.com".into()),
            Some("token".into()),
            Role::Student,
            Some(now + Duration::hours(1)),
        );
        assert!(!session.is_expired(now));
        assert!(session.is_expired(now + Duration::hours(1)));

        let local = UserSession::local(UserId::random(), Role::Admin);
        assert!(!local.is_expired(now + Duration::days(3650)));
        assert!(local.is_admin());
    }
}
