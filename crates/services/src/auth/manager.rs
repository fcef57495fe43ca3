use std::sync::{Arc, Mutex, MutexGuard};

use aarambh_core::model::{Profile, UserId, UserSession};
use storage::repository::{ProfileRepository, RoleRepository, StorageError};

use super::{AuthBackend, AuthError};
use crate::Clock;

/// Owns the signed-in user.
///
/// Sessions come from exactly two places: [`SessionManager::sign_in`]
/// against the configured backend, or [`SessionManager::local`] for offline
/// use. They stay valid until `sign_out` or their expiry.
pub struct SessionManager {
    clock: Clock,
    roles: Arc<dyn RoleRepository>,
    profiles: Arc<dyn ProfileRepository>,
    backend: Option<Arc<dyn AuthBackend>>,
    current: Mutex<Option<UserSession>>,
}

impl SessionManager {
    #[must_use]
    pub fn new(
        clock: Clock,
        roles: Arc<dyn RoleRepository>,
        profiles: Arc<dyn ProfileRepository>,
        backend: Option<Arc<dyn AuthBackend>>,
    ) -> Self {
        Self {
            clock,
            roles,
            profiles,
            backend,
            current: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn has_backend(&self) -> bool {
        self.backend.is_some()
    }

    fn slot(&self) -> Result<MutexGuard<'_, Option<UserSession>>, AuthError> {
        self.current
            .lock()
            .map_err(|e| AuthError::Storage(StorageError::Connection(e.to_string())))
    }

    fn backend(&self) -> Result<&Arc<dyn AuthBackend>, AuthError> {
        self.backend.as_ref().ok_or(AuthError::NotConfigured)
    }

    /// Create the user's profile on first sign-in; later sign-ins only
    /// fill in a newly known email.
    async fn ensure_profile(&self, user_id: UserId, email: Option<&str>) -> Result<(), AuthError> {
        let existing = self.profiles.get_profile(user_id).await?;
        let profile = match existing {
            None => Profile::new(user_id, None, email.map(str::to_string), self.clock.now()),
            Some(found) if email.is_some() && found.email() != email => Profile::new(
                user_id,
                found.name().map(str::to_string),
                email.map(str::to_string),
                found.created_at(),
            ),
            Some(_) => return Ok(()),
        };
        self.profiles.upsert_profile(&profile).await?;
        Ok(())
    }

    /// The directory entry for `session`'s user, if one was recorded.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the profile cannot be read.
    pub async fn profile(&self, session: &UserSession) -> Result<Option<Profile>, AuthError> {
        Ok(self.profiles.get_profile(session.user_id()).await?)
    }

    /// # Errors
    ///
    /// Returns `AuthError::MissingCredentials` for blank input,
    /// `AuthError::NotConfigured` without a backend, or the backend's error.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<UserSession, AuthError> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        let grant = self
            .backend()?
            .sign_in(email, password, self.clock.now())
            .await?;
        let role = self.roles.role_for(grant.user_id).await?.unwrap_or_default();
        self.ensure_profile(grant.user_id, grant.email.as_deref()).await?;

        let session = UserSession::new(
            grant.user_id,
            grant.email,
            Some(grant.access_token),
            role,
            grant.expires_at,
        );
        *self.slot()? = Some(session.clone());
        tracing::info!(user = %session.user_id(), role = role.as_str(), "signed in");
        Ok(session)
    }

    /// Start an offline session for a known user id.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::Storage` if the role cannot be read.
    pub async fn local(&self, user_id: UserId) -> Result<UserSession, AuthError> {
        let role = self.roles.role_for(user_id).await?.unwrap_or_default();
        self.ensure_profile(user_id, None).await?;
        let session = UserSession::local(user_id, role);
        *self.slot()? = Some(session.clone());
        tracing::info!(user = %user_id, role = role.as_str(), "local session started");
        Ok(session)
    }

    /// The live session. An expired one is dropped and reported.
    ///
    /// # Errors
    ///
    /// Returns `AuthError::NoSession` when signed out and
    /// `AuthError::Expired` past the session's expiry.
    pub fn current(&self) -> Result<UserSession, AuthError> {
        let mut slot = self.slot()?;
        let session = slot.as_ref().ok_or(AuthError::NoSession)?;
        if session.is_expired(self.clock.now()) {
            *slot = None;
            return Err(AuthError::Expired);
        }
        Ok(session.clone())
    }

    /// Re-read the role (and, for remote sessions, re-check the token).
    ///
    /// # Errors
    ///
    /// Same as [`SessionManager::current`], plus backend errors. A token the
    /// backend no longer accepts ends the session.
    pub async fn refresh(&self) -> Result<UserSession, AuthError> {
        let session = self.current()?;
        if let (Some(token), Some(backend)) = (session.access_token(), self.backend.as_ref()) {
            match backend.current_user(token).await {
                Ok(user) if user.user_id == session.user_id() => {}
                Ok(_) | Err(AuthError::Expired) => {
                    *self.slot()? = None;
                    return Err(AuthError::Expired);
                }
                Err(other) => return Err(other),
            }
        }
        let role = self
            .roles
            .role_for(session.user_id())
            .await?
            .unwrap_or_default();
        let refreshed = session.with_role(role);
        *self.slot()? = Some(refreshed.clone());
        Ok(refreshed)
    }

    /// End the session locally, then tell the backend.
    ///
    /// # Errors
    ///
    /// Returns the backend's error; the local session is gone either way.
    pub async fn sign_out(&self) -> Result<(), AuthError> {
        let Some(session) = self.slot()?.take() else {
            return Ok(());
        };
        tracing::info!(user = %session.user_id(), "signed out");
        match (session.access_token(), self.backend.as_ref()) {
            (Some(token), Some(backend)) => backend.sign_out(token).await,
            _ => Ok(()),
        }
    }

    /// # Errors
    ///
    /// Returns `AuthError::NotConfigured` without a backend, or the backend's error.
    pub async fn resend_verification(&self, email: &str) -> Result<(), AuthError> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthError::MissingCredentials);
        }
        self.backend()?.resend_verification(email).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{AuthGrant, AuthUser};
    use aarambh_core::model::Role;
    use aarambh_core::time::fixed_now;
    use async_trait::async_trait;
    use chrono::{DateTime, Duration, Utc};
    use storage::repository::{InMemoryRepository, ProfileRepository};

    struct FakeBackend {
        user: UserId,
        ttl: Duration,
    }

    #[async_trait]
    impl AuthBackend for FakeBackend {
        async fn sign_in(
            &self,
            email: &str,
            password: &str,
            now: DateTime<Utc>,
        ) -> Result<AuthGrant, AuthError> {
            if password != "secret" {
                return Err(AuthError::InvalidCredentials);
            }
            Ok(AuthGrant {
                user_id: self.user,
                email: Some(email.to_string()),
                access_token: "token".into(),
                expires_at: Some(now + self.ttl),
            })
        }

        async fn sign_out(&self, _access_token: &str) -> Result<(), AuthError> {
            Ok(())
        }

        async fn current_user(&self, _access_token: &str) -> Result<AuthUser, AuthError> {
            Ok(AuthUser {
                user_id: self.user,
                email: None,
                email_confirmed: true,
            })
        }

        async fn resend_verification(&self, _email: &str) -> Result<(), AuthError> {
            Ok(())
        }
    }

    fn manager(clock: Clock, repo: &InMemoryRepository, user: UserId) -> SessionManager {
        SessionManager::new(
            clock,
            Arc::new(repo.clone()),
            Arc::new(repo.clone()),
            Some(Arc::new(FakeBackend {
                user,
                ttl: Duration::hours(1),
            })),
        )
    }

    #[tokio::test]
    async fn sign_in_resolves_role_and_sign_out_tears_down() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        repo.set_role(user, Role::Admin).await.unwrap();
        let sessions = manager(Clock::fixed(fixed_now()), &repo, user);

        assert!(matches!(
            sessions.sign_in("a@example.com", "wrong").await,
            Err(AuthError::InvalidCredentials)
        ));
        let session = sessions.sign_in("a@example.com", "secret").await.unwrap();
        assert!(session.is_admin());
        assert_eq!(sessions.current().unwrap(), session);

        sessions.sign_out().await.unwrap();
        assert!(matches!(sessions.current(), Err(AuthError::NoSession)));
    }

    #[tokio::test]
    async fn expired_session_cannot_be_acquired() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let sessions = manager(Clock::fixed(fixed_now()), &repo, user);
        sessions.sign_in("a@example.com", "secret").await.unwrap();

        let mut later = Clock::fixed(fixed_now());
        later.advance(Duration::hours(2));
        let expired = SessionManager {
            clock: later,
            roles: Arc::new(repo.clone()),
            profiles: Arc::new(repo.clone()),
            backend: None,
            current: Mutex::new(sessions.current().ok()),
        };
        assert!(matches!(expired.current(), Err(AuthError::Expired)));
        assert!(matches!(expired.current(), Err(AuthError::NoSession)));
    }

    #[tokio::test]
    async fn local_session_without_backend() {
        let repo = InMemoryRepository::new();
        let sessions = SessionManager::new(
            Clock::fixed(fixed_now()),
            Arc::new(repo.clone()),
            Arc::new(repo),
            None,
        );
        let user = UserId::random();
        let session = sessions.local(user).await.unwrap();
        assert_eq!(session.role(), Role::Student);
        assert!(matches!(
            sessions.sign_in("a@example.com", "secret").await,
            Err(AuthError::NotConfigured)
        ));
        assert_eq!(sessions.refresh().await.unwrap().user_id(), user);
        let profile = sessions.profile(&session).await.unwrap().unwrap();
        assert_eq!(profile.email(), None);
        assert_eq!(profile.created_at(), fixed_now());
    }

    #[tokio::test]
    async fn sign_in_records_profile_once() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        let sessions = manager(Clock::fixed(fixed_now()), &repo, user);
        sessions.local(user).await.unwrap();

        let mut later = Clock::fixed(fixed_now());
        later.advance(Duration::days(3));
        let sessions = manager(later, &repo, user);
        let session = sessions.sign_in("a@example.com", "secret").await.unwrap();

        let profile = sessions.profile(&session).await.unwrap().unwrap();
        assert_eq!(profile.email(), Some("a@example.com"));
        assert_eq!(profile.created_at(), fixed_now());
        assert_eq!(repo.list_profiles().await.unwrap().len(), 1);
    }
}
