use std::collections::HashMap;
use std::sync::Arc;

use lazy_static::lazy_static;
use regex::Regex;
use thiserror::Error;
use tokio::sync::RwLock;
use tracing::{info, warn};
use uuid::Uuid;

use super::dto::{Registration, User};
use super::identity::IdentityProvider;
use crate::storage::{keys, load_json, save_json, KvStore};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Invalid email")]
    InvalidEmail,

    #[error("Password is required")]
    MissingPassword,

    #[error("Name is required")]
    MissingName,

    #[error("identity backend failed: {0}")]
    Backend(String),
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub(crate) fn normalize_email(email: &str) -> Result<String, AuthError> {
    let email = email.trim().to_lowercase();
    if !is_valid_email(&email) {
        return Err(AuthError::InvalidEmail);
    }
    Ok(email)
}

/// Outcome of establishing a session. `warning` is set when the user could
/// not be persisted; the in-memory session is still valid.
#[derive(Debug)]
pub struct SignedIn {
    pub user: User,
    pub warning: Option<String>,
}

/// Session user per profile.
///
/// `None` in the map marks a profile that signed out during this process
/// lifetime, so a stale persisted record is not resurrected.
pub struct SessionStore {
    storage: Arc<dyn KvStore>,
    identity: Arc<dyn IdentityProvider>,
    users: RwLock<HashMap<Uuid, Option<User>>>,
}

impl SessionStore {
    pub fn new(storage: Arc<dyn KvStore>, identity: Arc<dyn IdentityProvider>) -> Self {
        Self {
            storage,
            identity,
            users: RwLock::new(HashMap::new()),
        }
    }

    pub async fn sign_in(
        &self,
        profile: Uuid,
        email: &str,
        password: &str,
    ) -> Result<SignedIn, AuthError> {
        let email = normalize_email(email)?;
        if password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        let user = self.identity.sign_in(&email, password).await?;
        Ok(self.establish(profile, user).await)
    }

    pub async fn sign_up(
        &self,
        profile: Uuid,
        mut registration: Registration,
    ) -> Result<SignedIn, AuthError> {
        registration.email = normalize_email(&registration.email)?;
        registration.name = registration.name.trim().to_string();
        if registration.name.is_empty() {
            return Err(AuthError::MissingName);
        }
        if registration.password.is_empty() {
            return Err(AuthError::MissingPassword);
        }
        let user = self.identity.sign_up(registration).await?;
        Ok(self.establish(profile, user).await)
    }

    /// Clears the in-memory and persisted user. Returns a warning when the
    /// persisted record could not be removed.
    pub async fn sign_out(&self, profile: Uuid) -> Option<String> {
        self.users.write().await.insert(profile, None);
        match self.storage.remove(profile, keys::SESSION_USER).await {
            Ok(()) => {
                info!(%profile, "signed out");
                None
            }
            Err(e) => {
                warn!(error = %e, %profile, "failed to remove persisted user");
                Some(e.warning())
            }
        }
    }

    /// Current user of a profile, restoring a persisted one on first access.
    /// Profiles with nothing persisted are not remembered.
    pub async fn current(&self, profile: Uuid) -> Option<User> {
        if let Some(known) = self.users.read().await.get(&profile) {
            return known.clone();
        }
        let restored: User = load_json(self.storage.as_ref(), profile, keys::SESSION_USER).await?;
        info!(%profile, "restored persisted session");
        self.users
            .write()
            .await
            .entry(profile)
            .or_insert(Some(restored))
            .clone()
    }

    #[cfg(test)]
    async fn tracked(&self) -> usize {
        self.users.read().await.len()
    }

    async fn establish(&self, profile: Uuid, user: User) -> SignedIn {
        self.users.write().await.insert(profile, Some(user.clone()));
        let warning = match save_json(self.storage.as_ref(), profile, keys::SESSION_USER, &user).await
        {
            Ok(()) => None,
            Err(e) => {
                warn!(error = %e, %profile, "session user not persisted");
                Some(e.warning())
            }
        };
        info!(%profile, email = %user.email, "session established");
        SignedIn { user, warning }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::identity::MockIdentityProvider;
    use crate::storage::MemoryKvStore;
    use std::time::Duration;

    fn store_on(kv: Arc<dyn KvStore>) -> SessionStore {
        SessionStore::new(kv, Arc::new(MockIdentityProvider::new(Duration::ZERO)))
    }

    fn jane() -> Registration {
        Registration {
            name: "Jane".into(),
            email: "jane@x.test".into(),
            password: "secret".into(),
            age: Some(40),
            health_conditions: Some(vec!["Asthma".into()]),
        }
    }

    #[test]
    fn email_validation() {
        assert!(is_valid_email("a@b.co"));
        assert!(!is_valid_email("a@b"));
        assert!(!is_valid_email("a b@c.de"));
        assert_eq!(normalize_email("  Jane@X.Test ").unwrap(), "jane@x.test");
    }

    #[tokio::test]
    async fn sign_up_yields_exactly_the_supplied_fields() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let sessions = store_on(kv.clone());
        let profile = Uuid::new_v4();

        let signed = sessions.sign_up(profile, jane()).await.unwrap();
        assert!(signed.warning.is_none());

        let json = serde_json::to_value(&signed.user).unwrap();
        assert_eq!(
            json,
            serde_json::json!({
                "id": "1",
                "name": "Jane",
                "email": "jane@x.test",
                "age": 40,
                "health_conditions": ["Asthma"],
            })
        );

        let persisted: Option<User> = load_json(kv.as_ref(), profile, keys::SESSION_USER).await;
        assert_eq!(persisted, Some(signed.user));
    }

    #[tokio::test]
    async fn sign_out_clears_persisted_user() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let sessions = store_on(kv.clone());
        let profile = Uuid::new_v4();
        sessions.sign_up(profile, jane()).await.unwrap();

        assert!(sessions.sign_out(profile).await.is_none());
        assert!(sessions.current(profile).await.is_none());
        assert_eq!(kv.get_raw(profile, keys::SESSION_USER).await.unwrap(), None);
    }

    #[tokio::test]
    async fn reload_restores_persisted_session() {
        let kv: Arc<dyn KvStore> = Arc::new(MemoryKvStore::new());
        let profile = Uuid::new_v4();
        store_on(kv.clone())
            .sign_in(profile, "john@x.test", "pw")
            .await
            .unwrap();

        // fresh store over the same key space, as after a restart
        let reloaded = store_on(kv);
        let user = reloaded.current(profile).await.expect("restored");
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "john@x.test");
    }

    #[tokio::test]
    async fn lookups_of_unknown_profiles_are_not_kept() {
        let sessions = store_on(Arc::new(MemoryKvStore::new()));
        for _ in 0..50 {
            assert!(sessions.current(Uuid::new_v4()).await.is_none());
        }
        assert_eq!(sessions.tracked().await, 0);

        let profile = Uuid::new_v4();
        sessions.sign_in(profile, "john@x.test", "pw").await.unwrap();
        sessions.sign_out(profile).await;
        assert!(sessions.current(profile).await.is_none());
        assert_eq!(sessions.tracked().await, 1);
    }

    #[tokio::test]
    async fn storage_failure_keeps_in_memory_session() {
        let sessions = store_on(Arc::new(MemoryKvStore::disabled()));
        let profile = Uuid::new_v4();
        let signed = sessions
            .sign_in(profile, "john@x.test", "pw")
            .await
            .unwrap();
        assert!(signed.warning.is_some());
        assert_eq!(sessions.current(profile).await, Some(signed.user));
    }

    #[tokio::test]
    async fn form_checks_run_before_the_backend() {
        let sessions = store_on(Arc::new(MemoryKvStore::new()));
        let profile = Uuid::new_v4();
        assert!(matches!(
            sessions.sign_in(profile, "nope", "pw").await,
            Err(AuthError::InvalidEmail)
        ));
        assert!(matches!(
            sessions.sign_in(profile, "a@b.co", "").await,
            Err(AuthError::MissingPassword)
        ));
        let mut reg = jane();
        reg.name = "   ".into();
        assert!(matches!(
            sessions.sign_up(profile, reg).await,
            Err(AuthError::MissingName)
        ));
        assert!(sessions.current(profile).await.is_none());
    }
}
