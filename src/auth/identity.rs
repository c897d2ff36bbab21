//! Identity backend boundary.
//!
//! There is no user database. `MockIdentityProvider` fabricates users after
//! an artificial delay; a real service can implement `IdentityProvider`
//! without touching the session store or the handlers.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use super::dto::{Registration, User};
use super::services::AuthError;

#[async_trait]
pub trait IdentityProvider: Send + Sync {
    async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthError>;
    async fn sign_up(&self, registration: Registration) -> Result<User, AuthError>;
}

/// Accepts every credential. Sign-in always yields the same demo user with
/// the submitted email.
pub struct MockIdentityProvider {
    delay: Duration,
}

impl MockIdentityProvider {
    pub const USER_ID: &'static str = "1";

    pub fn new(delay: Duration) -> Self {
        Self { delay }
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    async fn sign_in(&self, email: &str, _password: &str) -> Result<User, AuthError> {
        tokio::time::sleep(self.delay).await;
        debug!(email, "mock sign-in");
        Ok(User {
            id: Self::USER_ID.into(),
            name: "John Doe".into(),
            email: email.to_string(),
            age: Some(28),
            health_conditions: Some(vec!["Diabetes".into()]),
        })
    }

    async fn sign_up(&self, registration: Registration) -> Result<User, AuthError> {
        tokio::time::sleep(self.delay).await;
        debug!(email = %registration.email, "mock sign-up");
        Ok(User {
            id: Self::USER_ID.into(),
            name: registration.name,
            email: registration.email,
            age: registration.age,
            health_conditions: registration.health_conditions.filter(|c| !c.is_empty()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn sign_in_fabricates_demo_user() {
        let provider = MockIdentityProvider::new(Duration::ZERO);
        let user = provider
            .sign_in("someone@example.com", "whatever")
            .await
            .expect("mock sign-in never fails");
        assert_eq!(user.id, "1");
        assert_eq!(user.name, "John Doe");
        assert_eq!(user.email, "someone@example.com");
        assert_eq!(user.age, Some(28));
        assert_eq!(user.health_conditions, Some(vec!["Diabetes".to_string()]));
    }

    #[tokio::test]
    async fn sign_up_drops_empty_condition_list() {
        let provider = MockIdentityProvider::new(Duration::ZERO);
        let user = provider
            .sign_up(Registration {
                name: "Ann".into(),
                email: "ann@x.test".into(),
                password: "pw".into(),
                age: None,
                health_conditions: Some(vec![]),
            })
            .await
            .unwrap();
        assert_eq!(user.age, None);
        assert_eq!(user.health_conditions, None);

        let json = serde_json::to_value(&user).unwrap();
        let obj = json.as_object().unwrap();
        assert!(!obj.contains_key("age"));
        assert!(!obj.contains_key("health_conditions"));
    }
}
