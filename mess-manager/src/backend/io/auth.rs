//! Authentication bootstrap.
//!
//! Sign-in happens once at start-up: the configured token first, one
//! anonymous attempt if that fails, and unauthenticated operation when both
//! fail. The whole sequence is bounded by the loading timeout so a hung
//! provider never blocks the dashboard.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use log::{error, info, warn};
use std::time::Duration;

/// Identity a session ended up with
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthState {
    Token { uid: String },
    Anonymous { uid: String },
    Unauthenticated,
}

impl AuthState {
    pub fn uid(&self) -> Option<&str> {
        match self {
            AuthState::Token { uid } | AuthState::Anonymous { uid } => Some(uid),
            AuthState::Unauthenticated => None,
        }
    }
}

#[async_trait]
pub trait AuthProvider: Send + Sync {
    /// Sign in with a custom token; returns the user id
    async fn sign_in_with_token(&self, token: &str) -> Result<String>;

    async fn sign_in_anonymously(&self) -> Result<String>;
}

pub async fn bootstrap_auth(
    provider: &dyn AuthProvider,
    token: Option<&str>,
    timeout: Duration,
) -> AuthState {
    match tokio::time::timeout(timeout, sign_in(provider, token)).await {
        Ok(state) => state,
        Err(_) => {
            warn!("Sign-in did not finish within {:?}; continuing unauthenticated", timeout);
            AuthState::Unauthenticated
        }
    }
}

async fn sign_in(provider: &dyn AuthProvider, token: Option<&str>) -> AuthState {
    if let Some(token) = token.filter(|t| !t.is_empty()) {
        match provider.sign_in_with_token(token).await {
            Ok(uid) => {
                info!("Signed in with token as {}", uid);
                return AuthState::Token { uid };
            }
            Err(e) => warn!("Token sign-in failed, trying anonymous: {}", e),
        }
    }

    match provider.sign_in_anonymously().await {
        Ok(uid) => {
            info!("Signed in anonymously as {}", uid);
            AuthState::Anonymous { uid }
        }
        Err(e) => {
            error!("Anonymous sign-in failed; continuing unauthenticated: {}", e);
            AuthState::Unauthenticated
        }
    }
}

/// Provider for a local data directory: accepts one configured token
pub struct LocalAuthProvider {
    accepted_token: Option<String>,
}

impl LocalAuthProvider {
    pub fn new(accepted_token: Option<String>) -> Self {
        Self { accepted_token }
    }
}

#[async_trait]
impl AuthProvider for LocalAuthProvider {
    async fn sign_in_with_token(&self, token: &str) -> Result<String> {
        match &self.accepted_token {
            Some(accepted) if accepted == token => Ok("local-user".to_string()),
            _ => Err(anyhow!("token rejected")),
        }
    }

    async fn sign_in_anonymously(&self) -> Result<String> {
        Ok(format!("anonymous-{}", uuid::Uuid::new_v4().simple()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct ScriptedProvider {
        token_ok: bool,
        anonymous_ok: bool,
        delay: Duration,
        anonymous_calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn new(token_ok: bool, anonymous_ok: bool) -> Self {
            Self {
                token_ok,
                anonymous_ok,
                delay: Duration::ZERO,
                anonymous_calls: AtomicUsize::new(0),
            }
        }
    }

    #[async_trait]
    impl AuthProvider for ScriptedProvider {
        async fn sign_in_with_token(&self, _token: &str) -> Result<String> {
            tokio::time::sleep(self.delay).await;
            if self.token_ok {
                Ok("u-token".to_string())
            } else {
                Err(anyhow!("bad token"))
            }
        }

        async fn sign_in_anonymously(&self) -> Result<String> {
            self.anonymous_calls.fetch_add(1, Ordering::SeqCst);
            if self.anonymous_ok {
                Ok("u-anon".to_string())
            } else {
                Err(anyhow!("anonymous disabled"))
            }
        }
    }

    const TIMEOUT: Duration = Duration::from_secs(5);

    #[tokio::test]
    async fn test_token_sign_in() {
        let provider = ScriptedProvider::new(true, true);
        let state = bootstrap_auth(&provider, Some("t"), TIMEOUT).await;
        assert_eq!(state, AuthState::Token { uid: "u-token".to_string() });
        assert_eq!(provider.anonymous_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_falls_back_to_anonymous_once() {
        let provider = ScriptedProvider::new(false, true);
        let state = bootstrap_auth(&provider, Some("t"), TIMEOUT).await;
        assert_eq!(state.uid(), Some("u-anon"));
        assert_eq!(provider.anonymous_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_no_token_goes_straight_to_anonymous() {
        let provider = ScriptedProvider::new(true, true);
        let state = bootstrap_auth(&provider, None, TIMEOUT).await;
        assert_eq!(state, AuthState::Anonymous { uid: "u-anon".to_string() });
    }

    #[tokio::test]
    async fn test_both_fail_unauthenticated() {
        let provider = ScriptedProvider::new(false, false);
        let state = bootstrap_auth(&provider, Some("t"), TIMEOUT).await;
        assert_eq!(state, AuthState::Unauthenticated);
        assert_eq!(provider.anonymous_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_gives_up() {
        let mut provider = ScriptedProvider::new(true, true);
        provider.delay = Duration::from_secs(10);
        let state = bootstrap_auth(&provider, Some("t"), Duration::from_millis(20)).await;
        assert_eq!(state, AuthState::Unauthenticated);
    }

    #[tokio::test]
    async fn test_local_provider() {
        let provider = LocalAuthProvider::new(Some("secret".to_string()));
        assert_eq!(provider.sign_in_with_token("secret").await.unwrap(), "local-user");
        assert!(provider.sign_in_with_token("wrong").await.is_err());
        assert!(provider.sign_in_anonymously().await.unwrap().starts_with("anonymous-"));
    }
}
