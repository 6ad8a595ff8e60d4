//! Authentication context shared by every data-fetching collaborator.
//!
//! [`AuthContext`] owns the bearer token. Requests read it through
//! [`AuthContext::token`]; an unauthorized response anywhere calls
//! [`AuthContext::invalidate`], which evicts the token from memory and from
//! the [`TokenStore`] and announces [`AuthState::SessionExpired`] to every
//! subscriber. Screens watch that state and navigate to the login entry
//! point; no caller can intercept it.

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::Deserialize;
use tokio::sync::watch;

use crate::token_store::{TokenStore, TokenStoreError};

/// Session state observed by screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthState {
    /// No credential is held.
    SignedOut,
    /// A credential is held and has not been rejected.
    SignedIn,
    /// The backend rejected the credential; the user must log in again.
    SessionExpired,
}

/// Cheaply cloneable handle to the process-wide session.
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<Inner>,
}

struct Inner {
    store: Box<dyn TokenStore>,
    token: Mutex<Option<String>>,
    state_tx: watch::Sender<AuthState>,
}

impl AuthContext {
    /// Build a context from whatever token the store holds.
    ///
    /// A stored JWT whose `exp` claim has already passed is discarded here,
    /// without asking the backend.
    pub fn load(store: impl TokenStore + 'static) -> Result<Self, TokenStoreError> {
        let mut token = store.load()?;

        if let Some(stored) = &token {
            if is_expired(stored, chrono::Utc::now().timestamp()) {
                tracing::info!("Discarding expired stored access token");
                store.clear()?;
                token = None;
            }
        }

        let state = if token.is_some() {
            AuthState::SignedIn
        } else {
            AuthState::SignedOut
        };
        let (state_tx, _) = watch::channel(state);

        Ok(Self {
            inner: Arc::new(Inner {
                store: Box::new(store),
                token: Mutex::new(token),
                state_tx,
            }),
        })
    }

    /// Current bearer token, if any.
    pub fn token(&self) -> Option<String> {
        self.lock_token().clone()
    }

    pub fn state(&self) -> AuthState {
        *self.inner.state_tx.borrow()
    }

    pub fn is_signed_in(&self) -> bool {
        self.state() == AuthState::SignedIn
    }

    /// Receive every subsequent state transition.
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state_tx.subscribe()
    }

    /// Persist a freshly issued token.
    pub fn sign_in(&self, token: String) -> Result<(), TokenStoreError> {
        self.inner.store.save(&token)?;
        *self.lock_token() = Some(token);
        self.inner.state_tx.send_replace(AuthState::SignedIn);
        tracing::info!("Signed in");
        Ok(())
    }

    /// Explicit logout.
    pub fn sign_out(&self) -> Result<(), TokenStoreError> {
        *self.lock_token() = None;
        self.inner.store.clear()?;
        self.inner.state_tx.send_replace(AuthState::SignedOut);
        tracing::info!("Signed out");
        Ok(())
    }

    /// Evict the credential after the backend rejected it.
    ///
    /// Unconditional and idempotent. The in-memory token is dropped even if
    /// the store cannot be cleared; that failure is only logged.
    pub fn invalidate(&self) {
        *self.lock_token() = None;
        if let Err(e) = self.inner.store.clear() {
            tracing::error!(error = %e, "Failed to clear stored access token");
        }

        let changed = self.inner.state_tx.send_if_modified(|state| {
            let was_expired = *state == AuthState::SessionExpired;
            *state = AuthState::SessionExpired;
            !was_expired
        });
        if changed {
            tracing::warn!("Session invalidated by the backend");
        }
    }

    fn lock_token(&self) -> MutexGuard<'_, Option<String>> {
        self.inner
            .token
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &self.state())
            .field("store", &self.inner.store)
            .finish()
    }
}

// ---------------------------------------------------------------------------
// Token inspection
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct ExpiryClaim {
    exp: Option<i64>,
}

/// Read the `exp` claim of a JWT without verifying its signature.
///
/// The client never holds the signing secret; this is only used to skip a
/// round trip for tokens that are certainly dead. Opaque (non-JWT) tokens
/// yield `None`.
pub fn token_expiry(token: &str) -> Option<i64> {
    let mut validation = Validation::default();
    validation.insecure_disable_signature_validation();
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    decode::<ExpiryClaim>(token, &DecodingKey::from_secret(&[]), &validation)
        .ok()
        .and_then(|data| data.claims.exp)
}

/// Whether a token is a JWT that expired at or before `now` (Unix seconds).
pub fn is_expired(token: &str, now: i64) -> bool {
    token_expiry(token).is_some_and(|exp| exp <= now)
}

#[cfg(test)]
mod tests {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use serde::Serialize;

    use super::*;
    use crate::token_store::MemoryTokenStore;

    #[derive(Serialize)]
    struct TestClaims {
        sub: String,
        exp: i64,
    }

    fn jwt_expiring_at(exp: i64) -> String {
        encode(
            &Header::default(),
            &TestClaims {
                sub: "founder@example.com".into(),
                exp,
            },
            &EncodingKey::from_secret(b"backend-secret"),
        )
        .unwrap()
    }

    #[test]
    fn reads_expiry_without_secret() {
        let token = jwt_expiring_at(1_900_000_000);
        assert_eq!(token_expiry(&token), Some(1_900_000_000));
        assert!(!is_expired(&token, 1_800_000_000));
        assert!(is_expired(&token, 1_900_000_000));
    }

    #[test]
    fn opaque_token_is_never_expired() {
        assert_eq!(token_expiry("not-a-jwt"), None);
        assert!(!is_expired("not-a-jwt", i64::MAX));
    }

    #[test]
    fn load_discards_expired_token() {
        let store = MemoryTokenStore::with_token(jwt_expiring_at(1_000));
        let auth = AuthContext::load(store).unwrap();
        assert_eq!(auth.state(), AuthState::SignedOut);
        assert_eq!(auth.token(), None);
    }

    #[test]
    fn load_keeps_live_token() {
        let token = jwt_expiring_at(chrono::Utc::now().timestamp() + 3600);
        let auth = AuthContext::load(MemoryTokenStore::with_token(token.clone())).unwrap();
        assert_eq!(auth.state(), AuthState::SignedIn);
        assert_eq!(auth.token(), Some(token));
    }

    #[test]
    fn sign_in_and_out_transition_state() {
        let auth = AuthContext::load(MemoryTokenStore::new()).unwrap();
        let rx = auth.subscribe();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);

        auth.sign_in("opaque".into()).unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedIn);
        assert_eq!(auth.token().as_deref(), Some("opaque"));

        auth.sign_out().unwrap();
        assert_eq!(*rx.borrow(), AuthState::SignedOut);
        assert_eq!(auth.token(), None);
    }

    #[tokio::test]
    async fn invalidate_notifies_every_subscriber_once() {
        let auth = AuthContext::load(MemoryTokenStore::with_token("opaque")).unwrap();
        let mut first = auth.subscribe();
        let mut second = auth.clone().subscribe();

        auth.invalidate();
        auth.invalidate();

        first.changed().await.unwrap();
        second.changed().await.unwrap();
        assert_eq!(*first.borrow_and_update(), AuthState::SessionExpired);
        assert_eq!(*second.borrow_and_update(), AuthState::SessionExpired);
        assert!(!first.has_changed().unwrap());
        assert_eq!(auth.token(), None);
    }
}
