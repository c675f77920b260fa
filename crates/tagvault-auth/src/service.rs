// SPDX-FileCopyrightText: 2026 Tagvault Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Registration, login, tag verification and password change.
//!
//! Password hashing and scrypt run on the blocking pool.

use std::sync::Arc;

use secrecy::{ExposeSecret, SecretString};
use tagvault_core::types::NewIdentity;
use tagvault_core::{AuthError, CredentialStore, TagvaultError, UserId};
use tagvault_vault::{KeyManager, crypto};
use tracing::{info, warn};

use crate::context::SessionContext;
use crate::registry::{SessionRegistry, SharedSession};
use crate::session::Session;
use crate::state::AuthState;

/// Longest accepted username, in characters.
pub const MAX_USERNAME_LEN: usize = 64;

/// Result of a successful login.
#[derive(Debug, Clone)]
pub struct LoginOutcome {
    pub session_id: String,
    pub user_id: UserId,
    pub state: AuthState,
}

/// A freshly provisioned token secret, hex-encoded.
#[derive(Clone)]
pub struct TokenGrant {
    pub secret_hex: String,
    pub counter: i64,
}

impl std::fmt::Debug for TokenGrant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenGrant")
            .field("secret_hex", &"[REDACTED]")
            .field("counter", &self.counter)
            .finish()
    }
}

/// Run CPU-heavy crypto off the async workers.
pub(crate) async fn blocking<T, F>(f: F) -> Result<T, TagvaultError>
where
    F: FnOnce() -> Result<T, TagvaultError> + Send + 'static,
    T: Send + 'static,
{
    tokio::task::spawn_blocking(f)
        .await
        .map_err(|e| TagvaultError::Internal(format!("blocking task failed: {e}")))?
}

/// Drives the two-factor flow over the credential store and session registry.
pub struct AuthService {
    store: Arc<dyn CredentialStore>,
    keys: Arc<KeyManager>,
    sessions: Arc<SessionRegistry>,
}

impl AuthService {
    pub fn new(
        store: Arc<dyn CredentialStore>,
        keys: Arc<KeyManager>,
        sessions: Arc<SessionRegistry>,
    ) -> Self {
        Self {
            store,
            keys,
            sessions,
        }
    }

    pub fn sessions(&self) -> &SessionRegistry {
        &self.sessions
    }

    /// Create an identity bound to `password` and `token_identifier`.
    pub async fn register(
        &self,
        username: &str,
        password: SecretString,
        token_identifier: &str,
    ) -> Result<UserId, TagvaultError> {
        let username = username.trim();
        let token_identifier = token_identifier.trim();
        if username.is_empty() || password.expose_secret().is_empty() || token_identifier.is_empty()
        {
            return Err(TagvaultError::Validation(
                "username, password and token identifier are required".to_string(),
            ));
        }
        if username.chars().count() > MAX_USERNAME_LEN {
            return Err(TagvaultError::Validation(format!(
                "username must be at most {MAX_USERNAME_LEN} characters"
            )));
        }

        let keys = Arc::clone(&self.keys);
        let (key, _vault_key) =
            blocking(move || keys.create(password.expose_secret().as_bytes())).await?;

        let user_id = self
            .store
            .insert_identity(&NewIdentity {
                username: username.to_string(),
                token_identifier: token_identifier.to_string(),
                key,
            })
            .await?;
        info!(user_id, username, "identity registered");
        Ok(user_id)
    }

    /// Verify the password factor and open a new `PasswordVerified` session.
    ///
    /// A successful login always issues a fresh session id; `previous`, if
    /// given, is discarded.
    pub async fn login(
        &self,
        username: &str,
        password: SecretString,
        previous: Option<&str>,
    ) -> Result<LoginOutcome, TagvaultError> {
        let username = username.trim();
        if username.is_empty() || password.expose_secret().is_empty() {
            return Err(TagvaultError::Validation(
                "username and password are required".to_string(),
            ));
        }

        let Some(identity) = self.store.find_identity(username).await? else {
            let keys = Arc::clone(&self.keys);
            let err = blocking(move || Ok(keys.reject_unknown(password.expose_secret().as_bytes())))
                .await?;
            warn!("login failed");
            return Err(err);
        };

        let keys = Arc::clone(&self.keys);
        let material = identity.key.clone();
        let vault_key = blocking(move || keys.unseal(password.expose_secret().as_bytes(), &material))
            .await
            .inspect_err(|_| warn!(user_id = identity.user_id, "login failed"))?;

        if let Some(previous) = previous {
            self.logout(Some(previous)).await;
        }

        let mut session = Session::new();
        session.password_verified(identity.user_id, vault_key, identity.token_identifier)?;
        let state = session.state();
        let session_id = self.sessions.insert(session);
        info!(user_id = identity.user_id, "password factor verified");

        Ok(LoginOutcome {
            session_id,
            user_id: identity.user_id,
            state,
        })
    }

    fn session(&self, session_id: Option<&str>) -> Result<SharedSession, TagvaultError> {
        session_id
            .and_then(|id| self.sessions.get(id))
            .ok_or(TagvaultError::Auth(AuthError::NotAuthorized))
    }

    /// Present the tag identifier for the session's identity.
    pub async fn verify_token(
        &self,
        session_id: Option<&str>,
        presented: &str,
    ) -> Result<AuthState, TagvaultError> {
        if presented.trim().is_empty() {
            return Err(TagvaultError::Validation(
                "token identifier is required".to_string(),
            ));
        }
        let session = self.session(session_id)?;
        let mut session = session.lock().await;
        match session.verify_token(presented) {
            Ok(()) => {
                info!(user_id = session.verified_user(), "token factor verified");
                Ok(session.state())
            }
            Err(err) => {
                warn!(user_id = session.verified_user(), error = %err, "token verification failed");
                Err(err.into())
            }
        }
    }

    /// Current state of a session; unknown or expired ids are unauthenticated.
    pub async fn status(&self, session_id: Option<&str>) -> AuthState {
        match self.session(session_id) {
            Ok(session) => session.lock().await.state(),
            Err(_) => AuthState::Unauthenticated,
        }
    }

    /// Discard a session and wipe its vault key.
    pub async fn logout(&self, session_id: Option<&str>) {
        if let Some(session) = session_id.and_then(|id| self.sessions.remove(id)) {
            let mut session = session.lock().await;
            let user_id = session.verified_user();
            session.logout();
            info!(user_id, "session logged out");
        }
    }

    /// The context vault operations require; only for fully authenticated sessions.
    pub async fn context(&self, session_id: Option<&str>) -> Result<SessionContext, TagvaultError> {
        let session = self.session(session_id)?;
        let session = session.lock().await;
        Ok(session.context()?)
    }

    /// Provision the identity's token secret. Allowed once per identity,
    /// from either verified state.
    pub async fn initialize_token(&self, session_id: Option<&str>) -> Result<TokenGrant, TagvaultError> {
        let session = self.session(session_id)?;
        let user_id = session
            .lock()
            .await
            .verified_user()
            .ok_or(TagvaultError::Auth(AuthError::NotAuthorized))?;

        let secret: [u8; 32] = crypto::random_bytes()?;
        let provision = tagvault_core::types::TokenProvision {
            user_id,
            secret: secret.to_vec(),
            counter: 0,
            created_at: chrono::Utc::now().to_rfc3339(),
        };
        self.store.insert_token_provision(&provision).await?;
        info!(user_id, "token provisioned");

        Ok(TokenGrant {
            secret_hex: hex::encode(secret),
            counter: provision.counter,
        })
    }

    /// Bump the provisioned token's usage counter.
    pub async fn advance_token_counter(&self, ctx: &SessionContext) -> Result<i64, TagvaultError> {
        self.store.advance_token_counter(ctx.user_id()).await
    }

    /// Re-protect the vault key under a new password.
    ///
    /// Entries are untouched and the session keeps its unsealed key.
    pub async fn change_password(
        &self,
        ctx: &SessionContext,
        current: SecretString,
        new: SecretString,
    ) -> Result<(), TagvaultError> {
        if new.expose_secret().is_empty() {
            return Err(TagvaultError::Validation(
                "new password must not be empty".to_string(),
            ));
        }
        let identity = self
            .store
            .get_identity(ctx.user_id())
            .await?
            .ok_or_else(|| TagvaultError::NotFound("identity".to_string()))?;

        let keys = Arc::clone(&self.keys);
        let material = identity.key;
        let rewrapped = blocking(move || {
            keys.rewrap(
                current.expose_secret().as_bytes(),
                new.expose_secret().as_bytes(),
                &material,
            )
        })
        .await
        .inspect_err(|_| warn!(user_id = ctx.user_id(), "password change rejected"))?;

        self.store
            .update_key_material(ctx.user_id(), &rewrapped)
            .await?;
        info!(user_id = ctx.user_id(), "password changed");
        Ok(())
    }
}
