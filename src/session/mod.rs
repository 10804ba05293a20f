//! Session state and the operations that mutate it: `login`, `register`,
//! `fetch_profile`, `refresh_token` and `logout`. The session is an
//! explicitly constructed object shared with the request pipeline; there is
//! no ambient global. All durable writes go through the credential store.

pub mod state;
pub mod store;

use crate::api::{error::ApiError, Client};
use secrecy::SecretString;
use state::SessionState;
use std::sync::{Mutex, MutexGuard, PoisonError};
use store::CredentialStore;
use thiserror::Error;
use tracing::{debug, warn};

/// Failures surfaced by session operations. `InvalidCredentials` and
/// `RegistrationRejected` never mutate session state; `SessionExpired`
/// always means the session has already been cleared.
#[derive(Debug, Clone, Error)]
pub enum SessionError {
    #[error("{0}")]
    InvalidCredentials(String),
    #[error("{0}")]
    RegistrationRejected(String),
    #[error("session expired, sign in again")]
    SessionExpired,
    #[error("{0}")]
    Transport(String),
}

/// Owns the in-memory session state and its durable store.
///
/// Operations run on a cooperative scheduler and never hold the state lock
/// across an await, so overlapping calls interleave as last-write-wins. Each
/// completion re-checks its precondition (a token still being present) so a
/// stale result cannot resurrect authenticated state after a logout.
#[derive(Debug)]
pub struct Session {
    state: Mutex<SessionState>,
    store: CredentialStore,
}

impl Session {
    /// Rebuilds session state from the credential store. Done exactly once,
    /// at process start.
    #[must_use]
    pub fn load(store: CredentialStore) -> Self {
        let state = match store.load() {
            Some(stored) => SessionState {
                token: Some(SecretString::from(stored.token)),
                profile: stored.profile,
                ..SessionState::default()
            },
            None => SessionState::default(),
        };

        Self {
            state: Mutex::new(state),
            store,
        }
    }

    fn state(&self) -> MutexGuard<'_, SessionState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Copy of the current state, for guards and display.
    #[must_use]
    pub fn snapshot(&self) -> SessionState {
        self.state().clone()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state().is_authenticated()
    }

    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.state().is_admin()
    }

    /// Transient copy of the access token for the request pipeline.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.state().token.clone()
    }

    /// Last operation error, for display.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    fn persist(&self, state: &SessionState) {
        if let Err(err) = self
            .store
            .save(state.token.as_ref(), state.profile.as_ref())
        {
            warn!("Failed to persist session: {err}");
        }
    }

    /// Swaps in a refreshed access token, unless the session was cleared
    /// while the refresh was in flight. Returns whether the token was
    /// applied.
    pub(crate) fn replace_token(&self, token: SecretString) -> bool {
        let mut state = self.state();
        if state.token.is_none() {
            debug!("Dropping refreshed token: session was cleared mid-flight");
            return false;
        }
        state.token = Some(token);
        self.persist(&state);
        true
    }

    /// Authenticates against the remote service and fetches the profile.
    ///
    /// A rejected login leaves the session untouched apart from `error`. A
    /// failed post-login profile fetch is not silently ignored: the session
    /// has already been cleared by `fetch_profile`, and `SessionExpired` is
    /// reported.
    ///
    /// # Errors
    /// Returns `InvalidCredentials` when the server rejects the login,
    /// `Transport` on network failure, `SessionExpired` when the follow-up
    /// profile fetch invalidates the session.
    pub async fn login(
        &self,
        client: &Client,
        username: &str,
        password: &SecretString,
    ) -> Result<(), SessionError> {
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let outcome = match client.auth_login(username, password).await {
            Ok(token) => {
                {
                    let mut state = self.state();
                    state.token = Some(token);
                    self.persist(&state);
                }
                if self.fetch_profile(client).await {
                    Ok(())
                } else {
                    Err(SessionError::SessionExpired)
                }
            }
            Err(err) => Err(match err {
                ApiError::Api { message, .. } => SessionError::InvalidCredentials(message),
                ApiError::SessionExpired => SessionError::SessionExpired,
                ApiError::Transport(message) => SessionError::Transport(message),
            }),
        };

        let mut state = self.state();
        state.loading = false;
        if let Err(err) = &outcome {
            state.error = Some(err.to_string());
        }
        outcome
    }

    /// Creates an account. Never mutates credential or profile.
    ///
    /// # Errors
    /// Returns `RegistrationRejected` when the server refuses the request,
    /// `Transport` on network failure.
    pub async fn register(
        &self,
        client: &Client,
        username: &str,
        password: &SecretString,
        invite_code: &str,
    ) -> Result<(), SessionError> {
        {
            let mut state = self.state();
            state.loading = true;
            state.error = None;
        }

        let outcome = match client.auth_register(username, password, invite_code).await {
            Ok(()) => Ok(()),
            Err(err) => Err(match err {
                ApiError::Api { message, .. } => SessionError::RegistrationRejected(message),
                ApiError::SessionExpired => SessionError::SessionExpired,
                ApiError::Transport(message) => SessionError::Transport(message),
            }),
        };

        let mut state = self.state();
        state.loading = false;
        if let Err(err) = &outcome {
            state.error = Some(err.to_string());
        }
        outcome
    }

    /// Fetches and caches the user profile. Returns `false` without touching
    /// the network when no credential is present. Any failure is treated as
    /// an invalid session: the recoverable cases have already been filtered
    /// out by the pipeline's refresh-and-retry.
    pub async fn fetch_profile(&self, client: &Client) -> bool {
        if !self.is_authenticated() {
            return false;
        }

        match client.user_profile().await {
            Ok(profile) => {
                let mut state = self.state();
                if state.token.is_none() {
                    debug!("Dropping fetched profile: session was cleared mid-flight");
                    return false;
                }
                state.profile = Some(profile);
                self.persist(&state);
                true
            }
            Err(err) => {
                debug!("Profile fetch failed, clearing session: {err}");
                self.logout();
                false
            }
        }
    }

    /// Exchanges the current access token for a fresh one. A single attempt:
    /// returns `false` without a network call when no credential is present,
    /// and clears the session on any failure.
    pub async fn refresh_token(&self, client: &Client) -> bool {
        client.refresh_session_token().await
    }

    /// Unconditionally clears credential and profile, in memory and on disk.
    /// Cannot fail; store errors are logged.
    pub fn logout(&self) {
        let mut state = self.state();
        state.token = None;
        state.profile = None;
        self.persist(&state);
    }
}
