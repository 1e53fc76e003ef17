//! Auth-session state for the signed-in user.
//!
//! SYSTEM CONTEXT
//! ==============
//! The store is the only writer of the session. It keeps the token, its
//! decoded expiry, and the user in memory and mirrors token and user into
//! key-value storage under [`TOKEN_KEY`] and [`USER_KEY`] so a restart can
//! pick the session back up.
//!
//! SESSION VALIDITY
//! ================
//! A session is usable while `now < exp`. Restoring or checking a missing,
//! undecodable, or expired session clears both memory and storage.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use crate::net::api::ApiError;
use crate::net::auth::AuthService;
use crate::net::types::{AuthResponse, ImageUpload, MessageResponse, SignupResponse, User};
use crate::util::storage::{KeyValueStorage, StorageError, load_json, save_json};
use crate::util::token::{self, TokenError, is_expired_at, now_secs};
use crate::validation::{ForgotPasswordForm, LoginForm, OtpForm, ProfileForm, ResetPasswordForm, SignupForm};

pub const TOKEN_KEY: &str = "token";
pub const USER_KEY: &str = "user";

#[derive(Debug, thiserror::Error)]
pub enum AuthStoreError {
    #[error(transparent)]
    Api(#[from] ApiError),
    #[error("session storage failed: {0}")]
    Storage(#[from] StorageError),
    #[error("unusable session token: {0}")]
    Token(#[from] TokenError),
    #[error("not signed in")]
    NotAuthenticated,
    #[error("session expired, sign in again")]
    SessionExpired,
}

/// In-memory view of the session.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    pub token: Option<String>,
    /// Token expiry in seconds since the Unix epoch.
    pub expires_at: Option<u64>,
}

impl AuthState {
    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.user.is_some() && self.token.is_some()
    }
}

pub struct AuthStore<S> {
    service: AuthService,
    storage: S,
    state: AuthState,
}

impl<S: KeyValueStorage> AuthStore<S> {
    /// A signed-out store. Call [`AuthStore::restore`] to pick up a saved session.
    pub fn new(service: AuthService, storage: S) -> Self {
        Self { service, storage, state: AuthState::default() }
    }

    #[must_use]
    pub fn state(&self) -> &AuthState {
        &self.state
    }

    #[must_use]
    pub fn user(&self) -> Option<&User> {
        self.state.user.as_ref()
    }

    #[must_use]
    pub fn token(&self) -> Option<&str> {
        self.state.token.as_deref()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.state.is_authenticated()
    }

    #[must_use]
    pub fn storage(&self) -> &S {
        &self.storage
    }

    #[must_use]
    pub fn service(&self) -> &AuthService {
        &self.service
    }

    // =========================================================================
    // SESSION LIFECYCLE
    // =========================================================================

    /// Load the saved session. Returns `false`, with storage cleared, when it
    /// is missing, unreadable, or expired.
    pub fn restore(&mut self) -> bool {
        self.restore_at(now_secs())
    }

    pub fn restore_at(&mut self, now: u64) -> bool {
        match self.read_saved_session(now) {
            Ok(Some(state)) => {
                tracing::debug!(expires_at = ?state.expires_at, "restored saved session");
                self.state = state;
                true
            }
            Ok(None) => {
                self.discard_session();
                false
            }
            Err(e) => {
                tracing::warn!(error = %e, "discarding unreadable saved session");
                self.discard_session();
                false
            }
        }
    }

    fn read_saved_session(&self, now: u64) -> Result<Option<AuthState>, AuthStoreError> {
        let Some(token) = self.storage.get_item(TOKEN_KEY)? else {
            return Ok(None);
        };
        let Some(user) = load_json::<User, _>(&self.storage, USER_KEY)? else {
            return Ok(None);
        };
        let exp = token::expiry(&token)?;
        if is_expired_at(exp, now) {
            tracing::info!(exp, now, "saved session expired");
            return Ok(None);
        }
        Ok(Some(AuthState { user: Some(user), token: Some(token), expires_at: Some(exp) }))
    }

    /// Re-check the in-memory session against the clock, clearing it once expired.
    pub fn check_session(&mut self) -> bool {
        self.check_session_at(now_secs())
    }

    pub fn check_session_at(&mut self, now: u64) -> bool {
        let valid = match (&self.state.token, self.state.expires_at) {
            (Some(_), Some(exp)) => !is_expired_at(exp, now),
            _ => false,
        };
        if !valid {
            if self.state.token.is_some() {
                tracing::info!(now, "session expired");
            }
            self.discard_session();
        }
        valid
    }

    /// Token of a live session, for calls that need a bearer.
    ///
    /// # Errors
    ///
    /// [`AuthStoreError::NotAuthenticated`] without a session,
    /// [`AuthStoreError::SessionExpired`] once it has expired (the session is cleared).
    pub fn require_token(&mut self) -> Result<String, AuthStoreError> {
        self.require_token_at(now_secs())
    }

    /// # Errors
    ///
    /// Same as [`AuthStore::require_token`].
    pub fn require_token_at(&mut self, now: u64) -> Result<String, AuthStoreError> {
        let Some(token) = self.state.token.clone() else {
            return Err(AuthStoreError::NotAuthenticated);
        };
        if !self.check_session_at(now) {
            return Err(AuthStoreError::SessionExpired);
        }
        Ok(token)
    }

    /// Sign out. Both storage keys are always removed; the first failure is returned.
    ///
    /// # Errors
    ///
    /// Returns the first [`StorageError`] hit while removing the saved session.
    pub fn logout(&mut self) -> Result<(), StorageError> {
        let had_session = self.state.token.is_some();
        self.state = AuthState::default();
        let token = self.storage.remove_item(TOKEN_KEY);
        let user = self.storage.remove_item(USER_KEY);
        if had_session {
            tracing::info!("signed out");
        }
        token.and(user)
    }

    fn discard_session(&mut self) {
        if let Err(e) = self.logout() {
            tracing::warn!(error = %e, "failed to clear saved session");
        }
    }

    fn start_session(&mut self, response: AuthResponse) -> Result<User, AuthStoreError> {
        let exp = token::expiry(&response.token)?;
        if is_expired_at(exp, now_secs()) {
            return Err(AuthStoreError::SessionExpired);
        }

        self.storage.set_item(TOKEN_KEY, &response.token)?;
        if let Err(e) = save_json(&mut self.storage, USER_KEY, &response.user) {
            self.discard_session();
            return Err(e.into());
        }

        tracing::info!(user_id = %response.user.id, exp, "signed in");
        let user = response.user.clone();
        self.state = AuthState { user: Some(response.user), token: Some(response.token), expires_at: Some(exp) };
        Ok(user)
    }

    fn replace_user(&mut self, user: User) -> Result<User, AuthStoreError> {
        save_json(&mut self.storage, USER_KEY, &user)?;
        self.state.user = Some(user.clone());
        Ok(user)
    }

    // =========================================================================
    // FLOWS
    // =========================================================================

    /// Sign in with email and password.
    ///
    /// # Errors
    ///
    /// Returns API errors (including form validation), storage, or token errors.
    pub async fn login(&mut self, form: &LoginForm) -> Result<User, AuthStoreError> {
        let response = self.service.signin(form).await?;
        self.start_session(response)
    }

    /// Register; the account stays signed out until [`AuthStore::verify_otp`].
    ///
    /// # Errors
    ///
    /// Returns API errors, including form validation.
    pub async fn signup(&self, form: &SignupForm) -> Result<SignupResponse, AuthStoreError> {
        Ok(self.service.signup(form).await?)
    }

    /// Verify the signup OTP and start the session it returns.
    ///
    /// # Errors
    ///
    /// Returns API errors (including form validation), storage, or token errors.
    pub async fn verify_otp(&mut self, form: &OtpForm) -> Result<User, AuthStoreError> {
        let response = self.service.verify_otp(form).await?;
        self.start_session(response)
    }

    /// # Errors
    ///
    /// Returns API errors, including email validation.
    pub async fn resend_otp(&self, email: &str) -> Result<MessageResponse, AuthStoreError> {
        Ok(self.service.resend_otp(email).await?)
    }

    /// # Errors
    ///
    /// Returns API errors, including form validation.
    pub async fn forgot_password(&self, form: &ForgotPasswordForm) -> Result<MessageResponse, AuthStoreError> {
        Ok(self.service.forgot_password(form).await?)
    }

    /// # Errors
    ///
    /// Returns API errors, including form validation.
    pub async fn reset_password(&self, form: &ResetPasswordForm) -> Result<MessageResponse, AuthStoreError> {
        Ok(self.service.reset_password(form).await?)
    }

    /// Re-fetch the signed-in user. A 401 ends the session.
    ///
    /// # Errors
    ///
    /// Returns session, API, or storage errors.
    pub async fn refresh_user(&mut self) -> Result<User, AuthStoreError> {
        let token = self.require_token()?;
        match self.service.user_details(&token).await {
            Ok(user) => self.replace_user(user),
            Err(e) => Err(self.end_session_if_rejected(e)),
        }
    }

    /// Submit the profile form and keep the returned user.
    ///
    /// # Errors
    ///
    /// Returns session, API (including form validation), or storage errors.
    pub async fn update_profile(
        &mut self,
        form: &ProfileForm,
        image: Option<ImageUpload>,
    ) -> Result<User, AuthStoreError> {
        let token = self.require_token()?;
        match self.service.update_profile(&token, form, image).await {
            Ok(response) => self.replace_user(response.user),
            Err(e) => Err(self.end_session_if_rejected(e)),
        }
    }

    fn end_session_if_rejected(&mut self, error: ApiError) -> AuthStoreError {
        if error.is_unauthorized() {
            tracing::info!("server rejected session token");
            self.discard_session();
            return AuthStoreError::SessionExpired;
        }
        error.into()
    }
}
