use tracing::{info, warn};

use crate::errors::AppError;
use crate::models::auth::{AuthGrant, Credentials, SignupRequest};
use crate::state::AppState;
use crate::view::Frame;

const MIN_PASSWORD_LEN: usize = 6;

/// Login form. Holds the last error shown to the user.
pub struct LoginScreen {
    state: AppState,
    error: Option<String>,
}

impl LoginScreen {
    pub fn new(state: AppState) -> Self {
        Self { state, error: None }
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Submits credentials. On success the session is signed in and the
    /// View Gate moves to the main shell; on failure the error text is kept.
    pub async fn submit(&mut self, email: &str, password: &str) -> bool {
        self.error = None;

        let credentials = match self.validate(email, password, None) {
            Ok(()) => Credentials {
                email: email.trim().to_string(),
                password: password.to_string(),
            },
            Err(e) => return self.fail(e),
        };

        match self.state.auth.login(&credentials).await {
            Ok(grant) => self.accept(grant),
            Err(e) => self.fail(e),
        }
    }

    pub async fn signup(&mut self, name: &str, email: &str, password: &str) -> bool {
        self.error = None;

        if let Err(e) = self.validate(email, password, Some(name)) {
            return self.fail(e);
        }
        let request = SignupRequest {
            name: name.trim().to_string(),
            email: email.trim().to_string(),
            password: password.to_string(),
        };

        match self.state.auth.signup(&request).await {
            Ok(grant) => self.accept(grant),
            Err(e) => self.fail(e),
        }
    }

    /// Fetches the GitHub authorization URL. The caller opens it; the OAuth
    /// round trip is driven by the backend.
    pub async fn github_login(&mut self) -> Option<String> {
        self.error = None;
        match self.state.auth.github_login_url().await {
            Ok(url) => Some(url),
            Err(e) => {
                warn!("GitHub login unavailable: {e}");
                self.error = Some(self.state.t("network_error"));
                None
            }
        }
    }

    fn validate(&self, email: &str, password: &str, name: Option<&str>) -> Result<(), AppError> {
        let name_missing = name.is_some_and(|n| n.trim().is_empty());
        if email.trim().is_empty() || password.is_empty() || name_missing {
            return Err(AppError::Validation(self.state.t("required_field")));
        }
        if !email.contains('@') {
            return Err(AppError::Validation(self.state.t("invalid_email")));
        }
        if name.is_some() && password.chars().count() < MIN_PASSWORD_LEN {
            return Err(AppError::Validation(self.state.t("password_too_short")));
        }
        Ok(())
    }

    fn accept(&mut self, grant: AuthGrant) -> bool {
        info!("Login accepted for {}", grant.user.email);
        self.state.session.login(grant.user, grant.token);
        true
    }

    fn fail(&mut self, err: AppError) -> bool {
        let text = match &err {
            AppError::Validation(msg) => msg.clone(),
            e if e.is_transport() => self.state.t("network_error"),
            e => e
                .server_message()
                .map(str::to_string)
                .unwrap_or_else(|| self.state.t("invalid_credentials")),
        };
        warn!(kind = err.kind(), "Login failed: {err}");
        self.error = Some(text);
        false
    }

    pub fn render(&self) -> Frame {
        let state = &self.state;
        let mut frame = Frame::new(state.i18n.direction());
        frame.push(state.t("app_name"));
        frame.push(format!("== {} ==", state.t("login")));
        if let Some(error) = &self.error {
            frame.push(format!("! {error}"));
        }
        frame.push(format!("  login <{}> <{}>", state.t("email"), state.t("password")));
        frame.push(format!(
            "  signup <{}> <{}> <{}>",
            state.t("name"),
            state.t("email"),
            state.t("password")
        ));
        frame.push(format!("  github   ({})", state.t("login_with_github")));
        frame
    }
}
