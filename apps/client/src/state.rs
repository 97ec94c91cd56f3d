use std::sync::Arc;

use crate::api_client::{AuthApi, JobsApi};
use crate::errors::AppError;
use crate::i18n::LocalizationManager;
use crate::session::SessionManager;

/// Shared client state handed explicitly to every screen.
#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<dyn AuthApi>,
    pub jobs: Arc<dyn JobsApi>,
    pub session: SessionManager,
    pub i18n: LocalizationManager,
}

impl AppState {
    pub fn builder() -> AppStateBuilder {
        AppStateBuilder::default()
    }

    /// Boot sequence: validates the stored token while the first translation
    /// table and the language list load. The backend's language preference is
    /// only read, never written, at this point.
    pub async fn start(&self) {
        tokio::join!(
            self.i18n.load_translations(),
            self.i18n.load_supported_languages(),
            self.session.resolve_on_startup(),
        );
    }

    /// Shorthand for `self.i18n.translate`.
    pub fn t(&self, key: &str) -> String {
        self.i18n.translate(key, &[])
    }
}

/// Collects the pieces of `AppState`; `build` fails if any is missing.
#[derive(Default)]
pub struct AppStateBuilder {
    auth: Option<Arc<dyn AuthApi>>,
    jobs: Option<Arc<dyn JobsApi>>,
    session: Option<SessionManager>,
    i18n: Option<LocalizationManager>,
}

impl AppStateBuilder {
    pub fn auth_api(mut self, auth: Arc<dyn AuthApi>) -> Self {
        self.auth = Some(auth);
        self
    }

    pub fn jobs_api(mut self, jobs: Arc<dyn JobsApi>) -> Self {
        self.jobs = Some(jobs);
        self
    }

    pub fn session(mut self, session: SessionManager) -> Self {
        self.session = Some(session);
        self
    }

    pub fn localization(mut self, i18n: LocalizationManager) -> Self {
        self.i18n = Some(i18n);
        self
    }

    pub fn build(self) -> Result<AppState, AppError> {
        Ok(AppState {
            auth: self.auth.ok_or_else(|| missing("auth API"))?,
            jobs: self.jobs.ok_or_else(|| missing("jobs API"))?,
            session: self.session.ok_or_else(|| missing("session manager"))?,
            i18n: self.i18n.ok_or_else(|| missing("localization manager"))?,
        })
    }
}

fn missing(what: &str) -> AppError {
    AppError::Configuration(format!("screens require a {what}, none was attached"))
}
