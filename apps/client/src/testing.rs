//! In-memory backend used by unit tests across modules.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::api_client::{AuthApi, I18nApi, JobsApi};
use crate::errors::AppError;
use crate::models::auth::{AuthGrant, Credentials, SignupRequest, User};
use crate::models::i18n::{LanguageInfo, TranslationsPayload};
use crate::models::jobs::{ApplicationSummary, TrackerResponse};

/// A response body that is not JSON, the fake's stand-in for a transport failure.
pub fn transport_failure() -> AppError {
    serde_json::from_str::<serde_json::Value>("<html>502 Bad Gateway</html>")
        .unwrap_err()
        .into()
}

pub fn user(id: i64, name: &str) -> User {
    User {
        id,
        email: format!("{}@example.com", name.to_lowercase()),
        name: name.to_string(),
        github_username: None,
    }
}

#[derive(Default)]
pub struct FakeBackend {
    /// token -> identity accepted by `/auth/me`
    sessions: Mutex<HashMap<String, User>>,
    /// (email, password) -> grant accepted by `/auth/login`
    accounts: Mutex<HashMap<(String, String), AuthGrant>>,
    /// language -> payload served by `/i18n/translations`
    tables: Mutex<HashMap<String, TranslationsPayload>>,
    /// language -> gate the translation fetch waits on before answering
    gates: Mutex<HashMap<String, Arc<Notify>>>,
    /// gate `/auth/me` waits on, if held
    me_gate: Mutex<Option<Arc<Notify>>>,
    summary: Mutex<Option<ApplicationSummary>>,
    supported: Mutex<Vec<String>>,
    pub transport_down: AtomicBool,
    pub language_write_fails: AtomicBool,
    pub me_calls: AtomicUsize,
    pub login_calls: AtomicUsize,
    pub logout_calls: AtomicUsize,
    pub language_writes: Mutex<Vec<String>>,
}

impl FakeBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn accept_token(&self, token: &str, user: User) {
        self.sessions
            .lock()
            .unwrap()
            .insert(token.to_string(), user);
    }

    pub fn add_account(&self, email: &str, password: &str, grant: AuthGrant) {
        self.accounts
            .lock()
            .unwrap()
            .insert((email.to_string(), password.to_string()), grant);
    }

    pub fn serve_table(&self, language: &str, entries: &[(&str, &str)], is_rtl: bool) {
        let translations = entries
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        self.tables.lock().unwrap().insert(
            language.to_string(),
            TranslationsPayload {
                translations,
                is_rtl,
            },
        );
    }

    /// Holds `/i18n/translations/{language}` until `release` is called.
    pub fn hold(&self, language: &str) {
        self.gates
            .lock()
            .unwrap()
            .insert(language.to_string(), Arc::new(Notify::new()));
    }

    pub fn release(&self, language: &str) {
        if let Some(gate) = self.gates.lock().unwrap().get(language) {
            gate.notify_one();
        }
    }

    /// Holds `/auth/me` until `release_me` is called.
    pub fn hold_me(&self) {
        *self.me_gate.lock().unwrap() = Some(Arc::new(Notify::new()));
    }

    pub fn release_me(&self) {
        if let Some(gate) = self.me_gate.lock().unwrap().as_ref() {
            gate.notify_one();
        }
    }

    pub fn serve_summary(&self, summary: ApplicationSummary) {
        *self.summary.lock().unwrap() = Some(summary);
    }

    pub fn serve_supported(&self, languages: &[&str]) {
        *self.supported.lock().unwrap() = languages.iter().map(|l| l.to_string()).collect();
    }

    fn check_transport(&self) -> Result<(), AppError> {
        if self.transport_down.load(Ordering::SeqCst) {
            Err(transport_failure())
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl AuthApi for FakeBackend {
    async fn current_user(&self, token: &str) -> Result<User, AppError> {
        self.me_calls.fetch_add(1, Ordering::SeqCst);
        let gate = self.me_gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_transport()?;
        self.sessions
            .lock()
            .unwrap()
            .get(token)
            .cloned()
            .ok_or(AppError::AuthRejected {
                status: 401,
                message: Some("Invalid or expired token".to_string()),
            })
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AppError> {
        self.login_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()?;
        self.accounts
            .lock()
            .unwrap()
            .get(&(credentials.email.clone(), credentials.password.clone()))
            .cloned()
            .ok_or(AppError::AuthRejected {
                status: 401,
                message: Some("Invalid email or password".to_string()),
            })
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, AppError> {
        self.check_transport()?;
        let key = (request.email.clone(), request.password.clone());
        let mut accounts = self.accounts.lock().unwrap();
        if accounts.contains_key(&key) {
            return Err(AppError::AuthRejected {
                status: 409,
                message: Some("User already exists".to_string()),
            });
        }
        let grant = AuthGrant {
            user: User {
                id: accounts.len() as i64 + 100,
                email: request.email.clone(),
                name: request.name.clone(),
                github_username: None,
            },
            token: format!("signup-{}", request.email),
        };
        accounts.insert(key, grant.clone());
        Ok(grant)
    }

    async fn logout(&self, _token: &str) -> Result<(), AppError> {
        self.logout_calls.fetch_add(1, Ordering::SeqCst);
        self.check_transport()
    }

    async fn github_login_url(&self) -> Result<String, AppError> {
        self.check_transport()?;
        Ok("https://github.com/login/oauth/authorize?client_id=test".to_string())
    }
}

#[async_trait]
impl I18nApi for FakeBackend {
    async fn translations(&self, language: &str) -> Result<TranslationsPayload, AppError> {
        let gate = self.gates.lock().unwrap().get(language).cloned();
        if let Some(gate) = gate {
            gate.notified().await;
        }
        self.check_transport()?;
        self.tables
            .lock()
            .unwrap()
            .get(language)
            .cloned()
            .ok_or(AppError::Api {
                status: 400,
                message: Some("Unsupported language".to_string()),
            })
    }

    async fn set_language(&self, language: &str) -> Result<(), AppError> {
        self.language_writes
            .lock()
            .unwrap()
            .push(language.to_string());
        if self.language_write_fails.load(Ordering::SeqCst) {
            return Err(AppError::Api {
                status: 500,
                message: Some("Failed to set language".to_string()),
            });
        }
        self.check_transport()
    }

    async fn language_info(&self) -> Result<LanguageInfo, AppError> {
        self.check_transport()?;
        Ok(LanguageInfo {
            supported_languages: self.supported.lock().unwrap().clone(),
        })
    }
}

#[async_trait]
impl JobsApi for FakeBackend {
    async fn application_tracker(&self, token: &str) -> Result<TrackerResponse, AppError> {
        self.check_transport()?;
        if !self.sessions.lock().unwrap().contains_key(token) {
            return Err(AppError::Api {
                status: 401,
                message: Some("Authentication required".to_string()),
            });
        }
        self.summary
            .lock()
            .unwrap()
            .clone()
            .map(|summary| TrackerResponse { summary })
            .ok_or(AppError::Api {
                status: 500,
                message: None,
            })
    }
}
