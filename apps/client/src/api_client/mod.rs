//! API client: the single point of entry for all backend calls.
//!
//! The managers and screens depend on the `AuthApi`, `I18nApi` and `JobsApi`
//! traits, never on `ApiClient` directly.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::errors::AppError;
use crate::models::auth::{AuthGrant, Credentials, ErrorBody, GithubLogin, SignupRequest, User};
use crate::models::i18n::{LanguageInfo, SetLanguageRequest, TranslationsPayload};
use crate::models::jobs::TrackerResponse;

#[async_trait]
pub trait AuthApi: Send + Sync {
    /// `GET /auth/me`: resolves the identity behind a bearer token.
    async fn current_user(&self, token: &str) -> Result<User, AppError>;

    /// `POST /auth/login`.
    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AppError>;

    /// `POST /auth/signup`.
    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, AppError>;

    /// `POST /auth/logout`. The backend is stateless; this is a courtesy call.
    async fn logout(&self, token: &str) -> Result<(), AppError>;

    /// `GET /auth/github/login`: returns the OAuth authorization URL.
    async fn github_login_url(&self) -> Result<String, AppError>;
}

#[async_trait]
pub trait I18nApi: Send + Sync {
    async fn translations(&self, language: &str) -> Result<TranslationsPayload, AppError>;

    async fn set_language(&self, language: &str) -> Result<(), AppError>;

    async fn language_info(&self) -> Result<LanguageInfo, AppError>;
}

#[async_trait]
pub trait JobsApi: Send + Sync {
    async fn application_tracker(&self, token: &str) -> Result<TrackerResponse, AppError>;
}

/// Which error variant a non-2xx answer maps to.
#[derive(Clone, Copy)]
enum Rejection {
    Auth,
    Api,
}

/// The HTTP implementation of every backend trait.
#[derive(Clone)]
pub struct ApiClient {
    client: Client,
    base_url: String,
}

impl ApiClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, AppError> {
        Ok(Self {
            client: Client::builder().timeout(timeout).build()?,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Reads the body as JSON on success, or the backend's `{error}` message otherwise.
    async fn read_json<T: DeserializeOwned>(
        response: Response,
        rejection: Rejection,
    ) -> Result<T, AppError> {
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|b| b.error);
            debug!("Backend answered {}: {:?}", status, message);
            return Err(match rejection {
                Rejection::Auth => AppError::AuthRejected {
                    status: status.as_u16(),
                    message,
                },
                Rejection::Api => AppError::Api {
                    status: status.as_u16(),
                    message,
                },
            });
        }

        Ok(serde_json::from_str(&body)?)
    }

    async fn read_ack(response: Response, rejection: Rejection) -> Result<(), AppError> {
        Self::read_json::<serde_json::Value>(response, rejection)
            .await
            .map(|_| ())
    }
}

#[async_trait]
impl AuthApi for ApiClient {
    async fn current_user(&self, token: &str) -> Result<User, AppError> {
        let response = self
            .client
            .get(self.url("/auth/me"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, Rejection::Auth).await
    }

    async fn login(&self, credentials: &Credentials) -> Result<AuthGrant, AppError> {
        let response = self
            .client
            .post(self.url("/auth/login"))
            .json(credentials)
            .send()
            .await?;
        Self::read_json(response, Rejection::Auth).await
    }

    async fn signup(&self, request: &SignupRequest) -> Result<AuthGrant, AppError> {
        let response = self
            .client
            .post(self.url("/auth/signup"))
            .json(request)
            .send()
            .await?;
        Self::read_json(response, Rejection::Auth).await
    }

    async fn logout(&self, token: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url("/auth/logout"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_ack(response, Rejection::Auth).await
    }

    async fn github_login_url(&self) -> Result<String, AppError> {
        let response = self.client.get(self.url("/auth/github/login")).send().await?;
        let login: GithubLogin = Self::read_json(response, Rejection::Api).await?;
        Ok(login.auth_url)
    }
}

#[async_trait]
impl I18nApi for ApiClient {
    async fn translations(&self, language: &str) -> Result<TranslationsPayload, AppError> {
        if !is_language_code(language) {
            return Err(AppError::Validation(format!(
                "'{language}' is not a valid language code"
            )));
        }
        let response = self
            .client
            .get(self.url(&format!("/i18n/translations/{language}")))
            .send()
            .await?;
        Self::read_json(response, Rejection::Api).await
    }

    async fn set_language(&self, language: &str) -> Result<(), AppError> {
        let response = self
            .client
            .post(self.url("/i18n/language"))
            .json(&SetLanguageRequest { language })
            .send()
            .await?;
        Self::read_ack(response, Rejection::Api).await
    }

    async fn language_info(&self) -> Result<LanguageInfo, AppError> {
        let response = self.client.get(self.url("/i18n/language")).send().await?;
        Self::read_json(response, Rejection::Api).await
    }
}

#[async_trait]
impl JobsApi for ApiClient {
    async fn application_tracker(&self, token: &str) -> Result<TrackerResponse, AppError> {
        let response = self
            .client
            .get(self.url("/jobs/applications/tracker"))
            .bearer_auth(token)
            .send()
            .await?;
        Self::read_json(response, Rejection::Api).await
    }
}

/// Language codes go into a URL path segment, so only `[A-Za-z0-9_-]` is allowed.
fn is_language_code(code: &str) -> bool {
    !code.is_empty()
        && code
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_')
}
