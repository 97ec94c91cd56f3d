use std::collections::HashMap;
use std::future::Future;
use std::str::FromStr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api_client::I18nApi;
use crate::errors::AppError;
use crate::i18n::translate::translate;
use crate::models::i18n::TranslationsPayload;

/// Languages offered when the backend cannot be asked.
pub const FALLBACK_LANGUAGES: &[&str] = &["en", "ar"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextDirection {
    #[default]
    Ltr,
    Rtl,
}

/// How overlapping translation fetches are reconciled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchOrdering {
    /// Only the response to the most recently issued request is applied.
    #[default]
    LatestRequest,
    /// Whichever response arrives last is applied, even if it is for an
    /// older request.
    LastResolved,
}

impl FromStr for FetchOrdering {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "latest-request" | "latest_request" => Ok(FetchOrdering::LatestRequest),
            "last-resolved" | "last_resolved" => Ok(FetchOrdering::LastResolved),
            other => Err(AppError::Configuration(format!(
                "unknown fetch ordering '{other}'"
            ))),
        }
    }
}

/// Snapshot of the active language and its table.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct LocalizationState {
    /// Requested language; set before its table arrives.
    pub language: String,
    /// Language the current table and direction were loaded for.
    pub loaded_language: Option<String>,
    pub translations: HashMap<String, String>,
    pub direction: TextDirection,
    pub supported_languages: Vec<String>,
}

impl LocalizationState {
    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        translate(&self.translations, key, params)
    }

    pub fn is_rtl(&self) -> bool {
        self.direction == TextDirection::Rtl
    }
}

struct LocalizationInner {
    api: Arc<dyn I18nApi>,
    ordering: FetchOrdering,
    /// Sequence number of the most recently issued fetch.
    issued: AtomicU64,
    state: watch::Sender<LocalizationState>,
}

/// Owns the active language and its translation table. Clones share state.
#[derive(Clone)]
pub struct LocalizationManager {
    inner: Arc<LocalizationInner>,
}

impl LocalizationManager {
    /// Starts with `language` selected and no table; call `load_translations`
    /// or `set_language` to load one.
    pub fn new(api: Arc<dyn I18nApi>, language: &str, ordering: FetchOrdering) -> Self {
        let (state, _) = watch::channel(LocalizationState {
            language: language.to_string(),
            supported_languages: FALLBACK_LANGUAGES.iter().map(|l| l.to_string()).collect(),
            ..LocalizationState::default()
        });

        Self {
            inner: Arc::new(LocalizationInner {
                api,
                ordering,
                issued: AtomicU64::new(0),
                state,
            }),
        }
    }

    pub fn current(&self) -> LocalizationState {
        self.inner.state.borrow().clone()
    }

    pub fn language(&self) -> String {
        self.inner.state.borrow().language.clone()
    }

    pub fn direction(&self) -> TextDirection {
        self.inner.state.borrow().direction
    }

    pub fn is_rtl(&self) -> bool {
        self.direction() == TextDirection::Rtl
    }

    pub fn ordering(&self) -> FetchOrdering {
        self.inner.ordering
    }

    pub fn subscribe(&self) -> watch::Receiver<LocalizationState> {
        self.inner.state.subscribe()
    }

    pub fn translate(&self, key: &str, params: &[(&str, &str)]) -> String {
        translate(&self.inner.state.borrow().translations, key, params)
    }

    /// Fetches the table for the current language without telling the
    /// backend anything. Used at boot, where the backend's stored preference
    /// must not be overwritten with the client default.
    pub fn load_translations(&self) -> impl Future<Output = ()> + Send + 'static {
        let code = self.language();
        let seq = self.inner.next_seq();
        let inner = Arc::clone(&self.inner);
        async move { inner.load(seq, &code).await }
    }

    /// Switches to `code` immediately, then loads its table when the returned
    /// future is driven.
    ///
    /// The future also tells the backend about the change. Neither failure is
    /// surfaced: a failed fetch keeps the previous table, a failed write is
    /// only logged.
    pub fn set_language(&self, code: &str) -> impl Future<Output = ()> + Send + 'static {
        let code = code.to_string();
        let seq = self.inner.next_seq();
        self.inner.state.send_if_modified(|state| {
            if state.language == code {
                return false;
            }
            state.language = code.clone();
            true
        });

        let inner = Arc::clone(&self.inner);
        async move {
            let (written, ()) = tokio::join!(inner.api.set_language(&code), inner.load(seq, &code));

            if let Err(e) = written {
                warn!("Failed to record language '{code}' on the backend: {e}");
            }
        }
    }

    /// Loads the backend's supported-language list for the language selector.
    /// Keeps the built-in list when the backend is unavailable or returns none.
    pub async fn load_supported_languages(&self) {
        match self.inner.api.language_info().await {
            Ok(info) if !info.supported_languages.is_empty() => {
                debug!("Backend supports {:?}", info.supported_languages);
                self.inner.state.send_modify(|state| {
                    state.supported_languages = info.supported_languages;
                });
            }
            Ok(_) => debug!("Backend listed no supported languages, keeping defaults"),
            Err(e) => warn!("Failed to load supported languages: {e}"),
        }
    }
}

impl LocalizationInner {
    fn next_seq(&self) -> u64 {
        self.issued.fetch_add(1, Ordering::SeqCst) + 1
    }

    async fn load(&self, seq: u64, code: &str) {
        match self.api.translations(code).await {
            Ok(payload) => self.apply(seq, code, payload),
            Err(e) => warn!("Failed to load translations for '{code}': {e}"),
        }
    }

    fn apply(&self, seq: u64, code: &str, payload: TranslationsPayload) {
        if self.ordering == FetchOrdering::LatestRequest {
            let latest = self.issued.load(Ordering::SeqCst);
            if seq != latest {
                debug!("Discarding stale translations for '{code}' (request {seq}, latest {latest})");
                return;
            }
        }

        let direction = if payload.is_rtl {
            TextDirection::Rtl
        } else {
            TextDirection::Ltr
        };
        info!(
            "Loaded {} translations for '{code}' ({:?})",
            payload.translations.len(),
            direction
        );
        self.state.send_modify(|state| {
            state.translations = payload.translations;
            state.direction = direction;
            state.loaded_language = Some(code.to_string());
        });
    }
}
