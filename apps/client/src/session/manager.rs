use std::sync::Arc;

use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api_client::AuthApi;
use crate::models::auth::User;
use crate::session::storage::TokenStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Resolving,
    Anonymous,
    Authenticated,
}

/// Snapshot of the authentication state.
///
/// Fields are private so the pairing holds: `Authenticated` iff both token
/// and user are present, `Resolving` carries a token but no user yet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    token: Option<String>,
    user: Option<User>,
    status: SessionStatus,
}

impl Session {
    pub(crate) fn anonymous() -> Self {
        Self {
            token: None,
            user: None,
            status: SessionStatus::Anonymous,
        }
    }

    pub(crate) fn resolving(token: String) -> Self {
        Self {
            token: Some(token),
            user: None,
            status: SessionStatus::Resolving,
        }
    }

    pub(crate) fn authenticated(user: User, token: String) -> Self {
        Self {
            token: Some(token),
            user: Some(user),
            status: SessionStatus::Authenticated,
        }
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&User> {
        self.user.as_ref()
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_authenticated(&self) -> bool {
        self.status == SessionStatus::Authenticated
    }

    /// True while this session is waiting on validation of exactly `token`.
    fn is_resolving(&self, token: &str) -> bool {
        self.status == SessionStatus::Resolving && self.token.as_deref() == Some(token)
    }
}

struct SessionInner {
    store: Arc<dyn TokenStore>,
    api: Arc<dyn AuthApi>,
    state: watch::Sender<Session>,
}

impl SessionInner {
    fn clear_store(&self) {
        if let Err(e) = self.store.clear() {
            warn!("Failed to erase persisted token: {e}");
        }
    }
}

/// Owns the bearer token and current user. Cheap to clone; clones share state.
#[derive(Clone)]
pub struct SessionManager {
    inner: Arc<SessionInner>,
}

impl SessionManager {
    /// Reads the persisted token. A stored token puts the session in
    /// `Resolving` until `resolve_on_startup` validates it.
    pub fn new(store: Arc<dyn TokenStore>, api: Arc<dyn AuthApi>) -> Self {
        let initial = match store.get() {
            Ok(Some(token)) => Session::resolving(token),
            Ok(None) => Session::anonymous(),
            Err(e) => {
                warn!("Could not read persisted token, starting anonymous: {e}");
                Session::anonymous()
            }
        };
        let (state, _) = watch::channel(initial);

        Self {
            inner: Arc::new(SessionInner { store, api, state }),
        }
    }

    pub fn current_session(&self) -> Session {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every session change.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.inner.state.subscribe()
    }

    /// Records a freshly issued identity and token and persists the token.
    ///
    /// Store writes happen while the session is locked, so the persisted
    /// token always matches the session that ends up published.
    pub fn login(&self, user: User, token: String) {
        info!("Signed in as user {}", user.id);
        self.inner.state.send_modify(|session| {
            if let Err(e) = self.inner.store.set(&token) {
                warn!("Failed to persist token: {e}");
            }
            *session = Session::authenticated(user, token);
        });
    }

    /// Clears identity and token, including the persisted copy. Idempotent.
    pub fn logout(&self) {
        self.inner.state.send_if_modified(|session| {
            self.inner.clear_store();
            if *session == Session::anonymous() {
                return false;
            }
            *session = Session::anonymous();
            true
        });
    }

    /// Tells the backend about the logout (best effort), then logs out locally.
    pub async fn sign_out(&self) {
        let token = self.current_session().token;
        if let Some(token) = token {
            if let Err(e) = self.inner.api.logout(&token).await {
                debug!("Backend logout notification failed: {e}");
            }
        }
        self.logout();
    }

    /// Validates a previously stored token against `/auth/me`.
    ///
    /// Any failure (rejection or transport) drops the session; there is no
    /// retry, so a network blip at startup sends the user to the login screen.
    pub async fn resolve_on_startup(&self) {
        let token = match self.inner.store.get() {
            Ok(Some(token)) => token,
            Ok(None) => {
                debug!("No persisted token, session is anonymous");
                self.inner.state.send_replace(Session::anonymous());
                return;
            }
            Err(e) => {
                warn!("Could not read persisted token: {e}");
                self.logout();
                return;
            }
        };

        self.inner
            .state
            .send_replace(Session::resolving(token.clone()));

        match self.inner.api.current_user(&token).await {
            Ok(user) => {
                let applied = self.inner.state.send_if_modified(|session| {
                    if !session.is_resolving(&token) {
                        return false;
                    }
                    *session = Session::authenticated(user.clone(), token.clone());
                    true
                });
                if applied {
                    info!("Restored session for user {}", user.id);
                } else {
                    debug!("Session changed during validation, discarding result");
                }
            }
            Err(e) => {
                warn!(kind = e.kind(), "Stored session is no longer valid: {e}");
                let dropped = self.inner.state.send_if_modified(|session| {
                    if !session.is_resolving(&token) {
                        return false;
                    }
                    self.inner.clear_store();
                    *session = Session::anonymous();
                    true
                });
                if !dropped {
                    debug!("Session changed during validation, keeping it");
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use std::sync::mpsc;
    use std::sync::Mutex;
    use std::time::Duration;

    use crate::errors::AppError;
    use crate::session::storage::MemoryTokenStore;
    use crate::testing::{user, FakeBackend};

    /// Announces a `clear` and then takes a while to finish it.
    struct SlowClearStore {
        inner: MemoryTokenStore,
        clearing: Mutex<Option<mpsc::Sender<()>>>,
    }

    impl TokenStore for SlowClearStore {
        fn get(&self) -> Result<Option<String>, AppError> {
            self.inner.get()
        }

        fn set(&self, token: &str) -> Result<(), AppError> {
            self.inner.set(token)
        }

        fn clear(&self) -> Result<(), AppError> {
            if let Some(tx) = self.clearing.lock().unwrap().take() {
                tx.send(()).unwrap();
                std::thread::sleep(Duration::from_millis(50));
            }
            self.inner.clear()
        }
    }

    fn manager(store: Arc<MemoryTokenStore>, backend: Arc<FakeBackend>) -> SessionManager {
        SessionManager::new(store, backend)
    }

    #[tokio::test]
    async fn test_logout_clears_everything_from_any_state() {
        let store = Arc::new(MemoryTokenStore::new());
        let sessions = manager(store.clone(), FakeBackend::new());

        sessions.login(user(1, "Ana"), "tok-1".to_string());
        assert!(sessions.current_session().is_authenticated());

        sessions.logout();
        let session = sessions.current_session();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(session.user().is_none());
        assert!(session.token().is_none());
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_logout_twice_matches_logout_once() {
        let store = Arc::new(MemoryTokenStore::with_token("tok"));
        let sessions = manager(store.clone(), FakeBackend::new());

        sessions.logout();
        let once = sessions.current_session();
        sessions.logout();
        assert_eq!(sessions.current_session(), once);
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_startup_without_token_makes_no_call() {
        let backend = FakeBackend::new();
        let sessions = manager(Arc::new(MemoryTokenStore::new()), backend.clone());
        assert_eq!(sessions.current_session().status(), SessionStatus::Anonymous);

        sessions.resolve_on_startup().await;

        assert_eq!(sessions.current_session().status(), SessionStatus::Anonymous);
        assert_eq!(backend.me_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_startup_with_rejected_token_drops_it() {
        let store = Arc::new(MemoryTokenStore::with_token("expired"));
        let backend = FakeBackend::new();
        let sessions = manager(store.clone(), backend.clone());
        assert_eq!(sessions.current_session().status(), SessionStatus::Resolving);

        sessions.resolve_on_startup().await;

        let session = sessions.current_session();
        assert_eq!(session.status(), SessionStatus::Anonymous);
        assert!(session.token().is_none());
        assert_eq!(store.get().unwrap(), None);
        assert_eq!(backend.me_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_startup_with_accepted_token_authenticates() {
        let store = Arc::new(MemoryTokenStore::with_token("good"));
        let backend = FakeBackend::new();
        backend.accept_token("good", user(3, "Bob"));
        let sessions = manager(store.clone(), backend);

        sessions.resolve_on_startup().await;

        let session = sessions.current_session();
        assert_eq!(session.status(), SessionStatus::Authenticated);
        assert_eq!(session.user(), Some(&user(3, "Bob")));
        assert_eq!(session.token(), Some("good"));
        assert_eq!(store.get().unwrap().as_deref(), Some("good"));
    }

    // A transient network failure is indistinguishable from an expired token:
    // the stored token is dropped all the same.
    #[tokio::test]
    async fn test_startup_transport_failure_also_drops_token() {
        let store = Arc::new(MemoryTokenStore::with_token("good"));
        let backend = FakeBackend::new();
        backend.accept_token("good", user(3, "Bob"));
        backend.transport_down.store(true, Ordering::SeqCst);
        let sessions = manager(store.clone(), backend);

        sessions.resolve_on_startup().await;

        assert_eq!(sessions.current_session().status(), SessionStatus::Anonymous);
        assert_eq!(store.get().unwrap(), None);
    }

    #[tokio::test]
    async fn test_login_during_validation_wins() {
        let store = Arc::new(MemoryTokenStore::with_token("expired"));
        let backend = FakeBackend::new();
        backend.hold_me();
        let sessions = manager(store.clone(), backend.clone());

        let resolving = sessions.clone();
        let validation = tokio::spawn(async move { resolving.resolve_on_startup().await });
        while backend.me_calls.load(Ordering::SeqCst) == 0 {
            tokio::task::yield_now().await;
        }

        sessions.login(user(9, "Cy"), "fresh".to_string());
        backend.release_me();
        validation.await.unwrap();

        let session = sessions.current_session();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("fresh"));
        assert_eq!(store.get().unwrap().as_deref(), Some("fresh"));
    }

    #[tokio::test]
    async fn test_login_persists_and_notifies() {
        let store = Arc::new(MemoryTokenStore::new());
        let sessions = manager(store.clone(), FakeBackend::new());
        let mut rx = sessions.subscribe();

        sessions.login(user(1, "Ana"), "tok-1".to_string());

        assert!(rx.has_changed().unwrap());
        assert_eq!(rx.borrow_and_update().status(), SessionStatus::Authenticated);
        assert_eq!(store.get().unwrap().as_deref(), Some("tok-1"));
    }

    #[tokio::test]
    async fn test_sign_out_notifies_backend() {
        let backend = FakeBackend::new();
        let sessions = manager(Arc::new(MemoryTokenStore::new()), backend.clone());
        sessions.login(user(1, "Ana"), "tok-1".to_string());

        sessions.sign_out().await;

        assert_eq!(backend.logout_calls.load(Ordering::SeqCst), 1);
        assert_eq!(sessions.current_session().status(), SessionStatus::Anonymous);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_login_while_rejected_token_is_dropped_survives() {
        let (tx, rx) = mpsc::channel();
        let store = Arc::new(SlowClearStore {
            inner: MemoryTokenStore::with_token("expired"),
            clearing: Mutex::new(Some(tx)),
        });
        let sessions = SessionManager::new(store.clone(), FakeBackend::new());

        let validating = sessions.clone();
        let validation = tokio::spawn(async move { validating.resolve_on_startup().await });
        let signing_in = sessions.clone();
        let login = tokio::task::spawn_blocking(move || {
            rx.recv().unwrap();
            signing_in.login(user(9, "Cy"), "fresh".to_string());
        });

        validation.await.unwrap();
        login.await.unwrap();

        let session = sessions.current_session();
        assert!(session.is_authenticated());
        assert_eq!(session.token(), Some("fresh"));
        assert_eq!(store.get().unwrap().as_deref(), Some("fresh"));
    }
}
