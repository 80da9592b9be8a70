use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;

use crate::workflows::session::collaborators::{
    CredentialExchange, ExchangeFailure, TokenStore, TokenStoreError,
};
use crate::workflows::session::domain::{
    Credentials, ExchangeGrant, ExchangeRequest, NewAccount, UserProfile,
};
use crate::workflows::session::store::{MemoryTokenStore, RecordingCacheInvalidator};
use crate::workflows::session::SessionManager;

/// Memory store whose `clear` can be switched to fail.
#[derive(Default)]
pub(super) struct StickyTokenStore {
    pub(super) inner: MemoryTokenStore,
    pub(super) refuse_clear: AtomicBool,
}

impl TokenStore for StickyTokenStore {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError> {
        self.inner.set(key, value)
    }

    fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError> {
        self.inner.get(key)
    }

    fn clear(&self, key: &str) -> Result<(), TokenStoreError> {
        if self.refuse_clear.load(Ordering::SeqCst) {
            return Err(TokenStoreError::Unavailable("disk is read-only".to_string()));
        }
        self.inner.clear(key)
    }
}

pub(super) type TestManager = SessionManager<MemoryTokenStore, RecordingCacheInvalidator>;

pub(super) fn build_manager() -> (
    TestManager,
    Arc<MemoryTokenStore>,
    Arc<RecordingCacheInvalidator>,
) {
    let store = Arc::new(MemoryTokenStore::default());
    let cache = Arc::new(RecordingCacheInvalidator::default());
    let manager = SessionManager::new(store.clone(), cache.clone());
    (manager, store, cache)
}

pub(super) fn john() -> UserProfile {
    UserProfile {
        id: "user-42".to_string(),
        display_name: Some("John Doe".to_string()),
        username: Some("john".to_string()),
        email: Some("john@example.com".to_string()),
        ..UserProfile::default()
    }
}

pub(super) fn login() -> Credentials {
    Credentials::username("john", "hunter2")
}

pub(super) fn account(password: &str, confirm: &str, agree: bool) -> NewAccount {
    NewAccount {
        username: "john".to_string(),
        password: password.to_string(),
        confirm_password: confirm.to_string(),
        agree_to_terms: agree,
    }
}

/// Scripted exchange that records every request it receives.
pub(super) struct StubExchange {
    grant: Result<ExchangeGrant, ExchangeFailure>,
    profile: Result<UserProfile, ExchangeFailure>,
    delay: Option<Duration>,
    calls: AtomicUsize,
    requests: Mutex<Vec<ExchangeRequest>>,
    profile_tokens: Mutex<Vec<String>>,
}

impl StubExchange {
    pub(super) fn granting(token: &str) -> Self {
        Self {
            grant: Ok(ExchangeGrant {
                token: token.to_string(),
                user: john(),
            }),
            profile: Ok(john()),
            delay: None,
            calls: AtomicUsize::new(0),
            requests: Mutex::new(Vec::new()),
            profile_tokens: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn failing(failure: ExchangeFailure) -> Self {
        Self {
            grant: Err(failure.clone()),
            profile: Err(failure),
            ..Self::granting("unused")
        }
    }

    pub(super) fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub(super) fn with_profile(mut self, profile: Result<UserProfile, ExchangeFailure>) -> Self {
        self.profile = profile;
        self
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn requests(&self) -> Vec<ExchangeRequest> {
        self.requests.lock().expect("requests mutex poisoned").clone()
    }

    pub(super) fn profile_tokens(&self) -> Vec<String> {
        self.profile_tokens
            .lock()
            .expect("profile mutex poisoned")
            .clone()
    }

    async fn pause(&self) {
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl CredentialExchange for StubExchange {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeGrant, ExchangeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests
            .lock()
            .expect("requests mutex poisoned")
            .push(request.clone());
        self.pause().await;
        self.grant.clone()
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, ExchangeFailure> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.profile_tokens
            .lock()
            .expect("profile mutex poisoned")
            .push(token.to_string());
        self.pause().await;
        self.profile.clone()
    }
}
