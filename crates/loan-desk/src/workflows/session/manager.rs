use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use super::collaborators::{CacheInvalidator, CredentialExchange, ExchangeFailure, TokenStore};
use super::domain::{
    Credentials, ExchangeRequest, NewAccount, Session, UserProfile, PROFILE_CACHE_KEY, TOKEN_KEY,
};
use super::error::{AuthFailureKind, SessionError};
use crate::config::SessionConfig;

const RESUME_FALLBACK_MESSAGE: &str = "Session restore failed";

/// Per-call controls for a credential exchange.
#[derive(Debug, Clone, Default)]
pub struct CallOptions {
    pub timeout: Option<Duration>,
    pub cancel: Option<CancellationToken>,
}

impl CallOptions {
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn with_cancel(mut self, cancel: CancellationToken) -> Self {
        self.cancel = Some(cancel);
        self
    }
}

/// Owns the authenticated session for one caller context.
///
/// Successful calls always run in the same order: the exchange completes, the token is
/// persisted, the session is installed, then [`PROFILE_CACHE_KEY`] is invalidated once. A
/// failure at any step before persistence leaves the previous session and stored token as
/// they were. Only one exchange-backed call runs at a time; overlapping calls get
/// [`SessionError::SessionBusy`].
pub struct SessionManager<S, C> {
    store: Arc<S>,
    cache: Arc<C>,
    session: RwLock<Option<Session>>,
    in_flight: AtomicBool,
    default_timeout: Option<Duration>,
}

impl<S, C> SessionManager<S, C>
where
    S: TokenStore + 'static,
    C: CacheInvalidator + 'static,
{
    pub fn new(store: Arc<S>, cache: Arc<C>) -> Self {
        Self {
            store,
            cache,
            session: RwLock::new(None),
            in_flight: AtomicBool::new(false),
            default_timeout: None,
        }
    }

    pub fn from_config(store: Arc<S>, cache: Arc<C>, config: &SessionConfig) -> Self {
        Self::new(store, cache).with_default_timeout(config.auth_timeout)
    }

    /// Timeout applied when a call does not supply its own.
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = Some(timeout);
        self
    }

    pub fn current(&self) -> Option<Session> {
        self.session.read().expect("session lock poisoned").clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.session.read().expect("session lock poisoned").is_some()
    }

    pub async fn authenticate<E>(
        &self,
        credentials: Credentials,
        exchange: &E,
        options: CallOptions,
    ) -> Result<Session, SessionError>
    where
        E: CredentialExchange + ?Sized,
    {
        credentials.validate()?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let request = ExchangeRequest::Login(credentials);
        self.exchange_and_establish(request, exchange, &options)
            .await
    }

    pub async fn register<E>(
        &self,
        account: NewAccount,
        exchange: &E,
        options: CallOptions,
    ) -> Result<Session, SessionError>
    where
        E: CredentialExchange + ?Sized,
    {
        account.validate()?;
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let request = ExchangeRequest::Register(account.payload());
        self.exchange_and_establish(request, exchange, &options)
            .await
    }

    /// Restore a session from the persisted token, if one exists.
    ///
    /// A token the exchange rejects is cleared and `Ok(None)` is returned. Transport failures,
    /// timeouts and cancellation keep the token and surface as errors.
    pub async fn resume<E>(
        &self,
        exchange: &E,
        options: CallOptions,
    ) -> Result<Option<Session>, SessionError>
    where
        E: CredentialExchange + ?Sized,
    {
        let _in_flight = InFlight::acquire(&self.in_flight)?;

        let Some(token) = self.store.get(TOKEN_KEY)? else {
            debug!("no persisted token to resume");
            return Ok(None);
        };

        let profile = self
            .bounded(exchange.profile(&token), &options, RESUME_FALLBACK_MESSAGE)
            .await;

        match profile {
            Ok(user) => Ok(Some(self.install(token, user, "resume"))),
            Err(SessionError::AuthenticationFailed {
                kind: AuthFailureKind::Rejected,
                message,
            }) => {
                warn!(%message, "persisted token rejected; clearing it");
                self.store.clear(TOKEN_KEY)?;
                self.session.write().expect("session lock poisoned").take();
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Discard the persisted token and the session. Safe to call with no active session.
    ///
    /// If the token cannot be cleared the session stays installed, so memory and storage
    /// never disagree about who is signed in.
    pub fn logout(&self) -> Result<(), SessionError> {
        self.store.clear(TOKEN_KEY)?;
        let previous = self.session.write().expect("session lock poisoned").take();

        if previous.is_some() {
            info!("session ended");
        } else {
            debug!("logout without an active session");
        }
        Ok(())
    }

    async fn exchange_and_establish<E>(
        &self,
        request: ExchangeRequest,
        exchange: &E,
        options: &CallOptions,
    ) -> Result<Session, SessionError>
    where
        E: CredentialExchange + ?Sized,
    {
        let kind = request.kind();
        let grant = self
            .bounded(exchange.exchange(&request), options, request.fallback_message())
            .await
            .map_err(|err| {
                warn!(kind, error = %err, "credential exchange failed");
                err
            })?;

        self.store.set(TOKEN_KEY, &grant.token)?;
        Ok(self.install(grant.token, grant.user, kind))
    }

    fn install(&self, token: String, user: UserProfile, kind: &'static str) -> Session {
        let session = Session::new(token, user);
        *self.session.write().expect("session lock poisoned") = Some(session.clone());
        self.cache.invalidate(PROFILE_CACHE_KEY);
        info!(kind, created_at = %session.created_at(), "session established");
        session
    }

    async fn bounded<T, F>(
        &self,
        call: F,
        options: &CallOptions,
        fallback: &'static str,
    ) -> Result<T, SessionError>
    where
        F: Future<Output = Result<T, ExchangeFailure>>,
    {
        let cancel = options.cancel.clone().unwrap_or_default();
        let timeout = options.timeout.or(self.default_timeout);

        let timed = async {
            match timeout {
                Some(limit) => tokio::time::timeout(limit, call).await.ok(),
                None => Some(call.await),
            }
        };

        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(SessionError::AuthenticationFailed {
                kind: AuthFailureKind::Cancelled,
                message: format!("{fallback}: request cancelled"),
            }),
            outcome = timed => match outcome {
                Some(Ok(value)) => Ok(value),
                Some(Err(failure)) => Err(failed(failure, fallback)),
                None => Err(SessionError::AuthenticationFailed {
                    kind: AuthFailureKind::TimedOut,
                    message: format!("{fallback}: request timed out"),
                }),
            },
        }
    }
}

fn failed(failure: ExchangeFailure, fallback: &str) -> SessionError {
    let kind = match failure {
        ExchangeFailure::Rejected { .. } => AuthFailureKind::Rejected,
        ExchangeFailure::Transport { .. } => AuthFailureKind::Transport,
    };
    let message = failure.message().unwrap_or(fallback).to_owned();
    SessionError::AuthenticationFailed { kind, message }
}

/// Marks an exchange-backed call as running until dropped.
struct InFlight<'a>(&'a AtomicBool);

impl<'a> InFlight<'a> {
    fn acquire(flag: &'a AtomicBool) -> Result<Self, SessionError> {
        flag.compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map(|_| Self(flag))
            .map_err(|_| SessionError::SessionBusy)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
