use async_trait::async_trait;
use loan_desk::workflows::approval::{
    LoanEntry, LoanId, LoanRepository, LoanStatus, RepositoryError,
};
use loan_desk::workflows::session::{
    CredentialExchange, Credentials, ExchangeFailure, ExchangeGrant, ExchangeRequest, UserProfile,
};
use metrics_exporter_prometheus::PrometheusHandle;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

#[derive(Clone)]
pub(crate) struct AppState {
    pub(crate) readiness: Arc<AtomicBool>,
    pub(crate) metrics: Arc<PrometheusHandle>,
}

#[derive(Default, Clone)]
pub(crate) struct InMemoryLoanRepository {
    entries: Arc<Mutex<HashMap<LoanId, LoanEntry>>>,
}

impl LoanRepository for InMemoryLoanRepository {
    fn insert(&self, entry: LoanEntry) -> Result<LoanEntry, RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        if guard.contains_key(&entry.loan_id) {
            return Err(RepositoryError::Conflict);
        }
        guard.insert(entry.loan_id.clone(), entry.clone());
        Ok(entry)
    }

    fn update(&self, entry: LoanEntry, expected: LoanStatus) -> Result<(), RepositoryError> {
        let mut guard = self.entries.lock().expect("repository mutex poisoned");
        let found = guard
            .get(&entry.loan_id)
            .ok_or(RepositoryError::NotFound)?
            .record
            .status();
        if found != expected {
            return Err(RepositoryError::StatusChanged { found });
        }
        guard.insert(entry.loan_id.clone(), entry);
        Ok(())
    }

    fn fetch(&self, id: &LoanId) -> Result<Option<LoanEntry>, RepositoryError> {
        let guard = self.entries.lock().expect("repository mutex poisoned");
        Ok(guard.get(id).cloned())
    }
}

struct Account {
    password: String,
    profile: UserProfile,
}

/// Credential exchange that keeps accounts and issued tokens in process memory.
#[derive(Default)]
pub(crate) struct InMemoryCredentialExchange {
    accounts: Mutex<HashMap<String, Account>>,
    tokens: Mutex<HashMap<String, UserProfile>>,
    sequence: AtomicU64,
}

impl InMemoryCredentialExchange {
    pub(crate) fn with_account(username: &str, email: &str, password: &str) -> Self {
        let exchange = Self::default();
        exchange.add_account(username, Some(email), password);
        exchange
    }

    fn add_account(&self, username: &str, email: Option<&str>, password: &str) -> UserProfile {
        let mut accounts = self.accounts.lock().expect("accounts mutex poisoned");
        let profile = UserProfile {
            id: format!("user-{:04}", accounts.len() + 1),
            display_name: Some(username.to_string()),
            username: Some(username.to_string()),
            email: email.map(str::to_string),
            ..UserProfile::default()
        };
        accounts.insert(
            username.to_string(),
            Account {
                password: password.to_string(),
                profile: profile.clone(),
            },
        );
        profile
    }

    fn login(&self, credentials: &Credentials) -> Result<UserProfile, ExchangeFailure> {
        let accounts = self.accounts.lock().expect("accounts mutex poisoned");
        let account = match credentials {
            Credentials::Username { username, .. } => accounts.get(username),
            Credentials::Email { email, .. } => accounts
                .values()
                .find(|account| account.profile.email.as_deref() == Some(email.as_str())),
        };

        match account {
            Some(account) if account.password == credentials.password() => {
                Ok(account.profile.clone())
            }
            _ => Err(ExchangeFailure::rejected("Invalid username or password")),
        }
    }

    fn issue(&self, profile: UserProfile) -> ExchangeGrant {
        let id = self.sequence.fetch_add(1, Ordering::Relaxed) + 1;
        let token = format!("demo-token-{id:06}");
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .insert(token.clone(), profile.clone());
        ExchangeGrant {
            token,
            user: profile,
        }
    }
}

#[async_trait]
impl CredentialExchange for InMemoryCredentialExchange {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeGrant, ExchangeFailure> {
        let profile = match request {
            ExchangeRequest::Login(credentials) => self.login(credentials)?,
            ExchangeRequest::Register(payload) => {
                let taken = self
                    .accounts
                    .lock()
                    .expect("accounts mutex poisoned")
                    .contains_key(&payload.username);
                if taken {
                    return Err(ExchangeFailure::rejected("Username is already taken"));
                }
                self.add_account(&payload.username, None, &payload.password)
            }
        };
        Ok(self.issue(profile))
    }

    async fn profile(&self, token: &str) -> Result<UserProfile, ExchangeFailure> {
        self.tokens
            .lock()
            .expect("token mutex poisoned")
            .get(token)
            .cloned()
            .ok_or_else(|| ExchangeFailure::rejected("Session expired"))
    }
}
