use async_trait::async_trait;

use super::domain::{ExchangeGrant, ExchangeRequest, UserProfile};

/// Failure reported by a [`CredentialExchange`]. The message, when present, is shown to the
/// user verbatim.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ExchangeFailure {
    #[error("credential exchange rejected the request")]
    Rejected { message: Option<String> },
    #[error("credential exchange transport failed")]
    Transport { message: Option<String> },
}

impl ExchangeFailure {
    pub fn rejected(message: impl Into<String>) -> Self {
        Self::Rejected {
            message: Some(message.into()),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: Some(message.into()),
        }
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            Self::Rejected { message } | Self::Transport { message } => message
                .as_deref()
                .filter(|message| !message.trim().is_empty()),
        }
    }
}

/// Remote authority that trades credentials for a token and user record.
#[async_trait]
pub trait CredentialExchange: Send + Sync {
    async fn exchange(&self, request: &ExchangeRequest) -> Result<ExchangeGrant, ExchangeFailure>;

    /// Look up the user behind a previously issued token.
    async fn profile(&self, token: &str) -> Result<UserProfile, ExchangeFailure>;
}

/// Durable key-value surface holding the current token.
pub trait TokenStore: Send + Sync {
    fn set(&self, key: &str, value: &str) -> Result<(), TokenStoreError>;
    fn get(&self, key: &str) -> Result<Option<String>, TokenStoreError>;
    /// Removing an absent key succeeds.
    fn clear(&self, key: &str) -> Result<(), TokenStoreError>;
}

#[derive(Debug, thiserror::Error)]
pub enum TokenStoreError {
    #[error("token store io failure: {0}")]
    Io(#[from] std::io::Error),
    #[error("token store contents are corrupt: {0}")]
    Corrupt(#[from] serde_json::Error),
    #[error("token store unavailable: {0}")]
    Unavailable(String),
}

/// Signals readers of a cached key to refetch.
pub trait CacheInvalidator: Send + Sync {
    fn invalidate(&self, key: &str);
}
