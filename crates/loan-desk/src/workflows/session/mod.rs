//! Authentication session lifecycle: credential submission, token persistence, profile
//! cache invalidation, and restoring a session from a persisted token.

pub mod collaborators;
pub mod domain;
pub mod error;
pub mod manager;
pub mod store;

#[cfg(test)]
mod tests;

pub use collaborators::{
    CacheInvalidator, CredentialExchange, ExchangeFailure, TokenStore, TokenStoreError,
};
pub use domain::{
    Credentials, ExchangeGrant, ExchangeRequest, NewAccount, RegistrationPayload, Session,
    UserProfile, MIN_PASSWORD_LEN, PROFILE_CACHE_KEY, TOKEN_KEY,
};
pub use error::{AuthFailureKind, SessionError};
pub use manager::{CallOptions, SessionManager};
pub use store::{FileTokenStore, MemoryTokenStore, RecordingCacheInvalidator};
