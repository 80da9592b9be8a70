use super::collaborators::TokenStoreError;

/// Why a credential exchange did not produce a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthFailureKind {
    /// The exchange refused the credentials or token.
    Rejected,
    /// The exchange could not be reached or failed mid-call.
    Transport,
    /// The caller cancelled the call.
    Cancelled,
    /// The call outlived its timeout.
    TimedOut,
}

/// Errors raised by [`super::SessionManager`].
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error("{field} must not be empty")]
    MissingField { field: &'static str },
    #[error("password must be at least {minimum} characters")]
    PasswordTooShort { minimum: usize },
    #[error("passwords do not match")]
    PasswordMismatch,
    #[error("terms and conditions must be accepted")]
    TermsNotAccepted,
    #[error("{message}")]
    AuthenticationFailed {
        kind: AuthFailureKind,
        message: String,
    },
    #[error("another sign-in is already in progress")]
    SessionBusy,
    #[error(transparent)]
    TokenStore(#[from] TokenStoreError),
}

impl SessionError {
    /// Whether repeating the same call unchanged may succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::AuthenticationFailed { kind, .. } => *kind != AuthFailureKind::Rejected,
            Self::SessionBusy | Self::TokenStore(_) => true,
            Self::MissingField { .. }
            | Self::PasswordTooShort { .. }
            | Self::PasswordMismatch
            | Self::TermsNotAccepted => false,
        }
    }

    pub fn failure_kind(&self) -> Option<AuthFailureKind> {
        match self {
            Self::AuthenticationFailed { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}
