use std::collections::BTreeMap;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::error::SessionError;

/// Key under which the current token is persisted.
pub const TOKEN_KEY: &str = "auth_token";
/// Cache key whose readers must refetch after the session changes.
pub const PROFILE_CACHE_KEY: &str = "/auth/profile";
/// Minimum password length accepted at registration.
pub const MIN_PASSWORD_LEN: usize = 6;

/// Login form submission, keyed either by username or by e-mail address.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Credentials {
    Username { username: String, password: String },
    Email { email: String, password: String },
}

impl Credentials {
    pub fn username(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Username {
            username: username.into(),
            password: password.into(),
        }
    }

    pub fn email(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self::Email {
            email: email.into(),
            password: password.into(),
        }
    }

    pub fn password(&self) -> &str {
        match self {
            Self::Username { password, .. } | Self::Email { password, .. } => password,
        }
    }

    /// Both fields must be present. Whitespace counts as password content, matching
    /// registration; password length is only enforced there.
    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        let (field, identity) = match self {
            Self::Username { username, .. } => ("username", username),
            Self::Email { email, .. } => ("email", email),
        };
        require_non_blank(field, identity)?;
        if self.password().is_empty() {
            return Err(SessionError::MissingField { field: "password" });
        }
        Ok(())
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Username { username, .. } => f
                .debug_struct("Username")
                .field("username", username)
                .field("password", &"<redacted>")
                .finish(),
            Self::Email { email, .. } => f
                .debug_struct("Email")
                .field("email", email)
                .field("password", &"<redacted>")
                .finish(),
        }
    }
}

/// Registration form submission.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct NewAccount {
    pub username: String,
    pub password: String,
    pub confirm_password: String,
    pub agree_to_terms: bool,
}

impl NewAccount {
    /// Checks run before the exchange is contacted. Terms and password confirmation come
    /// first so the form reports them ahead of field-level problems.
    pub(crate) fn validate(&self) -> Result<(), SessionError> {
        if !self.agree_to_terms {
            return Err(SessionError::TermsNotAccepted);
        }
        if self.confirm_password != self.password {
            return Err(SessionError::PasswordMismatch);
        }
        require_non_blank("username", &self.username)?;
        if self.password.chars().count() < MIN_PASSWORD_LEN {
            return Err(SessionError::PasswordTooShort {
                minimum: MIN_PASSWORD_LEN,
            });
        }
        Ok(())
    }

    pub(crate) fn payload(&self) -> RegistrationPayload {
        RegistrationPayload {
            username: self.username.clone(),
            password: self.password.clone(),
        }
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("username", &self.username)
            .field("agree_to_terms", &self.agree_to_terms)
            .finish_non_exhaustive()
    }
}

/// Subset of [`NewAccount`] forwarded to the credential exchange.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationPayload {
    pub username: String,
    pub password: String,
}

impl fmt::Debug for RegistrationPayload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RegistrationPayload")
            .field("username", &self.username)
            .finish_non_exhaustive()
    }
}

/// Request handed to [`super::CredentialExchange::exchange`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExchangeRequest {
    Login(Credentials),
    Register(RegistrationPayload),
}

impl ExchangeRequest {
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Login(_) => "login",
            Self::Register(_) => "registration",
        }
    }

    pub(crate) const fn fallback_message(&self) -> &'static str {
        match self {
            Self::Login(_) => "Login failed",
            Self::Register(_) => "Registration failed",
        }
    }
}

/// User record returned by the exchange. Passed through untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(flatten)]
    pub extra: BTreeMap<String, serde_json::Value>,
}

/// Successful result of a credential exchange.
#[derive(Clone, PartialEq)]
pub struct ExchangeGrant {
    pub token: String,
    pub user: UserProfile,
}

impl fmt::Debug for ExchangeGrant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ExchangeGrant")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .finish()
    }
}

/// In-memory proof of a successful authentication. Immutable once created.
#[derive(Clone, PartialEq)]
pub struct Session {
    token: String,
    user: UserProfile,
    created_at: DateTime<Utc>,
}

impl Session {
    pub(crate) fn new(token: String, user: UserProfile) -> Self {
        Self {
            token,
            user,
            created_at: Utc::now(),
        }
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn user(&self) -> &UserProfile {
        &self.user
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("token", &"<redacted>")
            .field("user", &self.user)
            .field("created_at", &self.created_at)
            .finish()
    }
}

/// Identifiers are compared after trimming; passwords are taken verbatim.
fn require_non_blank(field: &'static str, value: &str) -> Result<(), SessionError> {
    if value.trim().is_empty() {
        Err(SessionError::MissingField { field })
    } else {
        Ok(())
    }
}
