use crate::config::ConfigError;
use crate::telemetry::TelemetryError;
use crate::workflows::approval::{LoanError, LoanServiceError, RepositoryError};
use crate::workflows::session::SessionError;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use std::fmt;

#[derive(Debug)]
pub enum AppError {
    Config(ConfigError),
    Telemetry(TelemetryError),
    Io(std::io::Error),
    Server(axum::Error),
    Loan(LoanServiceError),
    Session(SessionError),
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AppError::Config(err) => write!(f, "configuration error: {}", err),
            AppError::Telemetry(err) => write!(f, "telemetry error: {}", err),
            AppError::Io(err) => write!(f, "io error: {}", err),
            AppError::Server(err) => write!(f, "server error: {}", err),
            AppError::Loan(err) => write!(f, "loan workflow error: {}", err),
            AppError::Session(err) => write!(f, "session error: {}", err),
        }
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            AppError::Config(err) => Some(err),
            AppError::Telemetry(err) => Some(err),
            AppError::Io(err) => Some(err),
            AppError::Server(err) => Some(err),
            AppError::Loan(err) => Some(err),
            AppError::Session(err) => Some(err),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Loan(LoanServiceError::Loan(LoanError::InvalidTransition { .. })) => {
                StatusCode::CONFLICT
            }
            AppError::Loan(LoanServiceError::Loan(LoanError::InvalidAmount)) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            AppError::Loan(LoanServiceError::Repository(RepositoryError::NotFound)) => {
                StatusCode::NOT_FOUND
            }
            AppError::Loan(_)
            | AppError::Session(_)
            | AppError::Config(_)
            | AppError::Telemetry(_)
            | AppError::Io(_)
            | AppError::Server(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Loan errors are reported without the family prefix.
        let message = match &self {
            AppError::Loan(err) => err.to_string(),
            other => other.to_string(),
        };
        let body = Json(json!({ "error": message }));
        (status, body).into_response()
    }
}

impl From<ConfigError> for AppError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<TelemetryError> for AppError {
    fn from(value: TelemetryError) -> Self {
        Self::Telemetry(value)
    }
}

impl From<std::io::Error> for AppError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<axum::Error> for AppError {
    fn from(value: axum::Error) -> Self {
        Self::Server(value)
    }
}

impl From<LoanServiceError> for AppError {
    fn from(value: LoanServiceError) -> Self {
        Self::Loan(value)
    }
}

impl From<SessionError> for AppError {
    fn from(value: SessionError) -> Self {
        Self::Session(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::workflows::approval::{LoanAction, LoanStatus};

    #[test]
    fn maps_loan_errors_to_status_codes() {
        let conflict = AppError::from(LoanServiceError::Loan(LoanError::InvalidTransition {
            from: LoanStatus::Approved,
            action: LoanAction::Reject,
        }));
        assert_eq!(conflict.into_response().status(), StatusCode::CONFLICT);

        let invalid = AppError::from(LoanServiceError::Loan(LoanError::InvalidAmount));
        assert_eq!(
            invalid.into_response().status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );

        let missing = AppError::from(LoanServiceError::Repository(RepositoryError::NotFound));
        assert_eq!(missing.into_response().status(), StatusCode::NOT_FOUND);

        let down = AppError::from(LoanServiceError::Repository(RepositoryError::Unavailable(
            "offline".to_string(),
        )));
        assert_eq!(
            down.into_response().status(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn display_prefixes_the_error_family() {
        let err = AppError::from(SessionError::TermsNotAccepted);
        assert_eq!(
            err.to_string(),
            "session error: terms and conditions must be accepted"
        );
    }
}
