use super::common::*;

use crate::workflows::session::collaborators::{ExchangeFailure, TokenStore};
use crate::workflows::session::domain::{
    Credentials, ExchangeRequest, RegistrationPayload, MIN_PASSWORD_LEN, PROFILE_CACHE_KEY,
    TOKEN_KEY,
};
use crate::workflows::session::{CallOptions, SessionError};

#[tokio::test]
async fn unaccepted_terms_fail_before_any_exchange_call() {
    let (manager, store, _) = build_manager();
    let exchange = StubExchange::granting("token");

    let err = manager
        .register(account("abc12", "abc12", false), &exchange, CallOptions::default())
        .await
        .expect_err("terms required");

    assert!(matches!(err, SessionError::TermsNotAccepted));
    assert_eq!(exchange.calls(), 0);
    assert_eq!(store.get(TOKEN_KEY).expect("readable"), None);
}

#[tokio::test]
async fn mismatched_passwords_fail_before_any_exchange_call() {
    let (manager, _, _) = build_manager();
    let exchange = StubExchange::granting("token");

    let err = manager
        .register(
            account("secret1", "secret2", true),
            &exchange,
            CallOptions::default(),
        )
        .await
        .expect_err("mismatch");

    assert!(matches!(err, SessionError::PasswordMismatch));
    assert!(!err.is_retryable());
    assert_eq!(exchange.calls(), 0);
}

#[tokio::test]
async fn short_passwords_are_refused_at_registration() {
    let (manager, _, _) = build_manager();
    let exchange = StubExchange::granting("token");

    let err = manager
        .register(account("abc12", "abc12", true), &exchange, CallOptions::default())
        .await
        .expect_err("too short");

    match err {
        SessionError::PasswordTooShort { minimum } => assert_eq!(minimum, MIN_PASSWORD_LEN),
        other => panic!("expected short password, got {other:?}"),
    }
    assert_eq!(exchange.calls(), 0);
}

#[tokio::test]
async fn empty_username_is_refused_at_registration() {
    let (manager, _, _) = build_manager();
    let exchange = StubExchange::granting("token");
    let mut new_account = account("secret1", "secret1", true);
    new_account.username.clear();

    let err = manager
        .register(new_account, &exchange, CallOptions::default())
        .await
        .expect_err("username required");

    assert!(matches!(err, SessionError::MissingField { field: "username" }));
    assert_eq!(exchange.calls(), 0);
}

#[tokio::test]
async fn successful_registration_establishes_a_session() {
    let (manager, store, cache) = build_manager();
    let exchange = StubExchange::granting("token-new");

    let session = manager
        .register(
            account("secret1", "secret1", true),
            &exchange,
            CallOptions::default(),
        )
        .await
        .expect("registration succeeds");

    assert_eq!(
        store.get(TOKEN_KEY).expect("readable"),
        Some(session.token().to_string())
    );
    assert_eq!(cache.count(PROFILE_CACHE_KEY), 1);
    assert_eq!(
        exchange.requests(),
        vec![ExchangeRequest::Register(RegistrationPayload {
            username: "john".to_string(),
            password: "secret1".to_string(),
        })]
    );
}

#[tokio::test]
async fn registration_failures_fall_back_to_registration_message() {
    let (manager, store, _) = build_manager();
    let exchange = StubExchange::failing(ExchangeFailure::Rejected {
        message: Some("   ".to_string()),
    });

    let err = manager
        .register(
            account("secret1", "secret1", true),
            &exchange,
            CallOptions::default(),
        )
        .await
        .expect_err("registration rejected");

    assert_eq!(err.to_string(), "Registration failed");
    assert_eq!(store.get(TOKEN_KEY).expect("readable"), None);
}

#[tokio::test]
async fn whitespace_password_accepted_at_registration_also_logs_in() {
    let (manager, _, _) = build_manager();
    let exchange = StubExchange::granting("token-spaces");
    let password = "      ";

    manager
        .register(account(password, password, true), &exchange, CallOptions::default())
        .await
        .expect("six spaces meet the minimum length");
    manager.logout().expect("logout");

    manager
        .authenticate(
            Credentials::username("john", password),
            &exchange,
            CallOptions::default(),
        )
        .await
        .expect("the registered password logs in");

    assert_eq!(exchange.calls(), 2);
    assert_eq!(
        exchange.requests()[1],
        ExchangeRequest::Login(Credentials::username("john", password))
    );
}
