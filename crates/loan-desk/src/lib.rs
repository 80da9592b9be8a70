//! Core of the loan application screens: the loan-approval status state machine and the
//! authentication session lifecycle, plus the configuration, telemetry and error plumbing
//! shared with the service binary.

pub mod config;
pub mod error;
pub mod telemetry;
pub mod workflows;
