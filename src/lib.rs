//! Deterministic synthetic machine identity, and the classifiers that decide
//! whether a network request, file read or subprocess may see the real one.

pub mod command_policy;
pub mod config;
pub mod gateways;
pub mod hardware;
pub mod identity;
pub mod logging;
pub mod request_policy;
pub mod shield;
pub mod stats;
pub mod store;

#[cfg(test)]
mod classification_tests;

pub use config::{ConfigError, ShieldConfig};
pub use gateways::GatewayError;
pub use identity::{generate, IdentityProfile};
pub use request_policy::{ClassificationDecision, Policy, RequestClassifier};
pub use shield::{ActiveIdentity, Shield, ShieldStatus};
pub use store::{ProfileStore, StoreError};
