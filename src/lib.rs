//! kata-admission library crate
//!
//! Admission webhooks that keep elevated pods (root or privileged) on the
//! kata-containers runtime. This module exports the policies, the webhook
//! server, configuration and the health server.

pub mod config;
pub mod health;
pub mod webhooks;

pub use config::{Config, ConfigError};
pub use health::HealthState;
pub use webhooks::{
    AdmissionDecision, ImageAllowlist, PodSpecView, ValidationDecider, WEBHOOK_CERT_PATH,
    WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, WebhookState, run_webhook_server,
};
