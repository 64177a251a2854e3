//! Admission webhooks for the hardened pod runtime.
//!
//! - Mutating (`/mutate-pods`): patches elevated `Build` pods onto kata
//! - Validating (`/validate-pods`): rejects elevated pods that are not on
//!   kata or use images outside the allow-list

pub mod decision;
pub mod pod;
pub mod policies;
mod server;

pub use decision::AdmissionDecision;
pub use pod::{ContainerView, PodSpecView, decode_pod};
pub use policies::{ImageAllowlist, ValidationDecider};
pub use server::{
    WEBHOOK_CERT_PATH, WEBHOOK_KEY_PATH, WEBHOOK_PORT, WebhookError, WebhookKind, WebhookState,
    create_webhook_router, review_response, run_webhook_server,
};
