//! Admission webhook server.
//!
//! Provides HTTPS endpoints for Kubernetes admission webhooks:
//! - `POST /mutate-pods` (MutatingWebhookConfiguration)
//! - `POST /validate-pods` (ValidatingWebhookConfiguration)
//!
//! TLS material is expected at /etc/webhook/certs/, typically mounted from
//! a cert-manager issued secret.

use std::sync::Arc;
use std::time::Instant;

use axum::{Json, Router, extract::State, http::StatusCode, response::IntoResponse, routing::post};
use kube::core::DynamicObject;
use kube::core::admission::{AdmissionRequest, AdmissionResponse, AdmissionReview};
use thiserror::Error;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::health::HealthState;
use crate::webhooks::decision::{AdmissionDecision, REASON_NO_OBJECT, REASON_PATCH_ENCODING_FAILED};
use crate::webhooks::policies::{ValidationDecider, mutation};

/// Default path to webhook TLS certificate
pub const WEBHOOK_CERT_PATH: &str = "/etc/webhook/certs/tls.crt";
/// Default path to webhook TLS private key
pub const WEBHOOK_KEY_PATH: &str = "/etc/webhook/certs/tls.key";
/// Default webhook server port
pub const WEBHOOK_PORT: u16 = 9443;

/// Which admission stage a request is addressed to
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WebhookKind {
    Mutate,
    Validate,
}

impl WebhookKind {
    pub fn as_str(self) -> &'static str {
        match self {
            WebhookKind::Mutate => "mutate",
            WebhookKind::Validate => "validate",
        }
    }
}

impl std::fmt::Display for WebhookKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Shared state for webhook handlers
pub struct WebhookState {
    pub validator: ValidationDecider,
    pub health: Arc<HealthState>,
}

impl WebhookState {
    pub fn new(config: &Config, health: Arc<HealthState>) -> Self {
        Self {
            validator: ValidationDecider::new(config.allowlist.clone()),
            health,
        }
    }

    fn decide(&self, kind: WebhookKind, object: &DynamicObject) -> AdmissionDecision {
        match kind {
            WebhookKind::Mutate => mutation::decide_object(object),
            WebhookKind::Validate => self.validator.decide_object(object),
        }
    }
}

/// Allow the request, carrying a reason in status.message.
/// kube-rs only sets the message on deny(), so set it directly here.
fn allow_with_reason(mut response: AdmissionResponse, reason: &str) -> AdmissionResponse {
    response.result.message = reason.to_string();
    response
}

/// Translate a decision into the wire response for `request`.
fn into_admission_response(
    request: &AdmissionRequest<DynamicObject>,
    decision: AdmissionDecision,
) -> AdmissionResponse {
    let response = AdmissionResponse::from(request);
    match decision {
        AdmissionDecision::Allow { reason } => allow_with_reason(response, reason),
        AdmissionDecision::Deny { reason } => response.deny(reason),
        AdmissionDecision::Patch { patches, reason } => {
            match allow_with_reason(response, reason).with_patch(json_patch::Patch(patches)) {
                Ok(patched) => patched,
                Err(e) => {
                    // Fail closed: an elevated pod must not be admitted unpatched
                    error!(uid = %request.uid, error = %e, "Failed to encode JSON patch");
                    AdmissionResponse::from(request).deny(REASON_PATCH_ENCODING_FAILED)
                }
            }
        }
    }
}

/// Evaluate one AdmissionReview and build the review to send back.
///
/// Split from the axum handlers so the full request/response contract can
/// be exercised without a listener.
pub fn review_response(
    state: &WebhookState,
    kind: WebhookKind,
    review: AdmissionReview<DynamicObject>,
) -> (StatusCode, AdmissionReview<DynamicObject>) {
    let request: AdmissionRequest<DynamicObject> = match review.try_into() {
        Ok(req) => req,
        Err(e) => {
            error!(webhook = %kind, error = %e, "Failed to extract admission request");
            return (
                StatusCode::BAD_REQUEST,
                AdmissionResponse::invalid(format!("Invalid AdmissionReview: {}", e)).into_review(),
            );
        }
    };

    let uid = &request.uid;
    debug!(
        uid = %uid,
        webhook = %kind,
        operation = ?request.operation,
        namespace = ?request.namespace,
        name = %request.name,
        "Processing admission request"
    );

    // DELETE and CONNECT carry no object to evaluate
    let Some(object) = request.object.as_ref() else {
        info!(uid = %uid, webhook = %kind, operation = ?request.operation, "Admission request allowed (no object)");
        let response = allow_with_reason(AdmissionResponse::from(&request), REASON_NO_OBJECT);
        return (StatusCode::OK, response.into_review());
    };

    let started = Instant::now();
    let decision = state.decide(kind, object);
    state.health.metrics.record_admission(
        kind.as_str(),
        decision.label(),
        started.elapsed().as_secs_f64(),
    );

    if decision.is_allowed() {
        info!(
            uid = %uid,
            webhook = %kind,
            decision = decision.label(),
            reason = decision.reason(),
            "Admission request allowed"
        );
    } else {
        warn!(
            uid = %uid,
            webhook = %kind,
            reason = decision.reason(),
            "Admission request denied"
        );
    }

    (
        StatusCode::OK,
        into_admission_response(&request, decision).into_review(),
    )
}

/// Create the webhook router
pub fn create_webhook_router(state: Arc<WebhookState>) -> Router {
    Router::new()
        .route("/mutate-pods", post(mutate_pods))
        .route("/validate-pods", post(validate_pods))
        .with_state(state)
}

async fn mutate_pods(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let (status, review) = review_response(&state, WebhookKind::Mutate, review);
    (status, Json(review))
}

async fn validate_pods(
    State(state): State<Arc<WebhookState>>,
    Json(review): Json<AdmissionReview<DynamicObject>>,
) -> impl IntoResponse {
    let (status, review) = review_response(&state, WebhookKind::Validate, review);
    (status, Json(review))
}

/// Errors that can occur when running the webhook server
#[derive(Error, Debug)]
pub enum WebhookError {
    /// TLS configuration error
    #[error("TLS configuration error: {0}")]
    TlsConfig(String),
    /// Server error
    #[error("Webhook server error: {0}")]
    Server(String),
}

/// Run the webhook server with TLS
///
/// Binds to 0.0.0.0:9443 and serves /mutate-pods and /validate-pods.
///
/// # Arguments
/// * `state` - Shared handler state (allow-list, metrics)
/// * `cert_path` - Path to TLS certificate file (PEM format)
/// * `key_path` - Path to TLS private key file (PEM format)
pub async fn run_webhook_server(
    state: Arc<WebhookState>,
    cert_path: &str,
    key_path: &str,
) -> Result<(), WebhookError> {
    use axum_server::tls_rustls::RustlsConfig;
    use std::net::SocketAddr;
    use std::path::PathBuf;

    let app = create_webhook_router(state);

    let config = RustlsConfig::from_pem_file(PathBuf::from(cert_path), PathBuf::from(key_path))
        .await
        .map_err(|e| WebhookError::TlsConfig(e.to_string()))?;

    let addr = SocketAddr::from(([0, 0, 0, 0], WEBHOOK_PORT));
    info!(port = WEBHOOK_PORT, "Webhook server listening with TLS");

    axum_server::bind_rustls(addr, config)
        .serve(app.into_make_service())
        .await
        .map_err(|e| WebhookError::Server(e.to_string()))?;

    Ok(())
}
