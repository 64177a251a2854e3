//! Validating webhook decision.
//!
//! Re-derives the elevated classification independently of the mutating
//! webhook, so elevated pods that bypassed mutation are still caught.
//! Checks run in order and stop at the first failure:
//! 1. Elevated pods must use the hardened runtime class
//! 2. Every container image must be in the allow-list

use std::sync::Arc;

use kube::core::DynamicObject;
use tracing::{debug, info};

use super::{HARDENED_RUNTIME_CLASS, ImageAllowlist, must_run_hardened};
use crate::webhooks::decision::{
    AdmissionDecision, REASON_DISALLOWED_IMAGE, REASON_NOT_A_POD, REASON_NOT_ELEVATED,
    REASON_RUNTIME_REQUIRED, REASON_VALID,
};
use crate::webhooks::pod::{PodSpecView, decode_pod};

/// Validating decider bound to a fixed image allow-list.
#[derive(Clone, Debug)]
pub struct ValidationDecider {
    allowlist: Arc<ImageAllowlist>,
}

impl ValidationDecider {
    pub fn new(allowlist: Arc<ImageAllowlist>) -> Self {
        Self { allowlist }
    }

    pub fn allowlist(&self) -> &ImageAllowlist {
        &self.allowlist
    }

    /// First container whose image is not allow-listed, if any.
    ///
    /// A container without an image is never allow-listed.
    fn first_disallowed_image<'a>(&self, pod: PodSpecView<'a>) -> Option<&'a str> {
        pod.containers()
            .find(|c| !self.allowlist.contains(c.image.unwrap_or_default()))
            .map(|c| c.name)
    }

    /// Decide on an already-decoded pod.
    pub fn decide(&self, pod: PodSpecView<'_>) -> AdmissionDecision {
        if !must_run_hardened(pod) {
            return AdmissionDecision::allow(REASON_NOT_ELEVATED);
        }

        if pod.runtime_class_name() != Some(HARDENED_RUNTIME_CLASS) {
            return AdmissionDecision::deny(REASON_RUNTIME_REQUIRED);
        }

        if let Some(container) = self.first_disallowed_image(pod) {
            debug!(container, "Container image is not in the allow-list");
            return AdmissionDecision::deny(REASON_DISALLOWED_IMAGE);
        }

        AdmissionDecision::allow(REASON_VALID)
    }

    /// Decode the admission object and decide. Non-pods are allowed.
    pub fn decide_object(&self, object: &DynamicObject) -> AdmissionDecision {
        let pod = match decode_pod(object) {
            Ok(pod) => pod,
            Err(e) => {
                debug!(error = %e, "Object is not a pod, skipping validation");
                return AdmissionDecision::allow(REASON_NOT_A_POD);
            }
        };

        let view = PodSpecView::new(&pod);
        info!(name = view.name(), namespace = ?view.namespace(), "Validating pod");
        self.decide(view)
    }
}
