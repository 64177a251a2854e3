//! Trusted-owner check for the mutating webhook.

use super::TRUSTED_OWNER_KIND;
use crate::webhooks::pod::PodSpecView;

/// Whether any owner reference of the pod has kind exactly `Build`.
pub fn is_build_owned(pod: PodSpecView<'_>) -> bool {
    pod.owner_references()
        .iter()
        .any(|owner| owner.kind == TRUSTED_OWNER_KIND)
}
