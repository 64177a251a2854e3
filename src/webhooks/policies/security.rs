//! Classification of pods that must run under the hardened runtime.
//!
//! A pod is elevated when any of these hold:
//! - The pod security context sets `runAsUser: 0`
//! - Any container (primary, init or ephemeral) sets `privileged: true`
//! - Any container sets `runAsUser: 0`
//!
//! Unset fields never trigger. Other security-relevant fields (capabilities,
//! host namespaces) are intentionally not considered here.

use k8s_openapi::api::core::v1::SecurityContext;

use crate::webhooks::pod::{ContainerView, PodSpecView};

const ROOT_UID: i64 = 0;

fn is_root(run_as_user: Option<i64>) -> bool {
    run_as_user == Some(ROOT_UID)
}

fn pod_runs_as_root(pod: PodSpecView<'_>) -> bool {
    pod.pod_security_context()
        .is_some_and(|ctx| is_root(ctx.run_as_user))
}

fn context_is_elevated(ctx: &SecurityContext) -> bool {
    ctx.privileged == Some(true) || is_root(ctx.run_as_user)
}

/// Whether a single container declares elevated privileges.
pub fn container_is_elevated(container: &ContainerView<'_>) -> bool {
    container
        .security_context
        .is_some_and(context_is_elevated)
}

/// Whether the pod's declared privileges require the hardened runtime.
pub fn must_run_hardened(pod: PodSpecView<'_>) -> bool {
    pod_runs_as_root(pod) || pod.containers().any(|c| container_is_elevated(&c))
}
