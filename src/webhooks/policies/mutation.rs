//! Mutating webhook decision.
//!
//! Elevated pods created by a `Build` are patched onto the hardened
//! runtime. Elevated pods from anywhere else are denied, so the mutating
//! webhook never grants the patch to an untrusted creation path.

use kube::core::DynamicObject;
use tracing::{debug, info};

use super::{build_patches, is_build_owned, must_run_hardened};
use crate::webhooks::decision::{
    AdmissionDecision, REASON_NOT_A_POD, REASON_NOT_ELEVATED, REASON_PATCHED,
    REASON_UNTRUSTED_OWNER,
};
use crate::webhooks::pod::{PodSpecView, decode_pod};

/// Decide on an already-decoded pod.
pub fn decide(pod: PodSpecView<'_>) -> AdmissionDecision {
    if !must_run_hardened(pod) {
        return AdmissionDecision::allow(REASON_NOT_ELEVATED);
    }

    if !is_build_owned(pod) {
        return AdmissionDecision::deny(REASON_UNTRUSTED_OWNER);
    }

    AdmissionDecision::patch(build_patches(pod), REASON_PATCHED)
}

/// Decode the admission object and decide. Non-pods are allowed.
pub fn decide_object(object: &DynamicObject) -> AdmissionDecision {
    let pod = match decode_pod(object) {
        Ok(pod) => pod,
        Err(e) => {
            debug!(error = %e, "Object is not a pod, skipping mutation");
            return AdmissionDecision::allow(REASON_NOT_A_POD);
        }
    };

    let view = PodSpecView::new(&pod);
    info!(name = view.name(), namespace = ?view.namespace(), "Evaluating pod for mutation");
    decide(view)
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]
mod tests {
    use super::*;
    use k8s_openapi::api::core::v1::{
        Container, EmptyDirVolumeSource, Pod, PodSpec, SecurityContext, Volume,
    };
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::{ObjectMeta, OwnerReference};
    use serde_json::json;

    fn create_pod(privileged: bool, owner_kind: Option<&str>) -> Pod {
        Pod {
            metadata: ObjectMeta {
                name: Some("builder".to_string()),
                namespace: Some("ci".to_string()),
                owner_references: owner_kind.map(|kind| {
                    vec![OwnerReference {
                        kind: kind.to_string(),
                        name: "build-1".to_string(),
                        ..Default::default()
                    }]
                }),
                ..Default::default()
            },
            spec: Some(PodSpec {
                containers: vec![Container {
                    name: "main".to_string(),
                    image: Some("registry/safe:1.0".to_string()),
                    security_context: Some(SecurityContext {
                        privileged: Some(privileged),
                        ..Default::default()
                    }),
                    ..Default::default()
                }],
                volumes: Some(vec![Volume {
                    name: "scratch".to_string(),
                    empty_dir: Some(EmptyDirVolumeSource::default()),
                    ..Default::default()
                }]),
                ..Default::default()
            }),
            ..Default::default()
        }
    }

    #[test]
    fn test_unprivileged_pod_is_allowed() {
        let pod = create_pod(false, None);
        let decision = decide(PodSpecView::new(&pod));
        assert_eq!(decision, AdmissionDecision::allow(REASON_NOT_ELEVATED));
    }

    #[test]
    fn test_privileged_pod_without_build_owner_is_denied() {
        let pod = create_pod(true, Some("ReplicaSet"));
        let decision = decide(PodSpecView::new(&pod));
        assert_eq!(decision, AdmissionDecision::deny(REASON_UNTRUSTED_OWNER));
    }

    #[test]
    fn test_privileged_orphan_pod_is_denied() {
        let pod = create_pod(true, None);
        let decision = decide(PodSpecView::new(&pod));
        assert!(!decision.is_allowed());
    }

    #[test]
    fn test_privileged_build_pod_is_patched() {
        let pod = create_pod(true, Some("Build"));
        let decision = decide(PodSpecView::new(&pod));

        let AdmissionDecision::Patch { patches, reason } = decision else {
            panic!("expected a patch decision, got {decision:?}");
        };
        assert_eq!(reason, REASON_PATCHED);
        assert_eq!(
            serde_json::to_value(&patches).unwrap(),
            json!([
                { "op": "add", "path": "/spec/runtimeClassName", "value": "kata" },
                { "op": "add", "path": "/spec/volumes/0/emptyDir/medium", "value": "Memory" },
            ])
        );
    }

    #[test]
    fn test_non_pod_object_is_allowed() {
        let object: DynamicObject = serde_json::from_value(json!({
            "apiVersion": "v1",
            "kind": "Secret",
            "metadata": { "name": "token" }
        }))
        .unwrap();

        assert_eq!(
            decide_object(&object),
            AdmissionDecision::allow(REASON_NOT_A_POD)
        );
    }
}
