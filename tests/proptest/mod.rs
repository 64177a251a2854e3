// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Property-based tests for kata-admission.
//!
//! Uses proptest to generate random pods and verify the admission invariants.

#[path = "../common/mod.rs"]
mod common;

use std::sync::Arc;

use k8s_openapi::api::core::v1::{Pod, SecurityContext};
use kata_admission::webhooks::decision::{REASON_UNTRUSTED_OWNER, REASON_VALID};
use kata_admission::webhooks::policies::{
    ImageAllowlist, build_patches, is_build_owned, must_run_hardened, mutation,
};
use kata_admission::{AdmissionDecision, PodSpecView, ValidationDecider};
use proptest::prelude::*;
use serde_json::{Value, json};

use common::fixtures::{PodBuilder, apply_patches};

const IMAGES: [&str; 4] = [
    "registry/safe:1.0",
    "registry/tools:2.1",
    "quay.io/builder:latest",
    "registry/untrusted:1.0",
];

/// Which of the three container lists a container lands in.
#[derive(Clone, Copy, Debug)]
enum ContainerList {
    Primary,
    Init,
    Ephemeral,
}

/// Generated container: list, image index and security context fields.
#[derive(Clone, Debug)]
struct ContainerSpec {
    list: ContainerList,
    image: usize,
    privileged: Option<bool>,
    run_as_user: Option<i64>,
}

/// Generated pod shape.
#[derive(Clone, Debug)]
struct PodShape {
    pod_run_as_user: Option<i64>,
    containers: Vec<ContainerSpec>,
    empty_dirs: Vec<bool>,
    owners: Vec<&'static str>,
}

/// Strategy for runAsUser values, biased toward root.
fn any_uid() -> impl Strategy<Value = Option<i64>> {
    prop_oneof![Just(None), Just(Some(0i64)), (1..=65535i64).prop_map(Some)]
}

fn any_list() -> impl Strategy<Value = ContainerList> {
    prop_oneof![
        Just(ContainerList::Primary),
        Just(ContainerList::Init),
        Just(ContainerList::Ephemeral),
    ]
}

fn any_container() -> impl Strategy<Value = ContainerSpec> {
    (
        any_list(),
        0..IMAGES.len(),
        prop::option::of(any::<bool>()),
        any_uid(),
    )
        .prop_map(|(list, image, privileged, run_as_user)| ContainerSpec {
            list,
            image,
            privileged,
            run_as_user,
        })
}

/// Containers that never declare elevated privileges.
fn unprivileged_container() -> impl Strategy<Value = ContainerSpec> {
    (
        any_list(),
        0..IMAGES.len(),
        prop::option::of(Just(false)),
        prop::option::of(1..=65535i64),
    )
        .prop_map(|(list, image, privileged, run_as_user)| ContainerSpec {
            list,
            image,
            privileged,
            run_as_user,
        })
}

fn any_owner() -> impl Strategy<Value = &'static str> {
    prop_oneof![
        Just("Build"),
        Just("ReplicaSet"),
        Just("Job"),
        Just("build"),
        Just("BuildConfig"),
    ]
}

fn any_pod_shape() -> impl Strategy<Value = PodShape> {
    (
        any_uid(),
        prop::collection::vec(any_container(), 0..6),
        prop::collection::vec(any::<bool>(), 0..6),
        prop::collection::vec(any_owner(), 0..3),
    )
        .prop_map(|(pod_run_as_user, containers, empty_dirs, owners)| PodShape {
            pod_run_as_user,
            containers,
            empty_dirs,
            owners,
        })
}

fn security_context(spec: &ContainerSpec) -> Option<SecurityContext> {
    if spec.privileged.is_none() && spec.run_as_user.is_none() {
        return None;
    }
    Some(SecurityContext {
        privileged: spec.privileged,
        run_as_user: spec.run_as_user,
        ..Default::default()
    })
}

fn build_pod(shape: &PodShape) -> Pod {
    let mut builder = PodBuilder::new("generated");
    if let Some(uid) = shape.pod_run_as_user {
        builder = builder.pod_run_as_user(uid);
    }
    for spec in &shape.containers {
        let image = IMAGES[spec.image];
        let ctx = security_context(spec);
        builder = match spec.list {
            ContainerList::Primary => builder.container(image, ctx),
            ContainerList::Init => builder.init_container(image, ctx),
            ContainerList::Ephemeral => builder.ephemeral_container(image, ctx),
        };
    }
    for (i, is_empty_dir) in shape.empty_dirs.iter().enumerate() {
        let name = format!("vol-{}", i);
        builder = if *is_empty_dir {
            builder.empty_dir_volume(&name)
        } else {
            builder.secret_volume(&name)
        };
    }
    for owner in &shape.owners {
        builder = builder.owned_by(*owner);
    }
    builder.build()
}

/// Reference classification evaluated over the full union, no short-circuit.
fn reference_verdict(shape: &PodShape) -> bool {
    let pod_level = shape.pod_run_as_user == Some(0);
    let container_level = shape
        .containers
        .iter()
        .map(|c| c.privileged == Some(true) || c.run_as_user == Some(0))
        .fold(false, |acc, elevated| acc | elevated);
    pod_level || container_level
}

fn expected_patches(shape: &PodShape) -> Value {
    let mut ops = vec![json!({ "op": "add", "path": "/spec/runtimeClassName", "value": "kata" })];
    for (i, is_empty_dir) in shape.empty_dirs.iter().enumerate() {
        if *is_empty_dir {
            ops.push(json!({
                "op": "add",
                "path": format!("/spec/volumes/{}/emptyDir/medium", i),
                "value": "Memory"
            }));
        }
    }
    Value::Array(ops)
}

proptest! {
    /// Property: the classifier matches a full evaluation of the union.
    #[test]
    fn prop_classifier_matches_reference(shape in any_pod_shape()) {
        let pod = build_pod(&shape);
        prop_assert_eq!(must_run_hardened(PodSpecView::new(&pod)), reference_verdict(&shape));
    }

    /// Property: pods without any security context never need kata.
    #[test]
    fn prop_no_security_context_is_not_hardened(
        images in prop::collection::vec((any_list(), 0..IMAGES.len()), 0..6),
        empty_dirs in prop::collection::vec(any::<bool>(), 0..4),
    ) {
        let shape = PodShape {
            pod_run_as_user: None,
            containers: images
                .into_iter()
                .map(|(list, image)| ContainerSpec { list, image, privileged: None, run_as_user: None })
                .collect(),
            empty_dirs,
            owners: vec!["Build"],
        };
        let pod = build_pod(&shape);
        prop_assert!(!must_run_hardened(PodSpecView::new(&pod)));
    }

    /// Property: one privileged container anywhere forces kata.
    #[test]
    fn prop_single_privileged_container_forces_hardened(
        mut shape in any_pod_shape(),
        others in prop::collection::vec(unprivileged_container(), 0..5),
        list in any_list(),
        position in any::<prop::sample::Index>(),
    ) {
        let privileged = ContainerSpec { list, image: 0, privileged: Some(true), run_as_user: None };
        let mut containers = others;
        let at = position.index(containers.len() + 1);
        containers.insert(at, privileged);
        shape.containers = containers;

        let pod = build_pod(&shape);
        prop_assert!(must_run_hardened(PodSpecView::new(&pod)));
    }

    /// Property: elevated pods not owned by a Build are denied by mutation.
    #[test]
    fn prop_untrusted_elevated_pods_are_denied(shape in any_pod_shape()) {
        let pod = build_pod(&shape);
        let view = PodSpecView::new(&pod);
        prop_assume!(must_run_hardened(view) && !is_build_owned(view));

        prop_assert_eq!(mutation::decide(view), AdmissionDecision::deny(REASON_UNTRUSTED_OWNER));
    }

    /// Property: elevated Build pods get the runtime patch plus one medium
    /// patch per emptyDir volume, at the right index.
    #[test]
    fn prop_trusted_elevated_pods_are_patched(mut shape in any_pod_shape()) {
        shape.pod_run_as_user = Some(0);
        shape.owners.push("Build");
        let pod = build_pod(&shape);

        let decision = mutation::decide(PodSpecView::new(&pod));
        let AdmissionDecision::Patch { patches, .. } = decision else {
            panic!("expected patch decision, got {decision:?}");
        };
        prop_assert_eq!(serde_json::to_value(&patches).unwrap(), expected_patches(&shape));
    }

    /// Property: applying the patch never changes the classification.
    #[test]
    fn prop_patching_preserves_verdict(shape in any_pod_shape()) {
        let pod = build_pod(&shape);
        let view = PodSpecView::new(&pod);
        prop_assume!(must_run_hardened(view));

        let patched = apply_patches(&pod, &build_patches(view));
        prop_assert!(must_run_hardened(PodSpecView::new(&patched)));
        prop_assert_eq!(
            patched.spec.as_ref().unwrap().runtime_class_name.as_deref(),
            Some("kata")
        );
    }

    /// Property: hardened pods on kata using only allow-listed images are valid.
    #[test]
    fn prop_compliant_pods_validate(mut shape in any_pod_shape()) {
        shape.pod_run_as_user = Some(0);
        let mut pod = build_pod(&shape);
        pod.spec.as_mut().unwrap().runtime_class_name = Some("kata".to_string());

        let allowlist: ImageAllowlist = shape.containers.iter().map(|c| IMAGES[c.image]).collect();
        let decider = ValidationDecider::new(Arc::new(allowlist));

        prop_assert_eq!(
            decider.decide(PodSpecView::new(&pod)),
            AdmissionDecision::allow(REASON_VALID)
        );
    }

    /// Property: the verdict is a pure function of the pod.
    #[test]
    fn prop_classification_is_deterministic(shape in any_pod_shape()) {
        let pod = build_pod(&shape);
        let first = must_run_hardened(PodSpecView::new(&pod));
        let second = must_run_hardened(PodSpecView::new(&pod.clone()));
        prop_assert_eq!(first, second);
    }
}
