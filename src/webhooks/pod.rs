//! Read-only projection over a decoded `Pod`.
//!
//! The policies only ever look at a handful of pod fields. `PodSpecView`
//! exposes exactly those, with every optional Kubernetes field collapsed to
//! an explicit absent value (empty slice or `None`) so callers never have to
//! walk `Option<Vec<_>>` chains themselves.

use k8s_openapi::api::core::v1::{
    Container, EphemeralContainer, Pod, PodSecurityContext, PodSpec, SecurityContext, Volume,
};
use k8s_openapi::apimachinery::pkg::apis::meta::v1::OwnerReference;
use kube::core::DynamicObject;

/// Decode an admission object into a typed `Pod`.
///
/// Fails for anything that is not a `v1/Pod` (k8s-openapi checks
/// `apiVersion` and `kind` during deserialization).
pub fn decode_pod(object: &DynamicObject) -> Result<Pod, serde_json::Error> {
    let value = serde_json::to_value(object)?;
    serde_json::from_value(value)
}

/// One container from any of the three container lists of a pod.
#[derive(Clone, Copy, Debug)]
pub struct ContainerView<'a> {
    pub name: &'a str,
    pub image: Option<&'a str>,
    pub security_context: Option<&'a SecurityContext>,
}

impl<'a> From<&'a Container> for ContainerView<'a> {
    fn from(container: &'a Container) -> Self {
        Self {
            name: &container.name,
            image: container.image.as_deref(),
            security_context: container.security_context.as_ref(),
        }
    }
}

impl<'a> From<&'a EphemeralContainer> for ContainerView<'a> {
    fn from(container: &'a EphemeralContainer) -> Self {
        Self {
            name: &container.name,
            image: container.image.as_deref(),
            security_context: container.security_context.as_ref(),
        }
    }
}

/// Borrowed view of the pod fields relevant to runtime admission.
#[derive(Clone, Copy, Debug)]
pub struct PodSpecView<'a> {
    pod: &'a Pod,
}

impl<'a> PodSpecView<'a> {
    pub fn new(pod: &'a Pod) -> Self {
        Self { pod }
    }

    /// Pod name, falling back to `generateName` for pods not yet named.
    pub fn name(self) -> &'a str {
        let meta = &self.pod.metadata;
        meta.name
            .as_deref()
            .or(meta.generate_name.as_deref())
            .unwrap_or("<unnamed>")
    }

    pub fn namespace(self) -> Option<&'a str> {
        self.pod.metadata.namespace.as_deref()
    }

    fn spec(self) -> Option<&'a PodSpec> {
        self.pod.spec.as_ref()
    }

    pub fn pod_security_context(self) -> Option<&'a PodSecurityContext> {
        self.spec()?.security_context.as_ref()
    }

    /// All containers in order: primary, then init, then ephemeral.
    pub fn containers(self) -> impl Iterator<Item = ContainerView<'a>> {
        let spec = self.spec();
        let primary = spec
            .map(|s| s.containers.as_slice())
            .unwrap_or_default()
            .iter()
            .map(ContainerView::from);
        let init = spec
            .and_then(|s| s.init_containers.as_deref())
            .unwrap_or_default()
            .iter()
            .map(ContainerView::from);
        let ephemeral = spec
            .and_then(|s| s.ephemeral_containers.as_deref())
            .unwrap_or_default()
            .iter()
            .map(ContainerView::from);
        primary.chain(init).chain(ephemeral)
    }

    pub fn volumes(self) -> &'a [Volume] {
        self.spec()
            .and_then(|s| s.volumes.as_deref())
            .unwrap_or_default()
    }

    pub fn runtime_class_name(self) -> Option<&'a str> {
        self.spec()?.runtime_class_name.as_deref()
    }

    pub fn owner_references(self) -> &'a [OwnerReference] {
        self.pod
            .metadata
            .owner_references
            .as_deref()
            .unwrap_or_default()
    }
}

impl<'a> From<&'a Pod> for PodSpecView<'a> {
    fn from(pod: &'a Pod) -> Self {
        Self::new(pod)
    }
}
