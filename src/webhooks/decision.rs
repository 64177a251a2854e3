//! The outcome of a single admission evaluation.

use json_patch::PatchOperation;

/// Allow reason for objects that cannot be decoded as a pod.
pub const REASON_NOT_A_POD: &str = "this webhook only handles pods";
/// Allow reason for requests that carry no object (e.g. DELETE).
pub const REASON_NO_OBJECT: &str = "no object to evaluate";
/// Allow reason for pods without elevated privileges.
pub const REASON_NOT_ELEVATED: &str = "does not require hardened runtime";
/// Deny reason for elevated pods not owned by a `Build`.
pub const REASON_UNTRUSTED_OWNER: &str = "elevated pod not created via trusted build path";
/// Patch reason for elevated pods that are moved onto the hardened runtime.
pub const REASON_PATCHED: &str = "must run under hardened runtime";
/// Deny reason for elevated pods without the hardened runtime class.
pub const REASON_RUNTIME_REQUIRED: &str = "must run using hardened runtime";
/// Deny reason for elevated pods using an image outside the allow-list.
pub const REASON_DISALLOWED_IMAGE: &str = "disallowed image";
/// Allow reason for elevated pods that satisfy every check.
pub const REASON_VALID: &str = "valid";
/// Deny reason when the computed patch cannot be attached to the response.
pub const REASON_PATCH_ENCODING_FAILED: &str = "failed to encode patch";

/// Verdict returned to the webhook server for one pod.
#[derive(Clone, Debug, PartialEq)]
pub enum AdmissionDecision {
    Allow {
        reason: &'static str,
    },
    Deny {
        reason: &'static str,
    },
    /// Allow, after applying `patches` in order.
    Patch {
        patches: Vec<PatchOperation>,
        reason: &'static str,
    },
}

impl AdmissionDecision {
    pub fn allow(reason: &'static str) -> Self {
        Self::Allow { reason }
    }

    pub fn deny(reason: &'static str) -> Self {
        Self::Deny { reason }
    }

    pub fn patch(patches: Vec<PatchOperation>, reason: &'static str) -> Self {
        Self::Patch { patches, reason }
    }

    /// Human-readable reason, stable across releases.
    pub fn reason(&self) -> &'static str {
        match self {
            Self::Allow { reason } | Self::Deny { reason } | Self::Patch { reason, .. } => reason,
        }
    }

    /// Whether the pod is admitted (possibly after patching).
    pub fn is_allowed(&self) -> bool {
        !matches!(self, Self::Deny { .. })
    }

    /// Short label used for logs and metrics.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Allow { .. } => "allow",
            Self::Deny { .. } => "deny",
            Self::Patch { .. } => "patch",
        }
    }
}
