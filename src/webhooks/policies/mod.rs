//! Runtime admission policies for pods.
//!
//! Two webhooks share the same classification:
//! - Mutating: elevated pods created by a `Build` are patched onto the
//!   hardened runtime, other elevated pods are denied
//! - Validating: elevated pods must already use the hardened runtime and
//!   only run allow-listed images
//!
//! A pod is "elevated" when it runs as root or has a privileged container,
//! see [`security::must_run_hardened`].

pub mod images;
pub mod mutation;
pub mod ownership;
pub mod patches;
pub mod security;
pub mod validation;

/// Runtime class name of the hardened (kata-containers) runtime.
pub const HARDENED_RUNTIME_CLASS: &str = "kata";

/// Owner kind trusted to create elevated pods.
pub const TRUSTED_OWNER_KIND: &str = "Build";

/// Medium assigned to emptyDir volumes of hardened pods.
pub const EMPTY_DIR_MEMORY_MEDIUM: &str = "Memory";

pub use images::ImageAllowlist;
pub use ownership::is_build_owned;
pub use patches::build_patches;
pub use security::must_run_hardened;
pub use validation::ValidationDecider;
