//! JSON patches that move a pod onto the hardened runtime.
//!
//! The patch always sets `/spec/runtimeClassName` first, then sets
//! `medium: Memory` on every emptyDir volume so scratch space is tmpfs
//! backed inside the VM sandbox. Volume indices refer to the pod as
//! submitted.

use json_patch::jsonptr::PointerBuf;
use json_patch::{AddOperation, PatchOperation};
use serde_json::Value;

use super::{EMPTY_DIR_MEMORY_MEDIUM, HARDENED_RUNTIME_CLASS};
use crate::webhooks::pod::PodSpecView;

fn add(path: PointerBuf, value: &str) -> PatchOperation {
    PatchOperation::Add(AddOperation {
        path,
        value: Value::String(value.to_string()),
    })
}

/// Build the ordered patch list for a pod that must run hardened.
///
/// Callers must have classified the pod with
/// [`must_run_hardened`](super::must_run_hardened) first.
pub fn build_patches(pod: PodSpecView<'_>) -> Vec<PatchOperation> {
    let volumes = pod.volumes();
    let mut patches = Vec::with_capacity(1 + volumes.len());

    patches.push(add(
        PointerBuf::from_tokens(["spec", "runtimeClassName"]),
        HARDENED_RUNTIME_CLASS,
    ));

    for (index, volume) in volumes.iter().enumerate() {
        if volume.empty_dir.is_none() {
            continue;
        }
        let index = index.to_string();
        patches.push(add(
            PointerBuf::from_tokens(["spec", "volumes", index.as_str(), "emptyDir", "medium"]),
            EMPTY_DIR_MEMORY_MEDIUM,
        ));
    }

    patches
}
