// Test code is allowed to panic on failure
#![allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::panic
)]

//! Functional tests for the mutating and validating admission stages.
//!
//! These tests chain both stages the way the API server does: the mutating
//! decision's patch is applied to the pod, then the patched pod is sent
//! through validation. No cluster is required.
//!
//! ```bash
//! cargo test --test functional
//! ```

#[path = "../common/mod.rs"]
mod common;
