//! Interactive console for defining, launching, inspecting and tearing down
//! a kops-managed Kubernetes cluster on AWS.
//!
//! The crate keeps a strict separation:
//!
//! - **[`core`]**: Pure, deterministic logic (dispatch table, cluster
//!   definition, merge-from-remote, review edits, credential extraction).
//!   No I/O, fully testable in isolation.
//! - **[`io`]**: Side-effecting adapters (`kops`, `kubectl`, `aws`, clipboard,
//!   browser, terminal, config file), each behind a trait.
//!
//! Orchestration modules ([`reconciler`], [`credentials`], [`session`])
//! coordinate core logic with I/O to implement the menu actions.

pub mod core;
pub mod credentials;
pub mod error;
pub mod io;
pub mod logging;
pub mod reconciler;
pub mod session;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
