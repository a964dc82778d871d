//! I/O adapters for console commands.
//!
//! Each external collaborator sits behind a trait so orchestration can be
//! driven by scripted fakes in tests.

pub mod aws;
pub mod config;
pub mod console;
pub mod desktop;
pub mod kops;
pub mod kubectl;
pub mod process;
