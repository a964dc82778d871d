//! Deterministic, pure logic for the console.
//!
//! Core modules must be free of I/O side effects. They operate on in-memory
//! data and already-fetched tool output so they can be tested in isolation.

pub mod cluster;
pub mod credential;
pub mod menu;
pub mod merge;
pub mod region;
pub mod review;
