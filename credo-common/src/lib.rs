//! Shared plumbing for the Credo workspace.
//!
//! Currently this is just the centralised `tracing` setup in
//! [`observability`]; it is kept as its own crate so every binary and
//! integration test logs into the same place without dragging in the
//! heavier crawler dependencies.

pub mod observability;
