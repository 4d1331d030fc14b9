//! Workspace placeholder crate.
//!
//! This crate exists to expose shared feature flags that map to the individual
//! workspace crates (e.g., `core-await`, `host-inproc`). Embedding applications
//! can depend on `pbc-workspace` and enable the documented features without
//! needing to wire each crate individually.
