//! logo-core
//!
//! Core library for resolving brand logos from an ordered list of providers.
//!
//! This crate defines the data model, slug rules, candidate validation, the
//! on-disk asset store, project configuration, and the resolver and worker pool
//! that tie them together.
//!
//! All substantive logic lives here so it is testable without a terminal or a
//! network, and reusable from frontends other than the CLI.

pub mod model;
pub mod project;
pub mod services;
pub mod slug;
pub mod store;
pub mod validate;

/// Returns the library version as encoded at compile time.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
