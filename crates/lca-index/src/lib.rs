//! Shared startup code for the `lca-index` and `lca-lookup` binaries.

pub mod bootstrap;
