//! Data layer for the LCA employer index.
//!
//! Streams LCA disclosure CSV rows, aggregates them per normalized employer,
//! writes and reads the JSON index artifact, and resolves employer lookups.

pub mod builder;
pub mod lookup;
pub mod pipeline;
pub mod reader;
pub mod writer;

pub use lca_core as core;
