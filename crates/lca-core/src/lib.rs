//! Core domain for the LCA employer index.
//!
//! Holds the pure pieces of the pipeline: employer-name normalization, year
//! extraction, the index record types, CLI settings and the error taxonomy.

pub mod error;
pub mod models;
pub mod normalize;
pub mod settings;
pub mod time_utils;
pub mod year;
