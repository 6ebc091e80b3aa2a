//! Manifest documents and their persistence.
//!
//! A manifest is the YAML file handed to `cf push`. This module loads it into
//! a [`ManifestDocument`], lets the push flow mutate it in place, and writes
//! the result back out for the deploy step.

mod store;
mod types;

pub use store::*;
pub use types::*;
