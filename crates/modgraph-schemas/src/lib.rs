//! Schema definitions for modgraph output formats.
//!
//! This crate contains the data structures that define modgraph's intermediate
//! and output formats: the crate definition tree produced by extraction, the
//! dependency graph produced by graph construction, and the cycle and metrics
//! reports produced by analysis. These types are serialized to JSON and are
//! the interchange contract between pipeline phases and any non-rendering
//! consumer.
//!
//! The schemas are designed to be:
//! - **Self-describing**: JSON Schema is auto-generated from Rust types
//! - **Deterministic**: map-valued fields use ordered containers so that
//!   re-running the pipeline on the same inputs yields byte-identical JSON
//! - **Complete**: all information needed for analysis is captured
//! - **Shared**: used across all phases of the modgraph pipeline

mod crate_def;
mod graph;
mod metrics;
mod report;
#[cfg(test)]
mod testutil;

#[doc(inline)]
pub use crate_def::*;
#[doc(inline)]
pub use graph::*;
#[doc(inline)]
pub use metrics::*;
#[doc(inline)]
pub use report::*;
