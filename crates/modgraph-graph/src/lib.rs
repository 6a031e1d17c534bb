//! Dependency-graph construction for modgraph.
//!
//! Consumes the crate definition trees produced by extraction and builds the
//! typed dependency multigraph: one node per declaration, deduplicated
//! counted edges with source locations, crate-prefixed namespaces and
//! synthetic inter-crate edges in workspace mode, and a module-level
//! aggregation helper for coarse-grained views.
//!
//! ## Usage
//!
//! ```ignore
//! use modgraph_graph::{aggregate_modules, build_graph};
//!
//! let graph = build_graph(&crates);
//! let modules = aggregate_modules(&graph);
//! println!("{} nodes, {} edges", graph.nodes.len(), graph.edges.len());
//! ```

mod aggregate;
mod builder;
mod index;
mod resolve;
mod workspace;

#[doc(inline)]
pub use crate::aggregate::aggregate_modules;
#[doc(inline)]
pub use crate::builder::build_crate_graph;
#[doc(inline)]
pub use crate::index::{SymbolCategory, SymbolIndex};
#[doc(inline)]
pub use crate::workspace::{build_graph, link_workspace};
