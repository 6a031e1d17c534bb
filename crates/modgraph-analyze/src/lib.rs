//! Cycle detection and metrics for modgraph dependency graphs.
//!
//! Consumes the finished dependency graph and produces the remaining
//! analysis outputs: strongly-connected-component cycles (declaration- and
//! module-level), coupling/instability/abstractness metrics with crate-level
//! aggregates, and the design-structure matrix.
//!
//! ## Usage
//!
//! ```ignore
//! use modgraph_analyze::{compute_metrics, detect_cycles};
//!
//! let cycles = detect_cycles(&graph);
//! let metrics = compute_metrics(&crates, &graph, &cycles);
//! println!("{} cycles", metrics.crate_metrics.cycle_count);
//! ```

mod cycles;
mod dsm;
mod metrics;

// Aggregation lives in the graph crate; re-exported here because the
// module-level cycle and DSM views are defined in terms of it.
#[doc(inline)]
pub use modgraph_graph::aggregate_modules;

#[doc(inline)]
pub use crate::cycles::{
    cycle_for_node, detect_cycles, detect_module_cycles, nodes_in_cycles, sort_cycles_by_size,
};
#[doc(inline)]
pub use crate::dsm::{build_dsm, Dsm};
#[doc(inline)]
pub use crate::metrics::compute_metrics;
