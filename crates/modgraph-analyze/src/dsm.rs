//! Design-structure-matrix construction.
//!
//! A square matrix over module-level nodes in sorted-id order; cell (i, j)
//! holds the number of dependency occurrences from module i to module j,
//! summed across edge kinds. Because the graph is aggregated first, feeding
//! an already-aggregated graph in changes nothing.

use std::collections::BTreeMap;

use modgraph_schemas::DependencyGraph;
use serde::Serialize;

use crate::aggregate_modules;

/// A module-granularity dependency matrix.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Dsm {
    /// Row/column labels, sorted ascending. Row i depends on column j with
    /// weight `matrix[i][j]`.
    pub ids: Vec<String>,
    pub matrix: Vec<Vec<usize>>,
}

/// Builds the DSM for a graph at module granularity.
pub fn build_dsm(graph: &DependencyGraph) -> Dsm {
    let modules = aggregate_modules(graph);
    let ids: Vec<String> = modules.nodes.keys().cloned().collect();
    let position: BTreeMap<&str, usize> = ids
        .iter()
        .enumerate()
        .map(|(i, id)| (id.as_str(), i))
        .collect();

    let mut matrix = vec![vec![0usize; ids.len()]; ids.len()];
    for edge in &modules.edges {
        let (Some(&from), Some(&to)) = (
            position.get(edge.from.as_str()),
            position.get(edge.to.as_str()),
        ) else {
            continue;
        };
        matrix[from][to] += edge.count;
    }

    Dsm { ids, matrix }
}
