//! Module-level aggregation.
//!
//! Projects every node onto its nearest ancestor of module (or crate) kind
//! and collapses edges accordingly: intra-module edges disappear, edges
//! between distinct modules merge on `(from, to, kind)` with counts summed
//! and locations concatenated. Aggregating an already-aggregated graph is a
//! no-op, which the module-cycle detector relies on.

use std::collections::{BTreeMap, HashMap};

use modgraph_schemas::{DependencyGraph, Edge, EdgeKind, Node, NodeKind};

/// Collapses a declaration-level graph to module granularity.
pub fn aggregate_modules(graph: &DependencyGraph) -> DependencyGraph {
    let mut nodes: BTreeMap<String, Node> = BTreeMap::new();
    for node in graph.nodes.values() {
        if !matches!(node.kind, NodeKind::Module | NodeKind::Crate) {
            continue;
        }
        let mut module = node.clone();
        module.children.retain(|child| {
            graph
                .nodes
                .get(child)
                .is_some_and(|c| matches!(c.kind, NodeKind::Module | NodeKind::Crate))
        });
        nodes.insert(module.id.clone(), module);
    }

    let mut edges: Vec<Edge> = Vec::new();
    let mut edge_index: HashMap<(String, String, EdgeKind), usize> = HashMap::new();
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (
            graph.owning_module(&edge.from),
            graph.owning_module(&edge.to),
        ) else {
            continue;
        };
        if from == to {
            continue;
        }
        let key = (from.to_string(), to.to_string(), edge.kind);
        if let Some(&i) = edge_index.get(&key) {
            edges[i].count += edge.count;
            edges[i].locations.extend(edge.locations.iter().cloned());
            continue;
        }
        edge_index.insert(key, edges.len());
        edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind: edge.kind,
            count: edge.count,
            locations: edge.locations.clone(),
        });
    }

    DependencyGraph { nodes, edges }
}
