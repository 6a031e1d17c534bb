//! Strongly-connected-component cycle detection.
//!
//! Node ids are interned into petgraph indices in sorted-id order, Tarjan's
//! algorithm runs over the resulting digraph, and SCCs come back out as
//! [`Cycle`] values: every component of size ≥ 2, plus every single node
//! with a self-loop. petgraph's implementation uses an explicit work stack,
//! so deep dependency chains cannot exhaust the system stack.

use indexmap::IndexSet;
use modgraph_schemas::{Cycle, DependencyGraph};
use petgraph::algo::tarjan_scc;
use petgraph::graph::{DiGraph, NodeIndex};
use tracing::debug;

use crate::aggregate_modules;

/// Detects cycles among the graph's declarations.
///
/// Cycle membership lists are sorted by id; the cycle list itself follows
/// the algorithm's component order, which is deterministic for a given
/// graph.
pub fn detect_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    // Intern ids in ascending order so index assignment is reproducible.
    let ids: IndexSet<&str> = graph.nodes.keys().map(String::as_str).collect();

    let mut digraph: DiGraph<usize, ()> = DiGraph::with_capacity(ids.len(), graph.edges.len());
    for i in 0..ids.len() {
        digraph.add_node(i);
    }
    let mut has_self_loop = vec![false; ids.len()];
    for edge in &graph.edges {
        let (Some(from), Some(to)) = (
            ids.get_index_of(edge.from.as_str()),
            ids.get_index_of(edge.to.as_str()),
        ) else {
            continue;
        };
        if from == to {
            has_self_loop[from] = true;
            continue;
        }
        digraph.add_edge(NodeIndex::new(from), NodeIndex::new(to), ());
    }

    let mut cycles = Vec::new();
    for component in tarjan_scc(&digraph) {
        let keep = component.len() >= 2
            || component
                .first()
                .is_some_and(|&n| has_self_loop[digraph[n]]);
        if !keep {
            continue;
        }
        let mut nodes: Vec<String> = component
            .iter()
            .map(|&n| ids[digraph[n]].to_string())
            .collect();
        nodes.sort();
        let edges = graph
            .edges
            .iter()
            .filter(|e| {
                nodes.binary_search(&e.from).is_ok() && nodes.binary_search(&e.to).is_ok()
            })
            .cloned()
            .collect();
        cycles.push(Cycle { nodes, edges });
    }

    debug!(cycle_count = cycles.len(), "cycle detection complete");
    cycles
}

/// Detects cycles at module granularity: aggregates first, then runs the
/// same algorithm.
pub fn detect_module_cycles(graph: &DependencyGraph) -> Vec<Cycle> {
    detect_cycles(&aggregate_modules(graph))
}

/// All node ids that participate in any cycle.
pub fn nodes_in_cycles(cycles: &[Cycle]) -> std::collections::BTreeSet<&str> {
    cycles
        .iter()
        .flat_map(|c| c.nodes.iter().map(String::as_str))
        .collect()
}

/// The cycle containing `id`, if any.
pub fn cycle_for_node<'a>(id: &str, cycles: &'a [Cycle]) -> Option<&'a Cycle> {
    cycles.iter().find(|c| c.contains(id))
}

/// Cycles ordered largest first; ties broken by the first member id.
pub fn sort_cycles_by_size(mut cycles: Vec<Cycle>) -> Vec<Cycle> {
    cycles.sort_by(|a, b| {
        b.len()
            .cmp(&a.len())
            .then_with(|| a.nodes.first().cmp(&b.nodes.first()))
    });
    cycles
}

#[cfg(test)]
mod tests {
    use modgraph_schemas::{Edge, EdgeKind, Location, Node, NodeKind};

    use super::*;

    fn node(id: &str, kind: NodeKind, parent: Option<&str>) -> Node {
        Node {
            id: id.to_string(),
            name: id.rsplit("::").next().unwrap().to_string(),
            path: id.to_string(),
            kind,
            parent: parent.map(str::to_string),
            file: "src/lib.rs".to_string(),
            line: 1,
            children: Vec::new(),
        }
    }

    fn edge(from: &str, to: &str) -> Edge {
        Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind: EdgeKind::UseImport,
            count: 1,
            locations: vec![Location {
                file: "src/lib.rs".to_string(),
                line: 1,
                column: 1,
            }],
        }
    }

    fn graph(ids: &[&str], edges: &[(&str, &str)]) -> DependencyGraph {
        let mut g = DependencyGraph::default();
        for id in ids {
            g.nodes.insert(id.to_string(), node(id, NodeKind::Struct, None));
        }
        for (from, to) in edges {
            g.edges.push(edge(from, to));
        }
        g
    }

    #[test]
    fn test_acyclic_graph_has_no_cycles() {
        let g = graph(&["a", "b", "c"], &[("a", "b"), ("b", "c")]);
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_two_node_cycle() {
        let g = graph(
            &["crate::a::T", "crate::b::U"],
            &[("crate::a::T", "crate::b::U"), ("crate::b::U", "crate::a::T")],
        );
        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["crate::a::T", "crate::b::U"]);
        // Both edges lie within the cycle.
        assert_eq!(cycles[0].edges.len(), 2);
    }

    #[test]
    fn test_self_loop_reported() {
        let g = graph(&["a"], &[("a", "a")]);
        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["a"]);
    }

    #[test]
    fn test_singleton_without_loop_not_reported() {
        let g = graph(&["a", "b"], &[("a", "b")]);
        assert!(detect_cycles(&g).is_empty());
    }

    #[test]
    fn test_three_node_cycle_with_tail() {
        let g = graph(
            &["a", "b", "c", "tail"],
            &[("a", "b"), ("b", "c"), ("c", "a"), ("tail", "a")],
        );
        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 1);
        assert_eq!(cycles[0].nodes, vec!["a", "b", "c"]);
        // The tail edge is not inside the cycle.
        assert_eq!(cycles[0].edges.len(), 3);
    }

    #[test]
    fn test_mutual_reachability_within_cycle() {
        let g = graph(
            &["a", "b", "c"],
            &[("a", "b"), ("b", "c"), ("c", "a")],
        );
        let cycles = detect_cycles(&g);
        let cycle = &cycles[0];
        // Every pair is mutually reachable along intra-cycle edges.
        for from in &cycle.nodes {
            for to in &cycle.nodes {
                if from == to {
                    continue;
                }
                assert!(reachable(cycle, from, to), "{from} cannot reach {to}");
            }
        }
    }

    fn reachable(cycle: &Cycle, from: &str, to: &str) -> bool {
        let mut stack = vec![from];
        let mut seen = std::collections::BTreeSet::new();
        while let Some(current) = stack.pop() {
            if current == to {
                return true;
            }
            if !seen.insert(current) {
                continue;
            }
            for edge in &cycle.edges {
                if edge.from == current {
                    stack.push(&edge.to);
                }
            }
        }
        false
    }

    #[test]
    fn test_helpers() {
        let g = graph(
            &["a", "b", "x", "y", "z", "solo"],
            &[("a", "b"), ("b", "a"), ("x", "y"), ("y", "z"), ("z", "x")],
        );
        let cycles = detect_cycles(&g);
        assert_eq!(cycles.len(), 2);

        let in_cycles = nodes_in_cycles(&cycles);
        assert!(in_cycles.contains("a") && in_cycles.contains("z"));
        assert!(!in_cycles.contains("solo"));

        let found = cycle_for_node("y", &cycles).expect("y is in a cycle");
        assert_eq!(found.nodes, vec!["x", "y", "z"]);
        assert!(cycle_for_node("solo", &cycles).is_none());

        let sorted = sort_cycles_by_size(cycles);
        assert_eq!(sorted[0].len(), 3);
        assert_eq!(sorted[1].len(), 2);
    }

    #[test]
    fn test_module_level_cycles() {
        // Declarations in modules a and b reference each other; the module
        // view collapses to a two-module cycle.
        let mut g = DependencyGraph::default();
        for (id, kind, parent) in [
            ("crate", NodeKind::Crate, None),
            ("crate::a", NodeKind::Module, Some("crate")),
            ("crate::b", NodeKind::Module, Some("crate")),
            ("crate::a::T", NodeKind::Struct, Some("crate::a")),
            ("crate::b::U", NodeKind::Struct, Some("crate::b")),
        ] {
            g.nodes.insert(id.to_string(), node(id, kind, parent));
        }
        g.edges.push(edge("crate::a::T", "crate::b::U"));
        g.edges.push(edge("crate::b::U", "crate::a::T"));

        let module_cycles = detect_module_cycles(&g);
        assert_eq!(module_cycles.len(), 1);
        assert_eq!(module_cycles[0].nodes, vec!["crate::a", "crate::b"]);
    }
}
