//! The top-level analysis report: the JSON interchange document.
//!
//! Top-level keys are `crate`, `graph`, `cycles`, `metrics`. The `crate` key
//! holds the list of member crate definitions — a single element outside
//! workspace mode, matching the equivalence between single-crate resolution
//! and a workspace with one synthetic member.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::{CrateDef, Cycle, DependencyGraph, MetricsReport};

/// Everything one analysis run produces.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct AnalysisReport {
    #[serde(rename = "crate")]
    pub crates: Vec<CrateDef>,
    pub graph: DependencyGraph,
    pub cycles: Vec<Cycle>,
    pub metrics: MetricsReport,
}

#[cfg(test)]
mod tests {
    use proptest::collection::vec;
    use proptest::prelude::*;

    use super::*;
    use crate::testutil::{arb_name, arb_path};
    use crate::{Edge, EdgeKind, Location, Module, Node, NodeKind, Visibility};

    #[test]
    fn test_top_level_keys() {
        let report = AnalysisReport::default();
        let json = serde_json::to_value(&report).unwrap();
        for key in ["crate", "graph", "cycles", "metrics"] {
            assert!(json.get(key).is_some(), "missing top-level key {key}");
        }
    }

    /// The interchange format is self-describing: schema generation must
    /// cover the whole report type.
    #[test]
    fn test_json_schema_generation() {
        let schema = schemars::schema_for!(AnalysisReport);
        let json = serde_json::to_value(&schema).unwrap();
        assert!(json.get("$schema").is_some());
    }

    // -------------------------------------------------------------------------
    // Proptest strategies. Bounded instances only: node/edge ids are drawn
    // from a small path alphabet so generated graphs stay readable in failure
    // output.
    // -------------------------------------------------------------------------

    fn arb_edge_kind() -> impl Strategy<Value = EdgeKind> {
        prop_oneof![
            Just(EdgeKind::UseImport),
            Just(EdgeKind::TypeReference),
            Just(EdgeKind::FunctionCall),
            Just(EdgeKind::MethodCall),
            Just(EdgeKind::TraitImpl),
            Just(EdgeKind::TraitBound),
            Just(EdgeKind::FieldType),
            Just(EdgeKind::ReturnType),
            Just(EdgeKind::ParameterType),
        ]
    }

    fn arb_node_kind() -> impl Strategy<Value = NodeKind> {
        prop_oneof![
            Just(NodeKind::Module),
            Just(NodeKind::Struct),
            Just(NodeKind::Enum),
            Just(NodeKind::Trait),
            Just(NodeKind::Function),
        ]
    }

    prop_compose! {
        fn arb_node()
            (id in arb_path(), kind in arb_node_kind(), line in 1usize..500)
        -> Node {
            let name = id.rsplit("::").next().unwrap_or(&id).to_string();
            Node {
                id: id.clone(),
                name,
                path: id,
                kind,
                parent: Some("crate".to_string()),
                file: "src/lib.rs".to_string(),
                line,
                children: Vec::new(),
            }
        }
    }

    prop_compose! {
        fn arb_edge()
            (
                from in arb_path(),
                to in arb_path(),
                kind in arb_edge_kind(),
                lines in vec(1usize..500, 1..4),
            )
        -> Edge {
            let locations: Vec<Location> = lines
                .into_iter()
                .map(|line| Location {
                    file: "src/lib.rs".to_string(),
                    line,
                    column: 1,
                })
                .collect();
            Edge { from, to, kind, count: locations.len(), locations }
        }
    }

    prop_compose! {
        fn arb_report()
            (
                crate_name in arb_name(),
                nodes in vec(arb_node(), 0..10),
                edges in vec(arb_edge(), 0..10),
            )
        -> AnalysisReport {
            let mut graph = DependencyGraph::default();
            for node in nodes {
                graph.nodes.insert(node.id.clone(), node);
            }
            graph.edges = edges;
            AnalysisReport {
                crates: vec![CrateDef {
                    name: crate_name,
                    root: Module::stub("crate", "crate", "src/lib.rs", Visibility::Public),
                    ..CrateDef::default()
                }],
                graph,
                cycles: Vec::new(),
                metrics: MetricsReport::default(),
            }
        }
    }

    proptest! {
        /// Arbitrary reports survive a JSON round trip.
        #[test]
        fn test_report_roundtrip(report in arb_report()) {
            let json = serde_json::to_string(&report).expect("serialize");
            let parsed: AnalysisReport =
                serde_json::from_str(&json).expect("deserialize");
            prop_assert_eq!(parsed, report);
        }

        /// Serialization is deterministic: serializing twice is byte-identical.
        #[test]
        fn test_serialization_deterministic(report in arb_report()) {
            let a = serde_json::to_string(&report).expect("serialize");
            let b = serde_json::to_string(&report).expect("serialize");
            prop_assert_eq!(a, b);
        }
    }
}
