//! Coupling and stability metrics schema.
//!
//! Formulae follow the classic package-metrics model: afferent/efferent
//! coupling over distinct neighbors, instability `Ce / (Ca + Ce)`,
//! abstractness as the interface-type ratio, and distance from the main
//! sequence `|A + I - 1|`. Fan-in/fan-out differ from Ca/Ce in that they sum
//! edge counts rather than distinct neighbors.

use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Metrics for a single graph node.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct NodeMetrics {
    /// Afferent coupling: distinct incoming neighbors.
    pub ca: usize,
    /// Efferent coupling: distinct outgoing neighbors.
    pub ce: usize,
    /// `Ce / (Ca + Ce)`; 0 when the node is isolated.
    pub instability: f64,
    /// 1 for traits, 0 for other non-module nodes; the trait ratio for
    /// modules.
    pub abstractness: f64,
    /// `|A + I - 1|`.
    pub distance: f64,
    /// Incoming edge-count sum.
    pub fan_in: usize,
    /// Outgoing edge-count sum.
    pub fan_out: usize,
    pub lines_of_code: usize,
    /// `1 + fanOut` for functions, 1 otherwise.
    pub complexity: usize,
    pub in_cycle: bool,
    /// Index into the cycle list when `in_cycle` is set.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cycle_id: Option<usize>,
}

/// Metrics for a module node, extending the per-node values with
/// declaration tallies. Abstractness and distance are recomputed from the
/// trait ratio rather than the node formula.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ModuleMetrics {
    #[serde(flatten)]
    pub node: NodeMetrics,
    /// Structs + enums + type aliases.
    pub total_types: usize,
    pub total_traits: usize,
    /// Free functions only; methods count toward their owner.
    pub total_functions: usize,
    pub public_items: usize,
    pub private_items: usize,
}

/// One entry in a crate-level top-10 ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct RankedNode {
    pub id: String,
    pub value: f64,
}

/// Crate-level aggregates across all modules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct CrateMetrics {
    pub total_modules: usize,
    /// Structs + enums + type aliases + traits across all modules.
    pub total_types: usize,
    pub total_functions: usize,
    pub total_lines: usize,
    pub avg_instability: f64,
    pub avg_abstractness: f64,
    pub avg_distance: f64,
    pub cycle_count: usize,
    /// Top 10 non-module nodes by `Ca + Ce`.
    pub most_coupled: Vec<RankedNode>,
    /// Top 10 non-module nodes by instability.
    pub most_unstable: Vec<RankedNode>,
    /// Top 10 non-module nodes by distance.
    pub highest_distance: Vec<RankedNode>,
}

/// The full metrics report: crate aggregates plus per-module and per-node
/// maps keyed by node id.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct MetricsReport {
    #[serde(rename = "crate")]
    pub crate_metrics: CrateMetrics,
    pub modules: BTreeMap<String, ModuleMetrics>,
    pub nodes: BTreeMap<String, NodeMetrics>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_metrics_flatten() {
        let m = ModuleMetrics {
            node: NodeMetrics {
                ca: 1,
                ce: 2,
                instability: 2.0 / 3.0,
                ..NodeMetrics::default()
            },
            total_types: 3,
            ..ModuleMetrics::default()
        };
        let json = serde_json::to_value(&m).unwrap();
        // Flattened: node fields appear at the same level as the tallies.
        assert_eq!(json["ca"], 1);
        assert_eq!(json["totalTypes"], 3);
    }

    #[test]
    fn test_report_crate_key() {
        let report = MetricsReport::default();
        let json = serde_json::to_value(&report).unwrap();
        assert!(json.get("crate").is_some());
        assert!(json.get("modules").is_some());
        assert!(json.get("nodes").is_some());
    }

    #[test]
    fn test_cycle_id_omitted_when_none() {
        let m = NodeMetrics::default();
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("cycleId"));
    }
}
