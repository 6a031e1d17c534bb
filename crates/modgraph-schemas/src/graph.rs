//! Dependency graph schema: nodes, typed edges, and cycles.
//!
//! The graph owns its node map and edge list. Nodes hold only id-typed
//! back-references (`parent`, `children`) — never direct ownership of other
//! nodes — so the parent/child tree and the dependency edges can both be
//! traversed through the single owning map. The node map is ordered by id so
//! that serialization and any iteration-order-observable lookup (glob
//! expansion, suffix matching) are deterministic across runs.
//!
//! JSON shape: nodes and edges serialize as arrays (`{"nodes": [...],
//! "edges": [...]}`); the in-memory node map is keyed by id.

use std::collections::{BTreeMap, BTreeSet};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// The kind of a graph node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    Crate,
    Module,
    Struct,
    Enum,
    Trait,
    Function,
    Impl,
}

/// One declaration in the dependency graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Node {
    /// Qualified path; primary key of the graph.
    pub id: String,
    /// Short name (last path segment; `crate` for the root module).
    pub name: String,
    /// Qualified path. Identical to `id`; kept as a named field so consumers
    /// need not know the id scheme.
    pub path: String,
    pub kind: NodeKind,
    /// Parent node id. `None` only for the root module.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent: Option<String>,
    /// Source file of the declaration.
    pub file: String,
    /// 1-based declaration line.
    pub line: usize,
    /// Child node ids, in source order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<String>,
}

/// The kind of a dependency edge. Closed set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum EdgeKind {
    UseImport,
    TypeReference,
    FunctionCall,
    MethodCall,
    TraitImpl,
    TraitBound,
    FieldType,
    ReturnType,
    ParameterType,
}

/// Source position of one occurrence of a dependency.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
pub struct Location {
    pub file: String,
    pub line: usize,
    pub column: usize,
}

/// A typed, counted, located dependency edge.
///
/// Edges are deduplicated on `(from, to, kind)`: repeated occurrences
/// increment `count` and append a location, so `count` always equals
/// `locations.len()`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub kind: EdgeKind,
    pub count: usize,
    pub locations: Vec<Location>,
}

/// The dependency graph: an id-keyed node map plus a deduplicated edge list.
///
/// Built once per run by the graph phase and read-only afterwards. Metrics
/// and cycles reference node ids and are invalidated if the graph mutates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct DependencyGraph {
    /// All nodes, keyed by id. Serialized as an array of nodes.
    #[serde(with = "node_map")]
    #[schemars(with = "Vec<Node>")]
    pub nodes: BTreeMap<String, Node>,

    /// All edges, in emission order.
    pub edges: Vec<Edge>,
}

impl DependencyGraph {
    /// Forward adjacency: distinct successor ids per node id.
    ///
    /// `adjacency()[from]` contains `to` iff some edge `(from, to, *)`
    /// exists.
    pub fn adjacency(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut adj: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for edge in &self.edges {
            adj.entry(edge.from.as_str()).or_default().insert(edge.to.as_str());
        }
        adj
    }

    /// Reverse adjacency: distinct predecessor ids per node id.
    pub fn reverse_adjacency(&self) -> BTreeMap<&str, BTreeSet<&str>> {
        let mut adj: BTreeMap<&str, BTreeSet<&str>> = BTreeMap::new();
        for edge in &self.edges {
            adj.entry(edge.to.as_str()).or_default().insert(edge.from.as_str());
        }
        adj
    }

    /// Walks up the parent chain to the nearest node of kind `module` (or
    /// `crate`), including `id` itself. Returns `None` for unknown ids.
    pub fn owning_module(&self, id: &str) -> Option<&str> {
        let mut current = self.nodes.get(id)?;
        loop {
            if matches!(current.kind, NodeKind::Module | NodeKind::Crate) {
                return Some(current.id.as_str());
            }
            current = self.nodes.get(current.parent.as_deref()?)?;
        }
    }
}

/// Serializes the id-keyed node map as a JSON array of nodes.
mod node_map {
    use std::collections::BTreeMap;

    use serde::de::Deserializer;
    use serde::ser::Serializer;
    use serde::Deserialize;

    use super::Node;

    pub fn serialize<S: Serializer>(
        nodes: &BTreeMap<String, Node>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        serializer.collect_seq(nodes.values())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<BTreeMap<String, Node>, D::Error> {
        let nodes = Vec::<Node>::deserialize(deserializer)?;
        Ok(nodes.into_iter().map(|n| (n.id.clone(), n)).collect())
    }
}

/// One strongly connected component reported as a cycle: either size ≥ 2, or
/// a single node with a self-loop. `edges` is the subset of graph edges whose
/// endpoints both lie within the cycle.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Cycle {
    pub nodes: Vec<String>,
    pub edges: Vec<Edge>,
}

impl Cycle {
    /// Number of member nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True when the cycle has no members. Never produced by the detector;
    /// present for container-protocol completeness.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.nodes.iter().any(|n| n == id)
    }
}
