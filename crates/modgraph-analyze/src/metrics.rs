//! Coupling, instability, abstractness, and size metrics.
//!
//! Per-node values come from the graph alone; module tallies additionally
//! consult the crate definition trees (type aliases and constants are module
//! children without graph nodes). Line counts read each module's owning
//! file once and cache by path; non-module nodes use a constant stand-in.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::path::Path;

use modgraph_schemas::{
    CrateDef, CrateMetrics, Cycle, DependencyGraph, MetricsReport, Module, ModuleMetrics,
    NodeKind, NodeMetrics, RankedNode,
};
use tracing::debug;

/// Stand-in line count for nodes below file granularity.
const NON_MODULE_LOC: usize = 10;

/// Ranking length for the crate-level hotspot lists.
const TOP_N: usize = 10;

/// Computes the full metrics report for one analysis run.
pub fn compute_metrics(
    crates: &[CrateDef],
    graph: &DependencyGraph,
    cycles: &[Cycle],
) -> MetricsReport {
    let adjacency = graph.adjacency();
    let reverse = graph.reverse_adjacency();

    let mut fan_out: BTreeMap<&str, usize> = BTreeMap::new();
    let mut fan_in: BTreeMap<&str, usize> = BTreeMap::new();
    for edge in &graph.edges {
        *fan_out.entry(edge.from.as_str()).or_default() += edge.count;
        *fan_in.entry(edge.to.as_str()).or_default() += edge.count;
    }

    let mut cycle_of: BTreeMap<&str, usize> = BTreeMap::new();
    for (i, cycle) in cycles.iter().enumerate() {
        for id in &cycle.nodes {
            cycle_of.entry(id.as_str()).or_insert(i);
        }
    }

    let module_stats = collect_module_stats(crates);
    let mut loc_cache: HashMap<String, usize> = HashMap::new();
    let crate_roots: BTreeMap<&str, &str> = crates
        .iter()
        .map(|c| (c.name.as_str(), c.root_dir.as_str()))
        .collect();
    let multi_crate = crates.len() > 1;

    let mut nodes: BTreeMap<String, NodeMetrics> = BTreeMap::new();
    let mut modules: BTreeMap<String, ModuleMetrics> = BTreeMap::new();

    for node in graph.nodes.values() {
        let ca = reverse.get(node.id.as_str()).map_or(0, BTreeSet::len);
        let ce = adjacency.get(node.id.as_str()).map_or(0, BTreeSet::len);
        let instability = if ca + ce == 0 {
            0.0
        } else {
            ce as f64 / (ca + ce) as f64
        };
        let is_module = matches!(node.kind, NodeKind::Module | NodeKind::Crate);
        let abstractness = if node.kind == NodeKind::Trait { 1.0 } else { 0.0 };
        let out = fan_out.get(node.id.as_str()).copied().unwrap_or(0);

        let lines_of_code = if is_module {
            module_lines(
                node,
                multi_crate,
                &crate_roots,
                crates,
                &mut loc_cache,
            )
        } else {
            NON_MODULE_LOC
        };

        let metrics = NodeMetrics {
            ca,
            ce,
            instability,
            abstractness,
            distance: (abstractness + instability - 1.0).abs(),
            fan_in: fan_in.get(node.id.as_str()).copied().unwrap_or(0),
            fan_out: out,
            lines_of_code,
            complexity: if node.kind == NodeKind::Function {
                1 + out
            } else {
                1
            },
            in_cycle: cycle_of.contains_key(node.id.as_str()),
            cycle_id: cycle_of.get(node.id.as_str()).copied(),
        };

        if is_module {
            let stats = module_stats.get(&node.id).cloned().unwrap_or_default();
            modules.insert(node.id.clone(), module_metrics(metrics.clone(), &stats));
        }
        nodes.insert(node.id.clone(), metrics);
    }

    let crate_metrics = crate_metrics(graph, cycles, &modules, &loc_cache, &nodes);

    MetricsReport {
        crate_metrics,
        modules,
        nodes,
    }
}

/// Declaration tallies for one module, taken from the definition tree.
#[derive(Debug, Clone, Default)]
struct ModuleStats {
    total_types: usize,
    total_traits: usize,
    total_functions: usize,
    public_items: usize,
    private_items: usize,
}

/// Applies the module-level overrides: abstractness becomes the trait
/// ratio, distance is recomputed, and an empty stub module sits at zero
/// rather than maximal distance.
fn module_metrics(mut node: NodeMetrics, stats: &ModuleStats) -> ModuleMetrics {
    let denominator = stats.total_types + stats.total_traits;
    node.abstractness = if denominator == 0 {
        0.0
    } else {
        stats.total_traits as f64 / denominator as f64
    };
    let isolated = node.ca + node.ce == 0
        && denominator == 0
        && stats.total_functions == 0;
    node.distance = if isolated {
        0.0
    } else {
        (node.abstractness + node.instability - 1.0).abs()
    };
    ModuleMetrics {
        node,
        total_types: stats.total_types,
        total_traits: stats.total_traits,
        total_functions: stats.total_functions,
        public_items: stats.public_items,
        private_items: stats.private_items,
    }
}

fn collect_module_stats(crates: &[CrateDef]) -> BTreeMap<String, ModuleStats> {
    let multi = crates.len() > 1;
    let mut stats = BTreeMap::new();
    for crate_def in crates {
        collect_stats(&crate_def.root, &crate_def.name, multi, &mut stats);
    }
    stats
}

fn collect_stats(
    module: &Module,
    crate_name: &str,
    multi: bool,
    out: &mut BTreeMap<String, ModuleStats>,
) {
    let id = if multi {
        format!("{crate_name}::{}", module.path)
    } else {
        module.path.clone()
    };

    let mut stats = ModuleStats {
        total_types: module.structs.len() + module.enums.len() + module.type_aliases.len(),
        total_traits: module.traits.len(),
        total_functions: module.functions.len(),
        ..ModuleStats::default()
    };
    let visibilities = module
        .structs
        .iter()
        .map(|s| &s.visibility)
        .chain(module.enums.iter().map(|e| &e.visibility))
        .chain(module.traits.iter().map(|t| &t.visibility))
        .chain(module.functions.iter().map(|f| &f.visibility))
        .chain(module.constants.iter().map(|c| &c.visibility))
        .chain(module.statics.iter().map(|s| &s.visibility))
        .chain(module.type_aliases.iter().map(|a| &a.visibility));
    for visibility in visibilities {
        if visibility.is_public() {
            stats.public_items += 1;
        } else {
            stats.private_items += 1;
        }
    }

    out.insert(id, stats);
    for sub in &module.submodules {
        collect_stats(sub, crate_name, multi, out);
    }
}

/// Line count of the module's owning file, read once and cached.
fn module_lines(
    node: &modgraph_schemas::Node,
    multi_crate: bool,
    crate_roots: &BTreeMap<&str, &str>,
    crates: &[CrateDef],
    cache: &mut HashMap<String, usize>,
) -> usize {
    let root_dir = if multi_crate {
        node.id
            .split("::")
            .next()
            .and_then(|crate_name| crate_roots.get(crate_name).copied())
            .unwrap_or("")
    } else {
        crates.first().map(|c| c.root_dir.as_str()).unwrap_or("")
    };
    let full = if root_dir.is_empty() {
        node.file.clone()
    } else {
        format!("{root_dir}/{}", node.file)
    };
    if let Some(&lines) = cache.get(&full) {
        return lines;
    }
    let lines = match std::fs::read_to_string(Path::new(&full)) {
        Ok(source) => source.lines().count(),
        Err(e) => {
            debug!(file = %full, error = %e, "cannot count lines");
            0
        }
    };
    cache.insert(full, lines);
    lines
}

fn crate_metrics(
    graph: &DependencyGraph,
    cycles: &[Cycle],
    modules: &BTreeMap<String, ModuleMetrics>,
    loc_cache: &HashMap<String, usize>,
    nodes: &BTreeMap<String, NodeMetrics>,
) -> CrateMetrics {
    let module_count = modules.len();
    let mean = |f: &dyn Fn(&ModuleMetrics) -> f64| {
        if module_count == 0 {
            0.0
        } else {
            modules.values().map(|m| f(m)).sum::<f64>() / module_count as f64
        }
    };

    // Non-module nodes, ranked. Ties break on id so output is stable.
    let ranked = |value: &dyn Fn(&NodeMetrics) -> f64| {
        let mut entries: Vec<RankedNode> = nodes
            .iter()
            .filter(|(id, _)| {
                graph
                    .nodes
                    .get(*id)
                    .is_some_and(|n| !matches!(n.kind, NodeKind::Module | NodeKind::Crate))
            })
            .map(|(id, m)| RankedNode {
                id: id.clone(),
                value: value(m),
            })
            .collect();
        entries.sort_by(|a, b| {
            b.value
                .partial_cmp(&a.value)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then_with(|| a.id.cmp(&b.id))
        });
        entries.truncate(TOP_N);
        entries
    };

    CrateMetrics {
        total_modules: module_count,
        total_types: modules
            .values()
            .map(|m| m.total_types + m.total_traits)
            .sum(),
        total_functions: modules.values().map(|m| m.total_functions).sum(),
        total_lines: loc_cache.values().sum(),
        avg_instability: mean(&|m| m.node.instability),
        avg_abstractness: mean(&|m| m.node.abstractness),
        avg_distance: mean(&|m| m.node.distance),
        cycle_count: cycles.len(),
        most_coupled: ranked(&|m| (m.ca + m.ce) as f64),
        most_unstable: ranked(&|m| m.instability),
        highest_distance: ranked(&|m| m.distance),
    }
}
