//! End-to-end tests: extraction through graph construction on real
//! fixtures.

use std::path::PathBuf;

use modgraph_extract::{resolve_project, FilterConfig};
use modgraph_graph::{aggregate_modules, build_graph};
use modgraph_schemas::EdgeKind;

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../modgraph-extract/tests/fixtures")
        .join(name)
}

#[test]
fn test_simple_crate_graph() {
    let crates = resolve_project(&fixture("simple"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);

    for id in [
        "crate",
        "crate::models",
        "crate::models::Task",
        "crate::models::Task::new",
        "crate::models::Identified",
        "crate::store::TaskStore",
        "crate::store::TaskStore::create",
        "crate::util::next_id",
    ] {
        assert!(graph.nodes.contains_key(id), "missing node {id}");
    }

    let has = |from: &str, to: &str, kind: EdgeKind| {
        graph
            .edges
            .iter()
            .any(|e| e.from == from && e.to == to && e.kind == kind)
    };

    // lib.rs re-exports Task and imports TaskStore.
    assert!(has("crate", "crate::models::Task", EdgeKind::UseImport));
    assert!(has("crate", "crate::store::TaskStore", EdgeKind::UseImport));
    // Task::new calls util::next_id.
    assert!(has(
        "crate::models::Task::new",
        "crate::util::next_id",
        EdgeKind::FunctionCall
    ));
    // Trait implementations.
    assert!(has(
        "crate::models::Task",
        "crate::models::Identified",
        EdgeKind::TraitImpl
    ));
    assert!(has(
        "crate::store::TaskStore",
        "crate::Repository",
        EdgeKind::TraitImpl
    ));
    // TaskStore::create calls Task::new through the import alias.
    assert!(has(
        "crate::store::TaskStore::create",
        "crate::models::Task::new",
        EdgeKind::FunctionCall
    ));
    // open() returns TaskStore.
    assert!(has(
        "crate::open",
        "crate::store::TaskStore",
        EdgeKind::ReturnType
    ));

    // Every edge endpoint is a node, no self-edges, counts match locations.
    for edge in &graph.edges {
        assert!(graph.nodes.contains_key(&edge.from));
        assert!(graph.nodes.contains_key(&edge.to));
        assert_ne!(edge.from, edge.to);
        assert_eq!(edge.count, edge.locations.len());
    }
}

#[test]
fn test_module_nodes_carry_declaration_lines() {
    // lib.rs declares `mod models;`, `mod store;`, `mod util;` on lines
    // 1-3; the module nodes record those lines.
    let crates = resolve_project(&fixture("simple"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);

    assert_eq!(graph.nodes["crate"].line, 1);
    assert_eq!(graph.nodes["crate::models"].line, 1);
    assert_eq!(graph.nodes["crate::store"].line, 2);
    assert_eq!(graph.nodes["crate::util"].line, 3);
}

#[test]
fn test_parent_child_invariants() {
    let crates = resolve_project(&fixture("simple"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);

    for node in graph.nodes.values() {
        if let Some(parent) = &node.parent {
            let parent_node = graph.nodes.get(parent).expect("parent exists");
            assert!(
                parent_node.children.contains(&node.id),
                "{} missing from children of {}",
                node.id,
                parent
            );
        } else {
            assert_eq!(node.id, "crate");
        }
    }
}

#[test]
fn test_workspace_fixture_links_crates() {
    let crates = resolve_project(&fixture("workspace"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);

    for id in [
        "alpha::crate",
        "alpha::crate::Widget",
        "beta::crate",
        "beta::crate::install",
    ] {
        assert!(graph.nodes.contains_key(id), "missing node {id}");
    }

    assert!(graph.edges.iter().any(|e| {
        e.from == "beta::crate"
            && e.to == "alpha::crate::Widget"
            && e.kind == EdgeKind::UseImport
    }));
    assert!(graph.edges.iter().any(|e| {
        e.from == "beta::crate::install"
            && e.to == "alpha::crate::Widget"
            && e.kind == EdgeKind::ParameterType
    }));
}

#[test]
fn test_module_aggregation_on_fixture() {
    let crates = resolve_project(&fixture("simple"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);
    let modules = aggregate_modules(&graph);

    let ids: Vec<&str> = modules.nodes.keys().map(String::as_str).collect();
    assert_eq!(
        ids,
        vec!["crate", "crate::models", "crate::store", "crate::util"]
    );
    // store depends on models at module granularity.
    assert!(modules
        .edges
        .iter()
        .any(|e| e.from == "crate::store" && e.to == "crate::models"));
    // Aggregation is idempotent.
    assert_eq!(aggregate_modules(&modules), modules);
}

#[test]
fn test_layered_crate_relative_imports_and_glob() {
    let crates = resolve_project(&fixture("layered"), &FilterConfig::default()).unwrap();
    let graph = build_graph(&crates);

    let has = |from: &str, to: &str, kind: EdgeKind| {
        graph
            .edges
            .iter()
            .any(|e| e.from == from && e.to == to && e.kind == kind)
    };

    // `pub use crate::api::*` expands against the index: one edge per
    // symbol declared directly in api.
    for target in ["crate::api::Client", "crate::api::Mode", "crate::api::Runner"] {
        assert!(
            has("crate", target, EdgeKind::UseImport),
            "glob expansion missing {target}"
        );
    }

    // `use self::parts::Gear` inside engine.rs.
    assert!(has(
        "crate::engine",
        "crate::engine::parts::Gear",
        EdgeKind::UseImport
    ));
    // `use super::Engine` inside engine/parts.rs.
    assert!(has(
        "crate::engine::parts",
        "crate::engine::Engine",
        EdgeKind::UseImport
    ));

    // The super-imported type flows into a parameter edge, and the method
    // call on it resolves to the impl method.
    assert!(has(
        "crate::engine::parts::attach",
        "crate::engine::Engine",
        EdgeKind::ParameterType
    ));
    assert!(has(
        "crate::engine::parts::attach",
        "crate::engine::Engine::spin",
        EdgeKind::MethodCall
    ));

    // Trait implementation inside api.rs.
    assert!(has(
        "crate::api::Client",
        "crate::api::Runner",
        EdgeKind::TraitImpl
    ));

    // Field through the imported alias.
    assert!(has(
        "crate::api::Client",
        "crate::engine::Engine",
        EdgeKind::FieldType
    ));
}

#[test]
fn test_filter_presets_change_graph_shape() {
    let with_tests = build_graph(
        &resolve_project(&fixture("filtered"), &FilterConfig::default()).unwrap(),
    );
    for id in ["crate::utils", "crate::utils_tests", "crate::tests", "crate::integration"] {
        assert!(with_tests.nodes.contains_key(id), "missing {id}");
    }

    let without = build_graph(
        &resolve_project(&fixture("filtered"), &FilterConfig::no_tests()).unwrap(),
    );
    assert!(without.nodes.contains_key("crate::utils"));
    for id in ["crate::utils_tests", "crate::tests", "crate::integration"] {
        assert!(!without.nodes.contains_key(id), "{id} should be filtered");
    }
}

#[test]
fn test_graph_is_deterministic() {
    let crates = resolve_project(&fixture("simple"), &FilterConfig::default()).unwrap();
    let a = serde_json::to_string(&build_graph(&crates)).unwrap();
    let b = serde_json::to_string(&build_graph(&crates)).unwrap();
    assert_eq!(a, b);
}
