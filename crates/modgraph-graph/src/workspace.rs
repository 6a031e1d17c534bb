//! Workspace linking: merging per-crate graphs and synthesizing
//! inter-crate edges.
//!
//! Each member crate is built in isolation with ids rooted at `crate`, then
//! every node id and edge endpoint is prefixed with the owning crate's name
//! (`alpha::crate::Widget`). Cross-crate imports — use declarations whose
//! first segment names another member, with hyphens normalized to
//! underscores — become `use_import` edges, and declarations referencing an
//! imported remote type get a typed edge at the referencing position.

use std::collections::BTreeMap;

use modgraph_schemas::{
    CrateDef, DependencyGraph, EdgeKind, Location, Module, Node, TypeRef, UseDecl,
};
use tracing::debug;

use crate::builder::build_crate_graph;

/// Standard-library roots; imports under these never link across crates.
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Builds the dependency graph for a set of crates.
///
/// A single crate keeps plain `crate::…` ids. Multiple crates go through
/// the workspace linker and get crate-prefixed ids.
pub fn build_graph(crates: &[CrateDef]) -> DependencyGraph {
    match crates {
        [single] => build_crate_graph(single),
        _ => link_workspace(crates),
    }
}

/// Merges per-crate graphs under crate-prefixed namespaces and adds
/// inter-crate edges.
pub fn link_workspace(crates: &[CrateDef]) -> DependencyGraph {
    let mut merged = DependencyGraph::default();

    for crate_def in crates {
        let graph = build_crate_graph(crate_def);
        let prefix = &crate_def.name;
        for (_, node) in graph.nodes {
            merged.nodes.insert(
                prefixed(prefix, &node.id),
                Node {
                    id: prefixed(prefix, &node.id),
                    name: node.name,
                    path: prefixed(prefix, &node.path),
                    kind: node.kind,
                    parent: node.parent.map(|p| prefixed(prefix, &p)),
                    file: node.file,
                    line: node.line,
                    children: node.children.iter().map(|c| prefixed(prefix, c)).collect(),
                },
            );
        }
        for mut edge in graph.edges {
            edge.from = prefixed(prefix, &edge.from);
            edge.to = prefixed(prefix, &edge.to);
            merged.edges.push(edge);
        }
    }

    // Import paths use underscores where crate names may use hyphens.
    let crate_names: BTreeMap<String, String> = crates
        .iter()
        .map(|c| (c.name.replace('-', "_"), c.name.clone()))
        .collect();

    for crate_def in crates {
        link_crate_imports(crate_def, &crate_names, &mut merged);
    }

    merged
}

fn prefixed(crate_name: &str, id: &str) -> String {
    format!("{crate_name}::{id}")
}

/// Walks one crate's modules and synthesizes its cross-crate edges.
fn link_crate_imports(
    crate_def: &CrateDef,
    crate_names: &BTreeMap<String, String>,
    merged: &mut DependencyGraph,
) {
    link_module(crate_def, &crate_def.root, crate_names, merged);
}

fn link_module(
    crate_def: &CrateDef,
    module: &Module,
    crate_names: &BTreeMap<String, String>,
    merged: &mut DependencyGraph,
) {
    let module_id = prefixed(&crate_def.name, &module.path);

    // Local name → remote node id, for the typed-reference pass below.
    let mut remote_imports: BTreeMap<String, String> = BTreeMap::new();

    for decl in &module.uses {
        let Some(first) = decl.segments.first() else {
            continue;
        };
        if matches!(first.as_str(), "crate" | "self" | "super")
            || STD_ROOTS.contains(&first.as_str())
        {
            continue;
        }
        let Some(target_crate) = crate_names.get(&first.replace('-', "_")) else {
            continue;
        };

        for (item_name, local_name) in imported_names(decl) {
            let Some(target_id) = lookup_last_segment(merged, target_crate, &item_name) else {
                debug!(
                    item = %item_name,
                    target_crate = %target_crate,
                    "cross-crate import did not resolve"
                );
                continue;
            };
            add_merged_edge(
                merged,
                &module_id,
                &target_id,
                EdgeKind::UseImport,
                Location {
                    file: module.file.clone(),
                    line: decl.line,
                    column: decl.column,
                },
            );
            remote_imports.insert(local_name, target_id);
        }
    }

    if !remote_imports.is_empty() {
        link_typed_references(crate_def, module, &remote_imports, merged);
    }

    for sub in &module.submodules {
        link_module(crate_def, sub, crate_names, merged);
    }
}

/// The `(lookup name, local binding)` pairs a cross-crate use declaration
/// contributes.
fn imported_names(decl: &UseDecl) -> Vec<(String, String)> {
    if decl.glob {
        // `use other_crate::sub::*`: the target is the path itself; the
        // last segment (or the crate root when the path is bare) is looked
        // up in the remote namespace.
        let last = decl.segments.last().cloned().unwrap_or_default();
        return vec![(last.clone(), last)];
    }
    if !decl.items.is_empty() {
        return decl
            .items
            .iter()
            .map(|item| {
                let lookup = if item.name == "self" {
                    decl.segments.last().cloned().unwrap_or_default()
                } else {
                    item.name
                        .rsplit("::")
                        .next()
                        .unwrap_or(&item.name)
                        .to_string()
                };
                let local = item.alias.clone().unwrap_or_else(|| lookup.clone());
                (lookup, local)
            })
            .collect();
    }
    let last = decl.segments.last().cloned().unwrap_or_default();
    let local = decl.alias.clone().unwrap_or_else(|| last.clone());
    vec![(last, local)]
}

/// Last-segment lookup within one crate's namespace of the merged graph.
///
/// When the name is the crate itself (e.g. `use alpha::*`), the crate root
/// module is the target. Otherwise the first node in ascending id order
/// whose id ends in `::<name>` wins.
fn lookup_last_segment(
    merged: &DependencyGraph,
    target_crate: &str,
    name: &str,
) -> Option<String> {
    if name.replace('-', "_") == target_crate.replace('-', "_") {
        let root = format!("{target_crate}::crate");
        return merged.nodes.contains_key(&root).then_some(root);
    }
    let prefix = format!("{target_crate}::");
    let suffix = format!("::{name}");
    merged
        .nodes
        .range(prefix.clone()..)
        .take_while(|(id, _)| id.starts_with(&prefix))
        .find(|(id, _)| id.ends_with(&suffix))
        .map(|(id, _)| id.clone())
}

/// Typed edges for declarations whose type references name an imported
/// remote symbol: fields, parameters, returns, and supertraits.
fn link_typed_references(
    crate_def: &CrateDef,
    module: &Module,
    remote_imports: &BTreeMap<String, String>,
    merged: &mut DependencyGraph,
) {
    let module_path = prefixed(&crate_def.name, &module.path);
    let file = &module.file;

    let emit = |merged: &mut DependencyGraph, from: &str, ty: &TypeRef, kind: EdgeKind| {
        remote_type_edges(merged, from, ty, kind, remote_imports, file);
    };

    for s in &module.structs {
        let id = format!("{module_path}::{}", s.name);
        for field in &s.fields {
            emit(merged, &id, &field.ty, EdgeKind::FieldType);
        }
    }
    for e in &module.enums {
        let id = format!("{module_path}::{}", e.name);
        for variant in &e.variants {
            for field in &variant.fields {
                emit(merged, &id, &field.ty, EdgeKind::FieldType);
            }
        }
    }
    for t in &module.traits {
        let id = format!("{module_path}::{}", t.name);
        for supertrait in &t.supertraits {
            emit(merged, &id, supertrait, EdgeKind::TraitBound);
        }
        for method in &t.methods {
            let method_id = format!("{id}::{}", method.name);
            for param in &method.params {
                if let Some(ty) = &param.ty {
                    emit(merged, &method_id, ty, EdgeKind::ParameterType);
                }
            }
            if let Some(ret) = &method.return_type {
                emit(merged, &method_id, ret, EdgeKind::ReturnType);
            }
        }
    }
    for f in &module.functions {
        let id = format!("{module_path}::{}", f.name);
        for param in &f.params {
            if let Some(ty) = &param.ty {
                emit(merged, &id, ty, EdgeKind::ParameterType);
            }
        }
        if let Some(ret) = &f.return_type {
            emit(merged, &id, ret, EdgeKind::ReturnType);
        }
    }
}

/// Emits an edge when the reference's unqualified name matches a remote
/// import; recurses through generic arguments.
fn remote_type_edges(
    merged: &mut DependencyGraph,
    from: &str,
    ty: &TypeRef,
    kind: EdgeKind,
    remote_imports: &BTreeMap<String, String>,
    file: &str,
) {
    let unqualified = ty.name.rsplit("::").next().unwrap_or(&ty.name);
    if let Some(target) = remote_imports.get(unqualified) {
        add_merged_edge(
            merged,
            from,
            target,
            kind,
            Location {
                file: file.to_string(),
                line: ty.line,
                column: ty.column,
            },
        );
    }
    for param in &ty.params {
        remote_type_edges(merged, from, param, kind, remote_imports, file);
    }
}

/// Deduplicating edge insertion over the merged edge list.
fn add_merged_edge(
    merged: &mut DependencyGraph,
    from: &str,
    to: &str,
    kind: EdgeKind,
    location: Location,
) {
    if from == to || !merged.nodes.contains_key(from) || !merged.nodes.contains_key(to) {
        return;
    }
    if let Some(edge) = merged
        .edges
        .iter_mut()
        .find(|e| e.from == from && e.to == to && e.kind == kind)
    {
        edge.count += 1;
        edge.locations.push(location);
        return;
    }
    merged.edges.push(modgraph_schemas::Edge {
        from: from.to_string(),
        to: to.to_string(),
        kind,
        count: 1,
        locations: vec![location],
    });
}
