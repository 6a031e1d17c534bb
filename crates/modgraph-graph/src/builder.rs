//! Two-pass dependency-graph construction for a single crate.
//!
//! Pass 1 creates one node per declaration: modules, structs, enums, traits,
//! free functions, trait methods, and impl methods keyed under their
//! (resolved) self type. Pass 2 walks the tree again and emits typed edges.
//! Edges are deduplicated on `(from, to, kind)` — repeats increment the
//! count and append a location — and are never emitted for self-references,
//! external targets, or endpoints missing from the node map.

use std::collections::{BTreeMap, HashMap};

use modgraph_schemas::{
    CrateDef, DependencyGraph, Edge, EdgeKind, FunctionDef, GenericParam, Location, Module, Node,
    NodeKind, ParamDef, SelfKind, TypeRef,
};
use tracing::debug;

use crate::index::SymbolIndex;
use crate::resolve::{is_marker, resolve_name, resolve_use, ResolvedImport, TypeResolution};

/// Per-module resolution products, keyed by module path.
struct ModuleImports {
    resolved: Vec<ResolvedImport>,
    /// Local name → fully qualified path, for the type-resolution fallback
    /// chain.
    aliases: BTreeMap<String, String>,
}

/// Builds the dependency graph of one crate, with ids rooted at `crate`.
pub fn build_crate_graph(crate_def: &CrateDef) -> DependencyGraph {
    let index = SymbolIndex::from_crate(crate_def);

    // Resolve every module's imports up front; the alias tables feed both
    // passes.
    let mut imports: BTreeMap<String, ModuleImports> = BTreeMap::new();
    collect_imports(&crate_def.root, &index, &mut imports);

    let mut builder = GraphBuilder::default();
    builder.create_nodes(&crate_def.root, None);
    builder.create_impl_method_nodes(&crate_def.root, &imports);
    builder.emit_edges(&crate_def.root, &imports);

    debug!(
        crate_name = %crate_def.name,
        nodes = builder.nodes.len(),
        edges = builder.edges.len(),
        unresolved_imports = builder.unresolved_imports,
        unresolved_refs = builder.unresolved_refs,
        "graph build complete"
    );

    DependencyGraph {
        nodes: builder.nodes,
        edges: builder.edges,
    }
}

fn collect_imports(module: &Module, index: &SymbolIndex, out: &mut BTreeMap<String, ModuleImports>) {
    let resolved: Vec<ResolvedImport> = module
        .uses
        .iter()
        .flat_map(|decl| resolve_use(decl, &module.path, index))
        .collect();
    let aliases = resolved
        .iter()
        .map(|import| (import.local_name.clone(), import.path.clone()))
        .collect();
    out.insert(
        module.path.clone(),
        ModuleImports { resolved, aliases },
    );
    for sub in &module.submodules {
        collect_imports(sub, index, out);
    }
}

static EMPTY_ALIASES: BTreeMap<String, String> = BTreeMap::new();

#[derive(Default)]
struct GraphBuilder {
    nodes: BTreeMap<String, Node>,
    edges: Vec<Edge>,
    edge_index: HashMap<(String, String, EdgeKind), usize>,
    /// Recoverable omission tallies, surfaced at the end of the build.
    unresolved_imports: usize,
    unresolved_refs: usize,
}

impl GraphBuilder {
    /// Inserts a node and registers it with its parent. First insertion
    /// wins; duplicate ids are dropped.
    fn add_node(&mut self, node: Node) {
        if self.nodes.contains_key(&node.id) {
            debug!(id = %node.id, "duplicate node id; keeping first");
            return;
        }
        if let Some(parent_id) = &node.parent {
            if let Some(parent) = self.nodes.get_mut(parent_id) {
                parent.children.push(node.id.clone());
            }
        }
        self.nodes.insert(node.id.clone(), node);
    }

    /// Records one dependency occurrence. No self-edges; both endpoints
    /// must exist in the node map.
    fn add_edge(&mut self, from: &str, to: &str, kind: EdgeKind, location: Location) {
        if from == to {
            return;
        }
        if !self.nodes.contains_key(from) || !self.nodes.contains_key(to) {
            return;
        }
        let key = (from.to_string(), to.to_string(), kind);
        if let Some(&i) = self.edge_index.get(&key) {
            self.edges[i].count += 1;
            self.edges[i].locations.push(location);
            return;
        }
        self.edge_index.insert(key, self.edges.len());
        self.edges.push(Edge {
            from: from.to_string(),
            to: to.to_string(),
            kind,
            count: 1,
            locations: vec![location],
        });
    }

    // -----------------------------------------------------------------------
    // Pass 1: nodes
    // -----------------------------------------------------------------------

    fn create_nodes(&mut self, module: &Module, parent: Option<&str>) {
        let kind = if parent.is_none() {
            NodeKind::Crate
        } else {
            NodeKind::Module
        };
        self.add_node(Node {
            id: module.path.clone(),
            name: module.name.clone(),
            path: module.path.clone(),
            kind,
            parent: parent.map(str::to_string),
            file: module.file.clone(),
            line: module.line,
            children: Vec::new(),
        });

        for s in &module.structs {
            self.add_declaration(module, &s.name, NodeKind::Struct, s.line);
        }
        for e in &module.enums {
            self.add_declaration(module, &e.name, NodeKind::Enum, e.line);
        }
        for t in &module.traits {
            let trait_id = self.add_declaration(module, &t.name, NodeKind::Trait, t.line);
            // Trait methods are functions parented by the trait.
            for method in &t.methods {
                self.add_node(Node {
                    id: format!("{trait_id}::{}", method.name),
                    name: method.name.clone(),
                    path: format!("{trait_id}::{}", method.name),
                    kind: NodeKind::Function,
                    parent: Some(trait_id.clone()),
                    file: module.file.clone(),
                    line: method.line,
                    children: Vec::new(),
                });
            }
        }
        for f in &module.functions {
            self.add_declaration(module, &f.name, NodeKind::Function, f.line);
        }

        for sub in &module.submodules {
            self.create_nodes(sub, Some(&module.path));
        }
    }

    fn add_declaration(&mut self, module: &Module, name: &str, kind: NodeKind, line: usize) -> String {
        let id = format!("{}::{name}", module.path);
        self.add_node(Node {
            id: id.clone(),
            name: name.to_string(),
            path: id.clone(),
            kind,
            parent: Some(module.path.clone()),
            file: module.file.clone(),
            line,
            children: Vec::new(),
        });
        id
    }

    /// Pass 1b: method nodes keyed under each impl's resolved self type.
    ///
    /// Runs after all primary nodes exist so self types resolve through the
    /// shared fallback chain. Impls whose self type is not in this crate are
    /// skipped; duplicate method ids across impl blocks keep the first.
    fn create_impl_method_nodes(
        &mut self,
        module: &Module,
        imports: &BTreeMap<String, ModuleImports>,
    ) {
        let aliases = imports
            .get(&module.path)
            .map(|m| &m.aliases)
            .unwrap_or(&EMPTY_ALIASES);

        for imp in &module.impls {
            let TypeResolution::Resolved(owner) =
                resolve_name(&imp.self_ty.name, &module.path, aliases, &self.nodes)
            else {
                debug!(
                    self_ty = %imp.self_ty.name,
                    module = %module.path,
                    "impl self type not in crate; skipping its methods"
                );
                continue;
            };
            for method in &imp.methods {
                self.add_node(Node {
                    id: format!("{owner}::{}", method.name),
                    name: method.name.clone(),
                    path: format!("{owner}::{}", method.name),
                    kind: NodeKind::Function,
                    parent: Some(owner.clone()),
                    file: module.file.clone(),
                    line: method.line,
                    children: Vec::new(),
                });
            }
        }

        for sub in &module.submodules {
            self.create_impl_method_nodes(sub, imports);
        }
    }

    // -----------------------------------------------------------------------
    // Pass 2: edges
    // -----------------------------------------------------------------------

    fn emit_edges(&mut self, module: &Module, imports: &BTreeMap<String, ModuleImports>) {
        let module_imports = imports.get(&module.path);
        let aliases = module_imports.map(|m| &m.aliases).unwrap_or(&EMPTY_ALIASES);

        // 0. Mod declarations: the parent depends on each submodule it
        // declares.
        for sub in &module.submodules {
            self.add_edge(
                &module.path,
                &sub.path,
                EdgeKind::UseImport,
                Location {
                    file: module.file.clone(),
                    line: sub.line,
                    column: 1,
                },
            );
        }

        // 1. Imports.
        if let Some(module_imports) = module_imports {
            for import in &module_imports.resolved {
                if import.category.is_none() {
                    debug!(
                        path = %import.path,
                        module = %module.path,
                        "unresolved import; omitting edge"
                    );
                    self.unresolved_imports += 1;
                    continue;
                }
                self.add_edge(
                    &module.path,
                    &import.path,
                    EdgeKind::UseImport,
                    Location {
                        file: module.file.clone(),
                        line: import.line,
                        column: import.column,
                    },
                );
            }
        }

        // 2. Structs and enums: field types and declaration bounds.
        for s in &module.structs {
            let id = format!("{}::{}", module.path, s.name);
            for field in &s.fields {
                self.type_edges(&id, &field.ty, EdgeKind::FieldType, module, aliases);
            }
            self.bound_edges(&id, &s.generics, module, aliases);
        }
        for e in &module.enums {
            let id = format!("{}::{}", module.path, e.name);
            for variant in &e.variants {
                for field in &variant.fields {
                    self.type_edges(&id, &field.ty, EdgeKind::FieldType, module, aliases);
                }
            }
            self.bound_edges(&id, &e.generics, module, aliases);
        }

        // 3. Traits: supertraits, then methods as functions under the trait.
        for t in &module.traits {
            let id = format!("{}::{}", module.path, t.name);
            for supertrait in &t.supertraits {
                self.type_edges(&id, supertrait, EdgeKind::TraitBound, module, aliases);
            }
            self.bound_edges(&id, &t.generics, module, aliases);
            for method in &t.methods {
                let method_id = format!("{id}::{}", method.name);
                self.function_edges(&method_id, method, module, aliases);
            }
        }

        // 4. Free functions.
        for f in &module.functions {
            let id = format!("{}::{}", module.path, f.name);
            self.function_edges(&id, f, module, aliases);
        }

        // 5. Impls: trait_impl, then methods under the self type.
        for imp in &module.impls {
            let self_resolution = resolve_name(&imp.self_ty.name, &module.path, aliases, &self.nodes);
            let TypeResolution::Resolved(self_id) = self_resolution else {
                continue;
            };
            if let Some(trait_ref) = &imp.trait_ref {
                if let TypeResolution::Resolved(trait_id) =
                    resolve_name(&trait_ref.name, &module.path, aliases, &self.nodes)
                {
                    self.add_edge(
                        &self_id,
                        &trait_id,
                        EdgeKind::TraitImpl,
                        Location {
                            file: module.file.clone(),
                            line: trait_ref.line,
                            column: trait_ref.column,
                        },
                    );
                }
                // Generic arguments of the implemented trait
                // (`impl Store<Task> for X`) reference types in their own
                // right.
                for arg in &trait_ref.params {
                    self.type_edges(&self_id, arg, EdgeKind::TypeReference, module, aliases);
                }
            }
            for arg in &imp.self_ty.params {
                self.type_edges(&self_id, arg, EdgeKind::TypeReference, module, aliases);
            }
            for method in &imp.methods {
                let method_id = format!("{self_id}::{}", method.name);
                self.function_edges(&method_id, method, module, aliases);
            }
        }

        for sub in &module.submodules {
            self.emit_edges(sub, imports);
        }
    }

    /// Parameter, return, bound, and call edges for one function node.
    fn function_edges(
        &mut self,
        fn_id: &str,
        def: &FunctionDef,
        module: &Module,
        aliases: &BTreeMap<String, String>,
    ) {
        if !self.nodes.contains_key(fn_id) {
            return;
        }
        for param in &def.params {
            if !is_plain_param(param) {
                continue;
            }
            if let Some(ty) = &param.ty {
                self.type_edges(fn_id, ty, EdgeKind::ParameterType, module, aliases);
            }
        }
        if let Some(ret) = &def.return_type {
            self.type_edges(fn_id, ret, EdgeKind::ReturnType, module, aliases);
        }
        self.bound_edges(fn_id, &def.generics, module, aliases);
        for call in &def.calls {
            let kind = if call.is_method {
                EdgeKind::MethodCall
            } else {
                EdgeKind::FunctionCall
            };
            if let TypeResolution::Resolved(callee) =
                resolve_name(&call.callee, &module.path, aliases, &self.nodes)
            {
                self.add_edge(
                    fn_id,
                    &callee,
                    kind,
                    Location {
                        file: module.file.clone(),
                        line: call.line,
                        column: call.column,
                    },
                );
            }
        }
    }

    /// Emits edges for a type reference, recursing through generic
    /// arguments with the same kind. Markers and externals contribute no
    /// edge themselves but are still recursed.
    fn type_edges(
        &mut self,
        from: &str,
        ty: &TypeRef,
        kind: EdgeKind,
        module: &Module,
        aliases: &BTreeMap<String, String>,
    ) {
        if !is_marker(&ty.name) {
            match resolve_name(&ty.name, &module.path, aliases, &self.nodes) {
                TypeResolution::Resolved(target) => {
                    self.add_edge(
                        from,
                        &target,
                        kind,
                        Location {
                            file: module.file.clone(),
                            line: ty.line,
                            column: ty.column,
                        },
                    );
                }
                TypeResolution::Unresolved => self.unresolved_refs += 1,
                TypeResolution::External => {}
            }
        }
        for param in &ty.params {
            self.type_edges(from, param, kind, module, aliases);
        }
    }

    /// Trait-bound edges for a declaration's generic parameters.
    fn bound_edges(
        &mut self,
        from: &str,
        generics: &[GenericParam],
        module: &Module,
        aliases: &BTreeMap<String, String>,
    ) {
        for generic in generics {
            for bound in &generic.bounds {
                self.type_edges(from, bound, EdgeKind::TraitBound, module, aliases);
            }
        }
    }
}

fn is_plain_param(param: &ParamDef) -> bool {
    param.self_kind == SelfKind::None
}
