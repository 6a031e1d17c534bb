//! Name resolution: import base paths, use declarations, and type
//! references.
//!
//! Resolution is deliberately weaker than a type checker. Imports resolve
//! against the symbol index; type and callee references resolve against the
//! node map through a fixed fallback chain (import alias table, current
//! module, crate root, last-resort suffix match). Anything that fails every
//! tier is logged and dropped — a missing edge, never an error.

use std::collections::BTreeMap;

use modgraph_schemas::{Node, UseDecl};
use tracing::{debug, warn};

use crate::index::{SymbolCategory, SymbolIndex};

/// Standard-library roots. Imports under these are external: no edges.
const STD_ROOTS: &[&str] = &["std", "core", "alloc"];

/// Primitive type names; they map to `std::<name>` and emit no edge.
const PRIMITIVES: &[&str] = &[
    "bool", "char", "str", "i8", "i16", "i32", "i64", "i128", "isize", "u8", "u16", "u32", "u64",
    "u128", "usize", "f32", "f64",
];

/// Curated standard-library container and wrapper names treated as external.
const STD_TYPES: &[&str] = &[
    "String",
    "Vec",
    "Option",
    "Result",
    "Box",
    "Rc",
    "Arc",
    "Cell",
    "RefCell",
    "UnsafeCell",
    "Mutex",
    "RwLock",
    "HashMap",
    "HashSet",
    "BTreeMap",
    "BTreeSet",
    "VecDeque",
    "LinkedList",
    "BinaryHeap",
    "Cow",
    "PhantomData",
];

/// Structural type markers produced by extraction (`&T`, tuples, arrays,
/// function types). Never resolve; consumers recurse into their parameters.
const MARKERS: &[&str] = &["&", "*", "()", "[]", "fn", "!"];

pub(crate) fn is_marker(name: &str) -> bool {
    MARKERS.contains(&name)
}

fn is_external_name(name: &str) -> bool {
    PRIMITIVES.contains(&name) || STD_TYPES.contains(&name) || name == "Self"
}

/// The base of an import path after the leading-segment rules.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum BasePath {
    /// Intra-crate path segments, starting with `crate`.
    Internal(Vec<String>),
    /// Standard-library or otherwise external path; no edges.
    External,
}

/// Applies the leading-segment table to an import path.
///
/// `crate` stays verbatim; `self`/`super` resolve against the containing
/// module; standard-library roots are external; anything else is assumed
/// intra-crate (the workspace linker revisits those in workspace mode).
pub(crate) fn resolve_base(segments: &[String], module_path: &str) -> BasePath {
    let Some(first) = segments.first() else {
        return BasePath::External;
    };
    match first.as_str() {
        "crate" => BasePath::Internal(segments.to_vec()),
        "self" => {
            let mut base: Vec<String> = module_path.split("::").map(str::to_string).collect();
            base.extend(segments[1..].iter().cloned());
            BasePath::Internal(base)
        }
        "super" => {
            let mut base: Vec<String> = module_path.split("::").map(str::to_string).collect();
            let mut rest = &segments[..];
            while rest.first().is_some_and(|s| s == "super") {
                base.pop();
                rest = &rest[1..];
            }
            if base.is_empty() {
                base.push("crate".to_string());
            }
            base.extend(rest.iter().cloned());
            BasePath::Internal(base)
        }
        root if STD_ROOTS.contains(&root) => BasePath::External,
        _ => {
            let mut base = vec!["crate".to_string()];
            base.extend(segments.iter().cloned());
            BasePath::Internal(base)
        }
    }
}

/// One import after resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ResolvedImport {
    /// Name the import binds in the containing module.
    pub local_name: String,
    /// Fully qualified target path.
    pub path: String,
    /// Category when the target exists in the index; `None` otherwise (the
    /// corresponding edge is omitted).
    pub category: Option<SymbolCategory>,
    /// Position of the originating use declaration.
    pub line: usize,
    pub column: usize,
}

/// Resolves one use declaration to zero or more imports.
pub(crate) fn resolve_use(
    decl: &UseDecl,
    module_path: &str,
    index: &SymbolIndex,
) -> Vec<ResolvedImport> {
    let base = match resolve_base(&decl.segments, module_path) {
        BasePath::Internal(base) => base.join("::"),
        BasePath::External => return Vec::new(),
    };

    if decl.glob {
        return index
            .children_of(&base)
            .into_iter()
            .map(|(path, category)| ResolvedImport {
                local_name: path[base.len() + 2..].to_string(),
                path: path.to_string(),
                category: Some(category),
                line: decl.line,
                column: decl.column,
            })
            .collect();
    }

    if !decl.items.is_empty() {
        return decl
            .items
            .iter()
            .map(|item| {
                if item.name == "self" {
                    // `use a::b::{self}`: the base path itself.
                    let local = item
                        .alias
                        .clone()
                        .or_else(|| base.rsplit("::").next().map(str::to_string))
                        .unwrap_or_else(|| base.clone());
                    ResolvedImport {
                        local_name: local,
                        category: index.category_of(&base),
                        path: base.clone(),
                        line: decl.line,
                        column: decl.column,
                    }
                } else {
                    let path = format!("{base}::{}", item.name);
                    let local = item
                        .alias
                        .clone()
                        .unwrap_or_else(|| last_segment(&item.name).to_string());
                    ResolvedImport {
                        local_name: local,
                        category: index.category_of(&path),
                        path,
                        line: decl.line,
                        column: decl.column,
                    }
                }
            })
            .collect();
    }

    // Single path.
    let local = decl
        .alias
        .clone()
        .unwrap_or_else(|| last_segment(&base).to_string());
    vec![ResolvedImport {
        local_name: local,
        category: index.category_of(&base),
        path: base,
        line: decl.line,
        column: decl.column,
    }]
}

fn last_segment(path: &str) -> &str {
    path.rsplit("::").next().unwrap_or(path)
}

/// Outcome of resolving a type or callee reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum TypeResolution {
    /// Known node id.
    Resolved(String),
    /// Primitive or standard-library name; no edge, by design.
    External,
    /// Nothing matched; the edge is omitted.
    Unresolved,
}

/// Resolves a reference name against the node map.
///
/// Tiers, in order: the module-local import alias table, the current module,
/// the crate root, and finally a suffix match over the sorted node map. The
/// suffix match takes the first candidate in ascending id order; ambiguity
/// is logged.
pub(crate) fn resolve_name(
    name: &str,
    module_path: &str,
    aliases: &BTreeMap<String, String>,
    nodes: &BTreeMap<String, Node>,
) -> TypeResolution {
    if is_marker(name) {
        return TypeResolution::Unresolved;
    }
    if is_external_name(name) {
        return TypeResolution::External;
    }

    if name.contains("::") {
        return resolve_qualified(name, module_path, aliases, nodes);
    }

    if let Some(target) = aliases.get(name) {
        return TypeResolution::Resolved(target.clone());
    }
    let in_module = format!("{module_path}::{name}");
    if nodes.contains_key(&in_module) {
        return TypeResolution::Resolved(in_module);
    }
    let in_root = format!("crate::{name}");
    if nodes.contains_key(&in_root) {
        return TypeResolution::Resolved(in_root);
    }
    suffix_match(name, nodes)
}

/// Qualified references (`a::Foo`, `super::Foo`, `Foo::new`): substitute a
/// leading import alias, normalize the base, then try exact and suffix
/// lookups.
fn resolve_qualified(
    name: &str,
    module_path: &str,
    aliases: &BTreeMap<String, String>,
    nodes: &BTreeMap<String, Node>,
) -> TypeResolution {
    let segments: Vec<String> = name.split("::").map(str::to_string).collect();
    let first = segments[0].as_str();
    if STD_ROOTS.contains(&first) {
        return TypeResolution::External;
    }

    // A leading segment bound by an import: `use crate::models::Task;` makes
    // `Task::new` resolve under `crate::models::Task`.
    if let Some(target) = aliases.get(first) {
        let mut full = target.clone();
        for segment in &segments[1..] {
            full.push_str("::");
            full.push_str(segment);
        }
        if nodes.contains_key(&full) {
            return TypeResolution::Resolved(full);
        }
    }

    // Normalize relative prefixes, then try the path as an id.
    if let BasePath::Internal(base) = resolve_base(&segments, module_path) {
        let full = base.join("::");
        if nodes.contains_key(&full) {
            return TypeResolution::Resolved(full);
        }
        let in_module = format!("{module_path}::{}", segments.join("::"));
        if nodes.contains_key(&in_module) {
            return TypeResolution::Resolved(in_module);
        }
    }

    // Suffix match on the written tail, minus any relative prefix.
    let tail: Vec<&str> = segments
        .iter()
        .map(String::as_str)
        .skip_while(|s| matches!(*s, "crate" | "self" | "super"))
        .collect();
    if tail.is_empty() {
        return TypeResolution::Unresolved;
    }
    suffix_match(&tail.join("::"), nodes)
}

/// Last-resort lookup: the first node (in ascending id order) whose id ends
/// in `::<name>`.
fn suffix_match(name: &str, nodes: &BTreeMap<String, Node>) -> TypeResolution {
    let suffix = format!("::{name}");
    let mut matches = nodes.keys().filter(|id| id.ends_with(&suffix));
    let Some(first) = matches.next() else {
        debug!(name = %name, "reference did not resolve");
        return TypeResolution::Unresolved;
    };
    if matches.next().is_some() {
        warn!(
            name = %name,
            chosen = %first,
            "ambiguous suffix match; taking first in id order"
        );
    }
    TypeResolution::Resolved(first.clone())
}

#[cfg(test)]
mod tests {
    use modgraph_schemas::{NodeKind, UseItem, Visibility};

    use super::*;

    fn seg(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_base_crate_verbatim() {
        assert_eq!(
            resolve_base(&seg(&["crate", "a", "Foo"]), "crate::m"),
            BasePath::Internal(seg(&["crate", "a", "Foo"]))
        );
    }

    #[test]
    fn test_base_self_and_super() {
        assert_eq!(
            resolve_base(&seg(&["self", "child", "X"]), "crate::m"),
            BasePath::Internal(seg(&["crate", "m", "child", "X"]))
        );
        assert_eq!(
            resolve_base(&seg(&["super", "X"]), "crate::m::n"),
            BasePath::Internal(seg(&["crate", "m", "X"]))
        );
        assert_eq!(
            resolve_base(&seg(&["super", "super", "X"]), "crate::m::n"),
            BasePath::Internal(seg(&["crate", "X"]))
        );
    }

    #[test]
    fn test_base_std_external() {
        assert_eq!(
            resolve_base(&seg(&["std", "collections", "HashMap"]), "crate"),
            BasePath::External
        );
    }

    #[test]
    fn test_base_bare_assumed_intra_crate() {
        assert_eq!(
            resolve_base(&seg(&["models", "Task"]), "crate"),
            BasePath::Internal(seg(&["crate", "models", "Task"]))
        );
    }

    fn node(id: &str, kind: NodeKind) -> Node {
        Node {
            id: id.to_string(),
            name: id.rsplit("::").next().unwrap().to_string(),
            path: id.to_string(),
            kind,
            parent: None,
            file: "src/lib.rs".to_string(),
            line: 1,
            children: Vec::new(),
        }
    }

    fn nodes(ids: &[(&str, NodeKind)]) -> BTreeMap<String, Node> {
        ids.iter()
            .map(|(id, kind)| (id.to_string(), node(id, *kind)))
            .collect()
    }

    #[test]
    fn test_resolve_name_tiers() {
        let nodes = nodes(&[
            ("crate::Foo", NodeKind::Struct),
            ("crate::m::Foo", NodeKind::Struct),
            ("crate::other::Bar", NodeKind::Struct),
        ]);
        let mut aliases = BTreeMap::new();
        aliases.insert("Aliased".to_string(), "crate::other::Bar".to_string());

        // Tier (a): alias table.
        assert_eq!(
            resolve_name("Aliased", "crate::m", &aliases, &nodes),
            TypeResolution::Resolved("crate::other::Bar".to_string())
        );
        // Tier (b): current module beats crate root.
        assert_eq!(
            resolve_name("Foo", "crate::m", &aliases, &nodes),
            TypeResolution::Resolved("crate::m::Foo".to_string())
        );
        // Tier (c): crate root.
        assert_eq!(
            resolve_name("Foo", "crate::elsewhere", &aliases, &nodes),
            TypeResolution::Resolved("crate::Foo".to_string())
        );
        // Tier (d): suffix match.
        assert_eq!(
            resolve_name("Bar", "crate::m", &BTreeMap::new(), &nodes),
            TypeResolution::Resolved("crate::other::Bar".to_string())
        );
    }

    #[test]
    fn test_resolve_name_externals() {
        let nodes = nodes(&[("crate::Foo", NodeKind::Struct)]);
        let aliases = BTreeMap::new();
        assert_eq!(
            resolve_name("Vec", "crate", &aliases, &nodes),
            TypeResolution::External
        );
        assert_eq!(
            resolve_name("usize", "crate", &aliases, &nodes),
            TypeResolution::External
        );
        assert_eq!(
            resolve_name("Missing", "crate", &aliases, &nodes),
            TypeResolution::Unresolved
        );
    }

    #[test]
    fn test_resolve_qualified_through_alias() {
        let nodes = nodes(&[
            ("crate::models::Task", NodeKind::Struct),
            ("crate::models::Task::new", NodeKind::Function),
        ]);
        let mut aliases = BTreeMap::new();
        aliases.insert("Task".to_string(), "crate::models::Task".to_string());
        assert_eq!(
            resolve_name("Task::new", "crate::store", &aliases, &nodes),
            TypeResolution::Resolved("crate::models::Task::new".to_string())
        );
    }

    #[test]
    fn test_resolve_qualified_suffix_fallback() {
        let nodes = nodes(&[("crate::deep::Task::new", NodeKind::Function)]);
        assert_eq!(
            resolve_name("Task::new", "crate", &BTreeMap::new(), &nodes),
            TypeResolution::Resolved("crate::deep::Task::new".to_string())
        );
    }

    #[test]
    fn test_suffix_ambiguity_takes_first_in_id_order() {
        let nodes = nodes(&[
            ("crate::b::Foo", NodeKind::Struct),
            ("crate::a::Foo", NodeKind::Struct),
        ]);
        assert_eq!(
            resolve_name("Foo", "crate::m", &BTreeMap::new(), &nodes),
            TypeResolution::Resolved("crate::a::Foo".to_string())
        );
    }

    fn use_decl(segments: &[&str], glob: bool, items: &[(&str, Option<&str>)]) -> UseDecl {
        UseDecl {
            segments: seg(segments),
            alias: None,
            glob,
            items: items
                .iter()
                .map(|(name, alias)| UseItem {
                    name: name.to_string(),
                    alias: alias.map(str::to_string),
                })
                .collect(),
            visibility: Visibility::Private,
            line: 1,
            column: 1,
        }
    }

    fn sample_index() -> SymbolIndex {
        use modgraph_schemas::{CrateDef, Module, StructDef, TraitDef};
        let mut root = Module::stub("crate", "crate", "src/lib.rs", Visibility::Public);
        let mut m = Module::stub("m", "crate::m", "src/m.rs", Visibility::Public);
        m.structs.push(StructDef {
            name: "Alpha".to_string(),
            ..StructDef::default()
        });
        m.structs.push(StructDef {
            name: "Beta".to_string(),
            ..StructDef::default()
        });
        m.traits.push(TraitDef {
            name: "Gamma".to_string(),
            ..TraitDef::default()
        });
        root.submodules.push(m);
        SymbolIndex::from_crate(&CrateDef {
            name: "sample".to_string(),
            root,
            ..CrateDef::default()
        })
    }

    #[test]
    fn test_resolve_use_glob_enumerates_sorted() {
        let index = sample_index();
        let decl = use_decl(&["crate", "m"], true, &[]);
        let resolved = resolve_use(&decl, "crate", &index);
        let paths: Vec<&str> = resolved.iter().map(|r| r.path.as_str()).collect();
        assert_eq!(
            paths,
            vec!["crate::m::Alpha", "crate::m::Beta", "crate::m::Gamma"]
        );
        assert_eq!(resolved[0].local_name, "Alpha");
        assert_eq!(resolved[2].category, Some(SymbolCategory::Trait));
    }

    #[test]
    fn test_resolve_use_glob_of_empty_module() {
        let index = sample_index();
        let decl = use_decl(&["crate", "m", "Alpha"], true, &[]);
        assert!(resolve_use(&decl, "crate", &index).is_empty());
    }

    #[test]
    fn test_resolve_use_items_with_alias_and_self() {
        let index = sample_index();
        let decl = use_decl(
            &["crate", "m"],
            false,
            &[("Alpha", None), ("Beta", Some("B")), ("self", None)],
        );
        let resolved = resolve_use(&decl, "crate", &index);
        assert_eq!(resolved.len(), 3);
        assert_eq!(resolved[0].path, "crate::m::Alpha");
        assert_eq!(resolved[0].local_name, "Alpha");
        assert_eq!(resolved[1].local_name, "B");
        // `self` refers to the base path itself.
        assert_eq!(resolved[2].path, "crate::m");
        assert_eq!(resolved[2].local_name, "m");
        assert_eq!(resolved[2].category, Some(SymbolCategory::Module));
    }

    #[test]
    fn test_resolve_use_single_unknown_has_no_category() {
        let index = sample_index();
        let decl = use_decl(&["crate", "m", "Missing"], false, &[]);
        let resolved = resolve_use(&decl, "crate", &index);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].category, None);
    }

    #[test]
    fn test_resolve_use_single_with_alias() {
        let index = sample_index();
        let decl = UseDecl {
            alias: Some("A".to_string()),
            ..use_decl(&["crate", "m", "Alpha"], false, &[])
        };
        let resolved = resolve_use(&decl, "crate", &index);
        assert_eq!(resolved.len(), 1);
        assert_eq!(resolved[0].local_name, "A");
        assert_eq!(resolved[0].path, "crate::m::Alpha");
        assert_eq!(resolved[0].category, Some(SymbolCategory::Type));
    }

    #[test]
    fn test_super_past_root_clamps_to_crate() {
        assert_eq!(
            resolve_base(&seg(&["super", "super", "X"]), "crate"),
            BasePath::Internal(seg(&["crate", "X"]))
        );
    }

    #[test]
    fn test_resolve_use_std_is_external() {
        let index = sample_index();
        let decl = use_decl(&["std", "fmt", "Display"], false, &[]);
        assert!(resolve_use(&decl, "crate", &index).is_empty());
    }
}
