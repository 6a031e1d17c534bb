//! Symbol extraction from parse trees.
//!
//! A family of pure functions over subtree roots. Each takes the node and the
//! full source text (positions map back to characters through the text) and
//! produces the lexical declaration records of the schema. The traversal is
//! lexical, not semantic: generic arguments are captured as nested type
//! references but never unified, and call receivers stay unresolved until the
//! graph phase.

use modgraph_schemas::{
    CallSite, ConstDef, EnumDef, FieldDef, FunctionDef, GenericParam, ImplBlock, ParamDef,
    SelfKind, StructDef, TraitDef, TypeAliasDef, TypeRef, UseDecl, UseItem, VariantDef, Visibility,
};
use tree_sitter::Node;

/// A `mod` declaration found in a file, inline or not.
#[derive(Debug)]
pub(crate) struct ModDecl<'t> {
    pub name: String,
    pub visibility: Visibility,
    /// The `declaration_list` body for inline modules; `None` for `mod x;`.
    pub body: Option<Node<'t>>,
    /// True when an immediately-preceding attribute mentions `cfg` + `test`.
    pub cfg_test: bool,
    pub line: usize,
}

/// Everything declared directly inside one module body.
#[derive(Debug, Default)]
pub(crate) struct ModuleContent<'t> {
    pub structs: Vec<StructDef>,
    pub enums: Vec<EnumDef>,
    pub traits: Vec<TraitDef>,
    pub functions: Vec<FunctionDef>,
    pub impls: Vec<ImplBlock>,
    pub uses: Vec<UseDecl>,
    pub constants: Vec<ConstDef>,
    pub statics: Vec<ConstDef>,
    pub type_aliases: Vec<TypeAliasDef>,
    pub mod_decls: Vec<ModDecl<'t>>,
}

/// Extracts every top-level declaration under `container` (a `source_file`
/// or a `declaration_list`), in source order.
pub(crate) fn extract_declarations<'t>(container: Node<'t>, source: &str) -> ModuleContent<'t> {
    let mut content = ModuleContent::default();
    let mut cursor = container.walk();
    for child in container.named_children(&mut cursor) {
        match child.kind() {
            "struct_item" => {
                if let Some(def) = extract_struct(child, source) {
                    content.structs.push(def);
                }
            }
            "enum_item" => {
                if let Some(def) = extract_enum(child, source) {
                    content.enums.push(def);
                }
            }
            "trait_item" => {
                if let Some(def) = extract_trait(child, source) {
                    content.traits.push(def);
                }
            }
            "function_item" | "function_signature_item" => {
                if let Some(def) = extract_function(child, source) {
                    content.functions.push(def);
                }
            }
            "impl_item" => {
                if let Some(def) = extract_impl(child, source) {
                    content.impls.push(def);
                }
            }
            "use_declaration" => {
                if let Some(def) = extract_use(child, source) {
                    content.uses.push(def);
                }
            }
            "const_item" => {
                if let Some(def) = extract_const(child, source) {
                    content.constants.push(def);
                }
            }
            "static_item" => {
                if let Some(def) = extract_const(child, source) {
                    content.statics.push(def);
                }
            }
            "type_item" => {
                if let Some(def) = extract_type_alias(child, source) {
                    content.type_aliases.push(def);
                }
            }
            "mod_item" => {
                if let Some(decl) = extract_mod_decl(child, source) {
                    content.mod_decls.push(decl);
                }
            }
            _ => {}
        }
    }
    content
}

/// Raw source text of a node.
fn text<'s>(node: Node<'_>, source: &'s str) -> &'s str {
    node.utf8_text(source.as_bytes()).unwrap_or_default()
}

fn line_of(node: Node<'_>) -> usize {
    node.start_position().row + 1
}

fn column_of(node: Node<'_>) -> usize {
    node.start_position().column + 1
}

/// Decodes the optional visibility marker preceding a declaration.
///
/// Bare `pub` → public; text containing `in <path>` → in-path; `crate` →
/// crate-scoped; `super` → super-scoped; `self` → private; absent → private.
fn visibility_of(node: Node<'_>, source: &str) -> Visibility {
    let mut cursor = node.walk();
    let result = node
        .children(&mut cursor)
        .find(|c| c.kind() == "visibility_modifier")
        .map(|marker| decode_marker(text(marker, source)))
        .unwrap_or(Visibility::Private);
    result
}

// ---------------------------------------------------------------------------
// Type references
// ---------------------------------------------------------------------------

/// Recursively extracts a type reference.
///
/// Named types keep their written path as `name`; structural shapes
/// (references, tuples, arrays, function types) get a marker name and their
/// components as `params` so consumers can recurse uniformly. Unknown shapes
/// degrade to their raw text.
pub(crate) fn extract_type_ref(node: Node<'_>, source: &str) -> Option<TypeRef> {
    let line = line_of(node);
    let column = column_of(node);
    let type_ref = match node.kind() {
        "type_identifier" | "identifier" | "primitive_type" | "metavariable" => {
            TypeRef::named(text(node, source), line, column)
        }
        "scoped_type_identifier" | "scoped_identifier" => {
            TypeRef::named(text(node, source), line, column)
        }
        "generic_type" => {
            let name = node
                .child_by_field_name("type")
                .map(|t| text(t, source))
                .unwrap_or_else(|| text(node, source));
            let params = node
                .child_by_field_name("type_arguments")
                .map(|args| extract_type_arguments(args, source))
                .unwrap_or_default();
            TypeRef {
                name: name.to_string(),
                resolved: None,
                params,
                line,
                column,
            }
        }
        "reference_type" => wrapper("&", node.child_by_field_name("type"), node, source),
        "pointer_type" => wrapper("*", node.child_by_field_name("type"), node, source),
        "array_type" => wrapper("[]", node.child_by_field_name("element"), node, source),
        "tuple_type" => {
            let mut cursor = node.walk();
            let params = node
                .named_children(&mut cursor)
                .filter_map(|c| extract_type_ref(c, source))
                .collect();
            TypeRef {
                name: "()".to_string(),
                resolved: None,
                params,
                line,
                column,
            }
        }
        "unit_type" => TypeRef::named("()", line, column),
        "never_type" => TypeRef::named("!", line, column),
        "function_type" => {
            let mut params: Vec<TypeRef> = node
                .child_by_field_name("parameters")
                .map(|p| {
                    let mut cursor = p.walk();
                    p.named_children(&mut cursor)
                        .filter_map(|c| extract_type_ref(c, source))
                        .collect()
                })
                .unwrap_or_default();
            if let Some(ret) = node.child_by_field_name("return_type") {
                params.extend(extract_type_ref(ret, source));
            }
            TypeRef {
                name: "fn".to_string(),
                resolved: None,
                params,
                line,
                column,
            }
        }
        // `dyn Trait` / `impl Trait`: the bound itself is the reference.
        "dynamic_type" | "abstract_type" => {
            let inner = node
                .child_by_field_name("trait")
                .or_else(|| node.named_child(0));
            return inner.and_then(|i| extract_type_ref(i, source));
        }
        "bounded_type" => {
            return node.named_child(0).and_then(|i| extract_type_ref(i, source));
        }
        "lifetime" => return None,
        // Anything else is captured by its raw textual form.
        _ => TypeRef::named(text(node, source), line, column),
    };
    if type_ref.name.is_empty() {
        return None;
    }
    Some(type_ref)
}

/// `&T` / `*T` / `[T]` style wrappers: marker name plus the inner type.
fn wrapper(marker: &str, inner: Option<Node<'_>>, node: Node<'_>, source: &str) -> TypeRef {
    TypeRef {
        name: marker.to_string(),
        resolved: None,
        params: inner
            .and_then(|i| extract_type_ref(i, source))
            .into_iter()
            .collect(),
        line: line_of(node),
        column: column_of(node),
    }
}

/// Type arguments of a `generic_type`, skipping lifetimes and bindings.
fn extract_type_arguments(args: Node<'_>, source: &str) -> Vec<TypeRef> {
    let mut cursor = args.walk();
    args.named_children(&mut cursor)
        .filter(|c| !matches!(c.kind(), "lifetime" | "type_binding" | "const_block"))
        .filter_map(|c| extract_type_ref(c, source))
        .collect()
}

// ---------------------------------------------------------------------------
// Generics
// ---------------------------------------------------------------------------

/// Generic parameters with their declared bounds, including bounds stated
/// in a trailing `where` clause. Lifetimes and const parameters are
/// skipped.
fn extract_generics(node: Node<'_>, source: &str) -> Vec<GenericParam> {
    let mut generics = Vec::new();
    if let Some(params) = node.child_by_field_name("type_parameters") {
        let mut cursor = params.walk();
        for child in params.named_children(&mut cursor) {
            match child.kind() {
                "type_identifier" => generics.push(GenericParam {
                    name: text(child, source).to_string(),
                    bounds: Vec::new(),
                }),
                "type_parameter" | "constrained_type_parameter" | "optional_type_parameter" => {
                    if let Some(param) = extract_generic_param(child, source) {
                        generics.push(param);
                    }
                }
                _ => {}
            }
        }
    }
    merge_where_clause(node, source, &mut generics);
    generics
}

/// Folds `where T: Bound` predicates into the matching parameter's bound
/// list. Predicates over non-parameter types (`where Vec<T>: Clone`) are
/// ignored.
fn merge_where_clause(node: Node<'_>, source: &str, generics: &mut Vec<GenericParam>) {
    let mut cursor = node.walk();
    let Some(clause) = node
        .named_children(&mut cursor)
        .find(|c| c.kind() == "where_clause")
    else {
        return;
    };
    let mut clause_cursor = clause.walk();
    for predicate in clause.named_children(&mut clause_cursor) {
        if predicate.kind() != "where_predicate" {
            continue;
        }
        let Some(left) = predicate.child_by_field_name("left") else {
            continue;
        };
        if left.kind() != "type_identifier" {
            continue;
        }
        let left_name = text(left, source);
        let Some(param) = generics.iter_mut().find(|g| g.name == left_name) else {
            continue;
        };
        if let Some(bounds) = predicate.child_by_field_name("bounds") {
            param.bounds.extend(extract_trait_bounds(bounds, source));
        }
    }
}

fn extract_generic_param(node: Node<'_>, source: &str) -> Option<GenericParam> {
    // Grammar variants differ in field naming; fall back to the first
    // type_identifier child for the name.
    let name_node = node
        .child_by_field_name("left")
        .or_else(|| node.child_by_field_name("name"))
        .or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "type_identifier");
            found
        })?;
    if name_node.kind() != "type_identifier" {
        return None;
    }
    let bounds = node
        .child_by_field_name("bounds")
        .or_else(|| {
            let mut cursor = node.walk();
            let found = node
                .named_children(&mut cursor)
                .find(|c| c.kind() == "trait_bounds");
            found
        })
        .map(|b| extract_trait_bounds(b, source))
        .unwrap_or_default();
    Some(GenericParam {
        name: text(name_node, source).to_string(),
        bounds,
    })
}

/// Type-like entries of a `trait_bounds` node.
fn extract_trait_bounds(bounds: Node<'_>, source: &str) -> Vec<TypeRef> {
    let mut cursor = bounds.walk();
    bounds
        .named_children(&mut cursor)
        .filter(|c| {
            matches!(
                c.kind(),
                "type_identifier" | "scoped_type_identifier" | "generic_type"
            )
        })
        .filter_map(|c| extract_type_ref(c, source))
        .collect()
}

// ---------------------------------------------------------------------------
// Structs and enums
// ---------------------------------------------------------------------------

fn extract_struct(node: Node<'_>, source: &str) -> Option<StructDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    Some(StructDef {
        name,
        visibility: visibility_of(node, source),
        generics: extract_generics(node, source),
        fields: node
            .child_by_field_name("body")
            .map(|body| extract_fields(body, source))
            .unwrap_or_default(),
        line: line_of(node),
    })
}

/// Fields of a `field_declaration_list` (named) or
/// `ordered_field_declaration_list` (tuple).
fn extract_fields(body: Node<'_>, source: &str) -> Vec<FieldDef> {
    let mut fields = Vec::new();
    match body.kind() {
        "field_declaration_list" => {
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                if child.kind() != "field_declaration" {
                    continue;
                }
                let name = child
                    .child_by_field_name("name")
                    .map(|n| text(n, source).to_string());
                let Some(ty) = child
                    .child_by_field_name("type")
                    .and_then(|t| extract_type_ref(t, source))
                else {
                    continue;
                };
                fields.push(FieldDef {
                    name,
                    visibility: visibility_of(child, source),
                    ty,
                });
            }
        }
        "ordered_field_declaration_list" => {
            // Tuple fields have no names; a visibility marker applies to the
            // type that follows it.
            let mut pending = Visibility::Private;
            let mut cursor = body.walk();
            for child in body.named_children(&mut cursor) {
                if child.kind() == "visibility_modifier" {
                    pending = decode_marker(text(child, source));
                    continue;
                }
                if let Some(ty) = extract_type_ref(child, source) {
                    fields.push(FieldDef {
                        name: None,
                        visibility: std::mem::take(&mut pending),
                        ty,
                    });
                }
            }
        }
        _ => {}
    }
    fields
}

/// Decodes a visibility marker's raw text.
///
/// Bare `pub` → public; `pub(in path)` → in-path; `pub(crate)` →
/// crate-scoped; `pub(super)` → super-scoped; `pub(self)` restricts to the
/// current module, which is private.
fn decode_marker(raw: &str) -> Visibility {
    let Some(open) = raw.find('(') else {
        return Visibility::Public;
    };
    let inner = raw[open + 1..].trim_end_matches(')').trim();
    if let Some(path) = inner.strip_prefix("in ") {
        return Visibility::InPath(path.trim().to_string());
    }
    match inner {
        "crate" => Visibility::Crate,
        "super" => Visibility::Super,
        _ => Visibility::Private,
    }
}

fn extract_enum(node: Node<'_>, source: &str) -> Option<EnumDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let mut variants = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if child.kind() != "enum_variant" {
                continue;
            }
            let Some(variant_name) = child.child_by_field_name("name") else {
                continue;
            };
            variants.push(VariantDef {
                name: text(variant_name, source).to_string(),
                fields: child
                    .child_by_field_name("body")
                    .map(|b| extract_fields(b, source))
                    .unwrap_or_default(),
            });
        }
    }
    Some(EnumDef {
        name,
        visibility: visibility_of(node, source),
        generics: extract_generics(node, source),
        variants,
        line: line_of(node),
    })
}

// ---------------------------------------------------------------------------
// Traits
// ---------------------------------------------------------------------------

fn extract_trait(node: Node<'_>, source: &str) -> Option<TraitDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let supertraits = node
        .child_by_field_name("bounds")
        .map(|b| extract_trait_bounds(b, source))
        .unwrap_or_default();

    let mut methods = Vec::new();
    let mut assoc_types = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            match child.kind() {
                "function_item" | "function_signature_item" => {
                    if let Some(method) = extract_function(child, source) {
                        methods.push(method);
                    }
                }
                "associated_type" => {
                    if let Some(ty_name) = child.child_by_field_name("name") {
                        assoc_types.push(text(ty_name, source).to_string());
                    }
                }
                _ => {}
            }
        }
    }

    Some(TraitDef {
        name,
        visibility: visibility_of(node, source),
        generics: extract_generics(node, source),
        supertraits,
        methods,
        assoc_types,
        line: line_of(node),
    })
}

// ---------------------------------------------------------------------------
// Functions and methods
// ---------------------------------------------------------------------------

fn extract_function(node: Node<'_>, source: &str) -> Option<FunctionDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    let params = node
        .child_by_field_name("parameters")
        .map(|p| extract_params(p, source))
        .unwrap_or_default();
    let return_type = node
        .child_by_field_name("return_type")
        .and_then(|r| extract_type_ref(r, source));
    let calls = node
        .child_by_field_name("body")
        .map(|body| {
            let mut calls = Vec::new();
            collect_calls(body, source, &mut calls);
            calls
        })
        .unwrap_or_default();

    Some(FunctionDef {
        name,
        visibility: visibility_of(node, source),
        generics: extract_generics(node, source),
        params,
        return_type,
        is_async: has_modifier(node, "async"),
        is_const: has_modifier(node, "const"),
        is_unsafe: has_modifier(node, "unsafe"),
        calls,
        line: line_of(node),
    })
}

/// Checks the function's modifier list for a keyword (`async`, `const`,
/// `unsafe`).
fn has_modifier(node: Node<'_>, keyword: &str) -> bool {
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        if child.kind() == keyword {
            return true;
        }
        if child.kind() == "function_modifiers" {
            let mut inner = child.walk();
            if child.children(&mut inner).any(|m| m.kind() == keyword) {
                return true;
            }
        }
        // Modifiers precede the `fn` keyword; no need to look further.
        if child.kind() == "fn" {
            break;
        }
    }
    false
}

fn extract_params(params: Node<'_>, source: &str) -> Vec<ParamDef> {
    let mut out = Vec::new();
    let mut cursor = params.walk();
    for child in params.named_children(&mut cursor) {
        match child.kind() {
            "self_parameter" => {
                // Forms: self, mut self, &self, &mut self, &'a self,
                // &'a mut self.
                let raw = text(child, source);
                let self_kind = if raw.starts_with('&') {
                    if raw.contains("mut") {
                        SelfKind::RefMut
                    } else {
                        SelfKind::Ref
                    }
                } else {
                    SelfKind::Value
                };
                out.push(ParamDef {
                    name: Some("self".to_string()),
                    ty: None,
                    self_kind,
                });
            }
            "parameter" => {
                let name = child
                    .child_by_field_name("pattern")
                    .map(|p| text(p, source).to_string());
                let ty = child
                    .child_by_field_name("type")
                    .and_then(|t| extract_type_ref(t, source));
                out.push(ParamDef {
                    name,
                    ty,
                    self_kind: SelfKind::None,
                });
            }
            _ => {}
        }
    }
    out
}

/// Records every call expression in a body, in source order.
///
/// A call whose function is a field expression is a method call; its callee
/// is the method's field identifier. Turbofish calls unwrap to the inner
/// function. Receivers are left unresolved.
fn collect_calls(node: Node<'_>, source: &str, out: &mut Vec<CallSite>) {
    if node.kind() == "call_expression" {
        if let Some(function) = node.child_by_field_name("function") {
            let target = if function.kind() == "generic_function" {
                function.child_by_field_name("function").unwrap_or(function)
            } else {
                function
            };
            match target.kind() {
                "field_expression" => {
                    if let Some(field) = target.child_by_field_name("field") {
                        if field.kind() == "field_identifier" {
                            out.push(CallSite {
                                callee: text(field, source).to_string(),
                                is_method: true,
                                line: line_of(field),
                                column: column_of(field),
                            });
                        }
                    }
                }
                "identifier" | "scoped_identifier" => {
                    out.push(CallSite {
                        callee: text(target, source).to_string(),
                        is_method: false,
                        line: line_of(target),
                        column: column_of(target),
                    });
                }
                _ => {}
            }
        }
    }
    let mut cursor = node.walk();
    for child in node.children(&mut cursor) {
        collect_calls(child, source, out);
    }
}

// ---------------------------------------------------------------------------
// Impl blocks
// ---------------------------------------------------------------------------

fn extract_impl(node: Node<'_>, source: &str) -> Option<ImplBlock> {
    let self_ty = node
        .child_by_field_name("type")
        .and_then(|t| extract_type_ref(t, source))?;
    let trait_ref = node
        .child_by_field_name("trait")
        .and_then(|t| extract_type_ref(t, source));

    let mut methods = Vec::new();
    if let Some(body) = node.child_by_field_name("body") {
        let mut cursor = body.walk();
        for child in body.named_children(&mut cursor) {
            if child.kind() == "function_item" {
                if let Some(method) = extract_function(child, source) {
                    methods.push(method);
                }
            }
        }
    }

    Some(ImplBlock {
        trait_ref,
        self_ty,
        generics: extract_generics(node, source),
        methods,
        line: line_of(node),
    })
}

// ---------------------------------------------------------------------------
// Use declarations
// ---------------------------------------------------------------------------

fn extract_use(node: Node<'_>, source: &str) -> Option<UseDecl> {
    let argument = node.child_by_field_name("argument")?;
    let visibility = visibility_of(node, source);

    let mut decl = UseDecl {
        segments: Vec::new(),
        alias: None,
        glob: false,
        items: Vec::new(),
        visibility,
        line: line_of(node),
        column: column_of(node),
    };

    match argument.kind() {
        "use_as_clause" => {
            let path = argument.child_by_field_name("path")?;
            decl.segments = split_path(text(path, source));
            decl.alias = argument
                .child_by_field_name("alias")
                .map(|a| text(a, source).to_string());
        }
        "use_wildcard" => {
            decl.glob = true;
            if let Some(path) = argument.named_child(0) {
                decl.segments = split_path(text(path, source));
            }
        }
        "scoped_use_list" => {
            if let Some(path) = argument.child_by_field_name("path") {
                decl.segments = split_path(text(path, source));
            }
            if let Some(list) = argument.child_by_field_name("list") {
                collect_use_items(list, source, "", &mut decl);
            }
        }
        "use_list" => {
            collect_use_items(argument, source, "", &mut decl);
        }
        _ => {
            // Single path: identifier, scoped_identifier, crate, self, super.
            decl.segments = split_path(text(argument, source));
        }
    }

    if decl.segments.is_empty() && decl.items.is_empty() && !decl.glob {
        return None;
    }
    Some(decl)
}

/// Flattens a `use_list`, prefixing nested group paths onto item names so
/// `use a::{b::{c, d}}` yields items `b::c` and `b::d`.
fn collect_use_items(list: Node<'_>, source: &str, prefix: &str, decl: &mut UseDecl) {
    let mut cursor = list.walk();
    for child in list.named_children(&mut cursor) {
        match child.kind() {
            "identifier" | "scoped_identifier" | "self" | "crate" | "super" => {
                decl.items.push(UseItem {
                    name: join_prefix(prefix, text(child, source)),
                    alias: None,
                });
            }
            "use_as_clause" => {
                let Some(path) = child.child_by_field_name("path") else {
                    continue;
                };
                decl.items.push(UseItem {
                    name: join_prefix(prefix, text(path, source)),
                    alias: child
                        .child_by_field_name("alias")
                        .map(|a| text(a, source).to_string()),
                });
            }
            "scoped_use_list" => {
                let nested_prefix = child
                    .child_by_field_name("path")
                    .map(|p| join_prefix(prefix, text(p, source)))
                    .unwrap_or_else(|| prefix.to_string());
                if let Some(nested) = child.child_by_field_name("list") {
                    collect_use_items(nested, source, &nested_prefix, decl);
                }
            }
            "use_list" => collect_use_items(child, source, prefix, decl),
            "use_wildcard" => {
                // `use a::{b::*}` — rare; fold into a glob on the joined base.
                let base = child
                    .named_child(0)
                    .map(|p| join_prefix(prefix, text(p, source)));
                if let Some(base) = base {
                    decl.items.push(UseItem {
                        name: format!("{base}::*"),
                        alias: None,
                    });
                }
            }
            _ => {}
        }
    }
}

fn join_prefix(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}::{name}")
    }
}

fn split_path(path: &str) -> Vec<String> {
    path.split("::")
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

// ---------------------------------------------------------------------------
// Constants, statics, type aliases
// ---------------------------------------------------------------------------

fn extract_const(node: Node<'_>, source: &str) -> Option<ConstDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    Some(ConstDef {
        name,
        visibility: visibility_of(node, source),
        ty: node
            .child_by_field_name("type")
            .and_then(|t| extract_type_ref(t, source)),
        line: line_of(node),
    })
}

fn extract_type_alias(node: Node<'_>, source: &str) -> Option<TypeAliasDef> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    Some(TypeAliasDef {
        name,
        visibility: visibility_of(node, source),
        ty: node
            .child_by_field_name("type")
            .and_then(|t| extract_type_ref(t, source)),
        line: line_of(node),
    })
}

// ---------------------------------------------------------------------------
// Module declarations
// ---------------------------------------------------------------------------

fn extract_mod_decl<'t>(node: Node<'t>, source: &str) -> Option<ModDecl<'t>> {
    let name = text(node.child_by_field_name("name")?, source).to_string();
    Some(ModDecl {
        name,
        visibility: visibility_of(node, source),
        body: node.child_by_field_name("body"),
        cfg_test: is_cfg_test(node, source),
        line: line_of(node),
    })
}

/// Scans immediately-preceding siblings for a `cfg` + `test` attribute,
/// skipping comments and stopping at the first other node.
fn is_cfg_test(node: Node<'_>, source: &str) -> bool {
    let mut current = node.prev_sibling();
    while let Some(sibling) = current {
        match sibling.kind() {
            "line_comment" | "block_comment" => {}
            "attribute_item" => {
                let raw = text(sibling, source);
                if raw.contains("cfg") && raw.contains("test") {
                    return true;
                }
            }
            _ => break,
        }
        current = sibling.prev_sibling();
    }
    false
}
