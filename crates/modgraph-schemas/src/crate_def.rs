//! Crate definition tree: the output of the extraction phase.
//!
//! A [`CrateDef`] owns the module tree discovered from a project's manifest
//! and filesystem conventions. Every declaration record below is purely
//! lexical — generic arguments are captured as nested type references but not
//! unified, and no name resolution has happened yet. Resolution and graph
//! construction consume this tree read-only.
//!
//! ## Identifier scheme
//!
//! Every module carries its qualified path rooted at the literal segment
//! `crate` (`crate`, `crate::parser`, `crate::parser::lexer`). Those paths,
//! extended with declaration names, become the primary keys of the dependency
//! graph. In workspace mode the graph phase prefixes them with the owning
//! crate's name (`alpha::crate::Widget`).

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// A single crate's definition tree.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CrateDef {
    /// Package name from the manifest, or the project directory basename
    /// when the manifest has no `[package]` section.
    pub name: String,

    /// Directory the module file paths are relative to. The metrics stage
    /// joins this with `Module::file` for line counting.
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub root_dir: String,

    /// The root module. Its short name is the literal `crate`.
    pub root: Module,
}

/// A module and its declarations, in source order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct Module {
    /// Short name: `crate` for the root, the `mod` name otherwise.
    pub name: String,

    /// Qualified path (`crate::a::b`). Doubles as the module's graph node id.
    pub path: String,

    /// Source file the module lives in. Inline modules share their enclosing
    /// file.
    pub file: String,

    /// 1-based line of the `mod` declaration in the parent module's file;
    /// 1 for the crate root.
    pub line: usize,

    pub visibility: Visibility,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub structs: Vec<StructDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub enums: Vec<EnumDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub traits: Vec<TraitDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub functions: Vec<FunctionDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub impls: Vec<ImplBlock>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub uses: Vec<UseDecl>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constants: Vec<ConstDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub statics: Vec<ConstDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_aliases: Vec<TypeAliasDef>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub submodules: Vec<Module>,
}

impl Module {
    /// Creates an empty module stub. Used both for regular modules before
    /// their declarations are filled in and for unreadable files (§ error
    /// policy: an unreadable non-entry file degrades to an empty stub).
    pub fn stub(name: &str, path: &str, file: &str, visibility: Visibility) -> Self {
        Module {
            name: name.to_string(),
            path: path.to_string(),
            file: file.to_string(),
            line: 1,
            visibility,
            ..Module::default()
        }
    }
}

/// Declared visibility of an item.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// `pub`
    Public,
    /// No visibility marker.
    #[default]
    Private,
    /// `pub(crate)`
    Crate,
    /// `pub(super)`
    Super,
    /// `pub(in path)`, carrying the restriction path.
    InPath(String),
}

impl Visibility {
    /// True for plain `pub`. Restricted visibilities count as non-public for
    /// the public/private item tallies in module metrics.
    pub fn is_public(&self) -> bool {
        matches!(self, Visibility::Public)
    }
}

/// A generic parameter and its declared bounds (`T: Clone + Send`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct GenericParam {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub bounds: Vec<TypeRef>,
}

/// A lexical type reference, recursive over generic arguments.
///
/// Extraction leaves `resolved` unset; resolution outcomes live on graph
/// edges. The field survives deserialization for consumers that annotate
/// trees after the fact.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeRef {
    /// The referenced name as written (`Foo`, `super::Foo`, `Vec`).
    pub name: String,

    /// Resolved qualified path, when known.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolved: Option<String>,

    /// Generic arguments (`Vec<Foo>` carries one entry for `Foo`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<TypeRef>,

    /// 1-based source line of the referencing token.
    pub line: usize,
    /// 1-based source column of the referencing token.
    pub column: usize,
}

impl TypeRef {
    /// A bare named reference with no generic arguments.
    pub fn named(name: &str, line: usize, column: usize) -> Self {
        TypeRef {
            name: name.to_string(),
            resolved: None,
            params: Vec::new(),
            line,
            column,
        }
    }
}

/// A record type declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct StructDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
    pub line: usize,
}

/// One struct field or enum-variant field. Tuple fields have no name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FieldDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub visibility: Visibility,
    pub ty: TypeRef,
}

/// A sum type declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EnumDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub variants: Vec<VariantDef>,
    pub line: usize,
}

/// One enum variant and its fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct VariantDef {
    pub name: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub fields: Vec<FieldDef>,
}

/// An interface type declaration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TraitDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    /// Supertrait references (`trait Sub: Base`).
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub supertraits: Vec<TypeRef>,
    /// Required and provided method signatures.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<FunctionDef>,
    /// Associated type declarations, by name.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub assoc_types: Vec<String>,
    pub line: usize,
}

/// How a parameter binds `self`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "snake_case")]
pub enum SelfKind {
    /// Not a `self` parameter.
    #[default]
    None,
    /// `self`
    Value,
    /// `&self`
    Ref,
    /// `&mut self`
    RefMut,
}

/// One function or method parameter.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ParamDef {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Absent for `self` parameters.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "SelfKind::is_none")]
    pub self_kind: SelfKind,
}

impl SelfKind {
    fn is_none(&self) -> bool {
        *self == SelfKind::None
    }
}

/// A call expression recorded inside a function body.
///
/// The receiver of a method call is not resolved at extraction time; the
/// graph phase maps `callee` to a node id via the shared fallback lookup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct CallSite {
    /// Callee path as written (`helper`, `Foo::new`) or the method name for
    /// method calls.
    pub callee: String,
    /// True for `recv.method(...)`, false for `path(...)`.
    pub is_method: bool,
    pub line: usize,
    pub column: usize,
}

/// A free function, method, or trait method signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct FunctionDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub params: Vec<ParamDef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub return_type: Option<TypeRef>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_async: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_const: bool,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub is_unsafe: bool,
    /// Call sites in body order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub calls: Vec<CallSite>,
    pub line: usize,
}

/// An `impl` block. If `trait_ref` is present this is a trait implementation
/// and yields a `trait_impl` edge from the self type to the trait.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ImplBlock {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub trait_ref: Option<TypeRef>,
    pub self_ty: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub generics: Vec<GenericParam>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<FunctionDef>,
    pub line: usize,
}

/// One item in a grouped import list (`use a::{b, c as d}`).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UseItem {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

/// An import declaration, before resolution.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct UseDecl {
    /// Leading path segments (`["crate", "a"]` for `use crate::a::*`).
    pub segments: Vec<String>,
    /// Trailing `as` alias on a single-path import.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
    /// True for `use path::*`.
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    pub glob: bool,
    /// Grouped items for `use path::{a, b as c, self}`. Empty for single
    /// paths and globs.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub items: Vec<UseItem>,
    pub visibility: Visibility,
    pub line: usize,
    pub column: usize,
}

/// A constant or static item. These are module children for visibility
/// tallies but do not become graph nodes.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ConstDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    pub line: usize,
}

/// A type alias. Counts toward a module's `totalTypes`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TypeAliasDef {
    pub name: String,
    pub visibility: Visibility,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ty: Option<TypeRef>,
    pub line: usize,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_module_stub_is_empty() {
        let m = Module::stub("a", "crate::a", "src/a.rs", Visibility::Private);
        assert_eq!(m.name, "a");
        assert_eq!(m.path, "crate::a");
        assert!(m.structs.is_empty());
        assert!(m.submodules.is_empty());
    }

    #[test]
    fn test_visibility_is_public() {
        assert!(Visibility::Public.is_public());
        assert!(!Visibility::Crate.is_public());
        assert!(!Visibility::Super.is_public());
        assert!(!Visibility::InPath("crate::a".to_string()).is_public());
        assert!(!Visibility::Private.is_public());
    }

    #[test]
    fn test_empty_fields_omitted_from_json() {
        let m = Module::stub("crate", "crate", "src/lib.rs", Visibility::Public);
        let json = serde_json::to_string(&m).unwrap();
        assert!(!json.contains("structs"));
        assert!(!json.contains("submodules"));
    }

    #[test]
    fn test_self_kind_roundtrip() {
        let p = ParamDef {
            name: Some("self".to_string()),
            ty: None,
            self_kind: SelfKind::RefMut,
        };
        let json = serde_json::to_string(&p).unwrap();
        let parsed: ParamDef = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, p);
    }
}
