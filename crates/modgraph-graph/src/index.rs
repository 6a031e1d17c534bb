//! Global symbol index.
//!
//! A kind-partitioned set of fully qualified declaration paths, built by
//! walking the module tree once. The index answers two questions during use
//! resolution: does a path name a known symbol (and of what category), and
//! which symbols sit directly under a given path (glob expansion). Entries
//! are kept sorted so enumeration order is stable across runs.

use std::collections::BTreeSet;

use modgraph_schemas::{CrateDef, Module};

/// What category of symbol a path names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SymbolCategory {
    /// Struct, enum, or type alias.
    Type,
    /// Free function.
    Function,
    Trait,
    Module,
}

/// Fully qualified paths of every declaration in a crate, by category.
#[derive(Debug, Default)]
pub struct SymbolIndex {
    types: BTreeSet<String>,
    functions: BTreeSet<String>,
    traits: BTreeSet<String>,
    modules: BTreeSet<String>,
}

impl SymbolIndex {
    /// Builds the index by walking the entire module tree once.
    pub fn from_crate(crate_def: &CrateDef) -> Self {
        let mut index = SymbolIndex::default();
        index.add_module(&crate_def.root);
        index
    }

    fn add_module(&mut self, module: &Module) {
        self.modules.insert(module.path.clone());
        for s in &module.structs {
            self.types.insert(format!("{}::{}", module.path, s.name));
        }
        for e in &module.enums {
            self.types.insert(format!("{}::{}", module.path, e.name));
        }
        for a in &module.type_aliases {
            self.types.insert(format!("{}::{}", module.path, a.name));
        }
        for t in &module.traits {
            self.traits.insert(format!("{}::{}", module.path, t.name));
        }
        for f in &module.functions {
            self.functions.insert(format!("{}::{}", module.path, f.name));
        }
        for sub in &module.submodules {
            self.add_module(sub);
        }
    }

    /// The category of `path`, if the index knows it.
    pub fn category_of(&self, path: &str) -> Option<SymbolCategory> {
        if self.types.contains(path) {
            Some(SymbolCategory::Type)
        } else if self.functions.contains(path) {
            Some(SymbolCategory::Function)
        } else if self.traits.contains(path) {
            Some(SymbolCategory::Trait)
        } else if self.modules.contains(path) {
            Some(SymbolCategory::Module)
        } else {
            None
        }
    }

    /// Symbols directly under `base` (one trailing segment), in sorted
    /// order. This is the glob-import expansion.
    pub fn children_of<'a>(&'a self, base: &str) -> Vec<(&'a str, SymbolCategory)> {
        let prefix = format!("{base}::");
        let mut children = Vec::new();
        for (set, category) in [
            (&self.modules, SymbolCategory::Module),
            (&self.types, SymbolCategory::Type),
            (&self.traits, SymbolCategory::Trait),
            (&self.functions, SymbolCategory::Function),
        ] {
            for path in set.range(prefix.clone()..) {
                if !path.starts_with(&prefix) {
                    break;
                }
                if !path[prefix.len()..].contains("::") {
                    children.push((path.as_str(), category));
                }
            }
        }
        children.sort_by_key(|(path, _)| *path);
        children
    }
}
