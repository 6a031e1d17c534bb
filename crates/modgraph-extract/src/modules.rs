//! Module-tree discovery.
//!
//! Combines `mod` declarations with filesystem conventions to build the
//! crate definition tree. The entry point comes from the manifest (library
//! override, then `src/lib.rs`, then binary overrides, then `src/main.rs`);
//! from there every non-inline `mod name;` is resolved to `name.rs` or
//! `name/mod.rs` relative to a search base that depends on whether the
//! current file is a conventional root (`lib`, `main`, `mod` basename).
//!
//! Auto-detected test targets (`tests/*.rs`) join the tree as submodules of
//! the crate root so the test filters have something to exclude.
//!
//! Failure policy: only the entry file is load-bearing. An unreadable or
//! unresolvable non-entry module degrades to an empty stub with a logged
//! diagnostic; extraction continues.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use modgraph_schemas::{CrateDef, Module, Visibility};
use tracing::{debug, warn};

use crate::error::ExtractError;
use crate::filters::{CompiledFilter, FilterConfig};
use crate::manifest::{read_manifest, Manifest};
use crate::parser::ParserAdapter;
use crate::symbols::{extract_declarations, ModDecl};

/// Resolves a project into one crate definition per member.
///
/// Single-crate projects yield one element. When the manifest declares
/// `workspace.members`, each glob is expanded against the project root and
/// every matching directory that itself contains a manifest is resolved
/// recursively; members are returned sorted by crate name.
///
/// # Errors
///
/// Fails when no entry point can be located, when the entry file cannot be
/// read, or when the parser rejects the entry file.
pub fn resolve_project(root: &Path, config: &FilterConfig) -> Result<Vec<CrateDef>, ExtractError> {
    let manifest = read_manifest(root);
    if manifest.is_workspace() {
        resolve_workspace(root, &manifest, config)
    } else {
        Ok(vec![resolve_crate(root, &manifest, config)?])
    }
}

/// Expands workspace member globs and resolves each member crate.
fn resolve_workspace(
    root: &Path,
    manifest: &Manifest,
    config: &FilterConfig,
) -> Result<Vec<CrateDef>, ExtractError> {
    let mut crates = Vec::new();
    for pattern in &manifest.workspace_members {
        let full = root.join(pattern);
        let Some(pattern_str) = full.to_str() else {
            warn!(pattern = %pattern, "skipping non-UTF-8 member pattern");
            continue;
        };
        let entries = match glob::glob(pattern_str) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(pattern = %pattern, error = %e, "skipping invalid member pattern");
                continue;
            }
        };
        for member_dir in entries.flatten() {
            if !member_dir.is_dir() || !member_dir.join("Cargo.toml").is_file() {
                continue;
            }
            let member_manifest = read_manifest(&member_dir);
            match resolve_crate(&member_dir, &member_manifest, config) {
                Ok(crate_def) => crates.push(crate_def),
                Err(e) => {
                    warn!(member = %member_dir.display(), error = %e, "skipping workspace member");
                }
            }
        }
    }
    if crates.is_empty() {
        return Err(ExtractError::manifest(root));
    }
    crates.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(crates)
}

/// Resolves a single crate rooted at `root`.
pub fn resolve_crate(
    root: &Path,
    manifest: &Manifest,
    config: &FilterConfig,
) -> Result<CrateDef, ExtractError> {
    let name = manifest
        .package_name
        .clone()
        .unwrap_or_else(|| directory_basename(root));
    let entry = locate_entry(root, manifest)?;
    debug!(crate_name = %name, entry = %entry.display(), "resolving crate");

    let mut resolver = Resolver {
        root: root.to_path_buf(),
        filter: CompiledFilter::compile(config),
        parser: ParserAdapter::new()?,
        seen: HashSet::new(),
        stub_count: 0,
    };
    let mut root_module = resolver.resolve_entry(&entry)?;
    resolver.resolve_test_targets(&mut root_module);
    if resolver.stub_count > 0 {
        debug!(
            crate_name = %name,
            stubbed_modules = resolver.stub_count,
            "some modules degraded to empty stubs"
        );
    }
    Ok(CrateDef {
        name,
        root_dir: root.to_string_lossy().replace('\\', "/"),
        root: root_module,
    })
}

/// Entry-point search order: library override, `src/lib.rs`, binary
/// overrides, `src/main.rs`.
fn locate_entry(root: &Path, manifest: &Manifest) -> Result<PathBuf, ExtractError> {
    if let Some(lib) = &manifest.lib_path {
        if root.join(lib).is_file() {
            return Ok(PathBuf::from(lib));
        }
    }
    if root.join("src/lib.rs").is_file() {
        return Ok(PathBuf::from("src/lib.rs"));
    }
    for bin in &manifest.bins {
        if let Some(path) = &bin.path {
            if root.join(path).is_file() {
                return Ok(PathBuf::from(path));
            }
        }
    }
    if root.join("src/main.rs").is_file() {
        return Ok(PathBuf::from("src/main.rs"));
    }
    Err(ExtractError::manifest(root))
}

fn directory_basename(root: &Path) -> String {
    root.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("crate")
        .to_string()
}

/// Per-crate resolution state.
struct Resolver {
    root: PathBuf,
    filter: CompiledFilter,
    parser: ParserAdapter,
    /// Absolute paths already resolved; a second reference short-circuits to
    /// a stub instead of re-parsing.
    seen: HashSet<PathBuf>,
    /// Modules that degraded to empty stubs (unresolved or unreadable).
    stub_count: usize,
}

impl Resolver {
    /// Resolves the entry file. Unlike every other file, failures here are
    /// fatal.
    fn resolve_entry(&mut self, entry_rel: &Path) -> Result<Module, ExtractError> {
        let abs = self.root.join(entry_rel);
        let source =
            std::fs::read_to_string(&abs).map_err(|e| ExtractError::io(&abs, e))?;
        let tree = self.parser.parse(&source, &abs)?;
        if tree.root_node().has_error() {
            return Err(ExtractError::parse(&abs));
        }
        self.mark_seen(&abs);
        Ok(self.build_module(
            "crate",
            "crate",
            entry_rel,
            1,
            Visibility::Public,
            tree.root_node(),
            &source,
        ))
    }

    fn mark_seen(&mut self, abs: &Path) -> bool {
        let key = abs.canonicalize().unwrap_or_else(|_| abs.to_path_buf());
        self.seen.insert(key)
    }

    fn already_seen(&self, abs: &Path) -> bool {
        let key = abs.canonicalize().unwrap_or_else(|_| abs.to_path_buf());
        self.seen.contains(&key)
    }

    /// Builds one module from its declaration container, recursing into
    /// inline bodies and sibling files.
    fn build_module(
        &mut self,
        name: &str,
        path: &str,
        file_rel: &Path,
        line: usize,
        visibility: Visibility,
        container: tree_sitter::Node<'_>,
        source: &str,
    ) -> Module {
        let content = extract_declarations(container, source);
        let file = path_string(file_rel);
        let mut module = Module {
            name: name.to_string(),
            path: path.to_string(),
            file,
            line,
            visibility,
            structs: content.structs,
            enums: content.enums,
            traits: content.traits,
            functions: content.functions,
            impls: content.impls,
            uses: content.uses,
            constants: content.constants,
            statics: content.statics,
            type_aliases: content.type_aliases,
            submodules: Vec::new(),
        };

        for decl in content.mod_decls {
            let child_path = format!("{path}::{}", decl.name);
            match decl.body {
                Some(body) => {
                    // Inline module: shares the enclosing file. Omitted when
                    // it carries #[cfg(test)] and that filter is on.
                    if decl.cfg_test && self.filter.exclude_cfg_test {
                        debug!(module = %child_path, "omitting cfg(test) inline module");
                        continue;
                    }
                    let child = self.build_module(
                        &decl.name,
                        &child_path,
                        file_rel,
                        decl.line,
                        decl.visibility.clone(),
                        body,
                        source,
                    );
                    module.submodules.push(child);
                }
                None => {
                    if let Some(child) = self.resolve_external(&decl, file_rel, &child_path) {
                        module.submodules.push(child);
                    }
                }
            }
        }
        module
    }

    /// Resolves `mod name;` to a sibling file, applying file filters.
    ///
    /// Returns `None` when the target file is filtered out (the module and
    /// everything beneath it is omitted from the tree). Unresolvable and
    /// unreadable targets return an empty stub.
    fn resolve_external(
        &mut self,
        decl: &ModDecl<'_>,
        current_rel: &Path,
        child_path: &str,
    ) -> Option<Module> {
        let current_abs = self.root.join(current_rel);
        let current_dir = current_abs.parent().unwrap_or(&self.root);
        let stem = current_abs
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default();

        // Conventional roots search among their siblings; a regular module
        // file searches in the subdirectory named after its basename.
        let search_dir = if matches!(stem, "lib" | "main" | "mod") {
            current_dir.to_path_buf()
        } else {
            current_dir.join(stem)
        };

        let candidates = [
            search_dir.join(format!("{}.rs", decl.name)),
            search_dir.join(&decl.name).join("mod.rs"),
        ];
        let Some(target) = candidates.iter().find(|c| c.is_file()) else {
            warn!(
                module = %child_path,
                declared_in = %current_rel.display(),
                "unresolved mod declaration"
            );
            self.stub_count += 1;
            let mut stub = Module::stub(
                &decl.name,
                child_path,
                &path_string(current_rel),
                decl.visibility.clone(),
            );
            stub.line = decl.line;
            return Some(stub);
        };

        let target_rel = target
            .strip_prefix(&self.root)
            .unwrap_or(target)
            .to_path_buf();
        if !self.filter.allows(&target_rel) {
            debug!(file = %target_rel.display(), "filtered out module file");
            return None;
        }

        if self.already_seen(target) {
            debug!(file = %target_rel.display(), "file already resolved; short-circuiting");
            let mut stub = Module::stub(
                &decl.name,
                child_path,
                &path_string(&target_rel),
                decl.visibility.clone(),
            );
            stub.line = decl.line;
            return Some(stub);
        }
        self.mark_seen(target);

        Some(self.resolve_file(target, &target_rel, decl, child_path))
    }

    /// Discovers auto-detected test targets: each `tests/*.rs` file becomes
    /// a submodule of the crate root, in filename order. The tests-directory
    /// filter removes them wholesale.
    fn resolve_test_targets(&mut self, root_module: &mut Module) {
        let tests_dir = self.root.join("tests");
        let Ok(entries) = std::fs::read_dir(&tests_dir) else {
            return;
        };
        let mut files: Vec<PathBuf> = entries
            .flatten()
            .map(|e| e.path())
            .filter(|p| p.is_file() && p.extension().is_some_and(|ext| ext == "rs"))
            .collect();
        files.sort();

        for file in files {
            let Some(stem) = file.file_stem().and_then(|s| s.to_str()).map(str::to_string)
            else {
                continue;
            };
            let rel = file
                .strip_prefix(&self.root)
                .unwrap_or(&file)
                .to_path_buf();
            if !self.filter.allows(&rel) {
                debug!(file = %rel.display(), "filtered out test target");
                continue;
            }
            if self.already_seen(&file) {
                continue;
            }
            self.mark_seen(&file);
            let decl = ModDecl {
                name: stem.clone(),
                visibility: Visibility::Private,
                body: None,
                cfg_test: false,
                line: 1,
            };
            let child_path = format!("crate::{stem}");
            let module = self.resolve_file(&file, &rel, &decl, &child_path);
            root_module.submodules.push(module);
        }
    }

    /// Parses a resolved module file. Never fatal: unreadable or
    /// unparseable files degrade to stubs.
    fn resolve_file(
        &mut self,
        abs: &Path,
        rel: &Path,
        decl: &ModDecl<'_>,
        child_path: &str,
    ) -> Module {
        let stub = |reason: &str, error: &dyn std::fmt::Display| {
            warn!(file = %rel.display(), error = %error, "{reason}");
            let mut stub = Module::stub(
                &decl.name,
                child_path,
                &path_string(rel),
                decl.visibility.clone(),
            );
            stub.line = decl.line;
            stub
        };
        let source = match std::fs::read_to_string(abs) {
            Ok(source) => source,
            Err(e) => {
                self.stub_count += 1;
                return stub("unreadable module file", &e);
            }
        };
        let tree = match self.parser.parse(&source, abs) {
            Ok(tree) => tree,
            Err(e) => {
                self.stub_count += 1;
                return stub("unparseable module file", &e);
            }
        };
        // Non-entry files with syntax errors still contribute whatever the
        // parser recovered.
        self.build_module(
            &decl.name,
            child_path,
            rel,
            decl.line,
            decl.visibility.clone(),
            tree.root_node(),
            &source,
        )
    }
}

fn path_string(path: &Path) -> String {
    path.to_string_lossy().replace('\\', "/")
}
