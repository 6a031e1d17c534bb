//! Minimal manifest reader.
//!
//! Projects only the fields module resolution needs out of a `Cargo.toml`:
//! the package name, an optional library entry override, binary entries, and
//! workspace member globs. Everything else in the manifest is ignored. A
//! missing or unparseable manifest is non-fatal and yields the empty
//! [`Manifest`]; entry-point location then falls back to filesystem
//! conventions alone.

use std::path::Path;

use tracing::debug;

/// One `[[bin]]` entry.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BinEntry {
    pub name: Option<String>,
    /// Path relative to the project root, when overridden.
    pub path: Option<String>,
}

/// The subset of the manifest that drives module resolution.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Manifest {
    /// `package.name`. Falls back to the project directory basename when
    /// absent.
    pub package_name: Option<String>,
    /// `lib.path` override, relative to the project root.
    pub lib_path: Option<String>,
    /// `[[bin]]` entries, in declaration order.
    pub bins: Vec<BinEntry>,
    /// `workspace.members` glob patterns, relative to the project root.
    pub workspace_members: Vec<String>,
}

impl Manifest {
    /// True when the manifest declares workspace members.
    pub fn is_workspace(&self) -> bool {
        !self.workspace_members.is_empty()
    }
}

/// Reads the manifest at `<root>/Cargo.toml`.
///
/// Failure to find or parse the manifest is non-fatal: the empty structure
/// is returned and resolution proceeds on filesystem conventions.
pub fn read_manifest(root: &Path) -> Manifest {
    let manifest_path = root.join("Cargo.toml");
    let contents = match std::fs::read_to_string(&manifest_path) {
        Ok(contents) => contents,
        Err(e) => {
            debug!(path = %manifest_path.display(), error = %e, "no readable manifest");
            return Manifest::default();
        }
    };

    let table: toml::Table = match contents.parse() {
        Ok(table) => table,
        Err(e) => {
            debug!(path = %manifest_path.display(), error = %e, "manifest did not parse");
            return Manifest::default();
        }
    };

    Manifest {
        package_name: table
            .get("package")
            .and_then(|p| p.as_table())
            .and_then(|p| p.get("name"))
            .and_then(|n| n.as_str())
            .map(str::to_string),
        lib_path: table
            .get("lib")
            .and_then(|l| l.as_table())
            .and_then(|l| l.get("path"))
            .and_then(|p| p.as_str())
            .map(str::to_string),
        bins: read_bins(&table),
        workspace_members: read_members(&table),
    }
}

/// Reads the `[[bin]]` array-of-tables.
fn read_bins(table: &toml::Table) -> Vec<BinEntry> {
    let Some(bins) = table.get("bin").and_then(|b| b.as_array()) else {
        return Vec::new();
    };
    bins.iter()
        .filter_map(|entry| entry.as_table())
        .map(|entry| BinEntry {
            name: entry.get("name").and_then(|n| n.as_str()).map(str::to_string),
            path: entry.get("path").and_then(|p| p.as_str()).map(str::to_string),
        })
        .collect()
}

/// Reads `workspace.members`, including multi-line arrays.
fn read_members(table: &toml::Table) -> Vec<String> {
    let Some(members) = table
        .get("workspace")
        .and_then(|w| w.as_table())
        .and_then(|w| w.get("members"))
        .and_then(|m| m.as_array())
    else {
        return Vec::new();
    };
    members
        .iter()
        .filter_map(|m| m.as_str())
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::tempdir;

    use super::*;

    fn write_manifest(contents: &str) -> tempfile::TempDir {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("Cargo.toml"), contents).unwrap();
        dir
    }

    #[test]
    fn test_missing_manifest_is_empty() {
        let dir = tempdir().unwrap();
        assert_eq!(read_manifest(dir.path()), Manifest::default());
    }

    #[test]
    fn test_package_name() {
        let dir = write_manifest(
            r#"
[package]
name = "widget"
version = "0.1.0"
"#,
        );
        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.package_name.as_deref(), Some("widget"));
        assert!(!manifest.is_workspace());
    }

    #[test]
    fn test_lib_path_override() {
        let dir = write_manifest(
            r#"
[package]
name = "widget"

[lib]
path = "src/widget.rs"
"#,
        );
        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.lib_path.as_deref(), Some("src/widget.rs"));
    }

    #[test]
    fn test_bin_entries() {
        let dir = write_manifest(
            r#"
[[bin]]
name = "tool"
path = "src/bin/tool.rs"

[[bin]]
name = "other"
"#,
        );
        let manifest = read_manifest(dir.path());
        assert_eq!(manifest.bins.len(), 2);
        assert_eq!(manifest.bins[0].name.as_deref(), Some("tool"));
        assert_eq!(manifest.bins[0].path.as_deref(), Some("src/bin/tool.rs"));
        assert_eq!(manifest.bins[1].path, None);
    }

    #[test]
    fn test_multiline_members_and_comments() {
        let dir = write_manifest(
            r#"
# top-level comment
[workspace]
members = [
    "crates/alpha",
    # a comment inside the array
    "crates/beta",
]
"#,
        );
        let manifest = read_manifest(dir.path());
        assert!(manifest.is_workspace());
        assert_eq!(manifest.workspace_members, vec!["crates/alpha", "crates/beta"]);
    }

    #[test]
    fn test_malformed_manifest_is_empty() {
        let dir = write_manifest("this is [ not toml");
        assert_eq!(read_manifest(dir.path()), Manifest::default());
    }
}
