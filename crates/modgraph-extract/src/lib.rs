//! Module-tree discovery and symbol extraction.
//!
//! This crate is the front of the modgraph pipeline. Given a project root it
//! reads the manifest, locates the entry point, walks `mod` declarations and
//! filesystem conventions to discover the module tree, and extracts every
//! declaration into the schema types of [`modgraph_schemas`]. The output is
//! purely lexical: name resolution and graph construction happen downstream.
//!
//! ## Usage
//!
//! ```ignore
//! use modgraph_extract::{resolve_project, FilterConfig};
//!
//! let crates = resolve_project("path/to/project".as_ref(), &FilterConfig::no_tests())?;
//! for crate_def in &crates {
//!     println!("{}: {} top-level modules", crate_def.name, crate_def.root.submodules.len());
//! }
//! ```
//!
//! ## Failure policy
//!
//! Fatal: missing entry point ([`ExtractError::is_manifest`]), unreadable
//! entry file ([`ExtractError::is_io`]), entry file the parser rejects
//! ([`ExtractError::is_parse`]). Everything else — unreadable non-entry
//! files, unresolved `mod` names, syntax errors in non-entry files — degrades
//! to empty module stubs with a `tracing` diagnostic.

mod error;
mod filters;
mod manifest;
mod modules;
mod parser;
mod symbols;

#[doc(inline)]
pub use crate::error::ExtractError;
#[doc(inline)]
pub use crate::filters::FilterConfig;
#[doc(inline)]
pub use crate::manifest::{read_manifest, BinEntry, Manifest};
#[doc(inline)]
pub use crate::modules::{resolve_crate, resolve_project};
#[doc(inline)]
pub use crate::parser::ParserAdapter;
