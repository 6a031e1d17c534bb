//! The parser adapter.
//!
//! Wraps the tree-sitter parser with the Rust grammar. The rest of the
//! pipeline treats the result as an opaque labeled tree: node kinds via
//! `Node::kind()`, typed children via `child_by_field_name`, and source
//! positions via `start_position()`. No other module constructs a parser.

use std::path::Path;

use tree_sitter::{Parser, Tree};

use crate::error::ExtractError;

/// A reusable source-text parser.
pub struct ParserAdapter {
    parser: Parser,
}

impl ParserAdapter {
    /// Creates a parser configured for the Rust grammar.
    ///
    /// # Errors
    ///
    /// Returns a parse-class [`ExtractError`] if the grammar cannot be
    /// loaded, which indicates a build misconfiguration rather than bad
    /// input.
    pub fn new() -> Result<Self, ExtractError> {
        let mut parser = Parser::new();
        parser
            .set_language(&tree_sitter_rust::LANGUAGE.into())
            .map_err(|_| ExtractError::parse("<grammar>"))?;
        Ok(Self { parser })
    }

    /// Parses one file's source text.
    ///
    /// tree-sitter recovers from most syntax errors, so a tree is returned
    /// even for partially invalid sources; `None` from the underlying parser
    /// (a hard failure) becomes a parse-class error carrying `file`. Whether
    /// a tree containing `ERROR` nodes is fatal depends on the caller: it is
    /// for the entry file, not for anything else.
    pub fn parse(&mut self, source: &str, file: &Path) -> Result<Tree, ExtractError> {
        self.parser
            .parse(source, None)
            .ok_or_else(|| ExtractError::parse(file))
    }
}
