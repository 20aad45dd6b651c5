//! Pre-compiled tree-sitter queries for import extraction.
//!
//! This module provides the [`IMPORT_QUERY`] source and
//! [`import_query`] for lazily compiling and caching it per dialect.

use std::sync::OnceLock;

use tree_sitter::Query;

use crate::engine::Dialect;
use crate::error::SyntaxError;

/// Tree-sitter query for locating module references.
///
/// Bindings are read from the matched statement nodes directly; the query
/// only finds them.
///
/// # Capture Names
///
/// - `import.statement` - The full `import_statement` node
/// - `import.source` - The import path string literal
/// - `import.dynamic.source` - Dynamic import path string
/// - `require.callee` - Callee of a `require`-shaped call
/// - `require.source` - Its string argument
pub const IMPORT_QUERY: &str = r"
; Static imports with source path
(import_statement
  source: (string) @import.source) @import.statement

; Dynamic imports: import('./path') or await import('./path')
(call_expression
  function: (import)
  arguments: (arguments
    (string) @import.dynamic.source))

; CommonJS: require('./path'); the callee name is checked in code
(call_expression
  function: (identifier) @require.callee
  arguments: (arguments
    (string) @require.source))
";

/// Global cache for the compiled query (TypeScript).
static COMPILED_QUERY_TS: OnceLock<Query> = OnceLock::new();

/// Global cache for the compiled query (TSX).
static COMPILED_QUERY_TSX: OnceLock<Query> = OnceLock::new();

/// Returns the compiled import query for a dialect.
///
/// The query is compiled once per dialect and cached for all subsequent
/// calls. This function is thread-safe.
///
/// # Errors
///
/// Returns [`SyntaxError::QueryCompile`] if the query fails to compile.
pub fn import_query(dialect: Dialect) -> Result<&'static Query, SyntaxError> {
    let cell = match dialect {
        Dialect::Tsx => &COMPILED_QUERY_TSX,
        Dialect::TypeScript => &COMPILED_QUERY_TS,
    };
    if let Some(query) = cell.get() {
        return Ok(query);
    }
    let query = compile_query(dialect)?;
    Ok(cell.get_or_init(|| query))
}

fn compile_query(dialect: Dialect) -> Result<Query, SyntaxError> {
    Query::new(&dialect.grammar(), IMPORT_QUERY).map_err(|e| SyntaxError::QueryCompile {
        offset: e.offset,
        kind: e,
    })
}

/// Returns the index of a capture name.
#[inline]
pub fn capture_index(query: &Query, name: &str) -> Option<u32> {
    query.capture_index_for_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_compiles_for_both_dialects() {
        assert!(compile_query(Dialect::Tsx).is_ok());
        assert!(compile_query(Dialect::TypeScript).is_ok());
    }

    #[test]
    fn test_capture_names() {
        let query = import_query(Dialect::Tsx).expect("query should compile");
        for name in [
            "import.statement",
            "import.source",
            "import.dynamic.source",
            "require.callee",
            "require.source",
        ] {
            assert!(capture_index(query, name).is_some(), "missing {name}");
        }
        assert_eq!(query.pattern_count(), 3);
    }
}
