//! Statement preparation.
//!
//! Turns a raw template and its bindings into the `(sql, values)` pair a
//! prepared-statement API expects. Nothing here talks to a database.

use std::collections::HashMap;

use serde::Serialize;

use crate::compiler::Compiler;
use crate::config::CompilerOptions;
use crate::error::{SqlBindError, SqlBindResult};
use crate::preprocess::{self, StatementType};

/// How values are supplied for a statement.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Bindings<V> {
    /// No values; the statement is used as-is.
    #[default]
    None,
    /// Values already in `?` order.
    Positional(Vec<V>),
    /// Values keyed by `:name`, compiled into `?` order.
    Named(HashMap<String, V>),
}

/// A statement ready for a driver.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PreparedStatement<V> {
    /// SQL with positional `?` placeholders.
    pub sql: String,
    /// Values in placeholder order.
    pub values: Vec<V>,
    pub statement_type: StatementType,
    /// SHA-256 of `sql`, hex encoded.
    pub sql_hash: String,
}

/// Clean, validate and compile `sql`.
///
/// Comments and trailing semicolons are removed, then the statement is
/// checked to be a single statement before named bindings are compiled.
/// Under `strict`, the raw text is checked for unclosed literals and block
/// comments first, whatever the bindings.
pub fn prepare<V: Clone>(
    sql: &str,
    bindings: Bindings<V>,
    options: CompilerOptions,
) -> SqlBindResult<PreparedStatement<V>> {
    if sql.trim().is_empty() {
        return Err(SqlBindError::invalid("sql required"));
    }
    if options.strict {
        preprocess::ensure_terminated(sql)?;
    }

    let cleaned = preprocess::strip_comments(sql);
    let cleaned = preprocess::strip_trailing_semicolon(&cleaned);
    preprocess::ensure_single_statement(cleaned)?;

    let (sql, values) = match bindings {
        Bindings::Named(params) => Compiler::new(options).compile(cleaned, &params)?.into_parts(),
        Bindings::Positional(values) => (cleaned.to_string(), values),
        Bindings::None => (cleaned.to_string(), Vec::new()),
    };

    let statement_type = preprocess::detect_type(&sql);
    let sql_hash = preprocess::sql_hash(&sql);
    tracing::debug!(%statement_type, %sql_hash, values = values.len(), "prepared statement");

    Ok(PreparedStatement {
        sql,
        values,
        statement_type,
        sql_hash,
    })
}
