//! Named-parameter compiler.
//!
//! Rewrites a template using `:name` tokens into SQL with positional `?`
//! placeholders plus the values to bind, in placeholder order.
//!
//! ```text
//! SELECT * FROM t WHERE a = :x OR b = :x   {x: 7}
//!                 │
//!                 ▼
//! SELECT * FROM t WHERE a = ? OR b = ?     [7, 7]
//! ```
//!
//! Tokens inside quoted literals and comments are copied verbatim.

use std::collections::HashMap;

use crate::config::CompilerOptions;
use crate::error::CompileError;

/// Scanner position relative to literals and comments.
///
/// Parameters are only recognized in `Default`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum State {
    Default,
    InSingleQuoted,
    InDoubleQuoted,
    InLineComment,
    InBlockComment,
}

impl State {
    /// Description used when the template ends inside this state.
    pub(crate) fn unterminated(self) -> Option<&'static str> {
        match self {
            State::Default | State::InLineComment => None,
            State::InSingleQuoted => Some("unterminated single-quoted literal"),
            State::InDoubleQuoted => Some("unterminated double-quoted literal"),
            State::InBlockComment => Some("unterminated block comment"),
        }
    }
}

/// A compiled statement: positional SQL and its ordered bindings.
#[derive(Debug, Clone, PartialEq)]
pub struct Compiled<V> {
    sql: String,
    ordered: Vec<V>,
}

impl<V> Compiled<V> {
    /// SQL text with `?` placeholders.
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Values in placeholder order.
    pub fn ordered(&self) -> &[V] {
        &self.ordered
    }

    pub fn into_parts(self) -> (String, Vec<V>) {
        (self.sql, self.ordered)
    }
}

/// A recognized `:name` token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParamRef {
    /// Parameter name without the leading colon.
    pub name: String,
    /// Byte offset of the colon in the template.
    pub offset: usize,
}

/// Template compiler.
#[derive(Debug, Clone, Copy, Default)]
pub struct Compiler {
    options: CompilerOptions,
}

impl Compiler {
    pub fn new(options: CompilerOptions) -> Self {
        Self { options }
    }

    /// Compile `sql` against `params`.
    ///
    /// `params` must be non-empty even when the template references nothing.
    /// Fails on the first token whose name is not bound; no partial result
    /// is returned.
    pub fn compile<V: Clone>(
        &self,
        sql: &str,
        params: &HashMap<String, V>,
    ) -> Result<Compiled<V>, CompileError> {
        if params.is_empty() {
            return Err(CompileError::InvalidArgument(
                "named parameters must not be empty".to_string(),
            ));
        }

        let mut ordered = Vec::new();
        let sql = scan(sql, self.options, |name, _| match params.get(name) {
            Some(value) => {
                ordered.push(value.clone());
                Ok(())
            }
            None => {
                tracing::debug!(parameter = name, "unbound named parameter");
                Err(CompileError::MissingParameter(name.to_string()))
            }
        })?;

        tracing::debug!(
            sql_len = sql.len(),
            bound = ordered.len(),
            "compiled named parameters"
        );
        Ok(Compiled { sql, ordered })
    }

    /// List every recognized parameter token, in order of occurrence.
    pub fn references(&self, sql: &str) -> Result<Vec<ParamRef>, CompileError> {
        let mut refs = Vec::new();
        scan(sql, self.options, |name, offset| {
            refs.push(ParamRef {
                name: name.to_string(),
                offset,
            });
            Ok(())
        })?;
        Ok(refs)
    }
}

/// Compile with default options.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
///
/// let params = HashMap::from([("id".to_string(), 5)]);
/// let compiled = sqlbind::compile("SELECT * FROM t WHERE id = :id", &params).unwrap();
/// assert_eq!(compiled.sql(), "SELECT * FROM t WHERE id = ?");
/// assert_eq!(compiled.ordered(), &[5]);
/// ```
pub fn compile<V: Clone>(
    sql: &str,
    params: &HashMap<String, V>,
) -> Result<Compiled<V>, CompileError> {
    Compiler::default().compile(sql, params)
}

/// Recognized parameter tokens with default options.
pub fn references(sql: &str) -> Result<Vec<ParamRef>, CompileError> {
    Compiler::default().references(sql)
}

fn is_ident_start(c: char) -> bool {
    c.is_alphabetic() || c == '_'
}

fn is_ident_part(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// Single left-to-right pass. Each recognized token is reported to
/// `on_param` with its name and offset, and replaced by `?` in the output.
fn scan<F>(sql: &str, options: CompilerOptions, mut on_param: F) -> Result<String, CompileError>
where
    F: FnMut(&str, usize) -> Result<(), CompileError>,
{
    let chars: Vec<(usize, char)> = sql.char_indices().collect();
    let mut out = String::with_capacity(sql.len());
    let mut state = State::Default;
    let mut opened_at = 0;
    let mut i = 0;

    while i < chars.len() {
        let (offset, c) = chars[i];
        let next = chars.get(i + 1).map(|&(_, n)| n);

        match state {
            State::Default => match (c, next) {
                ('-', Some('-')) => {
                    out.push_str("--");
                    state = State::InLineComment;
                    opened_at = offset;
                    i += 2;
                    continue;
                }
                ('/', Some('*')) => {
                    out.push_str("/*");
                    state = State::InBlockComment;
                    opened_at = offset;
                    i += 2;
                    continue;
                }
                ('\'', _) => {
                    out.push(c);
                    state = State::InSingleQuoted;
                    opened_at = offset;
                }
                ('"', _) => {
                    out.push(c);
                    state = State::InDoubleQuoted;
                    opened_at = offset;
                }
                (':', Some(':')) if options.pass_through_casts => {
                    out.push_str("::");
                    i += 2;
                    continue;
                }
                (':', Some(n)) if is_ident_start(n) => {
                    let mut end = i + 1;
                    while end < chars.len() && is_ident_part(chars[end].1) {
                        end += 1;
                    }
                    let name_start = chars[i + 1].0;
                    let name_end = chars.get(end).map_or(sql.len(), |&(o, _)| o);
                    on_param(&sql[name_start..name_end], offset)?;
                    out.push('?');
                    i = end;
                    continue;
                }
                _ => out.push(c),
            },
            State::InLineComment => {
                out.push(c);
                if c == '\n' {
                    state = State::Default;
                }
            }
            State::InBlockComment => {
                if c == '*' && next == Some('/') {
                    out.push_str("*/");
                    state = State::Default;
                    i += 2;
                    continue;
                }
                out.push(c);
            }
            State::InSingleQuoted => {
                out.push(c);
                if c == '\'' {
                    state = State::Default;
                }
            }
            State::InDoubleQuoted => {
                out.push(c);
                if c == '"' {
                    state = State::Default;
                }
            }
        }
        i += 1;
    }

    if options.strict {
        if let Some(message) = state.unterminated() {
            return Err(CompileError::malformed(opened_at, message));
        }
    }

    Ok(out)
}
