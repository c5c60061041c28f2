//! SQL safety helpers applied before a statement is handed to a driver.
//!
//! All scanning shares the compiler's literal/comment rules, so a `--` or `;`
//! inside a quoted literal is never mistaken for a comment or a statement
//! separator.

use std::fmt;

use serde::Serialize;
use sha2::{Digest, Sha256};

use crate::compiler::State;
use crate::error::{CompileError, SqlBindError, SqlBindResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SegmentKind {
    Code,
    Literal,
    LineComment,
    BlockComment,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Segment<'a> {
    pub kind: SegmentKind,
    pub text: &'a str,
}

/// Split `sql` into code, literal and comment runs.
///
/// A line comment stops before its newline; the newline belongs to the
/// following code run.
pub(crate) fn segments(sql: &str) -> Vec<Segment<'_>> {
    split(sql).0
}

/// Fail if `sql` ends inside a quoted literal or a block comment.
///
/// The error position is the byte offset of the unclosed opener.
pub fn ensure_terminated(sql: &str) -> Result<(), CompileError> {
    let (_, state, opened_at) = split(sql);
    match state.unterminated() {
        Some(message) => Err(CompileError::malformed(opened_at, message)),
        None => Ok(()),
    }
}

/// Segments plus the state the scan ended in and where that state began.
fn split(sql: &str) -> (Vec<Segment<'_>>, State, usize) {
    let bytes = sql.as_bytes();
    let mut out = Vec::new();
    let mut state = State::Default;
    let mut start = 0;
    let mut i = 0;

    // Every delimiter is ASCII, so byte offsets are always char boundaries.
    while i < bytes.len() {
        let b = bytes[i];
        let next = bytes.get(i + 1).copied();

        match state {
            State::Default => {
                let entered = match (b, next) {
                    (b'-', Some(b'-')) => Some((State::InLineComment, 2)),
                    (b'/', Some(b'*')) => Some((State::InBlockComment, 2)),
                    (b'\'', _) => Some((State::InSingleQuoted, 1)),
                    (b'"', _) => Some((State::InDoubleQuoted, 1)),
                    _ => None,
                };
                if let Some((entered, width)) = entered {
                    push(&mut out, SegmentKind::Code, &sql[start..i]);
                    start = i;
                    state = entered;
                    i += width;
                    continue;
                }
            }
            State::InLineComment => {
                if b == b'\n' {
                    push(&mut out, SegmentKind::LineComment, &sql[start..i]);
                    start = i;
                    state = State::Default;
                }
            }
            State::InBlockComment => {
                if b == b'*' && next == Some(b'/') {
                    push(&mut out, SegmentKind::BlockComment, &sql[start..i + 2]);
                    start = i + 2;
                    state = State::Default;
                    i += 2;
                    continue;
                }
            }
            State::InSingleQuoted | State::InDoubleQuoted => {
                let close = if state == State::InSingleQuoted { b'\'' } else { b'"' };
                if b == close {
                    push(&mut out, SegmentKind::Literal, &sql[start..=i]);
                    start = i + 1;
                    state = State::Default;
                }
            }
        }
        i += 1;
    }

    let tail = match state {
        State::Default => SegmentKind::Code,
        State::InSingleQuoted | State::InDoubleQuoted => SegmentKind::Literal,
        State::InLineComment => SegmentKind::LineComment,
        State::InBlockComment => SegmentKind::BlockComment,
    };
    push(&mut out, tail, &sql[start..]);
    (out, state, start)
}

fn push<'a>(out: &mut Vec<Segment<'a>>, kind: SegmentKind, text: &'a str) {
    if !text.is_empty() {
        out.push(Segment { kind, text });
    }
}

/// Remove `--` and `/* */` comments.
///
/// Line comments are dropped up to (not including) the newline; block
/// comments become a single space so adjacent tokens stay separated.
pub fn strip_comments(sql: &str) -> String {
    let mut out = String::with_capacity(sql.len());
    for seg in segments(sql) {
        match seg.kind {
            SegmentKind::Code | SegmentKind::Literal => out.push_str(seg.text),
            SegmentKind::LineComment => {}
            SegmentKind::BlockComment => out.push(' '),
        }
    }
    out
}

/// Trim trailing whitespace and semicolons.
pub fn strip_trailing_semicolon(sql: &str) -> &str {
    let mut s = sql.trim_end();
    while let Some(rest) = s.strip_suffix(';') {
        s = rest.trim_end();
    }
    s
}

/// Fail if `sql` contains a statement separator outside literals and comments.
pub fn ensure_single_statement(sql: &str) -> SqlBindResult<()> {
    let separated = segments(sql)
        .iter()
        .any(|seg| seg.kind == SegmentKind::Code && seg.text.contains(';'));
    if separated {
        return Err(SqlBindError::MultipleStatements);
    }
    Ok(())
}

/// Broad category of a statement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum StatementType {
    Query,
    Update,
    Ddl,
}

impl fmt::Display for StatementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StatementType::Query => write!(f, "QUERY"),
            StatementType::Update => write!(f, "UPDATE"),
            StatementType::Ddl => write!(f, "DDL"),
        }
    }
}

/// Classify a statement by its leading keyword.
pub fn detect_type(sql: &str) -> StatementType {
    let stripped = strip_comments(sql);
    let body = stripped.trim_start_matches(|c: char| c.is_whitespace() || c == '(');
    let keyword: String = body
        .chars()
        .take_while(|c| c.is_ascii_alphabetic())
        .collect::<String>()
        .to_ascii_uppercase();

    match keyword.as_str() {
        "SELECT" | "WITH" | "SHOW" | "DESCRIBE" | "DESC" | "EXPLAIN" | "VALUES" => {
            StatementType::Query
        }
        "CREATE" | "ALTER" | "DROP" | "TRUNCATE" | "RENAME" | "COMMENT" | "GRANT" | "REVOKE" => {
            StatementType::Ddl
        }
        _ => StatementType::Update,
    }
}

/// Database family inferred from a connection URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    Postgres,
    MySql,
    MariaDb,
    Sqlite,
    SqlServer,
    Oracle,
    H2,
    Unknown,
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Dialect::Postgres => "postgres",
            Dialect::MySql => "mysql",
            Dialect::MariaDb => "mariadb",
            Dialect::Sqlite => "sqlite",
            Dialect::SqlServer => "sqlserver",
            Dialect::Oracle => "oracle",
            Dialect::H2 => "h2",
            Dialect::Unknown => "unknown",
        };
        f.write_str(name)
    }
}

/// Guess the dialect from a URL such as `postgres://...` or `jdbc:mysql://...`.
pub fn guess_dialect(url: &str) -> Dialect {
    let lower = url.trim().to_ascii_lowercase();
    let rest = lower.strip_prefix("jdbc:").unwrap_or(&lower);
    let scheme = rest.split(':').next().unwrap_or_default();

    match scheme {
        "postgres" | "postgresql" | "pgsql" => Dialect::Postgres,
        "mysql" => Dialect::MySql,
        "mariadb" => Dialect::MariaDb,
        "sqlite" | "sqlite3" => Dialect::Sqlite,
        "sqlserver" | "mssql" => Dialect::SqlServer,
        "oracle" => Dialect::Oracle,
        "h2" => Dialect::H2,
        _ => Dialect::Unknown,
    }
}

/// Lowercase hex SHA-256 of the statement text.
pub fn sql_hash(sql: &str) -> String {
    let digest = Sha256::digest(sql.as_bytes());
    digest.iter().map(|b| format!("{:02x}", b)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_strip_comments() {
        assert_eq!(
            strip_comments("SELECT 1 -- trailing\nFROM t"),
            "SELECT 1 \nFROM t"
        );
        assert_eq!(strip_comments("SELECT/* x */1"), "SELECT 1");
        assert_eq!(
            strip_comments("SELECT '-- not a comment' /* gone */"),
            "SELECT '-- not a comment'  "
        );
    }

    #[test]
    fn test_strip_unterminated_comment() {
        assert_eq!(strip_comments("SELECT 1 /* open"), "SELECT 1  ");
        assert_eq!(strip_comments("SELECT 1 -- tail"), "SELECT 1 ");
    }

    #[test]
    fn test_strip_trailing_semicolon() {
        assert_eq!(strip_trailing_semicolon("SELECT 1;"), "SELECT 1");
        assert_eq!(strip_trailing_semicolon("SELECT 1 ; ;\n"), "SELECT 1");
        assert_eq!(strip_trailing_semicolon("SELECT 1"), "SELECT 1");
    }

    #[test]
    fn test_single_statement() {
        assert!(ensure_single_statement("SELECT 1").is_ok());
        assert!(ensure_single_statement("SELECT ';' FROM t").is_ok());
        assert!(ensure_single_statement("SELECT 1 -- ; comment").is_ok());

        let err = ensure_single_statement("SELECT * FROM users; DROP TABLE users").unwrap_err();
        assert_eq!(err.to_string(), "Multiple statements detected.");
    }

    #[test]
    fn test_detect_type() {
        assert_eq!(detect_type("select * from t"), StatementType::Query);
        assert_eq!(detect_type("  WITH x AS (SELECT 1) SELECT * FROM x"), StatementType::Query);
        assert_eq!(detect_type("(SELECT 1) UNION (SELECT 2)"), StatementType::Query);
        assert_eq!(detect_type("/* hint */ SELECT 1"), StatementType::Query);
        assert_eq!(detect_type("INSERT INTO t VALUES (1)"), StatementType::Update);
        assert_eq!(detect_type("DELETE FROM t"), StatementType::Update);
        assert_eq!(detect_type("ALTER TABLE users ADD COLUMN age INT"), StatementType::Ddl);
        assert_eq!(detect_type("drop table t"), StatementType::Ddl);
    }

    #[test]
    fn test_guess_dialect() {
        assert_eq!(guess_dialect("postgres://localhost/db"), Dialect::Postgres);
        assert_eq!(guess_dialect("jdbc:postgresql://h/db"), Dialect::Postgres);
        assert_eq!(guess_dialect("jdbc:mysql://h/db"), Dialect::MySql);
        assert_eq!(guess_dialect("jdbc:h2:mem:testdb"), Dialect::H2);
        assert_eq!(guess_dialect("sqlite::memory:"), Dialect::Sqlite);
        assert_eq!(guess_dialect("jdbc:sqlserver://h;db=x"), Dialect::SqlServer);
        assert_eq!(guess_dialect("redis://h"), Dialect::Unknown);
        assert_eq!(Dialect::MariaDb.to_string(), "mariadb");
    }

    #[test]
    fn test_sql_hash() {
        assert_eq!(
            sql_hash(""),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        assert_eq!(sql_hash("SELECT 1").len(), 64);
        assert_ne!(sql_hash("SELECT 1"), sql_hash("SELECT 2"));
    }

    #[test]
    fn test_ensure_terminated() {
        assert!(ensure_terminated("SELECT 'a' /* b */ -- c").is_ok());
        assert_eq!(
            ensure_terminated("SELECT :a /* open :b").unwrap_err(),
            CompileError::malformed(10, "unterminated block comment")
        );
        assert_eq!(
            ensure_terminated("SELECT \"open").unwrap_err(),
            CompileError::malformed(7, "unterminated double-quoted literal")
        );
    }

    #[test]
    fn test_segments_keep_all_text() {
        let sql = "a 'b' \"c\" -- d\n/* e */ f";
        let joined: String = segments(sql).iter().map(|s| s.text).collect();
        assert_eq!(joined, sql);
        let kinds: Vec<SegmentKind> = segments(sql).iter().map(|s| s.kind).collect();
        assert_eq!(
            kinds,
            vec![
                SegmentKind::Code,
                SegmentKind::Literal,
                SegmentKind::Code,
                SegmentKind::Literal,
                SegmentKind::Code,
                SegmentKind::LineComment,
                SegmentKind::Code,
                SegmentKind::BlockComment,
                SegmentKind::Code,
            ]
        );
    }
}
