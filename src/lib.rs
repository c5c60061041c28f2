//! # sqlbind
//!
//! Compile SQL templates written with named parameters (`:name`) into
//! positional `?` placeholders plus the values to bind, in order.
//!
//! ## Quick Example
//!
//! ```rust
//! use std::collections::HashMap;
//! use sqlbind::prelude::*;
//!
//! let params = HashMap::from([("x".to_string(), SqlValue::Int(7))]);
//! let compiled = sqlbind::compile("WHERE a = :x OR b = ':x' OR c = :x", &params)?;
//!
//! assert_eq!(compiled.sql(), "WHERE a = ? OR b = ':x' OR c = ?");
//! assert_eq!(compiled.ordered(), &[SqlValue::Int(7), SqlValue::Int(7)]);
//! # Ok::<(), CompileError>(())
//! ```
//!
//! ## Recognized syntax
//!
//! | Construct        | Treatment                            |
//! |------------------|--------------------------------------|
//! | `:name`          | Replaced by `?`, value appended      |
//! | `'...'`, `"..."` | Copied verbatim                      |
//! | `-- ...\n`       | Copied verbatim up to the newline    |
//! | `/* ... */`      | Copied verbatim (not nested)         |
//! | `:` + non-letter | Copied verbatim                      |

pub mod compiler;
pub mod config;
pub mod error;
pub mod preprocess;
pub mod statement;
pub mod value;

pub use compiler::{compile, references, Compiled, Compiler, ParamRef};
pub use error::{CompileError, SqlBindError, SqlBindResult};
pub use value::SqlValue;

pub mod prelude {
    pub use crate::compiler::{Compiled, Compiler, ParamRef};
    pub use crate::config::{CompilerOptions, Config};
    pub use crate::error::*;
    pub use crate::preprocess::{Dialect, StatementType};
    pub use crate::statement::{prepare, Bindings, PreparedStatement};
    pub use crate::value::SqlValue;
}
