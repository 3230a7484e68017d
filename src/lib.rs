//! # bytehouse-sql
//!
//! A SQL dialect compiler for ByteHouse and ClickHouse.
//!
//! Statements are built as plain values ([`ast::Select`], [`ast::Insert`],
//! [`ast::Delete`], [`ast::CreateTable`], [`ast::DropTable`]) and compiled
//! against the server's [`transpiler::Capabilities`] into SQL text plus bound
//! parameters.
//!
//! ## Quick Example
//!
//! ```rust,ignore
//! use bytehouse_sql::prelude::*;
//!
//! let t1 = Table::new("t1").column("x", Type::Int32);
//! let query = Select::new()
//!     .column(t1.c("x"))
//!     .from("t1")
//!     .filter(t1.c("x").gt(10))
//!     .limit_by([t1.c("x")], 1, None);
//!
//! let compiled = bytehouse_sql::compile(&query.into(), &Capabilities::default())?;
//! // => "SELECT t1.x FROM t1 WHERE t1.x > %(x_1)s LIMIT %(param_1)s BY t1.x"
//! ```
//!
//! ## Layers
//!
//! | Module       | Role                                              |
//! |--------------|---------------------------------------------------|
//! | `types`      | Column type registry: parse, render, coerce       |
//! | `clauses`    | ARRAY JOIN, SAMPLE, LIMIT BY, TTL, lambdas        |
//! | `engine`     | `ENGINE = ...` declarations and reflection        |
//! | `transpiler` | Statement compiler                                |

pub mod ast;
pub mod clauses;
pub mod config;
pub mod engine;
pub mod error;
pub mod transpiler;
pub mod types;

pub mod prelude {
    pub use crate::ast::builders::*;
    pub use crate::ast::*;
    pub use crate::clauses::*;
    pub use crate::config::DialectConfig;
    pub use crate::engine::{Engine, EngineParams, KeyExprs};
    pub use crate::error::*;
    pub use crate::transpiler::{
        Capabilities, CompileOptions, CompiledStatement, Compiler, ParamStyle, ServerVersion,
        SharedCapabilities, ToSql,
    };
    pub use crate::types::Type;
}

use ast::Statement;
use error::DialectResult;
use transpiler::{Capabilities, CompiledStatement, Compiler};

/// Compile `statement` with default options.
pub fn compile(statement: &Statement, capabilities: &Capabilities) -> DialectResult<CompiledStatement> {
    Compiler::new(capabilities).compile(statement)
}
