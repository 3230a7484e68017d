//! Transpiler test modules.
//!
//! Tests are organized by category:
//! - `select`: SELECT clause order, joins, sampling, LIMIT variants
//! - `functions`: expressions, lambdas, EXTRACT, null-safe comparison
//! - `mutations`: ALTER DELETE and INSERT
//! - `ddl`: CREATE TABLE and DROP TABLE

mod functions;
mod select;

use crate::ast::{Expr, Statement};
use crate::transpiler::{Capabilities, CompiledStatement, Compiler, ParamStyle};

/// Compile with bound parameters.
fn compile(statement: impl Into<Statement>) -> CompiledStatement {
    let caps = Capabilities::default();
    Compiler::new(&caps).compile(&statement.into()).unwrap()
}

/// Compile with every value inlined.
fn compile_literal(statement: impl Into<Statement>) -> String {
    let caps = Capabilities::default();
    Compiler::new(&caps)
        .literal_binds(true)
        .compile(&statement.into())
        .unwrap()
        .sql
}

fn expr_sql(expr: &Expr) -> String {
    let caps = Capabilities::default();
    Compiler::new(&caps).compile_expr(expr).unwrap().sql
}

fn expr_sql_with(expr: &Expr, style: ParamStyle) -> String {
    let caps = Capabilities::default();
    Compiler::new(&caps)
        .param_style(style)
        .compile_expr(expr)
        .unwrap()
        .sql
}
