//! Ergonomic builder functions for expressions.
//!
//! ```ignore
//! use bytehouse_sql::ast::builders::*;
//!
//! let q = Select::new()
//!     .column(count(distinct(col("x"))))
//!     .column(func("arrayFilter", vec![lambda(|x| x.like("%World%")), col("words")]).label("hits"))
//!     .from("t1");
//! ```

use super::expr::Expr;
use super::values::Value;
use crate::clauses::Lambda;
use crate::types::Type;

/// Unqualified column reference.
pub fn col(name: &str) -> Expr {
    Expr::col(name)
}

/// `*`
pub fn star() -> Expr {
    Expr::Star
}

/// Inline literal value.
pub fn lit(value: impl Into<Value>) -> Expr {
    Expr::literal(value)
}

/// Bound parameter.
pub fn bind(value: impl Into<Value>) -> Expr {
    Expr::bind(value)
}

/// Verbatim SQL text.
pub fn raw(sql: &str) -> Expr {
    Expr::Raw(sql.to_string())
}

/// Function call.
pub fn func(name: &str, args: Vec<Expr>) -> Expr {
    Expr::Function {
        name: name.to_string(),
        args,
    }
}

/// `count(expr)`
pub fn count(expr: impl Into<Expr>) -> Expr {
    func("count", vec![expr.into()])
}

/// `count(*)`
pub fn count_all() -> Expr {
    func("count", vec![Expr::Star])
}

/// `distinct(expr)`, used as `count(distinct(x))`.
pub fn distinct(expr: impl Into<Expr>) -> Expr {
    func("distinct", vec![expr.into()])
}

pub fn tuple<I, E>(items: I) -> Expr
where
    I: IntoIterator<Item = E>,
    E: Into<Expr>,
{
    Expr::Tuple(items.into_iter().map(Into::into).collect())
}

/// `tuple()`: the empty sort key.
pub fn empty_tuple() -> Expr {
    raw("tuple()")
}

/// `EXTRACT(field FROM expr)`
pub fn extract(field: &str, expr: impl Into<Expr>) -> Expr {
    Expr::Extract {
        field: field.to_string(),
        expr: Box::new(expr.into()),
    }
}

pub fn cast(expr: impl Into<Expr>, ty: Type) -> Expr {
    expr.into().cast(ty)
}

/// `x -> body`, with `body` built from the placeholder `x`.
pub fn lambda<F>(body: F) -> Expr
where
    F: FnOnce(Expr) -> Expr,
{
    Expr::Lambda(Lambda::new(body))
}
