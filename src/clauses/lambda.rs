use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::DialectResult;
use crate::transpiler::{CompileContext, ToSql};

/// Higher-order function argument: `x -> body`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Lambda {
    pub param: String,
    pub body: Box<Expr>,
}

impl Lambda {
    /// Name of the synthesized parameter.
    pub const PARAM: &'static str = "x";

    /// Build the body by applying `f` to the placeholder column `x`.
    pub fn new<F>(f: F) -> Self
    where
        F: FnOnce(Expr) -> Expr,
    {
        Self {
            param: Self::PARAM.to_string(),
            body: Box::new(f(Expr::col(Self::PARAM))),
        }
    }
}

impl ToSql for Lambda {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        Ok(format!("{} -> {}", self.param, self.body.to_sql(ctx)?))
    }
}
