use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::{DialectError, DialectResult};
use crate::transpiler::expr::render_labeled;
use crate::transpiler::{CompileContext, ToSql};

/// `[LEFT] ARRAY JOIN col [AS label], ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ArrayJoin {
    pub columns: Vec<Expr>,
    #[serde(default)]
    pub left: bool,
}

impl ArrayJoin {
    pub fn new<I, E>(columns: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            left: false,
        }
    }

    /// `LEFT ARRAY JOIN`: keeps rows whose arrays are empty.
    pub fn left<I, E>(columns: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self {
            left: true,
            ..Self::new(columns)
        }
    }
}

impl ToSql for ArrayJoin {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        if self.columns.is_empty() {
            return Err(DialectError::compile("ARRAY JOIN requires at least one column"));
        }
        let columns = self
            .columns
            .iter()
            .map(|c| render_labeled(c, ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        let keyword = if self.left { "LEFT ARRAY JOIN" } else { "ARRAY JOIN" };
        Ok(format!("{} {}", keyword, columns.join(", ")))
    }
}
