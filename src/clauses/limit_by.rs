use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Value};
use crate::error::{DialectError, DialectResult};
use crate::transpiler::{CompileContext, ToSql};

/// `LIMIT [offset, ] n BY expr, ...`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LimitBy {
    pub by: Vec<Expr>,
    pub limit: u64,
    #[serde(default)]
    pub offset: Option<u64>,
}

impl LimitBy {
    pub fn new<I, E>(by: I, limit: u64, offset: Option<u64>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        Self {
            by: by.into_iter().map(Into::into).collect(),
            limit,
            offset,
        }
    }
}

impl ToSql for LimitBy {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        if self.by.is_empty() {
            return Err(DialectError::compile("LIMIT BY requires at least one expression"));
        }
        // Offset comes first, as in the dialect's own LIMIT clause.
        let head = match self.offset {
            Some(offset) => {
                let offset = ctx.bind(None, &Value::from(offset));
                let limit = ctx.bind(None, &Value::from(self.limit));
                format!("{}, {}", offset, limit)
            }
            None => ctx.bind(None, &Value::from(self.limit)),
        };
        let by = self
            .by
            .iter()
            .map(|e| e.to_sql(ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        Ok(format!("LIMIT {} BY {}", head, by.join(", ")))
    }
}
