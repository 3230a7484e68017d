use serde::{Deserialize, Serialize};

use crate::ast::Value;
use crate::error::DialectResult;
use crate::transpiler::{CompileContext, ToSql};

/// `SAMPLE k [OFFSET m]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sample {
    pub fraction: Value,
    #[serde(default)]
    pub offset: Option<Value>,
}

impl Sample {
    pub fn new(fraction: impl Into<Value>) -> Self {
        Self {
            fraction: fraction.into(),
            offset: None,
        }
    }

    pub fn offset(mut self, offset: impl Into<Value>) -> Self {
        self.offset = Some(offset.into());
        self
    }
}

impl ToSql for Sample {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        let mut sql = format!("SAMPLE {}", ctx.bind(None, &self.fraction));
        if let Some(offset) = &self.offset {
            sql.push_str(" OFFSET ");
            sql.push_str(&ctx.bind(None, offset));
        }
        Ok(sql)
    }
}
