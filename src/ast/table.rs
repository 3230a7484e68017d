use serde::{Deserialize, Serialize};

use super::expr::Expr;
use crate::engine::Engine;
use crate::error::DialectResult;
use crate::types::Type;

/// A typed column definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    pub name: String,
    pub ty: Type,
    #[serde(default)]
    pub default: Option<Expr>,
    #[serde(default)]
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, ty: Type) -> Self {
        Self {
            name: name.into(),
            ty,
            default: None,
            comment: None,
        }
    }

    pub fn default_expr(mut self, expr: impl Into<Expr>) -> Self {
        self.default = Some(expr.into());
        self
    }

    pub fn comment(mut self, comment: impl Into<String>) -> Self {
        self.comment = Some(comment.into());
        self
    }

    pub fn is_nullable(&self) -> bool {
        self.ty.is_nullable()
    }

    /// Build a column from a `DESCRIBE TABLE` row.
    ///
    /// An empty default expression means the column has no default.
    pub fn from_describe(name: &str, type_name: &str, default_expression: &str) -> DialectResult<Self> {
        let ty = Type::parse(type_name)?;
        let default = Some(default_expression.trim())
            .filter(|d| !d.is_empty())
            .map(|d| Expr::Raw(d.to_string()));
        Ok(Self {
            name: name.to_string(),
            ty,
            default,
            comment: None,
        })
    }
}

/// A table definition with its storage engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Table {
    pub name: String,
    pub columns: Vec<Column>,
    #[serde(default)]
    pub engine: Option<Engine>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            columns: Vec::new(),
            engine: None,
        }
    }

    /// Append a column of the given type.
    pub fn column(self, name: impl Into<String>, ty: Type) -> Self {
        self.column_def(Column::new(name, ty))
    }

    pub fn column_def(mut self, column: Column) -> Self {
        self.columns.push(column);
        self
    }

    pub fn engine(mut self, engine: Engine) -> Self {
        self.engine = Some(engine);
        self
    }

    pub fn get_column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.get_column(name).is_some()
    }

    /// Column reference bound to this table.
    pub fn c(&self, name: &str) -> Expr {
        Expr::qualified(self.name.clone(), name)
    }

    /// Rebuild a table from reflected columns and its `engine_full` text.
    pub fn reflect(
        name: impl Into<String>,
        columns: Vec<Column>,
        engine_full: Option<&str>,
    ) -> DialectResult<Self> {
        let mut table = Table {
            name: name.into(),
            columns,
            engine: None,
        };
        if let Some(raw) = engine_full.filter(|raw| !raw.trim().is_empty()) {
            let engine = Engine::from_engine_full(raw, &table)?;
            table.engine = Some(engine);
        }
        Ok(table)
    }
}
