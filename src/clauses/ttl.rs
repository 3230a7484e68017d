use serde::{Deserialize, Serialize};

use crate::ast::Expr;
use crate::error::DialectResult;
use crate::transpiler::escape::quote_string;
use crate::transpiler::{CompileContext, ToSql};

/// Separator between rendered TTL entries.
const TTL_SEPARATOR: &str = ",\n    ";

/// What happens when a TTL expression expires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum TtlAction {
    Delete,
    ToDisk(String),
    ToVolume(String),
}

/// One TTL entry of a table engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ttl {
    pub expr: Expr,
    #[serde(default)]
    pub action: Option<TtlAction>,
}

impl Ttl {
    /// Bare expression; the server's default action is DELETE.
    pub fn new(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            action: None,
        }
    }

    pub fn delete(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            action: Some(TtlAction::Delete),
        }
    }

    pub fn to_disk(expr: impl Into<Expr>, disk: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            action: Some(TtlAction::ToDisk(disk.into())),
        }
    }

    pub fn to_volume(expr: impl Into<Expr>, volume: impl Into<String>) -> Self {
        Self {
            expr: expr.into(),
            action: Some(TtlAction::ToVolume(volume.into())),
        }
    }
}

impl From<Expr> for Ttl {
    fn from(expr: Expr) -> Self {
        Ttl::new(expr)
    }
}

impl ToSql for Ttl {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        let expr = self.expr.to_sql(ctx)?;
        Ok(match &self.action {
            None => expr,
            Some(TtlAction::Delete) => format!("{} DELETE", expr),
            Some(TtlAction::ToDisk(disk)) => format!("{} TO DISK {}", expr, quote_string(disk)),
            Some(TtlAction::ToVolume(volume)) => {
                format!("{} TO VOLUME {}", expr, quote_string(volume))
            }
        })
    }
}

/// Render TTL entries, continuation lines indented.
pub fn render_ttl_list(entries: &[Ttl], ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let rendered = entries
        .iter()
        .map(|entry| entry.to_sql(ctx))
        .collect::<DialectResult<Vec<_>>>()?;
    Ok(rendered.join(TTL_SEPARATOR))
}
