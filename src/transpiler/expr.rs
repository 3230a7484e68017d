//! Expression rendering.

use super::escape::quote_identifier;
use super::{CompileContext, ToSql};
use crate::ast::{BinaryOp, Expr};
use crate::error::DialectResult;

/// Native function for an `EXTRACT` field, if the dialect has one.
fn extract_function(field: &str) -> Option<&'static str> {
    match field.to_ascii_lowercase().as_str() {
        "year" => Some("toYear"),
        "month" => Some("toMonth"),
        "day" => Some("toDayOfMonth"),
        _ => None,
    }
}

fn render_list(items: &[Expr], ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let rendered = items
        .iter()
        .map(|e| e.to_sql(ctx))
        .collect::<DialectResult<Vec<_>>>()?;
    Ok(rendered.join(", "))
}

/// Binding strength of an operand rendered with a bare top-level operator.
fn operand_precedence(operand: &Expr) -> Option<u8> {
    match operand {
        Expr::Binary { op, .. } => Some(op.precedence()),
        // NOT binds looser than comparisons and tighter than AND.
        Expr::Not(_) => Some(BinaryOp::And.precedence()),
        Expr::DistinctFrom { negated: false, .. } => Some(BinaryOp::Eq.precedence()),
        _ => None,
    }
}

/// Render an operand, parenthesized when it binds looser than `parent`.
/// Comparisons never chain.
fn render_operand(
    operand: &Expr,
    parent: BinaryOp,
    right_side: bool,
    ctx: &mut CompileContext<'_>,
) -> DialectResult<String> {
    let sql = operand.to_sql(ctx)?;
    let wrap = match operand_precedence(operand) {
        Some(precedence) if precedence == parent.precedence() => {
            parent.is_comparison() || (right_side && !parent.is_associative())
        }
        Some(precedence) => precedence < parent.precedence(),
        None => false,
    };
    Ok(if wrap { format!("({})", sql) } else { sql })
}

/// Select-list form: a label renders as `expr AS name`.
pub fn render_labeled(expr: &Expr, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    match expr {
        Expr::Label { expr, name } => Ok(format!(
            "{} AS {}",
            expr.to_sql(ctx)?,
            quote_identifier(name)
        )),
        other => other.to_sql(ctx),
    }
}

impl ToSql for Expr {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        Ok(match self {
            Expr::Column { table, name } => ctx.column(table.as_deref(), name),
            Expr::Star => "*".to_string(),
            Expr::Literal(value) => ctx.literal(value),
            Expr::Bind { key, value } => ctx.bind(key.as_deref(), value),
            // Outside a select list a label is referenced by name.
            Expr::Label { name, .. } => quote_identifier(name),
            Expr::Function { name, args } => format!("{}({})", name, render_list(args, ctx)?),
            Expr::Binary { left, op, right } => {
                let left = render_operand(left, *op, false, ctx)?;
                let right = render_operand(right, *op, true, ctx)?;
                format!("{} {} {}", left, ctx.operator(*op), right)
            }
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Binary { .. } => format!("NOT ({})", inner.to_sql(ctx)?),
                _ => format!("NOT {}", inner.to_sql(ctx)?),
            },
            Expr::IsNull { expr, negated } => format!(
                "{} IS {}NULL",
                expr.to_sql(ctx)?,
                if *negated { "NOT " } else { "" }
            ),
            // The dialect has no empty IN list.
            Expr::InList { list, negated, .. } if list.is_empty() => {
                (if *negated { "1" } else { "0" }).to_string()
            }
            Expr::InList {
                expr,
                list,
                negated,
            } => format!(
                "{} {}IN ({})",
                expr.to_sql(ctx)?,
                if *negated { "NOT " } else { "" },
                render_list(list, ctx)?
            ),
            // Null-safe comparison through array membership.
            Expr::DistinctFrom {
                left,
                right,
                negated,
            } => {
                let left = left.to_sql(ctx)?;
                let right = right.to_sql(ctx)?;
                if *negated {
                    format!("hasAny([{}], [{}])", left, right)
                } else {
                    format!("hasAny([{}], [{}]) = 0", left, right)
                }
            }
            Expr::Tuple(items) if items.len() == 1 => format!("tuple({})", render_list(items, ctx)?),
            Expr::Tuple(items) => format!("({})", render_list(items, ctx)?),
            Expr::Extract { field, expr } => {
                let inner = expr.to_sql(ctx)?;
                match extract_function(field) {
                    Some(function) => format!("{}({})", function, inner),
                    None => inner,
                }
            }
            Expr::Cast { expr, ty } => {
                ty.validate()?;
                format!("CAST({} AS {})", expr.to_sql(ctx)?, ty)
            }
            Expr::Lambda(lambda) => lambda.to_sql(ctx)?,
            Expr::Raw(sql) => sql.clone(),
        })
    }
}
