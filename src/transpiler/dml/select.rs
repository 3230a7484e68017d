//! SELECT SQL generation.

use crate::ast::query::WITH_TOTALS_REQUIRES_GROUP_BY;
use crate::ast::{Expr, Join, JoinConstraint, OrderByExpr, Select, SortOrder, Value};
use crate::error::{DialectError, DialectResult};
use crate::transpiler::escape::quote_identifier;
use crate::transpiler::expr::render_labeled;
use crate::transpiler::{CompileContext, ToSql};

fn render_exprs(exprs: &[Expr], ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let items = exprs
        .iter()
        .map(|e| e.to_sql(ctx))
        .collect::<DialectResult<Vec<_>>>()?;
    Ok(items.join(", "))
}

fn render_join(join: &Join, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let mut sql = String::new();
    if let Some(distribution) = join.spec.distribution {
        sql.push_str(&format!("{} ", distribution));
    }
    if let Some(strictness) = join.spec.strictness {
        sql.push_str(&format!("{} ", strictness));
    }
    sql.push_str(&format!(
        "{} JOIN {}",
        join.spec.kind.unwrap_or_default(),
        quote_identifier(&join.table)
    ));
    match &join.constraint {
        JoinConstraint::On(predicate) => {
            sql.push_str(" ON ");
            sql.push_str(&predicate.to_sql(ctx)?);
        }
        JoinConstraint::Using(columns) => {
            let columns: Vec<String> = columns.iter().map(|c| quote_identifier(c)).collect();
            sql.push_str(&format!(" USING ({})", columns.join(", ")));
        }
    }
    Ok(sql)
}

fn render_order_item(item: &OrderByExpr, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let expr = item.expr.to_sql(ctx)?;
    Ok(match item.direction {
        Some(SortOrder::Asc) => format!("{} ASC", expr),
        Some(SortOrder::Desc) => format!("{} DESC", expr),
        None => expr,
    })
}

/// Generate SELECT SQL.
pub fn build_select(select: &Select, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    if select.with_totals && select.group_by.is_empty() {
        return Err(DialectError::invalid_request(WITH_TOTALS_REQUIRES_GROUP_BY));
    }
    if select.offset.is_some() && select.limit.is_none() {
        return Err(DialectError::compile("OFFSET without LIMIT is not supported"));
    }

    let mut sql = if select.distinct {
        String::from("SELECT DISTINCT ")
    } else {
        String::from("SELECT ")
    };

    // Columns
    if select.columns.is_empty() {
        sql.push('*');
    } else {
        let columns = select
            .columns
            .iter()
            .map(|c| render_labeled(c, ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        sql.push_str(&columns.join(", "));
    }

    // FROM and its modifiers
    match &select.from {
        Some(table) => {
            sql.push_str(" FROM ");
            sql.push_str(&quote_identifier(table));
            if select.is_final {
                sql.push_str(" FINAL");
            }
            if let Some(sample) = &select.sample {
                sql.push(' ');
                sql.push_str(&sample.to_sql(ctx)?);
            }
        }
        None if select.is_final => {
            return Err(DialectError::compile("FINAL requires a FROM clause"));
        }
        None if select.sample.is_some() => {
            return Err(DialectError::compile("SAMPLE requires a FROM clause"));
        }
        None => {}
    }

    if let Some(array_join) = &select.array_join {
        sql.push(' ');
        sql.push_str(&array_join.to_sql(ctx)?);
    }

    for join in &select.joins {
        sql.push(' ');
        sql.push_str(&render_join(join, ctx)?);
    }

    if let Some(filter) = &select.filter {
        sql.push_str(" WHERE ");
        sql.push_str(&filter.to_sql(ctx)?);
    }

    if !select.group_by.is_empty() {
        sql.push_str(" GROUP BY ");
        sql.push_str(&render_exprs(&select.group_by, ctx)?);
        if select.with_totals {
            sql.push_str(" WITH TOTALS");
        }
    }

    if let Some(having) = &select.having {
        sql.push_str(" HAVING ");
        sql.push_str(&having.to_sql(ctx)?);
    }

    if !select.order_by.is_empty() {
        let items = select
            .order_by
            .iter()
            .map(|item| render_order_item(item, ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        sql.push_str(" ORDER BY ");
        sql.push_str(&items.join(", "));
    }

    if let Some(limit_by) = &select.limit_by {
        sql.push(' ');
        sql.push_str(&limit_by.to_sql(ctx)?);
    }

    // LIMIT [offset, ]count
    if let Some(limit) = select.limit {
        sql.push_str(" LIMIT ");
        if let Some(offset) = select.offset {
            sql.push_str(&ctx.bind(None, &Value::from(offset)));
            sql.push_str(", ");
        }
        sql.push_str(&ctx.bind(None, &Value::from(limit)));
    }

    if !select.settings.is_empty() {
        let settings: Vec<String> = select
            .settings
            .iter()
            .map(|(name, value)| format!("{}={}", name, ctx.literal(value)))
            .collect();
        sql.push_str(" SETTINGS ");
        sql.push_str(&settings.join(", "));
    }

    Ok(sql)
}
