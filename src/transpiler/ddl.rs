//! DDL SQL generation.

use crate::ast::{Column, CreateTable, DropTable};
use crate::error::{DialectError, DialectResult};
use crate::transpiler::escape::{quote_identifier, quote_string};
use crate::transpiler::{CompileContext, ToSql};

fn column_definition(column: &Column, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    column.ty.validate()?;
    let mut def = format!("{} {}", quote_identifier(&column.name), column.ty);
    if let Some(default) = &column.default {
        def.push_str(" DEFAULT ");
        def.push_str(&default.to_sql(ctx)?);
    }
    if let Some(comment) = &column.comment {
        def.push_str(" COMMENT ");
        def.push_str(&quote_string(comment));
    }
    Ok(def)
}

/// Generate CREATE TABLE SQL.
///
/// Defaults and engine keys are inlined and reference bare column names.
pub fn build_create_table(create: &CreateTable, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let table = &create.table;
    let engine = table.engine.as_ref().ok_or_else(|| {
        DialectError::compile(format!("No engine for table '{}'", table.name))
    })?;
    if table.columns.is_empty() {
        return Err(DialectError::compile(format!(
            "Table '{}' has no columns",
            table.name
        )));
    }

    ctx.set_literal(true);
    ctx.set_qualify_columns(false);

    let columns = table
        .columns
        .iter()
        .map(|c| column_definition(c, ctx))
        .collect::<DialectResult<Vec<_>>>()?;

    let mut sql = String::from("CREATE TABLE ");
    if create.if_not_exists {
        sql.push_str("IF NOT EXISTS ");
    }
    sql.push_str(&quote_identifier(&table.name));
    sql.push_str(&format!(" ({}) ", columns.join(", ")));
    sql.push_str(&engine.to_sql(ctx)?);
    Ok(sql)
}

/// Generate DROP TABLE SQL.
pub fn build_drop_table(drop: &DropTable) -> String {
    format!(
        "DROP TABLE {}{}",
        if drop.if_exists { "IF EXISTS " } else { "" },
        quote_identifier(&drop.table)
    )
}
