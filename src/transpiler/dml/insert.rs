//! INSERT SQL generation.
//!
//! Rows travel apart from the statement text, the way the native protocol
//! sends data blocks. In literal mode they are inlined as a VALUES list.

use crate::ast::{Column, Insert, Value};
use crate::error::{DialectError, DialectResult};
use crate::transpiler::CompileContext;
use crate::transpiler::escape::quote_identifier;

fn target_columns(insert: &Insert) -> DialectResult<Vec<&Column>> {
    if insert.columns.is_empty() {
        return Ok(insert.table.columns.iter().collect());
    }
    insert
        .columns
        .iter()
        .map(|name| {
            insert.table.get_column(name).ok_or_else(|| {
                DialectError::compile(format!(
                    "Unknown column '{}' in table '{}'",
                    name, insert.table.name
                ))
            })
        })
        .collect()
}

fn coerce_row(columns: &[&Column], row: &[Value], index: usize) -> DialectResult<Vec<Value>> {
    if row.len() != columns.len() {
        return Err(DialectError::invalid_value(format!(
            "row {} has {} values, expected {}",
            index,
            row.len(),
            columns.len()
        )));
    }
    columns
        .iter()
        .zip(row)
        .map(|(column, value)| {
            column.ty.coerce(value.clone()).map_err(|e| {
                DialectError::invalid_value(format!("column '{}': {}", column.name, e))
            })
        })
        .collect()
}

/// Generate INSERT SQL.
pub fn build_insert(insert: &Insert, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
    let columns = target_columns(insert)?;
    if columns.is_empty() {
        return Err(DialectError::compile(format!(
            "No columns to insert into table '{}'",
            insert.table.name
        )));
    }

    let rows = insert
        .rows
        .iter()
        .enumerate()
        .map(|(i, row)| coerce_row(&columns, row, i))
        .collect::<DialectResult<Vec<_>>>()?;

    let names: Vec<String> = columns.iter().map(|c| quote_identifier(&c.name)).collect();
    let mut sql = format!(
        "INSERT INTO {} ({}) VALUES",
        quote_identifier(&insert.table.name),
        names.join(", ")
    );

    if ctx.literal_binds() {
        let values: Vec<String> = rows
            .iter()
            .map(|row| {
                let items: Vec<String> = row.iter().map(|v| ctx.literal(v)).collect();
                format!("({})", items.join(", "))
            })
            .collect();
        if !values.is_empty() {
            sql.push(' ');
            sql.push_str(&values.join(", "));
        }
    } else {
        ctx.set_rows(rows);
    }

    Ok(sql)
}
