//! DELETE SQL generation.
//!
//! The dialect deletes through a mutation: `ALTER TABLE t DELETE WHERE ...`.

use crate::ast::Delete;
use crate::error::{DialectError, DialectResult};
use crate::transpiler::escape::quote_identifier;
use crate::transpiler::{Capabilities, CompileContext, ToSql};

/// Generate DELETE SQL.
pub fn build_delete(
    delete: &Delete,
    capabilities: &Capabilities,
    ctx: &mut CompileContext<'_>,
) -> DialectResult<String> {
    if !capabilities.supports_delete {
        return Err(DialectError::compile(
            "ALTER DELETE is not supported by this server version",
        ));
    }
    let filter = delete
        .filter
        .as_ref()
        .ok_or_else(|| DialectError::compile("WHERE clause is required"))?;

    // Mutations address columns of the altered table only.
    ctx.set_qualify_columns(false);
    Ok(format!(
        "ALTER TABLE {} DELETE WHERE {}",
        quote_identifier(&delete.table),
        filter.to_sql(ctx)?
    ))
}
