//! Statement compiler.
//!
//! Turns a [`Statement`] into dialect SQL plus its bound parameters. A
//! compilation is a pure function of the statement, the server
//! [`Capabilities`] and the [`CompileOptions`]; it never fails halfway, so
//! an error means no SQL was produced.

pub mod capabilities;
pub mod context;
pub mod ddl;
pub mod dml;
pub mod escape;
pub mod expr;

#[cfg(test)]
mod tests;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Statement, Value};
use crate::error::DialectResult;

pub use self::capabilities::{ALTER_DELETE_MIN_VERSION, Capabilities, ServerVersion, SharedCapabilities};
pub use self::context::{BindParam, CompileContext, ParamStyle};
pub use self::escape::{quote_identifier, quote_string};

/// Rendering of a node given the current compile context.
pub trait ToSql {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String>;
}

/// Switches that change how values are emitted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CompileOptions {
    /// Inline every bound value as a literal.
    #[serde(default)]
    pub literal_binds: bool,
    #[serde(default)]
    pub param_style: ParamStyle,
}

/// Output of a compilation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompiledStatement {
    pub sql: String,
    /// Bound parameters in placeholder order.
    pub params: Vec<BindParam>,
    /// Coerced INSERT rows, sent apart from the SQL text.
    pub rows: Vec<Vec<Value>>,
}

impl CompiledStatement {
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.iter().find(|p| p.name == name).map(|p| &p.value)
    }
}

/// Compiles statements against a fixed capability set.
#[derive(Debug, Clone)]
pub struct Compiler<'a> {
    capabilities: &'a Capabilities,
    options: CompileOptions,
}

impl<'a> Compiler<'a> {
    pub fn new(capabilities: &'a Capabilities) -> Self {
        Self {
            capabilities,
            options: CompileOptions::default(),
        }
    }

    pub fn options(mut self, options: CompileOptions) -> Self {
        self.options = options;
        self
    }

    pub fn literal_binds(mut self, literal: bool) -> Self {
        self.options.literal_binds = literal;
        self
    }

    pub fn param_style(mut self, style: ParamStyle) -> Self {
        self.options.param_style = style;
        self
    }

    pub fn compile(&self, statement: &Statement) -> DialectResult<CompiledStatement> {
        let mut ctx = CompileContext::new(&self.options);
        let sql = match statement {
            Statement::Select(select) => dml::select::build_select(select, &mut ctx)?,
            Statement::Insert(insert) => dml::insert::build_insert(insert, &mut ctx)?,
            Statement::Delete(delete) => {
                dml::delete::build_delete(delete, self.capabilities, &mut ctx)?
            }
            Statement::CreateTable(create) => ddl::build_create_table(create, &mut ctx)?,
            Statement::DropTable(drop) => ddl::build_drop_table(drop),
        };
        let compiled = ctx.finish(sql);
        tracing::debug!(sql = %compiled.sql, params = compiled.params.len(), "compiled statement");
        Ok(compiled)
    }

    /// Compile a standalone expression; columns render unqualified.
    pub fn compile_expr(&self, expr: &Expr) -> DialectResult<CompiledStatement> {
        let mut ctx = CompileContext::new(&self.options);
        ctx.set_qualify_columns(false);
        let sql = expr::render_labeled(expr, &mut ctx)?;
        Ok(ctx.finish(sql))
    }
}
