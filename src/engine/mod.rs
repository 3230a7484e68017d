//! Table engine declarations.
//!
//! An [`Engine`] renders the `ENGINE = ...` suffix of `CREATE TABLE`. Slots
//! always render in the same order no matter how the engine was built:
//!
//! ```text
//! ENGINE = Name(args) PARTITION BY .. ORDER BY .. PRIMARY KEY .. SAMPLE BY .. TTL .. SETTINGS k=v, ..
//! ```

mod reflect;

pub use self::reflect::EngineParams;

use serde::{Deserialize, Serialize};

use crate::ast::{Expr, Value};
use crate::clauses::{Ttl, render_ttl_list};
use crate::error::DialectResult;
use crate::transpiler::escape::quote_identifier;
use crate::transpiler::{CompileContext, CompileOptions, ParamStyle, ToSql};

/// Key expressions of an engine slot such as `ORDER BY`.
///
/// One expression renders bare, several render as a parenthesized list.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct KeyExprs(pub Vec<Expr>);

impl KeyExprs {
    pub fn expressions(&self) -> &[Expr] {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Names of the plain column references, skipping other expressions.
    pub fn columns(&self) -> Vec<&str> {
        self.0
            .iter()
            .filter_map(|e| match e {
                Expr::Column { name, .. } => Some(name.as_str()),
                _ => None,
            })
            .collect()
    }
}

impl From<&str> for KeyExprs {
    fn from(name: &str) -> Self {
        KeyExprs(vec![Expr::col(name)])
    }
}

impl From<Expr> for KeyExprs {
    fn from(expr: Expr) -> Self {
        KeyExprs(vec![expr])
    }
}

impl<E: Into<Expr>> From<Vec<E>> for KeyExprs {
    fn from(items: Vec<E>) -> Self {
        KeyExprs(items.into_iter().map(Into::into).collect())
    }
}

impl<E: Into<Expr>, const N: usize> From<[E; N]> for KeyExprs {
    fn from(items: [E; N]) -> Self {
        KeyExprs(items.into_iter().map(Into::into).collect())
    }
}

impl ToSql for KeyExprs {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        let items = self
            .0
            .iter()
            .map(|e| e.to_sql(ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        Ok(if items.len() == 1 {
            items.join("")
        } else {
            format!("({})", items.join(", "))
        })
    }
}

/// A storage engine declaration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Engine {
    pub name: String,
    #[serde(default)]
    pub args: Vec<Expr>,
    #[serde(default)]
    pub partition_by: Option<KeyExprs>,
    #[serde(default)]
    pub order_by: Option<KeyExprs>,
    #[serde(default)]
    pub primary_key: Option<KeyExprs>,
    #[serde(default)]
    pub sample_by: Option<KeyExprs>,
    #[serde(default)]
    pub ttl: Vec<Ttl>,
    #[serde(default)]
    pub settings: Vec<(String, Value)>,
}

impl Engine {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            args: Vec::new(),
            partition_by: None,
            order_by: None,
            primary_key: None,
            sample_by: None,
            ttl: Vec::new(),
            settings: Vec::new(),
        }
    }

    pub fn cnch_merge_tree() -> Self {
        Self::new("CnchMergeTree")
    }

    pub fn merge_tree() -> Self {
        Self::new("MergeTree")
    }

    /// Constructor argument, e.g. the version column of a replacing engine.
    pub fn arg(mut self, arg: impl Into<Expr>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn partition_by(mut self, keys: impl Into<KeyExprs>) -> Self {
        self.partition_by = Some(keys.into());
        self
    }

    pub fn order_by(mut self, keys: impl Into<KeyExprs>) -> Self {
        self.order_by = Some(keys.into());
        self
    }

    pub fn primary_key(mut self, keys: impl Into<KeyExprs>) -> Self {
        self.primary_key = Some(keys.into());
        self
    }

    pub fn sample_by(mut self, keys: impl Into<KeyExprs>) -> Self {
        self.sample_by = Some(keys.into());
        self
    }

    pub fn ttl(mut self, entry: impl Into<Ttl>) -> Self {
        self.ttl.push(entry.into());
        self
    }

    pub fn setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.push((name.into(), value.into()));
        self
    }

    /// Whether the PRIMARY KEY columns are a leading prefix of ORDER BY.
    ///
    /// Not checked during compilation; callers that want the rule enforced
    /// call this before building DDL.
    pub fn primary_key_is_order_prefix(&self) -> bool {
        match (&self.primary_key, &self.order_by) {
            (None, _) => true,
            (Some(_), None) => false,
            (Some(pk), Some(order)) => {
                let pk = pk.expressions();
                let order = order.expressions();
                pk.len() <= order.len() && pk.iter().zip(order).all(|(a, b)| same_key(a, b))
            }
        }
    }

    /// Render the `ENGINE = ...` suffix with every value inlined.
    ///
    /// The text is meant for direct use, so `%` is never doubled.
    pub fn to_ddl_suffix(&self) -> DialectResult<String> {
        let options = CompileOptions {
            literal_binds: true,
            param_style: ParamStyle::Named,
        };
        let mut ctx = CompileContext::new(&options);
        ctx.set_qualify_columns(false);
        self.to_sql(&mut ctx)
    }

    /// Rebuild an engine from `system.tables.engine_full`, resolving key
    /// columns against `table`.
    pub fn from_engine_full(engine_full: &str, table: &crate::ast::Table) -> DialectResult<Self> {
        let params = EngineParams::parse(engine_full)?;
        Engine::reflect(&params, table)
    }
}

/// Key equality ignoring the table a column is bound to.
fn same_key(a: &Expr, b: &Expr) -> bool {
    match (a, b) {
        (Expr::Column { name: x, .. }, Expr::Column { name: y, .. }) => x == y,
        _ => a == b,
    }
}

impl ToSql for Engine {
    fn to_sql(&self, ctx: &mut CompileContext<'_>) -> DialectResult<String> {
        let args = self
            .args
            .iter()
            .map(|a| a.to_sql(ctx))
            .collect::<DialectResult<Vec<_>>>()?;
        let mut sql = format!("ENGINE = {}({})", quote_identifier(&self.name), args.join(", "));

        let slots = [
            ("PARTITION BY", &self.partition_by),
            ("ORDER BY", &self.order_by),
            ("PRIMARY KEY", &self.primary_key),
            ("SAMPLE BY", &self.sample_by),
        ];
        for (keyword, slot) in slots {
            if let Some(keys) = slot.as_ref().filter(|k| !k.is_empty()) {
                sql.push(' ');
                sql.push_str(keyword);
                sql.push(' ');
                sql.push_str(&keys.to_sql(ctx)?);
            }
        }

        if !self.ttl.is_empty() {
            sql.push_str(" TTL ");
            sql.push_str(&render_ttl_list(&self.ttl, ctx)?);
        }

        if !self.settings.is_empty() {
            let settings: Vec<String> = self
                .settings
                .iter()
                .map(|(name, value)| format!("{}={}", name, ctx.literal(value)))
                .collect();
            sql.push_str(" SETTINGS ");
            sql.push_str(&settings.join(", "));
        }

        Ok(sql)
    }
}
