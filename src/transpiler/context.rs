//! Per-compilation state: bind parameters, rendering switches and rows.

use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::escape::{quote_identifier, quote_string};
use super::{CompileOptions, CompiledStatement};
use crate::ast::{BinaryOp, Value};
use crate::error::{DialectError, DialectResult};

/// Placeholder syntax for bound parameters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParamStyle {
    /// `%(name)s`; literal `%` is doubled.
    #[default]
    Pyformat,
    /// `:name`
    Named,
    /// `?`
    Qmark,
}

impl ParamStyle {
    pub fn placeholder(self, name: &str) -> String {
        match self {
            ParamStyle::Pyformat => format!("%({})s", name),
            ParamStyle::Named => format!(":{}", name),
            ParamStyle::Qmark => "?".to_string(),
        }
    }
}

impl FromStr for ParamStyle {
    type Err = DialectError;

    fn from_str(s: &str) -> DialectResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "pyformat" => Ok(ParamStyle::Pyformat),
            "named" => Ok(ParamStyle::Named),
            "qmark" => Ok(ParamStyle::Qmark),
            _ => Err(DialectError::Config(format!(
                "Unknown param style '{}'. Expected: pyformat, named, qmark",
                s
            ))),
        }
    }
}

impl fmt::Display for ParamStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ParamStyle::Pyformat => "pyformat",
            ParamStyle::Named => "named",
            ParamStyle::Qmark => "qmark",
        })
    }
}

/// A named bound parameter, in placeholder order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BindParam {
    pub name: String,
    pub value: Value,
}

/// Mutable state of one compilation pass.
///
/// Each call to the compiler owns its context, so compilations never share
/// parameter counters.
#[derive(Debug)]
pub struct CompileContext<'a> {
    options: &'a CompileOptions,
    literal: bool,
    qualify_columns: bool,
    params: Vec<BindParam>,
    counters: HashMap<String, usize>,
    rows: Vec<Vec<Value>>,
}

impl<'a> CompileContext<'a> {
    pub fn new(options: &'a CompileOptions) -> Self {
        Self {
            options,
            literal: options.literal_binds,
            qualify_columns: true,
            params: Vec::new(),
            counters: HashMap::new(),
            rows: Vec::new(),
        }
    }

    /// Whether bound values are currently inlined.
    pub fn literal_binds(&self) -> bool {
        self.literal
    }

    pub(crate) fn set_literal(&mut self, literal: bool) {
        self.literal = literal;
    }

    pub(crate) fn set_qualify_columns(&mut self, qualify: bool) {
        self.qualify_columns = qualify;
    }

    pub(crate) fn set_rows(&mut self, rows: Vec<Vec<Value>>) {
        self.rows = rows;
    }

    fn doubles_percent(&self) -> bool {
        self.options.param_style == ParamStyle::Pyformat
    }

    /// Column reference, table-qualified where the statement allows it.
    pub fn column(&self, table: Option<&str>, name: &str) -> String {
        match table {
            Some(table) if self.qualify_columns => {
                format!("{}.{}", quote_identifier(table), quote_identifier(name))
            }
            _ => quote_identifier(name),
        }
    }

    /// Register a bound value and return its placeholder, or the literal
    /// itself in literal mode. Names are `<key>_<n>`, counted per key.
    pub fn bind(&mut self, key: Option<&str>, value: &Value) -> String {
        if self.literal {
            return self.literal(value);
        }
        let base: String = key
            .unwrap_or("param")
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '_' { c } else { '_' })
            .collect();
        let counter = self.counters.entry(base.clone()).or_insert(0);
        *counter += 1;
        let name = format!("{}_{}", base, counter);
        let placeholder = self.options.param_style.placeholder(&name);
        self.params.push(BindParam {
            name,
            value: value.clone(),
        });
        placeholder
    }

    /// Inline literal.
    pub fn literal(&self, value: &Value) -> String {
        render_literal(value, self.doubles_percent())
    }

    pub fn operator(&self, op: BinaryOp) -> &'static str {
        match op {
            BinaryOp::Modulo if self.doubles_percent() => "%%",
            other => other.symbol(),
        }
    }

    pub(crate) fn finish(self, sql: String) -> CompiledStatement {
        CompiledStatement {
            sql,
            params: self.params,
            rows: self.rows,
        }
    }
}

fn join_literals<'v>(values: impl Iterator<Item = &'v Value>, double_percent: bool) -> String {
    values
        .map(|v| render_literal(v, double_percent))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Render a value as a dialect literal.
pub fn render_literal(value: &Value, double_percent: bool) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Int(n) => n.to_string(),
        Value::UInt(n) => n.to_string(),
        Value::Float(f) if f.is_nan() => "nan".to_string(),
        Value::Float(f) if f.is_infinite() => (if *f > 0.0 { "inf" } else { "-inf" }).to_string(),
        Value::Float(f) => f.to_string(),
        Value::Decimal(d) => d.to_string(),
        Value::String(s) => {
            let quoted = quote_string(s);
            if double_percent {
                quoted.replace('%', "%%")
            } else {
                quoted
            }
        }
        Value::Date(d) => format!("'{}'", d.format("%Y-%m-%d")),
        Value::DateTime(dt) => format!("'{}'", dt.format("%Y-%m-%d %H:%M:%S%.f")),
        Value::Array(items) => format!("[{}]", join_literals(items.iter(), double_percent)),
        Value::Tuple(items) if items.len() == 1 => {
            format!("tuple({})", join_literals(items.iter(), double_percent))
        }
        Value::Tuple(items) => format!("({})", join_literals(items.iter(), double_percent)),
        Value::Map(entries) => format!(
            "map({})",
            join_literals(entries.iter().flat_map(|(k, v)| [k, v]), double_percent)
        ),
    }
}
