use serde::{Deserialize, Serialize};

use super::expr::{Expr, OrderByExpr};
use super::joins::{Join, JoinConstraint, JoinSpec, JoinType};
use super::values::Value;
use crate::clauses::{ArrayJoin, LimitBy, Sample};
use crate::error::{DialectError, DialectResult};

pub(crate) const WITH_TOTALS_REQUIRES_GROUP_BY: &str =
    "Select::with_totals() can be used only with specified GROUP BY, call group_by()";

/// An immutable SELECT builder.
///
/// Every builder method consumes the value and returns the decorated copy,
/// so a `clone()` forks a query without sharing state.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Select {
    pub columns: Vec<Expr>,
    pub distinct: bool,
    pub from: Option<String>,
    pub is_final: bool,
    pub sample: Option<Sample>,
    pub array_join: Option<ArrayJoin>,
    pub joins: Vec<Join>,
    pub filter: Option<Expr>,
    pub group_by: Vec<Expr>,
    pub with_totals: bool,
    pub having: Option<Expr>,
    pub order_by: Vec<OrderByExpr>,
    pub limit_by: Option<LimitBy>,
    pub limit: Option<u64>,
    pub offset: Option<u64>,
    pub settings: Vec<(String, Value)>,
}

impl Select {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn column(mut self, expr: impl Into<Expr>) -> Self {
        self.columns.push(expr.into());
        self
    }

    pub fn columns<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.columns.extend(exprs.into_iter().map(Into::into));
        self
    }

    pub fn from(mut self, table: impl Into<String>) -> Self {
        self.from = Some(table.into());
        self
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    /// Add a WHERE predicate, AND-ed with any existing one.
    pub fn filter(mut self, predicate: Expr) -> Self {
        self.filter = Some(match self.filter.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn group_by<I, E>(mut self, exprs: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.group_by.extend(exprs.into_iter().map(Into::into));
        self
    }

    /// `GROUP BY ... WITH TOTALS`. Requires a GROUP BY list.
    pub fn with_totals(mut self) -> DialectResult<Self> {
        if self.group_by.is_empty() {
            return Err(DialectError::invalid_request(WITH_TOTALS_REQUIRES_GROUP_BY));
        }
        self.with_totals = true;
        Ok(self)
    }

    pub fn having(mut self, predicate: Expr) -> Self {
        self.having = Some(match self.having.take() {
            Some(existing) => existing.and(predicate),
            None => predicate,
        });
        self
    }

    pub fn order_by(mut self, item: impl Into<OrderByExpr>) -> Self {
        self.order_by.push(item.into());
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    /// `FROM t FINAL`
    pub fn with_final(mut self) -> Self {
        self.is_final = true;
        self
    }

    pub fn sample(mut self, fraction: impl Into<Value>) -> Self {
        self.sample = Some(Sample::new(fraction));
        self
    }

    pub fn sample_with_offset(mut self, fraction: impl Into<Value>, offset: impl Into<Value>) -> Self {
        self.sample = Some(Sample::new(fraction).offset(offset));
        self
    }

    pub fn array_join<I, E>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.array_join = Some(ArrayJoin::new(columns));
        self
    }

    pub fn left_array_join<I, E>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.array_join = Some(ArrayJoin::left(columns));
        self
    }

    pub fn limit_by<I, E>(mut self, by: I, limit: u64, offset: Option<u64>) -> Self
    where
        I: IntoIterator<Item = E>,
        E: Into<Expr>,
    {
        self.limit_by = Some(LimitBy::new(by, limit, offset));
        self
    }

    pub fn setting(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.settings.push((name.into(), value.into()));
        self
    }

    /// Join `table`. A tuple of columns as `on` renders `USING (...)`.
    pub fn join(mut self, table: impl Into<String>, on: Expr, spec: JoinSpec) -> Self {
        self.joins.push(Join {
            table: table.into(),
            constraint: JoinConstraint::from_expr(on),
            spec,
        });
        self
    }

    /// Like [`Select::join`], defaulting the join type to `LEFT OUTER`.
    pub fn outer_join(self, table: impl Into<String>, on: Expr, mut spec: JoinSpec) -> Self {
        spec.kind.get_or_insert(JoinType::LeftOuter);
        self.join(table, on, spec)
    }
}
