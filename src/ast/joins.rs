use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use super::expr::Expr;
use crate::error::{DialectError, DialectResult};

/// Join type keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum JoinType {
    #[default]
    Inner,
    LeftOuter,
    RightOuter,
    FullOuter,
}

/// Join matching cardinality (`ANY`, `ALL`, `ASOF`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Strictness {
    Any,
    All,
    Asof,
}

/// Cross-node broadcast modifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Distribution {
    Global,
}

/// Collapses whitespace and uppercases a user supplied modifier.
fn normalize(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_uppercase()
}

impl FromStr for JoinType {
    type Err = DialectError;

    fn from_str(s: &str) -> DialectResult<Self> {
        match normalize(s).as_str() {
            "INNER" => Ok(JoinType::Inner),
            "LEFT" | "LEFT OUTER" => Ok(JoinType::LeftOuter),
            "RIGHT" | "RIGHT OUTER" => Ok(JoinType::RightOuter),
            "FULL" | "FULL OUTER" => Ok(JoinType::FullOuter),
            _ => Err(DialectError::invalid_request(format!(
                "Unknown join type: '{}'",
                s
            ))),
        }
    }
}

impl FromStr for Strictness {
    type Err = DialectError;

    fn from_str(s: &str) -> DialectResult<Self> {
        match normalize(s).as_str() {
            "ANY" => Ok(Strictness::Any),
            "ALL" => Ok(Strictness::All),
            "ASOF" => Ok(Strictness::Asof),
            _ => Err(DialectError::invalid_request(format!(
                "Unknown join strictness: '{}'",
                s
            ))),
        }
    }
}

impl FromStr for Distribution {
    type Err = DialectError;

    fn from_str(s: &str) -> DialectResult<Self> {
        match normalize(s).as_str() {
            "GLOBAL" => Ok(Distribution::Global),
            _ => Err(DialectError::invalid_request(format!(
                "Unknown join distribution: '{}'",
                s
            ))),
        }
    }
}

impl fmt::Display for JoinType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            JoinType::Inner => "INNER",
            JoinType::LeftOuter => "LEFT OUTER",
            JoinType::RightOuter => "RIGHT OUTER",
            JoinType::FullOuter => "FULL OUTER",
        })
    }
}

impl fmt::Display for Strictness {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Strictness::Any => "ANY",
            Strictness::All => "ALL",
            Strictness::Asof => "ASOF",
        })
    }
}

impl fmt::Display for Distribution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("GLOBAL")
    }
}

/// Dialect modifiers attached to a single join edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct JoinSpec {
    pub kind: Option<JoinType>,
    pub strictness: Option<Strictness>,
    pub distribution: Option<Distribution>,
}

impl JoinSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn kind(mut self, kind: JoinType) -> Self {
        self.kind = Some(kind);
        self
    }

    pub fn strictness(mut self, strictness: Strictness) -> Self {
        self.strictness = Some(strictness);
        self
    }

    pub fn global(mut self) -> Self {
        self.distribution = Some(Distribution::Global);
        self
    }

    /// Build from loosely typed, case-insensitive modifier strings.
    pub fn parse(
        kind: Option<&str>,
        strictness: Option<&str>,
        distribution: Option<&str>,
    ) -> DialectResult<Self> {
        Ok(JoinSpec {
            kind: kind.map(str::parse).transpose()?,
            strictness: strictness.map(str::parse).transpose()?,
            distribution: distribution.map(str::parse).transpose()?,
        })
    }
}

/// How the joined rows are matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum JoinConstraint {
    On(Expr),
    Using(Vec<String>),
}

impl JoinConstraint {
    /// A tuple made only of column references becomes `USING (...)`.
    pub fn from_expr(expr: Expr) -> Self {
        if let Expr::Tuple(items) = &expr {
            let names: Option<Vec<String>> = items
                .iter()
                .map(|item| match item {
                    Expr::Column { name, .. } => Some(name.clone()),
                    _ => None,
                })
                .collect();
            if let Some(names) = names.filter(|n| !n.is_empty()) {
                return JoinConstraint::Using(names);
            }
        }
        JoinConstraint::On(expr)
    }
}

/// A join definition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Join {
    pub table: String,
    pub constraint: JoinConstraint,
    #[serde(default)]
    pub spec: JoinSpec,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modifiers_are_case_insensitive() {
        let spec = JoinSpec::parse(Some("Left  Outer"), Some("aLL"), Some("global")).unwrap();
        assert_eq!(spec.kind, Some(JoinType::LeftOuter));
        assert_eq!(spec.strictness, Some(Strictness::All));
        assert_eq!(spec.distribution, Some(Distribution::Global));
    }

    #[test]
    fn test_unknown_modifier_is_rejected() {
        let err = JoinSpec::parse(None, Some("some"), None).unwrap_err();
        assert!(matches!(err, DialectError::InvalidRequest(_)));
    }

    #[test]
    fn test_tuple_of_columns_becomes_using() {
        let on = Expr::Tuple(vec![Expr::qualified("t1", "x"), Expr::qualified("t2", "y")]);
        assert_eq!(
            JoinConstraint::from_expr(on),
            JoinConstraint::Using(vec!["x".to_string(), "y".to_string()])
        );
    }
}
