use serde::{Deserialize, Serialize};

use super::values::Value;
use crate::clauses::Lambda;
use crate::types::Type;

/// Expression tree consumed by the compiler.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Expr {
    /// Column reference, optionally bound to a table.
    Column { table: Option<String>, name: String },
    /// `*`
    Star,
    /// Value always rendered inline.
    Literal(Value),
    /// Value rendered as a bound parameter (inline in literal mode).
    /// `key` seeds the parameter name.
    Bind { key: Option<String>, value: Value },
    /// `expr AS name` in a select list, `name` elsewhere.
    Label { expr: Box<Expr>, name: String },
    /// Function call: `name(args...)`
    Function { name: String, args: Vec<Expr> },
    Binary {
        left: Box<Expr>,
        op: BinaryOp,
        right: Box<Expr>,
    },
    Not(Box<Expr>),
    IsNull { expr: Box<Expr>, negated: bool },
    InList {
        expr: Box<Expr>,
        list: Vec<Expr>,
        negated: bool,
    },
    /// `IS DISTINCT FROM`, or `IS NOT DISTINCT FROM` when negated.
    DistinctFrom {
        left: Box<Expr>,
        right: Box<Expr>,
        negated: bool,
    },
    Tuple(Vec<Expr>),
    /// `EXTRACT(field FROM expr)`
    Extract { field: String, expr: Box<Expr> },
    Cast { expr: Box<Expr>, ty: Type },
    Lambda(Lambda),
    /// Verbatim SQL text (reflected expressions, `tuple()`).
    Raw(String),
}

/// Binary operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BinaryOp {
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Like,
    NotLike,
    ILike,
    NotILike,
    And,
    Or,
    Plus,
    Minus,
    Multiply,
    Divide,
    Modulo,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Eq => "=",
            BinaryOp::NotEq => "!=",
            BinaryOp::Lt => "<",
            BinaryOp::LtEq => "<=",
            BinaryOp::Gt => ">",
            BinaryOp::GtEq => ">=",
            BinaryOp::Like => "LIKE",
            BinaryOp::NotLike => "NOT LIKE",
            BinaryOp::ILike => "ILIKE",
            BinaryOp::NotILike => "NOT ILIKE",
            BinaryOp::And => "AND",
            BinaryOp::Or => "OR",
            BinaryOp::Plus => "+",
            BinaryOp::Minus => "-",
            BinaryOp::Multiply => "*",
            BinaryOp::Divide => "/",
            BinaryOp::Modulo => "%",
        }
    }

    /// Binding strength; higher binds tighter.
    pub fn precedence(self) -> u8 {
        match self {
            BinaryOp::Or => 1,
            BinaryOp::And => 2,
            BinaryOp::Eq
            | BinaryOp::NotEq
            | BinaryOp::Lt
            | BinaryOp::LtEq
            | BinaryOp::Gt
            | BinaryOp::GtEq
            | BinaryOp::Like
            | BinaryOp::NotLike
            | BinaryOp::ILike
            | BinaryOp::NotILike => 3,
            BinaryOp::Plus | BinaryOp::Minus => 4,
            BinaryOp::Multiply | BinaryOp::Divide | BinaryOp::Modulo => 5,
        }
    }

    pub fn is_comparison(self) -> bool {
        self.precedence() == BinaryOp::Eq.precedence()
    }

    pub fn is_associative(self) -> bool {
        matches!(
            self,
            BinaryOp::And | BinaryOp::Or | BinaryOp::Plus | BinaryOp::Multiply
        )
    }
}

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SortOrder {
    Asc,
    Desc,
}

/// ORDER BY item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderByExpr {
    pub expr: Expr,
    pub direction: Option<SortOrder>,
}

impl From<Expr> for OrderByExpr {
    fn from(expr: Expr) -> Self {
        OrderByExpr {
            expr,
            direction: None,
        }
    }
}

impl From<&str> for OrderByExpr {
    fn from(name: &str) -> Self {
        Expr::from(name).into()
    }
}

impl Expr {
    /// Unqualified column reference.
    pub fn col(name: impl Into<String>) -> Self {
        Expr::Column {
            table: None,
            name: name.into(),
        }
    }

    /// Table-qualified column reference.
    pub fn qualified(table: impl Into<String>, name: impl Into<String>) -> Self {
        Expr::Column {
            table: Some(table.into()),
            name: name.into(),
        }
    }

    /// Name used to key bind parameters compared against this expression.
    pub fn bind_key(&self) -> Option<&str> {
        match self {
            Expr::Column { name, .. } => Some(name),
            Expr::Function { name, .. } => Some(name),
            Expr::Label { name, .. } => Some(name),
            _ => None,
        }
    }

    /// Names an unkeyed bind parameter after `other`.
    fn keyed_by(self, other: &Expr) -> Expr {
        match self {
            Expr::Bind { key: None, value } => Expr::Bind {
                key: other.bind_key().map(str::to_string),
                value,
            },
            other_expr => other_expr,
        }
    }

    fn binary(self, op: BinaryOp, rhs: impl Into<Expr>) -> Expr {
        let right = rhs.into().keyed_by(&self);
        Expr::Binary {
            left: Box::new(self),
            op,
            right: Box::new(right),
        }
    }

    pub fn eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Eq, rhs)
    }

    pub fn not_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::NotEq, rhs)
    }

    pub fn lt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Lt, rhs)
    }

    pub fn lt_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::LtEq, rhs)
    }

    pub fn gt(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Gt, rhs)
    }

    pub fn gt_eq(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::GtEq, rhs)
    }

    /// `LIKE` against a bound pattern.
    pub fn like(self, pattern: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::Like, Expr::bind(pattern))
    }

    pub fn not_like(self, pattern: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::NotLike, Expr::bind(pattern))
    }

    pub fn ilike(self, pattern: impl Into<Value>) -> Expr {
        self.binary(BinaryOp::ILike, Expr::bind(pattern))
    }

    pub fn and(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::And, rhs)
    }

    pub fn or(self, rhs: Expr) -> Expr {
        self.binary(BinaryOp::Or, rhs)
    }

    pub fn plus(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Plus, rhs)
    }

    pub fn minus(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Minus, rhs)
    }

    pub fn multiply(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Multiply, rhs)
    }

    pub fn divide(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Divide, rhs)
    }

    pub fn modulo(self, rhs: impl Into<Expr>) -> Expr {
        self.binary(BinaryOp::Modulo, rhs)
    }

    pub fn in_list<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        let list = values
            .into_iter()
            .map(|v| v.into().keyed_by(&self))
            .collect();
        Expr::InList {
            expr: Box::new(self),
            list,
            negated: false,
        }
    }

    pub fn not_in_list<I, V>(self, values: I) -> Expr
    where
        I: IntoIterator<Item = V>,
        V: Into<Expr>,
    {
        match self.in_list(values) {
            Expr::InList { expr, list, .. } => Expr::InList {
                expr,
                list,
                negated: true,
            },
            other => other,
        }
    }

    pub fn is_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: false,
        }
    }

    pub fn is_not_null(self) -> Expr {
        Expr::IsNull {
            expr: Box::new(self),
            negated: true,
        }
    }

    /// Null-safe inequality.
    pub fn is_distinct_from(self, rhs: impl Into<Expr>) -> Expr {
        let right = rhs.into().keyed_by(&self);
        Expr::DistinctFrom {
            left: Box::new(self),
            right: Box::new(right),
            negated: false,
        }
    }

    /// Null-safe equality.
    pub fn is_not_distinct_from(self, rhs: impl Into<Expr>) -> Expr {
        let right = rhs.into().keyed_by(&self);
        Expr::DistinctFrom {
            left: Box::new(self),
            right: Box::new(right),
            negated: true,
        }
    }

    pub fn label(self, name: impl Into<String>) -> Expr {
        Expr::Label {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    pub fn cast(self, ty: Type) -> Expr {
        Expr::Cast {
            expr: Box::new(self),
            ty,
        }
    }

    pub fn asc(self) -> OrderByExpr {
        OrderByExpr {
            expr: self,
            direction: Some(SortOrder::Asc),
        }
    }

    pub fn desc(self) -> OrderByExpr {
        OrderByExpr {
            expr: self,
            direction: Some(SortOrder::Desc),
        }
    }

    /// Unkeyed bound parameter.
    pub fn bind(value: impl Into<Value>) -> Expr {
        Expr::Bind {
            key: None,
            value: value.into(),
        }
    }

    /// Inline literal.
    pub fn literal(value: impl Into<Value>) -> Expr {
        Expr::Literal(value.into())
    }
}

impl std::ops::Not for Expr {
    type Output = Expr;

    fn not(self) -> Expr {
        Expr::Not(Box::new(self))
    }
}

/// String slices name columns; use [`Expr::bind`] for string values.
impl From<&str> for Expr {
    fn from(name: &str) -> Self {
        Expr::col(name)
    }
}

impl From<Value> for Expr {
    fn from(value: Value) -> Self {
        Expr::Bind { key: None, value }
    }
}

impl From<i32> for Expr {
    fn from(n: i32) -> Self {
        Expr::bind(n)
    }
}

impl From<i64> for Expr {
    fn from(n: i64) -> Self {
        Expr::bind(n)
    }
}

impl From<u64> for Expr {
    fn from(n: u64) -> Self {
        Expr::bind(n)
    }
}

impl From<f64> for Expr {
    fn from(n: f64) -> Self {
        Expr::bind(n)
    }
}

impl From<bool> for Expr {
    fn from(b: bool) -> Self {
        Expr::bind(b)
    }
}

impl From<Lambda> for Expr {
    fn from(lambda: Lambda) -> Self {
        Expr::Lambda(lambda)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bind_takes_column_key() {
        let expr = Expr::qualified("t1", "x").eq(25);
        match expr {
            Expr::Binary { right, .. } => assert_eq!(
                *right,
                Expr::Bind {
                    key: Some("x".to_string()),
                    value: Value::Int(25)
                }
            ),
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_column_rhs_is_untouched() {
        let expr = Expr::qualified("t1", "x").eq(Expr::qualified("t2", "y"));
        assert_eq!(
            expr,
            Expr::Binary {
                left: Box::new(Expr::qualified("t1", "x")),
                op: BinaryOp::Eq,
                right: Box::new(Expr::qualified("t2", "y")),
            }
        );
    }

    #[test]
    fn test_precedence_ordering() {
        assert!(BinaryOp::Multiply.precedence() > BinaryOp::Plus.precedence());
        assert!(BinaryOp::And.precedence() > BinaryOp::Or.precedence());
        assert!(!BinaryOp::Minus.is_associative());
    }
}
