//! Abstract statement model: expressions, tables, joins and statements.

pub mod builders;
pub mod expr;
pub mod joins;
pub mod query;
pub mod statement;
pub mod table;
pub mod values;

pub use self::expr::{BinaryOp, Expr, OrderByExpr, SortOrder};
pub use self::joins::{Distribution, Join, JoinConstraint, JoinSpec, JoinType, Strictness};
pub use self::query::Select;
pub use self::statement::{CreateTable, Delete, DropTable, Insert, Statement};
pub use self::table::{Column, Table};
pub use self::values::Value;
