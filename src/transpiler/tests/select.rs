//! SELECT tests.

use pretty_assertions::assert_eq;

use super::{compile, compile_literal};
use crate::ast::builders::tuple;
use crate::ast::*;
use crate::error::DialectError;
use crate::transpiler::{Capabilities, Compiler};
use crate::types::Type;

fn t1() -> Table {
    Table::new("t1")
        .column("x", Type::Int32)
        .column("y", Type::String)
        .column("nested.array_column", Type::array(Type::Int32))
}

fn t2() -> Table {
    Table::new("t2").column("x", Type::Int32).column("y", Type::String)
}

fn compile_err(select: Select) -> DialectError {
    let caps = Capabilities::default();
    Compiler::new(&caps).compile(&select.into()).unwrap_err()
}

#[test]
fn test_star_when_no_columns() {
    assert_eq!(compile(Select::new().from("t1")).sql, "SELECT * FROM t1");
}

#[test]
fn test_distinct() {
    let t1 = t1();
    let q = Select::new().column(t1.c("x")).from("t1").distinct();
    assert_eq!(compile(q).sql, "SELECT DISTINCT t1.x FROM t1");
}

#[test]
fn test_group_by_with_totals() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .group_by([t1.c("x")])
        .with_totals()
        .unwrap();
    assert_eq!(compile(q).sql, "SELECT t1.x FROM t1 GROUP BY t1.x WITH TOTALS");
}

#[test]
fn test_with_totals_set_directly_is_rejected() {
    let mut q = Select::new().column("x").from("t1");
    q.with_totals = true;
    let err = compile_err(q);
    assert!(matches!(err, DialectError::InvalidRequest(_)));
    assert!(err.to_string().contains("call group_by()"));
}

#[test]
fn test_where_binds_are_keyed_by_column() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .filter(t1.c("x").eq(25))
        .filter(t1.c("y").eq(Value::from("a")));
    let compiled = compile(q);
    assert_eq!(
        compiled.sql,
        "SELECT t1.x FROM t1 WHERE t1.x = %(x_1)s AND t1.y = %(y_1)s"
    );
    assert_eq!(compiled.param("x_1"), Some(&Value::Int(25)));
    assert_eq!(compiled.param("y_1"), Some(&Value::String("a".into())));
}

#[test]
fn test_any_inner_join() {
    let (t1, t2) = (t1(), t2());
    let q = Select::new()
        .columns([t1.c("x"), t2.c("y")])
        .from("t1")
        .join(
            "t2",
            t1.c("x").eq(t2.c("y")),
            JoinSpec::new().kind(JoinType::Inner).strictness(Strictness::Any),
        );
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x, t2.y FROM t1 ANY INNER JOIN t2 ON t1.x = t2.y"
    );
}

#[test]
fn test_join_defaults_to_inner() {
    let (t1, t2) = (t1(), t2());
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .join("t2", t1.c("x").eq(t2.c("x")), JoinSpec::new());
    assert_eq!(compile(q).sql, "SELECT t1.x FROM t1 INNER JOIN t2 ON t1.x = t2.x");
}

#[test]
fn test_global_all_left_outer_join_using() {
    let t1 = t1();
    let q = Select::new().column(t1.c("x")).from("t1").outer_join(
        "t2",
        tuple([t1.c("x"), t1.c("y")]),
        JoinSpec::parse(None, Some("all"), Some("global")).unwrap(),
    );
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x FROM t1 GLOBAL ALL LEFT OUTER JOIN t2 USING (x, y)"
    );
}

#[test]
fn test_full_outer_asof_join() {
    let (t1, t2) = (t1(), t2());
    let q = Select::new().column(t1.c("x")).from("t1").join(
        "t2",
        t1.c("x").eq(t2.c("x")),
        JoinSpec::parse(Some("full"), Some("asof"), None).unwrap(),
    );
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x FROM t1 ASOF FULL OUTER JOIN t2 ON t1.x = t2.x"
    );
}

#[test]
fn test_array_join() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .column(Expr::col("from_array"))
        .from("t1")
        .array_join([t1.c("nested.array_column").label("from_array")]);
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x, from_array FROM t1 ARRAY JOIN t1.\"nested.array_column\" AS from_array"
    );
}

#[test]
fn test_left_array_join_multiple_columns() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .left_array_join([
            t1.c("nested.array_column").label("from_array"),
            t1.c("nested.array_column").label("again"),
        ]);
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x FROM t1 LEFT ARRAY JOIN t1.\"nested.array_column\" AS from_array, \
         t1.\"nested.array_column\" AS again"
    );
}

#[test]
fn test_sample() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .sample(0.1)
        .group_by([t1.c("x")]);
    let compiled = compile(q.clone());
    assert_eq!(compiled.sql, "SELECT t1.x FROM t1 SAMPLE %(param_1)s GROUP BY t1.x");
    assert_eq!(compiled.param("param_1"), Some(&Value::Float(0.1)));
    assert_eq!(compile_literal(q), "SELECT t1.x FROM t1 SAMPLE 0.1 GROUP BY t1.x");
}

#[test]
fn test_sample_with_offset() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .sample_with_offset(0.5, 0.25);
    assert_eq!(
        compile(q).sql,
        "SELECT t1.x FROM t1 SAMPLE %(param_1)s OFFSET %(param_2)s"
    );
}

#[test]
fn test_final() {
    let t1 = t1();
    let q = Select::new().column(t1.c("x")).from("t1").with_final();
    assert_eq!(compile(q).sql, "SELECT t1.x FROM t1 FINAL");
}

#[test]
fn test_final_and_sample_need_from() {
    let err = compile_err(Select::new().column("x").with_final());
    assert!(matches!(err, DialectError::Compile(_)));
    let err = compile_err(Select::new().column("x").sample(0.1));
    assert!(matches!(err, DialectError::Compile(_)));
}

#[test]
fn test_limit_by() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .limit_by([t1.c("x")], 1, None);
    assert_eq!(compile_literal(q), "SELECT t1.x FROM t1 LIMIT 1 BY t1.x");

    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .limit_by([t1.c("x")], 2, Some(1));
    assert_eq!(compile_literal(q), "SELECT t1.x FROM t1 LIMIT 1, 2 BY t1.x");
}

#[test]
fn test_limit_offset() {
    let t1 = t1();
    let q = Select::new().column(t1.c("x")).from("t1").limit(10).offset(5);
    assert_eq!(compile_literal(q.clone()), "SELECT t1.x FROM t1 LIMIT 5, 10");

    let compiled = compile(q);
    assert_eq!(compiled.sql, "SELECT t1.x FROM t1 LIMIT %(param_1)s, %(param_2)s");
    assert_eq!(compiled.param("param_1"), Some(&Value::Int(5)));
    assert_eq!(compiled.param("param_2"), Some(&Value::Int(10)));
}

#[test]
fn test_offset_without_limit() {
    let err = compile_err(Select::new().column("x").from("t1").offset(5));
    assert_eq!(err.to_string(), "OFFSET without LIMIT is not supported");
}

#[test]
fn test_order_by_directions() {
    let t1 = t1();
    let q = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .order_by(t1.c("x").desc())
        .order_by(t1.c("y"));
    assert_eq!(compile(q).sql, "SELECT t1.x FROM t1 ORDER BY t1.x DESC, t1.y");
}

#[test]
fn test_settings() {
    let q = Select::new()
        .column("x")
        .from("t1")
        .setting("max_threads", 4)
        .setting("join_use_nulls", true);
    assert_eq!(
        compile(q).sql,
        "SELECT x FROM t1 SETTINGS max_threads=4, join_use_nulls=true"
    );
}

#[test]
fn test_full_clause_order() {
    let (t1, t2) = (t1(), t2());
    let q = Select::new()
        .setting("max_threads", 2)
        .limit(10)
        .limit_by([t1.c("y")], 3, None)
        .order_by(t1.c("x").asc())
        .having(Expr::col("x").gt(1))
        .group_by([t1.c("x"), t1.c("y")])
        .filter(t1.c("y").not_eq(Value::from("z")))
        .join("t2", t1.c("x").eq(t2.c("x")), JoinSpec::new().strictness(Strictness::Any))
        .array_join([t1.c("nested.array_column").label("a")])
        .sample(0.1)
        .with_final()
        .from("t1")
        .columns([t1.c("x"), t1.c("y")])
        .with_totals()
        .unwrap();
    assert_eq!(
        compile_literal(q),
        "SELECT t1.x, t1.y FROM t1 FINAL SAMPLE 0.1 \
         ARRAY JOIN t1.\"nested.array_column\" AS a \
         ANY INNER JOIN t2 ON t1.x = t2.x \
         WHERE t1.y != 'z' \
         GROUP BY t1.x, t1.y WITH TOTALS \
         HAVING x > 1 \
         ORDER BY t1.x ASC \
         LIMIT 3 BY t1.y \
         LIMIT 10 \
         SETTINGS max_threads=2"
    );
}

#[test]
fn test_compilations_do_not_share_counters() {
    let q = Select::new().column("x").from("t1").filter(Expr::col("x").eq(1));
    assert_eq!(compile(q.clone()).sql, compile(q).sql);
}
