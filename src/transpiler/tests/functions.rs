//! Expression and function tests.

use pretty_assertions::assert_eq;

use super::{compile, compile_literal, expr_sql, expr_sql_with};
use crate::ast::builders::*;
use crate::ast::*;
use crate::error::DialectError;
use crate::transpiler::{Capabilities, Compiler};
use crate::transpiler::ParamStyle;
use crate::types::Type;

#[test]
fn test_array_filter_lambda() {
    let q = Select::new().column(
        func(
            "arrayFilter",
            vec![lambda(|x| x.like("%World%")), lit(vec!["Hello", "abc World"])],
        )
        .label("test"),
    );
    assert_eq!(
        compile_literal(q.clone()),
        "SELECT arrayFilter(x -> x LIKE '%%World%%', ['Hello', 'abc World']) AS test"
    );

    let compiled = compile(q);
    assert_eq!(
        compiled.sql,
        "SELECT arrayFilter(x -> x LIKE %(x_1)s, ['Hello', 'abc World']) AS test"
    );
    assert_eq!(compiled.param("x_1"), Some(&Value::String("%World%".into())));
}

#[test]
fn test_extract() {
    assert_eq!(expr_sql(&extract("year", col("x"))), "toYear(x)");
    assert_eq!(expr_sql(&extract("MONTH", col("x"))), "toMonth(x)");
    assert_eq!(expr_sql(&extract("day", col("x"))), "toDayOfMonth(x)");
    assert_eq!(expr_sql(&extract("second", col("x"))), "x");
}

#[test]
fn test_count_variants() {
    let t1 = Table::new("t1").column("x", Type::Int32);
    let q = Select::new().column(count(distinct(t1.c("x")))).from("t1");
    assert_eq!(compile(q).sql, "SELECT count(distinct(t1.x)) FROM t1");

    let q = Select::new().column(count_all().label("total")).from("t1");
    assert_eq!(compile(q).sql, "SELECT count(*) AS total FROM t1");
}

#[test]
fn test_is_distinct_from() {
    assert_eq!(
        expr_sql(&col("x").is_distinct_from(col("y"))),
        "hasAny([x], [y]) = 0"
    );
    assert_eq!(
        expr_sql(&col("x").is_not_distinct_from(col("y"))),
        "hasAny([x], [y])"
    );
    assert_eq!(
        expr_sql(&col("x").is_distinct_from(bind(1))),
        "hasAny([x], [%(x_1)s]) = 0"
    );
}

#[test]
fn test_cast_renders_type_name() {
    assert_eq!(
        expr_sql(&cast(col("x"), Type::nullable(Type::String))),
        "CAST(x AS Nullable(String))"
    );
    let decimal = Type::decimal(10, 2).unwrap();
    assert_eq!(expr_sql(&col("x").cast(decimal)), "CAST(x AS Decimal(10, 2))");
}

#[test]
fn test_cast_rejects_invalid_types() {
    let caps = Capabilities::default();
    let compiler = Compiler::new(&caps);

    let oversized = col("x").cast(Type::Decimal {
        precision: 50,
        scale: 60,
    });
    let err = compiler.compile_expr(&oversized).unwrap_err();
    assert!(matches!(err, DialectError::InvalidType(_)));

    let nested = col("x").cast(Type::nullable(Type::array(Type::Int8)));
    assert!(matches!(
        compiler.compile_expr(&nested),
        Err(DialectError::InvalidType(_))
    ));

    let q = Select::new().column(col("x").cast(Type::FixedString(0))).from("t1");
    assert!(compiler.compile(&q.into()).is_err());
}

#[test]
fn test_modulo_escaping_per_style() {
    let expr = col("x").modulo(2);
    assert_eq!(expr_sql(&expr), "x %% %(x_1)s");
    assert_eq!(expr_sql_with(&expr, ParamStyle::Named), "x % :x_1");
    assert_eq!(expr_sql_with(&expr, ParamStyle::Qmark), "x % ?");
}

#[test]
fn test_operator_precedence() {
    let expr = col("a").plus(col("b")).multiply(col("c"));
    assert_eq!(expr_sql(&expr), "(a + b) * c");

    let expr = col("a").minus(col("b").minus(col("c")));
    assert_eq!(expr_sql(&expr), "a - (b - c)");

    let expr = col("a").plus(col("b")).plus(col("c"));
    assert_eq!(expr_sql(&expr), "a + b + c");

    let expr = col("a").eq(1).or(col("b").eq(2)).and(col("c").eq(3));
    assert_eq!(
        expr_sql(&expr),
        "(a = %(a_1)s OR b = %(b_1)s) AND c = %(c_1)s"
    );
}

#[test]
fn test_negation_inside_comparison_keeps_its_grouping() {
    assert_eq!(expr_sql(&(!col("a")).eq(col("b"))), "(NOT a) = b");
    assert_eq!(expr_sql(&col("b").eq(!col("a"))), "b = (NOT a)");
    assert_eq!(expr_sql(&(!col("a")).and(col("b"))), "NOT a AND b");
    assert_eq!(expr_sql(&col("b").or(!col("a"))), "b OR NOT a");
    assert_eq!(expr_sql(&(!col("a")).plus(1)), "(NOT a) + %(param_1)s");
}

#[test]
fn test_distinct_from_inside_comparison_is_parenthesized() {
    let expr = col("x").is_distinct_from(col("y")).eq(col("z"));
    assert_eq!(expr_sql(&expr), "(hasAny([x], [y]) = 0) = z");

    let expr = col("x").is_not_distinct_from(col("y")).eq(col("z"));
    assert_eq!(expr_sql(&expr), "hasAny([x], [y]) = z");

    let expr = col("x").is_distinct_from(col("y")).and(col("z").eq(1));
    assert_eq!(expr_sql(&expr), "hasAny([x], [y]) = 0 AND z = %(z_1)s");
}

#[test]
fn test_comparisons_do_not_chain() {
    let expr = col("a").eq(col("b")).eq(col("c"));
    assert_eq!(expr_sql(&expr), "(a = b) = c");
}

#[test]
fn test_in_list() {
    assert_eq!(
        expr_sql(&col("x").in_list([1, 2])),
        "x IN (%(x_1)s, %(x_2)s)"
    );
    assert_eq!(
        expr_sql(&col("x").not_in_list([1])),
        "x NOT IN (%(x_1)s)"
    );
    assert_eq!(expr_sql(&col("x").in_list(Vec::<i32>::new())), "0");
    assert_eq!(expr_sql(&col("x").not_in_list(Vec::<i32>::new())), "1");
}

#[test]
fn test_not_and_null_checks() {
    assert_eq!(expr_sql(&!col("x").eq(1)), "NOT (x = %(x_1)s)");
    assert_eq!(expr_sql(&!col("flag")), "NOT flag");
    assert_eq!(expr_sql(&col("x").is_null()), "x IS NULL");
    assert_eq!(expr_sql(&col("x").is_not_null()), "x IS NOT NULL");
}

#[test]
fn test_tuples() {
    assert_eq!(expr_sql(&tuple([col("x")])), "tuple(x)");
    assert_eq!(expr_sql(&tuple([col("x"), col("y")])), "(x, y)");
}

#[test]
fn test_label_outside_select_list_is_referenced_by_name() {
    let total = count_all().label("total");
    let q = Select::new()
        .column(total.clone())
        .from("t1")
        .order_by(total.desc());
    assert_eq!(
        compile(q).sql,
        "SELECT count(*) AS total FROM t1 ORDER BY total DESC"
    );
}

#[test]
fn test_string_literals_are_escaped() {
    assert_eq!(expr_sql(&lit("it's 50%")), "'it\\'s 50%%'");
    assert_eq!(expr_sql_with(&lit("a\\b"), ParamStyle::Named), "'a\\\\b'");
}

#[test]
fn test_function_bind_is_keyed_by_function_name() {
    let expr = func("toYear", vec![col("date")]).eq(2018);
    assert_eq!(expr_sql(&expr), "toYear(date) = %(toYear_1)s");
}
