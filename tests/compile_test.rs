use bytehouse_sql::prelude::*;
use pretty_assertions::assert_eq;

#[test]
fn test_statement_from_json() {
    let json = r#"
        {"Delete": {
            "table": "t1",
            "filter": {"Binary": {
                "left": {"Column": {"table": null, "name": "x"}},
                "op": "Eq",
                "right": {"Bind": {"key": "x", "value": {"Int": 25}}}
            }}
        }}
    "#;
    let statement: Statement = serde_json::from_str(json).expect("valid statement JSON");
    let compiled = bytehouse_sql::compile(&statement, &Capabilities::default()).unwrap();
    assert_eq!(compiled.sql, "ALTER TABLE t1 DELETE WHERE x = %(x_1)s");
    assert_eq!(compiled.param("x_1"), Some(&Value::Int(25)));
}

#[test]
fn test_insert_from_json() {
    let json = r#"
        {"Insert": {
            "table": {"name": "t1", "columns": [
                {"name": "x", "ty": "Int32"},
                {"name": "y", "ty": {"Nullable": "String"}}
            ]},
            "rows": [[{"Int": 1}, "Null"], [{"String": "2"}, {"String": "b"}]]
        }}
    "#;
    let statement: Statement = serde_json::from_str(json).expect("valid statement JSON");
    let compiled = bytehouse_sql::compile(&statement, &Capabilities::default()).unwrap();
    assert_eq!(compiled.sql, "INSERT INTO t1 (x, y) VALUES");
    assert_eq!(
        compiled.rows,
        vec![
            vec![Value::Int(1), Value::Null],
            vec![Value::Int(2), Value::String("b".into())],
        ]
    );
}

#[test]
fn test_select_survives_json_round_trip() {
    let t1 = Table::new("t1").column("x", Type::Int32);
    let select = Select::new()
        .column(t1.c("x"))
        .from("t1")
        .sample(0.1)
        .filter(t1.c("x").gt(10))
        .limit(5);
    let statement: Statement = select.into();
    let json = serde_json::to_string(&statement).unwrap();
    let restored: Statement = serde_json::from_str(&json).unwrap();

    let caps = Capabilities::default();
    let compiler = Compiler::new(&caps).literal_binds(true);
    assert_eq!(
        compiler.compile(&restored).unwrap().sql,
        "SELECT t1.x FROM t1 SAMPLE 0.1 WHERE t1.x > 10 LIMIT 5"
    );
}

#[test]
fn test_capabilities_negotiated_after_connect() {
    let shared = SharedCapabilities::default();
    let delete: Statement = Delete::new("t1").filter(col("x").eq(1)).into();

    assert!(bytehouse_sql::compile(&delete, &shared.snapshot()).is_ok());

    shared.negotiate("1.1.54380".parse().unwrap());
    let err = bytehouse_sql::compile(&delete, &shared.snapshot()).unwrap_err();
    assert_eq!(
        err.to_string(),
        "ALTER DELETE is not supported by this server version"
    );
}

#[test]
fn test_reflected_table_round_trip() {
    let columns = vec![
        Column::from_describe("date", "Date", "").unwrap(),
        Column::from_describe("x", "Int32", "").unwrap(),
        Column::from_describe("amount", "Decimal(18, 4)", "0").unwrap(),
    ];
    let table = Table::reflect(
        "orders",
        columns,
        Some("CnchMergeTree PARTITION BY toYYYYMM(date) ORDER BY (date, x) PRIMARY KEY date"),
    )
    .unwrap();

    let engine = table.engine.as_ref().unwrap();
    assert!(engine.primary_key_is_order_prefix());

    let compiled = bytehouse_sql::compile(
        &CreateTable::new(table).if_not_exists().into(),
        &Capabilities::default(),
    )
    .unwrap();
    assert_eq!(
        compiled.sql,
        "CREATE TABLE IF NOT EXISTS orders (date Date, x Int32, amount Decimal(18, 4) DEFAULT 0) \
         ENGINE = CnchMergeTree() PARTITION BY toYYYYMM(date) ORDER BY (date, x) PRIMARY KEY date"
    );
}

#[test]
fn test_type_names_normalize() {
    let ty = Type::parse("Array(Nullable(Decimal64(4)))").unwrap();
    assert_eq!(ty.to_string(), "Array(Nullable(Decimal(18, 4)))");
    assert_eq!(Type::parse(&ty.to_string()).unwrap(), ty);
}

#[test]
fn test_param_styles_from_config() {
    let config = DialectConfig::from_toml("[compile]\nparam_style = \"qmark\"").unwrap();
    let caps = config.capabilities().unwrap();
    let compiled = Compiler::new(&caps)
        .options(config.compile_options())
        .compile(&Select::new().column("x").from("t1").filter(col("x").eq(1)).into())
        .unwrap();
    assert_eq!(compiled.sql, "SELECT x FROM t1 WHERE x = ?");
    assert_eq!(compiled.params.len(), 1);
}
