use super::literal::{escape_enum_values, escape_string_value};
use super::*;
use crate::ddl::{Column, Constraint, Dialect, Table, TableMap, parse_ddl};
use std::fs;
use tempfile::TempDir;

fn table_map(tables: Vec<Table>) -> TableMap {
    tables.into_iter().map(|t| (t.name.clone(), t)).collect()
}

fn column(name: &str, data_type: &str) -> Column {
    Column::new(name, data_type)
}

#[test]
fn test_users_example() {
    let sql = r#"
CREATE TABLE `users` (
  `id` bigint(20) NOT NULL AUTO_INCREMENT,
  `email` varchar(100) UNIQUE,
  `created_at` timestamp DEFAULT CURRENT_TIMESTAMP,
  PRIMARY KEY (`id`)
);
    "#;
    let tables = parse_ddl(sql, None).unwrap();
    let dbml = convert_tables_to_dbml(&tables, None);

    assert_eq!(
        dbml,
        "Table users {\n  id bigint(20) [pk, increment]\n  email varchar(100) [unique]\n  created_at timestamp [default: `now()`]\n}\n"
    );
    assert!(!dbml.contains("Indexes"), "单列主键与唯一约束不应生成索引块");
}

#[test]
fn test_project_preamble() {
    let tables = table_map(vec![Table::new("t")]);
    let options = DbmlOptions::for_dialect(Dialect::PostgreSql);
    let dbml = convert_tables_to_dbml_with_options(&tables, Some("public"), &options);

    assert!(dbml.starts_with("Project public {\n  database_type: 'PostgreSQL'\n}\n\nTable t {\n}"));
}

#[test]
fn test_default_literal_decision_table() {
    let cases = [
        ("CURRENT_TIMESTAMP", "`now()`"),
        ("current_timestamp(3)", "`now()`"),
        ("NULL", "null"),
        ("0000-00-00", "'0000-00-00'"),
        ("0000-00-00 00:00:00", "'0000-00-00 00:00:00'"),
        ("12:30:00", "'12:30:00'"),
        ("0.0.0.0", "'0.0.0.0'"),
        ("192.168.1", "'192.168.1'"),
        ("300.5", "300.5"),
        ("42", "42"),
        ("TRUE", "true"),
        ("-1", "'-1'"),
        ("it's", "'it\\'s'"),
        ("a\tb", "'a\\tb'"),
        ("\u{1}x", "'\\x01x'"),
        ("한글", "'한글'"),
    ];

    for (raw, expected) in cases {
        assert_eq!(format_default(raw), expected, "默认值 {raw:?} 格式化错误");
    }
}

#[test]
fn test_literal_precedence() {
    // 日期优先于数字，IP 优先于数字
    assert_eq!(classify_default("2024-01-01"), LiteralKind::DateTime);
    assert_eq!(classify_default("10.0.0.1"), LiteralKind::IpAddress);
    assert_eq!(classify_default("1.5"), LiteralKind::IpAddress);
    assert_eq!(classify_default("256.1.1.1"), LiteralKind::Number);
    assert_eq!(classify_default("false"), LiteralKind::Boolean);
    assert_eq!(classify_default(""), LiteralKind::Text);
}

#[test]
fn test_ip_default_is_quoted() {
    let mut table = Table::new("hosts");
    let mut ip = column("ip", "VARCHAR");
    ip.size = Some("15".to_string());
    ip.default_value = Some("0.0.0.0".to_string());
    table.columns.push(ip);

    let dbml = convert_tables_to_dbml(&table_map(vec![table]), None);
    assert!(dbml.contains("ip varchar(15) [default: '0.0.0.0']"));
}

#[test]
fn test_identifier_escaping() {
    assert_eq!(escape_identifier("order items"), "\"order items\"");
    assert_eq!(escape_identifier("user-profile"), "\"user-profile\"");
    assert_eq!(escape_identifier("a.b"), "\"a.b\"");
    assert_eq!(escape_identifier("plain_name"), "plain_name");
    assert_eq!(escape_string_value("C:\\tmp\n\"x\""), "C:\\\\tmp\\n\\\"x\\\"");
}

#[test]
fn test_index_uses_declared_case() {
    let sql = "CREATE TABLE `pit` (`beginPit` int, `endPit` int, KEY `idx` (BeginPit), UNIQUE KEY `uk` (ENDPIT, beginpit));";
    let tables = parse_ddl(sql, Some(Dialect::MySql)).unwrap();
    let dbml = convert_tables_to_dbml(&tables, None);

    assert!(
        dbml.contains("  Indexes {\n    (beginPit)\n    (endPit, beginPit) [unique]\n  }"),
        "索引列名应使用声明时的大小写:\n{dbml}"
    );
}

#[test]
fn test_fulltext_index_has_no_suffix() {
    let mut table = Table::new("posts");
    table.columns.push(column("body", "TEXT"));
    table.constraints.push(Constraint::Fulltext {
        columns: vec!["body".to_string()],
    });

    let dbml = convert_tables_to_dbml(&table_map(vec![table]), None);
    assert!(dbml.contains("\n\n  Indexes {\n    (body)\n  }\n}"));
}

fn composite_fk_tables() -> TableMap {
    let mut parent = Table::new("Parent");
    parent.columns.push(column("X", "INT"));
    parent.columns.push(column("Y", "INT"));

    let foreign_key = Constraint::ForeignKey {
        columns: vec!["A".to_string(), "b".to_string()],
        ref_table: "parent".to_string(),
        ref_columns: vec!["x".to_string(), "y".to_string()],
        ref_schema: None,
    };
    let mut child = Table::new("child");
    child.columns.push(column("a", "INT"));
    child.columns.push(column("b", "INT"));
    child.constraints.push(foreign_key.clone());
    child.constraints.push(foreign_key);

    table_map(vec![parent, child])
}

#[test]
fn test_composite_foreign_keys_are_decomposed_and_deduplicated() {
    let dbml = convert_tables_to_dbml(&composite_fk_tables(), None);

    let refs: Vec<&str> = dbml.lines().filter(|l| l.starts_with("Ref:")).collect();
    assert_eq!(
        refs,
        vec!["Ref: child.a > Parent.X", "Ref: child.b > Parent.Y"],
        "复合外键应按位置拆分且每行只出现一次"
    );
    assert!(dbml.contains("// Relationships\nRef: child.a > Parent.X"));
}

#[test]
fn test_composite_foreign_key_without_decomposition() {
    let options = DbmlOptions {
        decompose_composite_refs: false,
        ..DbmlOptions::default()
    };
    let dbml = convert_tables_to_dbml_with_options(&composite_fk_tables(), None, &options);

    let refs: Vec<&str> = dbml.lines().filter(|l| l.starts_with("Ref:")).collect();
    assert_eq!(refs, vec!["Ref: child.(a, b) > Parent.(X, Y)"]);
}

#[test]
fn test_reference_to_unknown_table_keeps_raw_text() {
    let mut orders = Table::new("orders");
    orders.columns.push(column("customerId", "INT"));
    orders.constraints.push(Constraint::ForeignKey {
        columns: vec!["CUSTOMERID".to_string()],
        ref_table: "Customers".to_string(),
        ref_columns: vec!["ID".to_string()],
        ref_schema: Some("crm".to_string()),
    });
    orders.constraints.push(Constraint::ForeignKey {
        columns: vec!["a".to_string(), "b".to_string()],
        ref_table: "other".to_string(),
        ref_columns: vec!["x".to_string()],
        ref_schema: None,
    });

    let dbml = convert_tables_to_dbml(&table_map(vec![orders]), None);
    let refs: Vec<&str> = dbml.lines().filter(|l| l.starts_with("Ref:")).collect();
    assert_eq!(
        refs,
        vec!["Ref: orders.customerId > Customers.ID"],
        "列数不一致的外键应被跳过"
    );
}

#[test]
fn test_enum_values_are_escaped() {
    assert_eq!(escape_enum_values("'a','it''s','x\\\\y'"), "'a','it\\'s','x\\\\y'");
    assert_eq!(escape_enum_values("10,2"), "10,2");

    let sql = "CREATE TABLE t (`s` set('r','w,x') DEFAULT 'r');";
    let dbml = convert_tables_to_dbml(&parse_ddl(sql, None).unwrap(), None);
    assert!(dbml.contains("s set('r','w,x') [default: 'r']"));
}

const USERS_DDL: &str = r#"CREATE TABLE `users` (
  `id` int NOT NULL AUTO_INCREMENT,
  `Name` varchar(50) NOT NULL DEFAULT 'x',
  `score` decimal(10,2) DEFAULT '0.00',
  `flag` tinyint(1) NOT NULL DEFAULT 1,
  PRIMARY KEY (`id`),
  KEY `idx_name` (`Name`)
) ENGINE=InnoDB;
"#;

const DRAFT_DBML: &str = "Table users {\n  id int [pk, increment]\n  Name varchar(50) [not null, default: 'x']\n\n  Indexes {\n    (name)\n  }\n}\n";

#[test]
fn test_reconcile_patches_missing_columns() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.sql"), USERS_DDL).unwrap();

    let patched = reconcile_dbml(DRAFT_DBML, temp_dir.path()).unwrap();
    assert_eq!(
        patched,
        "Table users {\n  id int [pk, increment]\n  Name varchar(50) [not null, default: 'x']\n  score decimal(10,2) [default: '0.00']\n  flag tinyint(1) [not null, default: 1]\n\n  Indexes {\n    (Name)\n  }\n}\n"
    );
}

#[test]
fn test_reconcile_is_idempotent() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.sql"), USERS_DDL).unwrap();

    let once = reconcile_dbml(DRAFT_DBML, temp_dir.path()).unwrap();
    let twice = reconcile_dbml(&once, temp_dir.path()).unwrap();
    assert_eq!(once, twice, "第二次补全不应再有任何改动");
}

#[test]
fn test_reconcile_without_sources_is_noop() {
    let temp_dir = TempDir::new().unwrap();

    let missing_dir = temp_dir.path().join("no-such-dir");
    assert_eq!(reconcile_dbml(DRAFT_DBML, &missing_dir).unwrap(), DRAFT_DBML);

    // 目录存在但没有同名 .sql 文件
    assert_eq!(reconcile_dbml(DRAFT_DBML, temp_dir.path()).unwrap(), DRAFT_DBML);
}

#[test]
fn test_reconcile_appends_when_no_index_block() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(
        temp_dir.path().join("tags.sql"),
        "CREATE TABLE `tags` (\n  `id` int NOT NULL,\n  `label` varchar(20) DEFAULT NULL,\n  PRIMARY KEY (`id`)\n);\n",
    )
    .unwrap();

    let draft = "Table tags {\n  id int [pk]\n}\n";
    let patched = reconcile_dbml(draft, temp_dir.path()).unwrap();
    assert_eq!(
        patched,
        "Table tags {\n  id int [pk]\n  label varchar(20) [default: null]\n}\n"
    );
}

#[test]
fn test_full_pipeline_needs_no_patch() {
    let temp_dir = TempDir::new().unwrap();
    fs::write(temp_dir.path().join("users.sql"), USERS_DDL).unwrap();

    let tables = parse_ddl(USERS_DDL, None).unwrap();
    let dbml = convert_tables_to_dbml(&tables, Some("app"));
    assert_eq!(
        reconcile_dbml(&dbml, temp_dir.path()).unwrap(),
        dbml,
        "主解析完整时补全不应修改输出"
    );
}

#[test]
fn test_ground_truth_ignores_constraint_clauses() {
    let reconciler = Reconciler::new(&crate::input::default_encodings()).unwrap();
    let ddl = "CREATE TABLE `a` (\n  `id` int NOT NULL,\n  `note` varchar(10) COMMENT 'x, `y` int z',\n  CONSTRAINT `fk_a` FOREIGN KEY (`id`) REFERENCES `b` (`id`)\n);";

    let names: Vec<String> = reconciler
        .extract_ground_truth(ddl)
        .into_iter()
        .map(|c| c.name)
        .collect();
    assert_eq!(names, vec!["id", "note"]);
}
