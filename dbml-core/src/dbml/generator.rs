use super::literal::{escape_enum_values, escape_identifier, escape_string_value, format_default};
use crate::constants::dbml::{RELATIONSHIPS_HEADER, TYPE_MAPPING};
use crate::ddl::{Column, Constraint, Dialect, Table, TableMap, find_table};
use std::collections::HashSet;

/// DBML 生成选项
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DbmlOptions {
    /// `Project` 中的 database_type
    pub database_type: String,
    /// 复合外键拆分为逐列关系
    pub decompose_composite_refs: bool,
}

impl Default for DbmlOptions {
    fn default() -> Self {
        Self::for_dialect(Dialect::MySql)
    }
}

impl DbmlOptions {
    pub fn for_dialect(dialect: Dialect) -> Self {
        Self {
            database_type: dialect.database_type().to_string(),
            decompose_composite_refs: true,
        }
    }
}

/// 列属性，按固定顺序输出
#[derive(Debug, Default)]
pub(crate) struct ColumnAttributes<'a> {
    pub primary_key: bool,
    pub increment: bool,
    pub not_null: bool,
    pub unique: bool,
    pub default_value: Option<&'a str>,
}

impl ColumnAttributes<'_> {
    /// 渲染为 ` [pk, increment, ...]`，没有属性时为空串
    pub fn render(&self) -> String {
        let mut attributes = Vec::new();
        if self.primary_key {
            attributes.push("pk".to_string());
        }
        if self.increment {
            attributes.push("increment".to_string());
        }
        // 主键隐含非空
        if self.not_null && !self.primary_key {
            attributes.push("not null".to_string());
        }
        if self.unique && !self.primary_key {
            attributes.push("unique".to_string());
        }
        if let Some(value) = self.default_value {
            attributes.push(format!("default: {}", format_default(value)));
        }

        if attributes.is_empty() {
            String::new()
        } else {
            format!(" [{}]", attributes.join(", "))
        }
    }
}

/// 使用默认选项转换
pub fn convert_tables_to_dbml(tables: &TableMap, schema_name: Option<&str>) -> String {
    convert_tables_to_dbml_with_options(tables, schema_name, &DbmlOptions::default())
}

/// 将表映射转换为 DBML 文本，输出顺序与表的插入顺序一致
pub fn convert_tables_to_dbml_with_options(
    tables: &TableMap,
    schema_name: Option<&str>,
    options: &DbmlOptions,
) -> String {
    let mut lines = Vec::new();

    if let Some(schema) = schema_name {
        lines.push(format!("Project {} {{", escape_identifier(schema)));
        lines.push(format!(
            "  database_type: '{}'",
            escape_string_value(&options.database_type)
        ));
        lines.push("}".to_string());
        lines.push(String::new());
    }

    for (table_name, table) in tables {
        lines.push(convert_table(table_name, table));
        lines.push(String::new());
    }

    let references = extract_references(tables, options);
    if !references.is_empty() {
        lines.push(RELATIONSHIPS_HEADER.to_string());
        lines.extend(references);
    }

    lines.join("\n")
}

fn convert_table(table_name: &str, table: &Table) -> String {
    let mut lines = vec![format!("Table {} {{", escape_identifier(table_name))];
    let primary_keys = table.primary_key_columns();

    for column in &table.columns {
        let is_pk = column.primary_key || primary_keys.contains(&column.name.to_lowercase());
        lines.push(format!("  {}", convert_column(column, is_pk)));
    }

    let indexes: Vec<String> = table
        .constraints
        .iter()
        .filter_map(|constraint| {
            let suffix = match constraint {
                Constraint::Unique { .. } => " [unique]",
                Constraint::Index { .. } | Constraint::Fulltext { .. } => "",
                Constraint::PrimaryKey { .. } | Constraint::ForeignKey { .. } => return None,
            };
            let columns: Vec<String> = table
                .resolve_column_names(constraint.columns())
                .iter()
                .map(|c| escape_identifier(c))
                .collect();
            Some(format!("    ({}){}", columns.join(", "), suffix))
        })
        .collect();

    if !indexes.is_empty() {
        lines.push(String::new());
        lines.push("  Indexes {".to_string());
        lines.extend(indexes);
        lines.push("  }".to_string());
    }

    lines.push("}".to_string());
    lines.join("\n")
}

fn convert_column(column: &Column, is_pk: bool) -> String {
    let upper = column.data_type.to_uppercase();
    let mut dbml_type = map_type(&upper, TYPE_MAPPING);

    if let Some(size) = column.size.as_deref().filter(|s| !s.is_empty()) {
        let size = if upper == "ENUM" || upper == "SET" {
            escape_enum_values(size)
        } else {
            size.to_string()
        };
        dbml_type.push_str(&format!("({size})"));
    }

    let attributes = ColumnAttributes {
        primary_key: is_pk,
        increment: column.auto_increment,
        not_null: !column.nullable,
        unique: column.unique,
        default_value: column.default_value.as_deref(),
    };

    format!(
        "{} {}{}",
        escape_identifier(&column.name),
        dbml_type,
        attributes.render()
    )
}

/// 查表映射类型名，未收录的类型原样转小写
pub(crate) fn map_type(upper: &str, mapping: &[(&str, &str)]) -> String {
    mapping
        .iter()
        .find(|(sql, _)| *sql == upper)
        .map(|(_, dbml)| dbml.to_string())
        .unwrap_or_else(|| upper.to_lowercase())
}

/// 生成外键关系行，整个文档内按行文本去重
fn extract_references(tables: &TableMap, options: &DbmlOptions) -> Vec<String> {
    let mut references = Vec::new();
    let mut seen = HashSet::new();

    for (table_name, table) in tables {
        for constraint in &table.constraints {
            let Constraint::ForeignKey {
                columns,
                ref_table,
                ref_columns,
                ..
            } = constraint
            else {
                continue;
            };

            let source_columns = table.resolve_column_names(columns);
            let (target_name, target_columns) = match find_table(tables, ref_table) {
                Some((name, target)) => (name.to_string(), target.resolve_column_names(ref_columns)),
                None => (ref_table.clone(), ref_columns.clone()),
            };

            if source_columns.is_empty() || source_columns.len() != target_columns.len() {
                continue;
            }

            let source = escape_identifier(table_name);
            let target = escape_identifier(&target_name);

            let lines: Vec<String> = if source_columns.len() == 1 || options.decompose_composite_refs {
                source_columns
                    .iter()
                    .zip(&target_columns)
                    .map(|(from, to)| {
                        format!(
                            "Ref: {}.{} > {}.{}",
                            source,
                            escape_identifier(from),
                            target,
                            escape_identifier(to)
                        )
                    })
                    .collect()
            } else {
                let join = |cols: &[String]| {
                    cols.iter()
                        .map(|c| escape_identifier(c))
                        .collect::<Vec<_>>()
                        .join(", ")
                };
                vec![format!(
                    "Ref: {}.({}) > {}.({})",
                    source,
                    join(&source_columns),
                    target,
                    join(&target_columns)
                )]
            };

            for line in lines {
                if seen.insert(line.clone()) {
                    references.push(line);
                }
            }
        }
    }

    references
}
