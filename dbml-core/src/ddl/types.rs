use indexmap::IndexMap;
use serde::Serialize;
use std::collections::HashSet;

/// 表名到表定义的有序映射（按抽取时的插入顺序）
pub type TableMap = IndexMap<String, Table>;

/// 表列定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    /// 规范化后的大写基础类型，例如 `VARCHAR`
    pub data_type: String,
    /// 括号内的原始类型参数，例如 `10,2`、`255` 或 ENUM 的值列表
    pub size: Option<String>,
    pub nullable: bool,
    pub auto_increment: bool,
    pub primary_key: bool,
    pub unique: bool,
    pub default_value: Option<String>,
    pub comment: Option<String>,
}

impl Column {
    pub fn new(name: impl Into<String>, data_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            data_type: data_type.into(),
            size: None,
            nullable: true,
            auto_increment: false,
            primary_key: false,
            unique: false,
            default_value: None,
            comment: None,
        }
    }
}

/// 表约束
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    PrimaryKey {
        columns: Vec<String>,
    },
    ForeignKey {
        columns: Vec<String>,
        ref_table: String,
        ref_columns: Vec<String>,
        ref_schema: Option<String>,
    },
    Unique {
        columns: Vec<String>,
    },
    Index {
        columns: Vec<String>,
    },
    /// 仅 MySQL
    Fulltext {
        columns: Vec<String>,
    },
}

impl Constraint {
    /// 约束涉及的本表列
    pub fn columns(&self) -> &[String] {
        match self {
            Constraint::PrimaryKey { columns }
            | Constraint::ForeignKey { columns, .. }
            | Constraint::Unique { columns }
            | Constraint::Index { columns }
            | Constraint::Fulltext { columns } => columns,
        }
    }

    pub fn is_primary_key(&self) -> bool {
        matches!(self, Constraint::PrimaryKey { .. })
    }
}

/// 表定义
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Table {
    pub name: String,
    /// 来源 schema（仅 PostgreSQL）
    pub schema: Option<String>,
    pub columns: Vec<Column>,
    pub constraints: Vec<Constraint>,
}

impl Table {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            schema: None,
            columns: Vec::new(),
            constraints: Vec::new(),
        }
    }

    /// 按声明大小写解析列名，找不到时原样返回
    pub fn resolve_column_name(&self, name: &str) -> String {
        let lowered = name.to_lowercase();
        self.columns
            .iter()
            .find(|c| c.name.to_lowercase() == lowered)
            .map(|c| c.name.clone())
            .unwrap_or_else(|| name.to_string())
    }

    pub fn resolve_column_names(&self, names: &[String]) -> Vec<String> {
        names.iter().map(|n| self.resolve_column_name(n)).collect()
    }

    /// 主键列（小写）：列级标记与表级 PRIMARY KEY 约束的并集
    pub fn primary_key_columns(&self) -> HashSet<String> {
        let mut keys: HashSet<String> = self
            .columns
            .iter()
            .filter(|c| c.primary_key)
            .map(|c| c.name.to_lowercase())
            .collect();

        for constraint in self.constraints.iter().filter(|c| c.is_primary_key()) {
            keys.extend(constraint.columns().iter().map(|c| c.to_lowercase()));
        }

        keys
    }

    /// 将表级 PRIMARY KEY 约束回写到列的 primary_key 标记
    pub fn apply_primary_key(&mut self) {
        let keys = self.primary_key_columns();
        for column in &mut self.columns {
            if keys.contains(&column.name.to_lowercase()) {
                column.primary_key = true;
            }
        }
    }
}

/// 在表映射中按大小写不敏感的方式查找表，返回声明的表名和表定义
pub fn find_table<'a>(tables: &'a TableMap, name: &str) -> Option<(&'a str, &'a Table)> {
    let lowered = name.to_lowercase();
    tables
        .iter()
        .find(|(table_name, _)| table_name.to_lowercase() == lowered)
        .map(|(table_name, table)| (table_name.as_str(), table))
}
