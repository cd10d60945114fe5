//! DDL 抽取：方言检测、MySQL/PostgreSQL 抽取器与表结构模型

mod dialect;
pub mod mysql;
pub mod postgres;
pub mod scanner;
pub mod types;


pub use dialect::{Dialect, dialect_scores};
pub use mysql::MySqlExtractor;
pub use postgres::PostgreSqlExtractor;
pub use types::{Column, Constraint, Table, TableMap, find_table};

use crate::error::Result;
use crate::input::read_ddl_file;
use scanner::split_top_level;
use std::path::Path;
use tracing::debug;

/// 从 DDL 文本中抽取表定义
pub trait TableExtractor {
    fn extract(&self, content: &str) -> Result<TableMap>;
}

/// 方言对应的抽取器
pub enum Extractor {
    MySql(MySqlExtractor),
    PostgreSql(PostgreSqlExtractor),
}

impl Extractor {
    pub fn for_dialect(dialect: Dialect) -> Result<Self> {
        Ok(match dialect {
            Dialect::MySql => Extractor::MySql(MySqlExtractor::new()?),
            Dialect::PostgreSql => Extractor::PostgreSql(PostgreSqlExtractor::new()?),
        })
    }
}

impl TableExtractor for Extractor {
    fn extract(&self, content: &str) -> Result<TableMap> {
        match self {
            Extractor::MySql(extractor) => extractor.extract(content),
            Extractor::PostgreSql(extractor) => extractor.extract(content),
        }
    }
}

/// 解析 DDL 文本；未指定方言时自动检测
pub fn parse_ddl(content: &str, dialect: Option<Dialect>) -> Result<TableMap> {
    let dialect = dialect.unwrap_or_else(|| Dialect::detect(content));
    debug!("使用 {} 方言解析 DDL", dialect);
    Extractor::for_dialect(dialect)?.extract(content)
}

/// 读取并解析单个 DDL 文件
pub fn parse_ddl_file<P: AsRef<Path>>(
    path: P,
    dialect: Option<Dialect>,
    encodings: &[String],
) -> Result<TableMap> {
    let content = read_ddl_file(&path, encodings)?;
    parse_ddl(&content, dialect)
}

/// 将表映射序列化为格式化的 JSON
pub fn tables_to_json(tables: &TableMap) -> Result<String> {
    Ok(serde_json::to_string_pretty(tables)?)
}

/// 去掉标识符两侧的引号，以及 MySQL 导出中 `name@host` 形式的后缀
pub fn clean_identifier(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches(|c| matches!(c, '`' | '"' | '\''));
    trimmed
        .split('@')
        .next()
        .unwrap_or_default()
        .trim()
        .to_string()
}

/// 拆分 `schema.table` 形式的限定名，返回 (schema, 名称)，均未去引号
pub fn split_qualified(raw: &str) -> (Option<String>, String) {
    let mut parts = split_top_level(raw, '.');
    match parts.len() {
        0 => (None, raw.trim().to_string()),
        1 => (None, parts.remove(0)),
        _ => {
            let name = parts.pop().unwrap_or_default();
            let schema = parts.pop();
            (schema, name)
        }
    }
}

/// 去掉字符串字面量的引号并还原转义
pub fn unquote_literal(raw: &str) -> String {
    let raw = raw.trim();
    let Some(quote) = raw.chars().next().filter(|c| *c == '\'' || *c == '"') else {
        return raw.to_string();
    };
    if raw.len() < 2 || !raw.ends_with(quote) {
        return raw.to_string();
    }

    let inner = &raw[1..raw.len() - 1];
    let mut value = String::with_capacity(inner.len());
    let mut chars = inner.chars().peekable();

    while let Some(ch) = chars.next() {
        match ch {
            '\\' => match chars.next() {
                Some('n') => value.push('\n'),
                Some('r') => value.push('\r'),
                Some('t') => value.push('\t'),
                Some('0') => value.push('\0'),
                Some(other) => value.push(other),
                None => value.push('\\'),
            },
            c if c == quote && chars.peek() == Some(&quote) => {
                chars.next();
                value.push(quote);
            }
            c => value.push(c),
        }
    }

    value
}
