use super::scanner::{
    first_group_from, keyword_prefix, mask_literals, matching_paren, split_definition_items,
    split_top_level, split_words,
};
use super::types::{Column, Constraint, Table, TableMap};
use super::{TableExtractor, clean_identifier, split_qualified, unquote_literal};
use crate::error::Result;
use regex::Regex;
use tracing::debug;

/// CREATE 之后的对象类型
#[derive(Debug, Clone, PartialEq, Eq)]
enum CreateObject {
    Table,
    Other(String),
}

/// 定义项分类
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ItemKind {
    Column,
    Constraint,
    /// PARTITION / CHECK / 无法识别的 CONSTRAINT，DBML 无对应概念
    Discarded,
}

/// MySQL/MariaDB DDL 抽取器
pub struct MySqlExtractor {
    create_object: Regex,
    table_name: Regex,
    column_head: Regex,
    comment: Regex,
    default_keyword: Regex,
    default_value: Regex,
    not_null: Regex,
    auto_increment: Regex,
    primary_key: Regex,
    unique_word: Regex,
    unique_key: Regex,
    foreign_keyword: Regex,
    foreign_key: Regex,
    unique_constraint: Regex,
    fulltext_constraint: Regex,
    index_constraint: Regex,
    prefix_length: Regex,
    sort_order: Regex,
    function_call: Regex,
    charset_introducer: Regex,
    date_spacing: Regex,
}

const IDENT: &str = r#"(?:`[^`]+`|"[^"]+"|[\w$@]+)"#;

impl MySqlExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            create_object: Regex::new(
                r"(?is)^\s*CREATE\b.*?\b(TABLE|PROCEDURE|FUNCTION|VIEW|INDEX|TRIGGER|EVENT|DATABASE|SCHEMA|USER|ROLE|SEQUENCE|SERVER|TABLESPACE)\b",
            )?,
            table_name: Regex::new(&format!(
                r"(?is)^\s*CREATE\s+(?:TEMPORARY\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?({IDENT}(?:\s*\.\s*{IDENT})?)"
            ))?,
            column_head: Regex::new(&format!(r"(?s)^\s*({IDENT})\s+(\w+)"))?,
            comment: Regex::new(
                r#"(?is)\bCOMMENT\s*(?:=\s*)?('(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.|"")*")"#,
            )?,
            default_keyword: Regex::new(r"(?i)\bDEFAULT\b\s*")?,
            default_value: Regex::new(
                r#"^(?:'(?:[^'\\]|\\.|'')*'|"(?:[^"\\]|\\.|"")*"|\d{4}\s*-\s*\d{2}\s*-\s*\d{2}(?:\s+\d{2}\s*:\s*\d{2}\s*:\s*\d{2})?|\d{2}\s*:\s*\d{2}\s*:\s*\d{2}|\S+)"#,
            )?,
            not_null: Regex::new(r"(?i)\bNOT\s+NULL\b")?,
            auto_increment: Regex::new(r"(?i)\bAUTO_INCREMENT\b")?,
            primary_key: Regex::new(r"(?i)\bPRIMARY\s+KEY\b")?,
            unique_word: Regex::new(r"(?i)\bUNIQUE\b")?,
            unique_key: Regex::new(r"(?i)\bUNIQUE\s+KEY\b")?,
            foreign_keyword: Regex::new(r"(?i)\bFOREIGN\s+KEY\b")?,
            foreign_key: Regex::new(&format!(
                r"(?is)FOREIGN\s+KEY\s*(?:{IDENT}\s*)?\(([^)]+)\)\s*REFERENCES\s+({IDENT}(?:\s*\.\s*{IDENT})?)\s*\(([^)]+)\)"
            ))?,
            unique_constraint: Regex::new(r"(?i)\bUNIQUE\b(?:\s+(?:KEY|INDEX)\b)?")?,
            fulltext_constraint: Regex::new(r"(?i)\b(FULLTEXT|SPATIAL)\s+(?:KEY|INDEX)\b")?,
            index_constraint: Regex::new(r"(?i)\b(?:KEY|INDEX)\b")?,
            prefix_length: Regex::new(r"\(\s*\d+\s*\)")?,
            sort_order: Regex::new(r"(?i)\s+(?:ASC|DESC)\s*$")?,
            function_call: Regex::new(
                r"(?i)\b(?:replace|right|left|substr|substring|concat|upper|lower|date_format|year|month|day|date|cast|convert|json_extract|json_unquote|coalesce|ifnull|trim|md5|sha1|sha2|hex|abs|round)\s*\(",
            )?,
            charset_introducer: Regex::new(r"(?i)(?:^|[^\w])_(?:utf8mb3|utf8mb4|utf8|latin1|binary|ascii)\b")?,
            date_spacing: Regex::new(r"\s*([-:])\s*")?,
        })
    }

    /// 判断 CREATE 语句的对象类型，非 CREATE 语句返回 None
    fn classify_statement(&self, statement: &str) -> Option<CreateObject> {
        let masked = mask_literals(statement);
        let captures = self.create_object.captures(&masked)?;
        let keyword = captures.get(1)?.as_str().to_ascii_uppercase();
        if keyword == "TABLE" {
            Some(CreateObject::Table)
        } else {
            Some(CreateObject::Other(keyword))
        }
    }

    /// 解析单条 CREATE TABLE 语句
    fn parse_create_table(&self, statement: &str) -> Option<Table> {
        let captures = self.table_name.captures(statement)?;
        let name_match = captures.get(1)?;
        let (_, raw_name) = split_qualified(name_match.as_str());
        let table_name = clean_identifier(&raw_name);
        if table_name.is_empty() {
            return None;
        }

        let Some(body) = table_body(statement, name_match.end()) else {
            debug!("表 {} 没有定义体，跳过", table_name);
            return None;
        };

        let mut table = Table::new(table_name);
        for item in split_definition_items(body) {
            if !item.chars().any(char::is_alphabetic) {
                continue;
            }

            match self.classify_item(&item) {
                ItemKind::Constraint => {
                    if let Some(constraint) = self.parse_constraint(&item) {
                        table.constraints.push(constraint);
                    } else {
                        debug!("无法解析约束，已忽略: {}", item);
                    }
                }
                ItemKind::Column => {
                    if let Some(column) = self.parse_column(&item) {
                        table.columns.push(column);
                    } else {
                        debug!("无法解析列定义，已忽略: {}", item);
                    }
                }
                ItemKind::Discarded => {
                    debug!("忽略 DBML 不支持的定义项: {}", item);
                }
            }
        }

        table.apply_primary_key();
        Some(table)
    }

    /// 按定义项开头的关键字区分列与约束
    fn classify_item(&self, item: &str) -> ItemKind {
        let words: Vec<String> = split_words(&mask_literals(item))
            .iter()
            .map(|w| {
                w.split('(')
                    .next()
                    .unwrap_or_default()
                    .to_ascii_uppercase()
            })
            .collect();
        let Some(first) = words.first() else {
            return ItemKind::Discarded;
        };

        let has_constraint_prefix = first == "CONSTRAINT";
        let start = if has_constraint_prefix {
            match words.get(1).map(String::as_str) {
                Some("PRIMARY" | "FOREIGN" | "UNIQUE" | "CHECK") => 1,
                _ => 2,
            }
        } else {
            0
        };

        let keyword = words.get(start).map(String::as_str).unwrap_or_default();
        let next = words.get(start + 1).map(String::as_str).unwrap_or_default();

        match keyword {
            "PRIMARY" | "FOREIGN" if next == "KEY" => ItemKind::Constraint,
            "UNIQUE" | "KEY" | "INDEX" => ItemKind::Constraint,
            "FULLTEXT" | "SPATIAL" if matches!(next, "KEY" | "INDEX") => ItemKind::Constraint,
            "PARTITION" | "CHECK" => ItemKind::Discarded,
            _ if has_constraint_prefix => ItemKind::Discarded,
            _ => ItemKind::Column,
        }
    }

    /// 解析列定义
    fn parse_column(&self, item: &str) -> Option<Column> {
        let captures = self.column_head.captures(item)?;
        let name = clean_identifier(captures.get(1)?.as_str());
        let type_match = captures.get(2)?;
        let data_type = type_match.as_str().to_ascii_uppercase();

        let mut column = Column::new(name, data_type);

        // 类型参数：紧跟类型关键字的第一个平衡括号组（ENUM/SET 的值列表中可能含括号和逗号）
        let mut remainder_start = type_match.end();
        let after_type = &item[type_match.end()..];
        if after_type.trim_start().starts_with('(') {
            let open = type_match.end() + (after_type.len() - after_type.trim_start().len());
            if let Some(close) = matching_paren(item, open) {
                column.size = Some(item[open + 1..close].trim().to_string());
                remainder_start = close + 1;
            }
        }

        // COMMENT 文本单独提取，并从属性扫描窗口中剔除
        let mut attributes = item[remainder_start..].to_string();
        let comment_clause = self
            .comment
            .captures(&attributes)
            .and_then(|c| Some((c.get(0)?.range(), unquote_literal(c.get(1)?.as_str()))));
        if let Some((range, comment)) = comment_clause {
            column.comment = Some(comment);
            attributes.replace_range(range, " ");
        }

        let masked = mask_literals(&attributes);
        column.nullable = !self.not_null.is_match(&masked);
        column.auto_increment = self.auto_increment.is_match(&masked);
        column.primary_key = self.primary_key.is_match(&masked);
        column.unique = self.unique_word.is_match(&masked) && !self.unique_key.is_match(&masked);
        column.default_value = self.extract_default(&attributes, &masked);

        Some(column)
    }

    /// 提取 DEFAULT 值：优先引号字面量，其次日期/时间形式，最后任意非空白记号
    fn extract_default(&self, attributes: &str, masked: &str) -> Option<String> {
        let keyword = self.default_keyword.find(masked)?;
        let raw = self
            .default_value
            .find(&attributes[keyword.end()..])?
            .as_str()
            .trim();

        if raw.starts_with('\'') || raw.starts_with('"') {
            return Some(unquote_literal(raw));
        }

        if raw.starts_with(|c: char| c.is_ascii_digit()) && (raw.contains('-') || raw.contains(':'))
        {
            let compact = self.date_spacing.replace_all(raw, "$1");
            return Some(compact.split_whitespace().collect::<Vec<_>>().join(" "));
        }

        Some(raw.to_string())
    }

    /// 解析表级约束
    ///
    /// 关键字只在第一个括号组之前查找，且引号内的索引名不参与匹配；
    /// 某个分支取不到列时继续尝试后面的分支。
    fn parse_constraint(&self, item: &str) -> Option<Constraint> {
        let head = keyword_prefix(item);

        if let Some(found) = self.primary_key.find(&head) {
            let columns = self.columns_after(item, found.end());
            if !columns.is_empty() {
                return Some(Constraint::PrimaryKey { columns });
            }
        }

        if self.foreign_keyword.is_match(&head) {
            if let Some(constraint) = self.parse_foreign_key(item) {
                return Some(constraint);
            }
        }

        if let Some(found) = self.fulltext_constraint.captures(&head) {
            let whole = found.get(0)?;
            let columns = self.columns_after(item, whole.end());
            if !columns.is_empty() {
                let kind = found.get(1)?.as_str().to_ascii_uppercase();
                return Some(if kind == "FULLTEXT" {
                    Constraint::Fulltext { columns }
                } else {
                    Constraint::Index { columns }
                });
            }
        }

        if let Some(found) = self.unique_constraint.find(&head) {
            let columns = self.columns_after(item, found.end());
            if !columns.is_empty() {
                return Some(Constraint::Unique { columns });
            }
        }

        if let Some(found) = self.index_constraint.find(&head) {
            let columns = self.columns_after(item, found.end());
            if !columns.is_empty() {
                return Some(Constraint::Index { columns });
            }
        }

        None
    }

    /// 在原始文本上匹配以保留引用目标的大小写
    fn parse_foreign_key(&self, item: &str) -> Option<Constraint> {
        let captures = self.foreign_key.captures(item)?;
        let columns = split_identifier_list(captures.get(1)?.as_str());
        let (ref_schema, ref_table) = split_qualified(captures.get(2)?.as_str());
        let ref_columns = split_identifier_list(captures.get(3)?.as_str());
        Some(Constraint::ForeignKey {
            columns,
            ref_table: clean_identifier(&ref_table),
            ref_columns,
            ref_schema: ref_schema.map(|s| clean_identifier(&s)),
        })
    }

    /// 关键字之后第一个括号组中的列名列表
    fn columns_after(&self, item: &str, from: usize) -> Vec<String> {
        first_group_from(item, from)
            .map(|(open, close)| self.parse_column_list(&item[open + 1..close]))
            .unwrap_or_default()
    }

    /// 解析索引列列表：去掉前缀长度与排序方向，丢弃函数式索引表达式
    pub(crate) fn parse_column_list(&self, list: &str) -> Vec<String> {
        let mut columns = Vec::new();

        for part in split_top_level(list, ',') {
            let stripped = self.prefix_length.replace_all(&part, "");
            let stripped = self.sort_order.replace(stripped.trim(), "");
            let stripped = stripped.trim();

            if stripped.is_empty() || self.is_functional_index(stripped) {
                debug!("忽略函数式索引表达式: {}", part);
                continue;
            }

            let name = clean_identifier(stripped);
            if name.is_empty() || name.contains(['(', ')', '\'']) {
                continue;
            }
            columns.push(name);
        }

        columns
    }

    fn is_functional_index(&self, part: &str) -> bool {
        if part.starts_with('(') {
            return true;
        }
        if self.charset_introducer.is_match(part) || self.function_call.is_match(part) {
            return true;
        }
        part.contains('(') && part.contains(['`', ':', '%', '\''])
    }
}

impl TableExtractor for MySqlExtractor {
    fn extract(&self, content: &str) -> Result<TableMap> {
        let mut tables = TableMap::new();

        for statement in split_top_level(content, ';') {
            match self.classify_statement(&statement) {
                Some(CreateObject::Table) => {
                    if let Some(table) = self.parse_create_table(&statement) {
                        debug!(
                            "解析表: {} ({} 列, {} 个约束)",
                            table.name,
                            table.columns.len(),
                            table.constraints.len()
                        );
                        tables.insert(table.name.clone(), table);
                    }
                }
                Some(CreateObject::Other(kind)) => {
                    debug!("跳过非表 CREATE 语句: {}", kind);
                }
                None => {}
            }
        }

        debug!("成功解析 {} 个表", tables.len());
        Ok(tables)
    }
}

/// 表名之后的定义体
///
/// 优先取表名后第一个平衡括号组；括号不平衡时退回到第一个 `(` 与最后一个 `)` 之间。
fn table_body(statement: &str, from: usize) -> Option<&str> {
    if let Some((open, close)) = first_group_from(statement, from) {
        return Some(&statement[open + 1..close]);
    }
    let tail = &statement[from..];
    let open = tail.find('(')?;
    let close = tail.rfind(')')?;
    (close > open).then(|| &tail[open + 1..close])
}

fn split_identifier_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(clean_identifier)
        .filter(|c| !c.is_empty())
        .collect()
}
