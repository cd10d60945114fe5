use super::scanner::{
    Scanner, first_group_from, mask_literals, matching_paren, split_top_level, split_words,
};
use super::types::{Column, Constraint, Table, TableMap};
use super::{TableExtractor, clean_identifier, unquote_literal};
use crate::constants::postgres::{CLAUSE_KEYWORDS, TYPE_MAPPING};
use crate::error::Result;
use regex::Regex;
use tracing::debug;

/// PostgreSQL DDL 抽取器
pub struct PostgreSqlExtractor {
    create_table: Regex,
    primary_key: Regex,
    unique: Regex,
    foreign_keyword: Regex,
    foreign_key: Regex,
    not_null: Regex,
}

impl PostgreSqlExtractor {
    pub fn new() -> Result<Self> {
        Ok(Self {
            create_table: Regex::new(
                r#"(?i)\bCREATE\s+(?:(?:GLOBAL|LOCAL)\s+)?(?:(?:TEMP|TEMPORARY|UNLOGGED)\s+)?TABLE\s+(?:IF\s+NOT\s+EXISTS\s+)?(?:"?([\w$]+)"?\s*\.\s*)?"?([\w$]+)"?\s*\("#,
            )?,
            primary_key: Regex::new(r"(?i)\bPRIMARY\s+KEY\b")?,
            unique: Regex::new(r"(?i)\bUNIQUE\b")?,
            foreign_keyword: Regex::new(r"(?i)\bFOREIGN\s+KEY\b")?,
            foreign_key: Regex::new(
                r#"(?is)FOREIGN\s+KEY\s*\(([^)]+)\)\s*REFERENCES\s+(?:"?([\w$]+)"?\s*\.\s*)?"?([\w$]+)"?\s*\(([^)]+)\)"#,
            )?,
            not_null: Regex::new(r"(?i)\bNOT\s+NULL\b")?,
        })
    }

    /// 解析表定义体中的各个定义项
    fn parse_body(&self, table: &mut Table, body: &str) {
        for item in split_top_level(body, ',') {
            match self.classify_item(&item) {
                PgItem::Constraint => match self.parse_constraint(&item) {
                    Some(constraint) => table.constraints.push(constraint),
                    None => debug!("无法解析约束，已忽略: {}", item),
                },
                PgItem::Column => match self.parse_column(&item) {
                    Some(column) => table.columns.push(column),
                    None => debug!("无法解析列定义，已忽略: {}", item),
                },
                PgItem::Discarded => debug!("忽略 DBML 不支持的定义项: {}", item),
            }
        }
    }

    /// 表级约束必须带 CONSTRAINT 关键字或以约束关键字开头，列级简写保留为列属性
    fn classify_item(&self, item: &str) -> PgItem {
        let masked = mask_literals(item).to_ascii_uppercase();
        let words = split_words(&masked);
        let first = words
            .first()
            .and_then(|w| w.split('(').next())
            .unwrap_or_default();
        let second = words
            .get(1)
            .and_then(|w| w.split('(').next())
            .unwrap_or_default();

        match (first, second) {
            ("CONSTRAINT", _) => {
                if self.primary_key.is_match(&masked)
                    || self.unique.is_match(&masked)
                    || self.foreign_keyword.is_match(&masked)
                {
                    PgItem::Constraint
                } else {
                    PgItem::Discarded
                }
            }
            ("PRIMARY", "KEY") | ("FOREIGN", "KEY") | ("UNIQUE", _) => PgItem::Constraint,
            ("CHECK" | "EXCLUDE" | "LIKE", _) => PgItem::Discarded,
            _ => PgItem::Column,
        }
    }

    fn parse_constraint(&self, item: &str) -> Option<Constraint> {
        let masked = mask_literals(item);

        if self.foreign_keyword.is_match(&masked) {
            let captures = self.foreign_key.captures(item)?;
            return Some(Constraint::ForeignKey {
                columns: identifier_list(captures.get(1)?.as_str()),
                ref_schema: captures.get(2).map(|m| clean_identifier(m.as_str())),
                ref_table: clean_identifier(captures.get(3)?.as_str()),
                ref_columns: identifier_list(captures.get(4)?.as_str()),
            });
        }

        if let Some(found) = self.primary_key.find(&masked) {
            let columns = columns_after(item, found.end());
            return (!columns.is_empty()).then_some(Constraint::PrimaryKey { columns });
        }

        if let Some(found) = self.unique.find(&masked) {
            let columns = columns_after(item, found.end());
            return (!columns.is_empty()).then_some(Constraint::Unique { columns });
        }

        None
    }

    /// 按空白切词，连续单词累积为多词类型，直到遇到子句关键字
    fn parse_column(&self, item: &str) -> Option<Column> {
        let words = split_words(item);
        if words.len() < 2 {
            return None;
        }

        let name = clean_identifier(&words[0]);
        if name.is_empty() {
            return None;
        }

        let type_end = words[1..]
            .iter()
            .position(|w| is_clause_keyword(w))
            .map(|p| p + 1)
            .unwrap_or(words.len());
        if type_end == 1 {
            return None;
        }

        let (data_type, size) = normalize_type(&words[1..type_end].join(" "));
        let mut column = Column::new(name, data_type);
        column.size = size;

        let rest = &words[type_end..];
        let rest_text = mask_literals(&rest.join(" "));
        column.nullable = !self.not_null.is_match(&rest_text);
        column.primary_key = self.primary_key.is_match(&rest_text);
        column.unique = self.unique.is_match(&rest_text);
        column.auto_increment = column.data_type.ends_with("SERIAL");

        if let Some(raw) = rest
            .iter()
            .position(|w| w.eq_ignore_ascii_case("DEFAULT"))
            .and_then(|p| rest.get(p + 1))
        {
            if raw.to_ascii_lowercase().contains("nextval(") {
                // 序列默认值在 DBML 中没有对应字面量
                column.auto_increment = true;
            } else {
                column.default_value = Some(normalize_default(raw));
            }
        }

        Some(column)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum PgItem {
    Column,
    Constraint,
    Discarded,
}

impl TableExtractor for PostgreSqlExtractor {
    fn extract(&self, content: &str) -> Result<TableMap> {
        let mut tables = TableMap::new();
        let masked = mask_literals(content);
        let mut position = 0;

        while let Some(captures) = self.create_table.captures_at(content, position) {
            let Some(header) = captures.get(0) else {
                break;
            };
            position = header.end();

            // 注释或字符串中的 CREATE TABLE 不处理
            if !masked[header.start()..].starts_with(|c: char| c.eq_ignore_ascii_case(&'c')) {
                continue;
            }

            let open = header.end() - 1;
            let Some(close) = matching_paren(content, open) else {
                debug!("CREATE TABLE 括号不匹配，跳过");
                continue;
            };
            position = close + 1;

            let Some(name) = captures.get(2).map(|m| clean_identifier(m.as_str())) else {
                continue;
            };
            let mut table = Table::new(name);
            table.schema = captures.get(1).map(|m| clean_identifier(m.as_str()));
            self.parse_body(&mut table, &content[open + 1..close]);

            if table.columns.is_empty() {
                debug!("表 {} 没有可识别的列，跳过", table.name);
                continue;
            }

            table.apply_primary_key();
            debug!(
                "解析表: {} ({} 列, {} 个约束)",
                table.name,
                table.columns.len(),
                table.constraints.len()
            );
            tables.insert(table.name.clone(), table);
        }

        debug!("成功解析 {} 个表", tables.len());
        Ok(tables)
    }
}

fn is_clause_keyword(word: &str) -> bool {
    let head = word.split('(').next().unwrap_or_default();
    CLAUSE_KEYWORDS
        .iter()
        .any(|keyword| head.eq_ignore_ascii_case(keyword))
}

/// 规范化类型：括号内参数作为 size，其余部分查表映射
pub(crate) fn normalize_type(raw: &str) -> (String, Option<String>) {
    let (base, size) = match first_group_from(raw, 0) {
        Some((open, close)) => (
            format!("{} {}", &raw[..open], &raw[close + 1..]),
            Some(raw[open + 1..close].trim().to_string()),
        ),
        None => (raw.to_string(), None),
    };

    let base = base.split_whitespace().collect::<Vec<_>>().join(" ");
    let lowered = base.to_lowercase();
    let canonical = TYPE_MAPPING
        .iter()
        .find(|(spelling, _)| *spelling == lowered)
        .map(|(_, canonical)| canonical.to_string())
        .unwrap_or_else(|| base.to_uppercase());

    (canonical, size)
}

/// 交替去掉外层括号与顶层 `::类型` 转换直到不再变化，再去掉引号
fn normalize_default(raw: &str) -> String {
    let mut value = raw.trim().to_string();

    loop {
        let before = value.len();

        let wrapped = value.starts_with('(')
            && matching_paren(&value, 0).is_some_and(|close| close == value.len() - 1);
        if wrapped {
            value = value[1..value.len() - 1].trim().to_string();
        }
        if let Some(cast) = top_level_cast(&value) {
            value.truncate(cast);
            value = value.trim_end().to_string();
        }

        if value.len() == before {
            break;
        }
    }

    unquote_literal(&value)
}

/// 括号深度 0 且不在字面量中的第一个 `::`
fn top_level_cast(value: &str) -> Option<usize> {
    let mut scanned = Scanner::new(value).peekable();
    while let Some(current) = scanned.next() {
        if current.is_code() && current.depth == 0 && current.ch == ':' {
            if let Some(next) = scanned.peek() {
                if next.is_code() && next.ch == ':' {
                    return Some(current.index);
                }
            }
        }
    }
    None
}

fn columns_after(item: &str, from: usize) -> Vec<String> {
    first_group_from(item, from)
        .map(|(open, close)| identifier_list(&item[open + 1..close]))
        .unwrap_or_default()
}

fn identifier_list(list: &str) -> Vec<String> {
    split_top_level(list, ',')
        .iter()
        .map(|c| clean_identifier(c))
        .filter(|c| !c.is_empty())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_multi_word_types() {
        assert_eq!(
            normalize_type("character varying(255)"),
            ("VARCHAR".to_string(), Some("255".to_string()))
        );
        assert_eq!(
            normalize_type("timestamp(6) without time zone"),
            ("TIMESTAMP".to_string(), Some("6".to_string()))
        );
        assert_eq!(normalize_type("citext"), ("CITEXT".to_string(), None));
    }

    #[test]
    fn test_normalize_default_strips_cast() {
        assert_eq!(normalize_default("'draft'::character varying"), "draft");
        assert_eq!(normalize_default("('0'::numeric)"), "0");
        assert_eq!(normalize_default("'it''s'::text"), "it's");
        assert_eq!(normalize_default("now()"), "now()");
        assert_eq!(normalize_default("(1)::integer"), "1");
        assert_eq!(normalize_default("('x::y'::text)"), "x::y");
    }

    #[test]
    fn test_column_level_shorthand_stays_attribute() {
        let extractor = PostgreSqlExtractor::new().unwrap();
        assert_eq!(extractor.classify_item("id integer PRIMARY KEY"), PgItem::Column);
        assert_eq!(
            extractor.classify_item("CONSTRAINT users_pkey PRIMARY KEY (id)"),
            PgItem::Constraint
        );
        assert_eq!(
            extractor.classify_item("CONSTRAINT positive CHECK (price > 0)"),
            PgItem::Discarded
        );
    }
}
