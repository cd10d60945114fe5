//! 补全缺失列：用宽松的规则重新扫描源 DDL，把主解析遗漏的列补回 DBML

use super::generator::{ColumnAttributes, map_type};
use super::literal::{escape_enum_values, escape_identifier};
use crate::constants::dbml::RECONCILE_TYPE_MAPPING;
use crate::constants::input::DDL_EXTENSION;
use crate::ddl::clean_identifier;
use crate::ddl::scanner::mask_literals;
use crate::error::Result;
use crate::input::{default_encodings, read_ddl_file};
use regex::Regex;
use std::collections::{HashMap, HashSet};
use std::path::Path;
use tracing::{debug, info};

/// 约束子句会被宽松规则误认成列，这些“类型”直接忽略
const NON_COLUMN_TYPES: &[&str] = &["FOREIGN", "PRIMARY", "UNIQUE", "CHECK", "KEY", "INDEX"];

/// 宽松扫描得到的列
#[derive(Debug, Clone, PartialEq)]
pub struct GroundTruthColumn {
    pub name: String,
    /// 原始类型文本，可能带括号参数
    pub data_type: String,
    pub nullable: bool,
    pub auto_increment: bool,
    pub default_value: Option<String>,
}

/// 使用默认编码列表补全
pub fn reconcile_dbml(dbml: &str, schema_dir: &Path) -> Result<String> {
    Ok(Reconciler::new(&default_encodings())?.reconcile(dbml, schema_dir))
}

/// 缺失列补全器
pub struct Reconciler {
    table_header: Regex,
    column_head: Regex,
    default_value: Regex,
    encodings: Vec<String>,
}

impl Reconciler {
    pub fn new(encodings: &[String]) -> Result<Self> {
        Ok(Self {
            table_header: Regex::new(r"^Table\s+(.+?)\s*\{\s*$")?,
            column_head: Regex::new(r"`([^`]+)`\s+([a-zA-Z]+(?:\([^)]*\))?)\s+")?,
            default_value: Regex::new(r"(?i)DEFAULT\s+([^'\s]+|'[^']*')")?,
            encodings: encodings.to_vec(),
        })
    }

    /// 对每个 `Table` 块查找同名 `.sql` 文件，补全缺失列；目录或文件不存在时原样返回
    pub fn reconcile(&self, dbml: &str, schema_dir: &Path) -> String {
        if !schema_dir.is_dir() {
            return dbml.to_string();
        }

        let lines: Vec<&str> = dbml.split('\n').collect();
        let mut output: Vec<String> = Vec::with_capacity(lines.len());
        let mut index = 0;

        while index < lines.len() {
            let line = lines[index];
            let header = self
                .table_header
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| unquote_name(m.as_str()));
            let block_end = lines[index + 1..]
                .iter()
                .position(|l| l.trim_end() == "}")
                .map(|p| index + 1 + p);

            let (Some(table_name), Some(end)) = (header, block_end) else {
                output.push(line.to_string());
                index += 1;
                continue;
            };

            output.push(line.to_string());
            let body: Vec<String> = lines[index + 1..end].iter().map(|l| l.to_string()).collect();
            match self.patch_table_block(&table_name, body.clone(), schema_dir) {
                Some(patched) => output.extend(patched),
                None => output.extend(body),
            }
            output.push(lines[end].to_string());
            index = end + 1;
        }

        output.join("\n")
    }

    /// 补全单个表块，没有缺失列时返回 None
    fn patch_table_block(
        &self,
        table_name: &str,
        mut body: Vec<String>,
        schema_dir: &Path,
    ) -> Option<Vec<String>> {
        let ddl_path = schema_dir.join(format!("{table_name}.{DDL_EXTENSION}"));
        if !ddl_path.is_file() {
            return None;
        }

        let content = match read_ddl_file(&ddl_path, &self.encodings) {
            Ok(content) => content,
            Err(e) => {
                debug!("读取 {} 失败，跳过补全: {}", ddl_path.display(), e);
                return None;
            }
        };

        let ground_truth = self.extract_ground_truth(&content);
        let present = present_columns(&body);
        let missing: Vec<&GroundTruthColumn> = ground_truth
            .iter()
            .filter(|c| !present.contains(&c.name))
            .collect();
        if missing.is_empty() {
            return None;
        }

        info!(
            "🔧 表 {} 补全缺失列: {}",
            table_name,
            missing
                .iter()
                .map(|c| c.name.as_str())
                .collect::<Vec<_>>()
                .join(", ")
        );

        let new_lines: Vec<String> = missing.iter().map(|c| synthesize_line(c)).collect();
        let insert_at = match body.iter().position(|l| l.trim() == "Indexes {") {
            Some(pos) if pos > 0 && body[pos - 1].trim().is_empty() => pos - 1,
            Some(pos) => pos,
            None => body.len(),
        };
        body.splice(insert_at..insert_at, new_lines);

        let mut case_map: HashMap<String, String> = ground_truth
            .iter()
            .map(|c| (c.name.to_lowercase(), c.name.clone()))
            .collect();
        for name in present_columns(&body) {
            case_map.insert(name.to_lowercase(), name);
        }

        Some(fix_index_column_case(body, &case_map))
    }

    /// 宽松扫描 `` `列名` 类型 属性 `` 形式的列定义
    pub fn extract_ground_truth(&self, content: &str) -> Vec<GroundTruthColumn> {
        let masked = mask_literals(content);
        let mut columns = Vec::new();
        let mut seen = HashSet::new();
        let mut position = 0;

        while let Some(captures) = self.column_head.captures_at(&masked, position) {
            let (Some(head), Some(name), Some(data_type)) =
                (captures.get(0), captures.get(1), captures.get(2))
            else {
                break;
            };

            let Some(end) = attributes_end(&masked, head.end()) else {
                position = head.start() + 1;
                continue;
            };
            position = end;

            let data_type = content[data_type.range()].to_string();
            let base = data_type
                .split('(')
                .next()
                .unwrap_or_default()
                .to_uppercase();
            if NON_COLUMN_TYPES.contains(&base.as_str()) {
                continue;
            }

            let name = clean_identifier(&content[name.range()]);
            if name.is_empty() || !seen.insert(name.clone()) {
                continue;
            }

            let attributes = content[head.end()..end].trim();
            let upper = attributes.to_uppercase();
            let default = self
                .default_value
                .captures(attributes)
                .and_then(|c| c.get(1))
                .map(|m| {
                    let raw = m.as_str();
                    raw.strip_prefix('\'')
                        .and_then(|r| r.strip_suffix('\''))
                        .unwrap_or(raw)
                        .to_string()
                });

            columns.push(GroundTruthColumn {
                name,
                data_type,
                nullable: !upper.contains("NOT NULL"),
                auto_increment: upper.contains("AUTO_INCREMENT"),
                default_value: default,
            });
        }

        columns
    }
}

/// 属性文本的结束位置：下一个逗号，或换行后紧跟约束关键字/右括号
fn attributes_end(masked: &str, start: usize) -> Option<usize> {
    const NEXT_CLAUSE: &[&str] = &["PRIMARY", "UNIQUE", "KEY", "CONSTRAINT", ")"];

    for (offset, ch) in masked[start..].char_indices() {
        let at = start + offset;
        match ch {
            ',' if offset > 0 => return Some(at),
            ',' => return None,
            '\n' if offset > 0 => {
                let rest = masked[at..].trim_start();
                if NEXT_CLAUSE.iter().any(|kw| rest.starts_with(kw)) {
                    return Some(at);
                }
            }
            _ => {}
        }
    }
    None
}

fn synthesize_line(column: &GroundTruthColumn) -> String {
    let (base, size) = match column.data_type.find('(') {
        Some(open) => (&column.data_type[..open], Some(&column.data_type[open..])),
        None => (column.data_type.as_str(), None),
    };
    let upper = base.to_uppercase();
    let mut dbml_type = map_type(&upper, RECONCILE_TYPE_MAPPING);

    if let Some(size) = size {
        let inner = size.trim_start_matches('(').trim_end_matches(')');
        if upper == "ENUM" || upper == "SET" {
            dbml_type.push_str(&format!("({})", escape_enum_values(inner)));
        } else {
            dbml_type.push_str(size);
        }
    }

    let attributes = ColumnAttributes {
        primary_key: false,
        increment: column.auto_increment,
        not_null: !column.nullable,
        unique: false,
        default_value: column.default_value.as_deref().filter(|d| !d.is_empty()),
    };

    format!(
        "  {} {}{}",
        escape_identifier(&column.name),
        dbml_type,
        attributes.render()
    )
}

/// 表块中已存在的列名（`Indexes` 块与注释行除外）
fn present_columns(body: &[String]) -> HashSet<String> {
    let mut names = HashSet::new();
    let mut in_indexes = false;

    for line in body {
        let trimmed = line.trim();
        if trimmed.starts_with("Indexes") {
            in_indexes = true;
            continue;
        }
        if in_indexes {
            if trimmed == "}" {
                in_indexes = false;
            }
            continue;
        }
        if trimmed.is_empty() || trimmed.starts_with("//") {
            continue;
        }
        if let Some(name) = leading_identifier(trimmed) {
            names.insert(name);
        }
    }

    names
}

fn leading_identifier(line: &str) -> Option<String> {
    if let Some(rest) = line.strip_prefix('"') {
        return rest.find('"').map(|end| rest[..end].to_string());
    }
    line.split_whitespace().next().map(str::to_string)
}

fn unquote_name(name: &str) -> String {
    name.trim()
        .strip_prefix('"')
        .and_then(|n| n.strip_suffix('"'))
        .unwrap_or(name.trim())
        .to_string()
}

/// 按声明大小写修正 `Indexes` 块中的列名
fn fix_index_column_case(body: Vec<String>, case_map: &HashMap<String, String>) -> Vec<String> {
    let mut in_indexes = false;

    body.into_iter()
        .map(|line| {
            let trimmed = line.trim();
            if trimmed.starts_with("Indexes") {
                in_indexes = true;
                return line;
            }
            if !in_indexes {
                return line;
            }
            if trimmed == "}" {
                in_indexes = false;
                return line;
            }

            let (Some(open), Some(close)) = (line.find('('), line.rfind(')')) else {
                return line;
            };
            if close < open {
                return line;
            }
            let columns: Vec<String> = line[open + 1..close]
                .split(',')
                .map(|c| {
                    let name = unquote_name(c);
                    case_map
                        .get(&name.to_lowercase())
                        .map(|declared| escape_identifier(declared))
                        .unwrap_or_else(|| c.trim().to_string())
                })
                .collect();
            format!("{}({}){}", &line[..open], columns.join(", "), &line[close + 1..])
        })
        .collect()
}
