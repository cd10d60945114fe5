//! 默认值字面量与标识符的 DBML 表示

use std::fmt::Write as _;

/// 默认值的分类结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiteralKind {
    /// 当前时间函数，输出 `` `now()` ``
    Now,
    Null,
    DateTime,
    IpAddress,
    Number,
    Boolean,
    Text,
}

/// 按顺序匹配的判定表，先命中者生效，都不命中时为 Text
const DECISION_TABLE: &[(LiteralKind, fn(&str) -> bool)] = &[
    (LiteralKind::Now, is_current_timestamp),
    (LiteralKind::Null, is_null),
    (LiteralKind::DateTime, is_date_time),
    (LiteralKind::IpAddress, is_ip_address),
    (LiteralKind::Number, is_number),
    (LiteralKind::Boolean, is_boolean),
];

pub fn classify_default(value: &str) -> LiteralKind {
    DECISION_TABLE
        .iter()
        .find(|(_, matches)| matches(value))
        .map(|(kind, _)| *kind)
        .unwrap_or(LiteralKind::Text)
}

/// 将原始默认值格式化为 DBML `default:` 之后的字面量
pub fn format_default(value: &str) -> String {
    match classify_default(value) {
        LiteralKind::Now => "`now()`".to_string(),
        LiteralKind::Null => "null".to_string(),
        LiteralKind::DateTime | LiteralKind::IpAddress => format!("'{value}'"),
        LiteralKind::Number => value.to_string(),
        LiteralKind::Boolean => value.to_ascii_lowercase(),
        LiteralKind::Text => format!("'{}'", escape_string_value(value)),
    }
}

fn is_current_timestamp(value: &str) -> bool {
    let upper = value.trim().to_ascii_uppercase();
    if upper == "CURRENT_TIMESTAMP" || upper == "NOW()" || upper == "CURRENT_TIMESTAMP()" {
        return true;
    }
    // CURRENT_TIMESTAMP(3) 等带精度写法
    upper
        .strip_prefix("CURRENT_TIMESTAMP(")
        .and_then(|rest| rest.strip_suffix(')'))
        .is_some_and(|precision| precision.chars().all(|c| c.is_ascii_digit()))
}

fn is_null(value: &str) -> bool {
    value.eq_ignore_ascii_case("NULL")
}

/// `YYYY-MM-DD`、`YYYY-MM-DD HH:MM:SS`、`HH:MM:SS`
fn is_date_time(value: &str) -> bool {
    let bytes = value.as_bytes();
    let digits = |range: std::ops::Range<usize>| bytes[range].iter().all(u8::is_ascii_digit);
    let is_date = |b: &[u8]| b.len() >= 10 && b[4] == b'-' && b[7] == b'-';
    let is_time = |start: usize| {
        bytes[start + 2] == b':'
            && bytes[start + 5] == b':'
            && digits(start..start + 2)
            && digits(start + 3..start + 5)
            && digits(start + 6..start + 8)
    };

    match bytes.len() {
        8 => is_time(0),
        10 => is_date(bytes) && digits(0..4) && digits(5..7) && digits(8..10),
        19 => {
            is_date(bytes)
                && digits(0..4)
                && digits(5..7)
                && digits(8..10)
                && bytes[10] == b' '
                && is_time(11)
        }
        _ => false,
    }
}

/// 完整或不完整的点分 IPv4 形式，每段 0-255
fn is_ip_address(value: &str) -> bool {
    let parts: Vec<&str> = value.split('.').collect();
    (2..=4).contains(&parts.len())
        && parts.iter().all(|part| {
            (1..=3).contains(&part.len())
                && part.bytes().all(|b| b.is_ascii_digit())
                && part.parse::<u16>().is_ok_and(|n| n <= 255)
        })
}

/// 纯数字，或仅由数字和点组成且含点
fn is_number(value: &str) -> bool {
    if value.is_empty() {
        return false;
    }
    let all_digits = value.bytes().all(|b| b.is_ascii_digit());
    let dotted = value.contains('.')
        && value.bytes().any(|b| b.is_ascii_digit())
        && value.bytes().all(|b| b.is_ascii_digit() || b == b'.');
    all_digits || dotted
}

fn is_boolean(value: &str) -> bool {
    value.eq_ignore_ascii_case("true") || value.eq_ignore_ascii_case("false")
}

/// 转义单引号字符串中的特殊字符，控制字符输出为 `\xHH`
pub fn escape_string_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '\\' => escaped.push_str("\\\\"),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            c if c.is_ascii_control() => {
                let _ = write!(escaped, "\\x{:02x}", c as u32);
            }
            c => escaped.push(c),
        }
    }
    escaped
}

/// 含空格或 `- . / \ ( ) [ ]` 的名称需要加双引号
pub fn escape_identifier(name: &str) -> String {
    const SPECIAL: &[char] = &[' ', '-', '.', '/', '\\', '(', ')', '[', ']'];
    if name.contains(SPECIAL) {
        format!("\"{name}\"")
    } else {
        name.to_string()
    }
}

/// 逐个转义 ENUM/SET 值列表中的值
pub fn escape_enum_values(size: &str) -> String {
    let values = crate::ddl::scanner::split_top_level(size, ',');
    let quoted = values
        .iter()
        .all(|v| v.len() >= 2 && v.starts_with('\'') && v.ends_with('\''));
    if values.is_empty() || !quoted {
        return size.to_string();
    }

    values
        .iter()
        .map(|v| format!("'{}'", escape_string_value(&crate::ddl::unquote_literal(v))))
        .collect::<Vec<_>>()
        .join(",")
}
