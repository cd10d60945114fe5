//! 单遍 SQL 文本扫描器
//!
//! 所有与引号、注释、括号深度相关的判断都集中在这里：
//! 语句切分、定义项切分、括号匹配、字面量屏蔽都基于同一个状态机。

use std::iter::Peekable;
use std::str::CharIndices;

/// 扫描状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    Normal,
    InSingleQuote,
    InDoubleQuote,
    InBacktick,
    InLineComment,
    InBlockComment,
}

impl ScanState {
    fn is_comment(self) -> bool {
        matches!(self, ScanState::InLineComment | ScanState::InBlockComment)
    }
}

/// 扫描得到的单个字符及其上下文
#[derive(Debug, Clone, Copy)]
pub struct Scanned {
    /// 字节偏移
    pub index: usize,
    pub ch: char,
    /// 该字符所属的状态（引号/注释的定界符属于对应的引号/注释状态）
    pub state: ScanState,
    /// 处理完该字符后的括号深度
    pub depth: i32,
}

impl Scanned {
    /// 是否为普通代码字符（不在字面量或注释中）
    pub fn is_code(&self) -> bool {
        self.state == ScanState::Normal
    }
}

pub struct Scanner<'a> {
    chars: Peekable<CharIndices<'a>>,
    state: ScanState,
    depth: i32,
    escape_next: bool,
    block_start: usize,
    closing_block: bool,
}

impl<'a> Scanner<'a> {
    pub fn new(text: &'a str) -> Self {
        Self {
            chars: text.char_indices().peekable(),
            state: ScanState::Normal,
            depth: 0,
            escape_next: false,
            block_start: 0,
            closing_block: false,
        }
    }

    fn peek_char(&mut self) -> Option<char> {
        self.chars.peek().map(|(_, c)| *c)
    }

    fn step_quote(&mut self, ch: char, quote: char, state: ScanState) -> ScanState {
        if self.escape_next {
            self.escape_next = false;
        } else if ch == '\\' && quote != '`' {
            self.escape_next = true;
        } else if ch == quote {
            self.state = ScanState::Normal;
        }
        state
    }
}

impl Iterator for Scanner<'_> {
    type Item = Scanned;

    fn next(&mut self) -> Option<Scanned> {
        let (index, ch) = self.chars.next()?;

        let state = match self.state {
            ScanState::Normal => match ch {
                '\'' => {
                    self.state = ScanState::InSingleQuote;
                    ScanState::InSingleQuote
                }
                '"' => {
                    self.state = ScanState::InDoubleQuote;
                    ScanState::InDoubleQuote
                }
                '`' => {
                    self.state = ScanState::InBacktick;
                    ScanState::InBacktick
                }
                // MySQL 允许 `#` 单行注释
                '#' => {
                    self.state = ScanState::InLineComment;
                    ScanState::InLineComment
                }
                '-' if self.peek_char() == Some('-') => {
                    self.state = ScanState::InLineComment;
                    ScanState::InLineComment
                }
                '/' if self.peek_char() == Some('*') => {
                    self.state = ScanState::InBlockComment;
                    self.block_start = index;
                    self.closing_block = false;
                    ScanState::InBlockComment
                }
                '(' => {
                    self.depth += 1;
                    ScanState::Normal
                }
                ')' => {
                    self.depth -= 1;
                    ScanState::Normal
                }
                _ => ScanState::Normal,
            },
            ScanState::InSingleQuote => self.step_quote(ch, '\'', ScanState::InSingleQuote),
            ScanState::InDoubleQuote => self.step_quote(ch, '"', ScanState::InDoubleQuote),
            ScanState::InBacktick => self.step_quote(ch, '`', ScanState::InBacktick),
            ScanState::InLineComment => {
                if ch == '\n' {
                    self.state = ScanState::Normal;
                    ScanState::Normal
                } else {
                    ScanState::InLineComment
                }
            }
            ScanState::InBlockComment => {
                if self.closing_block && ch == '/' {
                    self.state = ScanState::Normal;
                    self.closing_block = false;
                } else if ch == '*' && index > self.block_start + 1 && self.peek_char() == Some('/')
                {
                    self.closing_block = true;
                }
                ScanState::InBlockComment
            }
        };

        Some(Scanned {
            index,
            ch,
            state,
            depth: self.depth,
        })
    }
}

/// 在顶层（括号深度 0、不在字面量/注释中）按分隔符切分文本，注释内容被丢弃
pub fn split_top_level(text: &str, separator: char) -> Vec<String> {
    split_items(text, separator, false)
}

/// 切分表定义体中的各个定义项
///
/// 除了 `split_top_level` 的规则外，还跟踪 `COMMENT` 子句：
/// 从关键字出现到其后的字面量结束之间不会切分。
pub fn split_definition_items(body: &str) -> Vec<String> {
    split_items(body, ',', true)
}

fn split_items(text: &str, separator: char, track_comment_literal: bool) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_comment_clause = false;
    let mut comment_literal_seen = false;
    let mut previous_was_comment = false;

    for scanned in Scanner::new(text) {
        if scanned.state.is_comment() {
            if !previous_was_comment {
                current.push(' ');
            }
            previous_was_comment = true;
            continue;
        }
        previous_was_comment = false;

        if track_comment_literal {
            let in_literal = matches!(
                scanned.state,
                ScanState::InSingleQuote | ScanState::InDoubleQuote
            );
            if in_comment_clause {
                if in_literal {
                    comment_literal_seen = true;
                } else if comment_literal_seen {
                    in_comment_clause = false;
                    comment_literal_seen = false;
                }
            } else if scanned.is_code() && starts_comment_clause(text, scanned.index) {
                in_comment_clause = true;
            }
        }

        if scanned.is_code()
            && scanned.ch == separator
            && scanned.depth == 0
            && !in_comment_clause
        {
            push_item(&mut items, &current);
            current.clear();
            continue;
        }

        current.push(scanned.ch);
    }

    push_item(&mut items, &current);
    items
}

fn push_item(items: &mut Vec<String>, current: &str) {
    let trimmed = current.trim();
    if !trimmed.is_empty() {
        items.push(trimmed.to_string());
    }
}

/// `index` 处是否为 `COMMENT [=] '...'` 子句的开头
fn starts_comment_clause(text: &str, index: usize) -> bool {
    const KEYWORD: &str = "COMMENT";
    if !starts_keyword(text, index, KEYWORD) {
        return false;
    }
    let rest = text[index + KEYWORD.len()..].trim_start();
    let rest = rest.strip_prefix('=').map(str::trim_start).unwrap_or(rest);
    rest.starts_with('\'') || rest.starts_with('"')
}

/// 判断 `index` 处是否以完整单词形式出现关键字（大小写不敏感）
pub fn starts_keyword(text: &str, index: usize, keyword: &str) -> bool {
    let Some(candidate) = text.get(index..index + keyword.len()) else {
        return false;
    };
    if !candidate.eq_ignore_ascii_case(keyword) {
        return false;
    }
    let before_ok = text[..index]
        .chars()
        .next_back()
        .is_none_or(|c| !is_word_char(c));
    let after_ok = text[index + keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !is_word_char(c));
    before_ok && after_ok
}

pub fn is_word_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '$'
}

/// 从 `open` 处的 `(` 开始查找与之匹配的 `)`，返回其字节偏移
pub fn matching_paren(text: &str, open: usize) -> Option<usize> {
    if !text[open..].starts_with('(') {
        return None;
    }
    for scanned in Scanner::new(&text[open..]) {
        if scanned.is_code() && scanned.ch == ')' && scanned.depth == 0 {
            return Some(open + scanned.index);
        }
    }
    None
}

/// 从 `from` 开始的第一个代码级 `(`，返回括号组 `(start, end)` 的偏移
pub fn first_group_from(text: &str, from: usize) -> Option<(usize, usize)> {
    let tail = text.get(from..)?;
    let open = Scanner::new(tail)
        .find(|s| s.is_code() && s.ch == '(')
        .map(|s| from + s.index)?;
    let close = matching_paren(text, open)?;
    Some((open, close))
}

/// 将字面量内容与注释替换为空格，保持字节长度与偏移不变
///
/// 引号定界符保留，便于后续正则仍能看到字面量的位置。
pub fn mask_literals(text: &str) -> String {
    let mut masked = String::with_capacity(text.len());
    for scanned in Scanner::new(text) {
        let keep = match scanned.state {
            ScanState::Normal => true,
            ScanState::InSingleQuote => scanned.ch == '\'',
            ScanState::InDoubleQuote => scanned.ch == '"',
            ScanState::InBacktick => true,
            ScanState::InLineComment | ScanState::InBlockComment => scanned.ch == '\n',
        };
        if keep {
            masked.push(scanned.ch);
        } else {
            masked.extend(std::iter::repeat_n(' ', scanned.ch.len_utf8()));
        }
    }
    masked
}

/// 第一个代码级 `(` 之前的文本，字面量、引号标识符与注释的内容替换为空格
///
/// 字节偏移与原文一致，用于在定义项开头查找关键字，避免命中索引名中的单词。
pub fn keyword_prefix(text: &str) -> String {
    let mut prefix = String::with_capacity(text.len());
    for scanned in Scanner::new(text) {
        if scanned.is_code() && scanned.ch == '(' {
            break;
        }
        let keep = match scanned.state {
            ScanState::Normal => true,
            ScanState::InSingleQuote => scanned.ch == '\'',
            ScanState::InDoubleQuote => scanned.ch == '"',
            ScanState::InBacktick => scanned.ch == '`',
            ScanState::InLineComment | ScanState::InBlockComment => false,
        };
        if keep {
            prefix.push(scanned.ch);
        } else {
            prefix.extend(std::iter::repeat_n(' ', scanned.ch.len_utf8()));
        }
    }
    prefix
}

/// 按空白切分单词，引号与括号内的空白不切分
pub fn split_words(text: &str) -> Vec<String> {
    let mut words = Vec::new();
    let mut current = String::new();

    for scanned in Scanner::new(text) {
        if scanned.state.is_comment() {
            continue;
        }
        if scanned.is_code() && scanned.depth == 0 && scanned.ch.is_whitespace() {
            push_item(&mut words, &current);
            current.clear();
            continue;
        }
        current.push(scanned.ch);
    }
    push_item(&mut words, &current);
    words
}
