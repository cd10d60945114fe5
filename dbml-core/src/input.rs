//! DDL 文件读取：按编码列表依次尝试解码

use crate::constants::input::DEFAULT_ENCODINGS;
use crate::error::{ConvertError, Result};
use encoding_rs::Encoding;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};

/// 默认编码列表
pub fn default_encodings() -> Vec<String> {
    DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect()
}

/// 读取 DDL 文件，返回第一个无替换字符解码成功的文本
pub fn read_ddl_file<P: AsRef<Path>>(path: P, encodings: &[String]) -> Result<String> {
    let path = path.as_ref();
    let bytes = fs::read(path)?;

    match decode_with_fallback(&bytes, encodings) {
        Some((text, label)) => {
            debug!("使用 {} 编码读取文件: {}", label, path.display());
            Ok(text)
        }
        None => Err(ConvertError::decode(path, encodings)),
    }
}

/// 按顺序尝试编码，返回解码文本和命中的编码标签
pub fn decode_with_fallback(bytes: &[u8], encodings: &[String]) -> Option<(String, String)> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF".as_slice()).unwrap_or(bytes);

    for label in encodings {
        let Some(encoding) = Encoding::for_label(label.trim().as_bytes()) else {
            warn!("未知的编码标签，已跳过: {}", label);
            continue;
        };

        if let Some(text) = encoding.decode_without_bom_handling_and_without_replacement(bytes) {
            return Some((text.into_owned(), label.clone()));
        }
    }

    None
}
