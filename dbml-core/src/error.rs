use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConvertError>;

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error("配置文件解析错误: {0}")]
    ConfigParse(#[from] toml::de::Error),

    #[error("配置文件序列化错误: {0}")]
    ConfigWrite(#[from] toml::ser::Error),

    #[error("配置错误: {0}")]
    Config(String),

    #[error("IO 错误: {0}")]
    Io(#[from] std::io::Error),

    #[error("序列化错误: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("无法解码文件 {path}，已尝试的编码: {tried:?}")]
    Decode { path: PathBuf, tried: Vec<String> },

    #[error("不支持的 SQL 方言: {0}")]
    UnknownDialect(String),

    #[error("正则表达式编译失败: {0}")]
    Regex(#[from] regex::Error),

    #[error("自定义错误: {0}")]
    Custom(String),
}

impl ConvertError {
    pub fn custom(msg: impl Into<String>) -> Self {
        Self::Custom(msg.into())
    }

    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn decode(path: impl Into<PathBuf>, tried: &[String]) -> Self {
        Self::Decode {
            path: path.into(),
            tried: tried.to_vec(),
        }
    }
}
