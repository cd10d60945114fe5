use crate::constants::{config, input, scan};
use crate::ddl::Dialect;
use crate::error::{ConvertError, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::str::FromStr;

/// 应用配置结构
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub output: OutputConfig,
    pub scan: ScanConfig,
}

/// 输入相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct InputConfig {
    /// 编码尝试顺序
    pub encodings: Vec<String>,
    /// `auto`、`mysql` 或 `postgresql`
    pub dialect: String,
}

/// 输出相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct OutputConfig {
    /// 复合外键拆分为逐列关系
    pub decompose_composite_refs: bool,
    /// 生成后补全缺失列
    pub fix_missing_columns: bool,
}

/// 目录扫描相关配置
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(default)]
pub struct ScanConfig {
    pub database_prefixes: Vec<String>,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            encodings: input::DEFAULT_ENCODINGS.iter().map(|e| e.to_string()).collect(),
            dialect: config::DIALECT_AUTO.to_string(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            decompose_composite_refs: true,
            fix_missing_columns: true,
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            database_prefixes: scan::DATABASE_PREFIXES
                .iter()
                .map(|p| p.to_string())
                .collect(),
        }
    }
}

impl AppConfig {
    /// 智能查找并加载配置文件
    /// 按优先级查找：ddl2dbml.toml -> .ddl2dbml.toml，都不存在时使用默认配置
    pub fn find_and_load_config() -> Result<Self> {
        for config_file in config::CONFIG_FILE_NAMES {
            if Path::new(config_file).exists() {
                tracing::info!("找到配置文件: {}", config_file);
                return Self::load_from_file(config_file);
            }
        }

        tracing::debug!("未找到配置文件，使用默认配置");
        Ok(Self::default())
    }

    /// 从指定文件加载配置
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        config.validate()?;

        Ok(config)
    }

    /// 保存配置到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = self.to_toml_with_comments();
        fs::write(&path, content)?;
        Ok(())
    }

    /// 生成带注释的TOML配置
    fn to_toml_with_comments(&self) -> String {
        const TEMPLATE: &str = include_str!("../templates/config.toml.template");

        TEMPLATE
            .replace("{encodings}", &toml_array(&self.input.encodings))
            .replace("{dialect}", &self.input.dialect)
            .replace(
                "{decompose_composite_refs}",
                &self.output.decompose_composite_refs.to_string(),
            )
            .replace(
                "{fix_missing_columns}",
                &self.output.fix_missing_columns.to_string(),
            )
            .replace(
                "{database_prefixes}",
                &toml_array(&self.scan.database_prefixes),
            )
    }

    /// 校验配置取值
    pub fn validate(&self) -> Result<()> {
        if self.input.encodings.is_empty() {
            return Err(ConvertError::config("input.encodings 不能为空"));
        }
        self.dialect_override()?;
        Ok(())
    }

    /// 配置中指定的方言，`auto` 时返回 None
    pub fn dialect_override(&self) -> Result<Option<Dialect>> {
        parse_dialect_setting(&self.input.dialect)
    }
}

/// 解析方言设置：`auto` 表示自动检测
pub fn parse_dialect_setting(value: &str) -> Result<Option<Dialect>> {
    if value.trim().eq_ignore_ascii_case(config::DIALECT_AUTO) {
        Ok(None)
    } else {
        Dialect::from_str(value).map(Some)
    }
}

/// 渲染为 TOML 行内数组
fn toml_array(values: &[String]) -> String {
    toml::Value::Array(values.iter().cloned().map(toml::Value::String).collect()).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_config() {
        let config = AppConfig::default();
        assert_eq!(config.input.encodings, vec!["utf-8", "euc-kr", "latin1"]);
        assert_eq!(config.input.dialect, "auto");
        assert!(config.output.decompose_composite_refs);
        assert!(config.output.fix_missing_columns);
        assert!(config.scan.database_prefixes.contains(&"supabase-".to_string()));
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddl2dbml.toml");

        let mut config = AppConfig::default();
        config.input.dialect = "postgresql".to_string();
        config.output.fix_missing_columns = false;
        config.save_to_file(&path).unwrap();

        let content = fs::read_to_string(&path).unwrap();
        assert!(content.contains("# "), "配置文件应包含注释");

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, config);
    }

    #[test]
    fn test_partial_config_uses_defaults() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("partial.toml");
        fs::write(&path, "[output]\ndecompose_composite_refs = false\n").unwrap();

        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert!(!loaded.output.decompose_composite_refs);
        assert!(loaded.output.fix_missing_columns, "缺省字段应使用默认值");
        assert_eq!(loaded.input, InputConfig::default());
    }

    #[test]
    fn test_invalid_dialect_is_rejected() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("bad.toml");
        fs::write(&path, "[input]\ndialect = \"oracle\"\n").unwrap();

        let result = AppConfig::load_from_file(&path);
        assert!(matches!(result, Err(ConvertError::UnknownDialect(_))));
    }

    #[test]
    fn test_dialect_setting() {
        assert_eq!(parse_dialect_setting("auto").unwrap(), None);
        assert_eq!(
            parse_dialect_setting("PostgreSQL").unwrap(),
            Some(Dialect::PostgreSql)
        );
    }
}
