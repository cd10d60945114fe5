use crate::cli::Commands;
use crate::commands;
use anyhow::{Context, Result};
use dbml_core::config::parse_dialect_setting;
use dbml_core::{AppConfig, Dialect};
use std::path::Path;

pub struct CliApp {
    pub config: AppConfig,
    pub verbose: bool,
}

impl CliApp {
    /// 加载指定的配置文件；未指定时智能查找，找不到则使用默认配置
    pub fn new(config_path: Option<&Path>, verbose: bool) -> Result<Self> {
        let config = match config_path {
            Some(path) => AppConfig::load_from_file(path)
                .with_context(|| format!("加载配置文件失败: {}", path.display()))?,
            None => AppConfig::find_and_load_config().context("加载配置文件失败")?,
        };

        Ok(Self { config, verbose })
    }

    /// 命令行 `--dialect` 优先于配置文件，`auto` 表示按文件内容检测
    pub fn resolve_dialect(&self, flag: Option<&str>) -> Result<Option<Dialect>> {
        let dialect = match flag {
            Some(value) => parse_dialect_setting(value),
            None => self.config.dialect_override(),
        };
        dialect.context("无效的方言设置")
    }

    /// 运行应用命令
    pub fn run(&self, command: Commands) -> Result<()> {
        match command {
            Commands::Convert {
                root,
                dry_run,
                dialect,
                no_fix,
            } => commands::run_convert(self, &root, dry_run, dialect.as_deref(), no_fix),
            Commands::File {
                path,
                schema,
                dialect,
                output,
                no_fix,
            } => commands::run_file(
                self,
                &path,
                schema.as_deref(),
                dialect.as_deref(),
                output.as_deref(),
                no_fix,
            ),
            Commands::Inspect { path, dialect } => {
                commands::run_inspect(self, &path, dialect.as_deref())
            }
            Commands::Scan { root } => commands::run_scan(self, &root),
            Commands::Init { .. } => unreachable!(), // 已经在 main.rs 中处理
        }
    }
}
