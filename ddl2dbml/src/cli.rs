use crate::project_info::{metadata, version_info};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// DDL2DBML - DDL 导出到 DBML 的转换工具
#[derive(Parser, Debug)]
#[command(name = "ddl2dbml")]
#[command(about = metadata::PROJECT_DESCRIPTION)]
#[command(version = version_info::CLI_VERSION)]
#[command(long_about = metadata::display::DESCRIPTION_LONG)]
#[command(author = metadata::PROJECT_AUTHORS)]
pub struct Cli {
    /// 配置文件路径（默认依次查找 ddl2dbml.toml、.ddl2dbml.toml）
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// 详细输出
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// 扫描数据库目录，为每个 schema 生成 DBML 文件
    Convert {
        /// 扫描的根目录
        #[arg(default_value = ".")]
        root: PathBuf,
        /// 只模拟，不写文件
        #[arg(long)]
        dry_run: bool,
        /// SQL 方言：auto、mysql、postgresql（覆盖配置文件）
        #[arg(long)]
        dialect: Option<String>,
        /// 不补全缺失列
        #[arg(long)]
        no_fix: bool,
    },
    /// 转换单个 DDL 文件
    File {
        /// DDL 文件路径
        path: PathBuf,
        /// 作为 Project 名称的 schema 名
        #[arg(long)]
        schema: Option<String>,
        /// SQL 方言：auto、mysql、postgresql（覆盖配置文件）
        #[arg(long)]
        dialect: Option<String>,
        /// 输出文件，不指定时写到标准输出
        #[arg(short, long)]
        output: Option<PathBuf>,
        /// 不补全缺失列
        #[arg(long)]
        no_fix: bool,
    },
    /// 以 JSON 输出抽取到的表结构
    Inspect {
        /// DDL 文件路径
        path: PathBuf,
        /// SQL 方言：auto、mysql、postgresql（覆盖配置文件）
        #[arg(long)]
        dialect: Option<String>,
    },
    /// 显示目录扫描结果
    Scan {
        /// 扫描的根目录
        #[arg(default_value = ".")]
        root: PathBuf,
    },
    /// 生成默认配置文件
    Init {
        /// 如果配置文件已存在，强制覆盖
        #[arg(long)]
        force: bool,
    },
}
