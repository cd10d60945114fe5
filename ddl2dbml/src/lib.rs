// 私有模块声明
mod app;
mod cli;
mod commands;
mod init;
pub mod project_info;
pub mod scanner;
mod utils;

// 通过 pub use 精确控制对外暴露的接口
pub use app::CliApp;
pub use cli::{Cli, Commands};
pub use commands::{ConversionStats, SchemaConverter, convert_all, convert_file};
pub use init::run_init;
pub use scanner::{DatabaseInfo, DirectoryScanner};
pub use utils::setup_logging;
