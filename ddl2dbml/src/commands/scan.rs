use crate::app::CliApp;
use crate::scanner::DirectoryScanner;
use anyhow::Result;
use std::path::Path;
use tracing::{info, warn};

/// `scan` 命令：只显示扫描结果
pub fn run_scan(app: &CliApp, root: &Path) -> Result<()> {
    let scanner = DirectoryScanner::new(root, &app.config.scan.database_prefixes);
    let databases = scanner.scan_databases()?;

    if databases.is_empty() {
        warn!(
            "⚠️  没有找到数据库目录，支持的前缀: {}",
            app.config.scan.database_prefixes.join(", ")
        );
        return Ok(());
    }

    scanner.print_scan_summary(&databases);
    for (db_name, schemas) in &databases {
        for schema_name in schemas.keys() {
            info!(
                "输出路径: {}",
                scanner.output_path(db_name, schema_name).display()
            );
        }
    }
    Ok(())
}
