use crate::app::CliApp;
use crate::scanner::{DatabaseInfo, DirectoryScanner, SchemaMap};
use anyhow::{Context, Result, bail};
use dbml_core::{
    AppConfig, DbmlOptions, Dialect, Reconciler, TableMap, convert_tables_to_dbml_with_options,
    parse_ddl_file,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// 批量转换统计
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ConversionStats {
    pub databases_processed: usize,
    pub schemas_processed: usize,
    pub tables_processed: usize,
    pub files_created: usize,
    pub errors: Vec<String>,
}

impl ConversionStats {
    pub fn is_success(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn print_summary(&self) {
        info!("{}", "=".repeat(50));
        info!("📊 转换完成摘要");
        info!("{}", "=".repeat(50));
        info!("处理的数据库: {} 个", self.databases_processed);
        info!("处理的 schema: {} 个", self.schemas_processed);
        info!("处理的表: {} 张", self.tables_processed);
        info!("生成的 DBML 文件: {} 个", self.files_created);

        if self.errors.is_empty() {
            info!("🎉 全部转换成功完成！");
        } else {
            warn!("⚠️  错误: {} 个", self.errors.len());
            for error in &self.errors {
                warn!("  - {}", error);
            }
        }
    }
}

/// 解析、生成与补全的组合，批量转换和单文件转换共用
pub struct SchemaConverter {
    encodings: Vec<String>,
    dialect: Option<Dialect>,
    decompose_composite_refs: bool,
    reconciler: Option<Reconciler>,
}

impl SchemaConverter {
    pub fn new(config: &AppConfig, dialect: Option<Dialect>, fix_missing_columns: bool) -> Result<Self> {
        let reconciler = if fix_missing_columns {
            Some(Reconciler::new(&config.input.encodings).context("初始化缺失列补全失败")?)
        } else {
            None
        };

        Ok(Self {
            encodings: config.input.encodings.clone(),
            dialect,
            decompose_composite_refs: config.output.decompose_composite_refs,
            reconciler,
        })
    }

    pub fn dialect(&self) -> Option<Dialect> {
        self.dialect
    }

    pub fn encodings(&self) -> &[String] {
        &self.encodings
    }

    /// 解析一组 DDL 文件并合并，失败的文件记入 `errors` 后继续；返回表映射和表数量
    pub fn parse_files(&self, files: &[PathBuf], errors: &mut Vec<String>) -> (TableMap, usize) {
        let mut tables = TableMap::new();
        let mut table_count = 0;

        for file in files {
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            match parse_ddl_file(file, self.dialect, &self.encodings) {
                Ok(parsed) => {
                    if parsed.is_empty() {
                        debug!("    ⚠️  {}: 没有找到表", file_name);
                    } else {
                        debug!(
                            "    ✅ {}: {}",
                            file_name,
                            parsed.keys().cloned().collect::<Vec<_>>().join(", ")
                        );
                    }
                    table_count += parsed.len();
                    tables.extend(parsed);
                }
                Err(e) => {
                    debug!("    ❌ {}: {}", file_name, e);
                    errors.push(format!("文件解析失败 {}: {}", file.display(), e));
                }
            }
        }

        (tables, table_count)
    }

    /// 生成 DBML，给定 schema 目录且启用补全时用源 DDL 补全缺失列
    pub fn render(
        &self,
        tables: &TableMap,
        schema_name: Option<&str>,
        database_type: Dialect,
        schema_dir: Option<&Path>,
    ) -> String {
        let options = DbmlOptions {
            decompose_composite_refs: self.decompose_composite_refs,
            ..DbmlOptions::for_dialect(database_type)
        };
        let dbml = convert_tables_to_dbml_with_options(tables, schema_name, &options);

        match (&self.reconciler, schema_dir) {
            (Some(reconciler), Some(dir)) if dir.is_dir() => {
                debug!("🔍 检查缺失列: {}", dir.display());
                reconciler.reconcile(&dbml, dir)
            }
            _ => dbml,
        }
    }
}

/// `convert` 命令
pub fn run_convert(
    app: &CliApp,
    root: &Path,
    dry_run: bool,
    dialect: Option<&str>,
    no_fix: bool,
) -> Result<()> {
    info!("🚀 DDL → DBML 转换");
    info!("📁 根目录: {}", root.display());
    if dry_run {
        info!("🔍 DRY-RUN 模式: 只模拟，不生成文件");
    }

    let converter = SchemaConverter::new(
        &app.config,
        app.resolve_dialect(dialect)?,
        app.config.output.fix_missing_columns && !no_fix,
    )?;
    let scanner = DirectoryScanner::new(root, &app.config.scan.database_prefixes);

    let stats = convert_all(&scanner, &converter, dry_run, app.verbose)?;
    stats.print_summary();

    if !stats.is_success() {
        bail!("转换过程中出现 {} 个错误", stats.errors.len());
    }
    Ok(())
}

/// 扫描并转换全部数据库
pub fn convert_all(
    scanner: &DirectoryScanner,
    converter: &SchemaConverter,
    dry_run: bool,
    verbose: bool,
) -> Result<ConversionStats> {
    let databases = scanner.scan_databases()?;
    if databases.is_empty() {
        warn!("⚠️  没有找到可转换的数据库: {}", scanner.root().display());
        info!(
            "💡 数据库目录名需要以下列前缀开头: {}",
            scanner.prefixes().join(", ")
        );
        bail!("没有找到可转换的数据库");
    }

    if verbose {
        scanner.print_scan_summary(&databases);
    } else {
        info!("📊 发现数据库: {} 个", databases.len());
        info!(
            "📊 schema 总数: {} 个",
            databases.values().map(|s| s.len()).sum::<usize>()
        );
    }

    let mut stats = ConversionStats::default();
    for (db_name, schemas) in &databases {
        convert_database(scanner, converter, db_name, schemas, dry_run, &mut stats);
    }

    Ok(stats)
}

fn convert_database(
    scanner: &DirectoryScanner,
    converter: &SchemaConverter,
    db_name: &str,
    schemas: &SchemaMap,
    dry_run: bool,
    stats: &mut ConversionStats,
) {
    let db_info = DatabaseInfo::parse(db_name);
    info!(
        "🔄 处理中: {} ({} - {}:{})",
        db_name, db_info.db_type, db_info.server_name, db_info.port
    );

    let database_type = converter.dialect().unwrap_or_else(|| db_info.dialect_hint());

    for (schema_name, ddl_files) in schemas {
        debug!("  📁 schema: {} ({} 个文件)", schema_name, ddl_files.len());

        let (tables, table_count) = converter.parse_files(ddl_files, &mut stats.errors);
        if tables.is_empty() {
            warn!("  ⚠️  {}: 没有可转换的表", schema_name);
            stats.schemas_processed += 1;
            continue;
        }

        let schema_dir = scanner.schema_dir(db_name, schema_name);
        let dbml = converter.render(&tables, Some(schema_name), database_type, Some(&schema_dir));
        let output_path = scanner.output_path(db_name, schema_name);

        if dry_run {
            info!(
                "  🔍 [DRY-RUN] 将生成: {} ({} 张表)",
                output_path.display(),
                table_count
            );
        } else if let Err(e) = fs::write(&output_path, dbml) {
            warn!("  ❌ {}: {}", schema_name, e);
            stats
                .errors
                .push(format!("{db_name}/{schema_name}: 写入 {} 失败: {e}", output_path.display()));
            continue;
        } else {
            info!(
                "  ✅ {}: {} ({} 张表)",
                schema_name,
                output_path.display(),
                table_count
            );
            stats.files_created += 1;
        }

        stats.schemas_processed += 1;
        stats.tables_processed += table_count;
    }

    stats.databases_processed += 1;
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    const ORDERS_SQL: &str = r#"
CREATE TABLE `orders` (
  `id` bigint(20) NOT NULL AUTO_INCREMENT,
  `user_id` bigint(20) NOT NULL,
  `status` enum('new','paid') NOT NULL DEFAULT 'new',
  PRIMARY KEY (`id`),
  KEY `idx_user` (`user_id`),
  CONSTRAINT `fk_user` FOREIGN KEY (`user_id`) REFERENCES `users` (`id`)
) ENGINE=InnoDB;
"#;

    const USERS_SQL: &str = r#"
CREATE TABLE `users` (
  `id` bigint(20) NOT NULL AUTO_INCREMENT,
  `email` varchar(100) NOT NULL,
  PRIMARY KEY (`id`)
);
"#;

    fn write(path: &Path, content: &[u8]) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn converter(config: &AppConfig) -> SchemaConverter {
        SchemaConverter::new(config, None, true).unwrap()
    }

    #[test]
    fn test_convert_all_writes_schema_files() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("mysql-shop-3306/sales/orders.sql"), ORDERS_SQL.as_bytes());
        write(&root.join("mysql-shop-3306/sales/users.sql"), USERS_SQL.as_bytes());

        let config = AppConfig::default();
        let scanner = DirectoryScanner::new(root, &config.scan.database_prefixes);
        let stats = convert_all(&scanner, &converter(&config), false, false).unwrap();

        assert!(stats.is_success(), "不应有错误: {:?}", stats.errors);
        assert_eq!(stats.databases_processed, 1);
        assert_eq!(stats.schemas_processed, 1);
        assert_eq!(stats.tables_processed, 2);
        assert_eq!(stats.files_created, 1);

        let dbml = fs::read_to_string(root.join("mysql-shop-3306/sales.dbml")).unwrap();
        assert!(dbml.starts_with("Project sales {\n  database_type: 'MySQL'\n}"));
        assert!(dbml.contains("Table orders {"));
        assert!(dbml.contains("status enum('new','paid') [not null, default: 'new']"));
        assert!(dbml.contains("Ref: orders.user_id > users.id"));
    }

    #[test]
    fn test_dry_run_writes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("mysql-shop-3306/sales/users.sql"), USERS_SQL.as_bytes());

        let config = AppConfig::default();
        let scanner = DirectoryScanner::new(root, &config.scan.database_prefixes);
        let stats = convert_all(&scanner, &converter(&config), true, false).unwrap();

        assert_eq!(stats.files_created, 0);
        assert_eq!(stats.tables_processed, 1);
        assert!(!root.join("mysql-shop-3306/sales.dbml").exists());
    }

    #[test]
    fn test_file_errors_are_collected() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(&root.join("mysql-shop-3306/sales/users.sql"), USERS_SQL.as_bytes());
        write(&root.join("mysql-shop-3306/sales/broken.sql"), b"CREATE TABLE \xff\xfe (a INT);");

        let mut config = AppConfig::default();
        config.input.encodings = vec!["utf-8".to_string()];
        let scanner = DirectoryScanner::new(root, &config.scan.database_prefixes);
        let stats = convert_all(&scanner, &converter(&config), false, false).unwrap();

        assert_eq!(stats.errors.len(), 1, "无法解码的文件应记为错误");
        assert!(stats.errors[0].contains("broken.sql"));
        assert_eq!(stats.files_created, 1, "其余文件仍应正常转换");
    }

    #[test]
    fn test_postgresql_directory_uses_dialect_hint() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        write(
            &root.join("postgresql-main-5432/public/items.sql"),
            b"CREATE TABLE public.items (\n  id integer NOT NULL,\n  name text\n);\n",
        );

        let config = AppConfig::default();
        let scanner = DirectoryScanner::new(root, &config.scan.database_prefixes);
        let stats = convert_all(&scanner, &converter(&config), false, false).unwrap();
        assert!(stats.is_success());

        let dbml = fs::read_to_string(root.join("postgresql-main-5432/public.dbml")).unwrap();
        assert!(dbml.contains("database_type: 'PostgreSQL'"));
    }

    #[test]
    fn test_no_databases_is_an_error() {
        let temp_dir = TempDir::new().unwrap();
        let config = AppConfig::default();
        let scanner = DirectoryScanner::new(temp_dir.path(), &config.scan.database_prefixes);
        assert!(convert_all(&scanner, &converter(&config), false, false).is_err());
    }
}
