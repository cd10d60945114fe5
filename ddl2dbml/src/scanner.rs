//! 数据库目录扫描
//!
//! 目录结构约定：`<根目录>/<类型>-<服务器>-<端口>/<schema>/<表>.sql`，
//! 也可以直接在某个数据库目录内运行。

use anyhow::{Result, bail};
use dbml_core::Dialect;
use dbml_core::constants::input::DDL_EXTENSION;
use dbml_core::constants::scan::{DBML_EXTENSION, UNKNOWN_PORT};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use walkdir::WalkDir;

/// schema 名到 DDL 文件列表（已排序）
pub type SchemaMap = BTreeMap<String, Vec<PathBuf>>;

/// 数据库目录名到其 schema
pub type DatabaseMap = BTreeMap<String, SchemaMap>;

/// 从数据库目录名解析出的信息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DatabaseInfo {
    pub db_type: String,
    pub server_name: String,
    pub port: String,
}

impl DatabaseInfo {
    /// 按 `<类型>-<服务器...>-<端口>` 解析，服务器名可以包含连字符
    pub fn parse(db_name: &str) -> Self {
        let parts: Vec<&str> = db_name.split('-').collect();
        let db_type = match parts[0] {
            "" => "unknown".to_string(),
            "maria" => "mariadb".to_string(),
            other => other.to_string(),
        };

        if parts.len() >= 3 {
            Self {
                db_type,
                server_name: parts[1..parts.len() - 1].join("-"),
                port: parts[parts.len() - 1].to_string(),
            }
        } else {
            Self {
                db_type,
                server_name: if parts.len() > 1 {
                    parts[1..].join("-")
                } else {
                    "unknown".to_string()
                },
                port: UNKNOWN_PORT.to_string(),
            }
        }
    }

    /// 由目录类型推断的方言
    pub fn dialect_hint(&self) -> Dialect {
        match self.db_type.as_str() {
            "postgresql" | "supabase" => Dialect::PostgreSql,
            _ => Dialect::MySql,
        }
    }
}

/// 目录扫描器
#[derive(Debug, Clone)]
pub struct DirectoryScanner {
    root: PathBuf,
    prefixes: Vec<String>,
}

impl DirectoryScanner {
    pub fn new(root: impl Into<PathBuf>, prefixes: &[String]) -> Self {
        Self {
            root: root.into(),
            prefixes: prefixes.to_vec(),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn prefixes(&self) -> &[String] {
        &self.prefixes
    }

    /// 扫描数据库与 schema；没有 `.sql` 文件的 schema 不会出现在结果中
    pub fn scan_databases(&self) -> Result<DatabaseMap> {
        if !self.root.is_dir() {
            bail!("目录不存在或不是目录: {}", self.root.display());
        }

        let mut databases = DatabaseMap::new();

        if self.is_database_directory(&self.root) {
            let schemas = self.scan_schemas(&self.root);
            if !schemas.is_empty() {
                databases.insert(dir_name(&self.root), schemas);
                return Ok(databases);
            }
        }

        for db_dir in child_dirs(&self.root) {
            let db_name = dir_name(&db_dir);
            if !self.has_database_prefix(&db_name) {
                debug!("跳过非数据库目录: {}", db_name);
                continue;
            }

            let schemas = self.scan_schemas(&db_dir);
            if !schemas.is_empty() {
                databases.insert(db_name, schemas);
            }
        }

        Ok(databases)
    }

    /// 输出 DBML 的路径：在数据库目录内运行时写到根目录，否则写到对应数据库目录
    pub fn output_path(&self, db_name: &str, schema_name: &str) -> PathBuf {
        let file_name = format!("{schema_name}.{DBML_EXTENSION}");
        if self.is_database_directory(&self.root) {
            self.root.join(file_name)
        } else {
            self.root.join(db_name).join(file_name)
        }
    }

    /// schema 目录路径，和 `output_path` 的规则一致
    pub fn schema_dir(&self, db_name: &str, schema_name: &str) -> PathBuf {
        if self.is_database_directory(&self.root) {
            self.root.join(schema_name)
        } else {
            self.root.join(db_name).join(schema_name)
        }
    }

    /// 打印扫描结果摘要，每个 schema 只列出前三张表
    pub fn print_scan_summary(&self, databases: &DatabaseMap) {
        info!("=== 目录扫描结果 ===");
        info!("根目录: {}", self.root.display());
        info!("发现数据库: {} 个", databases.len());

        for (db_name, schemas) in databases {
            let db_info = DatabaseInfo::parse(db_name);
            info!("📁 {}", db_name);
            info!("   类型: {}", db_info.db_type);
            info!("   服务器: {}", db_info.server_name);
            info!("   端口: {}", db_info.port);
            info!("   schema: {} 个", schemas.len());

            for (schema_name, ddl_files) in schemas {
                info!("   └── {}: {} 张表", schema_name, ddl_files.len());
                for ddl_file in ddl_files.iter().take(3) {
                    let table_name = ddl_file
                        .file_stem()
                        .map(|s| s.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    info!("       - {}", table_name);
                }
                if ddl_files.len() > 3 {
                    info!("       ... 另外 {} 张", ddl_files.len() - 3);
                }
            }
        }
    }

    fn has_database_prefix(&self, name: &str) -> bool {
        self.prefixes.iter().any(|p| name.starts_with(p.as_str()))
    }

    /// 前缀匹配，且至少有一个子目录含 `.sql` 文件
    fn is_database_directory(&self, path: &Path) -> bool {
        self.has_database_prefix(&dir_name(path))
            && child_dirs(path)
                .iter()
                .any(|schema_dir| !find_ddl_files(schema_dir).is_empty())
    }

    fn scan_schemas(&self, db_dir: &Path) -> SchemaMap {
        child_dirs(db_dir)
            .into_iter()
            .filter_map(|schema_dir| {
                let ddl_files = find_ddl_files(&schema_dir);
                (!ddl_files.is_empty()).then(|| (dir_name(&schema_dir), ddl_files))
            })
            .collect()
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.to_string_lossy().into_owned())
}

/// 直接子目录，按名称排序
fn child_dirs(path: &Path) -> Vec<PathBuf> {
    WalkDir::new(path)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .sort_by_file_name()
        .into_iter()
        .filter_map(|entry| {
            entry
                .map_err(|e| warn!("⚠️  无法读取目录项: {}", e))
                .ok()
        })
        .filter(|entry| entry.file_type().is_dir())
        .map(|entry| entry.into_path())
        .collect()
}

/// 目录下直接包含的 `.sql` 文件，按路径排序
fn find_ddl_files(schema_dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(schema_dir)
        .min_depth(1)
        .max_depth(1)
        .follow_links(true)
        .into_iter()
        .filter_map(|entry| entry.ok())
        .filter(|entry| entry.file_type().is_file())
        .map(|entry| entry.into_path())
        .filter(|path| path.extension().is_some_and(|ext| ext == DDL_EXTENSION))
        .collect();
    files.sort();
    files
}

#[cfg(test)]
mod tests {
    use super::*;
    use dbml_core::AppConfig;
    use std::fs;
    use tempfile::TempDir;

    fn prefixes() -> Vec<String> {
        AppConfig::default().scan.database_prefixes
    }

    fn touch(path: &Path) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "CREATE TABLE t (a INT);").unwrap();
    }

    #[test]
    fn test_scan_parent_directory() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path();
        touch(&root.join("mysql-shop-3306/orders/b.sql"));
        touch(&root.join("mysql-shop-3306/orders/a.sql"));
        touch(&root.join("mysql-shop-3306/empty/readme.txt"));
        touch(&root.join("postgresql-pg-main-5432/public/users.sql"));
        touch(&root.join("backup/orders/x.sql"));

        let scanner = DirectoryScanner::new(root, &prefixes());
        let databases = scanner.scan_databases().unwrap();

        assert_eq!(
            databases.keys().collect::<Vec<_>>(),
            vec!["mysql-shop-3306", "postgresql-pg-main-5432"],
            "只扫描带数据库前缀的目录"
        );
        let orders = &databases["mysql-shop-3306"];
        assert_eq!(orders.len(), 1, "没有 .sql 文件的 schema 应被忽略");
        let names: Vec<_> = orders["orders"]
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect();
        assert_eq!(names, vec!["a.sql", "b.sql"]);

        assert_eq!(
            scanner.output_path("mysql-shop-3306", "orders"),
            root.join("mysql-shop-3306").join("orders.dbml")
        );
    }

    #[test]
    fn test_scan_inside_database_directory() {
        let temp_dir = TempDir::new().unwrap();
        let db_dir = temp_dir.path().join("maria-db1-3307");
        touch(&db_dir.join("app/users.sql"));

        let scanner = DirectoryScanner::new(&db_dir, &prefixes());
        let databases = scanner.scan_databases().unwrap();

        assert_eq!(databases.len(), 1);
        assert!(databases["maria-db1-3307"].contains_key("app"));
        assert_eq!(
            scanner.output_path("maria-db1-3307", "app"),
            db_dir.join("app.dbml")
        );
        assert_eq!(scanner.schema_dir("maria-db1-3307", "app"), db_dir.join("app"));
    }

    #[test]
    fn test_scan_missing_root() {
        let temp_dir = TempDir::new().unwrap();
        let scanner = DirectoryScanner::new(temp_dir.path().join("nope"), &prefixes());
        assert!(scanner.scan_databases().is_err());
    }

    #[test]
    fn test_database_info() {
        let info = DatabaseInfo::parse("mysql-champ-study-3306");
        assert_eq!(info.db_type, "mysql");
        assert_eq!(info.server_name, "champ-study");
        assert_eq!(info.port, "3306");
        assert_eq!(info.dialect_hint(), Dialect::MySql);

        let info = DatabaseInfo::parse("maria-mydb");
        assert_eq!(info.db_type, "mariadb");
        assert_eq!(info.server_name, "mydb");
        assert_eq!(info.port, "unknown");

        let info = DatabaseInfo::parse("supabase-proj-6543");
        assert_eq!(info.dialect_hint(), Dialect::PostgreSql);

        let info = DatabaseInfo::parse("postgresql");
        assert_eq!(info.server_name, "unknown");
        assert_eq!(info.dialect_hint(), Dialect::PostgreSql);
    }
}
