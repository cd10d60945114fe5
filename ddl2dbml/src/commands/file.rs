use super::convert::SchemaConverter;
use crate::app::CliApp;
use anyhow::{Context, Result};
use dbml_core::ddl::tables_to_json;
use dbml_core::{Dialect, TableMap, parse_ddl, read_ddl_file};
use std::fs;
use std::path::Path;
use tracing::info;

/// 读取并解析单个文件，返回表映射和实际使用的方言
fn parse_single_file(converter: &SchemaConverter, path: &Path) -> Result<(TableMap, Dialect)> {
    let content = read_ddl_file(path, converter.encodings())
        .with_context(|| format!("读取 DDL 文件失败: {}", path.display()))?;
    let dialect = converter
        .dialect()
        .unwrap_or_else(|| Dialect::detect(&content));
    let tables = parse_ddl(&content, Some(dialect))
        .with_context(|| format!("解析 DDL 文件失败: {}", path.display()))?;

    Ok((tables, dialect))
}

/// 转换单个文件为 DBML 文本
pub fn convert_file(
    converter: &SchemaConverter,
    path: &Path,
    schema: Option<&str>,
) -> Result<String> {
    let (tables, dialect) = parse_single_file(converter, path)?;
    info!("📋 {}: {} 张表 ({})", path.display(), tables.len(), dialect);

    Ok(converter.render(&tables, schema, dialect, path.parent()))
}

/// `file` 命令
pub fn run_file(
    app: &CliApp,
    path: &Path,
    schema: Option<&str>,
    dialect: Option<&str>,
    output: Option<&Path>,
    no_fix: bool,
) -> Result<()> {
    let converter = SchemaConverter::new(
        &app.config,
        app.resolve_dialect(dialect)?,
        app.config.output.fix_missing_columns && !no_fix,
    )?;
    let dbml = convert_file(&converter, path, schema)?;

    match output {
        Some(output) => {
            fs::write(output, &dbml)
                .with_context(|| format!("写入 DBML 文件失败: {}", output.display()))?;
            info!("✅ 已生成: {}", output.display());
        }
        None => println!("{dbml}"),
    }
    Ok(())
}

/// `inspect` 命令：以 JSON 输出表结构
pub fn run_inspect(app: &CliApp, path: &Path, dialect: Option<&str>) -> Result<()> {
    let converter = SchemaConverter::new(&app.config, app.resolve_dialect(dialect)?, false)?;
    let (tables, _) = parse_single_file(&converter, path)?;

    println!("{}", tables_to_json(&tables)?);
    Ok(())
}
