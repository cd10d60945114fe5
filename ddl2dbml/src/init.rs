use anyhow::{Context, Result};
use dbml_core::AppConfig;
use dbml_core::constants::config::DEFAULT_CONFIG_FILE;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

/// 生成默认配置文件，已存在时需要 `--force` 才会覆盖；返回配置文件路径
pub fn run_init(config_path: Option<&Path>, force: bool) -> Result<PathBuf> {
    let path = config_path
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_CONFIG_FILE));

    info!("🦆 ddl2dbml 初始化");
    info!("======================");

    if path.exists() && !force {
        warn!("⚠️  配置文件已存在: {}", path.display());
        info!("如果要重新生成，请使用 --force 参数");
        info!("示例: ddl2dbml init --force");
        return Ok(path);
    }

    AppConfig::default()
        .save_to_file(&path)
        .with_context(|| format!("写入配置文件失败: {}", path.display()))?;
    info!("   ✅ 创建配置文件: {}", path.display());

    info!("🎉 初始化完成！");
    info!("📝 接下来的步骤:");
    info!("   1️⃣  按需修改 {} 中的编码列表与方言", path.display());
    info!("   2️⃣  运行 'ddl2dbml scan <目录>' 检查目录结构");
    info!("   3️⃣  运行 'ddl2dbml convert <目录>' 生成 DBML");

    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_init_writes_loadable_config() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddl2dbml.toml");

        run_init(Some(&path), false).unwrap();
        let loaded = AppConfig::load_from_file(&path).unwrap();
        assert_eq!(loaded, AppConfig::default());
    }

    #[test]
    fn test_init_keeps_existing_without_force() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("ddl2dbml.toml");
        fs::write(&path, "[input]\ndialect = \"mysql\"\n").unwrap();

        run_init(Some(&path), false).unwrap();
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "[input]\ndialect = \"mysql\"\n",
            "未指定 --force 时不应覆盖"
        );

        run_init(Some(&path), true).unwrap();
        assert_eq!(AppConfig::load_from_file(&path).unwrap(), AppConfig::default());
    }
}
