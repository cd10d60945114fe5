/// # ddl2dbml 日志系统使用说明
///
/// ## 基本原则
/// 1. **库代码只使用 `tracing` 宏**：`info!()`, `warn!()`, `error!()`, `debug!()`
/// 2. **应用入口控制日志配置**：在 `main.rs` 中调用 `setup_logging()`
/// 3. **程序输出与日志分离**：`file`/`inspect` 命令的 DBML 与 JSON 写到标准输出，日志写到标准错误
///
/// ## 日志配置选项
/// - `-v, --verbose`：启用详细日志模式（DEBUG 级别）
/// - `RUST_LOG`：标准的 Rust 日志级别控制
/// - `DDL2DBML_LOG_FILE`：日志文件路径，设置后日志输出到文件而非终端
///
/// ```bash
/// # 详细日志输出到终端
/// ddl2dbml -v convert ./schemas
///
/// # 日志输出到文件
/// DDL2DBML_LOG_FILE=ddl2dbml.log ddl2dbml convert ./schemas
///
/// # 只看 MySQL 抽取器的调试信息
/// RUST_LOG=dbml_core::ddl::mysql=debug ddl2dbml file users.sql
/// ```
pub fn setup_logging(verbose: bool) {
    use tracing_subscriber::{EnvFilter, fmt};

    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let log_file = std::env::var(LOG_FILE_ENV).ok().and_then(|path| {
        std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&path)
            .map_err(|e| eprintln!("无法打开日志文件 {path}: {e}，改为输出到终端"))
            .ok()
    });

    if let Some(file) = log_file {
        // 输出到文件 - 使用详细格式便于调试
        fmt()
            .with_env_filter(env_filter)
            .with_writer(file)
            .with_ansi(false)
            .with_target(true)
            .with_line_number(true)
            .init();
    } else {
        // 输出到终端 - 写到标准错误，不干扰标准输出中的 DBML
        fmt()
            .with_env_filter(env_filter)
            .with_writer(std::io::stderr)
            .with_target(false)
            .with_line_number(false)
            .without_time()
            .compact()
            .init();
    }
}

/// 日志文件路径的环境变量名
pub const LOG_FILE_ENV: &str = "DDL2DBML_LOG_FILE";
