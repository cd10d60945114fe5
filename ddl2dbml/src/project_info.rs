/// ddl2dbml 项目信息模块
///
/// dbml-core 作为内部库只提供技术性常量，面向用户的元数据统一在这里定义

/// 项目元数据（自动从 Cargo.toml 同步）
pub mod metadata {
    pub const PROJECT_DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");

    pub const PROJECT_AUTHORS: &str = env!("CARGO_PKG_AUTHORS");

    pub const PROJECT_LICENSE: &str = env!("CARGO_PKG_LICENSE");

    /// 用户友好的显示名称（手动维护）
    pub mod display {
        pub const FRIENDLY_NAME: &str = "DDL2DBML";

        /// 比 Cargo.toml 中更详细的描述，用于 `--help`
        pub const DESCRIPTION_LONG: &str = "扫描 mysql-*/maria-*/mariadb-*/postgresql-*/supabase-* 目录下按 schema 组织的 DDL 导出文件，\
为每个 schema 生成一份 DBML 文档，并根据源 DDL 补全解析时遗漏的列";
    }
}

/// 版本信息
pub mod version_info {
    pub const CLI_VERSION: &str = env!("CARGO_PKG_VERSION");
}

/// 获取版本信息字符串
pub fn get_version_string() -> String {
    format!(
        "{} v{}",
        metadata::display::FRIENDLY_NAME,
        version_info::CLI_VERSION
    )
}

/// 获取作者和许可证信息
pub fn get_copyright_info() -> String {
    format!(
        "© {} - Licensed under {}",
        metadata::PROJECT_AUTHORS,
        metadata::PROJECT_LICENSE
    )
}
