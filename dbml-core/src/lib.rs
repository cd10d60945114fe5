//! DDL 到 DBML 转换核心库
//!
//! - [`ddl`]：方言检测与 `CREATE TABLE` 抽取
//! - [`dbml`]：DBML 文本生成与缺失列补全
//! - [`config`]：`ddl2dbml.toml` 配置

pub mod config;
pub mod constants;
pub mod dbml;
pub mod ddl;
pub mod error;
pub mod input;

pub use config::AppConfig;
pub use dbml::{
    DbmlOptions, Reconciler, convert_tables_to_dbml, convert_tables_to_dbml_with_options,
    reconcile_dbml,
};
pub use ddl::{Column, Constraint, Dialect, Table, TableMap, parse_ddl, parse_ddl_file};
pub use error::{ConvertError, Result};
pub use input::read_ddl_file;
