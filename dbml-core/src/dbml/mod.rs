//! DBML 生成与缺失列补全

mod generator;
pub mod literal;
pub mod reconcile;

#[cfg(test)]
mod tests;

pub use generator::{DbmlOptions, convert_tables_to_dbml, convert_tables_to_dbml_with_options};
pub use literal::{LiteralKind, classify_default, escape_identifier, format_default};
pub use reconcile::{GroundTruthColumn, Reconciler, reconcile_dbml};
