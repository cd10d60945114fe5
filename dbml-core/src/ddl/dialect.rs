use crate::constants::dialect::{MYSQL_INDICATORS, POSTGRESQL_INDICATORS};
use crate::error::ConvertError;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;

/// SQL 方言
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Dialect {
    MySql,
    PostgreSql,
}

impl Dialect {
    /// 按特征片段命中数检测方言，PostgreSQL 严格多于 MySQL 时才判定为 PostgreSQL
    pub fn detect(content: &str) -> Self {
        let (mysql, postgresql) = dialect_scores(content);
        if postgresql > mysql {
            Dialect::PostgreSql
        } else {
            Dialect::MySql
        }
    }

    /// DBML `Project` 中的 database_type
    pub fn database_type(self) -> &'static str {
        match self {
            Dialect::MySql => "MySQL",
            Dialect::PostgreSql => "PostgreSQL",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Dialect::MySql => "mysql",
            Dialect::PostgreSql => "postgresql",
        }
    }
}

/// 返回 (MySQL 得分, PostgreSQL 得分)
pub fn dialect_scores(content: &str) -> (usize, usize) {
    let upper = content.to_uppercase();
    let score = |indicators: &[&str]| indicators.iter().filter(|i| upper.contains(*i)).count();
    (score(MYSQL_INDICATORS), score(POSTGRESQL_INDICATORS))
}

impl FromStr for Dialect {
    type Err = ConvertError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mysql" | "mariadb" | "maria" => Ok(Dialect::MySql),
            "postgresql" | "postgres" | "pg" | "supabase" => Ok(Dialect::PostgreSql),
            other => Err(ConvertError::UnknownDialect(other.to_string())),
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
