/// 方言检测相关常量
pub mod dialect {
    /// PostgreSQL 特征片段（大小写不敏感的子串匹配）
    pub const POSTGRESQL_INDICATORS: &[&str] = &[
        "CHARACTER VARYING",
        "TIMESTAMP WITHOUT TIME ZONE",
        "TIMESTAMP WITH TIME ZONE",
        "JSONB",
        "SERIAL",
        "BIGSERIAL",
        "NEXTVAL(",
        "::REGCLASS",
        "::CHARACTER VARYING",
        "::TEXT",
        "OWNER TO",
        "BYTEA",
        "DOUBLE PRECISION",
        "UUID",
        "CREATE SEQUENCE",
        "SET SEARCH_PATH",
    ];

    /// MySQL/MariaDB 特征片段
    pub const MYSQL_INDICATORS: &[&str] = &[
        "AUTO_INCREMENT",
        "TINYINT",
        "MEDIUMINT",
        "ENGINE=",
        "CHARSET=",
        "COLLATE=",
        "UNSIGNED",
        "LONGTEXT",
        "MEDIUMTEXT",
        "ON UPDATE CURRENT_TIMESTAMP",
        "`",
        "/*!40101",
    ];
}

/// 输入文件相关常量
pub mod input {
    /// 默认的编码尝试顺序（WHATWG 编码标签）
    pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "euc-kr", "latin1"];

    /// DDL 文件扩展名
    pub const DDL_EXTENSION: &str = "sql";
}

/// 配置文件相关常量
pub mod config {
    /// 配置文件查找顺序
    pub const CONFIG_FILE_NAMES: &[&str] = &["ddl2dbml.toml", ".ddl2dbml.toml"];

    /// `init` 命令写出的默认配置文件名
    pub const DEFAULT_CONFIG_FILE: &str = "ddl2dbml.toml";

    /// 方言自动检测
    pub const DIALECT_AUTO: &str = "auto";
}

/// 目录扫描相关常量
pub mod scan {
    /// 数据库目录名前缀
    pub const DATABASE_PREFIXES: &[&str] =
        &["mysql-", "maria-", "mariadb-", "postgresql-", "supabase-"];

    /// DBML 输出文件扩展名
    pub const DBML_EXTENSION: &str = "dbml";

    /// 端口无法解析时的占位值
    pub const UNKNOWN_PORT: &str = "unknown";
}

/// DBML 输出相关常量
pub mod dbml {
    /// SQL 基础类型到 DBML 类型名
    pub const TYPE_MAPPING: &[(&str, &str)] = &[
        ("BIGINT", "bigint"),
        ("INT", "int"),
        ("INTEGER", "int"),
        ("SMALLINT", "smallint"),
        ("TINYINT", "tinyint"),
        ("DECIMAL", "decimal"),
        ("NUMERIC", "decimal"),
        ("FLOAT", "float"),
        ("DOUBLE", "double"),
        ("VARCHAR", "varchar"),
        ("CHAR", "char"),
        ("TEXT", "text"),
        ("LONGTEXT", "longtext"),
        ("MEDIUMTEXT", "mediumtext"),
        ("TINYTEXT", "tinytext"),
        ("DATE", "date"),
        ("DATETIME", "datetime"),
        ("TIMESTAMP", "timestamp"),
        ("TIME", "time"),
        ("YEAR", "year"),
        ("BLOB", "blob"),
        ("LONGBLOB", "longblob"),
        ("MEDIUMBLOB", "mediumblob"),
        ("TINYBLOB", "tinyblob"),
        ("BINARY", "binary"),
        ("VARBINARY", "varbinary"),
        ("ENUM", "enum"),
        ("SET", "set"),
        ("JSON", "json"),
        ("BOOLEAN", "boolean"),
        ("BOOL", "boolean"),
    ];

    /// 补全缺失列时使用的简化类型表
    pub const RECONCILE_TYPE_MAPPING: &[(&str, &str)] = &[
        ("TINYINT", "tinyint"),
        ("SMALLINT", "smallint"),
        ("MEDIUMINT", "int"),
        ("INT", "int"),
        ("INTEGER", "int"),
        ("BIGINT", "bigint"),
        ("DECIMAL", "decimal"),
        ("NUMERIC", "decimal"),
        ("FLOAT", "float"),
        ("DOUBLE", "double"),
        ("BIT", "bit"),
        ("CHAR", "char"),
        ("VARCHAR", "varchar"),
        ("BINARY", "binary"),
        ("VARBINARY", "varbinary"),
        ("TINYBLOB", "blob"),
        ("BLOB", "blob"),
        ("MEDIUMBLOB", "blob"),
        ("LONGBLOB", "blob"),
        ("TINYTEXT", "text"),
        ("TEXT", "text"),
        ("MEDIUMTEXT", "text"),
        ("LONGTEXT", "longtext"),
        ("ENUM", "enum"),
        ("SET", "set"),
        ("DATE", "date"),
        ("TIME", "time"),
        ("DATETIME", "datetime"),
        ("TIMESTAMP", "timestamp"),
        ("YEAR", "year"),
        ("JSON", "json"),
    ];

    /// 关系段落标题
    pub const RELATIONSHIPS_HEADER: &str = "// Relationships";
}

/// PostgreSQL 类型写法到规范大写类型
pub mod postgres {
    pub const TYPE_MAPPING: &[(&str, &str)] = &[
        ("character varying", "VARCHAR"),
        ("character", "CHAR"),
        ("varchar", "VARCHAR"),
        ("char", "CHAR"),
        ("text", "TEXT"),
        ("integer", "INT"),
        ("int", "INT"),
        ("int4", "INT"),
        ("bigint", "BIGINT"),
        ("int8", "BIGINT"),
        ("smallint", "SMALLINT"),
        ("int2", "SMALLINT"),
        ("decimal", "DECIMAL"),
        ("numeric", "DECIMAL"),
        ("real", "REAL"),
        ("float4", "REAL"),
        ("double precision", "DOUBLE"),
        ("float8", "DOUBLE"),
        ("serial", "SERIAL"),
        ("bigserial", "BIGSERIAL"),
        ("smallserial", "SMALLSERIAL"),
        ("boolean", "BOOLEAN"),
        ("bool", "BOOLEAN"),
        ("date", "DATE"),
        ("time", "TIME"),
        ("time without time zone", "TIME"),
        ("time with time zone", "TIMETZ"),
        ("timestamp", "TIMESTAMP"),
        ("timestamp without time zone", "TIMESTAMP"),
        ("timestamp with time zone", "TIMESTAMPTZ"),
        ("interval", "INTERVAL"),
        ("uuid", "UUID"),
        ("json", "JSON"),
        ("jsonb", "JSONB"),
        ("xml", "XML"),
        ("bytea", "BYTEA"),
        ("inet", "INET"),
        ("cidr", "CIDR"),
        ("macaddr", "MACADDR"),
        ("point", "POINT"),
        ("line", "LINE"),
        ("lseg", "LSEG"),
        ("box", "BOX"),
        ("path", "PATH"),
        ("polygon", "POLYGON"),
        ("circle", "CIRCLE"),
        ("money", "MONEY"),
        ("regclass", "REGCLASS"),
    ];

    /// 列定义中结束类型累积的子句关键字
    pub const CLAUSE_KEYWORDS: &[&str] = &[
        "NOT",
        "NULL",
        "DEFAULT",
        "PRIMARY",
        "UNIQUE",
        "REFERENCES",
        "CHECK",
        "CONSTRAINT",
        "COLLATE",
        "GENERATED",
    ];
}
