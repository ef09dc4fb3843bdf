// ==========================================
// 生产缺陷报表系统 - 导入模块错误类型
// ==========================================
// 工具: thiserror 派生宏
// ==========================================

use thiserror::Error;

/// 导入模块错误类型
#[derive(Error, Debug)]
pub enum ImportError {
    // ===== 文件相关错误 =====
    #[error("文件不存在: {0}")]
    FileNotFound(String),

    #[error("文件格式不支持: {0}（仅支持 .tsv/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("分隔文本解析失败: {0}")]
    DelimitedParseError(String),

    #[error("缺少必需列: {0}")]
    MissingColumn(String),

    // ===== 配置错误 =====
    #[error("配置读取失败 (key: {key}): {message}")]
    ConfigReadError { key: String, message: String },

    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for ImportError {
    fn from(err: std::io::Error) -> Self {
        ImportError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for ImportError {
    fn from(err: csv::Error) -> Self {
        ImportError::DelimitedParseError(err.to_string())
    }
}

/// Result 类型别名
pub type ImportResult<T> = Result<T, ImportError>;

/// 批次级致命校验错误（任一出现即整批失败，校验路径不产出任何报表）
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("发现非预期的列（产品）: {}", columns.join(", "))]
    SchemaViolation { columns: Vec<String> },

    #[error("列 {column} 存在负数或非数值: {} 条记录", rows.len())]
    RangeViolation { column: String, rows: Vec<usize> },

    #[error("Production_Unit_Id 含非字母数字字符: {}", unit_ids.join(", "))]
    FormatViolation { unit_ids: Vec<String> },
}

/// Result 类型别名（校验）
pub type ValidationResult<T> = Result<T, ValidationError>;
