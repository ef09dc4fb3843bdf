// ==========================================
// 生产缺陷报表系统 - 流水线错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分类: 校验失败（数据问题） / 导入失败 / 仓储失败 / 配置失败
// ==========================================

use crate::importer::error::{ImportError, ValidationError};
use crate::repository::error::RepositoryError;
use thiserror::Error;

/// 流水线错误类型
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("数据校验失败: {0}")]
    Validation(#[from] ValidationError),

    #[error("导入失败: {0}")]
    Import(#[from] ImportError),

    #[error("报表写入失败: {0}")]
    Repository(#[from] RepositoryError),

    #[error("配置错误: {0}")]
    Config(String),
}

impl PipelineError {
    /// 是否为数据校验失败（SchemaViolation / RangeViolation / FormatViolation）
    pub fn is_validation_failure(&self) -> bool {
        matches!(self, PipelineError::Validation(_))
    }
}

/// Result 类型别名
pub type PipelineResult<T> = Result<T, PipelineError>;
