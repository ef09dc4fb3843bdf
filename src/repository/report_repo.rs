// ==========================================
// 生产缺陷报表系统 - 报表写出接口
// ==========================================
// 职责: 定义报表落库接口（不包含实现）
// 红线: 报表 A + B 必须原子写出（要么都写，要么都不写）
// ==========================================

use crate::domain::report::{DiscardReportRow, ValidatedReports};
use crate::repository::error::RepositoryResult;
use async_trait::async_trait;

// ==========================================
// ReportSink Trait
// ==========================================
// 实现者: SqliteReportSink（SQLite 仓库 + 可选 CSV 暂存）
#[async_trait]
pub trait ReportSink: Send + Sync {
    /// 写出报表 A + B（单事务，整表替换）
    ///
    /// # 返回
    /// - 写入总行数
    async fn write_validated_reports(&self, reports: &ValidatedReports) -> RepositoryResult<usize>;

    /// 写出报表 C（单独事务，整表替换）
    async fn write_discard_report(&self, rows: &[DiscardReportRow]) -> RepositoryResult<usize>;
}
