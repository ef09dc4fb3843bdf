// ==========================================
// 生产缺陷报表系统 - 领域模型层
// ==========================================
// 职责: 定义生产记录、数据质量、报表实体
// 红线: 不含数据访问逻辑,不含计算逻辑
// ==========================================

pub mod production;
pub mod quality;
pub mod report;
pub mod types;

// 重导出核心类型
pub use production::{
    AggregatedRecord, CleanBatch, CleanRecord, Counts, PercentageRecord, ProductionBatch,
    ProductionRecord, RawBatch, RawCounts,
};
pub use quality::{DqReport, DqSummary, DuplicateRecord};
pub use report::{AlertReportRow, DefectReportRow, DiscardReportRow, RunSummary, ValidatedReports};
pub use types::{CountKind, Product};
