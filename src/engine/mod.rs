// ==========================================
// 生产缺陷报表系统 - 引擎层
// ==========================================
// 职责: 汇总、百分比、报表构建与运行编排
// 红线: Engine 不拼 SQL，落库全部经由 ReportSink
// ==========================================

pub mod aggregator;
pub mod error;
pub mod orchestrator;
pub mod percentage;
pub mod report_builder;

// 重导出核心引擎
pub use aggregator::Aggregator;
pub use error::{PipelineError, PipelineResult};
pub use orchestrator::{PipelineOutcome, ReportPipeline, REQUIRED_COLUMNS};
pub use percentage::{defect_pct, PercentageCalculator};
pub use report_builder::{ReportBuilder, DEFAULT_ALERT_THRESHOLD_PCT};
