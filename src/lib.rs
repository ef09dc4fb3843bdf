// ==========================================
// 生产缺陷报表系统 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 批处理 ETL（生产日志 → 缺陷报表 A/B/C）
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 记录与报表模型
pub mod domain;

// 导入层 - 解析、归一化、质量校验
pub mod importer;

// 引擎层 - 汇总、百分比、报表
pub mod engine;

// 数据仓储层 - 报表落库
pub mod repository;

// 配置层 - 作业参数与调优参数
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    AggregatedRecord, AlertReportRow, CleanBatch, CleanRecord, DefectReportRow, DiscardReportRow,
    DqReport, PercentageRecord, ProductionBatch, ProductionRecord, RunSummary, ValidatedReports,
};

// 引擎
pub use engine::{PipelineError, PipelineResult, ReportPipeline};

// 配置
pub use config::{ConfigManager, JobConfig};

// 仓储
pub use repository::{ReportSink, ReportTables, SqliteReportSink};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "生产缺陷报表系统";
