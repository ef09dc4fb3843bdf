// ==========================================
// 生产缺陷报表系统 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 报表落库（SQLite）与暂存文件写出
// 约束: 数据值一律参数化写入；表名经白名单字符校验后加引号
// ==========================================

pub mod error;
pub mod report_repo;
pub mod report_repo_impl;

// 重导出核心类型
pub use error::{RepositoryError, RepositoryResult};
pub use report_repo::ReportSink;
pub use report_repo_impl::{columns, ReportTables, SqliteReportSink};
