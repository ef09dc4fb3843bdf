// ==========================================
// 生产缺陷报表系统 - 报表模型
// ==========================================
// 报表 A: 全量缺陷百分比（校验路径）
// 报表 B: 超阈值告警（校验路径）
// 报表 C: 废品百分比（原始路径，不经校验/去重）
// ==========================================

use crate::domain::production::PercentageRecord;
use crate::domain::quality::DqReport;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// 报表 A 行（与百分比记录同构）
pub type DefectReportRow = PercentageRecord;

// ==========================================
// AlertReportRow - 报表 B 行
// ==========================================
// 仅包含 overall_defect_pct 已定义且严格大于阈值的单元
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AlertReportRow {
    pub unit_id: String,
    pub overall_defect_pct: f64,
}

// ==========================================
// DiscardReportRow - 报表 C 行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiscardReportRow {
    pub unit_id: Option<String>,
    pub discard_pct: Option<f64>,
}

// ==========================================
// ValidatedReports - 校验路径产物（报表 A + B，原子提交）
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidatedReports {
    pub defect_rows: Vec<DefectReportRow>,
    pub alert_rows: Vec<AlertReportRow>,
}

// ==========================================
// RunSummary - 单次运行结果
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u128,
    pub raw_rows: usize,
    pub defect_rows: usize,   // 报表 A 行数
    pub alert_rows: usize,    // 报表 B 行数
    pub discard_rows: usize,  // 报表 C 行数
    pub dq_report: DqReport,
}
