// ==========================================
// 生产缺陷报表系统 - 数据质量模型
// ==========================================
// 职责: 重复标识记录 / DQ 汇总 / DQ 报告
// 说明: 致命违规（列/数值/格式）直接以 PipelineError 返回，不进入报告
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// DuplicateRecord - 被丢弃的重复记录（DuplicateKeyWarning）
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateRecord {
    pub row_number: usize,       // 被丢弃记录的行号
    pub unit_id: Option<String>, // 重复的标识
    pub kept_row_number: usize,  // 保留记录（首次出现）的行号
}

// ==========================================
// DqSummary - 数据质量汇总
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqSummary {
    pub total_rows: usize,    // 归一化后总行数
    pub retained: usize,      // 去重后保留行数
    pub dropped: usize,       // 因重复被丢弃的行数
    pub duplicate_ids: usize, // 出现重复的标识个数
}

// ==========================================
// DqReport - 数据质量报告
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DqReport {
    pub run_id: String,
    pub summary: DqSummary,
    pub duplicates: Vec<DuplicateRecord>,
}

impl DqReport {
    pub fn has_duplicates(&self) -> bool {
        !self.duplicates.is_empty()
    }
}
