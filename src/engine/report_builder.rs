// ==========================================
// 生产缺陷报表系统 - 报表构建
// ==========================================
// 报表 A: 百分比记录原样输出
// 报表 B: overall_defect_pct > 阈值（严格大于，未定义值排除）
// 报表 C: 原始路径，(defective 合计 / produced 合计) * 100
// ==========================================

use crate::domain::production::{PercentageRecord, ProductionBatch};
use crate::domain::report::{AlertReportRow, DiscardReportRow, ValidatedReports};
use tracing::debug;

/// 默认告警阈值（百分比）
pub const DEFAULT_ALERT_THRESHOLD_PCT: f64 = 20.0;

pub struct ReportBuilder {
    alert_threshold_pct: f64,
}

impl ReportBuilder {
    pub fn new(alert_threshold_pct: f64) -> Self {
        Self {
            alert_threshold_pct,
        }
    }

    /// 构建报表 A + B
    pub fn build_validated(&self, rows: Vec<PercentageRecord>) -> ValidatedReports {
        let alert_rows: Vec<AlertReportRow> = rows
            .iter()
            .filter_map(|r| {
                let pct = r.overall_defect_pct?;
                (pct > self.alert_threshold_pct).then(|| AlertReportRow {
                    unit_id: r.unit_id.clone(),
                    overall_defect_pct: pct,
                })
            })
            .collect();

        debug!(
            defect_rows = rows.len(),
            alert_rows = alert_rows.len(),
            threshold = self.alert_threshold_pct,
            "报表 A/B 构建完成"
        );

        ValidatedReports {
            defect_rows: rows,
            alert_rows,
        }
    }

    /// 构建报表 C（不经去重/校验，每条原始记录一行）
    ///
    /// # 说明
    /// - 任一子字段缺失 → 合计缺失 → 百分比缺失
    /// - 负数不拦截，按原值参与计算
    /// - produced 合计为 0 → 百分比缺失
    pub fn build_discard(&self, batch: ProductionBatch) -> Vec<DiscardReportRow> {
        let rows: Vec<DiscardReportRow> = batch
            .records
            .into_iter()
            .map(|r| DiscardReportRow {
                discard_pct: raw_ratio_pct(r.defective.total(), r.produced.total()),
                unit_id: r.unit_id,
            })
            .collect();

        debug!(discard_rows = rows.len(), "报表 C 构建完成");
        rows
    }
}

impl Default for ReportBuilder {
    fn default() -> Self {
        Self::new(DEFAULT_ALERT_THRESHOLD_PCT)
    }
}

fn raw_ratio_pct(defective: Option<i128>, produced: Option<i128>) -> Option<f64> {
    let (defective, produced) = (defective?, produced?);
    if produced == 0 {
        return None;
    }
    Some(defective as f64 / produced as f64 * 100.0)
}
