// ==========================================
// 生产缺陷报表系统 - 缺陷百分比计算
// ==========================================
// 单产品: defective[p] / produced[p] * 100
// 总体:   total_defective / total_produced * 100（取汇总值）
// 分母为 0 → None（未定义，原样输出，不视为错误，不置 0）
// ==========================================

use crate::domain::production::{AggregatedRecord, CleanBatch, PercentageRecord};
use crate::domain::types::Product;
use std::collections::HashMap;
use tracing::{debug, warn};

/// 百分比（分母为 0 时未定义）
pub fn defect_pct(defective: u128, produced: u128) -> Option<f64> {
    if produced == 0 {
        return None;
    }
    Some(defective as f64 / produced as f64 * 100.0)
}

pub struct PercentageCalculator;

impl PercentageCalculator {
    pub fn new() -> Self {
        Self
    }

    /// 清洗记录与汇总记录按 unit_id 关联，计算四个百分比
    pub fn calculate(
        &self,
        batch: CleanBatch,
        aggregated: Vec<AggregatedRecord>,
    ) -> Vec<PercentageRecord> {
        let totals: HashMap<String, AggregatedRecord> = aggregated
            .into_iter()
            .map(|a| (a.unit_id.clone(), a))
            .collect();

        let mut rows = Vec::with_capacity(batch.len());
        for record in batch.records {
            let Some(total) = totals.get(&record.unit_id) else {
                warn!(unit_id = %record.unit_id, "缺少汇总记录，跳过");
                continue;
            };

            let pct = |p: Product| {
                defect_pct(
                    u128::from(record.defective.get(p)),
                    u128::from(record.produced.get(p)),
                )
            };
            rows.push(PercentageRecord {
                defect_pct_scissor: pct(Product::Scissor),
                defect_pct_paper: pct(Product::Paper),
                defect_pct_rock: pct(Product::Rock),
                overall_defect_pct: defect_pct(total.total_defective, total.total_produced),
                unit_id: record.unit_id,
            });
        }

        let undefined = rows
            .iter()
            .filter(|r| r.overall_defect_pct.is_none())
            .count();
        debug!(rows = rows.len(), undefined_overall = undefined, "缺陷百分比计算完成");
        rows
    }
}

impl Default for PercentageCalculator {
    fn default() -> Self {
        Self::new()
    }
}
