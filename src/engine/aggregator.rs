// ==========================================
// 生产缺陷报表系统 - 汇总引擎
// ==========================================
// 职责: 每条清洗记录求三产品合计，再按 unit_id 分组求和
// 说明: 唯一性已在校验阶段保证，分组每组只有一条记录，
//       但分组步骤仍然执行（上游放宽唯一性时结果依然正确）
// ==========================================

use crate::domain::production::{AggregatedRecord, CleanBatch};
use std::collections::HashMap;
use tracing::debug;

pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// 按单元汇总（分组屏障: 需完整扫描批次）
    ///
    /// # 返回
    /// - 每个 unit_id 一条记录，顺序为首次出现顺序
    pub fn aggregate(&self, batch: &CleanBatch) -> Vec<AggregatedRecord> {
        let mut index: HashMap<&str, usize> = HashMap::new();
        let mut groups: Vec<AggregatedRecord> = Vec::new();

        for record in &batch.records {
            let total_produced = record.produced.total();
            let total_defective = record.defective.total();

            match index.get(record.unit_id.as_str()) {
                Some(&pos) => {
                    let group = &mut groups[pos];
                    group.total_produced += total_produced;
                    group.total_defective += total_defective;
                }
                None => {
                    index.insert(record.unit_id.as_str(), groups.len());
                    groups.push(AggregatedRecord {
                        unit_id: record.unit_id.clone(),
                        total_produced,
                        total_defective,
                    });
                }
            }
        }

        debug!(records = batch.len(), groups = groups.len(), "按单元汇总完成");
        groups
    }
}

impl Default for Aggregator {
    fn default() -> Self {
        Self::new()
    }
}
