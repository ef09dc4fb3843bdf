// ==========================================
// 生产缺陷报表系统 - 归一化器实现
// ==========================================
// 职责: Items_Produced / Defective_Items (JSON 文本) → 六个平铺计数列 + 标识
// 规则:
// - 编码字段必须是 JSON 对象，rock/paper/scissor 必须是 JSON 整数，否则该子字段缺失
// - 字段缺失 / 非对象 / 无法解析 → 三个子字段全部缺失
// - 其他键（其他产品）展开为额外列，由列封闭检查拒绝
// - 源文件其他列不进入归一化结果
// ==========================================

use crate::domain::production::{ProductionRecord, RawCounts};
use crate::domain::types::{CountKind, Product, UNIT_ID_COLUMN};
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::importer_trait::RecordNormalizer;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

pub struct Normalizer {
    cleaner: DataCleaner,
}

impl Normalizer {
    pub fn new() -> Self {
        Self {
            cleaner: DataCleaner,
        }
    }

    /// 解码单个编码列
    fn decode_counts(
        &self,
        row: &HashMap<String, String>,
        kind: CountKind,
        row_number: usize,
        unexpected: &mut BTreeMap<String, Option<i64>>,
    ) -> RawCounts {
        let column = kind.source_column();
        let text = match self
            .cleaner
            .normalize_null(row.get(column).map(String::as_str))
        {
            Some(t) => t,
            None => return RawCounts::missing(),
        };

        let value: Value = match serde_json::from_str(&text) {
            Ok(v) => v,
            Err(e) => {
                debug!(row_number, column, error = %e, "编码字段无法解析，按缺失处理");
                return RawCounts::missing();
            }
        };

        let object = match value.as_object() {
            Some(o) => o,
            None => {
                debug!(row_number, column, "编码字段不是 JSON 对象，按缺失处理");
                return RawCounts::missing();
            }
        };

        let mut counts = RawCounts::missing();
        for (key, sub_value) in object {
            let count = sub_value.as_i64();
            match Product::from_key(key) {
                Some(product) => counts.set(product, count),
                None => {
                    unexpected.insert(kind.extra_column(key), count);
                }
            }
        }
        counts
    }
}

impl Default for Normalizer {
    fn default() -> Self {
        Self::new()
    }
}

impl RecordNormalizer for Normalizer {
    fn normalize_row(
        &self,
        row: &HashMap<String, String>,
        row_number: usize,
    ) -> ProductionRecord {
        let mut unexpected = BTreeMap::new();
        let produced = self.decode_counts(row, CountKind::Produced, row_number, &mut unexpected);
        let defective =
            self.decode_counts(row, CountKind::Defective, row_number, &mut unexpected);

        ProductionRecord {
            unit_id: self.cleaner.non_blank(row.get(UNIT_ID_COLUMN).map(String::as_str)),
            produced,
            defective,
            unexpected,
            row_number,
        }
    }
}
