// ==========================================
// 生产缺陷报表系统 - 冲突处理器实现
// ==========================================
// 职责: 检测同批次内重复 Production_Unit_Id
// 保留策略: 输入顺序中首次出现的记录保留，其余视为重复
// ==========================================

use crate::domain::production::ProductionRecord;
use crate::domain::quality::DuplicateRecord;
use crate::importer::importer_trait::ConflictHandler as ConflictHandlerTrait;
use std::collections::HashMap;

pub struct ConflictHandler;

impl ConflictHandlerTrait for ConflictHandler {
    /// 检测同批次内重复标识
    ///
    /// # 返回
    /// - Vec<DuplicateRecord>: 重复记录列表（不包括第一次出现），按输入顺序
    ///
    /// # 说明
    /// - 缺失标识也参与分组（多条缺失标识的记录同样视为重复）
    fn detect_duplicates(&self, records: &[ProductionRecord]) -> Vec<DuplicateRecord> {
        let mut first_occurrence: HashMap<Option<&str>, usize> = HashMap::new();
        let mut duplicates = Vec::new();

        for record in records {
            let key = record.unit_id.as_deref();
            match first_occurrence.get(&key) {
                Some(&kept_row_number) => {
                    duplicates.push(DuplicateRecord {
                        row_number: record.row_number,
                        unit_id: record.unit_id.clone(),
                        kept_row_number,
                    });
                }
                None => {
                    first_occurrence.insert(key, record.row_number);
                }
            }
        }

        duplicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::production::RawCounts;
    use std::collections::BTreeMap;

    fn create_test_record(unit_id: Option<&str>, row_number: usize) -> ProductionRecord {
        ProductionRecord {
            unit_id: unit_id.map(str::to_string),
            produced: RawCounts::missing(),
            defective: RawCounts::missing(),
            unexpected: BTreeMap::new(),
            row_number,
        }
    }

    #[test]
    fn test_detect_duplicates_none() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record(Some("U1"), 1),
            create_test_record(Some("U2"), 2),
        ];

        assert!(handler.detect_duplicates(&records).is_empty());
    }

    #[test]
    fn test_detect_duplicates_found() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record(Some("U1"), 1),
            create_test_record(Some("U2"), 2),
            create_test_record(Some("U1"), 3), // 重复
        ];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].row_number, 3);
        assert_eq!(duplicates[0].kept_row_number, 1);
        assert_eq!(duplicates[0].unit_id.as_deref(), Some("U1"));
    }

    #[test]
    fn test_detect_duplicates_multiple() {
        let handler = ConflictHandler;
        let records = vec![
            create_test_record(Some("U1"), 1),
            create_test_record(Some("U1"), 2), // 重复
            create_test_record(Some("U1"), 3), // 再次重复
        ];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 2);
        assert_eq!(duplicates[0].row_number, 2);
        assert_eq!(duplicates[1].row_number, 3);
    }

    #[test]
    fn test_detect_duplicates_missing_ids_grouped() {
        let handler = ConflictHandler;
        let records = vec![create_test_record(None, 1), create_test_record(None, 2)];

        let duplicates = handler.detect_duplicates(&records);

        assert_eq!(duplicates.len(), 1);
        assert_eq!(duplicates[0].unit_id, None);
    }
}
