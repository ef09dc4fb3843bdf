// ==========================================
// 生产缺陷报表系统 - 数据质量校验器实现
// ==========================================
// 职责: 批次级校验（顺序固定）
// 1. 唯一性   - 重复标识保留首次出现，记录告警（非致命）
// 2. 列封闭   - 非预期列 → SchemaViolation（致命）
// 3. 数值范围 - 负数/缺失 → RangeViolation（致命）
// 4. 标识格式 - 不匹配格式 → FormatViolation（致命）
// 没有行级拒绝: 要么返回完整清洗批次，要么整批失败
// ==========================================

use crate::domain::production::{CleanBatch, CleanRecord, Counts, ProductionBatch};
use crate::domain::quality::{DqReport, DqSummary, DuplicateRecord};
use crate::domain::types::{allowed_columns, CountKind, Product};
use crate::importer::conflict_handler::ConflictHandler;
use crate::importer::error::{ImportError, ImportResult, ValidationError, ValidationResult};
use crate::importer::importer_trait::{
    ConflictHandler as ConflictHandlerTrait, DqValidator as DqValidatorTrait,
};
use regex::Regex;
use std::collections::{BTreeSet, HashSet};
use tracing::{debug, error, warn};

/// 默认标识格式（仅字母数字）
pub const DEFAULT_UNIT_ID_PATTERN: &str = "^[A-Za-z0-9]*$";

pub struct DqValidator {
    unit_id_pattern: Regex,
    conflict_handler: Box<dyn ConflictHandlerTrait>,
}

impl DqValidator {
    /// 创建校验器
    ///
    /// # 参数
    /// - unit_id_pattern: 标识格式正则
    pub fn new(unit_id_pattern: &str) -> ImportResult<Self> {
        let unit_id_pattern =
            Regex::new(unit_id_pattern).map_err(|e| ImportError::ConfigValueError {
                key: "unit_id_pattern".to_string(),
                value: unit_id_pattern.to_string(),
                message: e.to_string(),
            })?;

        Ok(Self {
            unit_id_pattern,
            conflict_handler: Box::new(ConflictHandler),
        })
    }
}

impl DqValidatorTrait for DqValidator {
    fn enforce_uniqueness(
        &self,
        batch: ProductionBatch,
    ) -> (ProductionBatch, Vec<DuplicateRecord>) {
        let duplicates = self.conflict_handler.detect_duplicates(&batch.records);
        if duplicates.is_empty() {
            return (batch, duplicates);
        }

        let duplicate_ids: BTreeSet<String> = duplicates
            .iter()
            .map(|d| d.unit_id.clone().unwrap_or_else(|| "<missing>".to_string()))
            .collect();
        warn!(
            duplicate_ids = ?duplicate_ids,
            dropped = duplicates.len(),
            "发现重复 Production_Unit_Id，保留首次出现的记录"
        );

        let dropped_rows: HashSet<usize> = duplicates.iter().map(|d| d.row_number).collect();
        let records = batch
            .records
            .into_iter()
            .filter(|r| !dropped_rows.contains(&r.row_number))
            .collect();

        (ProductionBatch::new(records), duplicates)
    }

    fn check_schema(&self, batch: &ProductionBatch) -> ValidationResult<()> {
        let allowed: BTreeSet<String> = allowed_columns().into_iter().collect();
        let unexpected: Vec<String> = batch.columns().difference(&allowed).cloned().collect();

        if unexpected.is_empty() {
            return Ok(());
        }

        error!(columns = ?unexpected, "列封闭检查失败");
        Err(ValidationError::SchemaViolation {
            columns: unexpected,
        })
    }

    fn check_ranges(&self, batch: &ProductionBatch) -> ValidationResult<()> {
        for kind in CountKind::ALL {
            for product in Product::ALL {
                let rows: Vec<usize> = batch
                    .records
                    .iter()
                    .filter(|r| r.counts(kind).get(product).map_or(true, |v| v < 0))
                    .map(|r| r.row_number)
                    .collect();

                if !rows.is_empty() {
                    let column = kind.column(product);
                    error!(column = %column, rows = ?rows, "数值范围检查失败");
                    return Err(ValidationError::RangeViolation { column, rows });
                }
            }
        }
        Ok(())
    }

    fn check_format(&self, batch: &ProductionBatch) -> ValidationResult<()> {
        let unit_ids: Vec<String> = batch
            .records
            .iter()
            .filter(|r| match &r.unit_id {
                Some(id) => !self.unit_id_pattern.is_match(id),
                None => true,
            })
            .map(|r| r.unit_id.clone().unwrap_or_else(|| "<missing>".to_string()))
            .collect();

        if unit_ids.is_empty() {
            return Ok(());
        }

        error!(unit_ids = ?unit_ids, "标识格式检查失败");
        Err(ValidationError::FormatViolation { unit_ids })
    }

    fn validate(
        &self,
        run_id: &str,
        batch: ProductionBatch,
    ) -> ValidationResult<(CleanBatch, DqReport)> {
        let total_rows = batch.len();

        // 1. 唯一性（非致命）
        let (batch, duplicates) = self.enforce_uniqueness(batch);
        let duplicate_ids: HashSet<Option<&str>> =
            duplicates.iter().map(|d| d.unit_id.as_deref()).collect();

        // 2-4. 致命检查
        self.check_schema(&batch)?;
        self.check_ranges(&batch)?;
        self.check_format(&batch)?;

        // 以上检查已保证标识存在且计数非负
        let records: Vec<CleanRecord> = batch
            .records
            .into_iter()
            .filter_map(|r| {
                Some(CleanRecord {
                    produced: Counts::from_raw(&r.produced)?,
                    defective: Counts::from_raw(&r.defective)?,
                    unit_id: r.unit_id?,
                })
            })
            .collect();

        let summary = DqSummary {
            total_rows,
            retained: records.len(),
            dropped: duplicates.len(),
            duplicate_ids: duplicate_ids.len(),
        };
        debug!(?summary, "DQ 校验完成");

        Ok((
            CleanBatch { records },
            DqReport {
                run_id: run_id.to_string(),
                summary,
                duplicates,
            },
        ))
    }
}
