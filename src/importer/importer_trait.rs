// ==========================================
// 生产缺陷报表系统 - 导入与校验 Trait
// ==========================================
// 职责: 定义解析 / 归一化 / 冲突检测 / 质量校验接口（不包含实现）
// ==========================================

use crate::domain::production::{CleanBatch, ProductionBatch, ProductionRecord, RawBatch};
use crate::domain::quality::{DqReport, DuplicateRecord};
use crate::importer::error::{ImportResult, ValidationResult};
use std::collections::HashMap;
use std::path::Path;

// ==========================================
// FileParser Trait
// ==========================================
// 用途: 文件解析接口（阶段 0）
// 实现者: TsvParser, CsvParser, UniversalFileParser
pub trait FileParser: Send + Sync {
    /// 解析文件为原始批次（表头 + 行记录 HashMap<列名, 值>）
    ///
    /// # 返回
    /// - Ok(RawBatch): 原始批次
    /// - Err: 文件不存在、扩展名不支持、读取失败
    fn parse_to_raw_batch(&self, file_path: &Path) -> ImportResult<RawBatch>;
}

// ==========================================
// RecordNormalizer Trait
// ==========================================
// 用途: 编码列解码 + 平铺（阶段 1）
// 实现者: Normalizer
pub trait RecordNormalizer: Send + Sync {
    /// 归一化单行
    ///
    /// # 说明
    /// - 编码字段缺失或格式错误时，对应子字段为缺失值，不中断记录
    fn normalize_row(&self, row: &HashMap<String, String>, row_number: usize)
        -> ProductionRecord;

    /// 归一化整个原始批次（逐行独立，行号从 1 开始）
    fn normalize_batch(&self, raw: &RawBatch) -> ProductionBatch {
        ProductionBatch::new(
            raw.rows
                .iter()
                .enumerate()
                .map(|(idx, row)| self.normalize_row(row, idx + 1))
                .collect(),
        )
    }
}

// ==========================================
// ConflictHandler Trait
// ==========================================
// 用途: 同批次重复标识检测
// 实现者: ConflictHandler
pub trait ConflictHandler: Send + Sync {
    /// 检测同批次内重复标识
    ///
    /// # 返回
    /// - Vec<DuplicateRecord>: 重复记录列表（不包括第一次出现）
    fn detect_duplicates(&self, records: &[ProductionRecord]) -> Vec<DuplicateRecord>;
}

// ==========================================
// DqValidator Trait
// ==========================================
// 用途: 批次级数据质量校验（阶段 2）
// 实现者: DqValidator
// 说明: 每项检查都需要完整批次，是并行实现中的屏障点
pub trait DqValidator: Send + Sync {
    /// 唯一性: 每个重复标识保留首次出现的记录（非致命）
    fn enforce_uniqueness(&self, batch: ProductionBatch) -> (ProductionBatch, Vec<DuplicateRecord>);

    /// 列封闭: 存在六个计数列与标识列之外的列即失败
    fn check_schema(&self, batch: &ProductionBatch) -> ValidationResult<()>;

    /// 数值范围: 任一计数为负或缺失即失败
    fn check_ranges(&self, batch: &ProductionBatch) -> ValidationResult<()>;

    /// 标识格式: 任一标识不匹配格式即失败
    fn check_format(&self, batch: &ProductionBatch) -> ValidationResult<()>;

    /// 按顺序执行全部检查，返回清洗后批次与 DQ 报告
    fn validate(
        &self,
        run_id: &str,
        batch: ProductionBatch,
    ) -> ValidationResult<(CleanBatch, DqReport)>;
}
