// ==========================================
// 生产缺陷报表系统 - 导入层
// ==========================================
// 职责: 原始文件 → 原始批次 → 归一化批次 → 清洗批次
// 支持: TSV, CSV
// ==========================================

// 模块声明
pub mod conflict_handler;
pub mod data_cleaner;
pub mod dq_validator;
pub mod error;
pub mod file_parser;
pub mod importer_trait;
pub mod normalizer;

// 重导出核心类型
pub use conflict_handler::ConflictHandler as ConflictHandlerImpl;
pub use data_cleaner::DataCleaner;
pub use dq_validator::{DqValidator as DqValidatorImpl, DEFAULT_UNIT_ID_PATTERN};
pub use error::{ImportError, ImportResult, ValidationError, ValidationResult};
pub use file_parser::{CsvParser, TsvParser, UniversalFileParser};
pub use normalizer::Normalizer;

// 重导出 Trait 接口
pub use importer_trait::{ConflictHandler, DqValidator, FileParser, RecordNormalizer};
