// ==========================================
// 生产缺陷报表系统 - 文件解析器实现
// ==========================================
// 阶段 0: 文件读取与解析
// 支持: TSV (.tsv, 制表符分隔) / CSV (.csv)
// ==========================================

use crate::domain::production::RawBatch;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::importer_trait::FileParser;
use csv::ReaderBuilder;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fs::File;
use std::path::Path;
use tracing::debug;

/// 读取带表头的分隔文本文件
fn read_delimited(path: &Path, delimiter: u8, expected_ext: &str) -> ImportResult<RawBatch> {
    // 检查文件存在
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    // 检查扩展名
    if let Some(ext) = path.extension() {
        if !ext.eq_ignore_ascii_case(expected_ext) {
            return Err(ImportError::UnsupportedFormat(
                ext.to_string_lossy().to_string(),
            ));
        }
    }

    let file = File::open(path)?;
    let mut reader = ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true) // 允许行长度不一致
        .from_reader(file);

    // 读取表头（按字节读取，非 UTF-8 字节替换为 U+FFFD）
    let headers: Vec<String> = reader
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut rows = Vec::new();
    for (idx, result) in reader.byte_records().enumerate() {
        let record = result?;
        let mut row_map = HashMap::new();

        for (col_idx, value) in record.iter().enumerate() {
            if let Some(header) = headers.get(col_idx) {
                let text = String::from_utf8_lossy(value);
                if let Cow::Owned(_) = text {
                    debug!(row = idx + 1, column = %header, "字段含非 UTF-8 字节，已替换");
                }
                row_map.insert(header.clone(), text.into_owned());
            }
        }

        // 跳过完全空白的行
        if row_map.values().all(|v| v.trim().is_empty()) {
            continue;
        }

        rows.push(row_map);
    }

    debug!(file = %path.display(), rows = rows.len(), "分隔文件解析完成");
    Ok(RawBatch { headers, rows })
}

// ==========================================
// TSV Parser 实现
// ==========================================
pub struct TsvParser;

impl FileParser for TsvParser {
    fn parse_to_raw_batch(&self, file_path: &Path) -> ImportResult<RawBatch> {
        read_delimited(file_path, b'\t', "tsv")
    }
}

// ==========================================
// CSV Parser 实现
// ==========================================
pub struct CsvParser;

impl FileParser for CsvParser {
    fn parse_to_raw_batch(&self, file_path: &Path) -> ImportResult<RawBatch> {
        read_delimited(file_path, b',', "csv")
    }
}

// ==========================================
// 通用文件解析器（根据扩展名自动选择）
// ==========================================
pub struct UniversalFileParser;

impl FileParser for UniversalFileParser {
    fn parse_to_raw_batch(&self, file_path: &Path) -> ImportResult<RawBatch> {
        let ext = file_path
            .extension()
            .and_then(|e| e.to_str())
            .unwrap_or("")
            .to_lowercase();

        match ext.as_str() {
            "tsv" | "txt" => read_delimited(file_path, b'\t', &ext),
            "csv" => CsvParser.parse_to_raw_batch(file_path),
            _ => Err(ImportError::UnsupportedFormat(ext)),
        }
    }
}
