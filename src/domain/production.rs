// ==========================================
// 生产缺陷报表系统 - 生产记录领域模型
// ==========================================
// 职责: 归一化记录 / 清洗后记录 / 汇总记录 / 百分比记录
// 生命周期: 仅在单次运行内，每个阶段消费输入并产出新批次
// ==========================================

use crate::domain::types::{allowed_columns, CountKind, Product};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ==========================================
// RawBatch - 原始批次（文件解析产物）
// ==========================================
// 两条路径（校验路径 / 原始路径）各自借用同一原始批次做独立归一化
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawBatch {
    pub headers: Vec<String>,
    pub rows: Vec<HashMap<String, String>>,
}

impl RawBatch {
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// 返回第一个缺失的必需列
    pub fn missing_column<'a>(&self, required: &[&'a str]) -> Option<&'a str> {
        required
            .iter()
            .copied()
            .find(|col| !self.headers.iter().any(|h| h == col))
    }
}

// ==========================================
// RawCounts - 解码后的三产品计数
// ==========================================
// None 表示缺失（编码字段缺失/格式错误/子字段非整数）
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCounts {
    pub rock: Option<i64>,
    pub paper: Option<i64>,
    pub scissor: Option<i64>,
}

impl RawCounts {
    /// 三个子字段全部缺失
    pub fn missing() -> Self {
        Self::default()
    }

    pub fn get(&self, product: Product) -> Option<i64> {
        match product {
            Product::Rock => self.rock,
            Product::Paper => self.paper,
            Product::Scissor => self.scissor,
        }
    }

    pub fn set(&mut self, product: Product, value: Option<i64>) {
        match product {
            Product::Rock => self.rock = value,
            Product::Paper => self.paper = value,
            Product::Scissor => self.scissor = value,
        }
    }

    /// 三产品合计（任一缺失则缺失；i128 求和不会溢出）
    pub fn total(&self) -> Option<i128> {
        Some(i128::from(self.scissor?) + i128::from(self.paper?) + i128::from(self.rock?))
    }
}

// ==========================================
// ProductionRecord - 归一化后的生产记录
// ==========================================
// 用途: 归一化器输出，校验器输入
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProductionRecord {
    pub unit_id: Option<String>,
    pub produced: RawCounts,
    pub defective: RawCounts,
    /// 三个已知产品之外的平铺列（列名 → 值）
    pub unexpected: BTreeMap<String, Option<i64>>,
    /// 原始文件行号（从 1 开始，不含表头）
    pub row_number: usize,
}

impl ProductionRecord {
    pub fn counts(&self, kind: CountKind) -> &RawCounts {
        match kind {
            CountKind::Produced => &self.produced,
            CountKind::Defective => &self.defective,
        }
    }
}

// ==========================================
// ProductionBatch - 归一化批次
// ==========================================
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProductionBatch {
    pub records: Vec<ProductionRecord>,
}

impl ProductionBatch {
    pub fn new(records: Vec<ProductionRecord>) -> Self {
        Self { records }
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// 批次列集合（全量扫描）
    pub fn columns(&self) -> BTreeSet<String> {
        let mut columns: BTreeSet<String> = allowed_columns().into_iter().collect();
        for record in &self.records {
            columns.extend(record.unexpected.keys().cloned());
        }
        columns
    }
}

// ==========================================
// Counts - 校验通过的三产品计数（非负）
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counts {
    pub rock: u64,
    pub paper: u64,
    pub scissor: u64,
}

impl Counts {
    pub fn get(&self, product: Product) -> u64 {
        match product {
            Product::Rock => self.rock,
            Product::Paper => self.paper,
            Product::Scissor => self.scissor,
        }
    }

    /// 三产品合计（u128 求和，精确无溢出）
    pub fn total(&self) -> u128 {
        u128::from(self.scissor) + u128::from(self.paper) + u128::from(self.rock)
    }

    /// 从原始计数转换；任一子字段缺失或为负返回 None
    pub fn from_raw(raw: &RawCounts) -> Option<Self> {
        Some(Self {
            rock: u64::try_from(raw.rock?).ok()?,
            paper: u64::try_from(raw.paper?).ok()?,
            scissor: u64::try_from(raw.scissor?).ok()?,
        })
    }
}

// ==========================================
// CleanRecord / CleanBatch - 校验器输出
// ==========================================
// 不变式: unit_id 批内唯一且格式合法，列集合封闭，计数非负
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanRecord {
    pub unit_id: String,
    pub produced: Counts,
    pub defective: Counts,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CleanBatch {
    pub records: Vec<CleanRecord>,
}

impl CleanBatch {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

// ==========================================
// AggregatedRecord - 按单元汇总
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AggregatedRecord {
    pub unit_id: String,
    pub total_produced: u128,
    pub total_defective: u128,
}

// ==========================================
// PercentageRecord - 缺陷百分比
// ==========================================
// None: 分母为 0，结果未定义（不是错误，原样输出为 NULL）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PercentageRecord {
    pub unit_id: String,
    pub defect_pct_scissor: Option<f64>,
    pub defect_pct_paper: Option<f64>,
    pub defect_pct_rock: Option<f64>,
    pub overall_defect_pct: Option<f64>,
}
