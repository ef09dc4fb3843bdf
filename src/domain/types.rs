// ==========================================
// 生产缺陷报表系统 - 领域类型定义
// ==========================================
// 职责: 产品线 / 计数类别 / 列名常量
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

/// 标识列（源文件列名）
pub const UNIT_ID_COLUMN: &str = "Production_Unit_Id";

/// 产量编码列
pub const ITEMS_PRODUCED_COLUMN: &str = "Items_Produced";

/// 缺陷数编码列
pub const DEFECTIVE_ITEMS_COLUMN: &str = "Defective_Items";

// ==========================================
// Product - 产品线
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Product {
    Rock,
    Paper,
    Scissor,
}

impl Product {
    /// 校验与报表使用的固定顺序: scissor, paper, rock
    pub const ALL: [Product; 3] = [Product::Scissor, Product::Paper, Product::Rock];

    /// 编码字段中的子字段名
    pub fn key(&self) -> &'static str {
        match self {
            Product::Rock => "rock",
            Product::Paper => "paper",
            Product::Scissor => "scissor",
        }
    }

    /// 平铺列名后缀
    pub fn label(&self) -> &'static str {
        match self {
            Product::Rock => "Rock",
            Product::Paper => "Paper",
            Product::Scissor => "Scissor",
        }
    }

    pub fn from_key(key: &str) -> Option<Self> {
        match key {
            "rock" => Some(Product::Rock),
            "paper" => Some(Product::Paper),
            "scissor" => Some(Product::Scissor),
            _ => None,
        }
    }
}

impl fmt::Display for Product {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.key())
    }
}

// ==========================================
// CountKind - 计数类别（产量 / 缺陷）
// ==========================================
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CountKind {
    Produced,
    Defective,
}

impl CountKind {
    pub const ALL: [CountKind; 2] = [CountKind::Produced, CountKind::Defective];

    /// 对应的源编码列
    pub fn source_column(&self) -> &'static str {
        match self {
            CountKind::Produced => ITEMS_PRODUCED_COLUMN,
            CountKind::Defective => DEFECTIVE_ITEMS_COLUMN,
        }
    }

    /// 平铺列名（已知产品）
    pub fn column(&self, product: Product) -> String {
        self.column_for_key(product.label())
    }

    /// 平铺列名（任意子字段，首字母大写）
    pub fn column_for_key(&self, key: &str) -> String {
        let mut chars = key.chars();
        let suffix = match chars.next() {
            Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
            None => String::new(),
        };
        format!("{}_{}", self.source_column(), suffix)
    }

    /// 未知子字段的平铺列名
    ///
    /// 大小写变体（如 "Rock"）首字母大写后会与已知产品列重名，
    /// 此时保留原始键: Items_Produced.Rock
    pub fn extra_column(&self, key: &str) -> String {
        let column = self.column_for_key(key);
        if Product::ALL.iter().any(|p| self.column(*p) == column) {
            format!("{}.{}", self.source_column(), key)
        } else {
            column
        }
    }
}

/// 校验后批次允许的全部列（标识列 + 六个计数列）
pub fn allowed_columns() -> Vec<String> {
    let mut columns = vec![UNIT_ID_COLUMN.to_string()];
    columns.extend(count_columns());
    columns
}

/// 六个计数列，按校验顺序排列
pub fn count_columns() -> Vec<String> {
    CountKind::ALL
        .iter()
        .flat_map(|kind| Product::ALL.iter().map(move |p| kind.column(*p)))
        .collect()
}
