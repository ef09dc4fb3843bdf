// ==========================================
// 生产缺陷报表系统 - 数据清洗器实现
// ==========================================
// 职责: TRIM / NULL 标准化（归一化前的文本清洗）
// 注意: 标识字段不做 TRIM，首尾空白属于格式校验的对象
// ==========================================

pub struct DataCleaner;

impl DataCleaner {
    /// 清洗文本字段（TRIM）
    pub fn clean_text(&self, value: &str) -> String {
        value.trim().to_string()
    }

    /// 标准化 NULL 值（空字符串/空白/字面量 null → None）
    pub fn normalize_null(&self, value: Option<&str>) -> Option<String> {
        value.and_then(|v| {
            let trimmed = self.clean_text(v);
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("null") {
                None
            } else {
                Some(trimmed)
            }
        })
    }

    /// 空白视为缺失，非空白值原样保留（不 TRIM）
    pub fn non_blank(&self, value: Option<&str>) -> Option<String> {
        value
            .filter(|v| !v.trim().is_empty())
            .map(|v| v.to_string())
    }
}
