// ==========================================
// 生产缺陷报表系统 - 流水线配置读取 Trait
// ==========================================
// 职责: 定义流水线所需的调优参数读取接口（不包含实现）
// 红线: 不包含配置写入、不包含业务逻辑
// ==========================================

use async_trait::async_trait;
use std::error::Error;

// ==========================================
// PipelineConfigReader Trait
// ==========================================
// 实现者: ConfigManager（从 config_kv 表读取）
#[async_trait]
pub trait PipelineConfigReader: Send + Sync {
    /// 获取报表 B 告警阈值（百分比，严格大于）
    ///
    /// # 默认值
    /// - 20.0
    async fn get_alert_threshold_pct(&self) -> Result<f64, Box<dyn Error>>;

    /// 获取 Production_Unit_Id 格式正则
    ///
    /// # 默认值
    /// - ^[A-Za-z0-9]*$
    async fn get_unit_id_pattern(&self) -> Result<String, Box<dyn Error>>;

    /// 获取全部生效配置的快照（JSON 格式）
    ///
    /// # 用途
    /// - 运行开始时记录到日志
    async fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>>;
}
