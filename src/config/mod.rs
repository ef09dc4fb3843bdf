// ==========================================
// 生产缺陷报表系统 - 配置层
// ==========================================
// 职责: 作业参数（命令行 / 环境变量 / JSON 文件）
//       流水线调优参数（config_kv 表）
// ==========================================

pub mod config_manager;
pub mod job_config;
pub mod pipeline_config_trait;

// 重导出核心类型
pub use config_manager::{config_keys, ConfigManager};
pub use job_config::{default_warehouse_path, JobConfig};
pub use pipeline_config_trait::PipelineConfigReader;
