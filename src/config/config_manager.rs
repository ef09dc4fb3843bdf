// ==========================================
// 生产缺陷报表系统 - 配置管理器
// ==========================================
// 职责: 流水线调优参数的加载、查询、覆写
// 存储: config_kv 表 (key-value + scope)
// ==========================================

use crate::config::pipeline_config_trait::PipelineConfigReader;
use crate::db::{init_config_schema, open_sqlite_connection};
use crate::engine::report_builder::DEFAULT_ALERT_THRESHOLD_PCT;
use crate::importer::dq_validator::DEFAULT_UNIT_ID_PATTERN;
use crate::importer::error::ImportError;
use async_trait::async_trait;
use rusqlite::{params, Connection};
use serde_json::json;
use std::collections::BTreeMap;
use std::error::Error;
use std::sync::{Arc, Mutex};

// ==========================================
// 配置键
// ==========================================
pub mod config_keys {
    pub const ALERT_THRESHOLD_PCT: &str = "alert_threshold_pct";
    pub const UNIT_ID_PATTERN: &str = "unit_id_pattern";
}

// ==========================================
// ConfigManager - 配置管理器
// ==========================================
pub struct ConfigManager {
    conn: Arc<Mutex<Connection>>,
}

impl ConfigManager {
    /// 创建新的 ConfigManager 实例（config_kv 表不存在时自动创建）
    ///
    /// # 参数
    /// - db_path: 数据库文件路径
    pub fn new(db_path: &str) -> Result<Self, Box<dyn Error>> {
        let conn = open_sqlite_connection(db_path)?;
        init_config_schema(&conn)?;

        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建 ConfigManager
    ///
    /// 说明：会对传入连接再次应用统一 PRAGMA 并确保 config_kv 存在（幂等）
    pub fn from_connection(conn: Arc<Mutex<Connection>>) -> Result<Self, Box<dyn Error>> {
        {
            let conn_guard = conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
            crate::db::configure_sqlite_connection(&conn_guard)?;
            init_config_schema(&conn_guard)?;
        }

        Ok(Self { conn })
    }

    /// 从 config_kv 表读取配置值（scope_id='global'）
    ///
    /// # 返回
    /// - Some(String): 配置值
    /// - None: 配置不存在
    fn get_config_value(&self, key: &str) -> Result<Option<String>, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let result = conn.query_row(
            "SELECT value FROM config_kv WHERE scope_id = 'global' AND key = ?1",
            params![key],
            |row| row.get::<_, String>(0),
        );

        match result {
            Ok(value) => Ok(Some(value)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(Box::new(e)),
        }
    }

    /// 写入 global scope 的配置值（存在则覆盖）
    pub fn set_global_config_value(&self, key: &str, value: &str) -> Result<(), Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;
        conn.execute(
            "INSERT INTO config_kv (scope_id, key, value) VALUES ('global', ?1, ?2)
             ON CONFLICT(scope_id, key) DO UPDATE SET value = ?2, updated_at = datetime('now')",
            params![key, value],
        )?;
        Ok(())
    }

    fn get_config_or_default(&self, key: &str, default: &str) -> Result<String, Box<dyn Error>> {
        Ok(self.get_config_value(key)?.unwrap_or_else(|| default.to_string()))
    }
}

#[async_trait]
impl PipelineConfigReader for ConfigManager {
    async fn get_alert_threshold_pct(&self) -> Result<f64, Box<dyn Error>> {
        let default = DEFAULT_ALERT_THRESHOLD_PCT.to_string();
        let value = self.get_config_or_default(config_keys::ALERT_THRESHOLD_PCT, &default)?;

        let parsed = value
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
            .ok_or_else(|| ImportError::ConfigValueError {
                key: config_keys::ALERT_THRESHOLD_PCT.to_string(),
                value: value.clone(),
                message: "需要有限数值".to_string(),
            })?;
        Ok(parsed)
    }

    async fn get_unit_id_pattern(&self) -> Result<String, Box<dyn Error>> {
        let value = self.get_config_or_default(config_keys::UNIT_ID_PATTERN, DEFAULT_UNIT_ID_PATTERN)?;
        if value.trim().is_empty() {
            return Err(Box::new(ImportError::ConfigValueError {
                key: config_keys::UNIT_ID_PATTERN.to_string(),
                value,
                message: "正则不能为空".to_string(),
            }));
        }
        Ok(value)
    }

    async fn get_config_snapshot(&self) -> Result<String, Box<dyn Error>> {
        let conn = self.conn.lock().map_err(|e| format!("锁获取失败: {}", e))?;

        let mut stmt =
            conn.prepare("SELECT key, value FROM config_kv WHERE scope_id = 'global' ORDER BY key")?;
        let rows = stmt.query_map([], |row| {
            Ok((row.get::<_, String>(0)?, row.get::<_, String>(1)?))
        })?;

        let mut config_map: BTreeMap<String, String> = BTreeMap::new();
        for row in rows {
            let (key, value) = row?;
            config_map.insert(key, value);
        }

        Ok(serde_json::to_string(&json!(config_map))?)
    }
}
