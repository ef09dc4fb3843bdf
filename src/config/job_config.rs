// ==========================================
// 生产缺陷报表系统 - 作业参数
// ==========================================
// 来源（优先级由低到高）:
// 1. JSON 文件（--config <path>）
// 2. 环境变量 DEFECT_ETL_<KEY>
// 3. 命令行 --<key> <value> / --<key>=<value>
// 兼容历史作业参数名（input_bucket / redshift_url / ...）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// 环境变量前缀
pub const ENV_PREFIX: &str = "DEFECT_ETL_";

/// 仓库路径环境变量
pub const DB_PATH_ENV: &str = "DEFECT_ETL_DB_PATH";

/// 日志格式环境变量（json / 其他值为人读格式）
pub const LOG_FORMAT_ENV: &str = "DEFECT_ETL_LOG_FORMAT";

/// 默认输入文件名
pub const DEFAULT_INPUT_FILE_NAME: &str = "Production_logs.tsv";

/// 默认作业名
pub const DEFAULT_JOB_NAME: &str = "production-defect-etl";

// ==========================================
// JobConfig - 单次作业参数
// ==========================================
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobConfig {
    pub job_name: String,
    pub run_id: String,
    pub input_location: String,
    pub input_file_name: String,
    /// 暂存目录（空串表示不写暂存文件）
    pub output_location: String,
    /// 仓库地址（SQLite 文件路径）
    pub warehouse_url: String,
    pub warehouse_user: String,
    pub warehouse_password: String,
    pub report1_table: String,
    pub report2_table: String,
    pub report3_table: String,
    pub sales_table: String,
    pub complaints_table: String,
    pub production_table: String,
    pub target_schema: String,
    pub target_database: String,
}

impl fmt::Debug for JobConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JobConfig")
            .field("job_name", &self.job_name)
            .field("run_id", &self.run_id)
            .field("input_location", &self.input_location)
            .field("input_file_name", &self.input_file_name)
            .field("output_location", &self.output_location)
            .field("warehouse_url", &self.warehouse_url)
            .field("warehouse_user", &self.warehouse_user)
            .field("warehouse_password", &"***")
            .field("report1_table", &self.report1_table)
            .field("report2_table", &self.report2_table)
            .field("report3_table", &self.report3_table)
            .field("sales_table", &self.sales_table)
            .field("complaints_table", &self.complaints_table)
            .field("production_table", &self.production_table)
            .field("target_schema", &self.target_schema)
            .field("target_database", &self.target_database)
            .finish()
    }
}

/// 参数名归一: 小写、'-' → '_'、历史参数名映射到字段名
fn canonical_key(key: &str) -> String {
    let key = key.trim().trim_start_matches('-').to_lowercase().replace('-', "_");
    let mapped = match key.as_str() {
        "input_bucket" => "input_location",
        "output_bucket" => "output_location",
        "redshift_url" => "warehouse_url",
        "redshift_user" => "warehouse_user",
        "redshift_password" => "warehouse_password",
        "redshift_schema" => "target_schema",
        "redshift_database" => "target_database",
        other => other,
    };
    mapped.to_string()
}

/// 解析命令行参数
///
/// # 返回
/// - (配置文件路径, 参数表)
pub fn parse_cli_args<I, S>(args: I) -> ImportResult<(Option<PathBuf>, HashMap<String, String>)>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    let mut config_path = None;
    let mut values = HashMap::new();
    let mut iter = args.into_iter().map(Into::into);

    while let Some(arg) = iter.next() {
        let Some(flag) = arg.strip_prefix("--") else {
            return Err(ImportError::ConfigValueError {
                key: arg.clone(),
                value: arg,
                message: "参数需以 -- 开头".to_string(),
            });
        };

        let (key, value) = match flag.split_once('=') {
            Some((k, v)) => (k.to_string(), v.to_string()),
            None => {
                let value = iter.next().ok_or_else(|| ImportError::ConfigValueError {
                    key: flag.to_string(),
                    value: String::new(),
                    message: "缺少参数值".to_string(),
                })?;
                (flag.to_string(), value)
            }
        };

        let key = canonical_key(&key);
        if key == "config" {
            config_path = Some(PathBuf::from(value));
        } else {
            values.insert(key, value);
        }
    }

    Ok((config_path, values))
}

/// 从环境变量收集参数（仅 DEFECT_ETL_ 前缀，排除仓库路径与日志格式变量）
pub fn collect_env_vars<I>(vars: I) -> HashMap<String, String>
where
    I: IntoIterator<Item = (String, String)>,
{
    vars.into_iter()
        .filter(|(k, _)| k != DB_PATH_ENV && k != LOG_FORMAT_ENV)
        .filter_map(|(k, v)| {
            k.strip_prefix(ENV_PREFIX)
                .map(|rest| (canonical_key(rest), v))
        })
        .collect()
}

/// 读取 JSON 配置文件（顶层对象，值为字符串或数字）
pub fn read_json_file(path: &Path) -> ImportResult<HashMap<String, String>> {
    if !path.exists() {
        return Err(ImportError::FileNotFound(path.display().to_string()));
    }

    let content = std::fs::read_to_string(path)?;
    let json: Value = serde_json::from_str(&content).map_err(|e| ImportError::ConfigReadError {
        key: path.display().to_string(),
        message: e.to_string(),
    })?;

    let Value::Object(map) = json else {
        return Err(ImportError::ConfigReadError {
            key: path.display().to_string(),
            message: "顶层必须是 JSON 对象".to_string(),
        });
    };

    map.into_iter()
        .map(|(k, v)| {
            let value = match v {
                Value::String(s) => s,
                Value::Number(n) => n.to_string(),
                Value::Bool(b) => b.to_string(),
                Value::Null => String::new(),
                other => {
                    return Err(ImportError::ConfigValueError {
                        key: k,
                        value: other.to_string(),
                        message: "仅支持字符串/数字".to_string(),
                    })
                }
            };
            Ok((canonical_key(&k), value))
        })
        .collect()
}

/// 默认仓库路径
///
/// # 优先级
/// 1. 环境变量 DEFECT_ETL_DB_PATH
/// 2. 用户数据目录/production-defect-etl/warehouse.db
/// 3. ./warehouse.db
pub fn default_warehouse_path() -> String {
    if let Ok(path) = std::env::var(DB_PATH_ENV) {
        let trimmed = path.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    let mut path = PathBuf::from("./warehouse.db");
    if let Some(data_dir) = dirs::data_dir() {
        let dir = data_dir.join(DEFAULT_JOB_NAME);
        if std::fs::create_dir_all(&dir).is_ok() {
            path = dir.join("warehouse.db");
        }
    }
    path.to_string_lossy().to_string()
}

impl JobConfig {
    /// 从合并后的参数表构建
    pub fn from_map(mut values: HashMap<String, String>) -> ImportResult<Self> {
        let mut take = |key: &str| values.remove(key).map(|v| v.trim().to_string());

        let config = Self {
            job_name: take("job_name")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_JOB_NAME.to_string()),
            run_id: take("run_id")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| Uuid::new_v4().to_string()),
            input_location: take("input_location").unwrap_or_default(),
            input_file_name: take("input_file_name")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| DEFAULT_INPUT_FILE_NAME.to_string()),
            output_location: take("output_location").unwrap_or_default(),
            warehouse_url: take("warehouse_url")
                .filter(|v| !v.is_empty())
                .unwrap_or_else(default_warehouse_path),
            warehouse_user: take("warehouse_user").unwrap_or_default(),
            warehouse_password: take("warehouse_password").unwrap_or_default(),
            report1_table: take("report1_table").unwrap_or_default(),
            report2_table: take("report2_table").unwrap_or_default(),
            report3_table: take("report3_table").unwrap_or_default(),
            sales_table: take("sales_table").unwrap_or_default(),
            complaints_table: take("complaints_table").unwrap_or_default(),
            production_table: take("production_table").unwrap_or_default(),
            target_schema: take("target_schema").unwrap_or_default(),
            target_database: take("target_database").unwrap_or_default(),
        };

        if let Some(key) = values.keys().next() {
            return Err(ImportError::ConfigValueError {
                key: key.clone(),
                value: values.get(key).cloned().unwrap_or_default(),
                message: "未知参数".to_string(),
            });
        }

        config.validate()?;
        Ok(config)
    }

    /// 按优先级合并三种来源
    ///
    /// # 参数
    /// - args: 命令行参数（不含程序名）
    /// - env: 环境变量
    pub fn load<A, S, E>(args: A, env: E) -> ImportResult<Self>
    where
        A: IntoIterator<Item = S>,
        S: Into<String>,
        E: IntoIterator<Item = (String, String)>,
    {
        let (config_path, cli_values) = parse_cli_args(args)?;

        let mut values = match config_path {
            Some(path) => read_json_file(&path)?,
            None => HashMap::new(),
        };
        values.extend(collect_env_vars(env));
        values.extend(cli_values);

        Self::from_map(values)
    }

    /// 从当前进程的命令行与环境变量加载
    pub fn from_process() -> ImportResult<Self> {
        Self::load(std::env::args().skip(1), std::env::vars())
    }

    /// 校验必需参数
    pub fn validate(&self) -> ImportResult<()> {
        let required = [
            ("input_location", &self.input_location),
            ("report1_table", &self.report1_table),
            ("report2_table", &self.report2_table),
            ("report3_table", &self.report3_table),
        ];

        for (key, value) in required {
            if value.is_empty() {
                return Err(ImportError::ConfigValueError {
                    key: key.to_string(),
                    value: String::new(),
                    message: "必需参数为空".to_string(),
                });
            }
        }
        Ok(())
    }

    /// 输入文件完整路径
    pub fn input_path(&self) -> PathBuf {
        Path::new(&self.input_location).join(&self.input_file_name)
    }

    /// 暂存目录（未配置时为 None）
    pub fn staging_dir(&self) -> Option<PathBuf> {
        (!self.output_location.is_empty()).then(|| PathBuf::from(&self.output_location))
    }
}
