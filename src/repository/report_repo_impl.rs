// ==========================================
// 生产缺陷报表系统 - 报表写出实现（SQLite）
// ==========================================
// 目标表: {target_schema}_{reportN_table}（SQLite 无 schema 命名空间）
// 写入方式: 每次运行整表替换（DROP → CREATE → INSERT）
// 事务边界: 报表 A + B 同一事务；报表 C 单独事务
// 暂存: 配置了暂存目录时，先写 <staging>/temp/<table>.csv，再从该文件装载入表
// ==========================================

use crate::db::open_sqlite_connection;
use crate::domain::report::{AlertReportRow, DefectReportRow, DiscardReportRow, ValidatedReports};
use crate::repository::error::{RepositoryError, RepositoryResult};
use crate::repository::report_repo::ReportSink;
use async_trait::async_trait;
use rusqlite::{params, Connection, Transaction};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::borrow::Cow;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tracing::{debug, info};

// ==========================================
// 输出列名（小写，与历史仓库表一致）
// ==========================================
pub mod columns {
    pub const UNIT_ID: &str = "production_unit_id";
    pub const PCT_SCISSOR: &str = "defective_percentage_scissor";
    pub const PCT_PAPER: &str = "defective_percentage_paper";
    pub const PCT_ROCK: &str = "defective_percentage_rock";
    pub const PCT_OVERALL: &str = "overall_percentage_defective";
    pub const PCT_DISCARDED: &str = "percentage_items_discarded";
}

// ==========================================
// ReportTables - 三张目标表的完整表名
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportTables {
    pub defect_table: String,
    pub alert_table: String,
    pub discard_table: String,
}

impl ReportTables {
    /// 由 schema 前缀与三张报表表名组装
    ///
    /// # 参数
    /// - schema: 目标 schema（为空时不加前缀）
    /// - report1/2/3: 报表 A/B/C 表名
    pub fn new(schema: &str, report1: &str, report2: &str, report3: &str) -> RepositoryResult<Self> {
        Ok(Self {
            defect_table: qualify(schema, report1)?,
            alert_table: qualify(schema, report2)?,
            discard_table: qualify(schema, report3)?,
        })
    }
}

fn qualify(schema: &str, table: &str) -> RepositoryResult<String> {
    let name = if schema.trim().is_empty() {
        table.trim().to_string()
    } else {
        format!("{}_{}", schema.trim(), table.trim())
    };

    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_');
    if !valid {
        return Err(RepositoryError::InvalidTableName(name));
    }
    Ok(name)
}

fn quote(name: &str) -> String {
    format!("\"{}\"", name)
}

// ===== 暂存 CSV 行结构（列名即目标表列名） =====

#[derive(Serialize, Deserialize)]
struct DefectCsvRow {
    production_unit_id: String,
    defective_percentage_scissor: Option<f64>,
    defective_percentage_paper: Option<f64>,
    defective_percentage_rock: Option<f64>,
    overall_percentage_defective: Option<f64>,
}

impl From<&DefectReportRow> for DefectCsvRow {
    fn from(r: &DefectReportRow) -> Self {
        Self {
            production_unit_id: r.unit_id.clone(),
            defective_percentage_scissor: r.defect_pct_scissor,
            defective_percentage_paper: r.defect_pct_paper,
            defective_percentage_rock: r.defect_pct_rock,
            overall_percentage_defective: r.overall_defect_pct,
        }
    }
}

impl From<DefectCsvRow> for DefectReportRow {
    fn from(r: DefectCsvRow) -> Self {
        Self {
            unit_id: r.production_unit_id,
            defect_pct_scissor: r.defective_percentage_scissor,
            defect_pct_paper: r.defective_percentage_paper,
            defect_pct_rock: r.defective_percentage_rock,
            overall_defect_pct: r.overall_percentage_defective,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct AlertCsvRow {
    production_unit_id: String,
    overall_percentage_defective: f64,
}

impl From<&AlertReportRow> for AlertCsvRow {
    fn from(r: &AlertReportRow) -> Self {
        Self {
            production_unit_id: r.unit_id.clone(),
            overall_percentage_defective: r.overall_defect_pct,
        }
    }
}

impl From<AlertCsvRow> for AlertReportRow {
    fn from(r: AlertCsvRow) -> Self {
        Self {
            unit_id: r.production_unit_id,
            overall_defect_pct: r.overall_percentage_defective,
        }
    }
}

#[derive(Serialize, Deserialize)]
struct DiscardCsvRow {
    production_unit_id: Option<String>,
    percentage_items_discarded: Option<f64>,
}

impl From<&DiscardReportRow> for DiscardCsvRow {
    fn from(r: &DiscardReportRow) -> Self {
        Self {
            production_unit_id: r.unit_id.clone(),
            percentage_items_discarded: r.discard_pct,
        }
    }
}

impl From<DiscardCsvRow> for DiscardReportRow {
    fn from(r: DiscardCsvRow) -> Self {
        Self {
            unit_id: r.production_unit_id,
            discard_pct: r.percentage_items_discarded,
        }
    }
}

// ==========================================
// SqliteReportSink - 报表写出实现
// ==========================================
pub struct SqliteReportSink {
    conn: Arc<Mutex<Connection>>,
    tables: ReportTables,
    staging_dir: Option<PathBuf>,
}

impl SqliteReportSink {
    /// 打开仓库数据库并创建写出器
    ///
    /// # 参数
    /// - db_path: 仓库数据库文件路径
    /// - tables: 目标表名
    /// - staging_dir: 暂存目录（None 表示不写暂存文件）
    pub fn new(
        db_path: &str,
        tables: ReportTables,
        staging_dir: Option<PathBuf>,
    ) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)
            .map_err(|e| RepositoryError::DatabaseConnectionError(e.to_string()))?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
            tables,
            staging_dir,
        })
    }

    /// 从已有连接创建写出器
    pub fn from_connection(
        conn: Arc<Mutex<Connection>>,
        tables: ReportTables,
        staging_dir: Option<PathBuf>,
    ) -> Self {
        Self {
            conn,
            tables,
            staging_dir,
        }
    }

    /// 暂存文件路径: <staging_dir>/temp/<table>.csv
    pub fn staging_path(&self, table: &str) -> Option<PathBuf> {
        self.staging_dir
            .as_ref()
            .map(|dir| dir.join("temp").join(format!("{}.csv", table)))
    }

    /// 写出暂存文件并从暂存文件读回待装载的行
    ///
    /// # 返回
    /// - 未配置暂存目录: 原样借用内存中的行
    /// - 已配置: 从 <staging_dir>/temp/<table>.csv 装载的行
    fn stage<'a, T, R>(&self, table: &str, rows: &'a [R]) -> RepositoryResult<Cow<'a, [R]>>
    where
        T: Serialize + DeserializeOwned + for<'r> From<&'r R> + Into<R>,
        R: Clone,
    {
        let Some(path) = self.staging_path(table) else {
            return Ok(Cow::Borrowed(rows));
        };
        write_staging_csv::<T, R>(&path, rows)?;
        let loaded = read_staging_csv::<T, R>(&path)?;
        debug!(
            table = %table,
            path = %path.display(),
            staged = rows.len(),
            loaded = loaded.len(),
            "暂存文件已写出并装载"
        );
        Ok(Cow::Owned(loaded))
    }

    fn write_validated_sync(&self, reports: &ValidatedReports) -> RepositoryResult<usize> {
        let defect_rows =
            self.stage::<DefectCsvRow, _>(&self.tables.defect_table, reports.defect_rows.as_slice())?;
        let alert_rows =
            self.stage::<AlertCsvRow, _>(&self.tables.alert_table, reports.alert_rows.as_slice())?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        let defect = replace_defect_table(&tx, &self.tables.defect_table, &defect_rows)?;
        let alert = replace_alert_table(&tx, &self.tables.alert_table, &alert_rows)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(
            defect_table = %self.tables.defect_table,
            alert_table = %self.tables.alert_table,
            defect_rows = defect,
            alert_rows = alert,
            "报表 A/B 已写出"
        );
        Ok(defect + alert)
    }

    fn write_discard_sync(&self, rows: &[DiscardReportRow]) -> RepositoryResult<usize> {
        let rows = self.stage::<DiscardCsvRow, _>(&self.tables.discard_table, rows)?;

        let conn = self
            .conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))?;
        let tx = conn.unchecked_transaction()?;

        let written = replace_discard_table(&tx, &self.tables.discard_table, &rows)?;

        tx.commit()
            .map_err(|e| RepositoryError::DatabaseTransactionError(e.to_string()))?;

        info!(discard_table = %self.tables.discard_table, discard_rows = written, "报表 C 已写出");
        Ok(written)
    }
}

#[async_trait]
impl ReportSink for SqliteReportSink {
    async fn write_validated_reports(&self, reports: &ValidatedReports) -> RepositoryResult<usize> {
        self.write_validated_sync(reports)
    }

    async fn write_discard_report(&self, rows: &[DiscardReportRow]) -> RepositoryResult<usize> {
        self.write_discard_sync(rows)
    }
}

// ==========================================
// 建表 + 写入（事务内）
// ==========================================

fn recreate_table(tx: &Transaction, table: &str, column_defs: &str) -> RepositoryResult<()> {
    let table = quote(table);
    tx.execute_batch(&format!(
        "DROP TABLE IF EXISTS {table};\nCREATE TABLE {table} ({column_defs});"
    ))?;
    Ok(())
}

fn replace_defect_table(
    tx: &Transaction,
    table: &str,
    rows: &[DefectReportRow],
) -> RepositoryResult<usize> {
    recreate_table(
        tx,
        table,
        &format!(
            "{} TEXT NOT NULL, {} REAL, {} REAL, {} REAL, {} REAL",
            columns::UNIT_ID,
            columns::PCT_SCISSOR,
            columns::PCT_PAPER,
            columns::PCT_ROCK,
            columns::PCT_OVERALL
        ),
    )?;

    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} ({}, {}, {}, {}, {}) VALUES (?1, ?2, ?3, ?4, ?5)",
        quote(table),
        columns::UNIT_ID,
        columns::PCT_SCISSOR,
        columns::PCT_PAPER,
        columns::PCT_ROCK,
        columns::PCT_OVERALL
    ))?;
    for row in rows {
        stmt.execute(params![
            row.unit_id,
            row.defect_pct_scissor,
            row.defect_pct_paper,
            row.defect_pct_rock,
            row.overall_defect_pct,
        ])?;
    }
    Ok(rows.len())
}

fn replace_alert_table(
    tx: &Transaction,
    table: &str,
    rows: &[AlertReportRow],
) -> RepositoryResult<usize> {
    recreate_table(
        tx,
        table,
        &format!(
            "{} TEXT NOT NULL, {} REAL NOT NULL",
            columns::UNIT_ID,
            columns::PCT_OVERALL
        ),
    )?;

    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
        quote(table),
        columns::UNIT_ID,
        columns::PCT_OVERALL
    ))?;
    for row in rows {
        stmt.execute(params![row.unit_id, row.overall_defect_pct])?;
    }
    Ok(rows.len())
}

fn replace_discard_table(
    tx: &Transaction,
    table: &str,
    rows: &[DiscardReportRow],
) -> RepositoryResult<usize> {
    recreate_table(
        tx,
        table,
        &format!("{} TEXT, {} REAL", columns::UNIT_ID, columns::PCT_DISCARDED),
    )?;

    let mut stmt = tx.prepare(&format!(
        "INSERT INTO {} ({}, {}) VALUES (?1, ?2)",
        quote(table),
        columns::UNIT_ID,
        columns::PCT_DISCARDED
    ))?;
    for row in rows {
        stmt.execute(params![row.unit_id, row.discard_pct])?;
    }
    Ok(rows.len())
}

// ==========================================
// 暂存 CSV
// ==========================================

fn staging_err(path: &Path, message: impl ToString) -> RepositoryError {
    RepositoryError::StagingError {
        path: path.display().to_string(),
        message: message.to_string(),
    }
}

fn write_staging_csv<T, R>(path: &Path, rows: &[R]) -> RepositoryResult<()>
where
    T: Serialize + for<'r> From<&'r R>,
{
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| staging_err(path, e))?;
    }

    let mut writer = csv::Writer::from_path(path).map_err(|e| staging_err(path, e))?;
    for row in rows {
        writer
            .serialize(T::from(row))
            .map_err(|e| staging_err(path, e))?;
    }
    writer.flush().map_err(|e| staging_err(path, e))?;
    Ok(())
}

fn read_staging_csv<T, R>(path: &Path) -> RepositoryResult<Vec<R>>
where
    T: DeserializeOwned + Into<R>,
{
    let mut reader = csv::Reader::from_path(path).map_err(|e| staging_err(path, e))?;
    reader
        .deserialize::<T>()
        .map(|row| row.map(Into::into).map_err(|e| staging_err(path, e)))
        .collect()
}
