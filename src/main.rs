// ==========================================
// 生产缺陷报表系统 - 批处理作业入口
// ==========================================
// 用法:
//   production-defect-etl --input_bucket <dir> --output_bucket <dir> \
//       --redshift_url <warehouse.db> --redshift_schema <schema> \
//       --report1_table <t1> --report2_table <t2> --report3_table <t3>
// 退出码: 成功 0；任何致命错误非 0
// ==========================================

use anyhow::{anyhow, Context};
use production_defect_etl::config::job_config::LOG_FORMAT_ENV;
use production_defect_etl::{
    logging, ConfigManager, JobConfig, ReportPipeline, ReportTables, SqliteReportSink,
};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let json_logs = std::env::var(LOG_FORMAT_ENV)
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    info!("==================================================");
    info!("{}", production_defect_etl::APP_NAME);
    info!("系统版本: {}", production_defect_etl::VERSION);
    info!("==================================================");

    let config = JobConfig::from_process().context("作业参数加载失败")?;
    info!(?config, "作业参数已加载");

    let tables = ReportTables::new(
        &config.target_schema,
        &config.report1_table,
        &config.report2_table,
        &config.report3_table,
    )?;
    let sink = SqliteReportSink::new(&config.warehouse_url, tables, config.staging_dir())
        .context("仓库连接失败")?;
    let config_manager = ConfigManager::new(&config.warehouse_url)
        .map_err(|e| anyhow!("配置管理器初始化失败: {}", e))?;

    let pipeline = ReportPipeline::new(sink, config_manager);
    let summary = match pipeline.run(&config.run_id, &config.input_path()).await {
        Ok(summary) => summary,
        Err(e) => {
            error!(run_id = %config.run_id, error = %e, "作业失败");
            return Err(e.into());
        }
    };

    println!("{}", serde_json::to_string_pretty(&summary)?);
    Ok(())
}
