// ==========================================
// 生产缺陷报表系统 - 报表流水线编排
// ==========================================
// 职责: 单次批处理运行，从输入文件到三张报表
// 流程:
//   解析 ─┬─ 校验路径: 归一化 → 校验 → 汇总 → 百分比 → 报表 A/B
//         └─ 原始路径: 归一化 → 报表 C（不去重、不校验）
// 红线: 校验失败时报表 A/B 一行都不写；报表 C 不受校验结果影响
// ==========================================

use crate::config::pipeline_config_trait::PipelineConfigReader;
use crate::domain::production::RawBatch;
use crate::domain::quality::DqReport;
use crate::domain::report::{DiscardReportRow, RunSummary, ValidatedReports};
use crate::domain::types::{DEFECTIVE_ITEMS_COLUMN, ITEMS_PRODUCED_COLUMN, UNIT_ID_COLUMN};
use crate::engine::aggregator::Aggregator;
use crate::engine::error::{PipelineError, PipelineResult};
use crate::engine::percentage::PercentageCalculator;
use crate::engine::report_builder::ReportBuilder;
use crate::importer::dq_validator::DqValidator;
use crate::importer::error::ImportError;
use crate::importer::file_parser::UniversalFileParser;
use crate::importer::importer_trait::{DqValidator as _, FileParser, RecordNormalizer};
use crate::importer::normalizer::Normalizer;
use crate::repository::report_repo::ReportSink;
use chrono::Utc;
use std::path::Path;
use std::time::Instant;
use tracing::{debug, error, info, instrument, warn};

/// 输入文件必需列
pub const REQUIRED_COLUMNS: [&str; 3] =
    [UNIT_ID_COLUMN, ITEMS_PRODUCED_COLUMN, DEFECTIVE_ITEMS_COLUMN];

// ==========================================
// PipelineOutcome - 两条路径的计算结果（尚未落库）
// ==========================================
#[derive(Debug)]
pub struct PipelineOutcome {
    pub raw_rows: usize,
    /// 校验路径: 报表 A/B + DQ 报告，或致命校验错误
    pub validated: PipelineResult<(ValidatedReports, DqReport)>,
    /// 原始路径: 报表 C
    pub discard_rows: Vec<DiscardReportRow>,
}

// ==========================================
// ReportPipeline - 报表流水线
// ==========================================
pub struct ReportPipeline<S, C>
where
    S: ReportSink,
    C: PipelineConfigReader,
{
    // 报表写出
    sink: S,

    // 调优参数读取器
    config: C,

    // 导入组件
    file_parser: Box<dyn FileParser>,
    normalizer: Box<dyn RecordNormalizer>,

    // 计算组件
    aggregator: Aggregator,
    calculator: PercentageCalculator,
}

impl<S, C> ReportPipeline<S, C>
where
    S: ReportSink,
    C: PipelineConfigReader,
{
    /// 使用默认组件创建流水线
    pub fn new(sink: S, config: C) -> Self {
        Self::with_components(
            sink,
            config,
            Box::new(UniversalFileParser),
            Box::new(Normalizer::new()),
        )
    }

    /// 指定解析器与归一化器创建流水线
    pub fn with_components(
        sink: S,
        config: C,
        file_parser: Box<dyn FileParser>,
        normalizer: Box<dyn RecordNormalizer>,
    ) -> Self {
        Self {
            sink,
            config,
            file_parser,
            normalizer,
            aggregator: Aggregator::new(),
            calculator: PercentageCalculator::new(),
        }
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// 计算两条路径（不落库）
    ///
    /// # 返回
    /// - Ok(PipelineOutcome): 校验路径的成功/失败包含在 outcome.validated 中
    /// - Err: 配置错误或缺少必需列（两条路径都无法进行）
    pub async fn process(&self, run_id: &str, raw: &RawBatch) -> PipelineResult<PipelineOutcome> {
        let threshold = self
            .config
            .get_alert_threshold_pct()
            .await
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let pattern = self
            .config
            .get_unit_id_pattern()
            .await
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        let snapshot = self
            .config
            .get_config_snapshot()
            .await
            .map_err(|e| PipelineError::Config(e.to_string()))?;
        info!(
            threshold = threshold,
            pattern = %pattern,
            config_snapshot = %snapshot,
            "调优参数已加载"
        );

        let validator = DqValidator::new(&pattern)?;
        let builder = ReportBuilder::new(threshold);

        if let Some(column) = raw.missing_column(&REQUIRED_COLUMNS) {
            error!(column = %column, "输入文件缺少必需列");
            return Err(ImportError::MissingColumn(column.to_string()).into());
        }

        // === 原始路径: 报表 C ===
        debug!("原始路径: 归一化 → 报表 C");
        let discard_rows = builder.build_discard(self.normalizer.normalize_batch(raw));

        // === 校验路径: 报表 A/B ===
        debug!("校验路径: 归一化 → 校验 → 汇总 → 百分比 → 报表 A/B");
        let validated = validator
            .validate(run_id, self.normalizer.normalize_batch(raw))
            .map(|(clean, dq_report)| {
                let aggregated = self.aggregator.aggregate(&clean);
                let percentages = self.calculator.calculate(clean, aggregated);
                (builder.build_validated(percentages), dq_report)
            })
            .map_err(PipelineError::from);

        Ok(PipelineOutcome {
            raw_rows: raw.len(),
            validated,
            discard_rows,
        })
    }

    /// 执行一次完整运行（主入口）
    ///
    /// # 参数
    /// - run_id: 运行标识
    /// - file_path: 输入文件路径（.tsv / .csv）
    ///
    /// # 返回
    /// - Ok(RunSummary): 三张报表均已写出
    /// - Err: 任一致命错误；校验失败时报表 C 仍已写出
    #[instrument(skip_all, fields(run_id = %run_id))]
    pub async fn run(&self, run_id: &str, file_path: &Path) -> PipelineResult<RunSummary> {
        let started_at = Utc::now();
        let start_time = Instant::now();
        info!(file_path = %file_path.display(), "开始生成缺陷报表");

        // === 步骤 1: 解析文件 ===
        debug!("步骤 1: 解析文件");
        let raw = self.file_parser.parse_to_raw_batch(file_path).map_err(|e| {
            error!(error = %e, "文件解析失败");
            e
        })?;
        info!(total_rows = raw.len(), "文件解析完成");

        // === 步骤 2: 计算两条路径 ===
        debug!("步骤 2: 计算报表");
        let outcome = self.process(run_id, &raw).await?;

        // === 步骤 3: 写出报表 ===
        debug!("步骤 3: 写出报表");
        let (reports, dq_report) = match outcome.validated {
            Ok(result) => result,
            Err(err) => {
                warn!(
                    error = %err,
                    discard_rows = outcome.discard_rows.len(),
                    "校验路径失败，报表 A/B 不写出；报表 C 来自未校验的原始数据，仍然写出"
                );
                if let Err(write_err) = self.sink.write_discard_report(&outcome.discard_rows).await {
                    error!(error = %write_err, "报表 C 写出失败");
                }
                return Err(err);
            }
        };

        self.sink.write_validated_reports(&reports).await?;
        let discard_rows = self.sink.write_discard_report(&outcome.discard_rows).await?;

        let summary = RunSummary {
            run_id: run_id.to_string(),
            started_at,
            finished_at: Utc::now(),
            elapsed_ms: start_time.elapsed().as_millis(),
            raw_rows: outcome.raw_rows,
            defect_rows: reports.defect_rows.len(),
            alert_rows: reports.alert_rows.len(),
            discard_rows,
            dq_report,
        };

        info!(
            raw_rows = summary.raw_rows,
            defect_rows = summary.defect_rows,
            alert_rows = summary.alert_rows,
            discard_rows = summary.discard_rows,
            duplicates = summary.dq_report.duplicates.len(),
            elapsed_ms = summary.elapsed_ms as u64,
            "缺陷报表生成完成"
        );
        Ok(summary)
    }
}
