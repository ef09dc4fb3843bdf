// ==========================================
// ReportPipeline 集成测试
// ==========================================
// 测试目标: 文件 → 两条路径 → SQLite 报表表 的完整流程
// ==========================================


use production_defect_etl::engine::PipelineError;
use production_defect_etl::importer::{ImportError, ValidationError};
use production_defect_etl::logging;
use tempfile::TempDir;
use test_helpers::*;

fn u1_rows() -> Vec<(&'static str, String, String)> {
    vec![("U1", encode(10, 20, 0), encode(1, 4, 0))]
}

#[tokio::test]
async fn test_single_unit_percentages() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(dir.path(), "Production_logs.tsv", &u1_rows());

    let pipeline = create_test_pipeline(&db_path, None);
    let summary = pipeline.run("run-u1", &input).await.unwrap();

    assert_eq!(summary.raw_rows, 1);
    assert_eq!(summary.defect_rows, 1);
    assert_eq!(summary.alert_rows, 0);
    assert_eq!(summary.discard_rows, 1);

    let rows = fetch_defect_rows(&db_path);
    assert_eq!(rows.len(), 1);
    let (id, scissor, paper, rock, overall) = &rows[0];
    assert_eq!(id, "U1");
    assert_eq!(*scissor, None);
    assert_eq!(*paper, Some(20.0));
    assert_eq!(*rock, Some(10.0));
    assert!((overall.unwrap() - 16.666_666_666_666_668).abs() < 1e-9);

    assert!(fetch_alert_ids(&db_path).is_empty());

    let discard = fetch_discard_rows(&db_path);
    assert_eq!(discard[0].0.as_deref(), Some("U1"));
    assert!((discard[0].1.unwrap() - 16.666_666_666_666_668).abs() < 1e-9);
}

#[tokio::test]
async fn test_alert_threshold_boundary() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[
            ("AT20", encode(50, 50, 0), encode(10, 10, 0)),
            ("ABOVE20", encode(1_000_000, 0, 0), encode(200_001, 0, 0)),
            ("ZERO", encode(0, 0, 0), encode(0, 0, 0)),
        ],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let summary = pipeline.run("run-boundary", &input).await.unwrap();

    assert_eq!(summary.defect_rows, 3);
    assert_eq!(fetch_alert_ids(&db_path), vec!["ABOVE20".to_string()]);

    // 产量为 0 的单元在报表 A 中百分比未定义，而不是 0
    let zero = fetch_defect_rows(&db_path)
        .into_iter()
        .find(|r| r.0 == "ZERO")
        .unwrap();
    assert_eq!(zero.4, None);
}

#[tokio::test]
async fn test_duplicate_ids_keep_first_and_discard_keeps_all() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[
            ("U2", encode(10, 0, 0), encode(1, 0, 0)),
            ("U2", encode(10, 0, 0), encode(5, 0, 0)),
        ],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let summary = pipeline.run("run-dup", &input).await.unwrap();

    assert_eq!(summary.defect_rows, 1);
    assert_eq!(summary.dq_report.summary.dropped, 1);
    assert_eq!(summary.dq_report.duplicates[0].kept_row_number, 1);

    let defect = fetch_defect_rows(&db_path);
    assert_eq!(defect[0].4, Some(10.0));

    // 报表 C 不去重
    let discard = fetch_discard_rows(&db_path);
    assert_eq!(discard.len(), 2);
    assert_eq!(discard[1].1, Some(50.0));
}

#[tokio::test]
async fn test_format_violation_blocks_validated_reports_only() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[
            ("U1", encode(10, 20, 0), encode(1, 4, 0)),
            ("U3!", encode(5, 5, 5), encode(1, 1, 1)),
        ],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-format", &input).await.unwrap_err();

    assert!(err.is_validation_failure());
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::FormatViolation { ref unit_ids }) if unit_ids == &vec!["U3!".to_string()]
    ));

    assert!(!table_exists(&db_path, DEFECT_TABLE));
    assert!(!table_exists(&db_path, ALERT_TABLE));

    // 报表 C 未经校验，包含非法标识
    let discard = fetch_discard_rows(&db_path);
    assert_eq!(discard.len(), 2);
    assert_eq!(discard[1].0.as_deref(), Some("U3!"));
}

#[tokio::test]
async fn test_unexpected_product_is_schema_violation() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[(
            "U1",
            r#"{"rock": 1, "paper": 1, "scissor": 1, "lizard": 2}"#.to_string(),
            encode(0, 0, 0),
        )],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-schema", &input).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::SchemaViolation { ref columns })
            if columns == &vec!["Items_Produced_Lizard".to_string()]
    ));
    assert!(!table_exists(&db_path, DEFECT_TABLE));
}

#[tokio::test]
async fn test_capitalised_product_key_is_schema_violation() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[(
            "U1",
            r#"{"rock": 1, "paper": 1, "scissor": 1, "Rock": 99}"#.to_string(),
            encode(0, 0, 0),
        )],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-schema-case", &input).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::SchemaViolation { ref columns })
            if columns == &vec!["Items_Produced.Rock".to_string()]
    ));
    assert!(!table_exists(&db_path, DEFECT_TABLE));
}

#[tokio::test]
async fn test_invalid_utf8_field_decodes_to_missing() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = dir.path().join("Production_logs.tsv");
    let mut content = format!(
        "Production_Unit_Id\tItems_Produced\tDefective_Items\nU1\t{}\t{}\n",
        encode(10, 20, 0),
        encode(1, 4, 0)
    )
    .into_bytes();
    content.extend_from_slice(b"U2\t\xff\xfe\t{}\n");
    std::fs::write(&input, content).unwrap();

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-utf8", &input).await.unwrap_err();

    // 解码失败的字段按缺失处理，由范围检查拒绝，而不是中断整次运行
    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::RangeViolation { ref column, ref rows })
            if column == "Items_Produced_Scissor" && rows == &vec![2]
    ));
    assert!(!table_exists(&db_path, DEFECT_TABLE));

    let discard = fetch_discard_rows(&db_path);
    assert_eq!(discard.len(), 2);
    assert_eq!(discard[1].0.as_deref(), Some("U2"));
    assert_eq!(discard[1].1, None);
}

#[tokio::test]
async fn test_negative_count_is_range_violation() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[
            ("U1", encode(10, 20, 0), encode(1, 4, 0)),
            ("U2", encode(10, 10, 10), encode(0, -1, 0)),
        ],
    );

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-range", &input).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Validation(ValidationError::RangeViolation { ref column, ref rows })
            if column == "Defective_Items_Paper" && rows == &vec![2]
    ));
    assert!(!table_exists(&db_path, ALERT_TABLE));
}

#[tokio::test]
async fn test_failed_run_keeps_previous_validated_reports() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let pipeline = create_test_pipeline(&db_path, None);

    let good = write_tsv(dir.path(), "good.tsv", &u1_rows());
    pipeline.run("run-good", &good).await.unwrap();

    let bad = write_tsv(
        dir.path(),
        "bad.tsv",
        &[("U9?", encode(1, 1, 1), encode(0, 0, 0))],
    );
    assert!(pipeline.run("run-bad", &bad).await.is_err());

    // 报表 A 保持上一次成功运行的内容
    let defect = fetch_defect_rows(&db_path);
    assert_eq!(defect.len(), 1);
    assert_eq!(defect[0].0, "U1");
}

#[tokio::test]
async fn test_rerun_replaces_tables() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let pipeline = create_test_pipeline(&db_path, None);

    let first = write_tsv(
        dir.path(),
        "first.tsv",
        &[
            ("A1", encode(10, 0, 0), encode(5, 0, 0)),
            ("A2", encode(10, 0, 0), encode(0, 0, 0)),
        ],
    );
    pipeline.run("run-1", &first).await.unwrap();
    assert_eq!(count_rows(&db_path, DEFECT_TABLE), 2);

    let second = write_tsv(dir.path(), "second.tsv", &u1_rows());
    pipeline.run("run-2", &second).await.unwrap();

    assert_eq!(count_rows(&db_path, DEFECT_TABLE), 1);
    assert_eq!(count_rows(&db_path, ALERT_TABLE), 0);
    assert_eq!(count_rows(&db_path, DISCARD_TABLE), 1);
}

#[tokio::test]
async fn test_staging_files_written() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let staging = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(
        dir.path(),
        "Production_logs.tsv",
        &[("HOT", encode(10, 0, 0), encode(9, 0, 0))],
    );

    let pipeline = create_test_pipeline(&db_path, Some(staging.path().to_path_buf()));
    pipeline.run("run-stage", &input).await.unwrap();

    let alert_csv = std::fs::read_to_string(
        staging.path().join("temp").join(format!("{}.csv", ALERT_TABLE)),
    )
    .unwrap();
    let mut lines = alert_csv.lines();
    assert_eq!(
        lines.next(),
        Some("production_unit_id,overall_percentage_defective")
    );
    assert_eq!(lines.next(), Some("HOT,90.0"));

    // 表内容从暂存文件装载
    assert_eq!(fetch_alert_ids(&db_path), vec!["HOT".to_string()]);
    assert_eq!(fetch_defect_rows(&db_path)[0].4, Some(90.0));

    assert!(staging
        .path()
        .join("temp")
        .join(format!("{}.csv", DEFECT_TABLE))
        .exists());
    assert!(staging
        .path()
        .join("temp")
        .join(format!("{}.csv", DISCARD_TABLE))
        .exists());
}

#[tokio::test]
async fn test_missing_column_fails_before_any_report() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = dir.path().join("Production_logs.tsv");
    std::fs::write(&input, "Production_Unit_Id\tItems_Produced\nU1\t{}\n").unwrap();

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline.run("run-missing", &input).await.unwrap_err();

    assert!(matches!(
        err,
        PipelineError::Import(ImportError::MissingColumn(ref c)) if c == "Defective_Items"
    ));
    assert!(!table_exists(&db_path, DISCARD_TABLE));
}

#[tokio::test]
async fn test_missing_input_file() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();

    let pipeline = create_test_pipeline(&db_path, None);
    let err = pipeline
        .run("run-nofile", &dir.path().join("absent.tsv"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::Import(ImportError::FileNotFound(_))));
}

#[tokio::test]
async fn test_empty_file_produces_empty_reports() {
    logging::init_test();
    let dir = TempDir::new().unwrap();
    let (_db_file, db_path) = create_test_db().unwrap();
    let input = write_tsv(dir.path(), "Production_logs.tsv", &[]);

    let pipeline = create_test_pipeline(&db_path, None);
    let summary = pipeline.run("run-empty", &input).await.unwrap();

    assert_eq!(summary.raw_rows, 0);
    assert_eq!(count_rows(&db_path, DEFECT_TABLE), 0);
    assert_eq!(count_rows(&db_path, DISCARD_TABLE), 0);
}
