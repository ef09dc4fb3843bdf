// ==========================================
// 测试数据生成器
// ==========================================
// 用途: 生成生产日志 TSV 测试数据集
// 输出: <out>/*.tsv（默认 tests/fixtures/datasets）
// 用法: generate_test_data [--units N] [--out DIR]
// ==========================================

use csv::WriterBuilder;
use serde_json::json;
use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

// TSV 表头（另含一个非报表列，导入时会被投影掉）
const TSV_HEADER: &[&str] = &[
    "Production_Unit_Id",
    "Items_Produced",
    "Defective_Items",
    "Shift",
];

// 生产记录结构
#[derive(Clone)]
struct ProductionRow {
    unit_id: String,
    items_produced: String,
    defective_items: String,
    shift: String,
}

impl ProductionRow {
    fn to_row(&self) -> Vec<String> {
        vec![
            self.unit_id.clone(),
            self.items_produced.clone(),
            self.defective_items.clone(),
            self.shift.clone(),
        ]
    }
}

fn encode(rock: i64, paper: i64, scissor: i64) -> String {
    json!({"rock": rock, "paper": paper, "scissor": scissor}).to_string()
}

/// 生成正常记录（按序号确定性生成，缺陷率 0% ~ 30% 之间）
fn generate_normal_record(index: usize) -> ProductionRow {
    let i = index as i64;
    let rock = 50 + (i * 37) % 200;
    let paper = 40 + (i * 53) % 180;
    let scissor = (i * 29) % 150;

    ProductionRow {
        unit_id: format!("U{:05}", index),
        items_produced: encode(rock, paper, scissor),
        defective_items: encode(
            rock * ((i * 7) % 31) / 100,
            paper * ((i * 11) % 31) / 100,
            scissor * ((i * 13) % 31) / 100,
        ),
        shift: ["A", "B", "C"][index % 3].to_string(),
    }
}

struct Options {
    units: usize,
    out_dir: PathBuf,
}

fn parse_options() -> Result<Options, Box<dyn Error>> {
    let mut options = Options {
        units: 100,
        out_dir: PathBuf::from("tests/fixtures/datasets"),
    };

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        match arg.as_str() {
            "--units" => {
                let value = args.next().ok_or("--units 缺少参数值")?;
                options.units = value.parse()?;
            }
            "--out" => {
                let value = args.next().ok_or("--out 缺少参数值")?;
                options.out_dir = PathBuf::from(value);
            }
            other => return Err(format!("未知参数: {}", other).into()),
        }
    }
    Ok(options)
}

fn write_dataset(dir: &Path, name: &str, rows: &[ProductionRow]) -> Result<(), Box<dyn Error>> {
    let path = dir.join(name);
    let mut wtr = WriterBuilder::new().delimiter(b'\t').from_path(&path)?;

    wtr.write_record(TSV_HEADER)?;
    for row in rows {
        wtr.write_record(row.to_row())?;
    }
    wtr.flush()?;

    println!("✓ 生成 {} ({}条)", name, rows.len());
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let options = parse_options()?;
    fs::create_dir_all(&options.out_dir)?;
    println!("开始生成测试数据集...");

    let normal: Vec<ProductionRow> = (1..=options.units).map(generate_normal_record).collect();

    // 1. 正常数据
    write_dataset(&options.out_dir, "01_normal_data.tsv", &normal)?;

    // 2. 批次内重复（每 10 条重复一次，内容不同）
    let mut duplicates = normal.clone();
    for index in (1..=options.units).step_by(10) {
        let mut dup = generate_normal_record(index + options.units);
        dup.unit_id = format!("U{:05}", index);
        duplicates.push(dup);
    }
    write_dataset(&options.out_dir, "02_duplicate_within_batch.tsv", &duplicates)?;

    // 3. 非预期产品（列封闭失败）
    let mut schema = normal.clone();
    if let Some(first) = schema.first_mut() {
        first.items_produced = json!({"rock": 1, "paper": 1, "scissor": 1, "lizard": 4}).to_string();
    }
    write_dataset(&options.out_dir, "03_unexpected_product.tsv", &schema)?;

    // 4. 负数计数（范围失败）
    let mut range = normal.clone();
    if let Some(last) = range.last_mut() {
        last.defective_items = encode(-1, 0, 0);
    }
    write_dataset(&options.out_dir, "04_negative_count.tsv", &range)?;

    // 5. 非法标识（格式失败）
    let mut format = normal.clone();
    if let Some(row) = format.get_mut(options.units / 2) {
        row.unit_id = format!("{}!", row.unit_id);
    }
    write_dataset(&options.out_dir, "05_invalid_unit_id.tsv", &format)?;

    // 6. 边界情况（产量为 0、恰好 20%、略高于 20%）
    let edge = vec![
        ProductionRow {
            unit_id: "ZERO".to_string(),
            items_produced: encode(0, 0, 0),
            defective_items: encode(0, 0, 0),
            shift: "A".to_string(),
        },
        ProductionRow {
            unit_id: "AT20".to_string(),
            items_produced: encode(50, 50, 0),
            defective_items: encode(10, 10, 0),
            shift: "B".to_string(),
        },
        ProductionRow {
            unit_id: "ABOVE20".to_string(),
            items_produced: encode(1_000_000, 0, 0),
            defective_items: encode(200_001, 0, 0),
            shift: "C".to_string(),
        },
    ];
    write_dataset(&options.out_dir, "06_edge_cases.tsv", &edge)?;

    println!("✓ 所有测试数据集生成完成！");
    Ok(())
}
