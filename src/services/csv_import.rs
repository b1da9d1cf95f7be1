//! CSV 批量导入服务
//!
//! 上传内容按 UTF-8 → GBK → Windows-1252 顺序解码，
//! 逐行校验后入库，坏行不阻断整个文件

use anyhow::{anyhow, Result};
use serde::Deserialize;

use crate::models::{BulkUploadReport, Condition, PhoneInput, PlatformCatalog};
use crate::services::inventory_service::PhoneStore;

/// 必填列
const REQUIRED_COLUMNS: [&str; 4] = ["model_name", "brand", "condition", "base_price"];

/// 报告中最多保留的错误明细条数
const MAX_REPORTED_ERRORS: usize = 10;

/// 原始 CSV 行：全部按字符串读入，数值字段逐行单独校验
#[derive(Debug, Deserialize)]
struct CsvRow {
    #[serde(default)]
    model_name: String,
    #[serde(default)]
    brand: String,
    #[serde(default)]
    condition: String,
    #[serde(default)]
    base_price: String,
    #[serde(default)]
    storage: String,
    #[serde(default)]
    color: String,
    #[serde(default)]
    stock_quantity: String,
    #[serde(default)]
    specifications: String,
    #[serde(default)]
    tags: String,
}

impl CsvRow {
    fn is_blank(&self) -> bool {
        self.model_name.is_empty()
            && self.brand.is_empty()
            && self.condition.is_empty()
            && self.base_price.is_empty()
            && self.storage.is_empty()
            && self.color.is_empty()
            && self.stock_quantity.is_empty()
            && self.specifications.is_empty()
            && self.tags.is_empty()
    }
}

/// 按 UTF-8 → GBK → Windows-1252 顺序解码上传内容
pub fn decode_bytes(raw: &[u8]) -> String {
    if let Ok(text) = std::str::from_utf8(raw) {
        return text.to_string();
    }

    let (text, _, had_errors) = encoding_rs::GBK.decode(raw);
    if !had_errors {
        return text.into_owned();
    }

    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(raw);
    text.into_owned()
}

/// 解析 CSV 文本
///
/// 文件级问题（缺列、无有效数据）返回 Err；
/// 行级问题收进错误列表，返回 (行号, 待入库记录) 与行级错误
pub fn parse_rows(text: &str) -> Result<(Vec<(usize, PhoneInput)>, Vec<String>)> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .trim(csv::Trim::All)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();
    let missing: Vec<&str> = REQUIRED_COLUMNS
        .iter()
        .copied()
        .filter(|column| !headers.iter().any(|h| h == column))
        .collect();
    if !missing.is_empty() {
        return Err(anyhow!(
            "Missing required columns: {}. Found columns: {}",
            missing.join(", "),
            headers.join(", ")
        ));
    }

    let mut rows = Vec::new();
    let mut errors = Vec::new();
    let mut data_rows = 0usize;

    // 行号从 2 起算：第 1 行是表头
    for (index, result) in reader.deserialize::<CsvRow>().enumerate() {
        let row_num = index + 2;

        let row = match result {
            Ok(row) => row,
            Err(e) => {
                data_rows += 1;
                errors.push(format!("Row {}: {}", row_num, e));
                continue;
            }
        };

        if row.is_blank() {
            continue;
        }
        data_rows += 1;

        if row.model_name.is_empty() || row.brand.is_empty() || row.condition.is_empty() {
            errors.push(format!(
                "Row {}: Missing required fields (model_name, brand, or condition)",
                row_num
            ));
            continue;
        }

        let base_price = match row.base_price.parse::<f64>() {
            Ok(price) if price > 0.0 => price,
            _ => {
                errors.push(format!(
                    "Row {}: Invalid base_price '{}' - must be a positive number",
                    row_num, row.base_price
                ));
                continue;
            }
        };

        let condition = match Condition::parse(&row.condition) {
            Some(condition) => condition,
            None => {
                errors.push(format!(
                    "Row {}: Invalid condition '{}' - must be one of: {}",
                    row_num,
                    row.condition,
                    Condition::allowed_values()
                ));
                continue;
            }
        };

        // 库存解析失败或为负都按 0 处理
        let stock_quantity = row
            .stock_quantity
            .parse::<i64>()
            .ok()
            .filter(|n| *n >= 0)
            .unwrap_or(0) as u32;

        rows.push((
            row_num,
            PhoneInput {
                model_name: row.model_name,
                brand: row.brand,
                condition,
                storage: row.storage,
                color: row.color,
                stock_quantity,
                base_price,
                specifications: row.specifications,
                tags: row.tags,
            },
        ));
    }

    if data_rows == 0 {
        return Err(anyhow!("CSV file is empty or contains no valid data"));
    }

    Ok((rows, errors))
}

/// 解码、解析并入库，生成导入报告
pub fn import(raw: &[u8], store: &PhoneStore, catalog: &PlatformCatalog) -> Result<BulkUploadReport> {
    let text = decode_bytes(raw);
    let (rows, mut errors) = parse_rows(&text)?;

    let mut success_count = 0usize;
    for (row_num, input) in rows {
        match store.add(&input, catalog) {
            Ok(_) => success_count += 1,
            Err(e) => errors.push(format!("Row {}: {}", row_num, e)),
        }
    }

    let error_count = errors.len();
    errors.truncate(MAX_REPORTED_ERRORS);

    println!("📊 批量导入成功 {} 行，失败 {} 行", success_count, error_count);

    Ok(BulkUploadReport {
        success_count,
        error_count,
        errors,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_CSV: &str = "\
model_name,brand,condition,storage,color,stock_quantity,base_price,specifications,tags
iPhone 12,Apple,Good,128GB,Black,5,299.99,A14 chip,popular
Galaxy S21,Samsung,Excellent,256GB,Gray,3,349.50,,flagship
";

    #[test]
    fn parse_valid_rows() {
        let (rows, errors) = parse_rows(SAMPLE_CSV).unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows.len(), 2);

        let (row_num, first) = &rows[0];
        assert_eq!(*row_num, 2);
        assert_eq!(first.model_name, "iPhone 12");
        assert_eq!(first.brand, "Apple");
        assert_eq!(first.condition, Condition::Good);
        assert_eq!(first.stock_quantity, 5);
        assert!((first.base_price - 299.99).abs() < 1e-9);
        assert_eq!(first.tags, "popular");
    }

    #[test]
    fn missing_required_columns_is_file_level_error() {
        let csv = "model_name,brand\niPhone 12,Apple\n";
        let err = parse_rows(csv).unwrap_err().to_string();
        assert!(err.contains("Missing required columns: condition, base_price"));
        assert!(err.contains("Found columns: model_name, brand"));
    }

    #[test]
    fn bad_rows_reported_with_row_numbers() {
        let csv = "\
model_name,brand,condition,base_price
,Apple,Good,100
iPhone 12,Apple,Mint,100
iPhone 12,Apple,Good,free
iPhone 13,Apple,Good,150
";
        let (rows, errors) = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].1.model_name, "iPhone 13");
        assert_eq!(errors.len(), 3);
        assert!(errors[0].starts_with("Row 2: Missing required fields"));
        assert!(errors[1].contains("Row 3: Invalid condition 'Mint'"));
        assert!(errors[2].contains("Row 4: Invalid base_price 'free'"));
    }

    #[test]
    fn negative_or_invalid_stock_becomes_zero() {
        let csv = "\
model_name,brand,condition,base_price,stock_quantity
iPhone 12,Apple,Good,100,-3
iPhone 13,Apple,Good,100,many
";
        let (rows, errors) = parse_rows(csv).unwrap();
        assert!(errors.is_empty());
        assert_eq!(rows[0].1.stock_quantity, 0);
        assert_eq!(rows[1].1.stock_quantity, 0);
    }

    #[test]
    fn blank_rows_are_skipped() {
        let csv = "\
model_name,brand,condition,base_price
iPhone 12,Apple,Good,100
,,,
";
        let (rows, errors) = parse_rows(csv).unwrap();
        assert_eq!(rows.len(), 1);
        assert!(errors.is_empty());
    }

    #[test]
    fn header_only_file_is_rejected() {
        let csv = "model_name,brand,condition,base_price\n";
        let err = parse_rows(csv).unwrap_err().to_string();
        assert!(err.contains("empty or contains no valid data"));
    }

    #[test]
    fn gbk_bytes_are_decoded() {
        // "苹果" 的 GBK 编码
        let raw = [0xC6, 0xBB, 0xB9, 0xFB];
        assert_eq!(decode_bytes(&raw), "苹果");
    }

    #[test]
    fn utf8_passes_through() {
        assert_eq!(decode_bytes("苹果".as_bytes()), "苹果");
    }

    #[test]
    fn import_seeds_store_and_reports() {
        let store = PhoneStore::new();
        let catalog = PlatformCatalog::standard();

        let report = import(SAMPLE_CSV.as_bytes(), &store, &catalog).unwrap();
        assert_eq!(report.success_count, 2);
        assert_eq!(report.error_count, 0);

        let phones = store.all().unwrap();
        assert_eq!(phones.len(), 2);
        assert_eq!(phones[0].platforms.len(), 3);
    }

    #[test]
    fn import_counts_row_failures() {
        let store = PhoneStore::new();
        let catalog = PlatformCatalog::standard();
        let csv = "\
model_name,brand,condition,base_price
iPhone 12,Apple,Good,100
,Apple,Good,100
";
        let report = import(csv.as_bytes(), &store, &catalog).unwrap();
        assert_eq!(report.success_count, 1);
        assert_eq!(report.error_count, 1);
        assert_eq!(report.errors.len(), 1);
    }
}
