// ==========================================
// 酒吧库存分析 - 数据清洗器
// ==========================================
// 职责: TRIM + 小写标准化 / 数量抽取 / 时间与价格解析
// 说明: 文本统一小写后才能与目录按名称精确匹配
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};

/// 支持的时间格式（按顺序尝试）
const DATETIME_FORMATS: [&str; 5] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

#[derive(Debug, Default, Clone, Copy)]
pub struct DataCleaner;

impl DataCleaner {
    /// TRIM + 小写
    pub fn normalize_text(&self, value: &str) -> String {
        value.trim().to_lowercase()
    }

    /// 空白视为 NULL，其余 TRIM + 小写
    pub fn normalize_optional(&self, value: Option<&str>) -> Option<String> {
        value
            .map(str::trim)
            .filter(|v| !v.is_empty())
            .map(|v| v.to_lowercase())
    }

    /// 抽取首段连续数字（"12 glasses" → 12）
    pub fn extract_leading_int(&self, value: &str, row: usize, field: &str) -> ImportResult<i64> {
        let digits: String = value
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(|c| c.is_ascii_digit())
            .collect();

        if digits.is_empty() {
            return Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("未找到数字: {:?}", value),
            });
        }

        digits
            .parse::<i64>()
            .map_err(|e| ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: e.to_string(),
            })
    }

    /// 解析交易时间；纯日期按当日零点处理
    pub fn parse_timestamp(&self, value: &str, row: usize, field: &str) -> ImportResult<NaiveDateTime> {
        let trimmed = value.trim();
        for fmt in DATETIME_FORMATS.iter() {
            if let Ok(ts) = NaiveDateTime::parse_from_str(trimmed, fmt) {
                return Ok(ts);
            }
        }

        NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .ok_or_else(|| ImportError::DateFormatError {
                row,
                field: field.to_string(),
                value: value.to_string(),
            })
    }

    /// 解析价格（允许货币符号前缀，如 "$10.50"）
    pub fn parse_price(&self, value: &str, row: usize, field: &str) -> ImportResult<f64> {
        let cleaned = value
            .trim()
            .trim_start_matches(|c: char| !(c.is_ascii_digit() || c == '-' || c == '.'));

        let price = cleaned
            .parse::<f64>()
            .map_err(|e| ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("{} ({:?})", e, value),
            })?;

        if !price.is_finite() {
            return Err(ImportError::TypeConversionError {
                row,
                field: field.to_string(),
                message: format!("非有限数值: {:?}", value),
            });
        }
        Ok(price)
    }
}
