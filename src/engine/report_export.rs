// ==========================================
// 酒吧库存分析 - 报表导出
// ==========================================
// 格式: CSV，列名与 poc_analysis 一致；空值写为空串
// ==========================================

use crate::domain::PocAnalysisRow;
use csv::Writer;
use std::io::Write;
use std::path::Path;

pub const REPORT_HEADERS: [&str; 8] = [
    "dayOfSale",
    "drink",
    "price",
    "bar",
    "strGlass",
    "drinkCount",
    "stock",
    "comment",
];

/// 写出报表
pub fn write_report<W: Write>(rows: &[PocAnalysisRow], writer: W) -> csv::Result<usize> {
    let mut wtr = Writer::from_writer(writer);
    wtr.write_record(REPORT_HEADERS)?;
    for row in rows {
        wtr.write_record([
            row.day_of_sale.format("%Y-%m-%d").to_string(),
            row.drink.clone(),
            row.price.to_string(),
            row.bar.clone(),
            row.str_glass.clone().unwrap_or_default(),
            row.drink_count.to_string(),
            row.stock.map(|s| s.to_string()).unwrap_or_default(),
            row.comment.map(|c| c.to_string()).unwrap_or_default(),
        ])?;
    }
    wtr.flush()?;
    Ok(rows.len())
}

/// 写出到文件
pub fn export_report_csv(rows: &[PocAnalysisRow], path: &Path) -> csv::Result<usize> {
    let file = std::fs::File::create(path)?;
    let count = write_report(rows, file)?;
    tracing::info!(path = %path.display(), rows = count, "报表已导出");
    Ok(count)
}
