// ==========================================
// 酒吧库存分析 - 杯具库存导入器
// ==========================================
// 输入: bar_data.csv (glass_type, stock, bar)
// 规则:
// - stockID = 数据行序号（0 起始）
// - stock 抽取首段数字（"12 glasses" → 12）
// - 文本 TRIM + 小写
// - 库存为快照：整体替换 bar_stock
// ==========================================

use crate::domain::InventoryRecord;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::importer::file_parser::{DelimitedFileParser, ParsedFile};
use crate::repository::BarStockRepository;
use std::path::Path;

pub struct BarStockImporter {
    repo: BarStockRepository,
    parser: DelimitedFileParser,
    cleaner: DataCleaner,
}

impl BarStockImporter {
    pub fn new(repo: BarStockRepository) -> Self {
        Self {
            repo,
            parser: DelimitedFileParser::csv(),
            cleaner: DataCleaner,
        }
    }

    /// 解析库存文件
    pub fn parse(&self, path: &Path) -> ImportResult<Vec<InventoryRecord>> {
        let parsed = self.parser.parse(path)?;
        let file = path.display().to_string();

        let glass_idx = find_column(&parsed, &file, &["glass_type", "glassType"])?;
        let stock_idx = find_column(&parsed, &file, &["stock"])?;
        let bar_idx = find_column(&parsed, &file, &["bar"])?;

        parsed
            .rows
            .iter()
            .enumerate()
            .map(|(idx, row)| {
                Ok(InventoryRecord {
                    stock_id: idx as i64,
                    glass_type: self.cleaner.normalize_text(row.field(glass_idx)),
                    stock: self
                        .cleaner
                        .extract_leading_int(row.field(stock_idx), row.row, "stock")?,
                    bar: self.cleaner.normalize_text(row.field(bar_idx)),
                })
            })
            .collect()
    }

    /// 解析并替换 bar_stock
    ///
    /// # 返回
    /// - Ok(usize): 写入条数
    pub fn import(&self, path: &Path) -> ImportResult<usize> {
        let records = self.parse(path)?;
        let count = self.repo.replace_all(&records)?;
        tracing::info!(file = %path.display(), rows = count, "库存数据已写入 bar_stock");
        Ok(count)
    }
}

fn find_column(parsed: &ParsedFile, file: &str, candidates: &[&str]) -> ImportResult<usize> {
    candidates
        .iter()
        .find_map(|name| parsed.column_index(name))
        .ok_or_else(|| ImportError::MissingColumn {
            file: file.to_string(),
            column: candidates[0].to_string(),
        })
}
