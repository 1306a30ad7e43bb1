// ==========================================
// 酒吧库存分析 - 销售数据导入器
// ==========================================
// 输入: 每个酒吧一个分隔文件（列位置: dateOfSale, drink, price）
// 规则:
// - 只保留严格晚于水位的交易
// - 文本 TRIM + 小写，bar 取数据源配置
// - saleID 接续已有最大值，追加写入 global_sales
// - 写入成功后才推进内存中的水位（由调用方落盘）
// ==========================================

use crate::config::SalesSourceConfig;
use crate::domain::SaleEvent;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::ImportResult;
use crate::importer::file_parser::DelimitedFileParser;
use crate::importer::watermark::WatermarkStore;
use crate::repository::GlobalSalesRepository;
use chrono::NaiveDateTime;
use std::collections::BTreeSet;

const COL_DATE: usize = 0;
const COL_DRINK: usize = 1;
const COL_PRICE: usize = 2;

/// 尚未分配 saleID 的销售
#[derive(Debug, Clone, PartialEq)]
pub struct PendingSale {
    pub date_of_sale: NaiveDateTime,
    pub drink: String,
    pub price: f64,
    pub bar: String,
}

/// 单个数据源的导入结果
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceImportStat {
    pub bar: String,
    pub parsed: usize,
    pub loaded: usize, // 水位过滤后
    pub latest: Option<NaiveDateTime>,
}

/// 销售导入汇总
#[derive(Debug, Clone, Default)]
pub struct SalesImportReport {
    pub sources: Vec<SourceImportStat>,
    pub inserted: usize,
    pub drinks: BTreeSet<String>,
}

pub struct SalesImporter {
    repo: GlobalSalesRepository,
    cleaner: DataCleaner,
}

impl SalesImporter {
    pub fn new(repo: GlobalSalesRepository) -> Self {
        Self {
            repo,
            cleaner: DataCleaner,
        }
    }

    /// 解析单个数据源并按水位过滤
    pub fn parse_source(
        &self,
        source: &SalesSourceConfig,
        watermark: NaiveDateTime,
    ) -> ImportResult<(Vec<PendingSale>, SourceImportStat)> {
        let parser = DelimitedFileParser::new(source.delimiter, source.has_header)?;
        let parsed = parser.parse(&source.path)?;
        let bar = self.cleaner.normalize_text(&source.bar);

        let mut sales = Vec::with_capacity(parsed.rows.len());
        for row in &parsed.rows {
            let date_of_sale = self
                .cleaner
                .parse_timestamp(row.field(COL_DATE), row.row, "dateOfSale")?;
            if date_of_sale <= watermark {
                continue;
            }
            sales.push(PendingSale {
                date_of_sale,
                drink: self.cleaner.normalize_text(row.field(COL_DRINK)),
                price: self.cleaner.parse_price(row.field(COL_PRICE), row.row, "price")?,
                bar: bar.clone(),
            });
        }

        let stat = SourceImportStat {
            bar,
            parsed: parsed.rows.len(),
            loaded: sales.len(),
            latest: sales.iter().map(|s| s.date_of_sale).max(),
        };
        tracing::info!(
            bar = %stat.bar,
            parsed = stat.parsed,
            loaded = stat.loaded,
            watermark = %watermark,
            "销售数据源已解析"
        );
        Ok((sales, stat))
    }

    /// 导入全部数据源
    ///
    /// # 参数
    /// - sources: 数据源配置（按顺序拼接，saleID 依次递增）
    /// - watermarks: 增量水位，写入成功后推进
    pub fn import(
        &self,
        sources: &[SalesSourceConfig],
        watermarks: &mut WatermarkStore,
    ) -> ImportResult<SalesImportReport> {
        let mut pending = Vec::new();
        let mut report = SalesImportReport::default();

        for source in sources {
            let (sales, stat) = self.parse_source(source, watermarks.get(&source.watermark_key))?;
            pending.extend(sales);
            report.sources.push(stat);
        }

        let next_id = self.repo.next_sale_id()?;
        let events: Vec<SaleEvent> = pending
            .into_iter()
            .enumerate()
            .map(|(offset, sale)| SaleEvent {
                sale_id: next_id + offset as i64,
                date_of_sale: sale.date_of_sale,
                drink: sale.drink,
                price: sale.price,
                bar: sale.bar,
            })
            .collect();

        report.drinks = events.iter().map(|e| e.drink.clone()).collect();
        report.inserted = self.repo.insert_batch(&events)?;

        for (source, stat) in sources.iter().zip(report.sources.iter()) {
            if let Some(latest) = stat.latest {
                watermarks.advance(&source.watermark_key, latest);
            }
        }

        tracing::info!(
            inserted = report.inserted,
            drinks = report.drinks.len(),
            "销售数据已写入 global_sales"
        );
        Ok(report)
    }
}
