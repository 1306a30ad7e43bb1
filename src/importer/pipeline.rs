// ==========================================
// 酒吧库存分析 - 数据导入流水线
// ==========================================
// 流程: 建表(幂等) → 库存快照 → 增量销售 → 补充目录 → 水位落盘
// 说明: 水位最后落盘，中途失败时下次会重新导入同一批销售
// ==========================================

use crate::config::PipelineConfig;
use crate::db::SharedConnection;
use crate::importer::bar_stock_importer::BarStockImporter;
use crate::importer::cocktail_importer::{
    CocktailImportReport, CocktailImporter, CocktailSource, JsonDirectoryCocktailSource,
};
use crate::importer::error::ImportResult;
use crate::importer::sales_importer::{SalesImportReport, SalesImporter};
use crate::importer::watermark::WatermarkStore;
use crate::repository::{BarStockRepository, CocktailRepository, GlobalSalesRepository};
use crate::schema::SchemaInitializer;
use std::time::Instant;

/// 一次导入的汇总
#[derive(Debug, Clone, Default)]
pub struct IngestionReport {
    pub created_tables: Vec<&'static str>,
    pub bar_stock_rows: usize,
    pub sales: SalesImportReport,
    pub cocktails: CocktailImportReport,
    pub elapsed_ms: u128,
}

pub struct IngestionPipeline {
    config: PipelineConfig,
    conn: SharedConnection,
    cocktail_source: Option<Box<dyn CocktailSource>>,
}

impl IngestionPipeline {
    pub fn new(config: PipelineConfig, conn: SharedConnection) -> Self {
        Self {
            config,
            conn,
            cocktail_source: None,
        }
    }

    /// 替换默认的目录数据源（默认读取 cocktail_cache_dir）
    pub fn with_cocktail_source(mut self, source: Box<dyn CocktailSource>) -> Self {
        self.cocktail_source = Some(source);
        self
    }

    pub fn run(self) -> ImportResult<IngestionReport> {
        let start = Instant::now();
        let mut report = IngestionReport::default();

        // 步骤 1: 建表
        report.created_tables = SchemaInitializer::new(self.conn.clone()).ensure_tables()?;

        // 步骤 2: 库存快照
        let stock_importer =
            BarStockImporter::new(BarStockRepository::from_connection(self.conn.clone()));
        report.bar_stock_rows = stock_importer.import(&self.config.bar_stock_file)?;

        // 步骤 3: 增量销售
        let mut watermarks = WatermarkStore::load(&self.config.watermark_file)?;
        let sales_importer =
            SalesImporter::new(GlobalSalesRepository::from_connection(self.conn.clone()));
        report.sales = sales_importer.import(&self.config.sales_sources, &mut watermarks)?;

        // 步骤 4: 补充目录
        let source: Box<dyn CocktailSource> = match self.cocktail_source {
            Some(source) => source,
            None => Box::new(JsonDirectoryCocktailSource::new(
                self.config.cocktail_cache_dir.clone(),
            )),
        };
        let cocktail_importer =
            CocktailImporter::new(CocktailRepository::from_connection(self.conn.clone()), source);
        report.cocktails = cocktail_importer.import(&report.sales.drinks)?;

        // 步骤 5: 水位落盘
        watermarks.save()?;

        report.elapsed_ms = start.elapsed().as_millis();
        tracing::info!(
            bar_stock = report.bar_stock_rows,
            sales = report.sales.inserted,
            cocktails = report.cocktails.inserted,
            elapsed_ms = report.elapsed_ms as u64,
            "数据导入完成"
        );
        Ok(report)
    }
}
