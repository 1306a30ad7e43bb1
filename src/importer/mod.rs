// ==========================================
// 酒吧库存分析 - 导入层
// ==========================================
// 职责: 外部数据导入 (库存 CSV / 各酒吧销售文件 / 鸡尾酒目录)
// 支持: CSV, TSV, gzip, 目录 API 的 JSON 响应
// ==========================================

pub mod bar_stock_importer;
pub mod cocktail_importer;
pub mod data_cleaner;
pub mod error;
pub mod file_parser;
pub mod pipeline;
pub mod sales_importer;
pub mod watermark;

// 重导出核心类型
pub use bar_stock_importer::BarStockImporter;
pub use cocktail_importer::{
    CocktailImportReport, CocktailImporter, CocktailSource, InMemoryCocktailSource,
    JsonDirectoryCocktailSource,
};
pub use data_cleaner::DataCleaner;
pub use error::{ImportError, ImportResult};
pub use file_parser::{DelimitedFileParser, ParsedFile, RawRow};
pub use pipeline::{IngestionPipeline, IngestionReport};
pub use sales_importer::{SalesImportReport, SalesImporter};
pub use watermark::WatermarkStore;
