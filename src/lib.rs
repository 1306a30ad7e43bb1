// ==========================================
// 酒吧库存分析 - 核心库
// ==========================================
// 技术栈: Rust + SQLite
// 系统定位: 多酒吧杯具库存 × 销售的补货风险报表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 实体与类型
pub mod domain;

// 数据仓储层 - 数据访问
pub mod repository;

// 引擎层 - 报表计算
pub mod engine;

// 导入层 - 外部数据
pub mod importer;

// 配置层 - 流水线配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// Schema 初始化
pub mod schema;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

// 领域实体
pub use domain::{
    AnalysisSummary, CocktailRecord, InventoryRecord, PocAnalysisRow, SaleEvent, StockComment,
};

// 引擎
pub use engine::{RefreshOutcome, RestockAnalysisEngine, RestockAnalysisService};

// 导入
pub use importer::{IngestionPipeline, IngestionReport};

// Schema
pub use schema::SchemaInitializer;

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "酒吧库存分析";

// 数据库版本
pub const DB_VERSION: &str = "v1";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
