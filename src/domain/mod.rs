// ==========================================
// 酒吧库存分析 - 领域模型层
// ==========================================
// 职责: 定义库存、销售、鸡尾酒目录与报表实体
// 红线: 不含数据访问逻辑,不含引擎逻辑
// ==========================================

pub mod analysis;
pub mod cocktail;
pub mod inventory;
pub mod sale;
pub mod types;

// 重导出核心类型
pub use analysis::{AnalysisSummary, PocAnalysisRow};
pub use cocktail::CocktailRecord;
pub use inventory::InventoryRecord;
pub use sale::SaleEvent;
pub use types::StockComment;
