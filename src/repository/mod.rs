// ==========================================
// 酒吧库存分析 - 数据仓储层
// ==========================================
// 红线: Repository 不含业务逻辑
// 职责: 提供数据访问接口,屏蔽数据库细节
// 约束: 所有查询使用参数化,防止 SQL 注入
// ==========================================

pub mod bar_stock_repo;
pub mod cocktail_repo;
pub mod error;
pub mod global_sales_repo;
pub mod poc_analysis_repo;

// 重导出核心仓储
pub use bar_stock_repo::BarStockRepository;
pub use cocktail_repo::CocktailRepository;
pub use error::{RepositoryError, RepositoryResult};
pub use global_sales_repo::GlobalSalesRepository;
pub use poc_analysis_repo::PocAnalysisRepository;
