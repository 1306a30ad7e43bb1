// ==========================================
// 酒吧库存分析 - 引擎层
// ==========================================
// 职责: 补货分析报表计算、刷新与导出
// ==========================================

pub mod report_export;
pub mod restock_analysis;
pub mod restock_service;

pub use report_export::{export_report_csv, write_report};
pub use restock_analysis::RestockAnalysisEngine;
pub use restock_service::{RefreshOutcome, RestockAnalysisService};
