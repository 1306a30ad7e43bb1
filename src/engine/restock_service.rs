// ==========================================
// 酒吧库存分析 - 补货分析刷新服务
// ==========================================
// 职责: 读取三张基础表 → 引擎计算 → 整体替换 poc_analysis
// 约束: 仓储句柄显式注入；同一输入重复刷新结果一致
// ==========================================

use crate::db::SharedConnection;
use crate::domain::{AnalysisSummary, PocAnalysisRow};
use crate::engine::restock_analysis::RestockAnalysisEngine;
use crate::repository::{
    BarStockRepository, CocktailRepository, GlobalSalesRepository, PocAnalysisRepository,
    RepositoryResult,
};
use std::time::Instant;
use uuid::Uuid;

/// 一次刷新的结果
#[derive(Debug, Clone)]
pub struct RefreshOutcome {
    pub run_id: String,
    pub summary: AnalysisSummary,
    pub elapsed_ms: u128,
}

// ==========================================
// RestockAnalysisService
// ==========================================
pub struct RestockAnalysisService {
    sales_repo: GlobalSalesRepository,
    cocktail_repo: CocktailRepository,
    stock_repo: BarStockRepository,
    analysis_repo: PocAnalysisRepository,
    engine: RestockAnalysisEngine,
}

impl RestockAnalysisService {
    pub fn new(
        sales_repo: GlobalSalesRepository,
        cocktail_repo: CocktailRepository,
        stock_repo: BarStockRepository,
        analysis_repo: PocAnalysisRepository,
    ) -> Self {
        Self {
            sales_repo,
            cocktail_repo,
            stock_repo,
            analysis_repo,
            engine: RestockAnalysisEngine::new(),
        }
    }

    /// 所有仓储共用同一连接
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self::new(
            GlobalSalesRepository::from_connection(conn.clone()),
            CocktailRepository::from_connection(conn.clone()),
            BarStockRepository::from_connection(conn.clone()),
            PocAnalysisRepository::from_connection(conn),
        )
    }

    /// 计算报表但不落库
    pub fn preview(&self) -> RepositoryResult<Vec<PocAnalysisRow>> {
        let sales = self.sales_repo.list_all()?;
        let catalog = self.cocktail_repo.list_all()?;
        let inventory = self.stock_repo.list_all()?;

        tracing::debug!(
            sales = sales.len(),
            cocktails = catalog.len(),
            inventory = inventory.len(),
            "补货分析输入已加载"
        );

        Ok(self.engine.analyze(&sales, &catalog, &inventory))
    }

    /// 重新计算并整体替换 poc_analysis
    pub fn refresh(&self) -> RepositoryResult<RefreshOutcome> {
        let run_id = Uuid::new_v4().to_string();
        let start = Instant::now();
        tracing::info!(run_id = %run_id, "开始刷新补货分析报表");

        let rows = self.preview()?;
        self.analysis_repo.replace_all(&rows)?;

        let summary = AnalysisSummary::from_rows(&rows);
        let elapsed_ms = start.elapsed().as_millis();

        tracing::info!(
            run_id = %run_id,
            rows = summary.total_rows,
            no_issue = summary.no_issue,
            potential_issue = summary.potential_issue,
            unclassified = summary.unclassified,
            elapsed_ms = elapsed_ms as u64,
            "补货分析报表刷新完成"
        );
        if summary.unclassified > 0 {
            tracing::warn!(
                run_id = %run_id,
                unclassified = summary.unclassified,
                "部分行未匹配到目录或库存，stock/comment 置空"
            );
        }

        Ok(RefreshOutcome {
            run_id,
            summary,
            elapsed_ms,
        })
    }

    /// 读取已落库的报表
    pub fn current_report(&self) -> RepositoryResult<Vec<PocAnalysisRow>> {
        self.analysis_repo.ensure_table()?;
        self.analysis_repo.list_all()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::domain::{CocktailRecord, InventoryRecord, SaleEvent, StockComment};
    use crate::schema::SchemaInitializer;
    use chrono::NaiveDate;
    use std::sync::{Arc, Mutex};

    fn service_with_data() -> RestockAnalysisService {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        SchemaInitializer::new(conn.clone()).create_tables().unwrap();

        let at = NaiveDate::from_ymd_opt(2024, 1, 1)
            .unwrap()
            .and_hms_opt(20, 0, 0)
            .unwrap();
        GlobalSalesRepository::from_connection(conn.clone())
            .insert_batch(&[
                SaleEvent::new(0, at, "mojito", 10.0, "new york"),
                SaleEvent::new(1, at, "mojito", 10.0, "new york"),
                SaleEvent::new(2, at, "mystery", 7.0, "new york"),
            ])
            .unwrap();
        CocktailRepository::from_connection(conn.clone())
            .insert(&CocktailRecord::new(11000, "mojito", Some("highball glass")))
            .unwrap();
        BarStockRepository::from_connection(conn.clone())
            .insert(&InventoryRecord::new(0, "highball glass", 2, "new york"))
            .unwrap();

        RestockAnalysisService::from_connection(conn)
    }

    #[test]
    fn test_refresh_persists_report() {
        let service = service_with_data();
        let outcome = service.refresh().unwrap();

        assert_eq!(outcome.summary.total_rows, 2);
        assert_eq!(outcome.summary.potential_issue, 1);
        assert_eq!(outcome.summary.unclassified, 1);
        assert!(Uuid::parse_str(&outcome.run_id).is_ok());

        let stored = service.current_report().unwrap();
        assert_eq!(stored, service.preview().unwrap());
        let mojito = stored.iter().find(|r| r.drink == "mojito").unwrap();
        assert_eq!(mojito.comment, Some(StockComment::PotentialIssue));
    }

    #[test]
    fn test_refresh_is_idempotent() {
        let service = service_with_data();
        service.refresh().unwrap();
        let first = service.current_report().unwrap();
        service.refresh().unwrap();
        let second = service.current_report().unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_current_report_before_first_refresh_is_empty() {
        let service = service_with_data();
        assert!(service.current_report().unwrap().is_empty());
    }
}
