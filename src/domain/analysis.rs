// ==========================================
// 酒吧库存分析 - 补货分析报表行
// ==========================================
// 对齐: poc_analysis 表 (派生)
// 粒度: (day, drink, price, bar, glass) 一行
// ==========================================

use crate::domain::types::StockComment;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ==========================================
// PocAnalysisRow - 报表行
// ==========================================
// stock / comment 为空表示未匹配到库存记录（保留该行，不过滤）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocAnalysisRow {
    pub day_of_sale: NaiveDate,
    pub drink: String,
    pub price: f64,
    pub bar: String,
    pub str_glass: Option<String>,
    pub drink_count: i64,
    pub stock: Option<i64>,
    pub comment: Option<StockComment>,
}

impl PocAnalysisRow {
    pub fn is_potential_issue(&self) -> bool {
        self.comment.map(|c| c.is_issue()).unwrap_or(false)
    }
}

// ==========================================
// AnalysisSummary - 报表汇总
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnalysisSummary {
    pub total_rows: usize,
    pub no_issue: usize,
    pub potential_issue: usize,
    pub unclassified: usize, // 无库存匹配
}

impl AnalysisSummary {
    pub fn from_rows(rows: &[PocAnalysisRow]) -> Self {
        let mut summary = AnalysisSummary {
            total_rows: rows.len(),
            ..Default::default()
        };
        for row in rows {
            match row.comment {
                Some(StockComment::NoIssue) => summary.no_issue += 1,
                Some(StockComment::PotentialIssue) => summary.potential_issue += 1,
                None => summary.unclassified += 1,
            }
        }
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(comment: Option<StockComment>) -> PocAnalysisRow {
        PocAnalysisRow {
            day_of_sale: NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            drink: "mojito".to_string(),
            price: 10.0,
            bar: "ny".to_string(),
            str_glass: Some("highball".to_string()),
            drink_count: 2,
            stock: comment.map(|_| 2),
            comment,
        }
    }

    #[test]
    fn test_summary_counts_each_bucket() {
        let rows = vec![
            row(Some(StockComment::NoIssue)),
            row(Some(StockComment::PotentialIssue)),
            row(Some(StockComment::PotentialIssue)),
            row(None),
        ];
        let summary = AnalysisSummary::from_rows(&rows);
        assert_eq!(summary.total_rows, 4);
        assert_eq!(summary.no_issue, 1);
        assert_eq!(summary.potential_issue, 2);
        assert_eq!(summary.unclassified, 1);
        assert!(rows[1].is_potential_issue());
        assert!(!rows[3].is_potential_issue());
    }
}
