// ==========================================
// 酒吧库存分析 - 领域类型定义
// ==========================================
// 职责: 补货风险标记 (poc_analysis.comment)
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;

// ==========================================
// 补货风险标记 (Stock Comment)
// ==========================================
// 红线: 销量等于库存也算风险（杯具恰好用完）
// 序列化格式: 与数据库一致 ("NO ISSUE" / "POTENTIAL ISSUE")
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum StockComment {
    #[serde(rename = "NO ISSUE")]
    NoIssue, // 库存充足
    #[serde(rename = "POTENTIAL ISSUE")]
    PotentialIssue, // 可能缺杯
}

impl StockComment {
    /// 按当日销量与库存判定
    ///
    /// # 返回
    /// - `Some(NoIssue)`: drink_count < stock
    /// - `Some(PotentialIssue)`: drink_count >= stock
    /// - `None`: 无匹配库存记录
    pub fn classify(drink_count: i64, stock: Option<i64>) -> Option<Self> {
        let stock = stock?;
        if drink_count < stock {
            Some(StockComment::NoIssue)
        } else {
            Some(StockComment::PotentialIssue)
        }
    }

    /// 数据库存储字符串
    pub fn to_db_str(&self) -> &'static str {
        match self {
            StockComment::NoIssue => "NO ISSUE",
            StockComment::PotentialIssue => "POTENTIAL ISSUE",
        }
    }

    /// 从数据库字符串解析（未知值返回 None）
    pub fn from_db_str(value: &str) -> Option<Self> {
        match value.trim().to_uppercase().as_str() {
            "NO ISSUE" => Some(StockComment::NoIssue),
            "POTENTIAL ISSUE" => Some(StockComment::PotentialIssue),
            _ => None,
        }
    }

    pub fn is_issue(&self) -> bool {
        matches!(self, StockComment::PotentialIssue)
    }
}

impl fmt::Display for StockComment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_db_str())
    }
}
