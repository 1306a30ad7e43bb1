// ==========================================
// 酒吧库存分析 - 销售事件领域模型
// ==========================================
// 对齐: global_sales 表
// 生命周期: 只追加，不更新、不删除
// ==========================================

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

// ==========================================
// SaleEvent - 单笔销售
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleEvent {
    #[serde(rename = "saleID")]
    pub sale_id: i64,                 // 主键
    pub date_of_sale: NaiveDateTime,  // 交易时间
    pub drink: String,                // 饮品名称（按名称软关联 cocktails.strDrink）
    pub price: f64,                   // 金额
    pub bar: String,                  // 酒吧代码
}

impl SaleEvent {
    pub fn new(
        sale_id: i64,
        date_of_sale: NaiveDateTime,
        drink: impl Into<String>,
        price: f64,
        bar: impl Into<String>,
    ) -> Self {
        Self {
            sale_id,
            date_of_sale,
            drink: drink.into(),
            price,
            bar: bar.into(),
        }
    }

    /// 截断到自然日
    pub fn day_of_sale(&self) -> NaiveDate {
        self.date_of_sale.date()
    }
}
