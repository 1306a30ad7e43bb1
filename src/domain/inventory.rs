// ==========================================
// 酒吧库存分析 - 杯具库存领域模型
// ==========================================
// 对齐: bar_stock 表
// 约束: (glass_type, bar) 实际应唯一，schema 不强制
// ==========================================

use serde::{Deserialize, Serialize};

// ==========================================
// InventoryRecord - 杯具库存
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InventoryRecord {
    #[serde(rename = "stockID")]
    pub stock_id: i64, // 主键
    pub glass_type: String, // 杯具类型
    pub stock: i64,         // 可用数量
    pub bar: String,        // 酒吧代码
}

impl InventoryRecord {
    pub fn new(
        stock_id: i64,
        glass_type: impl Into<String>,
        stock: i64,
        bar: impl Into<String>,
    ) -> Self {
        Self {
            stock_id,
            glass_type: glass_type.into(),
            stock,
            bar: bar.into(),
        }
    }
}
