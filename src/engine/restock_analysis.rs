// ==========================================
// 酒吧库存分析 - 补货分析引擎
// ==========================================
// 职责: 由三张基础表计算 poc_analysis 报表
// 红线: 纯计算，不访问数据库
// ==========================================
// 步骤:
// 1. 日聚合: (day, drink, price, bar, glass) 计数，glass 经目录按名称左关联
// 2. 库存比对: (glass, bar) 左关联库存；无匹配时 stock/comment 为空
// ==========================================

use crate::domain::{CocktailRecord, InventoryRecord, PocAnalysisRow, SaleEvent, StockComment};
use chrono::NaiveDate;
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashMap};

// ==========================================
// PriceKey - 可排序的价格分组键
// ==========================================
#[derive(Debug, Clone, Copy)]
struct PriceKey(f64);

impl PriceKey {
    fn new(price: f64) -> Self {
        // -0.0 与 0.0 视为同一价格
        if price == 0.0 {
            PriceKey(0.0)
        } else {
            PriceKey(price)
        }
    }
}

impl PartialEq for PriceKey {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for PriceKey {}

impl PartialOrd for PriceKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for PriceKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

/// 日聚合分组键（字段顺序即报表排序）
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord)]
struct GroupKey<'a> {
    day: NaiveDate,
    drink: &'a str,
    price: PriceKey,
    bar: &'a str,
    glass: Option<&'a str>,
}

// ==========================================
// GlassLookup - 饮品 → 杯具
// ==========================================
// 同名多条目录时按不同杯具值去重，避免重复计数
struct GlassLookup<'a> {
    by_drink: HashMap<&'a str, BTreeSet<Option<&'a str>>>,
}

impl<'a> GlassLookup<'a> {
    fn build(catalog: &'a [CocktailRecord]) -> Self {
        let mut by_drink: HashMap<&'a str, BTreeSet<Option<&'a str>>> = HashMap::new();
        for record in catalog {
            by_drink
                .entry(record.str_drink.as_str())
                .or_default()
                .insert(record.str_glass.as_deref());
        }

        let ambiguous = by_drink.values().filter(|g| g.len() > 1).count();
        if ambiguous > 0 {
            tracing::warn!(ambiguous, "部分饮品在目录中对应多种杯具，按每种杯具分别统计");
        }

        Self { by_drink }
    }

    /// 目录缺失的饮品返回 [None]
    fn glasses_for(&self, drink: &str) -> Vec<Option<&'a str>> {
        match self.by_drink.get(drink) {
            Some(glasses) => glasses.iter().copied().collect(),
            None => vec![None],
        }
    }
}

// ==========================================
// StockLookup - (杯具, 酒吧) → 库存
// ==========================================
struct StockLookup<'a> {
    by_glass_bar: HashMap<(&'a str, &'a str), &'a InventoryRecord>,
}

impl<'a> StockLookup<'a> {
    fn build(inventory: &'a [InventoryRecord]) -> Self {
        let mut by_glass_bar: HashMap<(&'a str, &'a str), &'a InventoryRecord> = HashMap::new();
        for record in inventory {
            let key = (record.glass_type.as_str(), record.bar.as_str());
            match by_glass_bar.get(&key).copied() {
                // 重复 (glass, bar) 取最小 stockID
                Some(existing) => {
                    let (kept, ignored) = if record.stock_id < existing.stock_id {
                        (record, existing)
                    } else {
                        (existing, record)
                    };
                    tracing::warn!(
                        glass_type = %record.glass_type,
                        bar = %record.bar,
                        kept_stock_id = kept.stock_id,
                        ignored_stock_id = ignored.stock_id,
                        "库存存在重复的 (glassType, bar)"
                    );
                    by_glass_bar.insert(key, kept);
                }
                None => {
                    by_glass_bar.insert(key, record);
                }
            }
        }
        Self { by_glass_bar }
    }

    fn stock_for(&self, glass: Option<&str>, bar: &str) -> Option<i64> {
        let glass = glass?;
        self.by_glass_bar.get(&(glass, bar)).map(|r| r.stock)
    }
}

// ==========================================
// RestockAnalysisEngine
// ==========================================
#[derive(Debug, Default, Clone, Copy)]
pub struct RestockAnalysisEngine;

impl RestockAnalysisEngine {
    pub fn new() -> Self {
        Self
    }

    /// 计算补货分析报表
    ///
    /// # 参数
    /// - sales: 全部销售事件
    /// - catalog: 鸡尾酒目录
    /// - inventory: 杯具库存
    ///
    /// # 返回
    /// 每个 (day, drink, price, bar, glass) 分组一行，按分组键升序（空杯具在前）
    pub fn analyze(
        &self,
        sales: &[SaleEvent],
        catalog: &[CocktailRecord],
        inventory: &[InventoryRecord],
    ) -> Vec<PocAnalysisRow> {
        let glasses = GlassLookup::build(catalog);
        let stocks = StockLookup::build(inventory);

        let mut counts: BTreeMap<GroupKey<'_>, i64> = BTreeMap::new();
        for sale in sales {
            for glass in glasses.glasses_for(&sale.drink) {
                let key = GroupKey {
                    day: sale.day_of_sale(),
                    drink: sale.drink.as_str(),
                    price: PriceKey::new(sale.price),
                    bar: sale.bar.as_str(),
                    glass,
                };
                *counts.entry(key).or_insert(0) += 1;
            }
        }

        counts
            .into_iter()
            .map(|(key, drink_count)| {
                let stock = stocks.stock_for(key.glass, key.bar);
                PocAnalysisRow {
                    day_of_sale: key.day,
                    drink: key.drink.to_string(),
                    price: key.price.0,
                    bar: key.bar.to_string(),
                    str_glass: key.glass.map(str::to_string),
                    drink_count,
                    stock,
                    comment: StockComment::classify(drink_count, stock),
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDateTime;

    fn ts(day: u32, hour: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, day)
            .unwrap()
            .and_hms_opt(hour, 0, 0)
            .unwrap()
    }

    fn two_mojitos() -> Vec<SaleEvent> {
        vec![
            SaleEvent::new(0, ts(1, 18), "Mojito", 10.0, "NY"),
            SaleEvent::new(1, ts(1, 21), "Mojito", 10.0, "NY"),
        ]
    }

    fn catalog() -> Vec<CocktailRecord> {
        vec![CocktailRecord::new(1, "Mojito", Some("Highball"))]
    }

    #[test]
    fn test_exact_exhaustion_is_potential_issue() {
        let rows = RestockAnalysisEngine::new().analyze(
            &two_mojitos(),
            &catalog(),
            &[InventoryRecord::new(0, "Highball", 2, "NY")],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drink_count, 2);
        assert_eq!(rows[0].stock, Some(2));
        assert_eq!(rows[0].comment, Some(StockComment::PotentialIssue));
        assert_eq!(rows[0].day_of_sale, NaiveDate::from_ymd_opt(2024, 1, 1).unwrap());
    }

    #[test]
    fn test_sufficient_stock_is_no_issue() {
        let rows = RestockAnalysisEngine::new().analyze(
            &two_mojitos(),
            &catalog(),
            &[InventoryRecord::new(0, "Highball", 5, "NY")],
        );
        assert_eq!(rows[0].comment, Some(StockComment::NoIssue));
    }

    #[test]
    fn test_drink_missing_from_catalog_is_null_filled() {
        let rows = RestockAnalysisEngine::new().analyze(
            &[SaleEvent::new(0, ts(1, 18), "Unknown Punch", 8.0, "NY")],
            &catalog(),
            &[InventoryRecord::new(0, "Highball", 5, "NY")],
        );
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].str_glass, None);
        assert_eq!(rows[0].stock, None);
        assert_eq!(rows[0].comment, None);
    }

    #[test]
    fn test_glass_known_but_no_inventory_at_bar() {
        let rows = RestockAnalysisEngine::new().analyze(
            &two_mojitos(),
            &catalog(),
            &[InventoryRecord::new(0, "Highball", 5, "London")],
        );
        assert_eq!(rows[0].str_glass.as_deref(), Some("Highball"));
        assert_eq!(rows[0].stock, None);
        assert_eq!(rows[0].comment, None);
    }

    #[test]
    fn test_zero_stock_differs_from_missing_stock() {
        let rows = RestockAnalysisEngine::new().analyze(
            &two_mojitos(),
            &catalog(),
            &[InventoryRecord::new(0, "Highball", 0, "NY")],
        );
        assert_eq!(rows[0].stock, Some(0));
        assert_eq!(rows[0].comment, Some(StockComment::PotentialIssue));
    }

    #[test]
    fn test_groups_split_by_day_price_and_bar() {
        let sales = vec![
            SaleEvent::new(0, ts(1, 10), "Mojito", 10.0, "NY"),
            SaleEvent::new(1, ts(2, 10), "Mojito", 10.0, "NY"),
            SaleEvent::new(2, ts(2, 11), "Mojito", 12.0, "NY"),
            SaleEvent::new(3, ts(2, 12), "Mojito", 12.0, "London"),
            SaleEvent::new(4, ts(2, 23), "Mojito", 12.0, "London"),
        ];
        let rows = RestockAnalysisEngine::new().analyze(&sales, &catalog(), &[]);
        let counts: Vec<(u32, &str, f64, i64)> = rows
            .iter()
            .map(|r| {
                (
                    chrono::Datelike::day(&r.day_of_sale),
                    r.bar.as_str(),
                    r.price,
                    r.drink_count,
                )
            })
            .collect();
        assert_eq!(
            counts,
            vec![
                (1, "NY", 10.0, 1),
                (2, "NY", 10.0, 1),
                (2, "London", 12.0, 2),
                (2, "NY", 12.0, 1),
            ]
        );
    }

    #[test]
    fn test_duplicate_catalog_rows_do_not_inflate_counts() {
        let catalog = vec![
            CocktailRecord::new(1, "Mojito", Some("Highball")),
            CocktailRecord::new(2, "Mojito", Some("Highball")),
        ];
        let rows = RestockAnalysisEngine::new().analyze(&two_mojitos(), &catalog, &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drink_count, 2);
    }

    #[test]
    fn test_duplicate_inventory_pair_uses_lowest_stock_id() {
        let inventory = vec![
            InventoryRecord::new(9, "Highball", 1, "NY"),
            InventoryRecord::new(3, "Highball", 10, "NY"),
        ];
        let rows = RestockAnalysisEngine::new().analyze(&two_mojitos(), &catalog(), &inventory);
        assert_eq!(rows[0].stock, Some(10));
        assert_eq!(rows[0].comment, Some(StockComment::NoIssue));
    }

    #[test]
    fn test_negative_zero_price_groups_with_zero() {
        let sales = vec![
            SaleEvent::new(0, ts(1, 10), "Mojito", 0.0, "NY"),
            SaleEvent::new(1, ts(1, 11), "Mojito", -0.0, "NY"),
        ];
        let rows = RestockAnalysisEngine::new().analyze(&sales, &catalog(), &[]);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].drink_count, 2);
    }

    #[test]
    fn test_empty_inputs_produce_empty_report() {
        assert!(RestockAnalysisEngine::new().analyze(&[], &[], &[]).is_empty());
    }
}
