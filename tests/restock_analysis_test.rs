// ==========================================
// 补货分析报表集成测试
// ==========================================
// 测试目标: 基础表 → 引擎计算 → poc_analysis 落库
// ==========================================


use bar_stock_analysis::logging;
use bar_stock_analysis::repository::PocAnalysisRepository;
use bar_stock_analysis::{
    CocktailRecord, InventoryRecord, RestockAnalysisEngine, RestockAnalysisService, SaleEvent,
    StockComment,
};
use std::collections::HashMap;
use test_helpers::{create_test_db, mixed_dataset, seed, ts};

fn two_mojitos_in_ny() -> Vec<SaleEvent> {
    vec![
        SaleEvent::new(1, ts(1, 19, 0), "Mojito", 10.0, "NY"),
        SaleEvent::new(2, ts(1, 22, 30), "Mojito", 10.0, "NY"),
    ]
}

fn mojito_catalog() -> Vec<CocktailRecord> {
    vec![CocktailRecord::new(11000, "Mojito", Some("Highball"))]
}

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_stock_equal_to_demand_is_potential_issue() {
    logging::init_test();
    let (_temp, conn) = create_test_db().unwrap();
    seed(
        &conn,
        &two_mojitos_in_ny(),
        &mojito_catalog(),
        &[InventoryRecord::new(1, "Highball", 2, "NY")],
    )
    .unwrap();

    let service = RestockAnalysisService::from_connection(conn);
    service.refresh().unwrap();
    let rows = service.current_report().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].drink_count, 2);
    assert_eq!(rows[0].stock, Some(2));
    assert_eq!(rows[0].comment, Some(StockComment::PotentialIssue));
}

#[test]
fn test_stock_above_demand_is_no_issue() {
    let (_temp, conn) = create_test_db().unwrap();
    seed(
        &conn,
        &two_mojitos_in_ny(),
        &mojito_catalog(),
        &[InventoryRecord::new(1, "Highball", 5, "NY")],
    )
    .unwrap();

    let service = RestockAnalysisService::from_connection(conn);
    service.refresh().unwrap();
    let rows = service.current_report().unwrap();

    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].comment, Some(StockComment::NoIssue));
}

#[test]
fn test_drink_absent_from_catalog_keeps_null_columns() {
    let (_temp, conn) = create_test_db().unwrap();
    seed(
        &conn,
        &[SaleEvent::new(1, ts(1, 19, 0), "Unknown Sour", 9.0, "NY")],
        &mojito_catalog(),
        &[InventoryRecord::new(1, "Highball", 5, "NY")],
    )
    .unwrap();

    let service = RestockAnalysisService::from_connection(conn);
    let outcome = service.refresh().unwrap();
    let rows = service.current_report().unwrap();

    assert_eq!(outcome.summary.unclassified, 1);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].str_glass, None);
    assert_eq!(rows[0].stock, None);
    assert_eq!(rows[0].comment, None);
}

#[test]
fn test_drink_count_matches_raw_sales() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let service = RestockAnalysisService::from_connection(conn);
    service.refresh().unwrap();
    let rows = service.current_report().unwrap();

    // 报表计数总和等于原始销售条数（目录无重复）
    let total: i64 = rows.iter().map(|r| r.drink_count).sum();
    assert_eq!(total, sales.len() as i64);

    for row in &rows {
        let expected = sales
            .iter()
            .filter(|s| {
                s.day_of_sale() == row.day_of_sale
                    && s.drink == row.drink
                    && s.price == row.price
                    && s.bar == row.bar
            })
            .count() as i64;
        assert_eq!(row.drink_count, expected, "分组计数不一致: {:?}", row);
    }
}

#[test]
fn test_classification_follows_stock_comparison() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let stock_by_key: HashMap<(&str, &str), i64> = inventory
        .iter()
        .map(|r| ((r.glass_type.as_str(), r.bar.as_str()), r.stock))
        .collect();

    let service = RestockAnalysisService::from_connection(conn);
    service.refresh().unwrap();

    for row in service.current_report().unwrap() {
        let matched = row
            .str_glass
            .as_deref()
            .and_then(|g| stock_by_key.get(&(g, row.bar.as_str())).copied());
        assert_eq!(row.stock, matched);
        match matched {
            Some(stock) if row.drink_count >= stock => {
                assert_eq!(row.comment, Some(StockComment::PotentialIssue))
            }
            Some(_) => assert_eq!(row.comment, Some(StockComment::NoIssue)),
            None => assert_eq!(row.comment, None),
        }
    }
}

#[test]
fn test_engine_agrees_with_sql_query() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let engine_rows = RestockAnalysisEngine::new().analyze(&sales, &catalog, &inventory);
    let sql_rows = PocAnalysisRepository::from_connection(conn)
        .query_realtime()
        .unwrap();

    assert_eq!(engine_rows, sql_rows);
}

#[test]
fn test_refresh_twice_yields_identical_report() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let service = RestockAnalysisService::from_connection(conn.clone());
    let first_outcome = service.refresh().unwrap();
    let first = service.current_report().unwrap();
    let second_outcome = service.refresh().unwrap();
    let second = service.current_report().unwrap();

    assert_eq!(first, second);
    assert_eq!(first_outcome.summary, second_outcome.summary);
    assert_ne!(first_outcome.run_id, second_outcome.run_id);
    assert_eq!(
        PocAnalysisRepository::from_connection(conn).count().unwrap(),
        first.len() as i64
    );
}

#[test]
fn test_zero_stock_and_missing_stock_surface_differently() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let service = RestockAnalysisService::from_connection(conn);
    service.refresh().unwrap();
    let rows = service.current_report().unwrap();

    let zero_stock = rows
        .iter()
        .find(|r| r.bar == "new york" && r.str_glass.as_deref() == Some("old-fashioned glass"))
        .expect("new york 应有 old-fashioned glass 的销售");
    assert_eq!(zero_stock.stock, Some(0));
    assert_eq!(zero_stock.comment, Some(StockComment::PotentialIssue));

    let no_row = rows
        .iter()
        .find(|r| r.bar == "london" && r.drink == "margarita")
        .expect("london 应有 margarita 的销售");
    assert_eq!(no_row.str_glass.as_deref(), Some("cocktail glass"));
    assert_eq!(no_row.stock, None);
    assert_eq!(no_row.comment, None);
}

#[test]
fn test_duplicate_catalog_entries_do_not_inflate_counts() {
    let (_temp, conn) = create_test_db().unwrap();
    let sales = vec![
        SaleEvent::new(0, ts(1, 19, 0), "mojito", 10.0, "london"),
        SaleEvent::new(1, ts(1, 20, 0), "mojito", 10.0, "london"),
        SaleEvent::new(2, ts(1, 21, 0), "martini", 14.0, "london"),
    ];
    // mojito 重复收录同一杯型；martini 有两种杯型
    let catalog = vec![
        CocktailRecord::new(11000, "mojito", Some("highball glass")),
        CocktailRecord::new(11001, "mojito", Some("highball glass")),
        CocktailRecord::new(11005, "martini", Some("cocktail glass")),
        CocktailRecord::new(11006, "martini", Some("martini glass")),
    ];
    let inventory = vec![
        InventoryRecord::new(0, "highball glass", 3, "london"),
        InventoryRecord::new(1, "cocktail glass", 1, "london"),
    ];
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let engine_rows = RestockAnalysisEngine::new().analyze(&sales, &catalog, &inventory);
    let sql_rows = PocAnalysisRepository::from_connection(conn)
        .query_realtime()
        .unwrap();
    assert_eq!(engine_rows, sql_rows);

    let mojito = sql_rows.iter().find(|r| r.drink == "mojito").unwrap();
    assert_eq!(mojito.drink_count, 2);
    assert_eq!(mojito.comment, Some(StockComment::NoIssue));

    let martini: Vec<_> = sql_rows.iter().filter(|r| r.drink == "martini").collect();
    assert_eq!(martini.len(), 2);
    assert!(martini.iter().all(|r| r.drink_count == 1));
    assert_eq!(martini[0].str_glass.as_deref(), Some("cocktail glass"));
    assert_eq!(martini[0].comment, Some(StockComment::PotentialIssue));
    assert_eq!(martini[1].stock, None);
}
