// ==========================================
// Repository 层集成测试
// ==========================================
// 测试目标: 文件库上的建表 → 写入 → 跨连接读取
// ==========================================


use bar_stock_analysis::db::{open_shared_connection, open_sqlite_connection, read_schema_version};
use bar_stock_analysis::logging;
use bar_stock_analysis::repository::{
    BarStockRepository, CocktailRepository, GlobalSalesRepository, PocAnalysisRepository,
    RepositoryError,
};
use bar_stock_analysis::schema::{BAR_STOCK_TABLE, COCKTAILS_TABLE, GLOBAL_SALES_TABLE};
use bar_stock_analysis::{
    CocktailRecord, InventoryRecord, RestockAnalysisService, SaleEvent, SchemaInitializer,
    StockComment,
};
use test_helpers::{create_test_db, mixed_dataset, seed, ts};

// ==========================================
// 测试用例
// ==========================================

#[test]
fn test_create_tables_on_file_database() {
    logging::init_test();

    println!("\n=== 测试：文件库建表 ===");

    let (temp_file, conn) = create_test_db().expect("Failed to create test db");
    let db_path = temp_file.path().to_str().unwrap().to_string();

    let existing = SchemaInitializer::new(conn).existing_tables().unwrap();
    assert_eq!(existing, vec![BAR_STOCK_TABLE, GLOBAL_SALES_TABLE, COCKTAILS_TABLE]);
    println!("✓ 三张基础表已创建");

    // 新连接能读到 schema 版本
    let fresh = open_sqlite_connection(&db_path).unwrap();
    assert_eq!(read_schema_version(&fresh).unwrap(), Some(1));
    println!("✓ schema_version 已记录");
}

#[test]
fn test_create_tables_twice_is_rejected() {
    let (temp_file, _conn) = create_test_db().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();

    // 另一个连接再次严格建表
    let other = open_shared_connection(&db_path).unwrap();
    let result = SchemaInitializer::new(other.clone()).create_tables();
    assert!(matches!(
        result,
        Err(RepositoryError::TableAlreadyExists(ref t)) if t == BAR_STOCK_TABLE
    ));

    // 幂等建表不报错，也不新建
    let created = SchemaInitializer::new(other).ensure_tables().unwrap();
    assert!(created.is_empty());
}

#[test]
fn test_data_visible_across_connections() {
    let (temp_file, conn) = create_test_db().unwrap();
    let db_path = temp_file.path().to_str().unwrap().to_string();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let sales_repo = GlobalSalesRepository::new(&db_path).unwrap();
    let stock_repo = BarStockRepository::new(&db_path).unwrap();
    let cocktail_repo = CocktailRepository::new(&db_path).unwrap();

    assert_eq!(sales_repo.count().unwrap(), sales.len() as i64);
    assert_eq!(stock_repo.count().unwrap(), inventory.len() as i64);
    assert_eq!(cocktail_repo.count().unwrap(), catalog.len() as i64);

    // 时间戳往返后保持原值
    let first = sales_repo.find_by_id(0).unwrap().unwrap();
    assert_eq!(first, sales[0]);
    assert_eq!(sales_repo.next_sale_id().unwrap(), sales.len() as i64);
    assert_eq!(
        sales_repo.max_date_of_sale("london").unwrap(),
        Some(ts(1, 23, 59))
    );
}

#[test]
fn test_duplicate_sale_id_rolls_back_batch() {
    let (_temp, conn) = create_test_db().unwrap();
    let repo = GlobalSalesRepository::from_connection(conn);

    repo.insert(&SaleEvent::new(7, ts(1, 10, 0), "mojito", 10.0, "london"))
        .unwrap();

    let batch = vec![
        SaleEvent::new(8, ts(1, 11, 0), "mojito", 10.0, "london"),
        SaleEvent::new(7, ts(1, 12, 0), "negroni", 12.0, "london"),
    ];
    let result = repo.insert_batch(&batch);

    assert!(matches!(
        result,
        Err(RepositoryError::UniqueConstraintViolation(_))
    ));
    assert_eq!(repo.count().unwrap(), 1);
    assert!(repo.find_by_id(8).unwrap().is_none());
}

#[test]
fn test_bar_stock_snapshot_replaced() {
    let (_temp, conn) = create_test_db().unwrap();
    let repo = BarStockRepository::from_connection(conn);

    repo.insert_batch(&[
        InventoryRecord::new(0, "highball glass", 3, "london"),
        InventoryRecord::new(1, "coupe glass", 8, "london"),
    ])
    .unwrap();
    repo.replace_all(&[InventoryRecord::new(0, "highball glass", 6, "london")])
        .unwrap();

    assert_eq!(repo.count().unwrap(), 1);
    let highball = repo
        .find_by_glass_and_bar("highball glass", "london")
        .unwrap()
        .into_iter()
        .next()
        .unwrap();
    assert_eq!(highball.stock, 6);
    assert!(repo
        .find_by_glass_and_bar("coupe glass", "london")
        .unwrap()
        .is_empty());
}

#[test]
fn test_cocktail_insert_new_skips_known_ids() {
    let (_temp, conn) = create_test_db().unwrap();
    let repo = CocktailRepository::from_connection(conn);

    repo.insert(&CocktailRecord::new(11000, "mojito", Some("highball glass")))
        .unwrap();
    let inserted = repo
        .insert_new(&[
            CocktailRecord::new(11000, "mojito", Some("collins glass")),
            CocktailRecord::new(11007, "margarita", Some("cocktail glass")),
        ])
        .unwrap();

    assert_eq!(inserted, 1);
    let mojito = repo.find_by_id(11000).unwrap().unwrap();
    assert_eq!(mojito.str_glass.as_deref(), Some("highball glass"));
    assert!(repo.known_drink_names().unwrap().contains("margarita"));
}

#[test]
fn test_poc_analysis_filter_by_comment() {
    let (_temp, conn) = create_test_db().unwrap();
    let (sales, catalog, inventory) = mixed_dataset();
    seed(&conn, &sales, &catalog, &inventory).unwrap();

    let outcome = RestockAnalysisService::from_connection(conn.clone())
        .refresh()
        .unwrap();
    let repo = PocAnalysisRepository::from_connection(conn);

    let issues = repo
        .list_by_comment(Some(StockComment::PotentialIssue))
        .unwrap();
    let fine = repo.list_by_comment(Some(StockComment::NoIssue)).unwrap();
    let unclassified = repo.list_by_comment(None).unwrap();

    assert_eq!(issues.len(), outcome.summary.potential_issue);
    assert_eq!(fine.len(), outcome.summary.no_issue);
    assert_eq!(unclassified.len(), outcome.summary.unclassified);
    assert!(issues.iter().all(|r| r.is_potential_issue()));
    assert!(unclassified.iter().all(|r| r.comment.is_none()));
}
