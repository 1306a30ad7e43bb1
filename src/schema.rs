// ==========================================
// 酒吧库存分析 - Schema 初始化
// ==========================================
// 职责: 声明三张基础表 (bar_stock / global_sales / cocktails)
// 约束: 仅主键唯一，无外键、无二级索引、无计算列
// ==========================================
// 说明: poc_analysis 为派生表，由 PocAnalysisRepository 首次落库时创建
// ==========================================

use crate::db::{SharedConnection, CURRENT_SCHEMA_VERSION};
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection};
use std::sync::MutexGuard;

pub const BAR_STOCK_TABLE: &str = "bar_stock";
pub const GLOBAL_SALES_TABLE: &str = "global_sales";
pub const COCKTAILS_TABLE: &str = "cocktails";

/// 基础表 DDL（顺序即创建顺序）
pub const BASE_TABLES: [(&str, &str); 3] = [
    (
        BAR_STOCK_TABLE,
        r#"
        CREATE TABLE bar_stock (
            stockID INTEGER PRIMARY KEY,
            glassType TEXT,
            stock INTEGER,
            bar TEXT
        )
        "#,
    ),
    (
        GLOBAL_SALES_TABLE,
        r#"
        CREATE TABLE global_sales (
            saleID INTEGER PRIMARY KEY,
            dateOfSale TIMESTAMP,
            drink TEXT,
            price REAL,
            bar TEXT
        )
        "#,
    ),
    (
        COCKTAILS_TABLE,
        r#"
        CREATE TABLE cocktails (
            idDrink INTEGER PRIMARY KEY,
            strDrink TEXT,
            strCategory TEXT,
            strIBA TEXT,
            strAlcoholic TEXT,
            strGlass TEXT,
            dateModified TIMESTAMP
        )
        "#,
    ),
];

// ==========================================
// SchemaInitializer - 建表
// ==========================================
pub struct SchemaInitializer {
    conn: SharedConnection,
}

impl SchemaInitializer {
    pub fn new(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 严格建表
    ///
    /// # 返回
    /// - Ok(()): 三张表全部创建
    /// - Err(TableAlreadyExists): 任一表已存在（整体回滚）
    /// - Err: 存储不可用
    pub fn create_tables(&self) -> RepositoryResult<()> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        for (name, ddl) in BASE_TABLES.iter() {
            if table_exists_in(&tx, name)? {
                return Err(RepositoryError::TableAlreadyExists(name.to_string()));
            }
            tx.execute_batch(ddl)?;
            tracing::debug!(table = name, "基础表已创建");
        }
        record_schema_version(&tx)?;

        tx.commit()?;
        tracing::info!(version = CURRENT_SCHEMA_VERSION, "Schema 初始化完成");
        Ok(())
    }

    /// 幂等建表：只创建缺失的表
    ///
    /// # 返回
    /// - Ok(Vec<&str>): 本次新建的表名
    pub fn ensure_tables(&self) -> RepositoryResult<Vec<&'static str>> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;

        let mut created = Vec::new();
        for (name, ddl) in BASE_TABLES.iter() {
            if !table_exists_in(&tx, name)? {
                tx.execute_batch(ddl)?;
                created.push(*name);
            }
        }
        record_schema_version(&tx)?;

        tx.commit()?;
        if !created.is_empty() {
            tracing::info!(tables = ?created, "缺失的基础表已补建");
        }
        Ok(created)
    }

    /// 判断表是否存在
    pub fn table_exists(&self, table: &str) -> RepositoryResult<bool> {
        let conn = self.get_conn()?;
        table_exists_in(&conn, table)
    }

    /// 已存在的基础表
    pub fn existing_tables(&self) -> RepositoryResult<Vec<&'static str>> {
        let conn = self.get_conn()?;
        let mut existing = Vec::new();
        for (name, _) in BASE_TABLES.iter() {
            if table_exists_in(&conn, name)? {
                existing.push(*name);
            }
        }
        Ok(existing)
    }
}

fn table_exists_in(conn: &Connection, table: &str) -> RepositoryResult<bool> {
    let count: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
        params![table],
        |row| row.get(0),
    )?;
    Ok(count > 0)
}

fn record_schema_version(conn: &Connection) -> RepositoryResult<()> {
    conn.execute_batch(
        r#"
        CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY,
            applied_at TEXT NOT NULL DEFAULT (datetime('now'))
        )
        "#,
    )?;
    conn.execute(
        "INSERT OR IGNORE INTO schema_version (version) VALUES (?1)",
        params![CURRENT_SCHEMA_VERSION],
    )?;
    Ok(())
}
