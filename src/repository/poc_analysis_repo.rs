// ==========================================
// 酒吧库存分析 - 补货分析报表仓储
// ==========================================
// 职责: poc_analysis 派生表的落库与查询
// 策略: 每次刷新整体替换（单事务），同一输入重复刷新结果一致
// ==========================================
// query_realtime: 以单条 SQL (LEFT JOIN + CASE) 计算同一报表，
//                 用于与引擎结果对账
// ==========================================

use crate::db::{open_sqlite_connection, SharedConnection};
use crate::domain::analysis::PocAnalysisRow;
use crate::domain::types::StockComment;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::types::Type;
use rusqlite::{params, Connection, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const CREATE_TABLE_SQL: &str = r#"
    CREATE TABLE IF NOT EXISTS poc_analysis (
        dayOfSale DATE NOT NULL,
        drink TEXT,
        price REAL,
        bar TEXT,
        strGlass TEXT,
        drinkCount INTEGER NOT NULL,
        stock INTEGER,
        comment TEXT CHECK (comment IN ('NO ISSUE', 'POTENTIAL ISSUE'))
    )
"#;

const SELECT_COLUMNS: &str = r#"
    SELECT dayOfSale, drink, price, bar, strGlass, drinkCount, stock, comment
    FROM poc_analysis
"#;

const ORDER_BY: &str = "ORDER BY dayOfSale, drink, price, bar, strGlass";

/// 报表的 SQL 口径
const REALTIME_SQL: &str = r#"
    SELECT
        s.dayOfSale,
        s.drink,
        s.price,
        s.bar,
        s.strGlass,
        s.drinkCount,
        b.stock,
        CASE
            WHEN s.drinkCount < b.stock THEN 'NO ISSUE'
            WHEN s.drinkCount >= b.stock THEN 'POTENTIAL ISSUE'
        END AS comment
    FROM (
        SELECT
            date(g.dateOfSale) AS dayOfSale,
            g.drink AS drink,
            g.price AS price,
            g.bar AS bar,
            c.strGlass AS strGlass,
            COUNT(*) AS drinkCount
        FROM global_sales g
        LEFT JOIN (
            -- 同名饮品按杯型去重，重复目录不放大计数
            SELECT DISTINCT strDrink, strGlass FROM cocktails
        ) c ON g.drink = c.strDrink
        GROUP BY date(g.dateOfSale), g.drink, g.price, g.bar, c.strGlass
    ) s
    LEFT JOIN bar_stock b ON s.strGlass = b.glassType AND s.bar = b.bar
    ORDER BY s.dayOfSale, s.drink, s.price, s.bar, s.strGlass
"#;

// ==========================================
// PocAnalysisRepository - 报表仓储
// ==========================================
pub struct PocAnalysisRepository {
    conn: SharedConnection,
}

impl PocAnalysisRepository {
    /// 创建新的 PocAnalysisRepository 实例
    pub fn new(db_path: &str) -> RepositoryResult<Self> {
        let conn = open_sqlite_connection(db_path)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// 从已有连接创建仓储实例
    pub fn from_connection(conn: SharedConnection) -> Self {
        Self { conn }
    }

    fn get_conn(&self) -> RepositoryResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| RepositoryError::LockError(e.to_string()))
    }

    /// 创建 poc_analysis 表（幂等）
    pub fn ensure_table(&self) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        conn.execute_batch(CREATE_TABLE_SQL)?;
        Ok(())
    }

    /// 整体替换报表内容
    pub fn replace_all(&self, rows: &[PocAnalysisRow]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        tx.execute_batch(CREATE_TABLE_SQL)?;
        tx.execute("DELETE FROM poc_analysis", [])?;
        {
            let mut stmt = tx.prepare(
                r#"
                INSERT INTO poc_analysis (
                    dayOfSale, drink, price, bar, strGlass, drinkCount, stock, comment
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)
                "#,
            )?;
            for row in rows {
                stmt.execute(params![
                    row.day_of_sale,
                    row.drink,
                    row.price,
                    row.bar,
                    row.str_glass,
                    row.drink_count,
                    row.stock,
                    row.comment.map(|c| c.to_db_str()),
                ])?;
            }
        }
        tx.commit()?;
        Ok(rows.len())
    }

    /// 读取已落库的报表
    pub fn list_all(&self) -> RepositoryResult<Vec<PocAnalysisRow>> {
        let conn = self.get_conn()?;
        let sql = format!("{} {}", SELECT_COLUMNS, ORDER_BY);
        let mut stmt = conn.prepare(&sql)?;
        let rows = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    /// 按风险标记筛选（None 表示未匹配库存的行）
    pub fn list_by_comment(
        &self,
        comment: Option<StockComment>,
    ) -> RepositoryResult<Vec<PocAnalysisRow>> {
        let conn = self.get_conn()?;
        let rows = match comment {
            Some(c) => {
                let sql = format!("{} WHERE comment = ?1 {}", SELECT_COLUMNS, ORDER_BY);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map(params![c.to_db_str()], map_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
            None => {
                let sql = format!("{} WHERE comment IS NULL {}", SELECT_COLUMNS, ORDER_BY);
                let mut stmt = conn.prepare(&sql)?;
                let rows = stmt
                    .query_map([], map_row)?
                    .collect::<SqliteResult<Vec<_>>>()?;
                rows
            }
        };
        Ok(rows)
    }

    /// 直接在基础表上以 SQL 计算报表（不落库）
    pub fn query_realtime(&self) -> RepositoryResult<Vec<PocAnalysisRow>> {
        let conn = self.get_conn()?;
        let mut stmt = conn.prepare(REALTIME_SQL)?;
        let rows = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(rows)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM poc_analysis", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn map_row(row: &Row<'_>) -> SqliteResult<PocAnalysisRow> {
    let comment = match row.get::<_, Option<String>>(7)? {
        Some(raw) => Some(StockComment::from_db_str(&raw).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                7,
                Type::Text,
                format!("未知的 comment 值: {}", raw).into(),
            )
        })?),
        None => None,
    };

    Ok(PocAnalysisRow {
        day_of_sale: row.get(0)?,
        drink: row.get(1)?,
        price: row.get(2)?,
        bar: row.get(3)?,
        str_glass: row.get(4)?,
        drink_count: row.get(5)?,
        stock: row.get(6)?,
        comment,
    })
}
