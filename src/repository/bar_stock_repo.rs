// ==========================================
// 酒吧库存分析 - 杯具库存仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 约束: 所有查询使用参数化
// ==========================================

use crate::db::{open_sqlite_connection, SharedConnection};
use crate::domain::inventory::InventoryRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "SELECT stockID, glassType, stock, bar FROM bar_stock";

// ==========================================
// BarStockRepository - 杯具库存仓储
// ==========================================
/// 职责: 管理 bar_stock 表的读写
pub struct BarStockRepository {
    conn: SharedConnection,
}

impl BarStockRepository {
    /// 创建新的 BarStockRepository 实例
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

    /// 插入单条库存（主键重复时失败）
    pub fn insert(&self, record: &InventoryRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_row(&conn, record)?;
        Ok(())
    }

    /// 批量插入（单事务，任一失败整体回滚）
    pub fn insert_batch(&self, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for record in records {
            insert_row(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// 以新快照整体替换库存
    pub fn replace_all(&self, records: &[InventoryRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let removed = tx.execute("DELETE FROM bar_stock", [])?;
        for record in records {
            insert_row(&tx, record)?;
        }
        tx.commit()?;
        tracing::debug!(removed, inserted = records.len(), "bar_stock 快照已替换");
        Ok(records.len())
    }

    /// 按主键查询
    pub fn find_by_id(&self, stock_id: i64) -> RepositoryResult<Option<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE stockID = ?1", SELECT_COLUMNS);
        let record = conn
            .query_row(&sql, params![stock_id], map_row)
            .optional()?;
        Ok(record)
    }

    /// 按 (杯具类型, 酒吧) 查询，按 stockID 升序
    pub fn find_by_glass_and_bar(
        &self,
        glass_type: &str,
        bar: &str,
    ) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!(
            "{} WHERE glassType = ?1 AND bar = ?2 ORDER BY stockID ASC",
            SELECT_COLUMNS
        );
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![glass_type, bar], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 查询全部库存
    pub fn list_all(&self) -> RepositoryResult<Vec<InventoryRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY stockID ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM bar_stock", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn insert_row(conn: &Connection, record: &InventoryRecord) -> SqliteResult<usize> {
    conn.execute(
        "INSERT INTO bar_stock (stockID, glassType, stock, bar) VALUES (?1, ?2, ?3, ?4)",
        params![record.stock_id, record.glass_type, record.stock, record.bar],
    )
}

fn map_row(row: &Row<'_>) -> SqliteResult<InventoryRecord> {
    Ok(InventoryRecord {
        stock_id: row.get(0)?,
        glass_type: row.get(1)?,
        stock: row.get(2)?,
        bar: row.get(3)?,
    })
}
