// ==========================================
// 酒吧库存分析 - 销售事件仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// 生命周期: global_sales 只追加
// ==========================================

use crate::db::{open_sqlite_connection, SharedConnection};
use crate::domain::sale::SaleEvent;
use crate::repository::error::{RepositoryError, RepositoryResult};
use chrono::NaiveDateTime;
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = "SELECT saleID, dateOfSale, drink, price, bar FROM global_sales";

// ==========================================
// GlobalSalesRepository - 销售仓储
// ==========================================
pub struct GlobalSalesRepository {
    conn: SharedConnection,
}

impl GlobalSalesRepository {
    /// 创建新的 GlobalSalesRepository 实例
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

    /// 追加单笔销售（主键重复时失败）
    pub fn insert(&self, sale: &SaleEvent) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_row(&conn, sale)?;
        Ok(())
    }

    /// 批量追加（单事务）
    pub fn insert_batch(&self, sales: &[SaleEvent]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        {
            let mut stmt = tx.prepare(
                "INSERT INTO global_sales (saleID, dateOfSale, drink, price, bar) VALUES (?1, ?2, ?3, ?4, ?5)",
            )?;
            for sale in sales {
                stmt.execute(params![
                    sale.sale_id,
                    sale.date_of_sale,
                    sale.drink,
                    sale.price,
                    sale.bar
                ])?;
            }
        }
        tx.commit()?;
        Ok(sales.len())
    }

    /// 按主键查询
    pub fn find_by_id(&self, sale_id: i64) -> RepositoryResult<Option<SaleEvent>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE saleID = ?1", SELECT_COLUMNS);
        let sale = conn.query_row(&sql, params![sale_id], map_row).optional()?;
        Ok(sale)
    }

    /// 查询全部销售，按 saleID 升序
    pub fn list_all(&self) -> RepositoryResult<Vec<SaleEvent>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY saleID ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let sales = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sales)
    }

    /// 查询某酒吧的销售
    pub fn list_by_bar(&self, bar: &str) -> RepositoryResult<Vec<SaleEvent>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE bar = ?1 ORDER BY saleID ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let sales = stmt
            .query_map(params![bar], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(sales)
    }

    /// 某酒吧已入库的最新交易时间
    pub fn max_date_of_sale(&self, bar: &str) -> RepositoryResult<Option<NaiveDateTime>> {
        let conn = self.get_conn()?;
        let max: Option<NaiveDateTime> = conn.query_row(
            "SELECT MAX(dateOfSale) FROM global_sales WHERE bar = ?1",
            params![bar],
            |row| row.get(0),
        )?;
        Ok(max)
    }

    /// 下一个可用 saleID（空表为 0）
    pub fn next_sale_id(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let max: Option<i64> =
            conn.query_row("SELECT MAX(saleID) FROM global_sales", [], |row| row.get(0))?;
        Ok(max.map(|v| v + 1).unwrap_or(0))
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM global_sales", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn insert_row(conn: &Connection, sale: &SaleEvent) -> SqliteResult<usize> {
    conn.execute(
        "INSERT INTO global_sales (saleID, dateOfSale, drink, price, bar) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![sale.sale_id, sale.date_of_sale, sale.drink, sale.price, sale.bar],
    )
}

fn map_row(row: &Row<'_>) -> SqliteResult<SaleEvent> {
    Ok(SaleEvent {
        sale_id: row.get(0)?,
        date_of_sale: row.get(1)?,
        drink: row.get(2)?,
        price: row.get(3)?,
        bar: row.get(4)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::schema::SchemaInitializer;
    use chrono::NaiveDate;

    fn repo() -> GlobalSalesRepository {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        SchemaInitializer::new(conn.clone()).create_tables().unwrap();
        GlobalSalesRepository::from_connection(conn)
    }

    fn ts(d: u32, h: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 1, d)
            .unwrap()
            .and_hms_opt(h, 15, 0)
            .unwrap()
    }

    #[test]
    fn test_timestamp_round_trips_and_truncates_in_sql() {
        let repo = repo();
        repo.insert(&SaleEvent::new(0, ts(1, 22), "mojito", 10.0, "new york"))
            .unwrap();
        let sale = repo.find_by_id(0).unwrap().unwrap();
        assert_eq!(sale.date_of_sale, ts(1, 22));

        let conn = repo.get_conn().unwrap();
        let day: String = conn
            .query_row("SELECT date(dateOfSale) FROM global_sales", [], |r| r.get(0))
            .unwrap();
        assert_eq!(day, "2024-01-01");
    }

    #[test]
    fn test_next_sale_id_and_max_date() {
        let repo = repo();
        assert_eq!(repo.next_sale_id().unwrap(), 0);
        assert_eq!(repo.max_date_of_sale("london").unwrap(), None);

        repo.insert_batch(&[
            SaleEvent::new(0, ts(1, 10), "mojito", 10.0, "london"),
            SaleEvent::new(1, ts(3, 9), "negroni", 12.5, "london"),
            SaleEvent::new(2, ts(2, 9), "negroni", 12.5, "budapest"),
        ])
        .unwrap();

        assert_eq!(repo.next_sale_id().unwrap(), 3);
        assert_eq!(repo.max_date_of_sale("london").unwrap(), Some(ts(3, 9)));
        assert_eq!(repo.list_by_bar("budapest").unwrap().len(), 1);
    }

    #[test]
    fn test_duplicate_sale_id_rejected() {
        let repo = repo();
        repo.insert(&SaleEvent::new(5, ts(1, 10), "mojito", 10.0, "london"))
            .unwrap();
        let err = repo
            .insert(&SaleEvent::new(5, ts(1, 11), "mojito", 10.0, "london"))
            .unwrap_err();
        assert!(matches!(err, RepositoryError::UniqueConstraintViolation(_)));
        assert_eq!(repo.count().unwrap(), 1);
    }
}
