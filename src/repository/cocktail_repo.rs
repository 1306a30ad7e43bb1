// ==========================================
// 酒吧库存分析 - 鸡尾酒目录仓储
// ==========================================
// 红线: Repository 不含业务逻辑
// ==========================================

use crate::db::{open_sqlite_connection, SharedConnection};
use crate::domain::cocktail::CocktailRecord;
use crate::repository::error::{RepositoryError, RepositoryResult};
use rusqlite::{params, Connection, OptionalExtension, Result as SqliteResult, Row};
use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, MutexGuard};

const SELECT_COLUMNS: &str = r#"
    SELECT idDrink, strDrink, strCategory, strIBA, strAlcoholic, strGlass, dateModified
    FROM cocktails
"#;

const INSERT_SQL: &str = r#"
    INSERT INTO cocktails (
        idDrink, strDrink, strCategory, strIBA, strAlcoholic, strGlass, dateModified
    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)
"#;

// ==========================================
// CocktailRepository - 鸡尾酒目录仓储
// ==========================================
pub struct CocktailRepository {
    conn: SharedConnection,
}

impl CocktailRepository {
    /// 创建新的 CocktailRepository 实例
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

    /// 插入单条目录（主键重复时失败）
    pub fn insert(&self, record: &CocktailRecord) -> RepositoryResult<()> {
        let conn = self.get_conn()?;
        insert_row(&conn, record)?;
        Ok(())
    }

    /// 批量插入（单事务）
    pub fn insert_batch(&self, records: &[CocktailRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        for record in records {
            insert_row(&tx, record)?;
        }
        tx.commit()?;
        Ok(records.len())
    }

    /// 仅插入 idDrink 尚不存在的记录
    ///
    /// # 返回
    /// - Ok(usize): 实际插入条数
    pub fn insert_new(&self, records: &[CocktailRecord]) -> RepositoryResult<usize> {
        let mut conn = self.get_conn()?;
        let tx = conn.transaction()?;
        let mut inserted = 0;
        for record in records {
            let exists: bool = tx
                .query_row(
                    "SELECT 1 FROM cocktails WHERE idDrink = ?1",
                    params![record.id_drink],
                    |_row| Ok(true),
                )
                .optional()?
                .unwrap_or(false);
            if exists {
                tracing::debug!(id_drink = record.id_drink, "目录已存在，跳过");
                continue;
            }
            insert_row(&tx, record)?;
            inserted += 1;
        }
        tx.commit()?;
        Ok(inserted)
    }

    /// 按主键查询
    pub fn find_by_id(&self, id_drink: i64) -> RepositoryResult<Option<CocktailRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE idDrink = ?1", SELECT_COLUMNS);
        let record = conn.query_row(&sql, params![id_drink], map_row).optional()?;
        Ok(record)
    }

    /// 按饮品名称查询（精确匹配）
    pub fn find_by_name(&self, str_drink: &str) -> RepositoryResult<Vec<CocktailRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} WHERE strDrink = ?1 ORDER BY idDrink ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map(params![str_drink], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    pub fn list_all(&self) -> RepositoryResult<Vec<CocktailRecord>> {
        let conn = self.get_conn()?;
        let sql = format!("{} ORDER BY idDrink ASC", SELECT_COLUMNS);
        let mut stmt = conn.prepare(&sql)?;
        let records = stmt
            .query_map([], map_row)?
            .collect::<SqliteResult<Vec<_>>>()?;
        Ok(records)
    }

    /// 目录中已有的饮品名称
    pub fn known_drink_names(&self) -> RepositoryResult<BTreeSet<String>> {
        let conn = self.get_conn()?;
        let mut stmt =
            conn.prepare("SELECT DISTINCT strDrink FROM cocktails WHERE strDrink IS NOT NULL")?;
        let names = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<SqliteResult<BTreeSet<_>>>()?;
        Ok(names)
    }

    pub fn count(&self) -> RepositoryResult<i64> {
        let conn = self.get_conn()?;
        let count = conn.query_row("SELECT COUNT(*) FROM cocktails", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn insert_row(conn: &Connection, record: &CocktailRecord) -> SqliteResult<usize> {
    conn.execute(
        INSERT_SQL,
        params![
            record.id_drink,
            record.str_drink,
            record.str_category,
            record.str_iba,
            record.str_alcoholic,
            record.str_glass,
            record.date_modified,
        ],
    )
}

fn map_row(row: &Row<'_>) -> SqliteResult<CocktailRecord> {
    Ok(CocktailRecord {
        id_drink: row.get(0)?,
        str_drink: row.get(1)?,
        str_category: row.get(2)?,
        str_iba: row.get(3)?,
        str_alcoholic: row.get(4)?,
        str_glass: row.get(5)?,
        date_modified: row.get(6)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open_in_memory;
    use crate::schema::SchemaInitializer;

    fn repo() -> CocktailRepository {
        let conn = Arc::new(Mutex::new(open_in_memory().unwrap()));
        SchemaInitializer::new(conn.clone()).create_tables().unwrap();
        CocktailRepository::from_connection(conn)
    }

    #[test]
    fn test_insert_new_skips_existing_ids() {
        let repo = repo();
        repo.insert(&CocktailRecord::new(11000, "mojito", Some("highball glass")))
            .unwrap();

        let inserted = repo
            .insert_new(&[
                CocktailRecord::new(11000, "mojito", Some("collins glass")),
                CocktailRecord::new(11003, "negroni", Some("old-fashioned glass")),
            ])
            .unwrap();

        assert_eq!(inserted, 1);
        assert_eq!(repo.count().unwrap(), 2);
        let mojito = repo.find_by_id(11000).unwrap().unwrap();
        assert_eq!(mojito.str_glass.as_deref(), Some("highball glass"));
    }

    #[test]
    fn test_nullable_attributes_round_trip() {
        let repo = repo();
        repo.insert(&CocktailRecord::new(1, "mystery", None)).unwrap();
        let found = repo.find_by_name("mystery").unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].str_glass, None);
        assert_eq!(found[0].date_modified, None);
        assert!(repo.known_drink_names().unwrap().contains("mystery"));
    }

    #[test]
    fn test_duplicate_id_rejected() {
        let repo = repo();
        repo.insert(&CocktailRecord::new(7, "a", None)).unwrap();
        assert!(matches!(
            repo.insert(&CocktailRecord::new(7, "b", None)),
            Err(RepositoryError::UniqueConstraintViolation(_))
        ));
    }
}
