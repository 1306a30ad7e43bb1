// ==========================================
// 酒吧库存分析 - 鸡尾酒目录导入器
// ==========================================
// 数据源: 鸡尾酒 API 的按名称搜索响应 {"drinks": [...] | null}
// 规则:
// - 只查询目录中尚不存在的饮品
// - 单个饮品获取失败只记录错误，不中断导入
// - 同一条目录多次出现时保留 dateModified 最新者
// - 文本 TRIM + 小写；idDrink 已存在则跳过
// ==========================================

use crate::domain::CocktailRecord;
use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use crate::repository::CocktailRepository;
use serde::Deserialize;
use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::PathBuf;

// ==========================================
// API 响应结构
// ==========================================
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Debug, Deserialize)]
struct RawCocktail {
    #[serde(rename = "idDrink")]
    id_drink: Option<RawId>,
    #[serde(rename = "strDrink")]
    str_drink: Option<String>,
    #[serde(rename = "strCategory")]
    str_category: Option<String>,
    #[serde(rename = "strIBA")]
    str_iba: Option<String>,
    #[serde(rename = "strAlcoholic")]
    str_alcoholic: Option<String>,
    #[serde(rename = "strGlass")]
    str_glass: Option<String>,
    #[serde(rename = "dateModified")]
    date_modified: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CocktailResponse {
    drinks: Option<Vec<RawCocktail>>,
}

/// 解析一次搜索响应
///
/// # 返回
/// - Ok(vec![]): 响应中 drinks 为 null
/// - Err(CocktailSourceError): JSON 非法或缺少 idDrink/strDrink
pub fn parse_cocktail_response(json: &str, drink: &str) -> ImportResult<Vec<CocktailRecord>> {
    let response: CocktailResponse =
        serde_json::from_str(json).map_err(|e| ImportError::CocktailSourceError {
            drink: drink.to_string(),
            message: e.to_string(),
        })?;

    let cleaner = DataCleaner;
    let mut records = Vec::new();
    for (idx, raw) in response.drinks.unwrap_or_default().into_iter().enumerate() {
        let id_drink = match raw.id_drink {
            Some(RawId::Number(n)) => n,
            Some(RawId::Text(s)) => {
                s.trim()
                    .parse::<i64>()
                    .map_err(|e| ImportError::CocktailSourceError {
                        drink: drink.to_string(),
                        message: format!("idDrink 非法 ({:?}): {}", s, e),
                    })?
            }
            None => {
                return Err(ImportError::CocktailSourceError {
                    drink: drink.to_string(),
                    message: format!("第 {} 条缺少 idDrink", idx + 1),
                })
            }
        };

        let str_drink = cleaner
            .normalize_optional(raw.str_drink.as_deref())
            .ok_or_else(|| ImportError::CocktailSourceError {
                drink: drink.to_string(),
                message: format!("idDrink={} 缺少 strDrink", id_drink),
            })?;

        let date_modified = match raw.date_modified.as_deref().map(str::trim) {
            Some(v) if !v.is_empty() => match cleaner.parse_timestamp(v, idx + 1, "dateModified") {
                Ok(ts) => Some(ts),
                Err(e) => {
                    tracing::warn!(id_drink, error = %e, "dateModified 无法解析，置空");
                    None
                }
            },
            _ => None,
        };

        records.push(CocktailRecord {
            id_drink,
            str_drink,
            str_category: cleaner.normalize_optional(raw.str_category.as_deref()),
            str_iba: cleaner.normalize_optional(raw.str_iba.as_deref()),
            str_alcoholic: cleaner.normalize_optional(raw.str_alcoholic.as_deref()),
            str_glass: cleaner.normalize_optional(raw.str_glass.as_deref()),
            date_modified,
        });
    }

    Ok(records)
}

/// 同一条目录只保留 dateModified 最新者（无时间的排在最后）
pub fn dedupe_latest(mut records: Vec<CocktailRecord>) -> Vec<CocktailRecord> {
    records.sort_by(|a, b| b.date_modified.cmp(&a.date_modified));

    let mut kept: Vec<CocktailRecord> = Vec::with_capacity(records.len());
    for record in records {
        if !kept.iter().any(|k| k.same_identity(&record)) {
            kept.push(record);
        }
    }
    kept
}

// ==========================================
// Trait: CocktailSource
// ==========================================
pub trait CocktailSource {
    /// 按饮品名称搜索目录
    fn search(&self, drink: &str) -> ImportResult<Vec<CocktailRecord>>;
}

/// 文件名: 小写，非字母数字替换为下划线
pub fn cache_file_slug(drink: &str) -> String {
    drink
        .trim()
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect()
}

// ==========================================
// JsonDirectoryCocktailSource - 本地缓存的 API 响应
// ==========================================
pub struct JsonDirectoryCocktailSource {
    dir: PathBuf,
}

impl JsonDirectoryCocktailSource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_for(&self, drink: &str) -> PathBuf {
        self.dir.join(format!("{}.json", cache_file_slug(drink)))
    }
}

impl CocktailSource for JsonDirectoryCocktailSource {
    fn search(&self, drink: &str) -> ImportResult<Vec<CocktailRecord>> {
        let path = self.path_for(drink);
        if !path.exists() {
            tracing::debug!(drink, path = %path.display(), "无缓存的目录响应");
            return Ok(Vec::new());
        }
        let json = fs::read_to_string(&path).map_err(|e| ImportError::CocktailSourceError {
            drink: drink.to_string(),
            message: e.to_string(),
        })?;
        parse_cocktail_response(&json, drink)
    }
}

// ==========================================
// InMemoryCocktailSource
// ==========================================
#[derive(Debug, Default)]
pub struct InMemoryCocktailSource {
    by_drink: HashMap<String, Vec<CocktailRecord>>,
}

impl InMemoryCocktailSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, drink: &str, records: Vec<CocktailRecord>) {
        self.by_drink.insert(drink.trim().to_lowercase(), records);
    }
}

impl CocktailSource for InMemoryCocktailSource {
    fn search(&self, drink: &str) -> ImportResult<Vec<CocktailRecord>> {
        Ok(self
            .by_drink
            .get(&drink.trim().to_lowercase())
            .cloned()
            .unwrap_or_default())
    }
}

// ==========================================
// CocktailImporter
// ==========================================
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CocktailImportReport {
    pub queried: usize,
    pub failed: usize,
    pub fetched: usize,
    pub inserted: usize,
}

pub struct CocktailImporter {
    repo: CocktailRepository,
    source: Box<dyn CocktailSource>,
}

impl CocktailImporter {
    pub fn new(repo: CocktailRepository, source: Box<dyn CocktailSource>) -> Self {
        Self { repo, source }
    }

    /// 为尚未收录的饮品补充目录
    pub fn import(&self, drinks: &BTreeSet<String>) -> ImportResult<CocktailImportReport> {
        let known = self.repo.known_drink_names()?;
        let pending: Vec<&String> = drinks.iter().filter(|d| !known.contains(*d)).collect();

        let mut report = CocktailImportReport {
            queried: pending.len(),
            ..Default::default()
        };

        let mut fetched = Vec::new();
        for (counter, drink) in pending.iter().enumerate() {
            match self.source.search(drink) {
                Ok(records) => fetched.extend(records),
                Err(e) => {
                    report.failed += 1;
                    tracing::error!(drink = %drink, error = %e, "鸡尾酒目录获取失败");
                }
            }
            tracing::info!("当前进度: {} / {}", counter + 1, pending.len());
        }

        let deduped = dedupe_latest(fetched);
        report.fetched = deduped.len();
        report.inserted = self.repo.insert_new(&deduped)?;

        tracing::info!(
            queried = report.queried,
            failed = report.failed,
            inserted = report.inserted,
            "目录数据已写入 cocktails"
        );
        Ok(report)
    }
}
