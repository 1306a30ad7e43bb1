// ==========================================
// 酒吧库存分析 - 流水线配置
// ==========================================
// 职责: 数据库路径、数据文件、水位文件、日志文件
// 存储: JSON 文件（可选），缺省使用内置默认值
// 覆写: 环境变量 BAR_STOCK_DB_PATH 优先于文件配置
// ==========================================

use crate::config::error::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// 数据库路径环境变量
pub const DB_PATH_ENV: &str = "BAR_STOCK_DB_PATH";

// ==========================================
// SalesSourceConfig - 单个酒吧的销售数据源
// ==========================================
// 列按位置读取: dateOfSale, drink, price
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SalesSourceConfig {
    pub bar: String,           // 写入 global_sales.bar 的酒吧标识
    pub path: PathBuf,         // 支持 .gz
    pub delimiter: char,       // ',' 或 '\t'
    pub has_header: bool,      // 首行是否为表头
    pub watermark_key: String, // 增量水位键
}

impl SalesSourceConfig {
    pub fn new(
        bar: &str,
        path: impl Into<PathBuf>,
        delimiter: char,
        has_header: bool,
        watermark_key: &str,
    ) -> Self {
        Self {
            bar: bar.to_string(),
            path: path.into(),
            delimiter,
            has_header,
            watermark_key: watermark_key.to_string(),
        }
    }
}

// ==========================================
// PipelineConfig
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub db_path: String,
    pub bar_stock_file: PathBuf,
    pub sales_sources: Vec<SalesSourceConfig>,
    pub cocktail_cache_dir: PathBuf,
    pub watermark_file: PathBuf,
    pub log_file: Option<PathBuf>,
    pub report_export_path: Option<PathBuf>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            db_path: "bar_db".to_string(),
            bar_stock_file: PathBuf::from("data/bar_data.csv"),
            sales_sources: vec![
                SalesSourceConfig::new("budapest", "data/budapest.csv.gz", ',', true, "BUDA_date_max"),
                SalesSourceConfig::new(
                    "london",
                    "data/london_transactions.csv.gz",
                    '\t',
                    false,
                    "LON_date_max",
                ),
                SalesSourceConfig::new("new york", "data/ny.csv.gz", ',', true, "NYC_date_max"),
            ],
            cocktail_cache_dir: PathBuf::from("data/cocktails"),
            watermark_file: PathBuf::from("last_update.txt"),
            log_file: Some(PathBuf::from("drinks_db.log")),
            report_export_path: None,
        }
    }
}

impl PipelineConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: JSON 配置文件；None 时使用默认值
    ///
    /// # 返回
    /// 已应用环境变量覆写并通过校验的配置
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let mut config = match path {
            Some(p) => Self::from_json_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    /// 从 JSON 文件读取（缺失字段取默认值）
    pub fn from_json_file(path: &Path) -> ConfigResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 环境变量覆写
    pub fn apply_env_overrides(&mut self) {
        if let Ok(path) = std::env::var(DB_PATH_ENV) {
            let trimmed = path.trim();
            if !trimmed.is_empty() {
                tracing::debug!(db_path = trimmed, "使用环境变量指定的数据库路径");
                self.db_path = trimmed.to_string();
            }
        }
    }

    /// 配置校验
    pub fn validate(&self) -> ConfigResult<()> {
        if self.db_path.trim().is_empty() {
            return Err(ConfigError::ValidationError {
                key: "db_path".to_string(),
                message: "数据库路径不能为空".to_string(),
            });
        }

        if self.sales_sources.is_empty() {
            return Err(ConfigError::ValidationError {
                key: "sales_sources".to_string(),
                message: "至少需要一个销售数据源".to_string(),
            });
        }

        let mut bars = HashSet::new();
        let mut keys = HashSet::new();
        for source in &self.sales_sources {
            if source.bar.trim().is_empty() {
                return Err(ConfigError::ValidationError {
                    key: "sales_sources.bar".to_string(),
                    message: format!("数据源 {} 缺少酒吧标识", source.path.display()),
                });
            }
            if !bars.insert(source.bar.trim().to_lowercase()) {
                return Err(ConfigError::ValidationError {
                    key: "sales_sources.bar".to_string(),
                    message: format!("酒吧标识重复: {}", source.bar),
                });
            }
            if !keys.insert(source.watermark_key.as_str()) {
                return Err(ConfigError::ValidationError {
                    key: "sales_sources.watermark_key".to_string(),
                    message: format!("水位键重复: {}", source.watermark_key),
                });
            }
        }

        Ok(())
    }
}
