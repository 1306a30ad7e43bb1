// ==========================================
// 酒吧库存分析 - 增量导入水位
// ==========================================
// 文件格式: 每行 "KEY value"，value 为最近一次已导入的交易时间
// 例: NYC_date_max 2024-01-31 23:10:00
// ==========================================
// 规则:
// - 缺失键按 1900-01-01 处理（全量导入）
// - 只导入严格晚于水位的销售
// - 无新数据时水位不变
// ==========================================

use crate::importer::data_cleaner::DataCleaner;
use crate::importer::error::{ImportError, ImportResult};
use chrono::{NaiveDate, NaiveDateTime};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

// 保留小数秒，读回后与写入前相等
const WATERMARK_FORMAT: &str = "%Y-%m-%d %H:%M:%S%.f";

/// 缺省水位
pub fn default_watermark() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1900, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

#[derive(Debug, Clone)]
pub struct WatermarkStore {
    path: PathBuf,
    entries: BTreeMap<String, NaiveDateTime>,
}

impl WatermarkStore {
    /// 读取水位文件（文件不存在时为空）
    pub fn load(path: &Path) -> ImportResult<Self> {
        let mut entries = BTreeMap::new();

        if path.exists() {
            let content = fs::read_to_string(path)?;
            let cleaner = DataCleaner;
            for (idx, line) in content.lines().enumerate() {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }
                let (key, value) = line.split_once(' ').ok_or_else(|| {
                    ImportError::WatermarkFormatError {
                        line: idx + 1,
                        message: format!("缺少值: {:?}", line),
                    }
                })?;

                let value = value.trim();
                // 空数据集遗留的 NaT 视为无水位
                if value.eq_ignore_ascii_case("nat") {
                    tracing::warn!(key, "水位值为 NaT，按缺省水位处理");
                    continue;
                }

                let ts = cleaner.parse_timestamp(value, idx + 1, key).map_err(|_| {
                    ImportError::WatermarkFormatError {
                        line: idx + 1,
                        message: format!("无法解析时间: {:?}", value),
                    }
                })?;
                entries.insert(key.to_string(), ts);
            }
        }

        Ok(Self {
            path: path.to_path_buf(),
            entries,
        })
    }

    /// 当前水位（缺失为 1900-01-01）
    pub fn get(&self, key: &str) -> NaiveDateTime {
        self.entries
            .get(key)
            .copied()
            .unwrap_or_else(default_watermark)
    }

    /// 推进水位（只前进不后退）
    pub fn advance(&mut self, key: &str, latest: NaiveDateTime) {
        if latest > self.get(key) {
            self.entries.insert(key.to_string(), latest);
        }
    }

    /// 写回文件（先写临时文件再替换）
    pub fn save(&self) -> ImportResult<()> {
        let mut content = String::new();
        for (key, ts) in &self.entries {
            content.push_str(&format!("{} {}\n", key, ts.format(WATERMARK_FORMAT)));
        }

        let tmp_path = self.path.with_extension("tmp");
        fs::write(&tmp_path, content)?;
        fs::rename(&tmp_path, &self.path)?;
        tracing::debug!(path = %self.path.display(), entries = self.entries.len(), "水位文件已保存");
        Ok(())
    }
}
