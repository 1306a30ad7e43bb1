// ==========================================
// 酒吧库存分析 - 分隔文本解析器
// ==========================================
// 支持: CSV / TSV，可选表头，*.gz 透明解压
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use csv::ReaderBuilder;
use flate2::read::GzDecoder;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

/// 单行数据（row 为 1 起始的数据行号，不含表头）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    pub row: usize,
    pub fields: Vec<String>,
}

impl RawRow {
    /// 按列位置取值（越界视为空串）
    pub fn field(&self, idx: usize) -> &str {
        self.fields.get(idx).map(String::as_str).unwrap_or("")
    }
}

/// 解析结果
#[derive(Debug, Clone, Default)]
pub struct ParsedFile {
    pub headers: Option<Vec<String>>,
    pub rows: Vec<RawRow>,
}

impl ParsedFile {
    /// 按表头名查找列位置（忽略大小写与首尾空白）
    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers
            .as_ref()?
            .iter()
            .position(|h| h.trim().eq_ignore_ascii_case(name.trim()))
    }
}

// ==========================================
// DelimitedFileParser
// ==========================================
#[derive(Debug, Clone, Copy)]
pub struct DelimitedFileParser {
    delimiter: u8,
    has_header: bool,
}

impl DelimitedFileParser {
    pub fn new(delimiter: char, has_header: bool) -> ImportResult<Self> {
        if !delimiter.is_ascii() {
            return Err(ImportError::CsvParseError(format!(
                "分隔符必须为 ASCII 字符: {:?}",
                delimiter
            )));
        }
        Ok(Self {
            delimiter: delimiter as u8,
            has_header,
        })
    }

    pub fn csv() -> Self {
        Self {
            delimiter: b',',
            has_header: true,
        }
    }

    /// 解析文件
    pub fn parse(&self, path: &Path) -> ImportResult<ParsedFile> {
        if !path.exists() {
            return Err(ImportError::FileNotFound(path.display().to_string()));
        }

        let file = File::open(path)?;
        let is_gzip = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.eq_ignore_ascii_case("gz"))
            .unwrap_or(false);

        let reader: Box<dyn Read> = if is_gzip {
            Box::new(GzDecoder::new(BufReader::new(file)))
        } else {
            Box::new(BufReader::new(file))
        };

        self.parse_reader(reader)
    }

    /// 从任意 Reader 解析
    pub fn parse_reader<R: Read>(&self, reader: R) -> ImportResult<ParsedFile> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(self.has_header)
            .flexible(true) // 允许行长度不一致
            .from_reader(reader);

        let headers = if self.has_header {
            Some(
                reader
                    .headers()?
                    .iter()
                    .map(|h| h.trim().to_string())
                    .collect(),
            )
        } else {
            None
        };

        let mut rows = Vec::new();
        for (idx, result) in reader.records().enumerate() {
            let record = result?;
            let fields: Vec<String> = record.iter().map(|v| v.trim().to_string()).collect();

            // 跳过完全空白的行
            if fields.iter().all(|v| v.is_empty()) {
                continue;
            }

            rows.push(RawRow {
                row: idx + 1,
                fields,
            });
        }

        Ok(ParsedFile { headers, rows })
    }
}
