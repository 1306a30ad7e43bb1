// ==========================================
// 酒吧库存分析 - 配置错误类型
// ==========================================

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件读取失败 ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("配置文件格式错误 ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("配置校验失败 (key: {key}): {message}")]
    ValidationError { key: String, message: String },
}

pub type ConfigResult<T> = Result<T, ConfigError>;
