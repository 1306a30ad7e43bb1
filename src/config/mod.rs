// ==========================================
// 酒吧库存分析 - 配置层
// ==========================================
// 职责: 流水线配置加载、环境变量覆写、校验
// ==========================================

pub mod error;
pub mod pipeline_config;

pub use error::{ConfigError, ConfigResult};
pub use pipeline_config::{PipelineConfig, SalesSourceConfig, DB_PATH_ENV};
