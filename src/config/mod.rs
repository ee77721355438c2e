// ==========================================
// 外贸统计导入管道 - 配置层
// ==========================================
// 职责: 运行配置加载，支持多级覆写
// 来源: 默认值 / JSON 文件 / 环境变量 (.env) / 命令行
// ==========================================

pub mod config_source;
pub mod etl_config;

pub use config_source::{ConfigSource, EnvConfigSource, MapConfigSource};
pub use etl_config::{config_keys, EtlConfig, SourceKeywords, ValidationThresholds};
