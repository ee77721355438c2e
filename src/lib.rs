// ==========================================
// 外贸统计导入管道 - 核心库
// ==========================================
// 技术栈: Rust + calamine + csv + SQLite
// 系统定位: 不规则贸易统计工作簿 → 五张规范分析表
// ==========================================

// ==========================================
// 模块声明
// ==========================================

// 领域层 - 规范表与诊断
pub mod domain;

// 导入层 - 发现/读取/规范化/构建/校验
pub mod importer;

// 持久化层 - CSV / SQLite / 数据字典 / 运行摘要
pub mod repository;

// 配置层 - 运行配置
pub mod config;

// 数据库基础设施（连接初始化/PRAGMA 统一）
pub mod db;

// 日志系统
pub mod logging;

// ==========================================
// 重导出核心类型
// ==========================================

pub use config::{EtlConfig, SourceKeywords, ValidationThresholds};
pub use domain::{
    Diagnostics, EtlWarning, ProductRow, SectorRow, Table, TableView, TradeDirection,
    TradeFactRow, TradeMapRow, WarningKind,
};
pub use importer::{
    EtlError, EtlResult, Pipeline, PipelineOutput, PipelineTables, ValidationWarning,
};
pub use repository::{publish_outputs, PublishOptions, RunSummary};

// ==========================================
// 常量定义
// ==========================================

// 系统版本
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

// 系统名称
pub const APP_NAME: &str = "外贸统计导入管道";
