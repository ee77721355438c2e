// ==========================================
// 外贸统计导入管道 - 领域模型层
// ==========================================
// 职责: 规范表结构、行类型、诊断告警
// 红线: 不含文件读取逻辑，不含落库逻辑
// ==========================================

pub mod diagnostics;
pub mod table;
pub mod trade;
pub mod types;

// 重导出核心类型
pub use diagnostics::{Diagnostics, EtlWarning, WarningKind};
pub use table::{ColumnDef, ColumnType, FieldValue, Table, TableRow, TableSchema, TableView};
pub use trade::{
    trade_fact_schema, CodePrefixes, ProductRow, SectorRow, TradeFactRow, TradeMapRow,
    EXPORT_FACT_SCHEMA, IMPORT_FACT_SCHEMA, PRODUCT_DIMENSION_SCHEMA, SECTOR_DIMENSION_SCHEMA,
    TRADEMAP_FACT_SCHEMA,
};
pub use types::{TradeDirection, PRODUCT_CODE_LEN};
