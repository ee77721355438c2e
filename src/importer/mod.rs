// ==========================================
// 外贸统计导入管道 - 导入层
// ==========================================
// 职责: 原始工作簿 → 五张规范表
// 支持: xlsx / xlsm / xls / xlsb / ods / csv
// ==========================================

// 模块声明
pub mod builders;
pub mod chapter_expander;
pub mod data_cleaner;
pub mod discovery;
pub mod dq_validator;
pub mod error;
pub mod field_mapper;
pub mod file_parser;
pub mod header_detector;
pub mod period_parser;
pub mod pipeline;
pub mod row_filter;
pub mod safe_build;

// 重导出核心类型
pub use chapter_expander::{expand_chapter_token, try_expand_chapter_token};
pub use data_cleaner::{
    as_code, clean_text, coerce_f64, coerce_i32, is_valid_code, normalize_column_name,
    normalize_text_value, parse_code,
};
pub use discovery::{find_by_keyword, find_trade_files};
pub use dq_validator::{validate_tables, TableValidator, ValidationCheck, ValidationWarning};
pub use error::{EtlError, EtlResult};
pub use field_mapper::{resolve_column, ColumnIndex, FieldAliases};
pub use file_parser::{open_workbook, Cell, Sheet, SheetTable, Workbook};
pub use header_detector::{
    detect_header_row, first_sheet_with_headers, locate_table, HeaderLocation,
    DEFAULT_HEADER_SEARCH_ROWS,
};
pub use period_parser::{parse_period, try_parse_period};
pub use pipeline::{Pipeline, PipelineOutput, PipelineTables};
pub use row_filter::{apply_filters, dedupe_by_key, FilterOutcome, RowFilter};
pub use safe_build::{safe_build, safe_build_with_policy, SourcePolicy};
