// ==========================================
// 外贸统计导入管道 - 持久化层
// ==========================================
// 职责: 规范表写出（CSV / SQLite）、数据字典、运行摘要
// 红线: 整表替换，不含业务规则
// ==========================================

pub mod data_dictionary;
pub mod publisher;
pub mod run_summary;
pub mod sqlite_store;
pub mod table_writer;

// 重导出
pub use data_dictionary::{render_data_dictionary, write_data_dictionary, DATA_DICTIONARY_FILE};
pub use publisher::{publish_outputs, PublishOptions};
pub use run_summary::{RunSummary, TableCount, RUN_SUMMARY_FILE};
pub use sqlite_store::SqliteTableStore;
pub use table_writer::{CsvTableWriter, TableWriter};
