// ==========================================
// 外贸统计导入管道 - 产物发布
// ==========================================
// 流程: CSV 写出 → SQLite 物化（可跳过）→ 数据字典 → 运行摘要
// ==========================================

use crate::config::EtlConfig;
use crate::importer::error::EtlResult;
use crate::importer::pipeline::PipelineOutput;
use crate::repository::data_dictionary::write_data_dictionary;
use crate::repository::run_summary::RunSummary;
use crate::repository::sqlite_store::SqliteTableStore;
use crate::repository::table_writer::{CsvTableWriter, TableWriter};
use tracing::{info, instrument};

/// 发布选项
#[derive(Debug, Clone, Copy, Default)]
pub struct PublishOptions {
    pub skip_sqlite: bool,
}

/// 将一次管道产出写出到处理目录与嵌入式库
#[instrument(skip_all, fields(processed_dir = %config.processed_dir.display()))]
pub fn publish_outputs(
    config: &EtlConfig,
    output: &PipelineOutput,
    mut summary: RunSummary,
    options: PublishOptions,
) -> EtlResult<RunSummary> {
    let views = output.tables.views();

    let mut csv_writer = CsvTableWriter::new(&config.processed_dir);
    csv_writer.write_all(&views)?;
    for view in &views {
        summary.record_output(&csv_writer.table_path(view.schema().name));
    }

    if options.skip_sqlite {
        info!("已跳过 SQLite 物化");
    } else {
        let mut store = SqliteTableStore::open(&config.sqlite_path)?;
        store.write_all(&views)?;
        summary.record_output(&config.sqlite_path);
    }

    let dictionary = write_data_dictionary(&config.processed_dir, &views)?;
    summary.record_output(&dictionary);

    summary.finish();
    summary.write_json(&config.processed_dir)?;
    Ok(summary)
}
