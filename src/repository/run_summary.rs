// ==========================================
// 外贸统计导入管道 - 运行摘要
// ==========================================
// 输出: <processed_dir>/etl_run.json
// 内容: 运行 ID、起止时间、各表行数、构建告警、交叉校验结果
// ==========================================

use crate::domain::diagnostics::EtlWarning;
use crate::importer::dq_validator::ValidationWarning;
use crate::importer::error::{EtlError, EtlResult};
use crate::importer::pipeline::PipelineOutput;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

pub const RUN_SUMMARY_FILE: &str = "etl_run.json";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableCount {
    pub table: String,
    pub rows: usize,
}

// ==========================================
// RunSummary - 单次运行摘要
// ==========================================
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub raw_dir: String,
    pub tables: Vec<TableCount>,
    pub warnings: Vec<EtlWarning>,
    pub validation: Vec<ValidationWarning>,
    /// 已写出的产物路径
    pub outputs: Vec<String>,
}

impl RunSummary {
    /// 开始一次运行
    pub fn start(raw_dir: &Path) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: Utc::now(),
            finished_at: None,
            raw_dir: raw_dir.display().to_string(),
            tables: Vec::new(),
            warnings: Vec::new(),
            validation: Vec::new(),
            outputs: Vec::new(),
        }
    }

    /// 记录管道产出（行数、告警、校验结果）
    pub fn with_output(mut self, output: &PipelineOutput) -> Self {
        self.tables = output
            .tables
            .row_counts()
            .into_iter()
            .map(|(table, rows)| TableCount {
                table: table.to_string(),
                rows,
            })
            .collect();
        self.warnings = output.diagnostics.warnings().to_vec();
        self.validation = output.validation.clone();
        self
    }

    pub fn record_output(&mut self, path: &Path) {
        self.outputs.push(path.display().to_string());
    }

    pub fn finish(&mut self) {
        self.finished_at = Some(Utc::now());
    }

    pub fn total_rows(&self) -> usize {
        self.tables.iter().map(|t| t.rows).sum()
    }

    /// 写出 JSON 摘要
    pub fn write_json(&self, dir: &Path) -> EtlResult<PathBuf> {
        fs::create_dir_all(dir)?;
        let path = dir.join(RUN_SUMMARY_FILE);
        let json = serde_json::to_string_pretty(self).map_err(|e| EtlError::TableWriteError {
            table: RUN_SUMMARY_FILE.to_string(),
            message: e.to_string(),
        })?;
        fs::write(&path, json)?;
        info!(run_id = %self.run_id, path = %path.display(), "运行摘要已写出");
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::diagnostics::{Diagnostics, WarningKind};
    use crate::domain::table::Table;
    use crate::domain::trade::{
        EXPORT_FACT_SCHEMA, IMPORT_FACT_SCHEMA, PRODUCT_DIMENSION_SCHEMA, SECTOR_DIMENSION_SCHEMA,
        TRADEMAP_FACT_SCHEMA,
    };
    use crate::importer::pipeline::PipelineTables;
    use tempfile::TempDir;

    fn empty_output() -> PipelineOutput {
        let mut diagnostics = Diagnostics::new();
        diagnostics.warn("fact_exports", WarningKind::SourceNotFound, "sin archivos");
        PipelineOutput {
            tables: PipelineTables {
                products: Table::empty(&PRODUCT_DIMENSION_SCHEMA),
                sectors: Table::empty(&SECTOR_DIMENSION_SCHEMA),
                exports: Table::empty(&EXPORT_FACT_SCHEMA),
                imports: Table::empty(&IMPORT_FACT_SCHEMA),
                trademap: Table::empty(&TRADEMAP_FACT_SCHEMA),
            },
            diagnostics,
            validation: Vec::new(),
        }
    }

    #[test]
    fn test_summary_records_tables_in_order() {
        let summary = RunSummary::start(Path::new("/raw")).with_output(&empty_output());

        let names: Vec<_> = summary.tables.iter().map(|t| t.table.as_str()).collect();
        assert_eq!(
            names,
            vec!["dim_product", "dim_sector", "fact_exports", "fact_imports", "fact_trademap"]
        );
        assert_eq!(summary.total_rows(), 0);
        assert_eq!(summary.warnings.len(), 1);
        assert!(summary.finished_at.is_none());
    }

    #[test]
    fn test_write_json_round_trips() {
        let dir = TempDir::new().unwrap();
        let mut summary = RunSummary::start(dir.path()).with_output(&empty_output());
        summary.finish();

        let path = summary.write_json(dir.path()).unwrap();
        let parsed: RunSummary = serde_json::from_str(&fs::read_to_string(path).unwrap()).unwrap();

        assert_eq!(parsed.run_id, summary.run_id);
        assert!(parsed.finished_at.is_some());
        assert_eq!(parsed.warnings[0].kind, WarningKind::SourceNotFound);
    }
}
