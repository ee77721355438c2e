// ==========================================
// 外贸统计导入管道 - 规范表写出
// ==========================================
// 职责: 规范表 → <processed_dir>/<table>.csv
// 红线: 整表替换（先写临时文件，再重命名覆盖），不做追加
// ==========================================

use crate::domain::table::TableView;
use crate::importer::error::{EtlError, EtlResult};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

// ==========================================
// TableWriter Trait
// ==========================================
// 实现者: CsvTableWriter（文件）、SqliteTableStore（嵌入式库）
pub trait TableWriter {
    /// 用 table 的全部行替换目标中的同名表
    fn write_table(&mut self, table: &dyn TableView) -> EtlResult<()>;

    /// 按顺序写出多张表
    fn write_all(&mut self, tables: &[&dyn TableView]) -> EtlResult<()> {
        for table in tables {
            self.write_table(*table)?;
        }
        Ok(())
    }
}

// ==========================================
// CsvTableWriter - CSV 文件写出
// ==========================================
#[derive(Debug, Clone)]
pub struct CsvTableWriter {
    dir: PathBuf,
}

impl CsvTableWriter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 表对应的 CSV 文件路径
    pub fn table_path(&self, table_name: &str) -> PathBuf {
        self.dir.join(format!("{}.csv", table_name))
    }

    fn write_to(&self, path: &Path, table: &dyn TableView) -> EtlResult<()> {
        let name = table.schema().name;
        let write_err = |e: csv::Error| EtlError::TableWriteError {
            table: name.to_string(),
            message: e.to_string(),
        };

        let mut writer = csv::Writer::from_path(path).map_err(write_err)?;
        writer
            .write_record(table.schema().column_names())
            .map_err(write_err)?;
        for values in table.row_values() {
            let record: Vec<String> = values.iter().map(|v| v.to_csv_string()).collect();
            writer.write_record(&record).map_err(write_err)?;
        }
        writer.flush().map_err(|e| EtlError::TableWriteError {
            table: name.to_string(),
            message: e.to_string(),
        })?;
        Ok(())
    }
}

impl TableWriter for CsvTableWriter {
    fn write_table(&mut self, table: &dyn TableView) -> EtlResult<()> {
        let name = table.schema().name;
        fs::create_dir_all(&self.dir)?;

        let target = self.table_path(name);
        let tmp = self.dir.join(format!(".{}.csv.tmp", name));

        if let Err(e) = self.write_to(&tmp, table) {
            let _ = fs::remove_file(&tmp);
            return Err(e);
        }
        fs::rename(&tmp, &target)?;

        info!(table = name, rows = table.row_count(), path = %target.display(), "CSV 写出完成");
        Ok(())
    }
}
