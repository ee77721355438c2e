// ==========================================
// 外贸统计导入管道 - 数据字典生成
// ==========================================
// 输出: <dir>/data_dictionary.md，每张表一节，列出列名与类型
// ==========================================

use crate::domain::table::TableView;
use crate::importer::error::EtlResult;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

pub const DATA_DICTIONARY_FILE: &str = "data_dictionary.md";

/// 渲染数据字典（按表名排序）
pub fn render_data_dictionary(tables: &[&dyn TableView]) -> String {
    let mut sorted: Vec<&dyn TableView> = tables.to_vec();
    sorted.sort_by_key(|t| t.schema().name);

    let mut out = String::from("# Data Dictionary\n");
    for table in sorted {
        let schema = table.schema();
        let _ = writeln!(out, "\n## {}\n", schema.name);
        let _ = writeln!(out, "Rows: {}\n", table.row_count());
        for column in schema.columns {
            let _ = writeln!(out, "- `{}`: `{}`", column.name, column.column_type);
        }
    }
    out
}

/// 写出数据字典文件
pub fn write_data_dictionary(dir: &Path, tables: &[&dyn TableView]) -> EtlResult<PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(DATA_DICTIONARY_FILE);
    fs::write(&path, render_data_dictionary(tables))?;
    info!(path = %path.display(), tables = tables.len(), "数据字典已生成");
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::table::Table;
    use crate::domain::trade::{SectorRow, TradeMapRow, SECTOR_DIMENSION_SCHEMA, TRADEMAP_FACT_SCHEMA};
    use tempfile::TempDir;

    #[test]
    fn test_render_sorted_with_types() {
        let trademap: Table<TradeMapRow> = Table::empty(&TRADEMAP_FACT_SCHEMA);
        let sectors: Table<SectorRow> = Table::empty(&SECTOR_DIMENSION_SCHEMA);

        let views: [&dyn TableView; 2] = [&trademap, &sectors];
        let md = render_data_dictionary(&views);

        let sector_pos = md.find("## dim_sector").unwrap();
        let trademap_pos = md.find("## fact_trademap").unwrap();
        assert!(sector_pos < trademap_pos);
        assert!(md.contains("- `year`: `INTEGER`"));
        assert!(md.contains("- `value`: `REAL`"));
        assert!(md.contains("- `code2`: `TEXT`"));
    }

    #[test]
    fn test_write_creates_file() {
        let dir = TempDir::new().unwrap();
        let sectors: Table<SectorRow> = Table::empty(&SECTOR_DIMENSION_SCHEMA);

        let views: [&dyn TableView; 1] = [&sectors];
        let path = write_data_dictionary(dir.path(), &views).unwrap();

        assert!(path.ends_with(DATA_DICTIONARY_FILE));
        assert!(fs::read_to_string(path).unwrap().starts_with("# Data Dictionary"));
    }
}
