// ==========================================
// 外贸统计导入管道 - 行业维度构建
// ==========================================
// 源: 行业分类工作簿（关键字 "sector"）
// 规则: 章节单元格按 ',' 拆分并逐个展开；每个两位章节一行；整行去重
// ==========================================

use crate::domain::diagnostics::{Diagnostics, WarningKind};
use crate::domain::table::Table;
use crate::domain::trade::{SectorRow, SECTOR_DIMENSION_SCHEMA};
use crate::importer::builders::SourceContext;
use crate::importer::chapter_expander::try_expand_chapter_token;
use crate::importer::data_cleaner::normalize_cell_value;
use crate::importer::discovery::find_by_keyword;
use crate::importer::error::EtlResult;
use crate::importer::field_mapper::{ColumnIndex, CHAPTER, SECTION, SECTOR};
use crate::importer::file_parser::{open_workbook, SheetTable, Workbook};
use crate::importer::header_detector::locate_table;
use crate::importer::row_filter::dedupe_by_key;
use crate::importer::safe_build::missing_columns;
use tracing::info;

/// 发现并构建行业维度
pub fn build_sector_dimension(
    ctx: SourceContext<'_>,
    keyword: &str,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<SectorRow>> {
    let path = find_by_keyword(ctx.raw_dir, keyword)?;
    info!(file = %path.display(), "读取行业分类表");
    let workbook = open_workbook(&path)?;
    sector_dimension_from_workbook(&workbook, ctx.header_search_rows, diagnostics)
}

/// 由已读入的工作簿构建行业维度
pub fn sector_dimension_from_workbook(
    workbook: &Workbook,
    header_search_rows: usize,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<SectorRow>> {
    let table_name = SECTOR_DIMENSION_SCHEMA.name;
    let (_, sheet) = locate_table(workbook, &[CHAPTER], header_search_rows)?;
    let index = ColumnIndex::new(&sheet.headers);

    let columns = index
        .resolve_required(&[CHAPTER, SECTION, SECTOR])
        .map_err(|missing| missing_columns(table_name, &workbook.file_name(), missing))?;
    let (chapter_col, section_col, sector_col) = (columns[0], columns[1], columns[2]);

    let mut rows = Vec::new();
    let mut invalid_tokens = 0usize;
    for row in &sheet.rows {
        let section = normalize_cell_value(SheetTable::cell(row, section_col));
        let sector_industry = normalize_cell_value(SheetTable::cell(row, sector_col));
        let chapters = SheetTable::cell(row, chapter_col).as_text();

        for token in chapters.split(',') {
            match try_expand_chapter_token(token) {
                Ok(codes) => rows.extend(codes.into_iter().map(|code2| SectorRow {
                    code2,
                    section: section.clone(),
                    sector_industry: sector_industry.clone(),
                })),
                Err(e) => {
                    invalid_tokens += 1;
                    diagnostics.warn(
                        table_name,
                        WarningKind::InvalidChapterToken,
                        format!("章节标记已跳过 (行业 '{}'): {}", sector_industry, e),
                    );
                }
            }
        }
    }

    let (rows, duplicates) = dedupe_by_key(rows, Clone::clone);

    info!(
        table = table_name,
        rows = rows.len(),
        invalid_tokens = invalid_tokens,
        duplicates = duplicates,
        "行业维度构建完成"
    );
    Ok(Table::new(&SECTOR_DIMENSION_SCHEMA, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::EtlError;
    use crate::importer::file_parser::{Cell, Sheet};
    use std::path::PathBuf;

    fn row(values: &[&str]) -> Vec<Cell> {
        values.iter().map(|v| Cell::Text(v.to_string())).collect()
    }

    fn workbook(rows: Vec<Vec<Cell>>) -> Workbook {
        Workbook {
            path: PathBuf::from("SECTORES.xlsx"),
            sheets: vec![Sheet {
                name: "Hoja1".to_string(),
                rows,
            }],
        }
    }

    #[test]
    fn test_expand_ranges_and_lists() {
        let wb = workbook(vec![
            row(&["sección", "capítulos", "sector"]),
            row(&["II", "01-05", "Agro"]),
            row(&["III", "06, 07,08", "Alimentos"]),
        ]);
        let mut diag = Diagnostics::new();

        let table = sector_dimension_from_workbook(&wb, 40, &mut diag).unwrap();

        let codes: Vec<_> = table.rows.iter().map(|r| r.code2.as_str()).collect();
        assert_eq!(codes, vec!["01", "02", "03", "04", "05", "06", "07", "08"]);
        assert_eq!(table.rows[5].sector_industry, "Alimentos");
        assert!(diag.is_empty());
    }

    #[test]
    fn test_invalid_tokens_skipped_not_fatal() {
        let wb = workbook(vec![
            row(&["Sección", "Capítulos", "Sector"]),
            row(&["I", "05-01,xx,9", "Mixto"]),
        ]);
        let mut diag = Diagnostics::new();

        let table = sector_dimension_from_workbook(&wb, 40, &mut diag).unwrap();

        assert_eq!(table.len(), 1);
        assert_eq!(table.rows[0].code2, "09");
        assert_eq!(diag.count_kind(WarningKind::InvalidChapterToken), 2);
    }

    #[test]
    fn test_duplicate_triples_removed() {
        let wb = workbook(vec![
            row(&["seccion", "capitulos", "sector"]),
            row(&["II", "01-02", "Agro"]),
            row(&["II", "02", "Agro"]),
            row(&["II", "02", "Pesca"]),
        ]);
        let mut diag = Diagnostics::new();

        let table = sector_dimension_from_workbook(&wb, 40, &mut diag).unwrap();

        // (02, II, Agro) 去重，(02, II, Pesca) 保留
        assert_eq!(table.len(), 3);
    }

    #[test]
    fn test_missing_sector_column() {
        let wb = workbook(vec![row(&["seccion", "capitulos"]), row(&["II", "01"])]);
        let mut diag = Diagnostics::new();

        let result = sector_dimension_from_workbook(&wb, 40, &mut diag);
        match result {
            Err(EtlError::MissingRequiredColumn { fields, .. }) => {
                assert_eq!(fields, vec!["sector".to_string()])
            }
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
    }
}
