// ==========================================
// 外贸统计导入管道 - 表头/工作表检测
// ==========================================
// 职责: 在布局不固定的工作簿中定位表头所在的工作表与行号
// 说明: 容忍表头之前的标题行/元数据行
// ==========================================

use crate::importer::data_cleaner::normalize_column_name;
use crate::importer::error::{EtlError, EtlResult};
use crate::importer::field_mapper::FieldAliases;
use crate::importer::file_parser::{Cell, Sheet, SheetTable, Workbook};
use std::collections::HashSet;
use tracing::debug;

/// 默认表头扫描行数上限
pub const DEFAULT_HEADER_SEARCH_ROWS: usize = 40;

/// 表头定位结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLocation {
    pub sheet_index: usize,
    pub header_row: usize,
}

fn normalized_row(row: &[Cell]) -> HashSet<String> {
    row.iter()
        .map(|c| normalize_column_name(&c.as_text()))
        .collect()
}

fn normalize_groups(groups: &[&[&str]]) -> Vec<Vec<String>> {
    groups
        .iter()
        .map(|aliases| aliases.iter().map(|a| normalize_column_name(a)).collect())
        .collect()
}

/// 每个别名组至少有一个别名出现在行中
fn satisfies(row_values: &HashSet<String>, groups: &[Vec<String>]) -> bool {
    groups
        .iter()
        .all(|aliases| aliases.iter().any(|a| row_values.contains(a)))
}

/// 别名组形式的表头检测
///
/// # 返回
/// - 前 search_rows 行中首个满足全部别名组的行号
/// - 均不满足时返回 0（假定首行为表头）
pub fn detect_header_row_with_aliases(
    rows: &[Vec<Cell>],
    groups: &[&[&str]],
    search_rows: usize,
) -> usize {
    let normalized = normalize_groups(groups);
    rows.iter()
        .take(search_rows)
        .position(|row| satisfies(&normalized_row(row), &normalized))
        .unwrap_or(0)
}

/// 表头检测：首个规范化取值集合 ⊇ 必需列集合的行
pub fn detect_header_row(rows: &[Vec<Cell>], required_columns: &[&str], search_rows: usize) -> usize {
    let groups: Vec<&[&str]> = required_columns.iter().map(std::slice::from_ref).collect();
    detect_header_row_with_aliases(rows, &groups, search_rows)
}

fn sheet_qualifies(sheet: &Sheet, header_row: usize, groups: &[Vec<String>]) -> bool {
    // 按检测出的偏移重新取表头，再次确认列集合
    let table_header = SheetTable::from_sheet(sheet, header_row).headers;
    let header_values: HashSet<String> = table_header
        .iter()
        .map(|h| normalize_column_name(h))
        .collect();
    satisfies(&header_values, groups)
}

/// 别名组形式的工作表定位
///
/// # 返回
/// - Ok(location): 首个满足条件的 (工作表, 表头行)
/// - Ok((0, 0)): 工作簿非空但无工作表满足
/// - Err(NoSheets): 工作簿为空
pub fn first_sheet_with_aliases(
    workbook: &Workbook,
    groups: &[&[&str]],
    search_rows: usize,
) -> EtlResult<HeaderLocation> {
    if workbook.is_empty() {
        return Err(EtlError::NoSheets(workbook.path.clone()));
    }

    let normalized = normalize_groups(groups);
    for (sheet_index, sheet) in workbook.sheets.iter().enumerate() {
        let header_row = detect_header_row_with_aliases(&sheet.rows, groups, search_rows);
        if sheet_qualifies(sheet, header_row, &normalized) {
            debug!(
                file = %workbook.path.display(),
                sheet = %sheet.name,
                header_row = header_row,
                "表头定位成功"
            );
            return Ok(HeaderLocation {
                sheet_index,
                header_row,
            });
        }
    }

    debug!(file = %workbook.path.display(), "未找到满足条件的工作表，回退到首个工作表首行");
    Ok(HeaderLocation {
        sheet_index: 0,
        header_row: 0,
    })
}

/// 工作表定位（必需列为字面列名）
pub fn first_sheet_with_headers(
    workbook: &Workbook,
    required_columns: &[&str],
    search_rows: usize,
) -> EtlResult<HeaderLocation> {
    let groups: Vec<&[&str]> = required_columns.iter().map(std::slice::from_ref).collect();
    first_sheet_with_aliases(workbook, &groups, search_rows)
}

/// 以语义字段定位工作表，并读出对应的二维表
pub fn locate_table(
    workbook: &Workbook,
    fields: &[FieldAliases],
    search_rows: usize,
) -> EtlResult<(HeaderLocation, SheetTable)> {
    let groups: Vec<&[&str]> = fields.iter().map(|f| f.aliases).collect();
    let location = first_sheet_with_aliases(workbook, &groups, search_rows)?;
    let table = SheetTable::from_sheet(&workbook.sheets[location.sheet_index], location.header_row);
    Ok((location, table))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::field_mapper::{PERIOD, PRODUCT_CODE};
    use std::path::PathBuf;

    fn text_row(values: &[&str]) -> Vec<Cell> {
        values
            .iter()
            .map(|v| {
                if v.is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(v.to_string())
                }
            })
            .collect()
    }

    fn sheet(name: &str, rows: Vec<Vec<Cell>>) -> Sheet {
        Sheet {
            name: name.to_string(),
            rows,
        }
    }

    #[test]
    fn test_detect_header_after_metadata_rows() {
        let rows = vec![
            text_row(&["metadata"]),
            text_row(&["otra fila"]),
            text_row(&["Periodo", "Código Subpartida 10", "FOB"]),
            text_row(&["2024 / 01 - Enero", "0803901100", "1200"]),
        ];
        assert_eq!(
            detect_header_row(&rows, &["periodo", "Codigo_Subpartida_10"], 40),
            2
        );
    }

    #[test]
    fn test_detect_header_defaults_to_zero() {
        let rows = vec![text_row(&["a", "b"]), text_row(&["1", "2"])];
        assert_eq!(detect_header_row(&rows, &["periodo"], 40), 0);
    }

    #[test]
    fn test_detect_header_respects_search_limit() {
        let mut rows: Vec<Vec<Cell>> = (0..5).map(|_| text_row(&["x"])).collect();
        rows.push(text_row(&["Periodo"]));
        assert_eq!(detect_header_row(&rows, &["periodo"], 5), 0);
        assert_eq!(detect_header_row(&rows, &["periodo"], 6), 5);
    }

    #[test]
    fn test_first_sheet_with_headers_skips_unrelated_sheet() {
        let workbook = Workbook {
            path: PathBuf::from("trademap.xlsx"),
            sheets: vec![
                sheet("Lookup", vec![text_row(&["capitulo"]), text_row(&["08"])]),
                sheet(
                    "Panel",
                    vec![
                        text_row(&["Trade Map"]),
                        text_row(&["producto", "pais", "year", "value"]),
                    ],
                ),
            ],
        };

        let location =
            first_sheet_with_headers(&workbook, &["producto", "pais", "year", "value"], 40).unwrap();
        assert_eq!(
            location,
            HeaderLocation {
                sheet_index: 1,
                header_row: 1
            }
        );
    }

    #[test]
    fn test_first_sheet_fallback_and_empty_workbook() {
        let workbook = Workbook {
            path: PathBuf::from("x.xlsx"),
            sheets: vec![sheet("S", vec![text_row(&["a"])])],
        };
        let location = first_sheet_with_headers(&workbook, &["periodo"], 40).unwrap();
        assert_eq!(location.sheet_index, 0);
        assert_eq!(location.header_row, 0);

        let empty = Workbook {
            path: PathBuf::from("y.xlsx"),
            sheets: vec![],
        };
        assert!(matches!(
            first_sheet_with_headers(&empty, &["periodo"], 40),
            Err(EtlError::NoSheets(_))
        ));
    }

    #[test]
    fn test_locate_table_with_alias_groups() {
        let workbook = Workbook {
            path: PathBuf::from("exportaciones.xlsx"),
            sheets: vec![sheet(
                "Columnas",
                vec![
                    text_row(&["metadata"]),
                    text_row(&["Período", "HS10"]),
                    text_row(&["2024-7", "803901100"]),
                ],
            )],
        };

        let (location, table) = locate_table(&workbook, &[PERIOD, PRODUCT_CODE], 40).unwrap();
        assert_eq!(location.header_row, 1);
        assert_eq!(table.headers, vec!["Período", "HS10"]);
        assert_eq!(table.rows.len(), 1);
    }
}
