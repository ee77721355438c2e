// ==========================================
// 外贸统计导入管道 - Trade Map 面板构建
// ==========================================
// 源: Trade Map 导出工作簿（关键字 "trademap"）
// 规则: 四列全部必需；年份/数值无法转换时记为 0
// ==========================================

use crate::domain::diagnostics::{Diagnostics, WarningKind};
use crate::domain::table::Table;
use crate::domain::trade::{TradeMapRow, TRADEMAP_FACT_SCHEMA};
use crate::importer::builders::SourceContext;
use crate::importer::data_cleaner::{coerce_f64, coerce_i32, normalize_cell_value};
use crate::importer::discovery::find_by_keyword;
use crate::importer::error::EtlResult;
use crate::importer::field_mapper::{
    ColumnIndex, FieldAliases, TRADEMAP_COUNTRY, TRADEMAP_PRODUCT, TRADEMAP_VALUE, TRADEMAP_YEAR,
};
use crate::importer::file_parser::{open_workbook, SheetTable, Workbook};
use crate::importer::header_detector::locate_table;
use crate::importer::safe_build::missing_columns;
use tracing::info;

const TRADEMAP_FIELDS: [FieldAliases; 4] =
    [TRADEMAP_PRODUCT, TRADEMAP_COUNTRY, TRADEMAP_YEAR, TRADEMAP_VALUE];

/// 发现并构建 Trade Map 面板
pub fn build_trademap_facts(
    ctx: SourceContext<'_>,
    keyword: &str,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<TradeMapRow>> {
    let path = find_by_keyword(ctx.raw_dir, keyword)?;
    info!(file = %path.display(), "读取 Trade Map 面板");
    let workbook = open_workbook(&path)?;
    trademap_from_workbook(&workbook, ctx.header_search_rows, diagnostics)
}

/// 由已读入的工作簿构建 Trade Map 面板
pub fn trademap_from_workbook(
    workbook: &Workbook,
    header_search_rows: usize,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<TradeMapRow>> {
    let table_name = TRADEMAP_FACT_SCHEMA.name;
    let (_, sheet) = locate_table(workbook, &TRADEMAP_FIELDS, header_search_rows)?;
    let index = ColumnIndex::new(&sheet.headers);

    let columns = index
        .resolve_required(&TRADEMAP_FIELDS)
        .map_err(|missing| missing_columns(table_name, &workbook.file_name(), missing))?;
    let (product_col, country_col, year_col, value_col) =
        (columns[0], columns[1], columns[2], columns[3]);

    let mut coerced = 0usize;
    let rows: Vec<TradeMapRow> = sheet
        .rows
        .iter()
        .map(|row| {
            let year = coerce_i32(SheetTable::cell(row, year_col));
            let value = coerce_f64(SheetTable::cell(row, value_col));
            if year.is_none() || value.is_none() {
                coerced += 1;
            }
            TradeMapRow {
                product: normalize_cell_value(SheetTable::cell(row, product_col)),
                country: normalize_cell_value(SheetTable::cell(row, country_col)),
                year: year.unwrap_or(0),
                value: value.unwrap_or(0.0),
            }
        })
        .collect();

    if coerced > 0 {
        diagnostics.warn(
            table_name,
            WarningKind::UncoercibleValue,
            format!("{} 行年份或数值无法转换，记为 0", coerced),
        );
    }
    info!(table = table_name, rows = rows.len(), "Trade Map 面板构建完成");
    Ok(Table::new(&TRADEMAP_FACT_SCHEMA, rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::importer::error::EtlError;
    use crate::importer::file_parser::{Cell, Sheet};
    use std::path::PathBuf;

    fn workbook(rows: Vec<Vec<Cell>>) -> Workbook {
        Workbook {
            path: PathBuf::from("trademap_banano.xlsx"),
            sheets: vec![Sheet {
                name: "Panel".to_string(),
                rows,
            }],
        }
    }

    fn text(v: &str) -> Cell {
        Cell::Text(v.to_string())
    }

    #[test]
    fn test_trademap_rows_coerced() {
        let wb = workbook(vec![
            vec![text("Lista de los mercados importadores")],
            vec![text("Producto"), text("País"), text("Año"), text("Valor")],
            vec![text("080390"), text(" China "), Cell::Number(2023.0), Cell::Number(1500.5)],
            vec![text("080390"), text("Perú."), text("2022"), text("n/d")],
        ]);
        let mut diag = Diagnostics::new();

        let table = trademap_from_workbook(&wb, 40, &mut diag).unwrap();

        assert_eq!(table.len(), 2);
        assert_eq!(table.rows[0].country, "China");
        assert_eq!(table.rows[0].year, 2023);
        assert_eq!(table.rows[0].value, 1500.5);
        assert_eq!(table.rows[1].country, "Perú");
        assert_eq!(table.rows[1].value, 0.0);
        assert_eq!(diag.count_kind(WarningKind::UncoercibleValue), 1);
    }

    #[test]
    fn test_trademap_requires_all_columns() {
        let wb = workbook(vec![
            vec![text("producto"), text("pais"), text("anio")],
            vec![text("080390"), text("China"), text("2023")],
        ]);
        let mut diag = Diagnostics::new();

        let result = trademap_from_workbook(&wb, 40, &mut diag);
        match result {
            Err(EtlError::MissingRequiredColumn { fields, .. }) => {
                assert_eq!(fields, vec!["value".to_string()])
            }
            other => panic!("unexpected result: {:?}", other.map(|t| t.len())),
        }
    }
}
