// ==========================================
// 外贸统计导入管道 - 产品维度构建
// ==========================================
// 源: 产品编码字典工作簿（关键字 "diccionario"）
// 规则: 编码非法行丢弃；code10 重复保留首次出现
// ==========================================

use crate::domain::diagnostics::{Diagnostics, WarningKind};
use crate::domain::table::Table;
use crate::domain::trade::{CodePrefixes, ProductRow, PRODUCT_DIMENSION_SCHEMA};
use crate::domain::types::PRODUCT_CODE_LEN;
use crate::importer::builders::SourceContext;
use crate::importer::data_cleaner::{normalize_cell_value, parse_code};
use crate::importer::discovery::find_by_keyword;
use crate::importer::error::EtlResult;
use crate::importer::field_mapper::{ColumnIndex, DESCRIPTION, ELEMENT_TYPE, PRODUCT_CODE};
use crate::importer::file_parser::{open_workbook, SheetTable, Workbook};
use crate::importer::header_detector::locate_table;
use crate::importer::row_filter::{apply_filters, dedupe_by_key, RowFilter};
use crate::importer::safe_build::missing_columns;
use tracing::info;

struct StagedProduct {
    code: Option<String>,
    description: String,
    element_type: String,
}

fn has_valid_code(row: &StagedProduct) -> bool {
    row.code.is_some()
}

const PRODUCT_FILTERS: [RowFilter<StagedProduct>; 1] =
    [RowFilter::new("invalid_code", has_valid_code)];

/// 发现并构建产品维度
pub fn build_product_dimension(
    ctx: SourceContext<'_>,
    keyword: &str,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<ProductRow>> {
    let path = find_by_keyword(ctx.raw_dir, keyword)?;
    info!(file = %path.display(), "读取产品编码字典");
    let workbook = open_workbook(&path)?;
    product_dimension_from_workbook(&workbook, ctx.header_search_rows, diagnostics)
}

/// 由已读入的工作簿构建产品维度
pub fn product_dimension_from_workbook(
    workbook: &Workbook,
    header_search_rows: usize,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<ProductRow>> {
    let table_name = PRODUCT_DIMENSION_SCHEMA.name;
    let (_, sheet) = locate_table(workbook, &[PRODUCT_CODE], header_search_rows)?;
    let index = ColumnIndex::new(&sheet.headers);

    let code_col = index.resolve(&PRODUCT_CODE).ok_or_else(|| {
        missing_columns(
            table_name,
            &workbook.file_name(),
            vec![PRODUCT_CODE.field.to_string()],
        )
    })?;
    let desc_col = index.resolve(&DESCRIPTION);
    let type_col = index.resolve(&ELEMENT_TYPE);

    let missing_optional: Vec<&str> = [(DESCRIPTION.field, desc_col), (ELEMENT_TYPE.field, type_col)]
        .iter()
        .filter(|(_, col)| col.is_none())
        .map(|(field, _)| *field)
        .collect();
    if !missing_optional.is_empty() {
        diagnostics.warn(
            table_name,
            WarningKind::MissingOptionalColumn,
            format!("可选列缺失，以空值填充: {}", missing_optional.join(", ")),
        );
    }

    let staged: Vec<StagedProduct> = sheet
        .rows
        .iter()
        .map(|row| StagedProduct {
            code: parse_code(&SheetTable::cell(row, code_col).as_text(), PRODUCT_CODE_LEN),
            description: normalize_cell_value(SheetTable::opt_cell(row, desc_col)),
            element_type: normalize_cell_value(SheetTable::opt_cell(row, type_col)),
        })
        .collect();
    let total = staged.len();

    let (valid, outcome) = apply_filters(staged, &PRODUCT_FILTERS);
    let invalid = outcome.dropped_by("invalid_code");
    if invalid > 0 {
        diagnostics.warn(
            table_name,
            WarningKind::InvalidCode,
            format!("{} 行产品编码非法，已丢弃", invalid),
        );
    }

    let rows: Vec<ProductRow> = valid
        .into_iter()
        .filter_map(|staged| {
            staged.code.map(|code| ProductRow {
                codes: CodePrefixes::from_code10(&code),
                description: staged.description,
                element_type: staged.element_type,
            })
        })
        .collect();

    let (rows, duplicates) = dedupe_by_key(rows, |r| r.codes.code10.clone());
    if duplicates > 0 {
        diagnostics.warn(
            table_name,
            WarningKind::RowsDropped,
            format!("{} 行产品编码重复，保留首次出现", duplicates),
        );
    }

    info!(
        table = table_name,
        source_rows = total,
        rows = rows.len(),
        invalid = invalid,
        duplicates = duplicates,
        "产品维度构建完成"
    );
    Ok(Table::new(&PRODUCT_DIMENSION_SCHEMA, rows))
}
