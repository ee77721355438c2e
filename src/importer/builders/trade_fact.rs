// ==========================================
// 外贸统计导入管道 - 进出口事实构建
// ==========================================
// 源: 目录下所有文件名含 "export" / "import" 的工作簿（递归）
// 规则: 每个文件独立处理，坏文件跳过；按发现顺序拼接
// 过滤顺序: 编码非法 → FOB 为负 → 净重为负 → CIF 为负（仅进口）
// ==========================================

use crate::domain::diagnostics::{Diagnostics, WarningKind};
use crate::domain::table::Table;
use crate::domain::trade::{trade_fact_schema, CodePrefixes, ProductRow, TradeFactRow};
use crate::domain::types::{TradeDirection, PRODUCT_CODE_LEN};
use crate::importer::builders::SourceContext;
use crate::importer::data_cleaner::{coerce_f64, normalize_cell_value, parse_code};
use crate::importer::discovery::find_trade_files;
use crate::importer::error::{EtlError, EtlResult};
use crate::importer::field_mapper::{
    counterpart_code, counterpart_name, ColumnIndex, CIF_VALUE, FOB_VALUE, NET_WEIGHT, PERIOD,
    PRODUCT_CODE,
};
use crate::importer::file_parser::{open_workbook, Cell, SheetTable, Workbook};
use crate::importer::header_detector::locate_table;
use crate::importer::period_parser::try_parse_period;
use crate::importer::row_filter::{apply_filters, RowFilter};
use crate::importer::safe_build::missing_columns;
use std::collections::HashMap;
use tracing::{info, instrument};

/// code10 → 产品描述
pub type DescriptionLookup<'a> = HashMap<&'a str, &'a str>;

/// 由产品维度建立描述查找表
pub fn description_lookup(products: &Table<ProductRow>) -> DescriptionLookup<'_> {
    products
        .rows
        .iter()
        .map(|p| (p.codes.code10.as_str(), p.description.as_str()))
        .collect()
}

struct StagedFact {
    code: Option<String>,
    period: Option<(i32, u32)>,
    period_raw: String,
    country_code: String,
    country_name: String,
    net_weight: f64,
    fob_value: f64,
    cif_value: Option<f64>,
}

fn has_valid_code(row: &StagedFact) -> bool {
    row.code.is_some()
}

fn non_negative_fob(row: &StagedFact) -> bool {
    row.fob_value >= 0.0
}

fn non_negative_net_weight(row: &StagedFact) -> bool {
    row.net_weight >= 0.0
}

fn non_negative_cif(row: &StagedFact) -> bool {
    row.cif_value.map_or(true, |cif| cif >= 0.0)
}

/// 数值单元格：缺列或非数值 → 0
fn numeric_cell(row: &[Cell], col: Option<usize>) -> f64 {
    coerce_f64(SheetTable::opt_cell(row, col)).unwrap_or(0.0)
}

const EXPORT_FILTERS: [RowFilter<StagedFact>; 3] = [
    RowFilter::new("invalid_code", has_valid_code),
    RowFilter::new("negative_fob", non_negative_fob),
    RowFilter::new("negative_net_weight", non_negative_net_weight),
];

const IMPORT_FILTERS: [RowFilter<StagedFact>; 4] = [
    RowFilter::new("invalid_code", has_valid_code),
    RowFilter::new("negative_fob", non_negative_fob),
    RowFilter::new("negative_net_weight", non_negative_net_weight),
    RowFilter::new("negative_cif", non_negative_cif),
];

fn filters_for(direction: TradeDirection) -> &'static [RowFilter<StagedFact>] {
    match direction {
        TradeDirection::Export => &EXPORT_FILTERS,
        TradeDirection::Import => &IMPORT_FILTERS,
    }
}

/// 发现并构建进口或出口事实表
///
/// 没有任何候选文件时返回空表并记录 SourceNotFound 告警
#[instrument(skip_all, fields(direction = %direction, keyword = keyword))]
pub fn build_trade_facts(
    ctx: SourceContext<'_>,
    direction: TradeDirection,
    keyword: &str,
    products: &Table<ProductRow>,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Table<TradeFactRow>> {
    let schema = trade_fact_schema(direction);
    let files = find_trade_files(ctx.raw_dir, keyword)?;

    if files.is_empty() {
        diagnostics.warn(
            schema.name,
            WarningKind::SourceNotFound,
            format!(
                "目录 {} 下没有文件名包含 '{}' 的工作簿",
                ctx.raw_dir.display(),
                keyword
            ),
        );
        return Ok(Table::empty(schema));
    }

    let lookup = description_lookup(products);
    let mut rows = Vec::new();
    let mut skipped = 0usize;

    for path in &files {
        let workbook = match open_workbook(path) {
            Ok(wb) => wb,
            Err(e) => {
                skipped += 1;
                diagnostics.warn(
                    schema.name,
                    WarningKind::FileSkipped,
                    format!("无法读取 {}，已跳过: {}", path.display(), e),
                );
                continue;
            }
        };

        match trade_rows_from_workbook(
            &workbook,
            direction,
            ctx.header_search_rows,
            &lookup,
            diagnostics,
        ) {
            Ok(file_rows) => rows.extend(file_rows),
            Err(e @ EtlError::MissingRequiredColumn { .. }) => {
                skipped += 1;
                diagnostics.warn(
                    schema.name,
                    WarningKind::MissingRequiredColumn,
                    format!("{}，已跳过该文件", e),
                );
            }
            Err(e) => {
                skipped += 1;
                diagnostics.warn(
                    schema.name,
                    WarningKind::FileSkipped,
                    format!("{} 处理失败，已跳过: {}", workbook.file_name(), e),
                );
            }
        }
    }

    info!(
        table = schema.name,
        files = files.len(),
        skipped_files = skipped,
        rows = rows.len(),
        "事实表构建完成"
    );
    Ok(Table::new(schema, rows))
}

/// 由单个工作簿构建事实行（已过滤、已关联描述）
pub fn trade_rows_from_workbook(
    workbook: &Workbook,
    direction: TradeDirection,
    header_search_rows: usize,
    lookup: &DescriptionLookup<'_>,
    diagnostics: &mut Diagnostics,
) -> EtlResult<Vec<TradeFactRow>> {
    let table_name = trade_fact_schema(direction).name;
    let file_name = workbook.file_name();
    let (_, sheet) = locate_table(workbook, &[PERIOD, PRODUCT_CODE], header_search_rows)?;
    let index = ColumnIndex::new(&sheet.headers);

    let country_name_field = counterpart_name(direction);
    let columns = index
        .resolve_required(&[PERIOD, PRODUCT_CODE, FOB_VALUE, country_name_field])
        .map_err(|missing| missing_columns(table_name, &file_name, missing))?;
    let (period_col, code_col, fob_col, name_col) = (columns[0], columns[1], columns[2], columns[3]);

    let country_code_field = counterpart_code(direction);
    let country_code_col = index.resolve(&country_code_field);
    let weight_col = index.resolve(&NET_WEIGHT);
    let cif_col = if direction.is_import() {
        index.resolve(&CIF_VALUE)
    } else {
        None
    };

    let mut missing_optional = Vec::new();
    if country_code_col.is_none() {
        missing_optional.push(country_code_field.field);
    }
    if weight_col.is_none() {
        missing_optional.push(NET_WEIGHT.field);
    }
    if direction.is_import() && cif_col.is_none() {
        missing_optional.push(CIF_VALUE.field);
    }
    if !missing_optional.is_empty() {
        diagnostics.warn(
            table_name,
            WarningKind::MissingOptionalColumn,
            format!(
                "{}: 可选列缺失，以空值/0 填充: {}",
                file_name,
                missing_optional.join(", ")
            ),
        );
    }

    let staged: Vec<StagedFact> = sheet
        .rows
        .iter()
        .map(|row| {
            let period_raw = normalize_cell_value(SheetTable::cell(row, period_col));
            StagedFact {
                code: parse_code(&SheetTable::cell(row, code_col).as_text(), PRODUCT_CODE_LEN),
                period: try_parse_period(&period_raw),
                period_raw,
                country_code: normalize_cell_value(SheetTable::opt_cell(row, country_code_col)),
                country_name: normalize_cell_value(SheetTable::cell(row, name_col)),
                net_weight: numeric_cell(row, weight_col),
                fob_value: numeric_cell(row, Some(fob_col)),
                cif_value: direction.is_import().then(|| numeric_cell(row, cif_col)),
            }
        })
        .collect();
    let total = staged.len();

    let (kept, outcome) = apply_filters(staged, filters_for(direction));
    if outcome.total_dropped() > 0 {
        diagnostics.warn(
            table_name,
            WarningKind::RowsDropped,
            format!(
                "{}: 丢弃 {} 行 ({})",
                file_name,
                outcome.total_dropped(),
                outcome.summary()
            ),
        );
    }

    let unparsed = kept.iter().filter(|row| row.period.is_none()).count();
    if unparsed > 0 {
        diagnostics.warn(
            table_name,
            WarningKind::UnparseablePeriod,
            format!("{}: {} 行期间无法解析，年月记为 0", file_name, unparsed),
        );
    }

    let rows: Vec<TradeFactRow> = kept
        .into_iter()
        .filter_map(|staged| {
            let code10 = staged.code?;
            let (year, month) = staged.period.unwrap_or((0, 0));
            let description = lookup
                .get(code10.as_str())
                .map(|d| d.to_string())
                .unwrap_or_default();
            Some(TradeFactRow {
                year,
                month,
                period_raw: staged.period_raw,
                codes: CodePrefixes::from_code10(&code10),
                country_code: staged.country_code,
                country_name: staged.country_name,
                net_weight: staged.net_weight,
                fob_value: staged.fob_value,
                cif_value: staged.cif_value,
                description,
                source_file: file_name.clone(),
            })
        })
        .collect();

    info!(
        table = table_name,
        file = %file_name,
        source_rows = total,
        rows = rows.len(),
        dropped = outcome.total_dropped(),
        unparsed_periods = unparsed,
        "事实文件处理完成"
    );
    Ok(rows)
}
