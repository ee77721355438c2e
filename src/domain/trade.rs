// ==========================================
// 外贸统计导入管道 - 规范表行定义
// ==========================================
// 维度表: dim_product / dim_sector
// 事实表: fact_exports / fact_imports / fact_trademap
// ==========================================

use crate::domain::table::{ColumnDef, FieldValue, TableRow, TableSchema};
use crate::domain::types::TradeDirection;
use serde::Serialize;

// ==========================================
// 表结构常量
// ==========================================

pub static PRODUCT_DIMENSION_SCHEMA: TableSchema = TableSchema {
    name: "dim_product",
    columns: &[
        ColumnDef::text("code10"),
        ColumnDef::text("code8"),
        ColumnDef::text("code6"),
        ColumnDef::text("code4"),
        ColumnDef::text("code2"),
        ColumnDef::text("description"),
        ColumnDef::text("element_type"),
    ],
};

pub static SECTOR_DIMENSION_SCHEMA: TableSchema = TableSchema {
    name: "dim_sector",
    columns: &[
        ColumnDef::text("code2"),
        ColumnDef::text("section"),
        ColumnDef::text("sector_industry"),
    ],
};

pub static EXPORT_FACT_SCHEMA: TableSchema = TableSchema {
    name: "fact_exports",
    columns: &[
        ColumnDef::integer("year"),
        ColumnDef::integer("month"),
        ColumnDef::text("period_raw"),
        ColumnDef::text("code10"),
        ColumnDef::text("code8"),
        ColumnDef::text("code6"),
        ColumnDef::text("code4"),
        ColumnDef::text("code2"),
        ColumnDef::text("country_code"),
        ColumnDef::text("country_name"),
        ColumnDef::real("net_weight"),
        ColumnDef::real("fob_value"),
        ColumnDef::text("description"),
        ColumnDef::text("source_file"),
    ],
};

pub static IMPORT_FACT_SCHEMA: TableSchema = TableSchema {
    name: "fact_imports",
    columns: &[
        ColumnDef::integer("year"),
        ColumnDef::integer("month"),
        ColumnDef::text("period_raw"),
        ColumnDef::text("code10"),
        ColumnDef::text("code8"),
        ColumnDef::text("code6"),
        ColumnDef::text("code4"),
        ColumnDef::text("code2"),
        ColumnDef::text("country_code"),
        ColumnDef::text("country_name"),
        ColumnDef::real("net_weight"),
        ColumnDef::real("fob_value"),
        ColumnDef::real("cif_value"),
        ColumnDef::text("description"),
        ColumnDef::text("source_file"),
    ],
};

pub static TRADEMAP_FACT_SCHEMA: TableSchema = TableSchema {
    name: "fact_trademap",
    columns: &[
        ColumnDef::text("product"),
        ColumnDef::text("country"),
        ColumnDef::integer("year"),
        ColumnDef::real("value"),
    ],
};

/// 按贸易方向取事实表结构
pub fn trade_fact_schema(direction: TradeDirection) -> &'static TableSchema {
    match direction {
        TradeDirection::Export => &EXPORT_FACT_SCHEMA,
        TradeDirection::Import => &IMPORT_FACT_SCHEMA,
    }
}

// ==========================================
// CodePrefixes - 10 位编码及其前缀
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CodePrefixes {
    pub code10: String,
    pub code8: String,
    pub code6: String,
    pub code4: String,
    pub code2: String,
}

impl CodePrefixes {
    /// 由已校验的 10 位编码派生前缀
    pub fn from_code10(code10: &str) -> Self {
        let prefix = |n: usize| code10.get(..n).unwrap_or(code10).to_string();
        Self {
            code8: prefix(8),
            code6: prefix(6),
            code4: prefix(4),
            code2: prefix(2),
            code10: code10.to_string(),
        }
    }

    fn push_values(&self, out: &mut Vec<FieldValue>) {
        out.push(FieldValue::Text(self.code10.clone()));
        out.push(FieldValue::Text(self.code8.clone()));
        out.push(FieldValue::Text(self.code6.clone()));
        out.push(FieldValue::Text(self.code4.clone()));
        out.push(FieldValue::Text(self.code2.clone()));
    }
}

// ==========================================
// ProductRow - 产品维度行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProductRow {
    pub codes: CodePrefixes,
    pub description: String,
    pub element_type: String,
}

impl TableRow for ProductRow {
    fn field_values(&self) -> Vec<FieldValue> {
        let mut out = Vec::with_capacity(7);
        self.codes.push_values(&mut out);
        out.push(FieldValue::Text(self.description.clone()));
        out.push(FieldValue::Text(self.element_type.clone()));
        out
    }
}

// ==========================================
// SectorRow - 行业维度行
// ==========================================
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct SectorRow {
    pub code2: String,
    pub section: String,
    pub sector_industry: String,
}

impl TableRow for SectorRow {
    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.code2.clone()),
            FieldValue::Text(self.section.clone()),
            FieldValue::Text(self.sector_industry.clone()),
        ]
    }
}

// ==========================================
// TradeFactRow - 进出口事实行
// ==========================================
// 红线: cif_value 仅进口表有值（Some），出口表恒为 None
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeFactRow {
    pub year: i32,  // 未解析时为 0
    pub month: u32, // 未解析时为 0
    pub period_raw: String,
    pub codes: CodePrefixes,
    pub country_code: String,
    pub country_name: String,
    pub net_weight: f64,
    pub fob_value: f64,
    pub cif_value: Option<f64>,
    pub description: String,
    pub source_file: String,
}

impl TableRow for TradeFactRow {
    fn field_values(&self) -> Vec<FieldValue> {
        let mut out = Vec::with_capacity(15);
        out.push(FieldValue::Integer(i64::from(self.year)));
        out.push(FieldValue::Integer(i64::from(self.month)));
        out.push(FieldValue::Text(self.period_raw.clone()));
        self.codes.push_values(&mut out);
        out.push(FieldValue::Text(self.country_code.clone()));
        out.push(FieldValue::Text(self.country_name.clone()));
        out.push(FieldValue::Real(self.net_weight));
        out.push(FieldValue::Real(self.fob_value));
        if let Some(cif) = self.cif_value {
            out.push(FieldValue::Real(cif));
        }
        out.push(FieldValue::Text(self.description.clone()));
        out.push(FieldValue::Text(self.source_file.clone()));
        out
    }
}

// ==========================================
// TradeMapRow - Trade Map 面板行
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TradeMapRow {
    pub product: String,
    pub country: String,
    pub year: i32,
    pub value: f64,
}

impl TableRow for TradeMapRow {
    fn field_values(&self) -> Vec<FieldValue> {
        vec![
            FieldValue::Text(self.product.clone()),
            FieldValue::Text(self.country.clone()),
            FieldValue::Integer(i64::from(self.year)),
            FieldValue::Real(self.value),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_fact(cif_value: Option<f64>) -> TradeFactRow {
        TradeFactRow {
            year: 2024,
            month: 1,
            period_raw: "2024 / 01 - Enero".to_string(),
            codes: CodePrefixes::from_code10("0803901100"),
            country_code: "156".to_string(),
            country_name: "China".to_string(),
            net_weight: 100.0,
            fob_value: 1200.0,
            cif_value,
            description: "Banano".to_string(),
            source_file: "exportaciones.xlsx".to_string(),
        }
    }

    #[test]
    fn test_code_prefixes() {
        let codes = CodePrefixes::from_code10("0803901100");
        assert_eq!(codes.code8, "08039011");
        assert_eq!(codes.code6, "080390");
        assert_eq!(codes.code4, "0803");
        assert_eq!(codes.code2, "08");
    }

    #[test]
    fn test_trade_fact_values_match_schema_width() {
        let export = sample_fact(None);
        assert_eq!(
            export.field_values().len(),
            EXPORT_FACT_SCHEMA.columns.len()
        );

        let import = sample_fact(Some(1300.0));
        assert_eq!(
            import.field_values().len(),
            IMPORT_FACT_SCHEMA.columns.len()
        );
    }

    #[test]
    fn test_product_row_values_match_schema_width() {
        let row = ProductRow {
            codes: CodePrefixes::from_code10("0306171000"),
            description: "Camarón".to_string(),
            element_type: "subpartida".to_string(),
        };
        assert_eq!(
            row.field_values().len(),
            PRODUCT_DIMENSION_SCHEMA.columns.len()
        );
    }
}
