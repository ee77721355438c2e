// ==========================================
// 外贸统计导入管道 - 列别名解析
// ==========================================
// 职责: 多种表头写法 → 唯一语义字段
// 说明: 表头拼写漂移（重音/空格/下划线/缩写）只在此处吸收
// ==========================================

use crate::domain::types::TradeDirection;
use crate::importer::data_cleaner::normalize_column_name;
use std::collections::HashMap;

// ==========================================
// FieldAliases - 语义字段及其可接受表头
// ==========================================
// 别名按优先级排列，先命中者胜出
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldAliases {
    pub field: &'static str,
    pub aliases: &'static [&'static str],
}

pub const PRODUCT_CODE: FieldAliases = FieldAliases {
    field: "product_code",
    aliases: &[
        "hs10",
        "Codigo_Subpartida_10",
        "Código Subpartida",
        "Subpartida",
        "codigo_hs10",
        "hs_10",
        "partida_10",
    ],
};

pub const DESCRIPTION: FieldAliases = FieldAliases {
    field: "description",
    aliases: &[
        "descripcion_final",
        "Descripción",
        "descripcion_subpartida",
        "description",
    ],
};

pub const ELEMENT_TYPE: FieldAliases = FieldAliases {
    field: "element_type",
    aliases: &["tipo_elemento", "tipo", "element_type"],
};

pub const PERIOD: FieldAliases = FieldAliases {
    field: "period",
    aliases: &["Periodo", "Período", "period", "mes_ano"],
};

pub const FOB_VALUE: FieldAliases = FieldAliases {
    field: "fob_value",
    aliases: &["FOB", "valor_fob", "fob_usd", "fob_miles_usd"],
};

pub const CIF_VALUE: FieldAliases = FieldAliases {
    field: "cif_value",
    aliases: &["CIF", "valor_cif", "cif_usd", "cif_miles_usd"],
};

pub const NET_WEIGHT: FieldAliases = FieldAliases {
    field: "net_weight",
    aliases: &["TM_Peso_Neto", "peso_neto", "peso_neto_tm", "toneladas"],
};

pub const EXPORT_COUNTRY_CODE: FieldAliases = FieldAliases {
    field: "country_code",
    aliases: &["Codigo_Pais_Destino", "cod_pais_destino", "codigo_pais"],
};

pub const EXPORT_COUNTRY_NAME: FieldAliases = FieldAliases {
    field: "country_name",
    aliases: &["Pais_Destino", "País Destino", "destino", "pais"],
};

pub const IMPORT_COUNTRY_CODE: FieldAliases = FieldAliases {
    field: "country_code",
    aliases: &["Codigo_Pais_Origen", "cod_pais_origen", "codigo_pais"],
};

pub const IMPORT_COUNTRY_NAME: FieldAliases = FieldAliases {
    field: "country_name",
    aliases: &["Pais_Origen", "País Origen", "origen", "pais"],
};

pub const CHAPTER: FieldAliases = FieldAliases {
    field: "chapter",
    aliases: &["capítulos", "capitulo", "chapters", "chapter"],
};

pub const SECTION: FieldAliases = FieldAliases {
    field: "section",
    aliases: &["sección", "section"],
};

pub const SECTOR: FieldAliases = FieldAliases {
    field: "sector",
    aliases: &["sector", "sector_industria", "industria"],
};

pub const TRADEMAP_PRODUCT: FieldAliases = FieldAliases {
    field: "product",
    aliases: &["producto", "product", "codigo_producto"],
};

pub const TRADEMAP_COUNTRY: FieldAliases = FieldAliases {
    field: "country",
    aliases: &["país", "country", "importadores", "exportadores"],
};

pub const TRADEMAP_YEAR: FieldAliases = FieldAliases {
    field: "year",
    aliases: &["year", "año", "anio"],
};

pub const TRADEMAP_VALUE: FieldAliases = FieldAliases {
    field: "value",
    aliases: &["value", "valor"],
};

/// 对方国家编码列（出口=目的国，进口=原产国）
pub fn counterpart_code(direction: TradeDirection) -> FieldAliases {
    match direction {
        TradeDirection::Export => EXPORT_COUNTRY_CODE,
        TradeDirection::Import => IMPORT_COUNTRY_CODE,
    }
}

/// 对方国家名称列
pub fn counterpart_name(direction: TradeDirection) -> FieldAliases {
    match direction {
        TradeDirection::Export => EXPORT_COUNTRY_NAME,
        TradeDirection::Import => IMPORT_COUNTRY_NAME,
    }
}

// ==========================================
// ColumnIndex - 规范化列名索引
// ==========================================
// 同一规范化名出现多次时，保留第一列
#[derive(Debug, Clone)]
pub struct ColumnIndex {
    by_normalized: HashMap<String, usize>,
}

impl ColumnIndex {
    pub fn new<S: AsRef<str>>(columns: &[S]) -> Self {
        let mut by_normalized = HashMap::new();
        for (idx, column) in columns.iter().enumerate() {
            let key = normalize_column_name(column.as_ref());
            if key.is_empty() {
                continue;
            }
            by_normalized.entry(key).or_insert(idx);
        }
        Self { by_normalized }
    }

    /// 按别名优先级查找列下标
    pub fn find(&self, aliases: &[&str]) -> Option<usize> {
        aliases
            .iter()
            .find_map(|alias| self.by_normalized.get(&normalize_column_name(alias)).copied())
    }

    pub fn resolve(&self, field: &FieldAliases) -> Option<usize> {
        self.find(field.aliases)
    }

    /// 解析一组必需字段；任一缺失则返回全部缺失字段名
    pub fn resolve_required(&self, fields: &[FieldAliases]) -> Result<Vec<usize>, Vec<String>> {
        let mut found = Vec::with_capacity(fields.len());
        let mut missing = Vec::new();
        for field in fields {
            match self.resolve(field) {
                Some(idx) => found.push(idx),
                None => missing.push(field.field.to_string()),
            }
        }
        if missing.is_empty() {
            Ok(found)
        } else {
            Err(missing)
        }
    }
}

/// 在实际列名中按别名优先级查找列下标
pub fn resolve_column<S: AsRef<str>>(columns: &[S], aliases: &[&str]) -> Option<usize> {
    ColumnIndex::new(columns).find(aliases)
}

/// 同 resolve_column，返回实际表头文本
pub fn resolve_column_name<'a, S: AsRef<str>>(columns: &'a [S], aliases: &[&str]) -> Option<&'a str> {
    resolve_column(columns, aliases).map(|idx| columns[idx].as_ref())
}
