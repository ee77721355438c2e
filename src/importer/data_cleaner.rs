// ==========================================
// 外贸统计导入管道 - 文本/编码规范化
// ==========================================
// 职责: TRIM / 列名 slug / 文本值清洗 / 定长编码 / 数值强制转换
// 红线: 全部为纯函数，不失败
// ==========================================

use crate::importer::file_parser::Cell;
use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::char::is_combining_mark;
use unicode_normalization::UnicodeNormalization;

static NON_ALNUM_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^a-z0-9]+").expect("valid regex"));
static LEADING_DASHES: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[-\s]+").expect("valid regex"));
static TRAILING_PUNCT: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[\.;:,\s]+$").expect("valid regex"));
static WHITESPACE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// 需统一为 ASCII '-' 的破折号变体（en dash / em dash / minus / figure dash）
const DASH_VARIANTS: [char; 4] = ['\u{2013}', '\u{2014}', '\u{2212}', '\u{2012}'];

/// TRIM；None 视为空串
pub fn clean_text(value: Option<&str>) -> String {
    value.map(|v| v.trim().to_string()).unwrap_or_default()
}

/// 单元格 TRIM
pub fn clean_cell(cell: &Cell) -> String {
    cell.as_text().trim().to_string()
}

/// 破折号变体统一为 '-'
pub fn unify_dashes(value: &str) -> String {
    value
        .chars()
        .map(|c| if DASH_VARIANTS.contains(&c) { '-' } else { c })
        .collect()
}

/// 列名 slug：小写 + 去重音 + 非字母数字折叠为 '_'
///
/// 例: "Código Subpartida 10" → "codigo_subpartida_10"
pub fn normalize_column_name(value: &str) -> String {
    let lowered = clean_text(Some(value)).to_lowercase();
    let stripped: String = lowered.nfkd().filter(|c| !is_combining_mark(*c)).collect();
    NON_ALNUM_RUN
        .replace_all(&stripped, "_")
        .trim_matches('_')
        .to_string()
}

/// 文本值清洗：去零宽空格/BOM、统一破折号、去前导破折号、去尾部标点、折叠空白
///
/// 例: "\u{200b} - China;  " → "China"
pub fn normalize_text_value(value: &str) -> String {
    let text = clean_text(Some(value)).replace(|c: char| c == '\u{200b}' || c == '\u{feff}', "");
    let text = unify_dashes(&text);
    let text = LEADING_DASHES.replace(&text, "");
    let text = TRAILING_PUNCT.replace(&text, "");
    let text = WHITESPACE_RUN.replace_all(&text, " ");
    text.trim().to_string()
}

/// 单元格文本值清洗
pub fn normalize_cell_value(cell: &Cell) -> String {
    normalize_text_value(&cell.as_text())
}

/// 定长数字编码：仅保留数字，左侧补零，截断为 length 位
pub fn as_code(value: &str, length: usize) -> String {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    let padded = format!("{:0>width$}", digits, width = length);
    padded.chars().take(length).collect()
}

/// 是否为恰好 length 位的纯数字
pub fn is_valid_code(code: &str, length: usize) -> bool {
    code.len() == length && code.chars().all(|c| c.is_ascii_digit())
}

/// 行级编码校验 + 规范化
///
/// # 规则
/// - 仅允许数字及分隔符 '.', '-', 空格
/// - 数字位数在 [1, length] 内，且不全为 0
/// - 合法 → Some(as_code(raw, length))；否则 None（调用方丢弃该行）
pub fn parse_code(raw: &str, length: usize) -> Option<String> {
    let text = normalize_text_value(raw);
    if text.is_empty() {
        return None;
    }
    if !text
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | ' '))
    {
        return None;
    }

    let digits: String = text.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() || digits.len() > length || digits.chars().all(|c| c == '0') {
        return None;
    }

    let code = as_code(&digits, length);
    is_valid_code(&code, length).then_some(code)
}

/// 数值强制转换：非数值/NaN/无穷 → None
pub fn coerce_f64(cell: &Cell) -> Option<f64> {
    let value = match cell {
        Cell::Number(f) => Some(*f),
        Cell::Int(i) => Some(*i as f64),
        Cell::Text(s) => {
            let compact: String = s.chars().filter(|c| !c.is_whitespace()).collect();
            compact.parse::<f64>().ok()
        }
        Cell::Empty | Cell::Bool(_) => None,
    };
    value.filter(|v| v.is_finite())
}

/// 整数强制转换（浮点取整数部分）
pub fn coerce_i32(cell: &Cell) -> Option<i32> {
    coerce_f64(cell)
        .filter(|v| *v >= f64::from(i32::MIN) && *v <= f64::from(i32::MAX))
        .map(|v| v.trunc() as i32)
}
