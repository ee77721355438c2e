// ==========================================
// 外贸统计导入管道 - 期间解析
// ==========================================
// 职责: 从自由文本期间标签中提取 (年, 月)
// 兼容: "2024 / 03 - Marzo" / "2024-7" / "2024_07" / "2024 07"
// ==========================================

use crate::importer::data_cleaner::normalize_text_value;
use once_cell::sync::Lazy;
use regex::Regex;
use tracing::warn;

// 依次尝试，首个命中即返回
static PERIOD_PATTERNS: Lazy<[Regex; 2]> = Lazy::new(|| {
    [
        Regex::new(r"(19\d{2}|20\d{2})\s*/\s*(1[0-2]|0?[1-9])").expect("valid regex"),
        Regex::new(r"(19\d{2}|20\d{2})[-_\s]+(1[0-2]|0?[1-9])").expect("valid regex"),
    ]
});

/// 解析期间标签；无法解析返回 None
pub fn try_parse_period(text: &str) -> Option<(i32, u32)> {
    let normalized = normalize_text_value(text);
    PERIOD_PATTERNS.iter().find_map(|pattern| {
        let caps = pattern.captures(&normalized)?;
        let year = caps.get(1)?.as_str().parse::<i32>().ok()?;
        let month = caps.get(2)?.as_str().parse::<u32>().ok()?;
        Some((year, month))
    })
}

/// 解析期间标签；无法解析返回 (0, 0) 并记录告警
pub fn parse_period(text: &str) -> (i32, u32) {
    match try_parse_period(text) {
        Some(period) => period,
        None => {
            warn!(period = text, "期间无法解析");
            (0, 0)
        }
    }
}
