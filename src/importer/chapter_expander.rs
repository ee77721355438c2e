// ==========================================
// 外贸统计导入管道 - 章节标记展开
// ==========================================
// 职责: "01-05" → [01..05]，"7" → [07]
// 红线: 非法标记只跳过自身，不影响整张行业表
// ==========================================

use crate::importer::data_cleaner::{normalize_text_value, unify_dashes};
use crate::importer::error::{EtlError, EtlResult};
use tracing::warn;

/// 章节编码上限（两位数）
const MAX_CHAPTER: u32 = 99;

fn parse_chapter(part: &str) -> Option<u32> {
    if part.is_empty() || !part.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    part.parse::<u32>().ok().filter(|v| *v <= MAX_CHAPTER)
}

fn format_chapter(value: u32) -> String {
    format!("{:02}", value)
}

/// 展开单个章节标记
///
/// # 返回
/// - Ok(codes): 两位补零章节编码（空标记 → 空列表）
/// - Err(InvertedChapterRange): 起点大于终点
/// - Err(InvalidChapterToken): 非数字或范围格式错误
pub fn try_expand_chapter_token(token: &str) -> EtlResult<Vec<String>> {
    let text = unify_dashes(&normalize_text_value(token)).replace(' ', "");
    if text.is_empty() {
        return Ok(Vec::new());
    }

    if text.contains('-') {
        let parts: Vec<&str> = text.split('-').filter(|p| !p.is_empty()).collect();
        let bounds = match parts.as_slice() {
            [start, end] => parse_chapter(start).zip(parse_chapter(end)),
            _ => None,
        };
        let (start, end) =
            bounds.ok_or_else(|| EtlError::InvalidChapterToken(token.to_string()))?;
        if start > end {
            return Err(EtlError::InvertedChapterRange(token.to_string()));
        }
        return Ok((start..=end).map(format_chapter).collect());
    }

    parse_chapter(&text)
        .map(|v| vec![format_chapter(v)])
        .ok_or_else(|| EtlError::InvalidChapterToken(token.to_string()))
}

/// 展开单个章节标记；失败记录告警并返回空列表
pub fn expand_chapter_token(token: &str) -> Vec<String> {
    try_expand_chapter_token(token).unwrap_or_else(|e| {
        warn!(token = token, error = %e, "章节标记已跳过");
        Vec::new()
    })
}
