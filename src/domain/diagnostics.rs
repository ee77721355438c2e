// ==========================================
// 外贸统计导入管道 - 运行诊断
// ==========================================
// 职责: 收集构建过程中的非致命告警（表名 + 类型 + 说明）
// 说明: 每条告警在写入时同步输出 tracing warn 日志
// ==========================================

use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// 告警类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WarningKind {
    SourceNotFound,        // 未找到源文件
    MissingRequiredColumn, // 必需列缺失
    MissingOptionalColumn, // 可选列缺失（以空值/0 填充）
    UnparseablePeriod,     // 期间无法解析（年/月置 0）
    InvalidCode,           // 产品编码非法（行丢弃）
    InvalidChapterToken,   // 章节标记非法（标记跳过）
    UncoercibleValue,      // 数值/年份无法转换（置 0）
    RowsDropped,           // 过滤丢弃的行数汇总
    FileSkipped,           // 单个源文件被跳过
    BuildFailed,           // 整表构建失败，已回退为空表
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            WarningKind::SourceNotFound => "SOURCE_NOT_FOUND",
            WarningKind::MissingRequiredColumn => "MISSING_REQUIRED_COLUMN",
            WarningKind::MissingOptionalColumn => "MISSING_OPTIONAL_COLUMN",
            WarningKind::UnparseablePeriod => "UNPARSEABLE_PERIOD",
            WarningKind::InvalidCode => "INVALID_CODE",
            WarningKind::InvalidChapterToken => "INVALID_CHAPTER_TOKEN",
            WarningKind::UncoercibleValue => "UNCOERCIBLE_VALUE",
            WarningKind::RowsDropped => "ROWS_DROPPED",
            WarningKind::FileSkipped => "FILE_SKIPPED",
            WarningKind::BuildFailed => "BUILD_FAILED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EtlWarning {
    pub table: String,
    pub kind: WarningKind,
    pub message: String,
}

/// 告警收集器
#[derive(Debug, Default, Clone, Serialize)]
pub struct Diagnostics {
    warnings: Vec<EtlWarning>,
}

impl Diagnostics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 记录一条告警（同时输出日志）
    pub fn warn(&mut self, table: &str, kind: WarningKind, message: impl Into<String>) {
        let message = message.into();
        warn!(table = table, kind = %kind, "{}", message);
        self.warnings.push(EtlWarning {
            table: table.to_string(),
            kind,
            message,
        });
    }

    /// 合并另一个收集器（保持顺序）
    pub fn merge(&mut self, other: Diagnostics) {
        self.warnings.extend(other.warnings);
    }

    pub fn warnings(&self) -> &[EtlWarning] {
        &self.warnings
    }

    pub fn into_warnings(self) -> Vec<EtlWarning> {
        self.warnings
    }

    pub fn len(&self) -> usize {
        self.warnings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn for_table<'a>(&'a self, table: &'a str) -> impl Iterator<Item = &'a EtlWarning> + 'a {
        self.warnings.iter().filter(move |w| w.table == table)
    }

    pub fn count_kind(&self, kind: WarningKind) -> usize {
        self.warnings.iter().filter(|w| w.kind == kind).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warn_and_filter_by_table() {
        let mut diag = Diagnostics::new();
        diag.warn("dim_product", WarningKind::InvalidCode, "1 行编码非法");
        diag.warn("dim_sector", WarningKind::InvalidChapterToken, "ab");

        assert_eq!(diag.len(), 2);
        assert_eq!(diag.for_table("dim_product").count(), 1);
        assert_eq!(diag.count_kind(WarningKind::InvalidChapterToken), 1);
    }

    #[test]
    fn test_merge_keeps_order() {
        let mut a = Diagnostics::new();
        a.warn("t1", WarningKind::RowsDropped, "a");
        let mut b = Diagnostics::new();
        b.warn("t2", WarningKind::RowsDropped, "b");

        a.merge(b);
        let tables: Vec<_> = a.warnings().iter().map(|w| w.table.as_str()).collect();
        assert_eq!(tables, vec!["t1", "t2"]);
    }
}
