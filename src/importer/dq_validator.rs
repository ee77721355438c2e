// ==========================================
// 外贸统计导入管道 - 交叉表数据质量校验
// ==========================================
// 职责: 五张规范表构建完成后的一致性检查
// 红线: 只产出告警，从不失败；每条告警同步输出 tracing warn
// ==========================================

use crate::config::ValidationThresholds;
use crate::domain::trade::TradeFactRow;
use crate::importer::pipeline::PipelineTables;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use tracing::warn;

/// 校验项
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValidationCheck {
    DuplicateProductCode,
    ChapterCardinality,
    SectorCoverage,
    NegativeValue,
    MissingExpectedPartner,
}

impl fmt::Display for ValidationCheck {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ValidationCheck::DuplicateProductCode => "DUPLICATE_PRODUCT_CODE",
            ValidationCheck::ChapterCardinality => "CHAPTER_CARDINALITY",
            ValidationCheck::SectorCoverage => "SECTOR_COVERAGE",
            ValidationCheck::NegativeValue => "NEGATIVE_VALUE",
            ValidationCheck::MissingExpectedPartner => "MISSING_EXPECTED_PARTNER",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationWarning {
    pub check: ValidationCheck,
    pub message: String,
}

impl ValidationWarning {
    fn new(check: ValidationCheck, message: String) -> Self {
        warn!(check = %check, "{}", message);
        Self { check, message }
    }
}

// ==========================================
// TableValidator - 交叉表校验器
// ==========================================
pub struct TableValidator<'a> {
    thresholds: &'a ValidationThresholds,
}

impl<'a> TableValidator<'a> {
    pub fn new(thresholds: &'a ValidationThresholds) -> Self {
        Self { thresholds }
    }

    /// 执行全部校验（顺序固定）
    pub fn validate(&self, tables: &PipelineTables) -> Vec<ValidationWarning> {
        let mut findings = Vec::new();
        findings.extend(self.check_duplicate_codes(tables));
        findings.extend(self.check_chapter_cardinality(tables));
        findings.extend(self.check_sector_coverage(tables));
        findings.extend(self.check_negative_values(tables));
        findings.extend(self.check_expected_partner(tables));
        findings
    }

    /// 产品维度 code10 重复
    fn check_duplicate_codes(&self, tables: &PipelineTables) -> Option<ValidationWarning> {
        let mut seen = HashSet::new();
        let duplicates = tables
            .products
            .rows
            .iter()
            .filter(|p| !seen.insert(p.codes.code10.as_str()))
            .count();

        (duplicates > 0).then(|| {
            ValidationWarning::new(
                ValidationCheck::DuplicateProductCode,
                format!("产品维度存在 {} 个重复编码", duplicates),
            )
        })
    }

    /// 行业维度的两位章节数偏离期望值
    fn check_chapter_cardinality(&self, tables: &PipelineTables) -> Option<ValidationWarning> {
        let distinct: HashSet<&str> = tables
            .sectors
            .rows
            .iter()
            .map(|s| s.code2.as_str())
            .collect();
        let count = distinct.len();
        let expected = self.thresholds.expected_chapter_count;
        let tolerance = self.thresholds.chapter_count_tolerance;

        (count.abs_diff(expected) > tolerance).then(|| {
            ValidationWarning::new(
                ValidationCheck::ChapterCardinality,
                format!(
                    "行业维度章节数 {} 偏离期望 {} (容差 {})",
                    count, expected, tolerance
                ),
            )
        })
    }

    /// 出口事实按 code2 关联行业维度的覆盖率
    fn check_sector_coverage(&self, tables: &PipelineTables) -> Option<ValidationWarning> {
        let exports = &tables.exports.rows;
        if exports.is_empty() {
            return None;
        }

        let chapters: HashSet<&str> = tables
            .sectors
            .rows
            .iter()
            .map(|s| s.code2.as_str())
            .collect();
        let matched = exports
            .iter()
            .filter(|r| chapters.contains(r.codes.code2.as_str()))
            .count();
        let coverage = matched as f64 / exports.len() as f64;

        (coverage < self.thresholds.min_sector_coverage).then(|| {
            ValidationWarning::new(
                ValidationCheck::SectorCoverage,
                format!(
                    "出口事实行业覆盖率 {:.1}% 低于阈值 {:.1}%",
                    coverage * 100.0,
                    self.thresholds.min_sector_coverage * 100.0
                ),
            )
        })
    }

    /// 事实表中残留的负 FOB/CIF（构建过滤应已排除）
    fn check_negative_values(&self, tables: &PipelineTables) -> Vec<ValidationWarning> {
        let mut findings = Vec::new();
        for (name, rows) in [
            (tables.exports.name(), &tables.exports.rows),
            (tables.imports.name(), &tables.imports.rows),
        ] {
            let fob = count_where(rows, |r| r.fob_value < 0.0);
            let cif = count_where(rows, |r| r.cif_value.is_some_and(|c| c < 0.0));
            if fob > 0 {
                findings.push(ValidationWarning::new(
                    ValidationCheck::NegativeValue,
                    format!("{} 存在 {} 行负 FOB", name, fob),
                ));
            }
            if cif > 0 {
                findings.push(ValidationWarning::new(
                    ValidationCheck::NegativeValue,
                    format!("{} 存在 {} 行负 CIF", name, cif),
                ));
            }
        }
        findings
    }

    /// 出口事实中缺少期望贸易伙伴
    fn check_expected_partner(&self, tables: &PipelineTables) -> Option<ValidationWarning> {
        let exports = &tables.exports.rows;
        let partner = self.thresholds.expected_partner.to_uppercase();
        if exports.is_empty() || partner.is_empty() {
            return None;
        }

        let present = exports
            .iter()
            .any(|r| r.country_name.to_uppercase().contains(&partner));

        (!present).then(|| {
            ValidationWarning::new(
                ValidationCheck::MissingExpectedPartner,
                format!("出口事实中没有 {} 的记录", self.thresholds.expected_partner),
            )
        })
    }
}

fn count_where(rows: &[TradeFactRow], pred: impl Fn(&TradeFactRow) -> bool) -> usize {
    rows.iter().filter(|r| pred(r)).count()
}

/// 便捷入口：按阈值校验五张表
pub fn validate_tables(
    tables: &PipelineTables,
    thresholds: &ValidationThresholds,
) -> Vec<ValidationWarning> {
    TableValidator::new(thresholds).validate(tables)
}
