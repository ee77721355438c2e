// ==========================================
// 外贸统计导入管道 - 行过滤
// ==========================================
// 职责: 按固定顺序执行显式过滤步骤，逐步统计丢弃行数
// 说明: 每个过滤步骤对应一条不变式（编码合法 / 数值非负）
// ==========================================

use std::collections::HashSet;
use std::hash::Hash;

/// 单个过滤步骤：keep 返回 false 的行被丢弃
pub struct RowFilter<T> {
    pub name: &'static str,
    pub keep: fn(&T) -> bool,
}

impl<T> RowFilter<T> {
    pub const fn new(name: &'static str, keep: fn(&T) -> bool) -> Self {
        Self { name, keep }
    }
}

/// 过滤结果统计（按步骤顺序）
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterOutcome {
    pub dropped: Vec<(&'static str, usize)>,
}

impl FilterOutcome {
    pub fn total_dropped(&self) -> usize {
        self.dropped.iter().map(|(_, n)| n).sum()
    }

    pub fn dropped_by(&self, name: &str) -> usize {
        self.dropped
            .iter()
            .filter(|(n, _)| *n == name)
            .map(|(_, count)| *count)
            .sum()
    }

    /// 形如 "invalid_code=1, negative_fob=2" 的摘要（仅列出非零项）
    pub fn summary(&self) -> String {
        self.dropped
            .iter()
            .filter(|(_, n)| *n > 0)
            .map(|(name, n)| format!("{}={}", name, n))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

/// 依次执行过滤步骤
pub fn apply_filters<T>(rows: Vec<T>, filters: &[RowFilter<T>]) -> (Vec<T>, FilterOutcome) {
    let mut outcome = FilterOutcome::default();
    let mut current = rows;

    for filter in filters {
        let before = current.len();
        current.retain(|row| (filter.keep)(row));
        outcome.dropped.push((filter.name, before - current.len()));
    }

    (current, outcome)
}

/// 按键去重，保留首次出现；返回 (结果, 丢弃数)
pub fn dedupe_by_key<T, K, F>(rows: Vec<T>, key: F) -> (Vec<T>, usize)
where
    K: Hash + Eq,
    F: Fn(&T) -> K,
{
    let before = rows.len();
    let mut seen = HashSet::new();
    let kept: Vec<T> = rows.into_iter().filter(|row| seen.insert(key(row))).collect();
    let dropped = before - kept.len();
    (kept, dropped)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_even(v: &i32) -> bool {
        v % 2 == 0
    }

    fn is_positive(v: &i32) -> bool {
        *v > 0
    }

    #[test]
    fn test_apply_filters_counts_each_step() {
        let filters = [
            RowFilter::new("even", is_even),
            RowFilter::new("positive", is_positive),
        ];
        let (kept, outcome) = apply_filters(vec![-4, -3, 1, 2, 4], &filters);

        assert_eq!(kept, vec![2, 4]);
        assert_eq!(outcome.dropped_by("even"), 2);
        assert_eq!(outcome.dropped_by("positive"), 1);
        assert_eq!(outcome.total_dropped(), 3);
        assert_eq!(outcome.summary(), "even=2, positive=1");
    }

    #[test]
    fn test_filter_order_matters_for_counts() {
        let filters = [
            RowFilter::new("positive", is_positive),
            RowFilter::new("even", is_even),
        ];
        let (_, outcome) = apply_filters(vec![-4, -3, 1, 2, 4], &filters);
        assert_eq!(outcome.dropped_by("positive"), 2);
        assert_eq!(outcome.dropped_by("even"), 1);
    }

    #[test]
    fn test_dedupe_keeps_first() {
        let rows = vec![("a", 1), ("b", 2), ("a", 3)];
        let (kept, dropped) = dedupe_by_key(rows, |r| r.0);
        assert_eq!(kept, vec![("a", 1), ("b", 2)]);
        assert_eq!(dropped, 1);
    }
}
