// ==========================================
// 外贸统计导入管道 - 规范表构建器
// ==========================================
// 流程: 发现 → 读取 → 表头检测 → 列解析 → 行规范化/过滤 → 规范表
// 红线: 构建器只返回 Result，失败吸收由 safe_build 负责
// ==========================================

pub mod product;
pub mod sector;
pub mod trade_fact;
pub mod trademap;

use std::path::Path;

pub use product::{build_product_dimension, product_dimension_from_workbook};
pub use sector::{build_sector_dimension, sector_dimension_from_workbook};
pub use trade_fact::{
    build_trade_facts, description_lookup, trade_rows_from_workbook, DescriptionLookup,
};
pub use trademap::{build_trademap_facts, trademap_from_workbook};

/// 构建器共享的源目录上下文
#[derive(Debug, Clone, Copy)]
pub struct SourceContext<'a> {
    pub raw_dir: &'a Path,
    pub header_search_rows: usize,
}
