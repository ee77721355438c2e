// ==========================================
// 外贸统计导入管道 - 管道驱动
// ==========================================
// 流程: 产品维度 → 行业维度 → 出口事实 → 进口事实 → Trade Map → 交叉校验
// 红线: 单表失败只降级该表；仅严格模式下维度表源文件缺失终止运行
// ==========================================

use crate::config::EtlConfig;
use crate::domain::diagnostics::Diagnostics;
use crate::domain::table::{Table, TableView};
use crate::domain::trade::{
    ProductRow, SectorRow, TradeFactRow, TradeMapRow, EXPORT_FACT_SCHEMA, IMPORT_FACT_SCHEMA,
    PRODUCT_DIMENSION_SCHEMA, SECTOR_DIMENSION_SCHEMA, TRADEMAP_FACT_SCHEMA,
};
use crate::domain::types::TradeDirection;
use crate::importer::builders::{
    build_product_dimension, build_sector_dimension, build_trade_facts, build_trademap_facts,
    SourceContext,
};
use crate::importer::dq_validator::{validate_tables, ValidationWarning};
use crate::importer::error::EtlResult;
use crate::importer::safe_build::{safe_build, safe_build_with_policy};
use tracing::{info, instrument};

// ==========================================
// PipelineTables - 五张规范表
// ==========================================
#[derive(Debug, Clone)]
pub struct PipelineTables {
    pub products: Table<ProductRow>,
    pub sectors: Table<SectorRow>,
    pub exports: Table<TradeFactRow>,
    pub imports: Table<TradeFactRow>,
    pub trademap: Table<TradeMapRow>,
}

impl PipelineTables {
    /// 按固定顺序返回只读视图
    pub fn views(&self) -> [&dyn TableView; 5] {
        [
            &self.products,
            &self.sectors,
            &self.exports,
            &self.imports,
            &self.trademap,
        ]
    }

    /// (表名, 行数)，顺序同 views
    pub fn row_counts(&self) -> Vec<(&'static str, usize)> {
        self.views()
            .iter()
            .map(|v| (v.schema().name, v.row_count()))
            .collect()
    }
}

/// 一次运行的全部产出
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub tables: PipelineTables,
    pub diagnostics: Diagnostics,
    pub validation: Vec<ValidationWarning>,
}

// ==========================================
// Pipeline - 管道驱动
// ==========================================
pub struct Pipeline {
    config: EtlConfig,
}

impl Pipeline {
    pub fn new(config: EtlConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EtlConfig {
        &self.config
    }

    /// 执行一次完整构建（同一输入两次运行产出一致）
    #[instrument(skip(self), fields(raw_dir = %self.config.raw_dir.display()))]
    pub fn run(&self) -> EtlResult<PipelineOutput> {
        let config = &self.config;
        let keywords = &config.keywords;
        let policy = config.source_policy();
        let ctx = SourceContext {
            raw_dir: &config.raw_dir,
            header_search_rows: config.header_search_rows,
        };
        let mut diagnostics = Diagnostics::new();

        info!(strict_sources = config.strict_sources, "开始构建规范表");

        let products = safe_build_with_policy(&PRODUCT_DIMENSION_SCHEMA, policy, &mut diagnostics, |d| {
            build_product_dimension(ctx, &keywords.product, d)
        })?;
        let sectors = safe_build_with_policy(&SECTOR_DIMENSION_SCHEMA, policy, &mut diagnostics, |d| {
            build_sector_dimension(ctx, &keywords.sector, d)
        })?;
        let exports = safe_build(&EXPORT_FACT_SCHEMA, &mut diagnostics, |d| {
            build_trade_facts(ctx, TradeDirection::Export, &keywords.exports, &products, d)
        });
        let imports = safe_build(&IMPORT_FACT_SCHEMA, &mut diagnostics, |d| {
            build_trade_facts(ctx, TradeDirection::Import, &keywords.imports, &products, d)
        });
        let trademap = safe_build(&TRADEMAP_FACT_SCHEMA, &mut diagnostics, |d| {
            build_trademap_facts(ctx, &keywords.trademap, d)
        });

        let tables = PipelineTables {
            products,
            sectors,
            exports,
            imports,
            trademap,
        };
        let validation = validate_tables(&tables, &config.thresholds);

        info!(
            products = tables.products.len(),
            sectors = tables.sectors.len(),
            exports = tables.exports.len(),
            imports = tables.imports.len(),
            trademap = tables.trademap.len(),
            warnings = diagnostics.len(),
            validation_findings = validation.len(),
            "规范表构建完成"
        );

        Ok(PipelineOutput {
            tables,
            diagnostics,
            validation,
        })
    }
}
