// ==========================================
// 外贸统计导入管道 - 安全构建策略
// ==========================================
// 职责: 构建器失败 → 一条告警 + 同结构空表，不中断整体运行
// 红线: 严格模式下"源文件未找到"不被吸收（唯一定义的运行级失败）
// ==========================================

use crate::domain::diagnostics::{Diagnostics, WarningKind};
use crate::domain::table::{Table, TableSchema};
use crate::importer::error::{EtlError, EtlResult};

/// 源文件缺失时的处理策略
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourcePolicy {
    /// 任何失败都回退为空表
    #[default]
    Degrade,
    /// 源文件未找到时终止运行
    Required,
}

/// 把构建结果转换为规范表
///
/// 成功时合并构建过程中的告警；失败时丢弃中间告警，只保留一条 BuildFailed
pub fn absorb_failure<R>(
    schema: &'static TableSchema,
    result: EtlResult<Table<R>>,
    scratch: Diagnostics,
    diagnostics: &mut Diagnostics,
) -> Table<R> {
    match result {
        Ok(table) => {
            diagnostics.merge(scratch);
            table
        }
        Err(e) => {
            diagnostics.warn(
                schema.name,
                WarningKind::BuildFailed,
                format!("表 {} 构建失败，已回退为空表: {}", schema.name, e),
            );
            Table::empty(schema)
        }
    }
}

/// 安全构建：执行构建器并吸收失败
pub fn safe_build<R, F>(
    schema: &'static TableSchema,
    diagnostics: &mut Diagnostics,
    builder: F,
) -> Table<R>
where
    F: FnOnce(&mut Diagnostics) -> EtlResult<Table<R>>,
{
    let mut scratch = Diagnostics::new();
    let result = builder(&mut scratch);
    absorb_failure(schema, result, scratch, diagnostics)
}

/// 带源文件策略的安全构建
///
/// Required 策略下 SourceNotFound / DirectoryNotFound 原样返回，其余失败照常回退
pub fn safe_build_with_policy<R, F>(
    schema: &'static TableSchema,
    policy: SourcePolicy,
    diagnostics: &mut Diagnostics,
    builder: F,
) -> EtlResult<Table<R>>
where
    F: FnOnce(&mut Diagnostics) -> EtlResult<Table<R>>,
{
    let mut scratch = Diagnostics::new();
    let result = builder(&mut scratch);

    match (policy, result) {
        (SourcePolicy::Required, Err(e)) if e.is_source_not_found() => Err(e),
        (_, result) => Ok(absorb_failure(schema, result, scratch, diagnostics)),
    }
}

/// 便捷构造：必需列缺失错误
pub fn missing_columns(table: &str, file: &str, fields: Vec<String>) -> EtlError {
    EtlError::MissingRequiredColumn {
        table: table.to_string(),
        file: file.to_string(),
        fields,
    }
}
