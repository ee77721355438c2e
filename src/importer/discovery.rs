// ==========================================
// 外贸统计导入管道 - 源文件发现
// ==========================================
// 职责: 按关键字在原始数据目录中定位工作簿
// 规则: 大小写不敏感；结果按文件名/路径排序，保证确定性
// ==========================================

use crate::importer::error::{EtlError, EtlResult};
use crate::importer::file_parser::is_workbook_path;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;
use walkdir::WalkDir;

/// Excel 打开时生成的锁文件前缀
const LOCK_FILE_PREFIX: &str = "~$";

fn is_candidate(path: &Path) -> bool {
    if !path.is_file() || !is_workbook_path(path) {
        return false;
    }
    let is_lock_file = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.starts_with(LOCK_FILE_PREFIX))
        .unwrap_or(false);
    !is_lock_file
}

fn read_dir_entries(dir: &Path) -> EtlResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(EtlError::DirectoryNotFound(dir.to_path_buf()));
    }

    let entries = fs::read_dir(dir).map_err(|e| EtlError::DirectoryRead {
        path: dir.to_path_buf(),
        source: e,
    })?;

    let mut paths = Vec::new();
    for entry_result in entries {
        let entry = entry_result.map_err(|e| EtlError::DirectoryRead {
            path: dir.to_path_buf(),
            source: e,
        })?;
        paths.push(entry.path());
    }
    Ok(paths)
}

fn lower_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().to_lowercase())
        .unwrap_or_default()
}

/// 按关键字查找单个工作簿（仅当前目录，匹配文件名主干）
///
/// # 返回
/// - Ok(path): 按小写文件名排序后的第一个匹配
/// - Err(SourceNotFound): 无匹配
pub fn find_by_keyword(dir: &Path, keyword: &str) -> EtlResult<PathBuf> {
    let keyword_lower = keyword.to_lowercase();

    let mut matches: Vec<PathBuf> = read_dir_entries(dir)?
        .into_iter()
        .filter(|p| is_candidate(p))
        .filter(|p| {
            p.file_stem()
                .map(|s| s.to_string_lossy().to_lowercase().contains(&keyword_lower))
                .unwrap_or(false)
        })
        .collect();

    matches.sort_by(|a, b| lower_file_name(a).cmp(&lower_file_name(b)).then_with(|| a.cmp(b)));
    debug!(keyword = keyword, candidates = matches.len(), "关键字查找完成");

    matches
        .into_iter()
        .next()
        .ok_or_else(|| EtlError::SourceNotFound {
            keyword: keyword.to_string(),
            dir: dir.to_path_buf(),
        })
}

/// 递归收集候选工作簿（不跟随符号链接）
fn collect_recursive(dir: &Path) -> EtlResult<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(EtlError::DirectoryNotFound(dir.to_path_buf()));
    }

    let mut out = Vec::new();
    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|e| EtlError::DirectoryRead {
            path: e.path().unwrap_or(dir).to_path_buf(),
            source: e.into(),
        })?;
        if entry.file_type().is_file() && is_candidate(entry.path()) {
            out.push(entry.into_path());
        }
    }
    Ok(out)
}

/// 相对于搜索根目录的小写路径（统一为 '/' 分隔）
fn relative_key(root: &Path, path: &Path) -> String {
    path.strip_prefix(root)
        .unwrap_or(path)
        .to_string_lossy()
        .replace('\\', "/")
        .to_lowercase()
}

/// 递归查找贸易文件
///
/// 关键字匹配的是相对于 `dir` 的路径（含子目录名），不含 `dir` 本身的绝对前缀，
/// 因此原始目录所在位置的名字不会误命中。符号链接不跟随。
/// 无匹配返回空列表（按期拆分的多文件是常态，缺失由调用方报告）
pub fn find_trade_files(dir: &Path, keyword: &str) -> EtlResult<Vec<PathBuf>> {
    let keyword_lower = keyword.to_lowercase();

    let mut files: Vec<(String, PathBuf)> = collect_recursive(dir)?
        .into_iter()
        .map(|p| (relative_key(dir, &p), p))
        .filter(|(key, _)| key.contains(&keyword_lower))
        .collect();

    files.sort_by(|a, b| a.0.cmp(&b.0).then_with(|| a.1.cmp(&b.1)));
    debug!(keyword = keyword, files = files.len(), "贸易文件查找完成");

    Ok(files.into_iter().map(|(_, p)| p).collect())
}
