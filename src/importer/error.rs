// ==========================================
// 外贸统计导入管道 - 错误类型
// ==========================================
// 工具: thiserror 派生宏
// 分级: 运行级（目录/发现）/ 表级 / 文件级 / 标记级
// ==========================================

use std::path::PathBuf;
use thiserror::Error;

/// 导入管道错误类型
#[derive(Error, Debug)]
pub enum EtlError {
    // ===== 目录与发现 =====
    #[error("目录不存在: {}", .0.display())]
    DirectoryNotFound(PathBuf),

    #[error("目录读取失败 ({}): {source}", .path.display())]
    DirectoryRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("未找到包含关键字 '{keyword}' 的源文件 (目录: {})", .dir.display())]
    SourceNotFound { keyword: String, dir: PathBuf },

    // ===== 文件读取 =====
    #[error("文件格式不支持: {0}（仅支持 .xlsx/.xlsm/.xls/.xlsb/.ods/.csv）")]
    UnsupportedFormat(String),

    #[error("文件读取失败: {0}")]
    FileReadError(String),

    #[error("Excel 解析失败: {0}")]
    ExcelParseError(String),

    #[error("CSV 解析失败: {0}")]
    CsvParseError(String),

    #[error("工作簿无工作表: {}", .0.display())]
    NoSheets(PathBuf),

    // ===== 列解析 =====
    #[error("必需列缺失 (表 {table}, 文件 {file}): {}", .fields.join(", "))]
    MissingRequiredColumn {
        table: String,
        file: String,
        fields: Vec<String>,
    },

    // ===== 标记解析 =====
    #[error("章节标记非法: {0}")]
    InvalidChapterToken(String),

    #[error("章节范围倒置: {0}")]
    InvertedChapterRange(String),

    // ===== 持久化 =====
    #[error("数据库操作失败: {0}")]
    DatabaseError(String),

    #[error("表写出失败 ({table}): {message}")]
    TableWriteError { table: String, message: String },

    // ===== 配置 =====
    #[error("配置值格式错误 (key: {key}, value: {value}): {message}")]
    ConfigValueError {
        key: String,
        value: String,
        message: String,
    },

    #[error("配置读取失败 ({path}): {message}")]
    ConfigReadError { path: String, message: String },
}

impl EtlError {
    /// 是否为"源文件未找到"类错误（严格模式下不被安全构建吸收）
    pub fn is_source_not_found(&self) -> bool {
        matches!(
            self,
            EtlError::SourceNotFound { .. } | EtlError::DirectoryNotFound(_)
        )
    }
}

// 实现 From<std::io::Error>
impl From<std::io::Error> for EtlError {
    fn from(err: std::io::Error) -> Self {
        EtlError::FileReadError(err.to_string())
    }
}

// 实现 From<csv::Error>
impl From<csv::Error> for EtlError {
    fn from(err: csv::Error) -> Self {
        EtlError::CsvParseError(err.to_string())
    }
}

// 实现 From<calamine::Error>
impl From<calamine::Error> for EtlError {
    fn from(err: calamine::Error) -> Self {
        EtlError::ExcelParseError(err.to_string())
    }
}

// 实现 From<rusqlite::Error>
impl From<rusqlite::Error> for EtlError {
    fn from(err: rusqlite::Error) -> Self {
        EtlError::DatabaseError(err.to_string())
    }
}

/// Result 类型别名
pub type EtlResult<T> = Result<T, EtlError>;
