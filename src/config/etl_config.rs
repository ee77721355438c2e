// ==========================================
// 外贸统计导入管道 - 运行配置
// ==========================================
// 职责: 配置加载与多级覆写
// 优先级: 默认值 < JSON 配置文件 < 环境变量 / .env < 命令行参数
// ==========================================

use crate::config::config_source::ConfigSource;
use crate::importer::error::{EtlError, EtlResult};
use crate::importer::header_detector::DEFAULT_HEADER_SEARCH_ROWS;
use crate::importer::safe_build::SourcePolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

// ==========================================
// 配置键（环境变量名）
// ==========================================
pub mod config_keys {
    pub const DATA_RAW_DIR: &str = "DATA_RAW_DIR";
    pub const DATA_PROCESSED_DIR: &str = "DATA_PROCESSED_DIR";
    pub const SQLITE_PATH: &str = "ETL_SQLITE_PATH";
    pub const HEADER_SEARCH_ROWS: &str = "ETL_HEADER_SEARCH_ROWS";
    pub const EXPECTED_CHAPTERS: &str = "ETL_EXPECTED_CHAPTERS";
    pub const MIN_SECTOR_COVERAGE: &str = "ETL_MIN_SECTOR_COVERAGE";
    pub const EXPECTED_PARTNER: &str = "ETL_EXPECTED_PARTNER";
    pub const STRICT_SOURCES: &str = "ETL_STRICT_SOURCES";
}

// ==========================================
// SourceKeywords - 源文件发现关键字
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceKeywords {
    pub product: String,
    pub sector: String,
    pub exports: String,
    pub imports: String,
    pub trademap: String,
}

impl Default for SourceKeywords {
    fn default() -> Self {
        Self {
            product: "diccionario".to_string(),
            sector: "sector".to_string(),
            exports: "export".to_string(),
            imports: "import".to_string(),
            trademap: "trademap".to_string(),
        }
    }
}

// ==========================================
// ValidationThresholds - 交叉校验阈值
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationThresholds {
    /// 期望的两位章节数（HS 体系为 98）
    pub expected_chapter_count: usize,
    pub chapter_count_tolerance: usize,
    /// 出口事实关联到行业维度的最低覆盖率
    pub min_sector_coverage: f64,
    /// 出口事实中必须出现的贸易伙伴（大小写不敏感子串）
    pub expected_partner: String,
}

impl Default for ValidationThresholds {
    fn default() -> Self {
        Self {
            expected_chapter_count: 98,
            chapter_count_tolerance: 5,
            min_sector_coverage: 0.8,
            expected_partner: "CHINA".to_string(),
        }
    }
}

// ==========================================
// EtlConfig - 运行配置
// ==========================================
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EtlConfig {
    pub raw_dir: PathBuf,
    pub processed_dir: PathBuf,
    pub sqlite_path: PathBuf,
    pub header_search_rows: usize,
    /// 维度表源文件缺失时终止运行
    pub strict_sources: bool,
    pub keywords: SourceKeywords,
    pub thresholds: ValidationThresholds,
}

impl Default for EtlConfig {
    fn default() -> Self {
        Self {
            raw_dir: PathBuf::from("./data/raw"),
            processed_dir: PathBuf::from("./data/processed"),
            sqlite_path: PathBuf::from("./data/processed/observatorio.sqlite"),
            header_search_rows: DEFAULT_HEADER_SEARCH_ROWS,
            strict_sources: false,
            keywords: SourceKeywords::default(),
            thresholds: ValidationThresholds::default(),
        }
    }
}

impl EtlConfig {
    /// 从 JSON 文件读取（缺省字段取默认值）
    pub fn from_json_file(path: &Path) -> EtlResult<Self> {
        let raw = std::fs::read_to_string(path).map_err(|e| EtlError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&raw).map_err(|e| EtlError::ConfigReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 用配置来源中的值覆写当前配置
    pub fn apply_overrides(&mut self, source: &impl ConfigSource) -> EtlResult<()> {
        if let Some(v) = source.get(config_keys::DATA_RAW_DIR) {
            self.raw_dir = PathBuf::from(v);
        }
        if let Some(v) = source.get(config_keys::DATA_PROCESSED_DIR) {
            self.processed_dir = PathBuf::from(v);
        }
        if let Some(v) = source.get(config_keys::SQLITE_PATH) {
            self.sqlite_path = PathBuf::from(v);
        }
        if let Some(v) = parse_value(source, config_keys::HEADER_SEARCH_ROWS)? {
            self.header_search_rows = v;
        }
        if let Some(v) = parse_value(source, config_keys::EXPECTED_CHAPTERS)? {
            self.thresholds.expected_chapter_count = v;
        }
        if let Some(v) = parse_value::<f64>(source, config_keys::MIN_SECTOR_COVERAGE)? {
            self.thresholds.min_sector_coverage = v;
        }
        if let Some(v) = source.get(config_keys::EXPECTED_PARTNER) {
            self.thresholds.expected_partner = v;
        }
        if let Some(v) = source.get(config_keys::STRICT_SOURCES) {
            self.strict_sources = parse_bool(config_keys::STRICT_SOURCES, &v)?;
        }

        debug!(config = ?self, "配置覆写完成");
        Ok(())
    }

    /// 加载完整配置：默认值 → 可选 JSON 文件 → 配置来源
    pub fn load(json_path: Option<&Path>, source: &impl ConfigSource) -> EtlResult<Self> {
        let mut config = match json_path {
            Some(path) => Self::from_json_file(path)?,
            None => Self::default(),
        };
        config.apply_overrides(source)?;
        config.validate()?;
        Ok(config)
    }

    /// 取值范围校验（JSON 与键值覆写都应用之后）
    pub fn validate(&self) -> EtlResult<()> {
        let coverage = self.thresholds.min_sector_coverage;
        if !(0.0..=1.0).contains(&coverage) {
            return Err(EtlError::ConfigValueError {
                key: config_keys::MIN_SECTOR_COVERAGE.to_string(),
                value: coverage.to_string(),
                message: "覆盖率必须在 [0, 1] 区间内".to_string(),
            });
        }
        Ok(())
    }

    /// 维度表的源文件策略
    pub fn source_policy(&self) -> SourcePolicy {
        if self.strict_sources {
            SourcePolicy::Required
        } else {
            SourcePolicy::Degrade
        }
    }
}

fn parse_value<T>(source: &impl ConfigSource, key: &str) -> EtlResult<Option<T>>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    match source.get(key) {
        None => Ok(None),
        Some(raw) => raw
            .parse::<T>()
            .map(Some)
            .map_err(|e| EtlError::ConfigValueError {
                key: key.to_string(),
                value: raw.clone(),
                message: e.to_string(),
            }),
    }
}

fn parse_bool(key: &str, raw: &str) -> EtlResult<bool> {
    match raw.to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(EtlError::ConfigValueError {
            key: key.to_string(),
            value: raw.to_string(),
            message: "应为 true/false".to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::config_source::MapConfigSource;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_defaults() {
        let config = EtlConfig::default();
        assert_eq!(config.header_search_rows, 40);
        assert_eq!(config.keywords.product, "diccionario");
        assert_eq!(config.thresholds.expected_chapter_count, 98);
        assert_eq!(config.thresholds.expected_partner, "CHINA");
        assert_eq!(config.source_policy(), SourcePolicy::Degrade);
    }

    #[test]
    fn test_env_overrides() {
        let source = MapConfigSource::new()
            .with(config_keys::DATA_RAW_DIR, "/srv/raw")
            .with(config_keys::HEADER_SEARCH_ROWS, "60")
            .with(config_keys::MIN_SECTOR_COVERAGE, "0.5")
            .with(config_keys::STRICT_SOURCES, "TRUE");

        let config = EtlConfig::load(None, &source).unwrap();

        assert_eq!(config.raw_dir, PathBuf::from("/srv/raw"));
        assert_eq!(config.header_search_rows, 60);
        assert_eq!(config.thresholds.min_sector_coverage, 0.5);
        assert_eq!(config.source_policy(), SourcePolicy::Required);
        assert_eq!(config.processed_dir, PathBuf::from("./data/processed"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let source = MapConfigSource::new().with(config_keys::HEADER_SEARCH_ROWS, "muchas");
        assert!(matches!(
            EtlConfig::load(None, &source),
            Err(EtlError::ConfigValueError { .. })
        ));

        let source = MapConfigSource::new().with(config_keys::MIN_SECTOR_COVERAGE, "1.5");
        assert!(EtlConfig::load(None, &source).is_err());

        let source = MapConfigSource::new().with(config_keys::STRICT_SOURCES, "quizas");
        assert!(EtlConfig::load(None, &source).is_err());
    }

    #[test]
    fn test_json_file_then_overrides() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.json");
        fs::write(
            &path,
            r#"{"raw_dir": "/json/raw", "keywords": {"product": "dict"}, "thresholds": {"expected_partner": "PERU"}}"#,
        )
        .unwrap();

        let source = MapConfigSource::new().with(config_keys::EXPECTED_PARTNER, "CHINA");
        let config = EtlConfig::load(Some(&path), &source).unwrap();

        assert_eq!(config.raw_dir, PathBuf::from("/json/raw"));
        assert_eq!(config.keywords.product, "dict");
        assert_eq!(config.keywords.sector, "sector");
        assert_eq!(config.thresholds.expected_partner, "CHINA");
    }

    #[test]
    fn test_json_coverage_out_of_range_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("etl.json");
        fs::write(&path, r#"{"thresholds": {"min_sector_coverage": 1.5}}"#).unwrap();

        let result = EtlConfig::load(Some(&path), &MapConfigSource::new());
        assert!(matches!(
            result,
            Err(EtlError::ConfigValueError { ref key, .. }) if key == config_keys::MIN_SECTOR_COVERAGE
        ));

        // 覆写为合法值后通过
        let source = MapConfigSource::new().with(config_keys::MIN_SECTOR_COVERAGE, "0.9");
        let config = EtlConfig::load(Some(&path), &source).unwrap();
        assert_eq!(config.thresholds.min_sector_coverage, 0.9);
    }

    #[test]
    fn test_missing_json_file() {
        let result = EtlConfig::from_json_file(Path::new("/no/such/etl.json"));
        assert!(matches!(result, Err(EtlError::ConfigReadError { .. })));
    }
}
