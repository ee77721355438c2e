// ==========================================
// 外贸统计导入管道 - 命令行入口
// ==========================================
// 流程: 加载配置 → 运行管道 → 写出产物 → 打印摘要
// 退出码: 仅运行级错误（配置错误/严格模式下源缺失/写出失败）为非零
// ==========================================

use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use trade_etl::config::{EnvConfigSource, EtlConfig};
use trade_etl::{logging, publish_outputs, Pipeline, PublishOptions, RunSummary};

#[derive(Parser, Debug)]
#[command(
    name = "trade-etl",
    version,
    about = "外贸统计工作簿导入与规范化",
    long_about = "读取原始数据目录中的产品字典、行业分类、进出口明细与 Trade Map 面板，\n\
                  输出五张规范表（CSV + SQLite）、数据字典与运行摘要。"
)]
struct Cli {
    /// 原始工作簿目录（覆盖 DATA_RAW_DIR）
    #[arg(long = "raw-dir", value_name = "DIR")]
    raw_dir: Option<PathBuf>,

    /// 产物输出目录（覆盖 DATA_PROCESSED_DIR）
    #[arg(long = "processed-dir", value_name = "DIR")]
    processed_dir: Option<PathBuf>,

    /// SQLite 库文件路径（覆盖 ETL_SQLITE_PATH）
    #[arg(long = "sqlite-path", value_name = "PATH")]
    sqlite_path: Option<PathBuf>,

    /// JSON 配置文件
    #[arg(long = "config", value_name = "PATH")]
    config: Option<PathBuf>,

    /// 维度表源文件缺失时终止运行
    #[arg(long = "strict")]
    strict: bool,

    /// 以 JSON 行格式输出日志
    #[arg(long = "json-logs")]
    json_logs: bool,

    /// 不写 SQLite，只写 CSV
    #[arg(long = "skip-sqlite")]
    skip_sqlite: bool,
}

impl Cli {
    fn apply(&self, config: &mut EtlConfig) {
        if let Some(dir) = &self.raw_dir {
            config.raw_dir = dir.clone();
        }
        if let Some(dir) = &self.processed_dir {
            config.processed_dir = dir.clone();
        }
        if let Some(path) = &self.sqlite_path {
            config.sqlite_path = path.clone();
        }
        if self.strict {
            config.strict_sources = true;
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<RunSummary> {
    let mut config =
        EtlConfig::load(cli.config.as_deref(), &EnvConfigSource).context("配置加载失败")?;
    cli.apply(&mut config);

    tracing::info!("==================================================");
    tracing::info!("{} v{}", trade_etl::APP_NAME, trade_etl::VERSION);
    tracing::info!("原始目录: {}", config.raw_dir.display());
    tracing::info!("输出目录: {}", config.processed_dir.display());
    tracing::info!("==================================================");

    let summary = RunSummary::start(&config.raw_dir);
    let output = Pipeline::new(config.clone())
        .run()
        .context("管道运行失败")?;
    let summary = summary.with_output(&output);

    let options = PublishOptions {
        skip_sqlite: cli.skip_sqlite,
    };
    publish_outputs(&config, &output, summary, options).context("产物写出失败")
}

fn main() {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    if cli.json_logs {
        logging::init_json();
    } else {
        logging::init();
    }

    match run(&cli) {
        Ok(summary) => {
            println!("ETL 完成 (run_id={})", summary.run_id);
            for table in &summary.tables {
                println!("  {:<16} {:>8} 行", table.table, table.rows);
            }
            println!(
                "  告警 {} 条，校验发现 {} 条",
                summary.warnings.len(),
                summary.validation.len()
            );
        }
        Err(error) => {
            tracing::error!(error = ?error, "运行终止");
            eprintln!("error: {:#}", error);
            std::process::exit(1);
        }
    }
}
