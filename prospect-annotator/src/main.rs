//! PROSPECT 标注工具主程序
//!
//! 读取一份文本报告，执行标注命令（脚本文件或标准输入），导出结构化标签。

mod commands;
mod config;

use anyhow::{Context, Result};
use clap::Parser;
use prospect_core::utils::suggested_export_filename;
use prospect_core::SchemaVersion;
use prospect_export::{ExportWriter, Exporter, ReportLoader};
use prospect_labeling::AnnotationSession;
use tokio::io::AsyncReadExt;
use tracing::{error, info, warn};

use crate::config::AnnotatorConfig;

/// 标注工具命令行参数
#[derive(Parser, Debug)]
#[command(name = "prospect-annotator")]
#[command(about = "前列腺MRI报告结构化标注工具")]
struct Args {
    /// 报告文件 (.txt)
    report: Option<String>,

    /// 标注命令脚本，缺省时从标准输入读取
    #[arg(short, long)]
    script: Option<String>,

    /// 导出目录
    #[arg(short, long)]
    output_dir: Option<String>,

    /// 导出文件名，缺省时由报告文件名推导
    #[arg(long)]
    output: Option<String>,

    /// 导出格式版本 (v1 / v2)
    #[arg(long)]
    schema: Option<SchemaVersion>,

    /// 配置文件路径
    #[arg(short, long)]
    config: Option<String>,

    /// 日志级别
    #[arg(short, long)]
    log_level: Option<String>,

    /// 打印生效配置后退出
    #[arg(long)]
    print_config: bool,

    /// 只输出到标准输出，不写文件
    #[arg(long)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // 配置载入期间的日志使用临时订阅者，级别只能来自命令行
    let mut config = tracing::subscriber::with_default(bootstrap_subscriber(args.log_level.as_deref()), || {
        AnnotatorConfig::load(args.config.as_deref())
    })?;
    if let Some(schema) = args.schema {
        config.export.schema = schema;
    }
    if let Some(dir) = &args.output_dir {
        config.export.output_dir = dir.clone();
    }
    if let Some(level) = &args.log_level {
        config.logging.level = level.clone();
    }

    // 初始化日志
    tracing_subscriber::fmt()
        .with_env_filter(config.logging.level.as_str())
        .with_writer(std::io::stderr)
        .init();

    if args.print_config {
        print!("{}", config.to_toml()?);
        return Ok(());
    }

    let report_path = args
        .report
        .as_deref()
        .context("缺少报告文件参数")?;

    info!("启动PROSPECT标注工具...");
    info!("  导出格式: {}", config.export.schema);
    info!("  导出目录: {}", config.export.output_dir);

    let mut session = AnnotationSession::new(config.export.schema);
    let report = match ReportLoader::new().load(report_path).await {
        Ok(report) => report,
        Err(e) => {
            error!("报告载入失败: {}", e);
            return Err(anyhow::Error::new(e).context(format!("无法载入报告: {}", report_path)));
        }
    };
    session.load_report(report);

    let script = read_script(args.script.as_deref()).await?;
    let mut failures = 0usize;
    for (index, line) in script.lines().enumerate() {
        let outcome = commands::parse_command(line).and_then(|parsed| match parsed {
            Some(command) => commands::apply(&mut session, command).map(Some),
            None => Ok(None),
        });

        match outcome {
            Ok(Some(message)) => info!("第 {} 行: {}", index + 1, message),
            Ok(None) => {}
            Err(e) => {
                failures += 1;
                warn!("第 {} 行执行失败: {}", index + 1, e);
            }
        }
    }

    let exported = Exporter::new().export(session.record());
    let overview = session.overview();
    info!(
        "标注完成: {} 个病灶, {} 个分区, {} 条失败命令",
        overview.lesion_count, overview.sector_count, failures
    );

    if args.dry_run {
        info!("导出格式 {}，仅输出到标准输出", exported.schema());
        println!("{}", exported.to_json_pretty()?);
        return Ok(());
    }

    let filename = args.output.clone().unwrap_or_else(|| {
        suggested_export_filename(
            session.report().and_then(|r| r.filename.as_deref()),
            &config.export.default_stem,
        )
    });
    let writer = ExportWriter::new(&config.export.output_dir);
    info!(
        "写入 {} 格式导出到 {}",
        exported.schema(),
        writer.output_dir().display()
    );
    let path = writer
        .write(&filename, &exported)
        .await
        .context("导出写入失败")?;

    println!("{}", path.display());
    Ok(())
}

/// 配置尚未载入时使用的日志订阅者
fn bootstrap_subscriber(level: Option<&str>) -> impl tracing::Subscriber + Send + Sync {
    tracing_subscriber::fmt()
        .with_env_filter(level.unwrap_or("info"))
        .with_writer(std::io::stderr)
        .finish()
}

/// 读取命令脚本
async fn read_script(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("无法读取命令脚本: {}", path)),
        None => {
            let mut script = String::new();
            tokio::io::stdin()
                .read_to_string(&mut script)
                .await
                .context("无法读取标准输入")?;
            Ok(script)
        }
    }
}
