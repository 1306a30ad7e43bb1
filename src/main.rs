// ==========================================
// 酒吧库存分析 - 命令行入口
// ==========================================
// 用法:
//   bar-stock-analysis [init|import|analyze|run|export <path>] [--config <file>]
//
// - init:    幂等建表
// - import:  导入库存快照、增量销售、补充鸡尾酒目录
// - analyze: 刷新 poc_analysis 并列出 POTENTIAL ISSUE 行
// - run:     init + import + analyze（默认）
// - export:  把 poc_analysis 导出为 CSV
// ==========================================

use anyhow::{anyhow, bail, Context};
use bar_stock_analysis::config::PipelineConfig;
use bar_stock_analysis::db::{open_shared_connection, SharedConnection};
use bar_stock_analysis::engine::{export_report_csv, RestockAnalysisService};
use bar_stock_analysis::{logging, IngestionPipeline, SchemaInitializer, StockComment};
use std::path::PathBuf;

#[derive(Debug)]
enum Command {
    Init,
    Import,
    Analyze,
    Run,
    Export(Option<PathBuf>),
}

struct CliArgs {
    command: Command,
    config_path: Option<PathBuf>,
}

fn parse_args() -> anyhow::Result<CliArgs> {
    let mut command = None;
    let mut config_path = None;
    let mut positional = Vec::new();

    let mut args = std::env::args().skip(1);
    while let Some(arg) = args.next() {
        if arg == "--config" || arg == "-c" {
            let value = args.next().ok_or_else(|| anyhow!("--config 需要文件路径"))?;
            config_path = Some(PathBuf::from(value));
        } else if arg == "-h" || arg == "--help" {
            print_usage();
            std::process::exit(0);
        } else if command.is_none() {
            command = Some(arg);
        } else {
            positional.push(arg);
        }
    }

    let command = match command.as_deref().unwrap_or("run") {
        "init" => Command::Init,
        "import" => Command::Import,
        "analyze" => Command::Analyze,
        "run" => Command::Run,
        "export" => Command::Export(positional.first().map(PathBuf::from)),
        other => bail!("未知命令: {}", other),
    };

    Ok(CliArgs {
        command,
        config_path,
    })
}

fn print_usage() {
    println!("{} v{}", bar_stock_analysis::APP_NAME, bar_stock_analysis::VERSION);
    println!("用法: bar-stock-analysis [init|import|analyze|run|export <path>] [--config <file>]");
}

fn init_tables(conn: &SharedConnection) -> anyhow::Result<()> {
    let created = SchemaInitializer::new(conn.clone()).ensure_tables()?;
    tracing::info!(created = ?created, "建表检查完成");
    Ok(())
}

fn import(config: &PipelineConfig, conn: &SharedConnection) -> anyhow::Result<()> {
    let report = IngestionPipeline::new(config.clone(), conn.clone())
        .run()
        .context("数据导入失败")?;
    println!(
        "导入完成: bar_stock={} global_sales(+{}) cocktails(+{})",
        report.bar_stock_rows, report.sales.inserted, report.cocktails.inserted
    );
    Ok(())
}

fn analyze(conn: &SharedConnection) -> anyhow::Result<()> {
    let service = RestockAnalysisService::from_connection(conn.clone());
    let outcome = service.refresh().context("报表刷新失败")?;
    let summary = outcome.summary;
    println!(
        "poc_analysis: {} 行 (NO ISSUE={}, POTENTIAL ISSUE={}, 未匹配={})",
        summary.total_rows, summary.no_issue, summary.potential_issue, summary.unclassified
    );

    for row in service.current_report()?.iter().filter(|r| r.is_potential_issue()) {
        println!(
            "{} | {} | {} | {} | {} 杯 / 库存 {} | {}",
            row.day_of_sale,
            row.bar,
            row.drink,
            row.str_glass.as_deref().unwrap_or("-"),
            row.drink_count,
            row.stock.unwrap_or_default(),
            StockComment::PotentialIssue
        );
    }
    Ok(())
}

fn export(
    config: &PipelineConfig,
    conn: &SharedConnection,
    path: Option<PathBuf>,
) -> anyhow::Result<()> {
    let path = path
        .or_else(|| config.report_export_path.clone())
        .ok_or_else(|| anyhow!("export 需要输出路径（参数或配置 report_export_path）"))?;
    let rows = RestockAnalysisService::from_connection(conn.clone()).current_report()?;
    let count = export_report_csv(&rows, &path)
        .with_context(|| format!("导出失败: {}", path.display()))?;
    println!("已导出 {} 行到 {}", count, path.display());
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = parse_args()?;
    let config = PipelineConfig::load(args.config_path.as_deref())?;

    match &config.log_file {
        Some(path) => logging::init_with_file(path)
            .with_context(|| format!("日志初始化失败: {}", path.display()))?,
        None => logging::init(),
    }

    tracing::info!(
        version = bar_stock_analysis::VERSION,
        db_path = %config.db_path,
        command = ?args.command,
        "{} 启动",
        bar_stock_analysis::APP_NAME
    );

    let conn = open_shared_connection(&config.db_path)
        .with_context(|| format!("无法打开数据库: {}", config.db_path))?;

    let result = match args.command {
        Command::Init => init_tables(&conn),
        Command::Import => import(&config, &conn),
        Command::Analyze => analyze(&conn),
        Command::Run => init_tables(&conn)
            .and_then(|_| import(&config, &conn))
            .and_then(|_| analyze(&conn)),
        Command::Export(path) => export(&config, &conn, path),
    };

    if let Err(e) = &result {
        tracing::error!(error = %e, "执行失败");
    }
    result
}
