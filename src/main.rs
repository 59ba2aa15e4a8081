//! Pantry 审计日志回放工具
//!
//! 从标准输入（或文件）逐行读取 JSON 格式的审计操作，按顺序写入审计日志并执行预警规则，
//! 最后输出 CSV 导出或统计结果。

use anyhow::Context;
use clap::{Parser, ValueEnum};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use pantry_audit::{
    config::Settings,
    models::{AuditLogFilter, NewAuditEntry, StatsRange},
    AdminContext,
};

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RangeArg {
    Day,
    Week,
    Month,
}

impl From<RangeArg> for StatsRange {
    fn from(range: RangeArg) -> Self {
        match range {
            RangeArg::Day => StatsRange::Day,
            RangeArg::Week => StatsRange::Week,
            RangeArg::Month => StatsRange::Month,
        }
    }
}

#[derive(Debug, Parser)]
#[command(name = "pantry-audit", about = "回放审计操作并导出审计日志")]
struct Args {
    /// 输入文件（JSON Lines），默认读取标准输入
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// 输出统计结果（JSON）而不是 CSV
    #[arg(long, value_enum)]
    stats: Option<RangeArg>,

    /// 导出前按配置的保留天数清理旧日志
    #[arg(long)]
    sweep: bool,
}

fn main() -> anyhow::Result<()> {
    // 加载环境变量
    dotenvy::dotenv().ok();

    let args = Args::parse();
    let settings = Settings::load().context("配置加载失败")?;

    init_tracing(&settings);
    info!("🌱 Pantry 审计回放启动");

    let context = AdminContext::from_settings(settings).context("服务初始化失败")?;

    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("无法打开输入文件 {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };

    let mut replayed = 0usize;
    let mut alerts = 0usize;
    for (line_no, line) in reader.lines().enumerate() {
        let line = line.context("读取输入失败")?;
        if line.trim().is_empty() {
            continue;
        }
        let entry: NewAuditEntry = match serde_json::from_str(&line) {
            Ok(entry) => entry,
            Err(e) => {
                warn!(line = line_no + 1, error = %e, "跳过无法解析的输入行");
                continue;
            }
        };
        let receipt = context.audit.log_action(entry);
        if receipt.degraded {
            warn!(line = line_no + 1, "审计日志写入降级");
        }
        alerts += receipt.alerts_raised.len();
        replayed += 1;
    }

    info!(replayed = replayed, alerts = alerts, "✅ 回放完成");

    if args.sweep {
        context.audit.sweep_retention();
    }

    let mut stdout = io::stdout().lock();
    match args.stats {
        Some(range) => {
            let stats = context.audit.get_audit_statistics(range.into());
            serde_json::to_writer_pretty(&mut stdout, &stats)?;
            writeln!(stdout)?;
        }
        None => {
            let csv = context.audit.export_audit_logs(&AuditLogFilter::default())?;
            writeln!(stdout, "{}", csv)?;
        }
    }

    Ok(())
}

/// 初始化日志系统（输出到标准错误，避免污染导出内容）
fn init_tracing(settings: &Settings) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!("{},pantry_audit=debug", settings.logging.level))
    });

    let registry = tracing_subscriber::registry().with(env_filter);

    if settings.logging.format == "json" {
        registry
            .with(tracing_subscriber::fmt::layer().json().with_writer(io::stderr))
            .init();
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_target(true).with_writer(io::stderr))
            .init();
    }
}
