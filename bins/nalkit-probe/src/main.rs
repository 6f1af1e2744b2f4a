//! nalkit-probe - HEVC 参数集探测与改写工具
//!
//! 列出 Annex B 码流中每个 NAL 单元的头部与语法元素, 并可原位改写定长字段.

mod edit;
mod logging;
mod report;

use std::path::PathBuf;
use std::process;

use anyhow::{Context, bail};
use clap::Parser;
use log::{info, warn};

use nalkit_codec::parsers::h265::parse_stream;

use edit::{EditSpec, apply_all, parse_edit_spec};
use report::{ProbeOutput, build_nal_unit_info, print_text};

/// HEVC Annex B 参数集探测与改写工具
#[derive(Parser, Debug)]
#[command(name = "nalkit-probe", version, about = "HEVC 参数集探测与改写工具")]
struct Cli {
    /// 输入文件路径 (Annex B 码流)
    input: PathBuf,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 改写字段, 格式 <nal>:<field>=<value>, 可重复
    #[arg(long = "set", value_name = "NAL:FIELD=VALUE", value_parser = parse_edit_spec)]
    edits: Vec<EditSpec>,

    /// 改写后的输出文件
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// 输入文件大小上限 (字节)
    #[arg(long, default_value_t = 256 * 1024 * 1024)]
    max_size: u64,

    /// 日志文件目录, 不指定时不写日志文件
    #[arg(long)]
    log_dir: Option<PathBuf>,

    /// 日志详细程度 (-v: debug, -vv: trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// 静默模式 (只输出探测结果与错误)
    #[arg(short, long)]
    quiet: bool,
}

fn main() {
    let cli = Cli::parse();
    if let Err(e) = logging::init("nalkit-probe", cli.verbose, cli.quiet, cli.log_dir.as_deref()) {
        eprintln!("警告: {e:#}");
    }

    if let Err(e) = run(&cli) {
        eprintln!("错误: {e:#}");
        process::exit(1);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    let input = &cli.input;
    let size = std::fs::metadata(input)
        .with_context(|| format!("无法打开文件 '{}'", input.display()))?
        .len();
    if size > cli.max_size {
        bail!("文件大小 {size} 字节超过上限 {} 字节", cli.max_size);
    }
    let data = std::fs::read(input).with_context(|| format!("无法读取文件 '{}'", input.display()))?;
    info!("读取 {} ({} 字节)", input.display(), data.len());

    if !cli.edits.is_empty() && cli.output.is_none() {
        bail!("使用 --set 时必须指定 --output");
    }
    if cli.edits.is_empty() && cli.output.is_some() {
        warn!("未指定 --set, 输出文件与输入相同");
    }

    let reports = parse_stream(&data);
    let failed = reports
        .iter()
        .filter(|r| r.result.as_ref().map_or(true, |u| u.payload_error.is_some()))
        .count();
    info!("共 {} 个 NAL 单元, {failed} 个未完整解析", reports.len());

    // 有改写时列出改写后的码流
    let (listed, reports) = match &cli.output {
        Some(path) => {
            let out = apply_all(&data, &reports, &cli.edits)?;
            std::fs::write(path, &out)
                .with_context(|| format!("无法写入文件 '{}'", path.display()))?;
            info!("写入 {} ({} 字节)", path.display(), out.len());
            let reports = parse_stream(&out);
            (out, reports)
        }
        None => (data, reports),
    };

    let output = ProbeOutput {
        filename: input.display().to_string(),
        size: listed.len(),
        nb_nal_units: reports.len(),
        nal_units: reports.iter().map(build_nal_unit_info).collect(),
        output: cli.output.as_ref().map(|p| p.display().to_string()),
    };

    if cli.json {
        let json = serde_json::to_string_pretty(&output).context("JSON 序列化失败")?;
        println!("{json}");
    } else {
        print_text(&output);
    }
    Ok(())
}
