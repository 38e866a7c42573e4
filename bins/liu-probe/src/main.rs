//! liu-probe - 流式解封装探测工具
//!
//! 把输入文件按固定大小的分块推入解封装器, 模拟网络流到达的方式,
//! 输出容器格式, 轨道信息与样本统计.

use anyhow::{Context, Result, bail};
use clap::{ArgAction, Parser};
use log::{debug, warn};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::process;

use liu::logging::LoggingConfig;
use liu_core::LiuError;
use liu_format::stream::{AudioStreamParams, StreamParams, VideoStreamParams};
use liu_format::{ByteWindow, DemuxConfig, Demuxer, PushHandle, PushSource, Sample, Stream};

/// Liu 流式解封装探测工具
#[derive(Parser, Debug)]
#[command(name = "liu-probe", version, about = "纯 Rust 流式解封装探测工具")]
struct Cli {
    /// 输入文件路径
    input: PathBuf,

    /// 每次推入的字节数
    #[arg(long, default_value_t = 64 * 1024)]
    chunk_size: usize,

    /// 列出每个样本
    #[arg(long)]
    show_samples: bool,

    /// 输出 JSON 格式
    #[arg(long)]
    json: bool,

    /// 配置文件 (JSON, 包含 `demux` 与可选的 `logging` 两节)
    #[arg(long)]
    config: Option<PathBuf>,

    /// 日志详细程度 (-v: info, -vv: debug, -vvv: trace)
    #[arg(short, action = ArgAction::Count)]
    verbose: u8,
}

/// 配置文件
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct ProbeConfig {
    demux: DemuxConfig,
    logging: Option<LoggingConfig>,
}

// ========================
// 输出结构
// ========================

#[derive(Serialize)]
struct ProbeOutput {
    format: FormatInfo,
    streams: Vec<StreamInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    samples: Option<Vec<SampleInfo>>,
}

#[derive(Serialize)]
struct FormatInfo {
    filename: String,
    format_name: String,
    probe_score: u32,
    nb_streams: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    end_time: Option<f64>,
    total_samples: u64,
    total_bytes: u64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    metadata: Vec<(String, String)>,
}

#[derive(Serialize)]
struct StreamInfo {
    index: usize,
    codec_type: String,
    codec_name: String,
    time_base: String,
    start_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    duration: Option<f64>,
    extra_data_size: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    width: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    height: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    frame_rate: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sample_rate: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    channels: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    bit_rate: Option<u64>,
    nb_samples: u64,
}

#[derive(Serialize)]
struct SampleInfo {
    stream_index: usize,
    dts_us: i64,
    pts_us: i64,
    size: usize,
    offset: u64,
    flags: String,
}

// ========================
// 分块喂入
// ========================

/// 从文件读取分块推入数据源
struct Feeder {
    file: File,
    handle: PushHandle,
    buf: Vec<u8>,
    finished: bool,
    pushes: u64,
}

impl Feeder {
    fn new(file: File, handle: PushHandle, chunk_size: usize) -> Self {
        Self {
            file,
            handle,
            buf: vec![0u8; chunk_size.max(1)],
            finished: false,
            pushes: 0,
        }
    }

    /// 推入下一块, 文件结束时标记数据源结束
    fn feed(&mut self) -> Result<()> {
        if self.finished {
            bail!("数据源已结束, 解封装器仍需要更多数据");
        }
        let n = self.file.read(&mut self.buf).context("读取输入文件失败")?;
        if n == 0 {
            debug!("输入结束, 共推入 {} 块", self.pushes);
            self.handle.finish()?;
            self.finished = true;
        } else {
            self.handle.push(self.buf[..n].to_vec())?;
            self.pushes += 1;
        }
        Ok(())
    }
}

// ========================
// 主流程
// ========================

fn main() {
    let cli = Cli::parse();
    let config = match load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("错误: {e:#}");
            process::exit(2);
        }
    };
    if let Err(e) = init_logging(&cli, &config) {
        eprintln!("警告: 日志初始化失败: {e:#}");
    }

    match run(&cli, config.demux) {
        Ok(output) => {
            if cli.json {
                match serde_json::to_string_pretty(&output) {
                    Ok(json) => println!("{json}"),
                    Err(e) => {
                        eprintln!("错误: JSON 序列化失败: {e}");
                        process::exit(1);
                    }
                }
            } else {
                print_text(&output);
            }
        }
        Err(e) => {
            eprintln!("错误: {e:#}");
            process::exit(1);
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<ProbeConfig> {
    let Some(path) = path else {
        return Ok(ProbeConfig::default());
    };
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("读取配置文件失败, path={}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("解析配置文件失败, path={}", path.display()))
}

/// 有 `logging` 配置时写日志文件, 否则只输出到控制台
fn init_logging(cli: &Cli, config: &ProbeConfig) -> Result<()> {
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    match &config.logging {
        Some(logging) => {
            let mut logging = logging.clone();
            if cli.verbose > 0 {
                logging.console_level = level.to_string();
            }
            liu::logging::init(logging.with_env_override())
        }
        None => {
            env_logger::Builder::from_env(
                env_logger::Env::new().filter_or(liu::logging::LOG_ENV, level),
            )
            .try_init()
            .context("控制台日志初始化失败")
        }
    }
}

/// 在需要数据时推入下一块, 直到操作完成
fn drive<T>(feeder: &mut Feeder, mut op: impl FnMut() -> Result<T, LiuError>) -> Result<T> {
    loop {
        match op() {
            Err(LiuError::NeedMoreData) => feeder.feed()?,
            other => return Ok(other?),
        }
    }
}

fn run(cli: &Cli, demux_config: DemuxConfig) -> Result<ProbeOutput> {
    let file = File::open(&cli.input)
        .with_context(|| format!("无法打开文件 '{}'", cli.input.display()))?;
    let filename = cli.input.to_string_lossy().to_string();

    let (source, handle) = PushSource::new();
    let mut feeder = Feeder::new(file, handle, cli.chunk_size);
    let mut window = ByteWindow::new(source);

    let mut registry = liu::default_format_registry();
    registry.set_config(demux_config);

    let probe = drive(&mut feeder, || registry.probe_window(&mut window, Some(&filename)))
        .context("无法识别输入格式")?;
    debug!("格式: {} (置信度 {})", probe.format_id, probe.score);
    let mut demuxer = registry.create(probe.format_id, window)?;

    drive(&mut feeder, || demuxer.open()).context("无法解析容器头部")?;

    let mut counts = vec![0u64; demuxer.track_count()];
    let mut samples = cli.show_samples.then(Vec::new);
    let mut total_bytes = 0u64;
    loop {
        let sample = match drive(&mut feeder, || demuxer.get_sample()) {
            Ok(sample) => sample,
            Err(e) => match e.downcast_ref::<LiuError>() {
                Some(LiuError::Eof) => break,
                _ => {
                    warn!("读取样本时出错: {e:#}");
                    break;
                }
            },
        };
        if let Some(count) = counts.get_mut(sample.stream_index) {
            *count += 1;
        }
        total_bytes += sample.size as u64;
        if let Some(list) = samples.as_mut() {
            list.push(sample_info(&sample));
        }
        demuxer.window_mut().drop_consumed();
    }

    let streams = demuxer
        .streams()
        .iter()
        .map(|s| build_stream_info(s, counts.get(s.index).copied().unwrap_or(0)))
        .collect::<Vec<_>>();
    let format = FormatInfo {
        filename,
        format_name: demuxer.name().to_string(),
        probe_score: probe.score,
        nb_streams: streams.len(),
        end_time: demuxer.end_time().map(|us| us as f64 / 1_000_000.0),
        total_samples: counts.iter().sum(),
        total_bytes,
        metadata: demuxer.metadata().to_vec(),
    };
    demuxer.close()?;

    Ok(ProbeOutput {
        format,
        streams,
        samples,
    })
}

fn sample_info(sample: &Sample) -> SampleInfo {
    let mut flags = String::new();
    flags.push(if sample.is_sync() { 'K' } else { '_' });
    flags.push(if sample.flags.contains(liu_format::SampleFlags::DISCONTINUITY) { 'D' } else { '_' });
    flags.push(if sample.flags.contains(liu_format::SampleFlags::TRUNCATED) { 'T' } else { '_' });
    SampleInfo {
        stream_index: sample.stream_index,
        dts_us: sample.dts,
        pts_us: sample.pts(),
        size: sample.size,
        offset: sample.ranges.first().map_or(0, |r| r.offset),
        flags,
    }
}

fn build_stream_info(stream: &Stream, nb_samples: u64) -> StreamInfo {
    let positive = |v: u32| (v > 0).then_some(v);
    let (width, height, frame_rate, sample_rate, channels, bit_rate) = match &stream.params {
        StreamParams::Video(VideoStreamParams {
            width,
            height,
            frame_rate,
            bit_rate,
        }) => {
            let sized = *width > 0 && *height > 0;
            let rate = (frame_rate.is_valid() && frame_rate.num > 0).then(|| frame_rate.to_string());
            (
                sized.then_some(*width),
                sized.then_some(*height),
                rate,
                None,
                None,
                *bit_rate,
            )
        }
        StreamParams::Audio(AudioStreamParams {
            sample_rate,
            channels,
            bit_rate,
            ..
        }) => (None, None, None, positive(*sample_rate), positive(*channels), *bit_rate),
        StreamParams::Other => (None, None, None, None, None, 0),
    };

    StreamInfo {
        index: stream.index,
        codec_type: stream.media_type.name().to_string(),
        codec_name: stream.codec_id.to_string(),
        time_base: stream.time_base.to_string(),
        start_time: stream.start_time,
        duration: (stream.duration > 0 && stream.time_base.is_valid())
            .then(|| stream.duration as f64 * stream.time_base.to_f64()),
        extra_data_size: stream.extra_data.len(),
        width,
        height,
        frame_rate,
        sample_rate,
        channels,
        bit_rate: (bit_rate > 0).then_some(bit_rate),
        nb_samples,
    }
}

/// 输出一行 `标签: 值`, 标签按显示宽度对齐
fn row(label: &str, value: impl std::fmt::Display) {
    // 中文字符按两列计算
    let width: usize = label.chars().map(|c| if c.is_ascii() { 1 } else { 2 }).sum();
    let pad = 14usize.saturating_sub(width);
    println!("  {label}{:pad$}: {value}", "");
}

fn print_text(output: &ProbeOutput) {
    let format = &output.format;
    println!("[{}]", format.format_name);
    row("文件", &format.filename);
    row("探测置信度", format.probe_score);
    row("轨道数", format.nb_streams);
    if let Some(end) = format.end_time {
        row("结束时间", format_args!("{end:.3} 秒"));
    }
    row("样本", format_args!("{} 个, 共 {} 字节", format.total_samples, format.total_bytes));
    for (key, value) in &format.metadata {
        row(key, value);
    }
    println!();

    for track in &output.streams {
        println!("[轨道 #{}] {} {}", track.index, track.codec_type, track.codec_name);
        row("时间基", &track.time_base);
        row("起始时间", track.start_time);
        if let Some(dur) = track.duration {
            row("时长", format_args!("{dur:.3} 秒"));
        }
        row("私有数据", format_args!("{} 字节", track.extra_data_size));
        if let (Some(w), Some(h)) = (track.width, track.height) {
            row("分辨率", format_args!("{w}x{h}"));
        }
        if let Some(fr) = &track.frame_rate {
            row("帧率", fr);
        }
        if let Some(sr) = track.sample_rate {
            row("采样率", format_args!("{sr} Hz"));
        }
        if let Some(ch) = track.channels {
            row("声道", ch);
        }
        if let Some(br) = track.bit_rate {
            row("码率", format_args!("{} kbps", br / 1000));
        }
        row("样本数", track.nb_samples);
        println!();
    }

    if let Some(samples) = &output.samples {
        println!("[样本]");
        for s in samples {
            println!(
                "  #{} dts={:>12} pts={:>12} size={:>8} offset={:>10} {}",
                s.stream_index, s.dts_us, s.pts_us, s.size, s.offset, s.flags
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_配置文件_部分覆盖() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"demux":{{"sync_gating":false}}}}"#).unwrap();
        let config = load_config(Some(file.path())).unwrap();
        assert!(!config.demux.sync_gating);
        assert!(config.logging.is_none());
        assert_eq!(config.demux.probe_limit, DemuxConfig::default().probe_limit);
    }

    #[test]
    fn test_分块喂入到结束() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(&[1u8; 10]).unwrap();
        let (_source, handle) = PushSource::new();
        let mut feeder = Feeder::new(File::open(file.path()).unwrap(), handle.clone(), 4);
        for _ in 0..3 {
            feeder.feed().unwrap();
        }
        assert_eq!(handle.pushed(), 10);
        feeder.feed().unwrap();
        assert!(feeder.finished);
        assert!(feeder.feed().is_err());
    }
}
