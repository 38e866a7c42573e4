//! 样本读取引擎.
//!
//! 各容器解析器只负责把数据区切成传输单元 ([`UnitReader`]), 轨道重组、
//! 预扫描、时间戳换算与读取位置的维护都在这里完成.
//!
//! 读取位置模型: 每次读取样本都从 `next_read` 开始顺序扫描. 每条轨道记录
//! 已消费到的偏移 (`consumed_to`), 低于该偏移的单元直接跳过. 帧完成时
//! `next_read` 推进到 "扫描位置" 与 "未完成帧所在的最早单元" 中较小者,
//! 因此 `next_read` 总是单元边界, 其之前的字节不会再被访问.
//! 数据不足时 `next_read` 不变.

use liu_core::{CodecId, LiuError, LiuResult, MediaType, Rational, TimestampNormalizer};
use log::{debug, trace, warn};

use crate::config::{DemuxConfig, TimestampOrigin};
use crate::elementary::{self, AdtsHeader};
use crate::reassembler::{Chunk, Frame, FrameReassembler, Push, SplitMode};
use crate::sample::{Sample, SampleFlags};
use crate::stream::Stream;
use crate::window::ByteWindow;

/// 同步帧判定时读取的帧头字节数
const SYNC_SCAN_BYTES: usize = 4096;

/// 提取带内参数集时读取的帧头字节数
const CONFIG_SCAN_BYTES: usize = 64 * 1024;

/// 容器解析出的一个传输单元
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Unit {
    /// 属于某条轨道的负载
    Payload { track: usize, chunk: Chunk },
    /// 与样本无关的数据 (表, 元数据, 填充, 未知轨道)
    Skip,
}

/// 读取单元时可访问的轨道信息
///
/// 预扫描阶段解析器可以补全轨道参数; 打开后轨道信息只读.
pub(crate) struct ScanContext<'a> {
    pub streams: &'a mut [Stream],
    pub priming: bool,
}

/// 按绝对偏移解析传输单元, 由各容器实现
pub(crate) trait UnitReader {
    /// 解析 `offset` 处的一个单元, 返回单元及下一个单元的偏移
    ///
    /// 同一偏移可能被多次解析, 实现不得依赖调用次数.
    fn read_unit(
        &mut self,
        window: &mut ByteWindow,
        offset: u64,
        ctx: &mut ScanContext<'_>,
    ) -> LiuResult<(Unit, u64)>;
}

/// 轨道的解析方式
#[derive(Debug, Clone, Copy)]
pub(crate) struct TrackSetup {
    /// 帧切分方式
    pub split: SplitMode,
    /// 原始时间戳计数器位宽
    pub clock_bits: u32,
    /// 按码流内容判定同步帧
    pub detect_sync: bool,
    /// 从首个同步帧中提取私有数据
    pub in_band_config: bool,
}

/// 轨道运行状态
#[derive(Debug)]
struct TrackState {
    setup: TrackSetup,
    reasm: FrameReassembler,
    clock: TimestampNormalizer,
    consumed_to: u64,
    last_cc: Option<u8>,
    discontinuity: bool,
    synced: bool,
    last_dts: Option<i64>,
    /// 预扫描: 收到过数据
    seen: bool,
    /// 预扫描: 已记录起始时间
    started: bool,
    /// 预扫描: 已取得所需信息
    primed: bool,
}

impl TrackState {
    fn new(setup: TrackSetup) -> Self {
        Self {
            setup,
            reasm: FrameReassembler::new(setup.split),
            clock: TimestampNormalizer::new(setup.clock_bits),
            consumed_to: 0,
            last_cc: None,
            discontinuity: false,
            synced: false,
            last_dts: None,
            seen: false,
            started: false,
            primed: false,
        }
    }

    fn reset_runtime(&mut self) {
        self.reasm.reset();
        self.clock.reset();
        self.consumed_to = 0;
        self.last_cc = None;
        self.discontinuity = false;
        self.synced = false;
        self.last_dts = None;
    }

    /// 连续计数器是否跳变, 重复包不算
    fn continuity_gap(&self, cc: u8) -> bool {
        match self.last_cc {
            None => false,
            Some(last) => cc != last && cc != (last + 1) & 0x0F,
        }
    }
}

/// 样本读取引擎
pub(crate) struct Engine {
    config: DemuxConfig,
    streams: Vec<Stream>,
    tracks: Vec<TrackState>,
    /// 数据区起点 (预扫描与 seek(0) 的起点)
    data_start: u64,
    /// 下一次扫描的起点
    next_read: u64,
    /// 扫描到的最远偏移
    scan_high: u64,
    /// 数据源已结束, 正在输出剩余帧
    flushing: bool,
    priming: bool,
    /// 预扫描期间完成的帧数
    primed_frames: usize,
    /// 容器时间零点 (微秒)
    origin_us: i64,
    /// 各轨道时钟共用的起点: 预扫描中首个被采用的原始时间戳
    clock_anchor: Option<u64>,
    current_time: Option<i64>,
}

impl Engine {
    pub fn new(config: DemuxConfig) -> Self {
        Self {
            config,
            streams: Vec::new(),
            tracks: Vec::new(),
            data_start: 0,
            next_read: 0,
            scan_high: 0,
            flushing: false,
            priming: false,
            primed_frames: 0,
            origin_us: 0,
            clock_anchor: None,
            current_time: None,
        }
    }

    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// 添加轨道, 返回其索引
    pub fn add_track(&mut self, mut stream: Stream, setup: TrackSetup) -> usize {
        let index = self.streams.len();
        stream.index = index;
        self.streams.push(stream);
        self.tracks.push(TrackState::new(setup));
        index
    }

    pub fn streams(&self) -> &[Stream] {
        &self.streams
    }

    pub fn next_read(&self) -> u64 {
        self.next_read
    }

    pub fn current_time(&self) -> Option<i64> {
        self.current_time
    }

    /// 容器时间零点 (微秒)
    pub fn origin_us(&self) -> i64 {
        self.origin_us
    }

    /// 清除全部轨道与状态
    pub fn clear(&mut self) {
        self.streams.clear();
        self.tracks.clear();
        self.data_start = 0;
        self.next_read = 0;
        self.scan_high = 0;
        self.flushing = false;
        self.priming = false;
        self.primed_frames = 0;
        self.origin_us = 0;
        self.clock_anchor = None;
        self.current_time = None;
    }

    /// 只保留满足条件的轨道, 返回旧索引到新索引的映射
    pub fn retain_tracks(&mut self, keep: impl Fn(&Stream) -> bool) -> Vec<Option<usize>> {
        let streams = std::mem::take(&mut self.streams);
        let tracks = std::mem::take(&mut self.tracks);
        let mut map = Vec::with_capacity(streams.len());
        for (mut stream, track) in streams.into_iter().zip(tracks) {
            if keep(&stream) {
                map.push(Some(self.streams.len()));
                stream.index = self.streams.len();
                self.streams.push(stream);
                self.tracks.push(track);
            } else {
                debug!("移除轨道 {}: 数据区中未出现", stream.index);
                map.push(None);
            }
        }
        map
    }

    // ========================
    // 预扫描
    // ========================

    /// 开始预扫描
    pub fn begin_priming(&mut self, data_start: u64) {
        self.data_start = data_start;
        self.priming = true;
        self.primed_frames = 0;
        self.clock_anchor = None;
        self.rewind();
    }

    /// 推进预扫描, 完成后回到数据区起点
    pub fn prime<R: UnitReader>(
        &mut self,
        reader: &mut R,
        window: &mut ByteWindow,
    ) -> LiuResult<()> {
        if !self.priming {
            return Ok(());
        }
        loop {
            if self.priming_complete() {
                break;
            }
            if self.scan_high.saturating_sub(self.data_start) > self.config.probe_limit {
                warn!(
                    "预扫描超过 {} 字节仍未取得全部轨道信息, 停止预扫描",
                    self.config.probe_limit
                );
                break;
            }
            match self.pump(reader, window) {
                Ok((idx, frame)) => self.prime_frame(idx, &frame, window)?,
                Err(LiuError::Eof) => {
                    debug!("预扫描到达流末尾");
                    break;
                }
                Err(e) => return Err(e),
            }
        }
        self.finish_priming(window)
    }

    fn priming_complete(&self) -> bool {
        self.tracks.iter().all(|t| {
            t.primed || (!t.seen && self.primed_frames >= self.config.absent_after_frames)
        })
    }

    /// 预扫描中处理一个完成的帧
    fn prime_frame(&mut self, idx: usize, frame: &Frame, window: &ByteWindow) -> LiuResult<()> {
        self.primed_frames += 1;
        if self.tracks[idx].primed || frame.size == 0 {
            return Ok(());
        }
        let sync = self.frame_is_sync(idx, frame, window)?;
        let t = &mut self.tracks[idx];
        let stream = &mut self.streams[idx];
        if stream.media_type == MediaType::Video && self.config.sync_gating && !sync {
            return Ok(());
        }
        if !t.started {
            if let Some(raw) = frame.dts.or(frame.pts) {
                let anchor = *self.clock_anchor.get_or_insert(raw);
                if t.clock.last().is_none() {
                    t.clock.seed(anchor, anchor as i64);
                }
                stream.start_time = t.clock.transfer(raw);
                t.started = true;
                debug!(
                    "轨道 {} ({}) 起始时间 {} ({})",
                    idx, stream.codec_id, stream.start_time, stream.time_base
                );
            }
        }
        if t.setup.in_band_config && stream.extra_data.is_empty() {
            extract_in_band_config(stream, frame, window)?;
        }
        t.primed = t.started
            && (!elementary::needs_config(stream.codec_id) || !stream.extra_data.is_empty());
        Ok(())
    }

    fn finish_priming(&mut self, window: &mut ByteWindow) -> LiuResult<()> {
        self.priming = false;
        for (t, s) in self.tracks.iter().zip(&self.streams) {
            if !t.primed {
                warn!(
                    "轨道 {} ({}) 预扫描未完成: 起始时间{}, 私有数据{}",
                    s.index,
                    s.codec_id,
                    if t.started { "已知" } else { "未知" },
                    if s.extra_data.is_empty() { "缺失" } else { "已取得" },
                );
            }
        }
        self.origin_us = self
            .tracks
            .iter()
            .zip(&self.streams)
            .filter(|(t, _)| t.started)
            .map(|(_, s)| to_micros(s.time_base, s.start_time))
            .min()
            .unwrap_or(0);
        self.rewind();
        window.seek(self.data_start)
    }

    /// 回到数据区起点
    pub fn rewind(&mut self) {
        for t in &mut self.tracks {
            t.reset_runtime();
            if let Some(anchor) = self.clock_anchor {
                t.clock.seed(anchor, anchor as i64);
            }
        }
        self.next_read = self.data_start;
        self.scan_high = self.data_start;
        self.flushing = false;
        self.current_time = None;
    }

    /// 定位到指定时间, 只支持 0 (回到数据区起点)
    pub fn seek(&mut self, window: &mut ByteWindow, time_us: i64) -> LiuResult<()> {
        if time_us != 0 {
            return Err(LiuError::Unsupported(format!(
                "只能定位到开头, 不支持 seek 到 {time_us}us"
            )));
        }
        if self.data_start < window.low() {
            return Err(LiuError::OutOfRange(format!(
                "数据区起点 {} 已被释放 (low={})",
                self.data_start,
                window.low()
            )));
        }
        self.rewind();
        window.seek(self.data_start)?;
        debug!("回到数据区起点 offset={}", self.data_start);
        Ok(())
    }

    // ========================
    // 样本读取
    // ========================

    /// 读取下一个样本
    pub fn next_sample<R: UnitReader>(
        &mut self,
        reader: &mut R,
        window: &mut ByteWindow,
    ) -> LiuResult<Sample> {
        loop {
            let (idx, frame) = self.pump(reader, window)?;
            if let Some(sample) = self.to_sample(idx, frame, window)? {
                return Ok(sample);
            }
        }
    }

    /// 扫描到下一个完成的帧, 读指针停在 `next_read`
    fn pump<R: UnitReader>(
        &mut self,
        reader: &mut R,
        window: &mut ByteWindow,
    ) -> LiuResult<(usize, Frame)> {
        let result = self.pump_inner(reader, window);
        window.seek(self.next_read)?;
        result
    }

    fn pump_inner<R: UnitReader>(
        &mut self,
        reader: &mut R,
        window: &mut ByteWindow,
    ) -> LiuResult<(usize, Frame)> {
        let mut pos = self.next_read;
        loop {
            for idx in 0..self.tracks.len() {
                if let Some(frame) = self.tracks[idx].reasm.poll(window)? {
                    self.commit(pos);
                    return Ok((idx, frame));
                }
            }
            if self.flushing {
                for idx in 0..self.tracks.len() {
                    if let Some(frame) = self.tracks[idx].reasm.flush(window)? {
                        self.commit(pos);
                        return Ok((idx, frame));
                    }
                }
                self.commit(pos);
                return Err(LiuError::Eof);
            }

            let mut ctx = ScanContext {
                streams: &mut self.streams,
                priming: self.priming,
            };
            let (unit, end) = match reader.read_unit(window, pos, &mut ctx) {
                Ok(v) => v,
                Err(LiuError::Eof) => {
                    debug!("数据源结束 (offset={pos}), 输出剩余帧");
                    self.flushing = true;
                    continue;
                }
                Err(e) => return Err(e),
            };
            self.scan_high = self.scan_high.max(end);

            let Unit::Payload { track, chunk } = unit else {
                pos = end;
                continue;
            };
            let Some(t) = self.tracks.get_mut(track) else {
                pos = end;
                continue;
            };
            if pos < t.consumed_to {
                pos = end;
                continue;
            }
            let gap = chunk.continuity.is_some_and(|cc| t.continuity_gap(cc));
            match t.reasm.push(window, pos, &chunk)? {
                // 当前帧已结束, 取出后重新推入该块
                Push::Rewind => continue,
                Push::Pending | Push::Complete | Push::Discarded => {
                    if gap || chunk.discontinuity {
                        debug!("轨道 {track} 在 offset={pos} 处不连续");
                        t.discontinuity = true;
                    }
                    if chunk.continuity.is_some() {
                        t.last_cc = chunk.continuity;
                    }
                    t.consumed_to = end;
                    t.seen = true;
                    pos = end;
                }
            }
        }
    }

    /// 帧完成时推进 `next_read`
    fn commit(&mut self, pos: u64) {
        let pinned = self
            .tracks
            .iter()
            .filter_map(|t| t.reasm.first_unit())
            .min()
            .unwrap_or(u64::MAX);
        self.next_read = pos.min(pinned);
        trace!("next_read={}", self.next_read);
    }

    fn frame_is_sync(&self, idx: usize, frame: &Frame, window: &ByteWindow) -> LiuResult<bool> {
        let stream = &self.streams[idx];
        match stream.media_type {
            MediaType::Video => {
                if !self.tracks[idx].setup.detect_sync {
                    return Ok(frame.key);
                }
                let prefix = window.gather(&frame.ranges, SYNC_SCAN_BYTES)?;
                Ok(frame.key || elementary::is_sync_frame(stream.codec_id, &prefix) == Some(true))
            }
            MediaType::Audio => Ok(true),
            MediaType::Data => Ok(frame.key),
        }
    }

    /// 把完成的帧转换为样本, 被同步门控丢弃时返回 None
    fn to_sample(
        &mut self,
        idx: usize,
        frame: Frame,
        window: &ByteWindow,
    ) -> LiuResult<Option<Sample>> {
        if frame.size == 0 {
            trace!("轨道 {idx} 跳过空帧");
            return Ok(None);
        }
        let sync = self.frame_is_sync(idx, &frame, window)?;
        let stream = &self.streams[idx];
        let t = &mut self.tracks[idx];

        if stream.media_type == MediaType::Video && self.config.sync_gating && !t.synced {
            if !sync {
                debug!("轨道 {idx} 丢弃首个同步帧之前的视频帧 ({} 字节)", frame.size);
                return Ok(None);
            }
        }
        t.synced = true;

        let (dts_ticks, pts_ticks) = match frame.dts.or(frame.pts) {
            Some(raw) => {
                let dts = t.clock.transfer(raw);
                let pts = frame.pts.map_or(dts, |p| t.clock.project(p));
                (dts, pts)
            }
            None => {
                let dts = t.last_dts.unwrap_or(stream.start_time);
                (dts, dts)
            }
        };
        t.last_dts = Some(dts_ticks);

        let dts = match self.config.timestamp_origin {
            TimestampOrigin::Container => to_micros(stream.time_base, dts_ticks) - self.origin_us,
            TimestampOrigin::Track => to_micros(stream.time_base, dts_ticks - stream.start_time),
        };
        let cts = to_micros(stream.time_base, pts_ticks - dts_ticks);

        let mut flags = SampleFlags::empty();
        if sync {
            flags |= SampleFlags::SYNC;
        }
        if std::mem::take(&mut t.discontinuity) {
            flags |= SampleFlags::DISCONTINUITY;
        }
        if frame.truncated {
            flags |= SampleFlags::TRUNCATED;
        }

        let data = window.slices(&frame.ranges)?;
        self.current_time = Some(dts);
        Ok(Some(Sample {
            stream_index: idx,
            dts,
            cts,
            flags,
            size: frame.size,
            ranges: frame.ranges,
            data,
        }))
    }

    /// 按已读比例外推结束时间 (微秒)
    pub fn estimate_end_time(&self, total_size: Option<u64>) -> Option<i64> {
        let current = self.current_time?;
        let total = total_size?.checked_sub(self.data_start)?;
        let read = self.next_read.checked_sub(self.data_start)?;
        if read == 0 || current <= 0 {
            return None;
        }
        Some((i128::from(current) * i128::from(total) / i128::from(read)) as i64)
    }
}

/// 以 `time_base` 为单位的值换算为微秒
pub(crate) fn to_micros(time_base: Rational, value: i64) -> i64 {
    time_base.rescale(value, Rational::MICRO).unwrap_or(0)
}

/// 从帧数据中提取私有数据与编码参数
fn extract_in_band_config(stream: &mut Stream, frame: &Frame, window: &ByteWindow) -> LiuResult<()> {
    let data = window.gather(&frame.ranges, CONFIG_SCAN_BYTES)?;
    let complete = data.len() >= frame.size;
    match stream.codec_id {
        CodecId::Aac => {
            if let Some(header) = AdtsHeader::parse(&data) {
                stream.extra_data = header.audio_specific_config();
                if let Some(audio) = stream.audio_mut() {
                    audio.sample_rate = header.sample_rate();
                    audio.channels = u32::from(header.channel_config);
                }
            }
        }
        CodecId::H264 | CodecId::H265 => {
            stream.extra_data = elementary::parameter_sets(stream.codec_id, &data, complete);
        }
        _ => {}
    }
    if !stream.extra_data.is_empty() {
        debug!(
            "轨道 {} ({}) 取得私有数据 {} 字节",
            stream.index,
            stream.codec_id,
            stream.extra_data.len()
        );
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reassembler::FrameStart;
    use crate::source::PushSource;
    use crate::stream::RawTrack;
    use crate::window::ByteRange;

    /// 测试用容器: 每 10 字节一个单元, 首字节描述单元内容
    ///
    /// 0xA0 | track: 轨道起始块 (帧长 10, 第二字节为时间戳, 第三字节非零为关键帧)
    /// 0xB0 | track: 轨道延续块
    /// 其它: 跳过
    struct FixedUnits;

    const UNIT: u64 = 10;

    impl UnitReader for FixedUnits {
        fn read_unit(
            &mut self,
            window: &mut ByteWindow,
            offset: u64,
            _ctx: &mut ScanContext<'_>,
        ) -> LiuResult<(Unit, u64)> {
            window.fill_to(offset + UNIT)?;
            let mut head = [0u8; 3];
            window.read_at(offset, &mut head)?;
            let track = usize::from(head[0] & 0x0F);
            let range = ByteRange::new(offset + 3, 7);
            let unit = match head[0] & 0xF0 {
                0xA0 => Unit::Payload {
                    track,
                    chunk: Chunk::starting(
                        range,
                        FrameStart {
                            total: Some(14),
                            pts: Some(u64::from(head[1])),
                            dts: Some(u64::from(head[1])),
                            key: head[2] != 0,
                        },
                    ),
                },
                0xB0 => Unit::Payload {
                    track,
                    chunk: Chunk::continuation(range),
                },
                _ => Unit::Skip,
            };
            Ok((unit, offset + UNIT))
        }
    }

    fn unit(kind: u8, ts: u8, key: bool) -> [u8; 10] {
        [kind, ts, u8::from(key), 0, 0, 0, 0, 0, 0, 0]
    }

    fn engine() -> Engine {
        let mut e = Engine::new(DemuxConfig::default());
        let setup = TrackSetup {
            split: SplitMode::Transport,
            clock_bits: 32,
            detect_sync: false,
            in_band_config: false,
        };
        e.add_track(
            Stream::new(0, CodecId::Vp6, Rational::MILLI, RawTrack::Flv { codec_tag: 4 }),
            setup,
        );
        e.add_track(
            Stream::new(1, CodecId::Mp3, Rational::MILLI, RawTrack::Flv { codec_tag: 2 }),
            setup,
        );
        e
    }

    /// 视频帧 (10, 关键帧), 音频帧 (20) 与视频帧 (50) 交织
    fn stream_bytes() -> Vec<u8> {
        [
            unit(0xA0, 10, true),
            unit(0xA1, 20, false),
            unit(0xB0, 0, false),
            unit(0x00, 0, false),
            unit(0xB1, 0, false),
            unit(0xA0, 50, false),
            unit(0xB0, 0, false),
        ]
        .concat()
    }

    #[test]
    fn test_按完成顺序输出样本() {
        let mut e = engine();
        let mut w = ByteWindow::from_bytes(stream_bytes());
        e.begin_priming(0);
        e.prime(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(e.streams()[0].start_time, 10);
        assert_eq!(e.streams()[1].start_time, 20);
        assert_eq!(w.position(), 0);

        let s0 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(s0.stream_index, 0);
        assert_eq!(s0.dts, 0);
        assert!(s0.is_sync());
        assert_eq!(s0.ranges, vec![ByteRange::new(3, 7), ByteRange::new(23, 7)]);
        // 音频帧仍未完成, next_read 停在其起点
        assert_eq!(e.next_read(), 10);
        assert_eq!(w.position(), 10);

        let s1 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(s1.stream_index, 1);
        assert_eq!(s1.dts, 10_000);
        assert_eq!(e.next_read(), 50);

        let s2 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(s2.dts, 40_000);
        assert!(!s2.is_sync());
        assert!(matches!(
            e.next_sample(&mut FixedUnits, &mut w),
            Err(LiuError::Eof)
        ));
        assert_eq!(e.current_time(), Some(40_000));
    }

    #[test]
    fn test_数据不足时读取位置不变() {
        let mut e = engine();
        let (src, handle) = PushSource::new();
        let mut w = ByteWindow::new(src);
        let bytes = stream_bytes();
        handle.push(bytes[..30].to_vec()).unwrap();
        e.begin_priming(0);
        assert!(matches!(
            e.prime(&mut FixedUnits, &mut w),
            Err(LiuError::NeedMoreData)
        ));
        handle.push(bytes[30..].to_vec()).unwrap();
        handle.finish().unwrap();
        e.prime(&mut FixedUnits, &mut w).unwrap();

        // 预扫描结束后回到开头读取
        let s0 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(s0.stream_index, 0);
        let before = e.next_read();
        let s1 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(s1.stream_index, 1);
        assert!(e.next_read() >= before);
    }

    #[test]
    fn test_同步门控丢弃前导非关键帧() {
        let bytes = [
            unit(0xA0, 5, false),
            unit(0xB0, 0, false),
            unit(0xA0, 10, true),
            unit(0xB0, 0, false),
        ]
        .concat();
        let mut e = engine();
        e.retain_tracks(|s| s.index == 0);
        let mut w = ByteWindow::from_bytes(bytes);
        e.begin_priming(0);
        e.prime(&mut FixedUnits, &mut w).unwrap();
        assert_eq!(e.streams()[0].start_time, 10);

        let s = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert!(s.is_sync());
        assert_eq!(s.dts, 0);
        assert!(matches!(
            e.next_sample(&mut FixedUnits, &mut w),
            Err(LiuError::Eof)
        ));
    }

    #[test]
    fn test_轨道零点() {
        let mut cfg = DemuxConfig::default();
        cfg.timestamp_origin = TimestampOrigin::Track;
        let mut e = engine();
        e.config = cfg;
        let mut w = ByteWindow::from_bytes(stream_bytes());
        e.begin_priming(0);
        e.prime(&mut FixedUnits, &mut w).unwrap();
        let s0 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        let s1 = e.next_sample(&mut FixedUnits, &mut w).unwrap();
        assert_eq!((s0.dts, s1.dts), (0, 0));
    }

    #[test]
    fn test_移除轨道返回索引映射() {
        let mut e = engine();
        let map = e.retain_tracks(|s| s.codec_id == CodecId::Mp3);
        assert_eq!(map, vec![None, Some(0)]);
        assert_eq!(e.streams()[0].index, 0);
        assert_eq!(e.streams()[0].codec_id, CodecId::Mp3);
    }

    #[test]
    fn test_外推结束时间() {
        let mut e = engine();
        e.current_time = Some(2_000_000);
        e.next_read = 1_000;
        assert_eq!(e.estimate_end_time(Some(5_000)), Some(10_000_000));
        assert_eq!(e.estimate_end_time(None), None);
    }
}
