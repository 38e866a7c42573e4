//! FLV (Flash Video) 容器解封装器.
//!
//! FLV 是 Adobe Flash 使用的视频容器格式, 至今仍广泛用于直播推流 (RTMP).
//!
//! # FLV 文件结构
//! ```text
//! FLV Header (9 bytes):
//!   "FLV" (3 bytes)
//!   Version (1 byte, 通常 = 1)
//!   Flags (1 byte): bit0=video, bit2=audio
//!   DataOffset (4 bytes, BE): 头部大小 (通常 9)
//!
//! PreviousTagSize0 (4 bytes, BE): 0
//!
//! FLV Tag #1:
//!   TagType (1 byte): 8=Audio, 9=Video, 18=Script
//!   DataSize (3 bytes, BE)
//!   Timestamp (3 bytes, BE) + TimestampExtended (1 byte, 高8位)
//!   StreamID (3 bytes, BE): always 0
//!   TagData (DataSize bytes)
//! PreviousTagSize1 (4 bytes, BE)
//! ```
//!
//! # 音频 Tag 数据
//! ```text
//! SoundFormat (4 bits): 10=AAC, 2=MP3, 14=MP3-8kHz, ...
//! SoundRate (2 bits): 0=5.5kHz, 1=11kHz, 2=22kHz, 3=44kHz
//! SoundSize (1 bit): 0=8bit, 1=16bit
//! SoundType (1 bit): 0=mono, 1=stereo
//! [AAC: AACPacketType (1 byte): 0=Sequence Header, 1=Raw]
//! ```
//!
//! # 视频 Tag 数据
//! ```text
//! FrameType (4 bits): 1=keyframe, 2=inter, 5=info/command
//! CodecID (4 bits): 7=AVC(H.264), 12=HEVC(H.265), 13=AV1
//! [AVC: AVCPacketType (1 byte): 0=SeqHeader, 1=NALU, 2=EndOfSeq]
//! [AVC: CompositionTimeOffset (3 bytes, BE, signed)]
//! ```
//!
//! 每个 tag 是一个传输单元, 也恰好是一帧. 轨道按头部标志预先建立,
//! 编解码器在预扫描中由首个 tag 确定, 预扫描结束时仍未出现的轨道被移除.

use byteorder::{BigEndian, ByteOrder};
use liu_core::{CodecId, LiuError, LiuResult, Rational};
use log::{debug, trace, warn};

use super::amf::{self, AmfValue};
use crate::config::DemuxConfig;
use crate::demuxer::{Demuxer, OpenState};
use crate::elementary;
use crate::engine::{Engine, ScanContext, TrackSetup, Unit, UnitReader};
use crate::format_id::FormatId;
use crate::probe::{FormatProbe, ProbeScore, SCORE_MAX, score_by_extension};
use crate::reassembler::{Chunk, FrameStart, SplitMode};
use crate::sample::Sample;
use crate::stream::{RawTrack, Stream};
use crate::window::{ByteRange, ByteWindow};

/// FLV 头部大小
const FLV_HEADER_SIZE: usize = 9;
/// Tag 头部大小
const TAG_HEADER_SIZE: usize = 11;
/// PreviousTagSize 字段大小
const BACK_POINTER_SIZE: u64 = 4;
/// FLV 时间戳位宽
const FLV_CLOCK_BITS: u32 = 32;

/// FLV Tag 类型
const TAG_AUDIO: u8 = 8;
const TAG_VIDEO: u8 = 9;
const TAG_SCRIPT: u8 = 18;

/// FLV 视频编解码器 ID
const FLV_CODEC_H263: u8 = 2;
const FLV_CODEC_VP6: u8 = 4;
const FLV_CODEC_VP6A: u8 = 5;
const FLV_CODEC_AVC: u8 = 7;
const FLV_CODEC_HEVC: u8 = 12;
const FLV_CODEC_AV1: u8 = 13;

/// FLV 音频编解码器 ID (SoundFormat)
const FLV_AUDIO_PCM: u8 = 0;
const FLV_AUDIO_MP3: u8 = 2;
const FLV_AUDIO_PCM_LE: u8 = 3;
const FLV_AUDIO_AAC: u8 = 10;
const FLV_AUDIO_SPEEX: u8 = 11;
const FLV_AUDIO_MP3_8K: u8 = 14;

/// 视频 FrameType
const FRAME_KEY: u8 = 1;
const FRAME_COMMAND: u8 = 5;

/// AVCPacketType / AACPacketType
const PACKET_SEQUENCE_HEADER: u8 = 0;
const PACKET_END_OF_SEQUENCE: u8 = 2;

fn video_codec(codec_tag: u8) -> CodecId {
    match codec_tag {
        FLV_CODEC_H263 => CodecId::FlvH263,
        FLV_CODEC_VP6 | FLV_CODEC_VP6A => CodecId::Vp6,
        FLV_CODEC_AVC => CodecId::H264,
        FLV_CODEC_HEVC => CodecId::H265,
        FLV_CODEC_AV1 => CodecId::Av1,
        _ => CodecId::None,
    }
}

fn audio_codec(sound_format: u8) -> CodecId {
    match sound_format {
        FLV_AUDIO_AAC => CodecId::Aac,
        FLV_AUDIO_MP3 | FLV_AUDIO_MP3_8K => CodecId::Mp3,
        FLV_AUDIO_SPEEX => CodecId::Speex,
        FLV_AUDIO_PCM | FLV_AUDIO_PCM_LE => CodecId::PcmS16le,
        _ => CodecId::None,
    }
}

/// 视频 tag 中编码数据之前的字节数
fn video_header_len(codec_tag: u8) -> usize {
    match codec_tag {
        // FrameType/CodecID + PacketType + CompositionTime
        FLV_CODEC_AVC | FLV_CODEC_HEVC | FLV_CODEC_AV1 => 5,
        // 尺寸调整字节
        FLV_CODEC_VP6 => 2,
        // 尺寸调整 + alpha 偏移
        FLV_CODEC_VP6A => 5,
        _ => 1,
    }
}

/// 有符号 24 位大端整数
fn read_si24(data: &[u8]) -> i32 {
    let v = BigEndian::read_u24(data) as i32;
    if v & 0x80_0000 != 0 { v - 0x100_0000 } else { v }
}

/// Tag 头部
#[derive(Debug, Clone, Copy)]
struct TagHeader {
    /// 最高两位保留, 须为 0
    reserved: u8,
    tag_type: u8,
    encrypted: bool,
    data_size: usize,
    timestamp: u32,
}

impl TagHeader {
    fn parse(head: &[u8; TAG_HEADER_SIZE]) -> Self {
        let timestamp = BigEndian::read_u24(&head[4..7]) | (u32::from(head[7]) << 24);
        Self {
            reserved: head[0] >> 6,
            tag_type: head[0] & 0x1F,
            encrypted: head[0] & 0x20 != 0,
            data_size: BigEndian::read_u24(&head[1..4]) as usize,
            timestamp,
        }
    }
}

// ========================
// 传输单元
// ========================

/// 按 tag 切分数据区
#[derive(Debug, Default)]
struct FlvReader {
    /// 视频轨道索引
    video: Option<usize>,
    /// 音频轨道索引
    audio: Option<usize>,
    /// onMetaData 中的标量属性
    metadata: Vec<(String, String)>,
    /// onMetaData 中的时长 (秒)
    duration: Option<f64>,
}

impl FlvReader {
    /// 轨道被移除后更新索引
    fn remap(&mut self, map: &[Option<usize>]) {
        self.video = self.video.and_then(|i| map.get(i).copied().flatten());
        self.audio = self.audio.and_then(|i| map.get(i).copied().flatten());
    }

    fn audio_unit(
        &mut self,
        window: &ByteWindow,
        tag: &TagHeader,
        body: u64,
        ctx: &mut ScanContext<'_>,
    ) -> LiuResult<Unit> {
        let Some(track) = self.audio else {
            trace!("FLV: 头部未声明音频, 跳过音频 tag (offset={body})");
            return Ok(Unit::Skip);
        };
        let flags = window.u8_at(body)?;
        let sound_format = flags >> 4;
        let mut header_len = 1;

        if ctx.priming {
            let stream = &mut ctx.streams[track];
            if stream.codec_id == CodecId::None {
                let codec_id = audio_codec(sound_format);
                debug!("FLV: 音频 SoundFormat={sound_format} codec={codec_id}");
                stream.set_codec(codec_id);
                stream.raw = RawTrack::Flv {
                    codec_tag: sound_format,
                };
                if let Some(audio) = stream.audio_mut() {
                    audio.sample_rate = match (flags >> 2) & 0x03 {
                        0 => 5512,
                        1 => 11025,
                        2 => 22050,
                        _ => 44100,
                    };
                    audio.bits_per_sample = if flags & 0x02 != 0 { 16 } else { 8 };
                    audio.channels = if flags & 0x01 != 0 { 2 } else { 1 };
                }
            }
        }

        if sound_format == FLV_AUDIO_AAC {
            if tag.data_size < 2 {
                return Ok(Unit::Skip);
            }
            header_len = 2;
            if window.u8_at(body + 1)? == PACKET_SEQUENCE_HEADER {
                if ctx.priming && ctx.streams[track].extra_data.is_empty() {
                    let config = window.bytes_at(body + 2, tag.data_size - 2)?;
                    debug!("FLV: 收到 AAC sequence header, {} 字节", config.len());
                    let stream = &mut ctx.streams[track];
                    stream.extra_data = config.to_vec();
                    if let Some((sample_rate, channels)) =
                        elementary::parse_audio_specific_config(&config)
                    {
                        if let Some(audio) = stream.audio_mut() {
                            audio.sample_rate = sample_rate;
                            audio.channels = u32::from(channels);
                        }
                    }
                }
                return Ok(Unit::Skip);
            }
        }

        let ts = u64::from(tag.timestamp);
        Ok(Unit::Payload {
            track,
            chunk: frame_chunk(body, header_len, tag.data_size, ts, ts, true),
        })
    }

    fn video_unit(
        &mut self,
        window: &ByteWindow,
        tag: &TagHeader,
        body: u64,
        ctx: &mut ScanContext<'_>,
    ) -> LiuResult<Unit> {
        let Some(track) = self.video else {
            trace!("FLV: 头部未声明视频, 跳过视频 tag (offset={body})");
            return Ok(Unit::Skip);
        };
        let flags = window.u8_at(body)?;
        let frame_type = flags >> 4;
        let codec_tag = flags & 0x0F;
        if frame_type == FRAME_COMMAND {
            trace!("FLV: 跳过视频信息帧 (offset={body})");
            return Ok(Unit::Skip);
        }

        if ctx.priming && ctx.streams[track].codec_id == CodecId::None {
            let codec_id = video_codec(codec_tag);
            debug!("FLV: 视频 CodecID={codec_tag} codec={codec_id}");
            let stream = &mut ctx.streams[track];
            stream.set_codec(codec_id);
            stream.raw = RawTrack::Flv { codec_tag };
        }

        let header_len = video_header_len(codec_tag);
        if tag.data_size < header_len {
            return Ok(Unit::Skip);
        }
        let dts = tag.timestamp;
        let mut pts = dts;
        if matches!(codec_tag, FLV_CODEC_AVC | FLV_CODEC_HEVC | FLV_CODEC_AV1) {
            let mut head = [0u8; 4];
            window.read_at(body + 1, &mut head)?;
            match head[0] {
                PACKET_SEQUENCE_HEADER => {
                    if ctx.priming && ctx.streams[track].extra_data.is_empty() {
                        let config = window.bytes_at(body + 5, tag.data_size - 5)?;
                        debug!("FLV: 收到视频 sequence header, {} 字节", config.len());
                        ctx.streams[track].extra_data = config.to_vec();
                    }
                    return Ok(Unit::Skip);
                }
                PACKET_END_OF_SEQUENCE => return Ok(Unit::Skip),
                _ => {}
            }
            pts = dts.wrapping_add_signed(read_si24(&head[1..4]));
        }

        Ok(Unit::Payload {
            track,
            chunk: frame_chunk(
                body,
                header_len,
                tag.data_size,
                u64::from(pts),
                u64::from(dts),
                frame_type == FRAME_KEY,
            ),
        })
    }

    /// 解析 onMetaData, 只在预扫描阶段更新轨道参数
    fn script_unit(
        &mut self,
        window: &ByteWindow,
        tag: &TagHeader,
        body: u64,
        ctx: &mut ScanContext<'_>,
    ) -> LiuResult<Unit> {
        if !ctx.priming {
            return Ok(Unit::Skip);
        }
        let data = window.bytes_at(body, tag.data_size)?;
        match amf::parse_script_data(&data) {
            Ok((name, value)) if name == "onMetaData" => self.apply_metadata(&value, ctx),
            Ok((name, _)) => debug!("FLV: 忽略脚本 tag {name}"),
            Err(e) => warn!("FLV: 脚本 tag 解析失败 (offset={body}): {e}"),
        }
        Ok(Unit::Skip)
    }

    fn apply_metadata(&mut self, value: &AmfValue, ctx: &mut ScanContext<'_>) {
        let Some(props) = value.properties() else {
            warn!("FLV: onMetaData 参数不是对象");
            return;
        };
        self.metadata = props
            .iter()
            .filter_map(|(k, v)| v.to_text().map(|text| (k.clone(), text)))
            .collect();
        let number = |key: &str| {
            value
                .get(key)
                .and_then(AmfValue::as_f64)
                .filter(|v| v.is_finite() && *v > 0.0)
        };

        self.duration = number("duration");
        if let Some(duration) = self.duration {
            debug!("FLV: onMetaData duration={duration}s");
            let ms = (duration * 1000.0) as i64;
            for stream in ctx.streams.iter_mut() {
                stream.duration = ms;
            }
        }
        if let Some(video) = self.video.and_then(|i| ctx.streams.get_mut(i)) {
            if let Some(params) = video.video_mut() {
                if let Some(w) = number("width") {
                    params.width = w as u32;
                }
                if let Some(h) = number("height") {
                    params.height = h as u32;
                }
                if let Some(fps) = number("framerate") {
                    params.frame_rate = Rational::new((fps * 1000.0).round() as i32, 1000);
                }
                if let Some(kbps) = number("videodatarate") {
                    params.bit_rate = (kbps * 1000.0) as u64;
                }
            }
        }
        if let Some(audio) = self.audio.and_then(|i| ctx.streams.get_mut(i)) {
            if let Some(params) = audio.audio_mut() {
                if let Some(rate) = number("audiosamplerate") {
                    params.sample_rate = rate as u32;
                }
                if let Some(stereo) = value.get("stereo").and_then(AmfValue::as_bool) {
                    params.channels = if stereo { 2 } else { 1 };
                }
                if let Some(kbps) = number("audiodatarate") {
                    params.bit_rate = (kbps * 1000.0) as u64;
                }
            }
        }
    }
}

/// 整个 tag 负载即一帧
fn frame_chunk(body: u64, header_len: usize, data_size: usize, pts: u64, dts: u64, key: bool) -> Chunk {
    let len = data_size - header_len;
    Chunk::starting(
        ByteRange::new(body + header_len as u64, len),
        FrameStart {
            total: Some(len),
            pts: Some(pts),
            dts: Some(dts),
            key,
        },
    )
}

impl UnitReader for FlvReader {
    fn read_unit(
        &mut self,
        window: &mut ByteWindow,
        offset: u64,
        ctx: &mut ScanContext<'_>,
    ) -> LiuResult<(Unit, u64)> {
        window.fill_to(offset + TAG_HEADER_SIZE as u64)?;
        let mut head = [0u8; TAG_HEADER_SIZE];
        window.read_at(offset, &mut head)?;
        let tag = TagHeader::parse(&head);
        if tag.reserved != 0 {
            return Err(LiuError::InvalidData(format!(
                "FLV tag 头部保留位非零: {:#04X} (offset={offset})",
                head[0]
            )));
        }
        let body = offset + TAG_HEADER_SIZE as u64;
        // 最后一个 tag 之后的 PreviousTagSize 可以缺失
        window.fill_to(body + tag.data_size as u64)?;
        let next = body + tag.data_size as u64 + BACK_POINTER_SIZE;

        if tag.data_size == 0 {
            return Ok((Unit::Skip, next));
        }
        if tag.encrypted {
            debug!("FLV: 跳过加密 tag (offset={offset})");
            return Ok((Unit::Skip, next));
        }
        let unit = match tag.tag_type {
            TAG_AUDIO => self.audio_unit(window, &tag, body, ctx)?,
            TAG_VIDEO => self.video_unit(window, &tag, body, ctx)?,
            TAG_SCRIPT => self.script_unit(window, &tag, body, ctx)?,
            other => {
                debug!("FLV: 跳过未知 tag 类型 {other} (offset={offset})");
                Unit::Skip
            }
        };
        Ok((unit, next))
    }
}

// ========================
// 解封装器
// ========================

/// FLV 解封装器
pub struct FlvDemuxer {
    window: ByteWindow,
    engine: Engine,
    reader: FlvReader,
    state: OpenState,
}

impl FlvDemuxer {
    /// 创建绑定到字节窗口的解封装器
    pub fn new(window: ByteWindow, config: &DemuxConfig) -> Self {
        Self {
            window,
            engine: Engine::new(config.clone()),
            reader: FlvReader::default(),
            state: OpenState::NotOpen,
        }
    }

    /// 创建 FLV 解封装器实例 (工厂函数)
    pub fn create(window: ByteWindow, config: &DemuxConfig) -> Box<dyn Demuxer> {
        Box::new(Self::new(window, config))
    }

    /// 读取 FLV 文件头部, 按标志建立轨道
    fn scan_header(&mut self) -> LiuResult<()> {
        match self.window.fill_to(FLV_HEADER_SIZE as u64) {
            Ok(()) => {}
            Err(LiuError::Eof) => return Err(LiuError::InvalidData("FLV 头部不完整".into())),
            Err(e) => return Err(e),
        }
        let mut head = [0u8; FLV_HEADER_SIZE];
        self.window.read_at(0, &mut head)?;
        if &head[0..3] != b"FLV" {
            return Err(LiuError::InvalidData("不是 FLV 文件".into()));
        }
        let version = head[3];
        let flags = head[4];
        let data_offset = BigEndian::read_u32(&head[5..9]);
        debug!("FLV: version={version} flags=0x{flags:02X} data_offset={data_offset}");
        if version != 1 {
            warn!("FLV: 未知版本 {version}, 按版本 1 解析");
        }
        if (data_offset as usize) < FLV_HEADER_SIZE {
            return Err(LiuError::InvalidData(format!(
                "FLV 数据偏移无效: {data_offset}"
            )));
        }

        let has_video = flags & 0x01 != 0;
        let has_audio = flags & 0x04 != 0;
        if !has_video && !has_audio {
            warn!("FLV: 头部未声明音频或视频");
        }
        let setup = TrackSetup {
            split: SplitMode::Transport,
            clock_bits: FLV_CLOCK_BITS,
            detect_sync: false,
            in_band_config: false,
        };
        // 编解码器在预扫描中由首个 tag 确定
        let placeholder =
            || Stream::new(0, CodecId::None, Rational::MILLI, RawTrack::Flv { codec_tag: 0 });
        if has_video {
            self.reader.video = Some(self.engine.add_track(placeholder(), setup));
        }
        if has_audio {
            self.reader.audio = Some(self.engine.add_track(placeholder(), setup));
        }
        self.engine
            .begin_priming(u64::from(data_offset) + BACK_POINTER_SIZE);
        Ok(())
    }

    /// 预扫描结束后移除未出现数据的轨道
    fn drop_missing_tracks(&mut self) {
        let map = self.engine.retain_tracks(|s| {
            if s.codec_id == CodecId::None {
                warn!("FLV: 头部声明的轨道 {} 未出现可识别的数据, 移除", s.index);
                return false;
            }
            true
        });
        self.reader.remap(&map);
    }

    fn fail(&mut self, e: LiuError) -> LiuError {
        if e.is_bad_format() {
            debug!("FLV: 格式错误, 回到初始状态: {e}");
            self.reset();
        }
        e
    }

    fn reset(&mut self) {
        self.engine.clear();
        self.reader = FlvReader::default();
        self.state = OpenState::NotOpen;
    }
}

impl Demuxer for FlvDemuxer {
    fn format_id(&self) -> FormatId {
        FormatId::Flv
    }

    fn name(&self) -> &str {
        "flv"
    }

    fn state(&self) -> OpenState {
        self.state
    }

    fn open(&mut self) -> LiuResult<()> {
        loop {
            match self.state {
                OpenState::NotOpen => self.state = OpenState::HeaderScan,
                OpenState::HeaderScan => match self.scan_header() {
                    Ok(()) => self.state = OpenState::Priming,
                    Err(e) => return Err(self.fail(e)),
                },
                OpenState::Priming => {
                    if let Err(e) = self.engine.prime(&mut self.reader, &mut self.window) {
                        return Err(self.fail(e));
                    }
                    self.drop_missing_tracks();
                    self.state = OpenState::Opened;
                    debug!("FLV: 打开完成, {} 条轨道", self.engine.streams().len());
                }
                OpenState::Opened => return Ok(()),
            }
        }
    }

    fn close(&mut self) -> LiuResult<()> {
        self.reset();
        Ok(())
    }

    fn streams(&self) -> &[Stream] {
        self.engine.streams()
    }

    fn get_sample(&mut self) -> LiuResult<Sample> {
        if self.state != OpenState::Opened {
            return Err(LiuError::NotOpen);
        }
        self.engine
            .next_sample(&mut self.reader, &mut self.window)
            .map_err(|e| self.fail(e))
    }

    fn current_time(&self) -> Option<i64> {
        self.engine.current_time()
    }

    /// 优先使用 onMetaData 中的时长, 否则按已读比例外推
    fn end_time(&self) -> Option<i64> {
        match self.reader.duration {
            Some(duration) => Some((duration * 1_000_000.0) as i64 - self.engine.origin_us()),
            None => self.engine.estimate_end_time(self.window.total_size()),
        }
    }

    fn seek(&mut self, time_us: i64) -> LiuResult<()> {
        if self.state != OpenState::Opened {
            return Err(LiuError::NotOpen);
        }
        self.engine.seek(&mut self.window, time_us)
    }

    fn read_offset(&self) -> u64 {
        self.engine.next_read()
    }

    fn window(&self) -> &ByteWindow {
        &self.window
    }

    fn window_mut(&mut self) -> &mut ByteWindow {
        &mut self.window
    }

    fn metadata(&self) -> &[(String, String)] {
        &self.reader.metadata
    }
}

/// FLV 格式探测器
pub struct FlvProbe;

impl FormatProbe for FlvProbe {
    fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeScore> {
        // 检查 "FLV" 签名 + version + data offset
        if data.len() >= FLV_HEADER_SIZE && &data[0..3] == b"FLV" {
            let data_offset = BigEndian::read_u32(&data[5..9]) as usize;
            if data[3] == 1 && data_offset >= FLV_HEADER_SIZE {
                return Some(SCORE_MAX);
            }
            return Some(SCORE_MAX - 20);
        }
        score_by_extension(FormatId::Flv, filename)
    }

    fn format_id(&self) -> FormatId {
        FormatId::Flv
    }
}
