//! ASF (Advanced Systems Format) 解封装器.
//!
//! ASF 是 WMV/WMA 使用的容器格式. 文件由若干顶层对象组成, 每个对象以
//! 16 字节 GUID 和 8 字节对象大小 (小端) 开头.
//!
//! # 文件结构
//! ```text
//! Header Object
//!   File Properties Object      数据包大小, preroll, 播放时长
//!   Stream Properties Object *  每条流一个 (WAVEFORMATEX / BITMAPINFOHEADER)
//!   Content Description Object  标题, 作者等 (可选)
//!   ...
//! Data Object
//!   File ID (16) + Total Data Packets (8) + Reserved (2)
//!   Data Packet *               固定大小
//! [Index Object]
//! ```
//!
//! # 数据包
//! ```text
//! [Error Correction Data]
//! Length Type Flags (1)   bit0=多负载, bit1-2=序号, bit3-4=填充, bit5-6=包长
//! Property Flags (1)      bit0-1=复制数据长度, bit2-3=对象内偏移, bit4-5=对象号
//! Packet Length / Sequence / Padding Length (按长度类型, 0/1/2/4 字节)
//! Send Time (4) + Duration (2)
//! [Payload Flags (1)]     bit0-5=负载数, bit6-7=负载长度类型
//! Payload *:
//!   Stream Number (1, bit7=关键帧)
//!   Media Object Number / Offset Into Media Object / Replicated Data Length
//!   Replicated Data       >= 8 字节时前 8 字节为对象大小与显示时间
//!   [Payload Length]
//!   Payload Data
//! Padding
//! ```
//!
//! 每个负载是一个传输单元. 媒体对象按对象内偏移重组: 偏移为 0 的负载开始
//! 新的对象, 对象大小来自复制数据.

use std::collections::HashMap;
use std::fmt;
use std::io::{self, Cursor, Read};

use byteorder::{LittleEndian, ReadBytesExt};
use liu_core::{CodecId, LiuError, LiuResult, Rational};
use log::{debug, trace, warn};

use crate::config::DemuxConfig;
use crate::demuxer::{Demuxer, OpenState};
use crate::engine::{Engine, ScanContext, TrackSetup, Unit, UnitReader};
use crate::format_id::FormatId;
use crate::probe::{FormatProbe, ProbeScore, SCORE_MAX, score_by_extension};
use crate::reassembler::{Chunk, FrameStart, SplitMode};
use crate::sample::Sample;
use crate::stream::{RawTrack, Stream};
use crate::window::{ByteRange, ByteWindow};

/// 对象头部大小 (GUID + size)
const OBJECT_HEADER_SIZE: usize = 24;
/// Header Object 头部大小 (对象头 + 子对象数 + 2 个保留字节)
const HEADER_OBJECT_SIZE: usize = 30;
/// Data Object 头部大小 (对象头 + File ID + 包数 + 保留)
const DATA_OBJECT_HEADER_SIZE: u64 = 50;
/// ASF 时间戳位宽 (毫秒)
const ASF_CLOCK_BITS: u32 = 32;
/// BITMAPINFOHEADER 大小
const BITMAP_INFO_SIZE: usize = 40;

/// ASF GUID (按文件中的字节顺序存储)
#[derive(Clone, Copy, PartialEq, Eq)]
struct Guid([u8; 16]);

impl Guid {
    fn read(cursor: &mut Cursor<&[u8]>) -> io::Result<Self> {
        let mut buf = [0u8; 16];
        cursor.read_exact(&mut buf)?;
        Ok(Self(buf))
    }
}

impl fmt::Display for Guid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let b = &self.0;
        write!(
            f,
            "{:02X}{:02X}{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-{:02X}{:02X}-",
            b[3], b[2], b[1], b[0], b[5], b[4], b[7], b[6], b[8], b[9]
        )?;
        for byte in &b[10..] {
            write!(f, "{byte:02X}")?;
        }
        Ok(())
    }
}

const GUID_HEADER: Guid = Guid([
    0x30, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
]);
const GUID_DATA: Guid = Guid([
    0x36, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
]);
const GUID_FILE_PROPERTIES: Guid = Guid([
    0xA1, 0xDC, 0xAB, 0x8C, 0x47, 0xA9, 0xCF, 0x11, 0x8E, 0xE4, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
]);
const GUID_STREAM_PROPERTIES: Guid = Guid([
    0x91, 0x07, 0xDC, 0xB7, 0xB7, 0xA9, 0xCF, 0x11, 0x8E, 0xE6, 0x00, 0xC0, 0x0C, 0x20, 0x53, 0x65,
]);
const GUID_CONTENT_DESCRIPTION: Guid = Guid([
    0x33, 0x26, 0xB2, 0x75, 0x8E, 0x66, 0xCF, 0x11, 0xA6, 0xD9, 0x00, 0xAA, 0x00, 0x62, 0xCE, 0x6C,
]);
const GUID_STREAM_TYPE_AUDIO: Guid = Guid([
    0x40, 0x9E, 0x69, 0xF8, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
]);
const GUID_STREAM_TYPE_VIDEO: Guid = Guid([
    0xC0, 0xEF, 0x19, 0xBC, 0x4D, 0x5B, 0xCF, 0x11, 0xA8, 0xFD, 0x00, 0x80, 0x5F, 0x5C, 0x44, 0x2B,
]);
const GUID_AUDIO_SPREAD: Guid = Guid([
    0x50, 0xCD, 0xC3, 0xBF, 0x8F, 0x61, 0xCF, 0x11, 0x8B, 0xB2, 0x00, 0xAA, 0x00, 0xB4, 0xE2, 0x20,
]);

/// WAVEFORMATEX wFormatTag → 编解码器
fn audio_codec(format_tag: u16) -> CodecId {
    match format_tag {
        0x0160 | 0x0161 => CodecId::Wmav2,
        0x0162 => CodecId::WmaPro,
        0x0055 => CodecId::Mp3,
        0x0050 => CodecId::Mp2,
        0x0001 => CodecId::PcmS16le,
        0x00FF | 0x1610 => CodecId::Aac,
        0x2000 => CodecId::Ac3,
        _ => CodecId::None,
    }
}

/// BITMAPINFOHEADER biCompression → 编解码器
fn video_codec(fourcc: &[u8; 4]) -> CodecId {
    let mut upper = *fourcc;
    upper.make_ascii_uppercase();
    match &upper {
        b"WMV1" | b"WMV2" => CodecId::Wmv2,
        b"WMV3" | b"WVC1" | b"WMVA" => CodecId::Vc1,
        b"H264" | b"AVC1" => CodecId::H264,
        b"MP4S" | b"M4S2" | b"XVID" | b"DIVX" | b"FMP4" => CodecId::Mpeg4,
        _ => CodecId::None,
    }
}

fn malformed(message: &str) -> io::Error {
    io::Error::new(io::ErrorKind::InvalidData, message.to_string())
}

fn bad_header(e: io::Error) -> LiuError {
    LiuError::InvalidData(format!("ASF 头部损坏: {e}"))
}

// ========================
// 头部对象
// ========================

/// File Properties Object 中用到的字段
#[derive(Debug, Clone, Copy)]
struct FileProperties {
    /// 播放时长 (100ns, 含 preroll)
    play_duration: u64,
    /// 预卷时长 (毫秒)
    preroll: u64,
    /// 广播标志: 时长与包数无效
    broadcast: bool,
    min_packet_size: u32,
    max_packet_size: u32,
}

fn parse_file_properties(body: &[u8]) -> io::Result<FileProperties> {
    let mut c = Cursor::new(body);
    // File ID + File Size + Creation Date + Data Packets Count
    c.set_position(16 + 8 + 8 + 8);
    let play_duration = c.read_u64::<LittleEndian>()?;
    let _send_duration = c.read_u64::<LittleEndian>()?;
    let preroll = c.read_u64::<LittleEndian>()?;
    let flags = c.read_u32::<LittleEndian>()?;
    let min_packet_size = c.read_u32::<LittleEndian>()?;
    let max_packet_size = c.read_u32::<LittleEndian>()?;
    Ok(FileProperties {
        play_duration,
        preroll,
        broadcast: flags & 0x01 != 0,
        min_packet_size,
        max_packet_size,
    })
}

#[derive(Debug, Clone)]
enum StreamKind {
    Audio {
        format_tag: u16,
        channels: u16,
        sample_rate: u32,
        byte_rate: u32,
        bits_per_sample: u16,
    },
    Video {
        width: u32,
        height: u32,
        fourcc: [u8; 4],
    },
}

/// Stream Properties Object
#[derive(Debug, Clone)]
struct StreamProperties {
    number: u8,
    kind: StreamKind,
    extra_data: Vec<u8>,
}

/// 解析 Stream Properties Object, 非音视频流返回 None
fn parse_stream_properties(body: &[u8]) -> io::Result<Option<StreamProperties>> {
    let mut c = Cursor::new(body);
    let stream_type = Guid::read(&mut c)?;
    let error_correction = Guid::read(&mut c)?;
    let _time_offset = c.read_u64::<LittleEndian>()?;
    let type_specific_len = c.read_u32::<LittleEndian>()? as usize;
    let _error_correction_len = c.read_u32::<LittleEndian>()?;
    let number = (c.read_u16::<LittleEndian>()? & 0x7F) as u8;
    let _reserved = c.read_u32::<LittleEndian>()?;

    let start = c.position() as usize;
    let type_specific = body
        .get(start..start + type_specific_len)
        .ok_or_else(|| malformed("类型数据超出对象"))?;
    let mut t = Cursor::new(type_specific);

    if stream_type == GUID_STREAM_TYPE_AUDIO {
        if error_correction == GUID_AUDIO_SPREAD {
            warn!("ASF: 流 {number} 使用音频交织, 样本数据按原始顺序输出");
        }
        let format_tag = t.read_u16::<LittleEndian>()?;
        let channels = t.read_u16::<LittleEndian>()?;
        let sample_rate = t.read_u32::<LittleEndian>()?;
        let byte_rate = t.read_u32::<LittleEndian>()?;
        let _block_align = t.read_u16::<LittleEndian>()?;
        let bits_per_sample = t.read_u16::<LittleEndian>()?;
        let cb_size = if type_specific_len >= 18 {
            usize::from(t.read_u16::<LittleEndian>()?)
        } else {
            0
        };
        let mut extra_data = vec![0u8; cb_size];
        t.read_exact(&mut extra_data)?;
        Ok(Some(StreamProperties {
            number,
            kind: StreamKind::Audio {
                format_tag,
                channels,
                sample_rate,
                byte_rate,
                bits_per_sample,
            },
            extra_data,
        }))
    } else if stream_type == GUID_STREAM_TYPE_VIDEO {
        let _encoded_width = t.read_u32::<LittleEndian>()?;
        let _encoded_height = t.read_u32::<LittleEndian>()?;
        let _reserved = t.read_u8()?;
        let format_size = usize::from(t.read_u16::<LittleEndian>()?);
        let _bi_size = t.read_u32::<LittleEndian>()?;
        let width = t.read_u32::<LittleEndian>()?;
        let height = t.read_i32::<LittleEndian>()?.unsigned_abs();
        let _planes = t.read_u16::<LittleEndian>()?;
        let _bit_count = t.read_u16::<LittleEndian>()?;
        let mut fourcc = [0u8; 4];
        t.read_exact(&mut fourcc)?;
        // biSizeImage .. biClrImportant
        t.set_position(t.position() + 20);
        let mut extra_data = vec![0u8; format_size.saturating_sub(BITMAP_INFO_SIZE)];
        t.read_exact(&mut extra_data)?;
        Ok(Some(StreamProperties {
            number,
            kind: StreamKind::Video {
                width,
                height,
                fourcc,
            },
            extra_data,
        }))
    } else {
        debug!("ASF: 流 {number} 类型 {stream_type} 不是音视频, 忽略");
        Ok(None)
    }
}

/// Content Description Object: 五个 UTF-16LE 字符串
fn parse_content_description(body: &[u8]) -> io::Result<Vec<(String, String)>> {
    const KEYS: [&str; 5] = ["title", "author", "copyright", "description", "rating"];
    let mut c = Cursor::new(body);
    let mut lengths = [0usize; 5];
    for len in &mut lengths {
        *len = usize::from(c.read_u16::<LittleEndian>()?);
    }
    let mut metadata = Vec::new();
    for (key, len) in KEYS.iter().zip(lengths) {
        let mut raw = vec![0u8; len];
        c.read_exact(&mut raw)?;
        let units: Vec<u16> = raw
            .chunks_exact(2)
            .map(|p| u16::from_le_bytes([p[0], p[1]]))
            .collect();
        let text = String::from_utf16_lossy(&units);
        let text = text.trim_end_matches('\0');
        if !text.is_empty() {
            metadata.push((key.to_string(), text.to_string()));
        }
    }
    Ok(metadata)
}

/// Header Object 中解析出的信息
#[derive(Debug, Default)]
struct HeaderInfo {
    file: Option<FileProperties>,
    streams: Vec<StreamProperties>,
    metadata: Vec<(String, String)>,
}

/// 遍历 Header Object 的子对象
fn parse_header_objects(data: &[u8]) -> LiuResult<HeaderInfo> {
    let mut info = HeaderInfo::default();
    let mut pos = HEADER_OBJECT_SIZE;
    while pos + OBJECT_HEADER_SIZE <= data.len() {
        let mut c = Cursor::new(&data[pos..]);
        let guid = Guid::read(&mut c).map_err(bad_header)?;
        let size = c.read_u64::<LittleEndian>().map_err(bad_header)?;
        let end = usize::try_from(size)
            .ok()
            .and_then(|size| pos.checked_add(size))
            .filter(|end| size as usize >= OBJECT_HEADER_SIZE && *end <= data.len())
            .ok_or_else(|| LiuError::InvalidData(format!("ASF 对象 {guid} 大小无效: {size}")))?;
        let body = &data[pos + OBJECT_HEADER_SIZE..end];

        if guid == GUID_FILE_PROPERTIES {
            info.file = Some(parse_file_properties(body).map_err(bad_header)?);
        } else if guid == GUID_STREAM_PROPERTIES {
            if let Some(props) = parse_stream_properties(body).map_err(bad_header)? {
                info.streams.push(props);
            }
        } else if guid == GUID_CONTENT_DESCRIPTION {
            match parse_content_description(body) {
                Ok(metadata) => info.metadata = metadata,
                Err(e) => warn!("ASF: 内容描述解析失败: {e}"),
            }
        } else {
            trace!("ASF: 跳过头部对象 {guid} ({size} 字节)");
        }
        pos = end;
    }
    Ok(info)
}

// ========================
// 数据包
// ========================

/// 数据包中的一个负载
#[derive(Debug, Clone, Copy)]
struct Payload {
    /// 单元起点: 首个负载为包起点, 其余为负载头起点
    unit_start: u64,
    stream_number: u8,
    key: bool,
    /// 媒体对象编号
    object_number: u32,
    /// 对象内偏移
    object_offset: u32,
    /// 媒体对象大小与显示时间 (来自复制数据)
    object_size: Option<u32>,
    presentation_time: Option<u32>,
    /// 压缩负载 (多个子负载共用一个负载头)
    compressed: bool,
    data: ByteRange,
}

/// 按长度类型读取 0/1/2/4 字节
fn read_coded(c: &mut Cursor<&[u8]>, code: u8) -> io::Result<u32> {
    match code & 0x03 {
        0 => Ok(0),
        1 => c.read_u8().map(u32::from),
        2 => c.read_u16::<LittleEndian>().map(u32::from),
        _ => c.read_u32::<LittleEndian>(),
    }
}

/// 解析一个完整的数据包, 返回其中的负载与包的发送时间
fn parse_packet(data: &[u8], packet_start: u64) -> io::Result<(Vec<Payload>, u32)> {
    let mut c = Cursor::new(data);
    let mut flags = c.read_u8()?;
    if flags & 0x80 != 0 {
        // 纠错数据
        if flags & 0x60 != 0 {
            return Err(malformed("纠错数据长度类型无效"));
        }
        c.set_position(1 + u64::from(flags & 0x0F));
        flags = c.read_u8()?;
    }
    let property = c.read_u8()?;
    let packet_length = read_coded(&mut c, flags >> 5)? as usize;
    let _sequence = read_coded(&mut c, flags >> 1)?;
    let padding = read_coded(&mut c, flags >> 3)? as usize;
    let send_time = c.read_u32::<LittleEndian>()?;
    let _duration = c.read_u16::<LittleEndian>()?;

    let packet_length = if packet_length == 0 || packet_length > data.len() {
        data.len()
    } else {
        packet_length
    };
    let payload_end = packet_length
        .checked_sub(padding)
        .ok_or_else(|| malformed("填充长度超过包长"))?;

    let (count, length_type) = if flags & 0x01 != 0 {
        let b = c.read_u8()?;
        (usize::from(b & 0x3F), Some(b >> 6))
    } else {
        (1, None)
    };

    let mut payloads = Vec::with_capacity(count);
    for i in 0..count {
        let header_start = c.position();
        let stream_byte = c.read_u8()?;
        let object_number = read_coded(&mut c, property >> 4)?;
        let object_offset = read_coded(&mut c, property >> 2)?;
        let replicated_len = u64::from(read_coded(&mut c, property)?);
        let replicated_start = c.position();
        let (object_size, presentation_time) = if replicated_len >= 8 {
            (
                Some(c.read_u32::<LittleEndian>()?),
                Some(c.read_u32::<LittleEndian>()?),
            )
        } else {
            (None, None)
        };
        c.set_position(replicated_start + replicated_len);

        let data_len = match length_type {
            Some(t) => read_coded(&mut c, t)? as usize,
            None => payload_end.saturating_sub(c.position() as usize),
        };
        let data_start = c.position() as usize;
        // 负载可以占用填充区
        if data_start + data_len > data.len() {
            return Err(malformed("负载超出数据包"));
        }
        c.set_position((data_start + data_len) as u64);

        payloads.push(Payload {
            unit_start: if i == 0 {
                packet_start
            } else {
                packet_start + header_start
            },
            stream_number: stream_byte & 0x7F,
            key: stream_byte & 0x80 != 0,
            object_number,
            object_offset,
            object_size,
            presentation_time,
            compressed: replicated_len == 1,
            data: ByteRange::new(packet_start + data_start as u64, data_len),
        });
    }
    Ok((payloads, send_time))
}

// ========================
// 传输单元
// ========================

/// 解析过的数据包
#[derive(Debug)]
struct ParsedPacket {
    start: u64,
    payloads: Vec<Payload>,
    send_time: u32,
}

/// 按负载切分数据区
#[derive(Debug, Default)]
struct AsfReader {
    packet_size: u64,
    data_start: u64,
    /// 数据区终点 (Data Object 大小未知时为 None)
    data_end: Option<u64>,
    /// 流编号 → 轨道索引
    tracks: HashMap<u8, usize>,
    /// 最近解析的数据包
    packet: Option<ParsedPacket>,
}

impl AsfReader {
    /// 保证 `packet_start` 处的数据包已解析, 数据包损坏视为格式错误
    fn load_packet(&mut self, window: &ByteWindow, packet_start: u64) -> LiuResult<()> {
        if self.packet.as_ref().is_some_and(|p| p.start == packet_start) {
            return Ok(());
        }
        let data = window.bytes_at(packet_start, self.packet_size as usize)?;
        let (payloads, send_time) = parse_packet(&data, packet_start).map_err(|e| {
            self.packet = None;
            LiuError::InvalidData(format!("ASF 数据包损坏 (offset={packet_start}): {e}"))
        })?;
        trace!(
            "ASF: 数据包 offset={packet_start}, {} 个负载, send_time={send_time}",
            payloads.len()
        );
        self.packet = Some(ParsedPacket {
            start: packet_start,
            payloads,
            send_time,
        });
        Ok(())
    }
}

impl UnitReader for AsfReader {
    fn read_unit(
        &mut self,
        window: &mut ByteWindow,
        offset: u64,
        _ctx: &mut ScanContext<'_>,
    ) -> LiuResult<(Unit, u64)> {
        if self.data_end.is_some_and(|end| offset >= end) {
            return Err(LiuError::Eof);
        }
        let index = offset.saturating_sub(self.data_start) / self.packet_size;
        let packet_start = self.data_start + index * self.packet_size;
        let packet_end = packet_start + self.packet_size;
        window.fill_to(packet_end)?;

        self.load_packet(window, packet_start)?;
        let Some(packet) = self.packet.as_ref() else {
            return Ok((Unit::Skip, packet_end));
        };
        let Some(k) = packet.payloads.iter().position(|p| p.unit_start == offset) else {
            if !packet.payloads.is_empty() {
                warn!("ASF: offset={offset} 不是负载起点, 跳到下一个数据包");
            }
            return Ok((Unit::Skip, packet_end));
        };
        let next = packet
            .payloads
            .get(k + 1)
            .map_or(packet_end, |p| p.unit_start);
        let payload = packet.payloads[k];

        let Some(&track) = self.tracks.get(&payload.stream_number) else {
            trace!("ASF: 跳过未知流 {} 的负载", payload.stream_number);
            return Ok((Unit::Skip, next));
        };
        if payload.compressed {
            debug!(
                "ASF: 跳过流 {} 的压缩负载 (offset={offset})",
                payload.stream_number
            );
            return Ok((Unit::Skip, next));
        }
        if payload.data.len == 0 {
            return Ok((Unit::Skip, next));
        }
        if payload.object_size == Some(0) {
            debug!(
                "ASF: 跳过流 {} 的空媒体对象 {} (offset={offset})",
                payload.stream_number, payload.object_number
            );
            return Ok((Unit::Skip, next));
        }

        let chunk = if payload.object_offset == 0 {
            let time = u64::from(payload.presentation_time.unwrap_or(packet.send_time));
            Chunk::starting(
                payload.data,
                FrameStart {
                    total: Some(
                        payload
                            .object_size
                            .map_or(payload.data.len, |size| size as usize),
                    ),
                    pts: Some(time),
                    dts: Some(time),
                    key: payload.key,
                },
            )
        } else {
            Chunk::continuation(payload.data)
        };
        let chunk = chunk.with_object(payload.object_number);
        Ok((Unit::Payload { track, chunk }, next))
    }
}

// ========================
// 解封装器
// ========================

/// ASF 解封装器
pub struct AsfDemuxer {
    window: ByteWindow,
    engine: Engine,
    reader: AsfReader,
    state: OpenState,
    /// 播放时长 (微秒, 不含 preroll)
    duration_us: Option<i64>,
    metadata: Vec<(String, String)>,
}

impl AsfDemuxer {
    pub fn new(window: ByteWindow, config: &DemuxConfig) -> Self {
        Self {
            window,
            engine: Engine::new(config.clone()),
            reader: AsfReader::default(),
            state: OpenState::NotOpen,
            duration_us: None,
            metadata: Vec::new(),
        }
    }

    /// 创建 ASF 解封装器实例 (工厂函数)
    pub fn create(window: ByteWindow, config: &DemuxConfig) -> Box<dyn Demuxer> {
        Box::new(Self::new(window, config))
    }

    fn fill_header(&mut self, end: u64) -> LiuResult<()> {
        match self.window.fill_to(end) {
            Err(LiuError::Eof) => Err(LiuError::InvalidData("ASF 头部不完整".into())),
            other => other,
        }
    }

    fn scan_header(&mut self) -> LiuResult<()> {
        self.fill_header(HEADER_OBJECT_SIZE as u64)?;
        let head = self.window.bytes_at(0, HEADER_OBJECT_SIZE)?;
        let mut c = Cursor::new(&head[..]);
        let guid = Guid::read(&mut c).map_err(bad_header)?;
        if guid != GUID_HEADER {
            return Err(LiuError::InvalidData("不是 ASF 文件".into()));
        }
        let header_size = c.read_u64::<LittleEndian>().map_err(bad_header)?;
        if header_size < HEADER_OBJECT_SIZE as u64 || header_size > self.engine.config().probe_limit
        {
            return Err(LiuError::InvalidData(format!(
                "ASF 头部大小无效: {header_size}"
            )));
        }
        self.fill_header(header_size + DATA_OBJECT_HEADER_SIZE)?;

        let header = self.window.bytes_at(0, header_size as usize)?;
        let info = parse_header_objects(&header)?;
        let file = info
            .file
            .ok_or_else(|| LiuError::InvalidData("ASF 缺少 File Properties 对象".into()))?;
        if file.max_packet_size == 0 || file.min_packet_size != file.max_packet_size {
            return Err(LiuError::InvalidData(format!(
                "ASF 数据包大小不固定: min={} max={}",
                file.min_packet_size, file.max_packet_size
            )));
        }

        let data_head = self
            .window
            .bytes_at(header_size, DATA_OBJECT_HEADER_SIZE as usize)?;
        let mut c = Cursor::new(&data_head[..]);
        if Guid::read(&mut c).map_err(bad_header)? != GUID_DATA {
            return Err(LiuError::InvalidData("ASF 头部之后不是 Data 对象".into()));
        }
        let data_size = c.read_u64::<LittleEndian>().map_err(bad_header)?;
        c.set_position(40);
        let packet_count = c.read_u64::<LittleEndian>().map_err(bad_header)?;

        let data_start = header_size + DATA_OBJECT_HEADER_SIZE;
        // 广播流的 Data 对象大小可以为 0
        let data_end = (data_size >= DATA_OBJECT_HEADER_SIZE).then(|| header_size + data_size);
        debug!(
            "ASF: packet_size={} preroll={}ms packets={packet_count} data=[{data_start}, {data_end:?})",
            file.max_packet_size, file.preroll
        );

        let duration_ms = (!file.broadcast && file.play_duration > 0)
            .then(|| (file.play_duration / 10_000) as i64 - file.preroll as i64);
        self.duration_us = duration_ms.map(|ms| ms * 1000);
        self.metadata = info.metadata;

        self.reader = AsfReader {
            packet_size: u64::from(file.max_packet_size),
            data_start,
            data_end,
            tracks: HashMap::new(),
            packet: None,
        };
        for props in info.streams {
            self.add_stream(props, duration_ms);
        }
        if self.reader.tracks.is_empty() {
            warn!("ASF: 没有可识别的音视频流");
        }
        self.engine.begin_priming(data_start);
        Ok(())
    }

    fn add_stream(&mut self, props: StreamProperties, duration_ms: Option<i64>) {
        if self.reader.tracks.contains_key(&props.number) {
            warn!("ASF: 流编号 {} 重复, 忽略", props.number);
            return;
        }
        let (codec_id, format_tag) = match &props.kind {
            StreamKind::Audio { format_tag, .. } => (audio_codec(*format_tag), u32::from(*format_tag)),
            StreamKind::Video { fourcc, .. } => (video_codec(fourcc), u32::from_le_bytes(*fourcc)),
        };
        if codec_id == CodecId::None {
            warn!(
                "ASF: 流 {} 的编解码器不支持 (tag=0x{format_tag:08X}), 忽略",
                props.number
            );
            return;
        }

        let mut stream = Stream::new(
            0,
            codec_id,
            Rational::MILLI,
            RawTrack::Asf {
                stream_number: props.number,
                format_tag,
            },
        );
        stream.extra_data = props.extra_data;
        if let Some(ms) = duration_ms {
            stream.duration = ms;
        }
        match props.kind {
            StreamKind::Audio {
                channels,
                sample_rate,
                byte_rate,
                bits_per_sample,
                ..
            } => {
                if let Some(audio) = stream.audio_mut() {
                    audio.sample_rate = sample_rate;
                    audio.channels = u32::from(channels);
                    audio.bits_per_sample = u32::from(bits_per_sample);
                    audio.bit_rate = u64::from(byte_rate) * 8;
                }
            }
            StreamKind::Video { width, height, .. } => {
                if let Some(video) = stream.video_mut() {
                    video.width = width;
                    video.height = height;
                }
            }
        }

        let setup = TrackSetup {
            split: SplitMode::Transport,
            clock_bits: ASF_CLOCK_BITS,
            detect_sync: false,
            in_band_config: false,
        };
        debug!("ASF: 流 {} → {codec_id}", props.number);
        let index = self.engine.add_track(stream, setup);
        self.reader.tracks.insert(props.number, index);
    }

    fn fail(&mut self, e: LiuError) -> LiuError {
        if e.is_bad_format() {
            debug!("ASF: 格式错误, 回到初始状态: {e}");
            self.reset();
        }
        e
    }

    fn reset(&mut self) {
        self.engine.clear();
        self.reader = AsfReader::default();
        self.state = OpenState::NotOpen;
        self.duration_us = None;
        self.metadata.clear();
    }
}

impl Demuxer for AsfDemuxer {
    fn format_id(&self) -> FormatId {
        FormatId::Asf
    }

    fn name(&self) -> &str {
        "asf"
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
                    self.state = OpenState::Opened;
                    debug!("ASF: 打开完成, {} 条轨道", self.engine.streams().len());
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

    fn end_time(&self) -> Option<i64> {
        self.duration_us
            .or_else(|| self.engine.estimate_end_time(self.window.total_size()))
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
        &self.metadata
    }
}

/// ASF 格式探测器
pub struct AsfProbe;

impl FormatProbe for AsfProbe {
    fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeScore> {
        if data.len() >= 16 && data[..16] == GUID_HEADER.0 {
            return Some(SCORE_MAX);
        }
        score_by_extension(FormatId::Asf, filename)
    }

    fn format_id(&self) -> FormatId {
        FormatId::Asf
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sample::SampleFlags;
    use crate::source::MemorySource;
    use liu_core::MediaType;

    const PACKET_SIZE: usize = 256;
    const PREROLL: u64 = 3000;
    const AUDIO: u8 = 1;
    const VIDEO: u8 = 2;
    const WMA_CONFIG: [u8; 10] = [0x00, 0x88, 0x00, 0x00, 0x0F, 0x00, 0x00, 0x00, 0x00, 0x00];
    const VC1_CONFIG: [u8; 4] = [0x4E, 0xF9, 0x2A, 0x01];

    fn object(guid: Guid, body: &[u8]) -> Vec<u8> {
        let mut out = guid.0.to_vec();
        out.extend_from_slice(&((OBJECT_HEADER_SIZE + body.len()) as u64).to_le_bytes());
        out.extend_from_slice(body);
        out
    }

    fn file_properties(min: u32, max: u32) -> Vec<u8> {
        let mut b = vec![0u8; 16 + 8 + 8 + 8];
        b.extend_from_slice(&((5000 + PREROLL) * 10_000).to_le_bytes()); // play duration
        b.extend_from_slice(&(5000u64 * 10_000).to_le_bytes()); // send duration
        b.extend_from_slice(&PREROLL.to_le_bytes());
        b.extend_from_slice(&2u32.to_le_bytes()); // seekable
        b.extend_from_slice(&min.to_le_bytes());
        b.extend_from_slice(&max.to_le_bytes());
        b.extend_from_slice(&128_000u32.to_le_bytes());
        object(GUID_FILE_PROPERTIES, &b)
    }

    fn stream_properties(stream_type: Guid, number: u8, type_specific: &[u8]) -> Vec<u8> {
        let mut b = stream_type.0.to_vec();
        b.extend_from_slice(&[0u8; 16]); // no error correction
        b.extend_from_slice(&0u64.to_le_bytes());
        b.extend_from_slice(&(type_specific.len() as u32).to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        b.extend_from_slice(&u16::from(number).to_le_bytes());
        b.extend_from_slice(&0u32.to_le_bytes());
        b.extend_from_slice(type_specific);
        object(GUID_STREAM_PROPERTIES, &b)
    }

    fn wma_stream() -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(&0x0161u16.to_le_bytes());
        t.extend_from_slice(&2u16.to_le_bytes());
        t.extend_from_slice(&44_100u32.to_le_bytes());
        t.extend_from_slice(&16_000u32.to_le_bytes());
        t.extend_from_slice(&2_973u16.to_le_bytes());
        t.extend_from_slice(&16u16.to_le_bytes());
        t.extend_from_slice(&(WMA_CONFIG.len() as u16).to_le_bytes());
        t.extend_from_slice(&WMA_CONFIG);
        stream_properties(GUID_STREAM_TYPE_AUDIO, AUDIO, &t)
    }

    fn vc1_stream() -> Vec<u8> {
        let mut t = Vec::new();
        t.extend_from_slice(&320u32.to_le_bytes());
        t.extend_from_slice(&240u32.to_le_bytes());
        t.push(2);
        t.extend_from_slice(&((BITMAP_INFO_SIZE + VC1_CONFIG.len()) as u16).to_le_bytes());
        t.extend_from_slice(&((BITMAP_INFO_SIZE + VC1_CONFIG.len()) as u32).to_le_bytes());
        t.extend_from_slice(&320u32.to_le_bytes());
        t.extend_from_slice(&240i32.to_le_bytes());
        t.extend_from_slice(&1u16.to_le_bytes());
        t.extend_from_slice(&24u16.to_le_bytes());
        t.extend_from_slice(b"WMV3");
        t.extend_from_slice(&[0u8; 20]);
        t.extend_from_slice(&VC1_CONFIG);
        stream_properties(GUID_STREAM_TYPE_VIDEO, VIDEO, &t)
    }

    fn content_description(title: &str) -> Vec<u8> {
        let mut text: Vec<u8> = title.encode_utf16().flat_map(u16::to_le_bytes).collect();
        text.extend_from_slice(&[0, 0]);
        let mut b = (text.len() as u16).to_le_bytes().to_vec();
        b.extend_from_slice(&[0u8; 8]);
        b.extend_from_slice(&text);
        object(GUID_CONTENT_DESCRIPTION, &b)
    }

    /// 一个负载的描述
    struct TestPayload<'a> {
        stream: u8,
        key: bool,
        object: u8,
        offset: u32,
        object_size: u32,
        time: u32,
        replicated_len: u8,
        data: &'a [u8],
    }

    fn payload<'a>(stream: u8, key: bool, object: u8, offset: u32, size: u32, time: u32, data: &'a [u8]) -> TestPayload<'a> {
        TestPayload {
            stream,
            key,
            object,
            offset,
            object_size: size,
            time,
            replicated_len: 8,
            data,
        }
    }

    /// 构造固定大小的数据包 (填充长度为 WORD, 多负载时负载长度为 WORD)
    fn packet(payloads: &[TestPayload<'_>], send_time: u32) -> Vec<u8> {
        let multi = payloads.len() > 1;
        let mut body = Vec::new();
        for p in payloads {
            body.push(p.stream | if p.key { 0x80 } else { 0 });
            body.push(p.object);
            body.extend_from_slice(&p.offset.to_le_bytes());
            body.push(p.replicated_len);
            if p.replicated_len >= 8 {
                body.extend_from_slice(&p.object_size.to_le_bytes());
                body.extend_from_slice(&p.time.to_le_bytes());
            } else {
                body.extend(std::iter::repeat_n(0u8, usize::from(p.replicated_len)));
            }
            if multi {
                body.extend_from_slice(&(p.data.len() as u16).to_le_bytes());
            }
            body.extend_from_slice(p.data);
        }
        let header_len = if multi { 11 } else { 10 };
        let padding = PACKET_SIZE - header_len - body.len();

        let mut out = vec![if multi { 0x11 } else { 0x10 }, 0x5D];
        out.extend_from_slice(&(padding as u16).to_le_bytes());
        out.extend_from_slice(&send_time.to_le_bytes());
        out.extend_from_slice(&0u16.to_le_bytes());
        if multi {
            out.push(0x80 | payloads.len() as u8);
        }
        out.extend_from_slice(&body);
        out.resize(PACKET_SIZE, 0);
        out
    }

    fn build_asf_with(file: Vec<u8>, packets: &[Vec<u8>], trailer: &[u8]) -> Vec<u8> {
        let mut children = file;
        children.extend(wma_stream());
        children.extend(vc1_stream());
        children.extend(content_description("测试"));
        let mut header = GUID_HEADER.0.to_vec();
        header.extend_from_slice(&((HEADER_OBJECT_SIZE + children.len()) as u64).to_le_bytes());
        header.extend_from_slice(&4u32.to_le_bytes());
        header.extend_from_slice(&[1, 2]);
        header.extend(children);

        let data_size = DATA_OBJECT_HEADER_SIZE as usize + packets.len() * PACKET_SIZE;
        header.extend_from_slice(&GUID_DATA.0);
        header.extend_from_slice(&(data_size as u64).to_le_bytes());
        header.extend_from_slice(&[0u8; 16]);
        header.extend_from_slice(&(packets.len() as u64).to_le_bytes());
        header.extend_from_slice(&[1, 1]);
        for p in packets {
            header.extend_from_slice(p);
        }
        header.extend_from_slice(trailer);
        header
    }

    fn video_frame(len: usize, seed: u8) -> Vec<u8> {
        (0..len).map(|i| seed.wrapping_add(i as u8)).collect()
    }

    fn standard_packets() -> (Vec<Vec<u8>>, Vec<u8>) {
        let frame = video_frame(300, 7);
        let audio1 = [0xA1u8; 20];
        let audio2 = [0xA2u8; 20];
        let inter = video_frame(50, 99);
        let p = PREROLL as u32;
        let packets = vec![
            packet(
                &[
                    payload(AUDIO, true, 1, 0, 20, p, &audio1),
                    payload(VIDEO, true, 1, 0, 300, p, &frame[..100]),
                ],
                p,
            ),
            packet(&[payload(VIDEO, true, 1, 100, 300, p, &frame[100..])], p),
            packet(
                &[
                    payload(AUDIO, true, 2, 0, 20, p + 46, &audio2),
                    payload(VIDEO, false, 2, 0, 50, p + 40, &inter),
                ],
                p + 40,
            ),
        ];
        (packets, frame)
    }

    fn build_asf() -> Vec<u8> {
        let (packets, _) = standard_packets();
        build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &[],
        )
    }

    fn open(data: Vec<u8>) -> AsfDemuxer {
        let mut demuxer = AsfDemuxer::new(ByteWindow::from_bytes(data), &DemuxConfig::default());
        demuxer.open().unwrap();
        demuxer
    }

    fn read_all(demuxer: &mut AsfDemuxer) -> Vec<Sample> {
        let mut samples = Vec::new();
        loop {
            match demuxer.get_sample() {
                Ok(s) => samples.push(s),
                Err(LiuError::Eof) => break,
                Err(e) => panic!("读取样本失败: {e}"),
            }
        }
        samples
    }

    #[test]
    fn test_探测_asf_头部() {
        let data = build_asf();
        assert_eq!(AsfProbe.probe(&data[..64], None), Some(SCORE_MAX));
        assert_eq!(AsfProbe.probe(&[0u8; 64], None), None);
        assert_eq!(
            AsfProbe.probe(&[0u8; 64], Some("a.wma")),
            Some(crate::probe::SCORE_EXTENSION)
        );
    }

    #[test]
    fn test_打开_轨道信息() {
        let demuxer = open(build_asf());
        assert_eq!(demuxer.track_count(), 2);

        let audio = demuxer.stream(0).unwrap();
        assert_eq!(audio.media_type, MediaType::Audio);
        assert_eq!(audio.codec_id, CodecId::Wmav2);
        assert_eq!(audio.extra_data, WMA_CONFIG);
        assert_eq!(
            audio.raw,
            RawTrack::Asf {
                stream_number: AUDIO,
                format_tag: 0x0161
            }
        );
        match &audio.params {
            crate::stream::StreamParams::Audio(a) => {
                assert_eq!((a.sample_rate, a.channels, a.bit_rate), (44_100, 2, 128_000));
            }
            other => panic!("音频参数错误: {other:?}"),
        }

        let video = demuxer.stream(1).unwrap();
        assert_eq!(video.codec_id, CodecId::Vc1);
        assert_eq!(video.extra_data, VC1_CONFIG);
        assert_eq!(video.duration, 5000);
        match &video.params {
            crate::stream::StreamParams::Video(v) => assert_eq!((v.width, v.height), (320, 240)),
            other => panic!("视频参数错误: {other:?}"),
        }

        assert_eq!(demuxer.metadata(), &[("title".to_string(), "测试".to_string())]);
        assert_eq!(demuxer.end_time(), Some(5_000_000));
    }

    #[test]
    fn test_读取样本_跨包重组() {
        let (_, frame) = standard_packets();
        let mut demuxer = open(build_asf());
        let samples = read_all(&mut demuxer);
        let summary: Vec<(usize, i64, usize, bool)> = samples
            .iter()
            .map(|s| (s.stream_index, s.dts, s.size, s.is_sync()))
            .collect();
        assert_eq!(
            summary,
            vec![
                (0, 0, 20, true),
                (1, 0, 300, true),
                (0, 46_000, 20, true),
                (1, 40_000, 50, false),
            ]
        );
        assert_eq!(samples[1].ranges.len(), 2);
        assert_eq!(samples[1].copy_to_vec(), frame);
        assert_eq!(samples[0].copy_to_vec(), vec![0xA1; 20]);
    }

    #[test]
    fn test_跳过压缩负载与未知流() {
        let p = PREROLL as u32;
        let audio = [0x55u8; 16];
        let mut compressed = payload(AUDIO, true, 1, p, 0, 0, &[4, 1, 2, 3, 4]);
        compressed.replicated_len = 1;
        let packets = vec![packet(
            &[
                compressed,
                payload(5, true, 1, 0, 8, p, &[0u8; 8]),
                payload(AUDIO, true, 2, 0, 16, p + 20, &audio),
            ],
            p,
        )];
        let data = build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &[],
        );
        let mut demuxer = open(data);
        let samples = read_all(&mut demuxer);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].stream_index, 0);
        assert_eq!(samples[0].copy_to_vec(), audio.to_vec());
    }

    #[test]
    fn test_媒体对象不连续时截断() {
        let p = PREROLL as u32;
        let first = video_frame(300, 1);
        let stray = [0xEEu8; 80];
        let next = video_frame(60, 50);
        let packets = vec![
            packet(&[payload(VIDEO, true, 1, 0, 300, p, &first[..100])], p),
            // 对象 2 的起始负载丢失, 只剩后续数据
            packet(&[payload(VIDEO, false, 2, 100, 180, p + 40, &stray)], p + 40),
            packet(&[payload(VIDEO, true, 3, 0, 60, p + 80, &next)], p + 80),
        ];
        let data = build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &[],
        );
        let mut demuxer = open(data);
        let samples = read_all(&mut demuxer);
        assert_eq!(samples.len(), 2);
        assert_eq!(samples[0].copy_to_vec(), first[..100].to_vec());
        assert!(samples[0].flags.contains(SampleFlags::TRUNCATED));
        assert_eq!(samples[1].copy_to_vec(), next);
        assert_eq!(samples[1].dts, 80_000);
        assert!(!samples[1].flags.contains(SampleFlags::TRUNCATED));
    }

    #[test]
    fn test_跳过空媒体对象() {
        let p = PREROLL as u32;
        let audio = [0x33u8; 16];
        let packets = vec![packet(
            &[
                payload(AUDIO, true, 1, 0, 0, p, &[0xEE; 8]),
                payload(AUDIO, true, 2, 0, 16, p + 20, &audio),
            ],
            p,
        )];
        let data = build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &[],
        );
        let mut demuxer = open(data);
        let samples = read_all(&mut demuxer);
        assert_eq!(samples.len(), 1);
        assert_eq!(samples[0].copy_to_vec(), audio.to_vec());
    }

    #[test]
    fn test_数据包损坏时回到初始状态() {
        let (mut packets, _) = standard_packets();
        // 纠错数据的长度类型非零
        let mut broken = vec![0xE0u8];
        broken.resize(PACKET_SIZE, 0);
        packets.push(broken);
        let data = build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &[],
        );
        let mut demuxer = open(data);
        let mut samples = 0;
        let err = loop {
            match demuxer.get_sample() {
                Ok(_) => samples += 1,
                Err(e) => break e,
            }
        };
        assert_eq!(samples, 4);
        assert!(err.is_bad_format(), "{err}");
        assert_eq!(demuxer.state(), OpenState::NotOpen);
        assert!(matches!(demuxer.get_sample(), Err(LiuError::NotOpen)));
    }

    #[test]
    fn test_数据区之后的对象不解析() {
        let (packets, _) = standard_packets();
        let trailer = [0xEEu8; 100];
        let data = build_asf_with(
            file_properties(PACKET_SIZE as u32, PACKET_SIZE as u32),
            &packets,
            &trailer,
        );
        let mut demuxer = open(data);
        assert_eq!(read_all(&mut demuxer).len(), 4);
        assert!(matches!(demuxer.get_sample(), Err(LiuError::Eof)));
    }

    #[test]
    fn test_包大小不固定() {
        let (packets, _) = standard_packets();
        let data = build_asf_with(file_properties(128, PACKET_SIZE as u32), &packets, &[]);
        let mut demuxer = AsfDemuxer::new(ByteWindow::from_bytes(data), &DemuxConfig::default());
        assert!(matches!(demuxer.open(), Err(LiuError::InvalidData(_))));
        assert_eq!(demuxer.state(), OpenState::NotOpen);
    }

    #[test]
    fn test_不是_asf() {
        let mut demuxer =
            AsfDemuxer::new(ByteWindow::from_bytes(vec![0u8; 128]), &DemuxConfig::default());
        assert!(matches!(demuxer.open(), Err(LiuError::InvalidData(_))));
    }

    #[test]
    fn test_分块输入() {
        let data = build_asf();
        let expected: Vec<_> = read_all(&mut open(data.clone()))
            .iter()
            .map(|s| (s.stream_index, s.dts, s.copy_to_vec()))
            .collect();
        let mut demuxer =
            AsfDemuxer::new(ByteWindow::new(MemorySource::chunked(data, 33)), &DemuxConfig::default());
        while !demuxer.is_open() {
            assert_ne!(demuxer.state(), OpenState::NotOpen);
        }
        let mut got = Vec::new();
        loop {
            match demuxer.get_sample() {
                Ok(s) => got.push((s.stream_index, s.dts, s.copy_to_vec())),
                Err(LiuError::NeedMoreData) => {}
                Err(LiuError::Eof) => break,
                Err(e) => panic!("读取失败: {e}"),
            }
        }
        assert_eq!(got, expected);
    }

    #[test]
    fn test_seek_回到开头() {
        let mut demuxer = open(build_asf());
        let first = read_all(&mut demuxer);
        demuxer.seek(0).unwrap();
        assert_eq!(read_all(&mut demuxer), first);
        assert!(matches!(demuxer.seek(1), Err(LiuError::Unsupported(_))));
    }

    #[test]
    fn test_guid_显示() {
        assert_eq!(
            GUID_HEADER.to_string(),
            "75B22630-668E-11CF-A6D9-00AA0062CE6C"
        );
    }
}
