//! MPEG-TS (Transport Stream) 解封装器.
//!
//! MPEG-TS 由固定大小的包组成, 广泛用于数字广播 (DVB/ATSC) 和 HLS 流媒体.
//! 蓝光使用的 M2TS 在每个包前附加 4 字节时间码, 包长 192 字节.
//!
//! # TS 包结构 (188 字节)
//! ```text
//! ┌──────────────────────────────────────────┐
//! │ 同步字节 (0x47)                    1 byte│
//! │ TEI(1) + PUSI(1) + Priority(1) +         │
//! │   PID(13)                         2 bytes│
//! │ TSC(2) + AFC(2) + CC(4)          1 byte │
//! │ [Adaptation Field]               可变     │
//! │ [Payload]                        可变     │
//! └──────────────────────────────────────────┘
//! ```
//!
//! # 打开流程
//! 1. 在数据开头寻找同步字节, 以连续 3 个包的间隔确定包长 (188/192)
//! 2. 收集 PAT (PID 0) 得到 PMT 的 PID, 再收集 PMT 得到各基本流
//! 3. 从首个包开始预扫描, 取得各轨道的起始时间与 SPS/PPS, ADTS 配置
//!
//! 每个 TS 包是一个传输单元, PES 负载交给帧重组器拼成完整的帧.

use std::collections::HashMap;

use liu_core::crc::crc32_mpeg2;
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

/// TS 包大小
const TS_PACKET_SIZE: usize = 188;
/// M2TS 包大小 (4 字节时间码 + TS 包)
const M2TS_PACKET_SIZE: usize = 192;
/// TS 同步字节
const TS_SYNC_BYTE: u8 = 0x47;
/// 判定同步所需的连续包数
const SYNC_CHECK_PACKETS: usize = 3;
/// PAT PID
const PID_PAT: u16 = 0x0000;
/// PAT table_id
const TABLE_PAT: u8 = 0x00;
/// PMT table_id
const TABLE_PMT: u8 = 0x02;
/// PTS/DTS 位宽
const MPEG_CLOCK_BITS: u32 = 33;

/// MPEG-TS stream_type → CodecId 映射
fn stream_type_to_codec(stream_type: u8) -> CodecId {
    match stream_type {
        // 视频
        0x01 => CodecId::Mpeg1Video,
        0x02 => CodecId::Mpeg2Video,
        0x10 => CodecId::Mpeg4,
        0x1B => CodecId::H264,
        0x24 => CodecId::H265,
        // 音频
        0x03 | 0x04 => CodecId::Mp3,
        0x0F => CodecId::Aac,  // ADTS
        0x81 => CodecId::Ac3,  // ATSC AC-3
        0x87 => CodecId::Eac3, // ATSC E-AC-3
        0x86 => CodecId::Dts,
        // LATM 封装的 AAC, 私有数据等
        _ => CodecId::None,
    }
}

// ========================
// 包与 PSI 解析
// ========================

/// TS 包头 (含 adaptation field 中用到的标志)
#[derive(Debug, Clone, Copy)]
struct PacketHeader {
    /// transport_error_indicator
    error: bool,
    /// payload_unit_start_indicator
    pusi: bool,
    pid: u16,
    /// continuity_counter
    cc: u8,
    /// discontinuity_indicator
    discontinuity: bool,
    /// random_access_indicator
    random_access: bool,
    /// 负载在包内的偏移, 无负载时为 None
    payload: Option<usize>,
}

impl PacketHeader {
    /// 解析 188 字节的 TS 包 (`pkt[0]` 为同步字节)
    fn parse(pkt: &[u8]) -> Self {
        let afc = (pkt[3] >> 4) & 0x03;
        let mut offset = 4;
        let mut discontinuity = false;
        let mut random_access = false;
        if afc & 0x02 != 0 {
            let af_len = usize::from(pkt[4]);
            if af_len > 0 {
                discontinuity = pkt[5] & 0x80 != 0;
                random_access = pkt[5] & 0x40 != 0;
            }
            offset += 1 + af_len;
        }
        let payload = (afc & 0x01 != 0 && offset < TS_PACKET_SIZE).then_some(offset);
        Self {
            error: pkt[1] & 0x80 != 0,
            pusi: pkt[1] & 0x40 != 0,
            pid: (u16::from(pkt[1] & 0x1F) << 8) | u16::from(pkt[2]),
            cc: pkt[3] & 0x0F,
            discontinuity,
            random_access,
            payload,
        }
    }
}

/// 从 `at` 起按 `size` 间隔统计连续的同步字节数
///
/// 返回 (个数, 是否因流结束而中止).
fn sync_run(window: &mut ByteWindow, at: u64, size: usize) -> LiuResult<(usize, bool)> {
    for k in 0..SYNC_CHECK_PACKETS {
        let pos = at + (k * size) as u64;
        match window.fill_to(pos + 1) {
            Ok(()) => {}
            Err(LiuError::Eof) => return Ok((k, true)),
            Err(e) => return Err(e),
        }
        if window.u8_at(pos)? != TS_SYNC_BYTE {
            return Ok((k, false));
        }
    }
    Ok((SYNC_CHECK_PACKETS, false))
}

/// 从 `from` 起寻找包边界, 返回 (包起始偏移, 包长)
///
/// 188 字节间隔优先; 流末尾只剩一个包时直接接受.
fn find_sync(window: &mut ByteWindow, from: u64, max_resync: u64) -> LiuResult<(u64, usize)> {
    let mut at = from;
    while at - from <= max_resync {
        window.fill_to(at + 1)?;
        if window.u8_at(at)? == TS_SYNC_BYTE {
            let (count, eof) = sync_run(window, at, TS_PACKET_SIZE)?;
            if count >= SYNC_CHECK_PACKETS || (eof && count >= 1) {
                return Ok((at, TS_PACKET_SIZE));
            }
            // M2TS: 同步字节前有 4 字节时间码
            let prefix = (M2TS_PACKET_SIZE - TS_PACKET_SIZE) as u64;
            if at >= from + prefix {
                let (count, _) = sync_run(window, at, M2TS_PACKET_SIZE)?;
                if count >= SYNC_CHECK_PACKETS {
                    return Ok((at - prefix, M2TS_PACKET_SIZE));
                }
            }
        }
        at += 1;
    }
    Err(LiuError::InvalidData(format!(
        "offset={from} 之后 {max_resync} 字节内未找到 TS 同步字节"
    )))
}

/// PSI section 的 section_length 字段
fn section_length(section: &[u8]) -> usize {
    usize::from(section[1] & 0x0F) << 8 | usize::from(section[2])
}

/// 校验 PSI section 的长度, table_id 与 CRC
fn check_section(section: &[u8], table_id: u8, name: &str) -> LiuResult<()> {
    if section.len() < 12 {
        return Err(LiuError::InvalidData(format!(
            "{name} 长度过短: {} 字节",
            section.len()
        )));
    }
    if section[0] != table_id {
        return Err(LiuError::InvalidData(format!(
            "{name} table_id 错误: {:#04X}",
            section[0]
        )));
    }
    if crc32_mpeg2(section) != 0 {
        return Err(LiuError::InvalidData(format!("{name} CRC 校验失败")));
    }
    Ok(())
}

/// 解析 PAT (Program Association Table), 返回第一个节目的 PMT PID
fn parse_pat(section: &[u8]) -> LiuResult<u16> {
    check_section(section, TABLE_PAT, "PAT")?;
    // 跳过 transport_stream_id(2) + version/flags(1) + section_number(1) + last_section(1)
    let entries = &section[8..section.len() - 4];
    // 每个条目 4 字节: program_number(2) + PID(2)
    for entry in entries.chunks_exact(4) {
        let program_number = u16::from(entry[0]) << 8 | u16::from(entry[1]);
        let pid = (u16::from(entry[2] & 0x1F) << 8) | u16::from(entry[3]);
        if program_number != 0 {
            // 非网络 PID → PMT PID, 只取第一个节目
            debug!("TS PAT: program={program_number} PMT_PID={pid:#06X}");
            return Ok(pid);
        }
    }
    Err(LiuError::InvalidData("PAT 中没有节目".into()))
}

/// PMT 中的一个基本流
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PmtEntry {
    pid: u16,
    stream_type: u8,
}

/// 解析 PMT (Program Map Table)
fn parse_pmt(section: &[u8]) -> LiuResult<Vec<PmtEntry>> {
    check_section(section, TABLE_PMT, "PMT")?;
    let prog_info_len = usize::from(section[10] & 0x0F) << 8 | usize::from(section[11]);
    let end = section.len() - 4;
    let mut pos = 12 + prog_info_len;
    let mut entries = Vec::new();
    while pos + 5 <= end {
        let stream_type = section[pos];
        let pid = (u16::from(section[pos + 1] & 0x1F) << 8) | u16::from(section[pos + 2]);
        let es_info_len = usize::from(section[pos + 3] & 0x0F) << 8 | usize::from(section[pos + 4]);
        debug!("TS PMT: stream_type=0x{stream_type:02X} PID={pid:#06X}");
        entries.push(PmtEntry { pid, stream_type });
        pos += 5 + es_info_len;
    }
    Ok(entries)
}

/// PES 包头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PesHeader {
    /// 包头长度 (从起始码算起)
    header_len: usize,
    /// PES_packet_length, 0 表示未指定
    packet_len: usize,
    pts: Option<u64>,
    dts: Option<u64>,
}

impl PesHeader {
    /// 帧负载长度, 长度未指定时为 None
    fn payload_len(&self) -> Option<usize> {
        if self.packet_len == 0 {
            return None;
        }
        (self.packet_len + 6).checked_sub(self.header_len)
    }
}

/// 解析 PES 包头, 包头不完整或起始码错误时返回 None
fn parse_pes_header(data: &[u8]) -> Option<PesHeader> {
    // PES start code: 00 00 01 + stream_id
    if data.len() < 6 || data[0] != 0x00 || data[1] != 0x00 || data[2] != 0x01 {
        return None;
    }
    let stream_id = data[3];
    let packet_len = usize::from(data[4]) << 8 | usize::from(data[5]);

    // 这些 stream_id 没有 PES optional header
    let no_optional = matches!(stream_id, 0xBC | 0xBE | 0xBF | 0xF0 | 0xF1 | 0xF2 | 0xF8 | 0xFF);
    let bare = PesHeader {
        header_len: 6,
        packet_len,
        pts: None,
        dts: None,
    };
    if no_optional {
        return Some(bare);
    }
    // optional header 的固定部分不在本包内
    if data.len() < 9 {
        return None;
    }
    if (data[6] & 0xC0) != 0x80 {
        return Some(bare);
    }

    let pts_dts_flags = (data[7] >> 6) & 0x03;
    let header_len = 9 + usize::from(data[8]);
    if header_len > data.len() {
        return None;
    }
    let pts = (pts_dts_flags >= 2 && header_len >= 14).then(|| parse_timestamp(&data[9..14]));
    let dts = (pts_dts_flags == 3 && header_len >= 19).then(|| parse_timestamp(&data[14..19]));
    Some(PesHeader {
        header_len,
        packet_len,
        pts,
        dts,
    })
}

/// 从 5 字节中提取 33-bit 时间戳
fn parse_timestamp(data: &[u8]) -> u64 {
    let b0 = u64::from(data[0]);
    let b1 = u64::from(data[1]);
    let b2 = u64::from(data[2]);
    let b3 = u64::from(data[3]);
    let b4 = u64::from(data[4]);

    ((b0 >> 1) & 0x07) << 30 | b1 << 22 | (b2 >> 1) << 15 | b3 << 7 | b4 >> 1
}

// ========================
// 传输单元
// ========================

/// 按 TS 包切分数据区
#[derive(Debug)]
struct TsReader {
    /// 包长 (188 或 192)
    packet_size: usize,
    /// PID → 轨道索引
    pids: HashMap<u16, usize>,
    max_resync: u64,
}

impl TsReader {
    fn new(max_resync: u64) -> Self {
        Self {
            packet_size: TS_PACKET_SIZE,
            pids: HashMap::new(),
            max_resync,
        }
    }

    /// 包内 TS 头部的偏移 (M2TS 为 4)
    fn sync_offset(&self) -> usize {
        self.packet_size - TS_PACKET_SIZE
    }
}

impl UnitReader for TsReader {
    fn read_unit(
        &mut self,
        window: &mut ByteWindow,
        offset: u64,
        _ctx: &mut ScanContext<'_>,
    ) -> LiuResult<(Unit, u64)> {
        let size = self.packet_size;
        window.fill_to(offset + size as u64)?;
        let mut buf = [0u8; M2TS_PACKET_SIZE];
        window.read_at(offset, &mut buf[..size])?;
        let pkt = &buf[self.sync_offset()..size];

        if pkt[0] != TS_SYNC_BYTE {
            let (next, _) = find_sync(window, offset + 1, self.max_resync)?;
            warn!(
                "TS 同步丢失 (offset={offset}), 跳过 {} 字节",
                next - offset
            );
            return Ok((Unit::Skip, next));
        }
        let next = offset + size as u64;

        let header = PacketHeader::parse(pkt);
        if header.error {
            debug!("TS 包传输错误, 跳过 (offset={offset}, PID={:#06X})", header.pid);
            return Ok((Unit::Skip, next));
        }
        let Some(&track) = self.pids.get(&header.pid) else {
            return Ok((Unit::Skip, next));
        };
        let Some(start) = header.payload else {
            return Ok((Unit::Skip, next));
        };
        let payload_at = offset + (self.sync_offset() + start) as u64;
        let payload = &pkt[start..];

        let mut chunk = if header.pusi {
            match parse_pes_header(payload) {
                Some(pes) => {
                    trace!(
                        "PES: PID={:#06X} pts={:?} dts={:?} len={}",
                        header.pid, pes.pts, pes.dts, pes.packet_len
                    );
                    Chunk::starting(
                        ByteRange::new(
                            payload_at + pes.header_len as u64,
                            payload.len() - pes.header_len,
                        ),
                        FrameStart {
                            total: pes.payload_len(),
                            pts: pes.pts,
                            dts: pes.dts,
                            key: header.random_access,
                        },
                    )
                }
                None => {
                    // 该 PES 的数据一律丢弃, 直到下一个有效的 PES 起点
                    warn!(
                        "PID {:#06X} 的 PES 包头无效或跨包, 丢弃该 PES (offset={offset})",
                        header.pid
                    );
                    Chunk::broken(ByteRange::new(payload_at, payload.len()))
                }
            }
        } else {
            Chunk::continuation(ByteRange::new(payload_at, payload.len()))
        };
        chunk.continuity = Some(header.cc);
        chunk.discontinuity = header.discontinuity;
        Ok((Unit::Payload { track, chunk }, next))
    }
}

// ========================
// 解封装器
// ========================

/// 头部扫描进度, 数据不足时保留
#[derive(Debug, Default)]
struct PsiScan {
    /// 下一个要检查的偏移
    pos: u64,
    /// 第一个同步包的偏移
    first_packet: Option<u64>,
    pmt_pid: Option<u16>,
    /// 正在收集的 section (按 PID)
    sections: HashMap<u16, Vec<u8>>,
}

impl PsiScan {
    /// 把包负载加入 section 缓冲, 收集完整时返回该 section
    fn feed(&mut self, header: &PacketHeader, pkt: &[u8]) -> Option<Vec<u8>> {
        let payload = &pkt[header.payload?..];
        if header.pusi {
            let pointer = usize::from(payload[0]);
            let section = payload.get(1 + pointer..)?;
            self.sections.insert(header.pid, section.to_vec());
        } else {
            self.sections.get_mut(&header.pid)?.extend_from_slice(payload);
        }
        let buf = self.sections.get(&header.pid)?;
        if buf.len() < 3 || buf.len() < 3 + section_length(buf) {
            return None;
        }
        let mut section = self.sections.remove(&header.pid)?;
        section.truncate(3 + section_length(&section));
        Some(section)
    }
}

/// 把头部扫描中的流结束视为格式错误
fn eof_as_invalid(e: LiuError) -> LiuError {
    match e {
        LiuError::Eof => LiuError::InvalidData("流在 PAT/PMT 之前结束".into()),
        other => other,
    }
}

/// MPEG-TS 解封装器
pub struct TsDemuxer {
    window: ByteWindow,
    engine: Engine,
    reader: TsReader,
    scan: PsiScan,
    state: OpenState,
}

impl TsDemuxer {
    /// 创建绑定到字节窗口的解封装器
    pub fn new(window: ByteWindow, config: &DemuxConfig) -> Self {
        Self {
            window,
            engine: Engine::new(config.clone()),
            reader: TsReader::new(config.max_resync),
            scan: PsiScan::default(),
            state: OpenState::NotOpen,
        }
    }

    /// 创建 MPEG-TS 解封装器 (工厂函数)
    pub fn create(window: ByteWindow, config: &DemuxConfig) -> Box<dyn Demuxer> {
        Box::new(Self::new(window, config))
    }

    /// 包长 (188 或 192)
    pub fn packet_size(&self) -> usize {
        self.reader.packet_size
    }

    /// 扫描 PAT/PMT, 完成后建立轨道并开始预扫描
    fn scan_header(&mut self) -> LiuResult<()> {
        let max_resync = self.engine.config().max_resync;
        let probe_limit = self.engine.config().probe_limit;
        loop {
            let first = match self.scan.first_packet {
                Some(first) => first,
                None => {
                    let (start, size) =
                        find_sync(&mut self.window, self.scan.pos, max_resync).map_err(eof_as_invalid)?;
                    debug!("TS: 首个同步包 offset={start}, 包长 {size}");
                    self.reader.packet_size = size;
                    self.scan.first_packet = Some(start);
                    self.scan.pos = start;
                    start
                }
            };
            if self.scan.pos - first > probe_limit {
                return Err(LiuError::InvalidData(format!(
                    "{probe_limit} 字节内未找到 PAT/PMT"
                )));
            }

            let pos = self.scan.pos;
            let size = self.reader.packet_size;
            self.window
                .fill_to(pos + size as u64)
                .map_err(eof_as_invalid)?;
            let mut buf = [0u8; M2TS_PACKET_SIZE];
            self.window.read_at(pos, &mut buf[..size])?;
            let pkt = &buf[self.reader.sync_offset()..size];
            if pkt[0] != TS_SYNC_BYTE {
                let (next, _) =
                    find_sync(&mut self.window, pos + 1, max_resync).map_err(eof_as_invalid)?;
                warn!("TS 头部扫描时同步丢失 (offset={pos}), 跳到 {next}");
                self.scan.pos = next;
                continue;
            }
            self.scan.pos = pos + size as u64;

            let header = PacketHeader::parse(pkt);
            if header.error {
                continue;
            }
            if header.pid == PID_PAT && self.scan.pmt_pid.is_none() {
                if let Some(section) = self.scan.feed(&header, pkt) {
                    self.scan.pmt_pid = Some(parse_pat(&section)?);
                }
            } else if Some(header.pid) == self.scan.pmt_pid {
                if let Some(section) = self.scan.feed(&header, pkt) {
                    let entries = parse_pmt(&section)?;
                    self.add_tracks(&entries);
                    self.engine.begin_priming(first);
                    return Ok(());
                }
            }
        }
    }

    fn add_tracks(&mut self, entries: &[PmtEntry]) {
        for entry in entries {
            let codec_id = stream_type_to_codec(entry.stream_type);
            if codec_id == CodecId::None {
                debug!(
                    "TS: 忽略 PID={:#06X} (stream_type=0x{:02X})",
                    entry.pid, entry.stream_type
                );
                continue;
            }
            if self.reader.pids.contains_key(&entry.pid) {
                continue;
            }
            let split = if codec_id == CodecId::Aac {
                SplitMode::Adts {
                    clock_rate: Rational::MPEG_CLOCK.den as u32,
                }
            } else {
                SplitMode::Transport
            };
            let setup = TrackSetup {
                split,
                clock_bits: MPEG_CLOCK_BITS,
                detect_sync: matches!(
                    codec_id,
                    CodecId::H264 | CodecId::H265 | CodecId::Mpeg1Video | CodecId::Mpeg2Video
                ),
                in_band_config: true,
            };
            let stream = Stream::new(
                0,
                codec_id,
                Rational::MPEG_CLOCK,
                RawTrack::Ts {
                    pid: entry.pid,
                    stream_type: entry.stream_type,
                },
            );
            let index = self.engine.add_track(stream, setup);
            self.reader.pids.insert(entry.pid, index);
        }
        if self.reader.pids.is_empty() {
            warn!("TS: PMT 中没有可识别的基本流");
        }
    }

    /// 格式错误时回到初始状态
    fn fail(&mut self, e: LiuError) -> LiuError {
        if e.is_bad_format() {
            debug!("TS: 格式错误, 回到初始状态: {e}");
            self.reset();
        }
        e
    }

    fn reset(&mut self) {
        self.engine.clear();
        self.reader.pids.clear();
        self.reader.packet_size = TS_PACKET_SIZE;
        self.scan = PsiScan::default();
        self.state = OpenState::NotOpen;
    }
}

impl Demuxer for TsDemuxer {
    fn format_id(&self) -> FormatId {
        FormatId::MpegTs
    }

    fn name(&self) -> &str {
        "mpegts"
    }

    fn state(&self) -> OpenState {
        self.state
    }

    fn open(&mut self) -> LiuResult<()> {
        loop {
            match self.state {
                OpenState::NotOpen => {
                    self.scan = PsiScan::default();
                    self.state = OpenState::HeaderScan;
                }
                OpenState::HeaderScan => match self.scan_header() {
                    Ok(()) => self.state = OpenState::Priming,
                    Err(e) => return Err(self.fail(e)),
                },
                OpenState::Priming => {
                    if let Err(e) = self.engine.prime(&mut self.reader, &mut self.window) {
                        return Err(self.fail(e));
                    }
                    self.state = OpenState::Opened;
                    debug!(
                        "TS: 打开完成, {} 条轨道, 包长 {}",
                        self.engine.streams().len(),
                        self.reader.packet_size
                    );
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
        self.engine.estimate_end_time(self.window.total_size())
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
}

/// MPEG-TS 格式探测器
pub struct TsProbe;

impl TsProbe {
    /// 从 `pos` 起按 `size` 间隔数同步字节
    fn count_sync(data: &[u8], pos: usize, size: usize) -> usize {
        (pos..data.len())
            .step_by(size)
            .take_while(|&p| data[p] == TS_SYNC_BYTE)
            .count()
    }
}

impl FormatProbe for TsProbe {
    fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeScore> {
        if data.len() >= TS_PACKET_SIZE * 2 {
            // 搜索第一个同步字节并验证后续包
            for pos in 0..data.len().min(1024) {
                if data[pos] != TS_SYNC_BYTE {
                    continue;
                }
                let count = Self::count_sync(data, pos, TS_PACKET_SIZE)
                    .max(Self::count_sync(data, pos, M2TS_PACKET_SIZE));
                if count >= 3 {
                    return Some(SCORE_MAX);
                }
                if count >= 2 {
                    return Some(SCORE_MAX - 10);
                }
            }
        }
        score_by_extension(FormatId::MpegTs, filename)
    }

    fn format_id(&self) -> FormatId {
        FormatId::MpegTs
    }
}
