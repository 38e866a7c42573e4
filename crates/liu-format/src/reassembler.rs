//! 帧重组.
//!
//! 容器把一帧编码数据拆成若干传输块 (TS 包, ASF 负载等). [`FrameReassembler`]
//! 按轨道收集这些块的字节区间, 直到凑齐一帧. 它只记录区间, 不复制数据,
//! 数据在帧完成时由调用方从字节窗口取出.
//!
//! 两种切分方式:
//! - [`SplitMode::Transport`]: 以传输层的起始标记和声明长度划分帧
//! - [`SplitMode::Adts`]: 忽略传输层边界, 按 ADTS 帧头长度切分 AAC 帧

use std::mem;

use liu_core::LiuResult;
use log::{trace, warn};

use crate::elementary::{AdtsHeader, find_adts_sync};
use crate::window::{ByteRange, ByteWindow};

/// ADTS 失步时一次最多扫描的字节数
const ADTS_RESYNC_SCAN: usize = 8192;

/// 每个 AAC 帧的采样数
const AAC_FRAME_SAMPLES: u64 = 1024;

/// 帧起始信息, 由带起始标记的传输块携带
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameStart {
    /// 帧的总长度 (未知时为 None, 由下一个起始标记结束)
    pub total: Option<usize>,
    /// 原始 PTS
    pub pts: Option<u64>,
    /// 原始 DTS
    pub dts: Option<u64>,
    /// 容器标记的关键帧 / 随机访问点
    pub key: bool,
}

/// 一个传输块
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Chunk {
    /// 负载的绝对区间
    pub range: ByteRange,
    /// 起始标记, 新帧从此块开始
    pub start: Option<FrameStart>,
    /// 传输层连续计数器 (TS continuity_counter)
    pub continuity: Option<u8>,
    /// 传输层声明的不连续点
    pub discontinuity: bool,
    /// 所属媒体对象编号 (ASF), 同一帧的块编号相同
    pub object: Option<u32>,
    /// 带起始标记但帧头无法解析, 块内数据不可用
    pub broken: bool,
}

impl Chunk {
    /// 延续块 (无起始标记)
    pub fn continuation(range: ByteRange) -> Self {
        Self {
            range,
            start: None,
            continuity: None,
            discontinuity: false,
            object: None,
            broken: false,
        }
    }

    /// 起始块
    pub fn starting(range: ByteRange, start: FrameStart) -> Self {
        Self {
            start: Some(start),
            ..Self::continuation(range)
        }
    }

    /// 帧头损坏的起始块: 结束进行中的帧, 并丢弃其后的延续块直到下一个起始块
    pub fn broken(range: ByteRange) -> Self {
        Self {
            broken: true,
            ..Self::continuation(range)
        }
    }

    /// 标记所属媒体对象
    pub fn with_object(mut self, object: u32) -> Self {
        self.object = Some(object);
        self
    }
}

/// 重组完成的帧
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    /// 数据区间
    pub ranges: Vec<ByteRange>,
    /// 数据长度
    pub size: usize,
    /// 原始 PTS
    pub pts: Option<u64>,
    /// 原始 DTS
    pub dts: Option<u64>,
    /// 容器标记的关键帧
    pub key: bool,
    /// 数据不完整
    pub truncated: bool,
}

/// 推入一个传输块的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Push {
    /// 已接收, 帧尚未完成
    Pending,
    /// 已接收, 帧已完成, 通过 `poll` 取出
    Complete,
    /// 未接收: 已结束当前帧, 取出后须重新推入此块
    Rewind,
    /// 无所属帧的孤立数据, 已丢弃
    Discarded,
}

/// 帧切分方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SplitMode {
    /// 按传输层起始标记与声明长度
    Transport,
    /// 按 ADTS 帧头, `clock_rate` 为原始时间戳的时钟频率
    Adts { clock_rate: u32 },
}

/// 已接收的一段数据及其所属传输单元的偏移
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Piece {
    range: ByteRange,
    unit: u64,
}

/// 在累计 `n` 字节处切分, 被切开的片段两半沿用同一单元偏移
fn split_pieces(pieces: &[Piece], n: usize) -> (Vec<Piece>, Vec<Piece>) {
    let mut head = Vec::new();
    let mut tail = Vec::new();
    let mut left = n;
    for &p in pieces {
        if left == 0 {
            tail.push(p);
        } else if p.range.len <= left {
            head.push(p);
            left -= p.range.len;
        } else {
            let (a, b) = p.range.split_at(left);
            head.push(Piece { range: a, unit: p.unit });
            tail.push(Piece { range: b, unit: p.unit });
            left = 0;
        }
    }
    (head, tail)
}

fn ranges_of(pieces: &[Piece]) -> Vec<ByteRange> {
    pieces.iter().map(|p| p.range).collect()
}

/// 帧重组器 (每条轨道一个)
///
/// 每段数据都记录所属传输单元的起始偏移, 调用方据此确定重新扫描的起点.
#[derive(Debug)]
pub struct FrameReassembler {
    mode: SplitMode,
    /// 进行中的帧起始信息
    current: Option<FrameStart>,
    /// 进行中的帧所属媒体对象
    object: Option<u32>,
    /// 已接收的数据
    pieces: Vec<Piece>,
    /// 已接收字节数
    received: usize,
    /// 超出上一帧声明长度的字节, 作为下一帧的开头
    carry: Vec<Piece>,
    /// 已完成待取出的帧及其首个单元偏移
    ready: Option<(Frame, u64)>,
    /// ADTS: 已见过起始标记
    started: bool,
    /// ADTS: 待分配的 PTS 及其所属负载的起始偏移
    anchor: Option<(u64, u64)>,
    /// ADTS: 外推的下一帧 PTS
    next_pts: Option<u64>,
}

impl FrameReassembler {
    pub fn new(mode: SplitMode) -> Self {
        Self {
            mode,
            current: None,
            object: None,
            pieces: Vec::new(),
            received: 0,
            carry: Vec::new(),
            ready: None,
            started: false,
            anchor: None,
            next_pts: None,
        }
    }

    /// 切分方式
    pub fn mode(&self) -> SplitMode {
        self.mode
    }

    /// 推入一个传输块, `unit` 为其所在传输单元的起始偏移
    pub fn push(&mut self, window: &ByteWindow, unit: u64, chunk: &Chunk) -> LiuResult<Push> {
        if self.ready.is_some() {
            return Ok(Push::Rewind);
        }
        match self.mode {
            SplitMode::Transport => Ok(self.push_transport(unit, chunk)),
            SplitMode::Adts { clock_rate } => self.push_adts(window, unit, chunk, clock_rate),
        }
    }

    fn push_transport(&mut self, unit: u64, chunk: &Chunk) -> Push {
        if chunk.broken {
            if let Some(current) = self.current.take() {
                self.close_current(current, chunk.range.offset);
                return Push::Rewind;
            }
            trace!("丢弃帧头损坏的数据块: offset={}", chunk.range.offset);
            self.carry.clear();
            return Push::Discarded;
        }
        if let Some(start) = chunk.start {
            if let Some(current) = self.current.take() {
                self.close_current(current, chunk.range.offset);
                return Push::Rewind;
            }
            self.current = Some(start);
            self.object = chunk.object;
            self.pieces = mem::take(&mut self.carry);
            self.received = self.pieces.iter().map(|p| p.range.len).sum();
        } else if let Some(current) = self.current {
            if let (Some(got), Some(expected)) = (chunk.object, self.object) {
                if got != expected {
                    warn!(
                        "媒体对象 {expected} 未收齐, 收到对象 {got} 的后续数据 (offset={})",
                        chunk.range.offset
                    );
                    self.current = None;
                    self.close_current(current, chunk.range.offset);
                    return Push::Rewind;
                }
            }
        } else {
            trace!("丢弃无起始标记的数据块: offset={}", chunk.range.offset);
            return Push::Discarded;
        }
        self.append(chunk.range, unit);

        let total = self.current.and_then(|c| c.total);
        match (total, self.current) {
            (Some(total), Some(current)) if self.received >= total => {
                if self.received > total {
                    let (head, tail) = split_pieces(&self.pieces, total);
                    self.pieces = head;
                    self.carry = tail;
                    self.received = total;
                }
                self.current = None;
                self.finish(current, false);
                Push::Complete
            }
            _ => Push::Pending,
        }
    }

    /// 提前结束进行中的帧, 声明长度未收齐时标记为不完整
    fn close_current(&mut self, current: FrameStart, offset: u64) {
        let truncated = current.total.is_some_and(|t| self.received < t);
        if truncated {
            warn!(
                "帧不完整, 已接收 {} / {} 字节, 在 offset={offset} 处被截断",
                self.received,
                current.total.unwrap_or(0),
            );
        }
        self.finish(current, truncated);
    }

    fn push_adts(
        &mut self,
        window: &ByteWindow,
        unit: u64,
        chunk: &Chunk,
        clock_rate: u32,
    ) -> LiuResult<Push> {
        if chunk.broken {
            trace!("ADTS: 丢弃帧头损坏的 PES 数据: offset={}", chunk.range.offset);
            return Ok(Push::Discarded);
        }
        if let Some(start) = chunk.start {
            if let Some(pts) = start.pts {
                self.anchor = Some((chunk.range.offset, pts));
            }
            self.started = true;
        } else if !self.started {
            trace!("丢弃首个 PES 之前的音频数据: offset={}", chunk.range.offset);
            return Ok(Push::Discarded);
        }
        self.append(chunk.range, unit);
        if self.cut_adts(window, clock_rate)? {
            Ok(Push::Complete)
        } else {
            Ok(Push::Pending)
        }
    }

    /// 从已接收数据中切出一个 ADTS 帧
    fn cut_adts(&mut self, window: &ByteWindow, clock_rate: u32) -> LiuResult<bool> {
        if self.ready.is_some() {
            return Ok(true);
        }
        loop {
            if self.received < AdtsHeader::SIZE {
                return Ok(false);
            }
            let ranges = ranges_of(&self.pieces);
            let head = window.gather(&ranges, AdtsHeader::SIZE)?;
            let Some(header) = AdtsHeader::parse(&head) else {
                let probe = window.gather(&ranges, self.received.min(ADTS_RESYNC_SCAN))?;
                let skip = find_adts_sync(&probe, 1)
                    .unwrap_or(probe.len().saturating_sub(1))
                    .max(1);
                warn!("ADTS 同步丢失, 跳过 {skip} 字节");
                self.drop_front(skip);
                continue;
            };
            if self.received < header.frame_length {
                return Ok(false);
            }
            let (frame_pieces, rest) = split_pieces(&self.pieces, header.frame_length);
            self.pieces = rest;
            self.received -= header.frame_length;

            let (offset, unit) = frame_pieces
                .first()
                .map_or((0, 0), |p| (p.range.offset, p.unit));
            let pts = match self.anchor {
                Some((at, pts)) if offset >= at => {
                    self.anchor = None;
                    Some(pts)
                }
                _ => self.next_pts,
            };
            let duration =
                AAC_FRAME_SAMPLES * u64::from(clock_rate) / u64::from(header.sample_rate());
            self.next_pts = pts.map(|p| p + duration);
            let frame = Frame {
                ranges: ranges_of(&frame_pieces),
                size: header.frame_length,
                pts,
                dts: pts,
                key: true,
                truncated: false,
            };
            self.ready = Some((frame, unit));
            return Ok(true);
        }
    }

    fn append(&mut self, range: ByteRange, unit: u64) {
        if range.len == 0 {
            return;
        }
        // 相邻区间合并, 保留较早的单元偏移
        match self.pieces.last_mut() {
            Some(last) if last.range.end() == range.offset => last.range.len += range.len,
            _ => self.pieces.push(Piece { range, unit }),
        }
        self.received += range.len;
    }

    fn drop_front(&mut self, n: usize) {
        let (_, rest) = split_pieces(&self.pieces, n);
        self.pieces = rest;
        self.received = self.received.saturating_sub(n);
    }

    fn finish(&mut self, start: FrameStart, truncated: bool) {
        let pieces = mem::take(&mut self.pieces);
        let size = mem::take(&mut self.received);
        let unit = pieces.first().map_or(0, |p| p.unit);
        let frame = Frame {
            ranges: ranges_of(&pieces),
            size,
            pts: start.pts,
            dts: start.dts,
            key: start.key,
            truncated,
        };
        self.ready = Some((frame, unit));
    }

    /// 取出已完成的帧
    pub fn poll(&mut self, window: &ByteWindow) -> LiuResult<Option<Frame>> {
        if let SplitMode::Adts { clock_rate } = self.mode {
            self.cut_adts(window, clock_rate)?;
        }
        Ok(self.ready.take().map(|(frame, _)| frame))
    }

    /// 流结束时取出进行中的帧, 每次一个
    pub fn flush(&mut self, window: &ByteWindow) -> LiuResult<Option<Frame>> {
        if let Some((frame, _)) = self.ready.take() {
            return Ok(Some(frame));
        }
        match self.mode {
            SplitMode::Transport => {
                if let Some(current) = self.current.take() {
                    let truncated = current.total.is_some_and(|t| self.received < t);
                    if truncated {
                        warn!(
                            "流结束时帧不完整, 已接收 {} / {} 字节",
                            self.received,
                            current.total.unwrap_or(0)
                        );
                    }
                    self.finish(current, truncated);
                }
                self.carry.clear();
            }
            SplitMode::Adts { clock_rate } => {
                if !self.cut_adts(window, clock_rate)? {
                    if self.received >= AdtsHeader::SIZE {
                        warn!("流结束时 ADTS 帧不完整, 已接收 {} 字节", self.received);
                        let pieces = mem::take(&mut self.pieces);
                        let frame = Frame {
                            ranges: ranges_of(&pieces),
                            size: mem::take(&mut self.received),
                            pts: self.next_pts.take(),
                            dts: None,
                            key: true,
                            truncated: true,
                        };
                        self.ready = Some((frame, pieces.first().map_or(0, |p| p.unit)));
                    } else {
                        self.pieces.clear();
                        self.received = 0;
                    }
                }
            }
        }
        Ok(self.ready.take().map(|(frame, _)| frame))
    }

    /// 仍被引用数据所在的最早传输单元偏移
    ///
    /// 包括未完成的帧, 待取出的帧以及预留给下一帧的字节.
    pub fn first_unit(&self) -> Option<u64> {
        [
            self.ready.as_ref().map(|(_, unit)| *unit),
            self.pieces.first().map(|p| p.unit),
            self.carry.first().map(|p| p.unit),
        ]
        .into_iter()
        .flatten()
        .min()
    }

    /// 是否有进行中的数据
    pub fn is_idle(&self) -> bool {
        self.current.is_none()
            && self.pieces.is_empty()
            && self.carry.is_empty()
            && self.ready.is_none()
    }

    /// 清除全部状态
    pub fn reset(&mut self) {
        *self = Self::new(self.mode);
    }
}
