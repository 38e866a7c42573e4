//! 字节窗口.
//!
//! [`ByteWindow`] 在数据源之上维护一段连续的绝对偏移区间 `[low, high)`,
//! 由若干不可变数据块组成, 解析器通过绝对偏移访问其中任意字节.
//! 读指针 (cursor) 只能在 `[low, high]` 内移动; `drop_consumed` 释放 cursor
//! 之前的数据块.
//!
//! 数据不足时所有操作返回 [`LiuError::NeedMoreData`], 调用方在数据源补充后
//! 重新调用即可; 数据源结束后返回 [`LiuError::Eof`].

use std::collections::VecDeque;

use bytes::{Bytes, BytesMut};
use liu_core::{LiuError, LiuResult};
use log::trace;

use crate::source::{ByteSource, FillStatus, MemorySource};

/// 一段绝对偏移区间
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ByteRange {
    /// 起始偏移
    pub offset: u64,
    /// 长度
    pub len: usize,
}

impl ByteRange {
    pub const fn new(offset: u64, len: usize) -> Self {
        Self { offset, len }
    }

    /// 结束偏移 (不含)
    pub const fn end(&self) -> u64 {
        self.offset + self.len as u64
    }

    /// 在 `n` 字节处切分
    pub fn split_at(self, n: usize) -> (ByteRange, ByteRange) {
        let n = n.min(self.len);
        (
            ByteRange::new(self.offset, n),
            ByteRange::new(self.offset + n as u64, self.len - n),
        )
    }
}

/// 一组区间的总长度
pub fn ranges_len(ranges: &[ByteRange]) -> usize {
    ranges.iter().map(|r| r.len).sum()
}

/// 窗口中的一个数据块
struct WindowChunk {
    start: u64,
    data: Bytes,
}

impl WindowChunk {
    fn end(&self) -> u64 {
        self.start + self.data.len() as u64
    }
}

/// 字节窗口
pub struct ByteWindow {
    source: Box<dyn ByteSource>,
    chunks: VecDeque<WindowChunk>,
    /// 最低可访问偏移
    low: u64,
    /// 已接收数据的结束偏移
    high: u64,
    /// 读指针
    cursor: u64,
    /// 数据源已结束
    eos: bool,
    /// try_fill 的临时输出
    scratch: Vec<Bytes>,
}

impl ByteWindow {
    /// 基于数据源创建窗口
    pub fn new(source: impl ByteSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            chunks: VecDeque::new(),
            low: 0,
            high: 0,
            cursor: 0,
            eos: false,
            scratch: Vec::new(),
        }
    }

    /// 基于完整的内存数据创建窗口
    pub fn from_bytes(data: impl Into<Bytes>) -> Self {
        Self::new(MemorySource::new(data))
    }

    /// 读指针位置
    pub fn position(&self) -> u64 {
        self.cursor
    }

    /// 最低可访问偏移
    pub fn low(&self) -> u64 {
        self.low
    }

    /// 已接收数据的结束偏移
    pub fn high(&self) -> u64 {
        self.high
    }

    /// 读指针之后已缓冲的字节数
    pub fn available(&self) -> u64 {
        self.high - self.cursor
    }

    /// 数据源已结束且读指针到达末尾
    pub fn is_eof(&self) -> bool {
        self.eos && self.cursor >= self.high
    }

    /// 数据源已结束 (不再有新数据)
    pub fn source_ended(&self) -> bool {
        self.eos
    }

    /// 数据源总大小 (如果可知)
    pub fn total_size(&self) -> Option<u64> {
        self.source.size()
    }

    /// 当前持有的数据块数
    pub fn chunk_count(&self) -> usize {
        self.chunks.len()
    }

    /// 确保读指针之后至少有 `min_bytes` 字节
    pub fn more(&mut self, min_bytes: usize) -> LiuResult<()> {
        self.fill_to(self.cursor + min_bytes as u64)
    }

    /// 确保数据至少接收到绝对偏移 `end`
    pub fn fill_to(&mut self, end: u64) -> LiuResult<()> {
        while self.high < end {
            if self.eos {
                return Err(LiuError::Eof);
            }
            let want = usize::try_from(end - self.high).unwrap_or(usize::MAX);
            let status = self.source.try_fill(want, &mut self.scratch)?;
            let mut appended = 0usize;
            for data in self.scratch.drain(..) {
                if data.is_empty() {
                    continue;
                }
                appended += data.len();
                let start = self.high;
                self.high += data.len() as u64;
                self.chunks.push_back(WindowChunk { start, data });
            }
            trace!("字节窗口补充 {appended} 字节, high={}", self.high);
            match status {
                FillStatus::Ready if appended > 0 => {}
                FillStatus::Ready | FillStatus::WouldBlock => {
                    if self.high < end {
                        return Err(LiuError::NeedMoreData);
                    }
                }
                FillStatus::EndOfStream => {
                    self.eos = true;
                    if self.high < end {
                        return Err(LiuError::Eof);
                    }
                }
            }
        }
        Ok(())
    }

    /// 释放读指针之前的数据
    pub fn drop_consumed(&mut self) {
        self.release_to(self.cursor);
    }

    /// 释放 `offset` 之前的数据, 不超过读指针
    pub fn release_to(&mut self, offset: u64) {
        let offset = offset.min(self.cursor);
        if offset <= self.low {
            return;
        }
        self.low = offset;
        while self.chunks.front().is_some_and(|c| c.end() <= self.low) {
            self.chunks.pop_front();
        }
        self.source.release(self.low);
    }

    /// 移动读指针
    ///
    /// 低于 `low` 返回越界错误; 超过 `high` 时先补充数据.
    pub fn seek(&mut self, offset: u64) -> LiuResult<()> {
        if offset < self.low {
            return Err(LiuError::OutOfRange(format!(
                "偏移 {offset} 已被释放 (low={})",
                self.low
            )));
        }
        if offset > self.high {
            self.fill_to(offset)?;
        }
        self.cursor = offset;
        Ok(())
    }

    /// 跳过 `n` 字节
    pub fn skip(&mut self, n: u64) -> LiuResult<()> {
        self.seek(self.cursor + n)
    }

    /// 从读指针处读取 `n` 字节并前移读指针
    ///
    /// 只使用已缓冲的数据, 不足时返回 `NeedMoreData`.
    pub fn read(&mut self, n: usize) -> LiuResult<Bytes> {
        let data = self.bytes_at(self.cursor, n)?;
        self.cursor += n as u64;
        Ok(data)
    }

    /// 检查 `[offset, offset+len)` 是否都在窗口内
    fn check_range(&self, offset: u64, len: usize) -> LiuResult<()> {
        if offset < self.low {
            return Err(LiuError::OutOfRange(format!(
                "偏移 {offset} 已被释放 (low={})",
                self.low
            )));
        }
        if offset + len as u64 > self.high {
            return Err(if self.eos {
                LiuError::Eof
            } else {
                LiuError::NeedMoreData
            });
        }
        Ok(())
    }

    /// 包含 `offset` 的数据块下标
    fn chunk_index(&self, offset: u64) -> usize {
        self.chunks.partition_point(|c| c.end() <= offset)
    }

    /// 获取 `[offset, offset+len)` 的数据
    ///
    /// 落在同一个数据块内时零拷贝, 跨块时拼接.
    pub fn bytes_at(&self, offset: u64, len: usize) -> LiuResult<Bytes> {
        self.check_range(offset, len)?;
        if len == 0 {
            return Ok(Bytes::new());
        }
        let idx = self.chunk_index(offset);
        let chunk = &self.chunks[idx];
        let rel = (offset - chunk.start) as usize;
        if rel + len <= chunk.data.len() {
            return Ok(chunk.data.slice(rel..rel + len));
        }
        let mut buf = BytesMut::with_capacity(len);
        for piece in self.pieces(offset, len, idx) {
            buf.extend_from_slice(&piece);
        }
        Ok(buf.freeze())
    }

    /// 把 `offset` 处的数据复制到 `buf`
    pub fn read_at(&self, offset: u64, buf: &mut [u8]) -> LiuResult<()> {
        self.check_range(offset, buf.len())?;
        if buf.is_empty() {
            return Ok(());
        }
        let idx = self.chunk_index(offset);
        let mut pos = 0;
        for piece in self.pieces(offset, buf.len(), idx) {
            buf[pos..pos + piece.len()].copy_from_slice(&piece);
            pos += piece.len();
        }
        Ok(())
    }

    /// 读取一个字节
    pub fn u8_at(&self, offset: u64) -> LiuResult<u8> {
        let mut b = [0u8; 1];
        self.read_at(offset, &mut b)?;
        Ok(b[0])
    }

    /// 从第 `idx` 个数据块起, 按块切出覆盖 `[offset, offset+len)` 的零拷贝片段
    fn pieces(&self, offset: u64, len: usize, idx: usize) -> Vec<Bytes> {
        let mut out = Vec::new();
        let mut pos = offset;
        let end = offset + len as u64;
        for chunk in self.chunks.range(idx..) {
            if pos >= end {
                break;
            }
            let rel = (pos - chunk.start) as usize;
            let take = (chunk.end().min(end) - pos) as usize;
            out.push(chunk.data.slice(rel..rel + take));
            pos += take as u64;
        }
        out
    }

    /// 把一组区间解析为零拷贝数据片段
    pub fn slices(&self, ranges: &[ByteRange]) -> LiuResult<Vec<Bytes>> {
        let mut out = Vec::with_capacity(ranges.len());
        for r in ranges {
            self.check_range(r.offset, r.len)?;
            if r.len == 0 {
                continue;
            }
            let idx = self.chunk_index(r.offset);
            out.extend(self.pieces(r.offset, r.len, idx));
        }
        Ok(out)
    }

    /// 拷贝一组区间开头的最多 `limit` 字节
    pub fn gather(&self, ranges: &[ByteRange], limit: usize) -> LiuResult<Vec<u8>> {
        let total = ranges_len(ranges).min(limit);
        let mut buf = vec![0u8; total];
        let mut pos = 0;
        for r in ranges {
            if pos >= total {
                break;
            }
            let take = r.len.min(total - pos);
            self.read_at(r.offset, &mut buf[pos..pos + take])?;
            pos += take;
        }
        Ok(buf)
    }
}

impl std::fmt::Debug for ByteWindow {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ByteWindow")
            .field("low", &self.low)
            .field("cursor", &self.cursor)
            .field("high", &self.high)
            .field("chunks", &self.chunks.len())
            .field("eos", &self.eos)
            .finish()
    }
}
