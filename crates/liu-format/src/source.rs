//! 字节数据源.
//!
//! [`ByteSource`] 是字节窗口的上游: 以非阻塞方式交付数据块, 数据暂时不足时
//! 返回 [`FillStatus::WouldBlock`] 而不是阻塞等待. 提供三种实现:
//! - [`MemorySource`]: 内存数据, 可按固定分片大小交付, 便于模拟网络分片
//! - [`ReaderSource`]: 任意 `std::io::Read` (文件等)
//! - [`PushSource`]: 由其它线程通过 [`PushHandle`] 推送数据 (直播, 网络接收)

use std::collections::VecDeque;
use std::fs::File;
use std::io::{self, Read};
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

use bytes::Bytes;
use log::debug;

/// 一次补充数据的结果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FillStatus {
    /// 已交付数据, 之后可能还有更多
    Ready,
    /// 暂时没有更多数据, 稍后重试
    WouldBlock,
    /// 数据源已结束, 本次交付的是最后的数据
    EndOfStream,
}

/// 字节数据源 trait
///
/// 实现者按顺序交付数据块, 每个块追加到 `out` 末尾. 块一旦交付即不可变.
pub trait ByteSource: Send {
    /// 尝试交付至少 `min_bytes` 字节
    ///
    /// 可以交付少于 `min_bytes` 的数据 (此时返回 `WouldBlock` 或 `EndOfStream`),
    /// 也可以交付更多.
    fn try_fill(&mut self, min_bytes: usize, out: &mut Vec<Bytes>) -> io::Result<FillStatus>;

    /// 通知数据源 `up_to` 之前的字节已不再需要
    fn release(&mut self, _up_to: u64) {}

    /// 数据总大小 (如果可知)
    fn size(&self) -> Option<u64> {
        None
    }
}

// ============================================================
// 内存数据源
// ============================================================

/// 内存数据源
pub struct MemorySource {
    /// 全部数据
    data: Bytes,
    /// 已交付位置
    pos: usize,
    /// 每次最多交付的分片大小
    piece: usize,
}

impl MemorySource {
    /// 一次交付全部数据
    pub fn new(data: impl Into<Bytes>) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            piece: usize::MAX,
        }
    }

    /// 按 `piece` 字节分片交付
    ///
    /// 每次 `try_fill` 只交付一片, 不足时返回 `WouldBlock`, 模拟逐包到达的网络输入.
    pub fn chunked(data: impl Into<Bytes>, piece: usize) -> Self {
        Self {
            data: data.into(),
            pos: 0,
            piece: piece.max(1),
        }
    }
}

impl ByteSource for MemorySource {
    fn try_fill(&mut self, min_bytes: usize, out: &mut Vec<Bytes>) -> io::Result<FillStatus> {
        let remaining = self.data.len() - self.pos;
        if remaining == 0 {
            return Ok(FillStatus::EndOfStream);
        }
        let n = remaining.min(self.piece);
        out.push(self.data.slice(self.pos..self.pos + n));
        self.pos += n;
        if self.pos == self.data.len() {
            Ok(FillStatus::EndOfStream)
        } else if n >= min_bytes || self.piece == usize::MAX {
            Ok(FillStatus::Ready)
        } else {
            Ok(FillStatus::WouldBlock)
        }
    }

    fn size(&self) -> Option<u64> {
        Some(self.data.len() as u64)
    }
}

// ============================================================
// Read 数据源
// ============================================================

/// 默认读取块大小 (32 KB)
const DEFAULT_READ_SIZE: usize = 32 * 1024;

/// 基于 `std::io::Read` 的数据源
///
/// 底层读取返回 `ErrorKind::WouldBlock` 时 (非阻塞套接字等) 映射为 `FillStatus::WouldBlock`.
pub struct ReaderSource<R> {
    reader: R,
    read_size: usize,
    size: Option<u64>,
}

impl<R: Read + Send> ReaderSource<R> {
    /// 包装一个读取器
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            read_size: DEFAULT_READ_SIZE,
            size: None,
        }
    }

    /// 设置每次读取的块大小
    pub fn with_read_size(mut self, read_size: usize) -> Self {
        self.read_size = read_size.max(1);
        self
    }

    /// 设置已知的数据总大小
    pub fn with_size(mut self, size: u64) -> Self {
        self.size = Some(size);
        self
    }
}

impl ReaderSource<File> {
    /// 打开文件
    pub fn open_file(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::open(path)?;
        let size = file.metadata()?.len();
        Ok(Self::new(file).with_size(size))
    }
}

impl<R: Read + Send> ByteSource for ReaderSource<R> {
    fn try_fill(&mut self, min_bytes: usize, out: &mut Vec<Bytes>) -> io::Result<FillStatus> {
        let mut delivered = 0usize;
        while delivered < min_bytes.max(1) {
            let mut buf = vec![0u8; self.read_size.max(min_bytes - delivered)];
            match self.reader.read(&mut buf) {
                Ok(0) => return Ok(FillStatus::EndOfStream),
                Ok(n) => {
                    buf.truncate(n);
                    delivered += n;
                    out.push(Bytes::from(buf));
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) if e.kind() == io::ErrorKind::WouldBlock => {
                    return Ok(FillStatus::WouldBlock);
                }
                Err(e) => return Err(e),
            }
        }
        Ok(FillStatus::Ready)
    }

    fn size(&self) -> Option<u64> {
        self.size
    }
}

// ============================================================
// 推送数据源
// ============================================================

/// 推送队列的共享状态
#[derive(Default)]
struct PushQueue {
    /// 已推送未交付的数据块
    chunks: VecDeque<Bytes>,
    /// 生产者已结束
    finished: bool,
    /// 生产者报告的错误
    error: Option<(io::ErrorKind, String)>,
    /// 累计推送字节数
    pushed: u64,
    /// 消费方已释放到的偏移
    released: u64,
}

/// 推送数据源 (消费端)
pub struct PushSource {
    queue: Arc<Mutex<PushQueue>>,
}

/// 推送数据源的生产端, 可跨线程使用
#[derive(Clone)]
pub struct PushHandle {
    queue: Arc<Mutex<PushQueue>>,
}

fn lock_queue(queue: &Mutex<PushQueue>) -> io::Result<MutexGuard<'_, PushQueue>> {
    queue
        .lock()
        .map_err(|_| io::Error::other("推送队列锁已中毒"))
}

impl PushSource {
    /// 创建推送数据源及其生产端
    pub fn new() -> (PushSource, PushHandle) {
        let queue = Arc::new(Mutex::new(PushQueue::default()));
        (
            PushSource {
                queue: Arc::clone(&queue),
            },
            PushHandle { queue },
        )
    }
}

impl ByteSource for PushSource {
    fn try_fill(&mut self, _min_bytes: usize, out: &mut Vec<Bytes>) -> io::Result<FillStatus> {
        let mut q = lock_queue(&self.queue)?;
        let had_data = !q.chunks.is_empty();
        out.extend(q.chunks.drain(..));
        if had_data {
            return Ok(if q.finished {
                FillStatus::EndOfStream
            } else {
                FillStatus::Ready
            });
        }
        if let Some((kind, msg)) = &q.error {
            return Err(io::Error::new(*kind, msg.clone()));
        }
        if q.finished {
            Ok(FillStatus::EndOfStream)
        } else {
            Ok(FillStatus::WouldBlock)
        }
    }

    fn release(&mut self, up_to: u64) {
        if let Ok(mut q) = self.queue.lock() {
            q.released = q.released.max(up_to);
        }
    }
}

impl PushHandle {
    /// 推送一块数据, 数据源结束后推送的数据被丢弃
    pub fn push(&self, data: impl Into<Bytes>) -> io::Result<()> {
        let data = data.into();
        let mut q = lock_queue(&self.queue)?;
        if q.finished {
            debug!("推送数据源已结束, 丢弃 {} 字节", data.len());
            return Ok(());
        }
        if !data.is_empty() {
            q.pushed += data.len() as u64;
            q.chunks.push_back(data);
        }
        Ok(())
    }

    /// 标记数据源结束
    pub fn finish(&self) -> io::Result<()> {
        lock_queue(&self.queue)?.finished = true;
        Ok(())
    }

    /// 报告数据源错误, 队列中剩余数据交付完后消费方收到该错误
    pub fn fail(&self, kind: io::ErrorKind, message: impl Into<String>) -> io::Result<()> {
        lock_queue(&self.queue)?.error = Some((kind, message.into()));
        Ok(())
    }

    /// 累计推送字节数
    pub fn pushed(&self) -> u64 {
        self.queue.lock().map(|q| q.pushed).unwrap_or(0)
    }

    /// 消费方已释放到的偏移
    pub fn released(&self) -> u64 {
        self.queue.lock().map(|q| q.released).unwrap_or(0)
    }
}
