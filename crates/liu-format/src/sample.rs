//! 解封装输出的媒体样本.

use bitflags::bitflags;
use bytes::Bytes;

use crate::window::ByteRange;

bitflags! {
    /// 样本标志
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct SampleFlags: u32 {
        /// 同步样本 (关键帧, 可独立解码)
        const SYNC = 0x0001;
        /// 该样本之前的数据有丢失 (连续计数器跳变等)
        const DISCONTINUITY = 0x0002;
        /// 样本数据不完整 (被下一帧的起始标记截断)
        const TRUNCATED = 0x0004;
    }
}

/// 媒体样本
///
/// 一个完整的编码帧. 时间戳单位为微秒, 相对于配置的时间零点.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sample {
    /// 所属轨道索引
    pub stream_index: usize,
    /// 解码时间戳 (微秒)
    pub dts: i64,
    /// 合成时间偏移 (微秒), pts = dts + cts
    pub cts: i64,
    /// 标志
    pub flags: SampleFlags,
    /// 数据总长度
    pub size: usize,
    /// 数据在源中的绝对偏移区间, 按顺序拼接即为样本数据
    pub ranges: Vec<ByteRange>,
    /// 与 `ranges` 对应的数据片段
    pub data: Vec<Bytes>,
}

impl Sample {
    /// 显示时间戳 (微秒)
    pub fn pts(&self) -> i64 {
        self.dts + self.cts
    }

    /// 是否为关键帧
    pub fn is_sync(&self) -> bool {
        self.flags.contains(SampleFlags::SYNC)
    }

    /// 把数据片段拼接为连续缓冲区
    pub fn copy_to_vec(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.size);
        for piece in &self.data {
            out.extend_from_slice(piece);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_样本拼接() {
        let sample = Sample {
            stream_index: 0,
            dts: 40_000,
            cts: 80_000,
            flags: SampleFlags::SYNC,
            size: 5,
            ranges: vec![ByteRange::new(0, 2), ByteRange::new(10, 3)],
            data: vec![Bytes::from_static(&[1, 2]), Bytes::from_static(&[3, 4, 5])],
        };
        assert_eq!(sample.copy_to_vec(), vec![1, 2, 3, 4, 5]);
        assert_eq!(sample.pts(), 120_000);
        assert!(sample.is_sync());
    }
}
