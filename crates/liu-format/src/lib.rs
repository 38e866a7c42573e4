//! # liu-format
//!
//! Liu 流式解封装引擎的容器格式库.
//!
//! 数据经由 [`ByteSource`] 增量进入 [`ByteWindow`], 解封装器在窗口上按绝对偏移
//! 解析容器结构, 把分散在传输单元中的负载重组为完整的帧, 以 [`Sample`] 输出.
//! 所有操作都可以在数据不足时中断 (`NeedMoreData`) 并在之后原样重试.
//!
//! 支持的容器: MPEG-TS (含 192 字节 M2TS), FLV, ASF.

pub mod config;
pub mod demuxer;
pub mod demuxers;
pub mod elementary;
pub(crate) mod engine;
pub mod format_id;
pub mod probe;
pub mod reassembler;
pub mod registry;
pub mod sample;
pub mod source;
pub mod stream;
pub mod window;

// 重导出常用类型
pub use config::{DemuxConfig, TimestampOrigin};
pub use demuxer::{Demuxer, OpenState};
pub use format_id::FormatId;
pub use probe::ProbeResult;
pub use registry::FormatRegistry;
pub use sample::{Sample, SampleFlags};
pub use source::{ByteSource, FillStatus, MemorySource, PushHandle, PushSource, ReaderSource};
pub use stream::{RawTrack, Stream, StreamParams};
pub use window::{ByteRange, ByteWindow};

/// 注册所有内置容器格式
pub fn register_all(registry: &mut FormatRegistry) {
    demuxers::register_all_demuxers(registry);
}
