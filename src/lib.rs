//! # Liu (流)
//!
//! 纯 Rust 实现的增量流式解封装引擎.
//!
//! 数据可以一块一块地到达: 解封装器在数据不足时返回
//! [`LiuError::NeedMoreData`](core::LiuError::NeedMoreData), 补充数据后原样重试即可.
//! 输出的样本以源中的绝对偏移区间描述, 数据片段与输入共享内存.
//!
//! # 快速开始
//!
//! ```rust,no_run
//! use liu::format::{ByteWindow, MemorySource};
//!
//! let data = std::fs::read("input.ts").unwrap();
//! let registry = liu::default_format_registry();
//! let mut demuxer = registry
//!     .create_for_input(ByteWindow::new(MemorySource::new(data)), Some("input.ts"))
//!     .unwrap();
//! demuxer.open().unwrap();
//! while let Ok(sample) = demuxer.get_sample() {
//!     println!("#{} dts={}us {} 字节", sample.stream_index, sample.dts, sample.size);
//! }
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `liu-core` | 错误类型, 有理数时间基, 编解码器标识, 时间戳展开, CRC |
//! | `liu-format` | 字节窗口与数据源, 帧重组, TS/FLV/ASF 解封装器, 格式探测 |

/// 核心类型与工具
pub use liu_core as core;

/// 容器格式与解封装器
pub use liu_format as format;

pub mod logging;

/// 获取 Liu 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

/// 创建已注册所有内置容器格式的注册表
pub fn default_format_registry() -> liu_format::FormatRegistry {
    let mut registry = liu_format::FormatRegistry::new();
    liu_format::register_all(&mut registry);
    registry
}
