//! # liu-core
//!
//! Liu 流式解封装引擎的核心库, 提供基础类型定义、错误处理和时间戳工具.
//!
//! 容器解析 (`liu-format`) 依赖本 crate 提供的错误类型、时间基、
//! 编解码器标识以及回绕计数器的归一化.

pub mod codec_id;
pub mod crc;
pub mod error;
pub mod media_type;
pub mod rational;
pub mod timestamp;

// 重导出常用类型
pub use codec_id::CodecId;
pub use error::{LiuError, LiuResult};
pub use media_type::MediaType;
pub use rational::Rational;
pub use timestamp::TimestampNormalizer;
