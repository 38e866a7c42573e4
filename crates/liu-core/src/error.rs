//! 统一错误类型定义.
//!
//! 所有 Liu crate 共用的错误类型. 增量解析中的 "数据不足" 与 "流结束"
//! 也以错误变体表达, 以便用 `?` 沿解析调用链原样上抛.

use thiserror::Error;

/// Liu 统一错误类型
#[derive(Debug, Error)]
pub enum LiuError {
    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),

    /// 不支持的操作 (例如 seek 到非零时间)
    #[error("不支持的操作: {0}")]
    Unsupported(String),

    /// 容器格式错误
    #[error("格式错误: {0}")]
    Format(String),

    /// 数据源 I/O 错误
    #[error("I/O 错误: {0}")]
    Io(#[from] std::io::Error),

    /// 数据不足, 需要数据源补充更多字节后重试
    #[error("数据不足, 需要更多输入")]
    NeedMoreData,

    /// 已到达流末尾
    #[error("已到达流末尾")]
    Eof,

    /// 解封装器尚未打开
    #[error("解封装器尚未打开")]
    NotOpen,

    /// 偏移或索引越界 (例如访问已释放的字节)
    #[error("越界访问: {0}")]
    OutOfRange(String),

    /// 未找到指定的容器格式
    #[error("未找到容器格式: {0}")]
    FormatNotFound(String),

    /// 未找到指定的流
    #[error("未找到流: 索引 {0}")]
    StreamNotFound(usize),

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 内部错误 (不应发生)
    #[error("内部错误: {0}")]
    Internal(String),
}

impl LiuError {
    /// 是否为 "稍后重试" 状态 (数据不足)
    pub fn is_would_block(&self) -> bool {
        matches!(self, Self::NeedMoreData)
    }

    /// 是否为码流语法错误 (bad format)
    pub fn is_bad_format(&self) -> bool {
        matches!(self, Self::InvalidData(_) | Self::Format(_))
    }

    /// 是否会终止当前数据源的播放
    ///
    /// 数据不足与调用方误用都不算致命.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::InvalidData(_) | Self::Format(_) | Self::Io(_) | Self::Internal(_)
        )
    }
}

/// Liu 统一 Result 类型
pub type LiuResult<T> = Result<T, LiuError>;
