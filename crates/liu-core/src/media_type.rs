//! 媒体类型定义.

use std::fmt;

/// 轨道的媒体类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaType {
    /// 视频
    Video,
    /// 音频
    Audio,
    /// 其他 (字幕、私有数据等)
    Data,
}

impl MediaType {
    /// 英文名称, 用于日志与 JSON 输出
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Video => "video",
            Self::Audio => "audio",
            Self::Data => "data",
        }
    }
}

impl fmt::Display for MediaType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Video => "视频",
            Self::Audio => "音频",
            Self::Data => "数据",
        };
        write!(f, "{name}")
    }
}
