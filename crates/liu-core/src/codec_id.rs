//! 编解码器标识符.
//!
//! 只用于给样本打上格式标签, 不涉及解码.

use std::fmt;

use crate::MediaType;

/// 编解码器标识符
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum CodecId {
    /// 未知编解码器
    None,

    // ========================
    // 视频编解码器
    // ========================
    /// H.264 / AVC
    H264,
    /// H.265 / HEVC
    H265,
    /// AV1
    Av1,
    /// MPEG-1 Video
    Mpeg1Video,
    /// MPEG-2 Video
    Mpeg2Video,
    /// MPEG-4 Part 2
    Mpeg4,
    /// Sorenson H.263 (FLV)
    FlvH263,
    /// On2 VP6 (FLV)
    Vp6,
    /// Windows Media Video 7/8
    Wmv2,
    /// Windows Media Video 9 / VC-1
    Vc1,

    // ========================
    // 音频编解码器
    // ========================
    /// AAC
    Aac,
    /// MP3 (MPEG Audio Layer III)
    Mp3,
    /// MP2 (MPEG Audio Layer II)
    Mp2,
    /// AC-3
    Ac3,
    /// E-AC-3
    Eac3,
    /// DTS
    Dts,
    /// Speex (FLV)
    Speex,
    /// PCM 有符号 16 位小端
    PcmS16le,
    /// Windows Media Audio 1/2
    Wmav2,
    /// Windows Media Audio Pro
    WmaPro,
}

impl CodecId {
    /// 获取编解码器对应的媒体类型
    pub const fn media_type(&self) -> MediaType {
        match self {
            Self::None => MediaType::Data,

            Self::H264
            | Self::H265
            | Self::Av1
            | Self::Mpeg1Video
            | Self::Mpeg2Video
            | Self::Mpeg4
            | Self::FlvH263
            | Self::Vp6
            | Self::Wmv2
            | Self::Vc1 => MediaType::Video,

            Self::Aac
            | Self::Mp3
            | Self::Mp2
            | Self::Ac3
            | Self::Eac3
            | Self::Dts
            | Self::Speex
            | Self::PcmS16le
            | Self::Wmav2
            | Self::WmaPro => MediaType::Audio,
        }
    }

    /// 获取编解码器的名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::None => "none",
            Self::H264 => "h264",
            Self::H265 => "hevc",
            Self::Av1 => "av1",
            Self::Mpeg1Video => "mpeg1video",
            Self::Mpeg2Video => "mpeg2video",
            Self::Mpeg4 => "mpeg4",
            Self::FlvH263 => "flv1",
            Self::Vp6 => "vp6f",
            Self::Wmv2 => "wmv2",
            Self::Vc1 => "vc1",
            Self::Aac => "aac",
            Self::Mp3 => "mp3",
            Self::Mp2 => "mp2",
            Self::Ac3 => "ac3",
            Self::Eac3 => "eac3",
            Self::Dts => "dts",
            Self::Speex => "speex",
            Self::PcmS16le => "pcm_s16le",
            Self::Wmav2 => "wmav2",
            Self::WmaPro => "wmapro",
        }
    }
}

impl fmt::Display for CodecId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
