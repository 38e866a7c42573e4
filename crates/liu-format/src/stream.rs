//! 流信息定义.
//!
//! 描述容器中的一条音视频轨道. 打开完成后轨道信息不再变化.

use liu_core::{CodecId, MediaType, Rational};

/// 流信息
#[derive(Debug, Clone)]
pub struct Stream {
    /// 流索引 (从 0 开始, 打开后固定)
    pub index: usize,
    /// 媒体类型
    pub media_type: MediaType,
    /// 编解码器标识
    pub codec_id: CodecId,
    /// 时间基 (原始时间戳的单位)
    pub time_base: Rational,
    /// 流时长 (以 time_base 为单位, -1 表示未知)
    pub duration: i64,
    /// 起始时间 (首个输出帧的归一化 DTS, 以 time_base 为单位)
    pub start_time: i64,
    /// 编解码器私有数据 (SPS/PPS, AudioSpecificConfig 等)
    pub extra_data: Vec<u8>,
    /// 流特定参数
    pub params: StreamParams,
    /// 元数据
    pub metadata: Vec<(String, String)>,
    /// 容器内的原始轨道标识
    pub raw: RawTrack,
}

/// 流特定参数
#[derive(Debug, Clone, PartialEq)]
pub enum StreamParams {
    /// 视频流参数
    Video(VideoStreamParams),
    /// 音频流参数
    Audio(AudioStreamParams),
    /// 其他
    Other,
}

/// 视频流参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VideoStreamParams {
    /// 宽度 (像素, 0 表示未知)
    pub width: u32,
    /// 高度 (像素, 0 表示未知)
    pub height: u32,
    /// 帧率 (未知时为 0/1)
    pub frame_rate: Rational,
    /// 码率 (bps, 0 表示未知)
    pub bit_rate: u64,
}

/// 音频流参数
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AudioStreamParams {
    /// 采样率 (Hz, 0 表示未知)
    pub sample_rate: u32,
    /// 声道数
    pub channels: u32,
    /// 采样位深
    pub bits_per_sample: u32,
    /// 码率 (bps, 0 表示未知)
    pub bit_rate: u64,
}

/// 容器内的原始轨道标识
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RawTrack {
    /// MPEG-TS 基本流
    Ts {
        /// PID
        pid: u16,
        /// PMT 中的 stream_type
        stream_type: u8,
    },
    /// FLV 音频或视频
    Flv {
        /// SoundFormat 或 CodecID
        codec_tag: u8,
    },
    /// ASF 流
    Asf {
        /// 流编号 (1..=127)
        stream_number: u8,
        /// 音频为 wFormatTag, 视频为 FourCC
        format_tag: u32,
    },
}

impl Stream {
    /// 创建流, 参数按编解码器的媒体类型初始化为默认值
    pub fn new(index: usize, codec_id: CodecId, time_base: Rational, raw: RawTrack) -> Self {
        let media_type = codec_id.media_type();
        Self {
            index,
            media_type,
            codec_id,
            time_base,
            duration: -1,
            start_time: 0,
            extra_data: Vec::new(),
            params: default_params(media_type),
            metadata: Vec::new(),
            raw,
        }
    }

    /// 更新编解码器, 媒体类型与参数随之调整
    pub(crate) fn set_codec(&mut self, codec_id: CodecId) {
        self.codec_id = codec_id;
        if self.media_type != codec_id.media_type() {
            self.media_type = codec_id.media_type();
            self.params = default_params(self.media_type);
        }
    }

    /// 视频参数的可变引用 (非视频流返回 None)
    pub(crate) fn video_mut(&mut self) -> Option<&mut VideoStreamParams> {
        match &mut self.params {
            StreamParams::Video(v) => Some(v),
            _ => None,
        }
    }

    /// 音频参数的可变引用 (非音频流返回 None)
    pub(crate) fn audio_mut(&mut self) -> Option<&mut AudioStreamParams> {
        match &mut self.params {
            StreamParams::Audio(a) => Some(a),
            _ => None,
        }
    }
}

fn default_params(media_type: MediaType) -> StreamParams {
    match media_type {
        MediaType::Video => StreamParams::Video(VideoStreamParams {
            frame_rate: Rational::new(0, 1),
            ..VideoStreamParams::default()
        }),
        MediaType::Audio => StreamParams::Audio(AudioStreamParams::default()),
        MediaType::Data => StreamParams::Other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_按编解码器初始化参数() {
        let mut s = Stream::new(
            0,
            CodecId::None,
            Rational::MILLI,
            RawTrack::Flv { codec_tag: 0 },
        );
        assert_eq!(s.params, StreamParams::Other);
        s.set_codec(CodecId::Aac);
        assert_eq!(s.media_type, MediaType::Audio);
        s.audio_mut().unwrap().sample_rate = 44_100;
        assert!(s.video_mut().is_none());
        assert_eq!(s.duration, -1);
    }
}
