//! 基本流辅助函数.
//!
//! 解封装只需要编码数据的少量语法: 判断一帧是否为同步帧, 从带内码流中
//! 提取参数集, 以及按 ADTS 头切分 AAC 帧. 这里不做任何解码.

use liu_core::CodecId;

/// AAC 采样率表 (sampling_frequency_index)
pub const AAC_SAMPLE_RATES: [u32; 13] = [
    96000, 88200, 64000, 48000, 44100, 32000, 24000, 22050, 16000, 12000, 11025, 8000, 7350,
];

/// ADTS 帧头
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AdtsHeader {
    /// profile (audio object type - 1)
    pub profile: u8,
    /// 采样率索引
    pub sample_rate_index: u8,
    /// 声道配置
    pub channel_config: u8,
    /// 整帧长度 (含帧头)
    pub frame_length: usize,
    /// 无 CRC
    pub protection_absent: bool,
}

impl AdtsHeader {
    /// 固定帧头长度
    pub const SIZE: usize = 7;

    /// 解析 ADTS 帧头, 同步字或字段无效时返回 None
    pub fn parse(data: &[u8]) -> Option<Self> {
        if data.len() < Self::SIZE || !is_adts_sync(data[0], data[1]) {
            return None;
        }
        let profile = (data[2] >> 6) & 0x03;
        let sample_rate_index = (data[2] >> 2) & 0x0F;
        let channel_config = ((data[2] & 0x01) << 2) | ((data[3] >> 6) & 0x03);
        let frame_length = (usize::from(data[3] & 0x03) << 11)
            | (usize::from(data[4]) << 3)
            | (usize::from(data[5]) >> 5);
        if usize::from(sample_rate_index) >= AAC_SAMPLE_RATES.len() || frame_length < Self::SIZE
        {
            return None;
        }
        Some(Self {
            profile,
            sample_rate_index,
            channel_config,
            frame_length,
            protection_absent: data[1] & 0x01 != 0,
        })
    }

    /// 采样率 (Hz)
    pub fn sample_rate(&self) -> u32 {
        AAC_SAMPLE_RATES[usize::from(self.sample_rate_index)]
    }

    /// 帧头长度 (含可选 CRC)
    pub fn header_len(&self) -> usize {
        if self.protection_absent { 7 } else { 9 }
    }

    /// 构造对应的 AudioSpecificConfig (2 字节)
    pub fn audio_specific_config(&self) -> Vec<u8> {
        let object_type = self.profile + 1;
        vec![
            (object_type << 3) | (self.sample_rate_index >> 1),
            ((self.sample_rate_index & 0x01) << 7) | (self.channel_config << 3),
        ]
    }
}

/// 是否为 ADTS 同步字 (12 位 0xFFF, layer 为 0)
pub fn is_adts_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && (b1 & 0xF6) == 0xF0
}

/// 在 `data` 中查找下一个 ADTS 同步字的位置
pub fn find_adts_sync(data: &[u8], from: usize) -> Option<usize> {
    (from..data.len().saturating_sub(1)).find(|&i| is_adts_sync(data[i], data[i + 1]))
}

/// 按起始码切分 Annex-B 码流
///
/// 返回各 NAL 单元 (不含起始码), 空单元被忽略. 除最后一个单元外,
/// 末尾的零字节视为下一个 4 字节起始码的前缀.
pub fn annexb_units(data: &[u8]) -> Vec<&[u8]> {
    let mut starts = Vec::new();
    let mut i = 0;
    while i + 3 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            starts.push(i + 3);
            i += 3;
        } else {
            i += 1;
        }
    }
    let mut units = Vec::with_capacity(starts.len());
    for (k, &begin) in starts.iter().enumerate() {
        let mut end = match starts.get(k + 1) {
            Some(&next) => next - 3,
            None => data.len(),
        };
        while end > begin && data[end - 1] == 0 && k + 1 < starts.len() {
            end -= 1;
        }
        if end > begin {
            units.push(&data[begin..end]);
        }
    }
    units
}

fn h264_nal_type(nal: &[u8]) -> u8 {
    nal[0] & 0x1F
}

fn h265_nal_type(nal: &[u8]) -> u8 {
    (nal[0] >> 1) & 0x3F
}

/// 根据码流内容判断是否为同步帧
///
/// 返回 None 表示该编解码器没有可用的带内判定规则.
pub fn is_sync_frame(codec_id: CodecId, data: &[u8]) -> Option<bool> {
    match codec_id {
        // IDR
        CodecId::H264 => Some(annexb_units(data).iter().any(|n| h264_nal_type(n) == 5)),
        // BLA / IDR / CRA
        CodecId::H265 => Some(
            annexb_units(data)
                .iter()
                .any(|n| (16..=21).contains(&h265_nal_type(n))),
        ),
        CodecId::Mpeg1Video | CodecId::Mpeg2Video => Some(mpeg_video_is_intra(data)),
        _ => None,
    }
}

/// MPEG-1/2 视频: 序列头或 GOP 头, 或 I 帧图像头
fn mpeg_video_is_intra(data: &[u8]) -> bool {
    let mut i = 0;
    while i + 4 <= data.len() {
        if data[i] == 0 && data[i + 1] == 0 && data[i + 2] == 1 {
            match data[i + 3] {
                0xB3 | 0xB8 => return true,
                0x00 => {
                    return data.get(i + 5).is_some_and(|b| (b >> 3) & 0x07 == 1);
                }
                _ => {}
            }
            i += 4;
        } else {
            i += 1;
        }
    }
    false
}

/// 从 Annex-B 码流提取参数集, 以 Annex-B 形式拼接返回
///
/// `complete` 为 false 时数据可能被截断, 最后一个单元不予采用.
pub fn parameter_sets(codec_id: CodecId, data: &[u8], complete: bool) -> Vec<u8> {
    let units = annexb_units(data);
    let usable = if complete {
        units.len()
    } else {
        units.len().saturating_sub(1)
    };
    let mut out = Vec::new();
    for nal in &units[..usable] {
        let keep = match codec_id {
            CodecId::H264 => matches!(h264_nal_type(nal), 7 | 8),
            CodecId::H265 => matches!(h265_nal_type(nal), 32..=34),
            _ => false,
        };
        if keep {
            out.extend_from_slice(&[0, 0, 0, 1]);
            out.extend_from_slice(nal);
        }
    }
    out
}

/// 解析 AudioSpecificConfig 开头的采样率与声道配置
///
/// 返回 (采样率, 声道配置); 显式采样率 (索引 15) 与保留值返回 None.
pub fn parse_audio_specific_config(config: &[u8]) -> Option<(u32, u8)> {
    if config.len() < 2 {
        return None;
    }
    let sample_rate_index = ((config[0] & 0x07) << 1) | (config[1] >> 7);
    let channel_config = (config[1] >> 3) & 0x0F;
    let sample_rate = *AAC_SAMPLE_RATES.get(usize::from(sample_rate_index))?;
    Some((sample_rate, channel_config))
}

/// 该编解码器的轨道在打开前是否需要取得私有数据
pub fn needs_config(codec_id: CodecId) -> bool {
    matches!(codec_id, CodecId::H264 | CodecId::H265 | CodecId::Aac)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 构造 ADTS 帧头 (AAC LC, 48kHz, 双声道)
    fn adts_header(frame_length: usize) -> [u8; 7] {
        let fl = frame_length as u32;
        [
            0xFF,
            0xF1,
            (1 << 6) | (3 << 2),
            (2 << 6) | ((fl >> 11) & 0x03) as u8,
            ((fl >> 3) & 0xFF) as u8,
            (((fl & 0x07) << 5) as u8) | 0x1F,
            0xFC,
        ]
    }

    #[test]
    fn test_adts_帧头解析() {
        let h = AdtsHeader::parse(&adts_header(371)).unwrap();
        assert_eq!(h.frame_length, 371);
        assert_eq!(h.sample_rate(), 48_000);
        assert_eq!(h.channel_config, 2);
        assert_eq!(h.header_len(), 7);
        // AAC LC, 48kHz, 立体声
        assert_eq!(h.audio_specific_config(), vec![0x11, 0x90]);
    }

    #[test]
    fn test_解析_audio_specific_config() {
        // AAC LC, 44.1kHz, 立体声
        assert_eq!(parse_audio_specific_config(&[0x12, 0x10]), Some((44_100, 2)));
        assert_eq!(parse_audio_specific_config(&[0x11, 0x90]), Some((48_000, 2)));
        assert_eq!(parse_audio_specific_config(&[0x17, 0x80]), None);
        assert_eq!(parse_audio_specific_config(&[0x12]), None);
    }

    #[test]
    fn test_adts_无效帧头() {
        assert!(AdtsHeader::parse(&[0xFF, 0xF1, 0x4C]).is_none());
        assert!(AdtsHeader::parse(&adts_header(3)).is_none());
        let mut bad = adts_header(100);
        bad[0] = 0x47;
        assert!(AdtsHeader::parse(&bad).is_none());
        assert_eq!(find_adts_sync(&[0x00, 0x12, 0xFF, 0xF1, 0x00], 0), Some(2));
    }

    #[test]
    fn test_annexb_切分() {
        let data = [
            0, 0, 0, 1, 0x67, 0xAA, 0, 0, 1, 0x68, 0xBB, 0, 0, 0, 1, 0x65, 0x88, 0x80,
        ];
        let units = annexb_units(&data);
        assert_eq!(units.len(), 3);
        assert_eq!(units[0], &[0x67, 0xAA]);
        assert_eq!(units[1], &[0x68, 0xBB]);
        assert_eq!(units[2], &[0x65, 0x88, 0x80]);
    }

    #[test]
    fn test_h264_同步帧与参数集() {
        let idr = [0, 0, 0, 1, 0x67, 0x42, 0, 0, 1, 0x68, 0xCE, 0, 0, 1, 0x65, 0x88];
        let p = [0, 0, 0, 1, 0x41, 0x9A];
        assert_eq!(is_sync_frame(CodecId::H264, &idr), Some(true));
        assert_eq!(is_sync_frame(CodecId::H264, &p), Some(false));
        assert_eq!(
            parameter_sets(CodecId::H264, &idr, true),
            vec![0, 0, 0, 1, 0x67, 0x42, 0, 0, 0, 1, 0x68, 0xCE]
        );
        // 截断时最后一个单元不采用
        assert_eq!(parameter_sets(CodecId::H264, &idr[..11], false).len(), 6);
    }

    #[test]
    fn test_h265_与_mpeg2_同步帧() {
        // NAL type 19 (IDR_W_RADL)
        assert_eq!(is_sync_frame(CodecId::H265, &[0, 0, 1, 19 << 1, 1]), Some(true));
        assert_eq!(is_sync_frame(CodecId::H265, &[0, 0, 1, 1 << 1, 1]), Some(false));
        assert_eq!(is_sync_frame(CodecId::Mpeg2Video, &[0, 0, 1, 0xB3, 0x10]), Some(true));
        // P 帧图像头
        assert_eq!(
            is_sync_frame(CodecId::Mpeg2Video, &[0, 0, 1, 0x00, 0x00, 2 << 3]),
            Some(false)
        );
        assert_eq!(is_sync_frame(CodecId::Aac, &[1, 2, 3]), None);
    }
}
