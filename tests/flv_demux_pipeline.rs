//! FLV 推送式解封装集成测试.

mod common;

use proptest::prelude::*;

use liu_core::{CodecId, MediaType, Rational};
use liu_format::{DemuxConfig, FormatId, RawTrack, StreamParams};

const AVC_CONFIG: [u8; 8] = [0x01, 0x42, 0xC0, 0x1E, 0xFF, 0xE1, 0x00, 0x04];
const AAC_CONFIG: [u8; 2] = [0x12, 0x10];

fn flv_header(has_audio: bool, has_video: bool) -> Vec<u8> {
    let mut data = b"FLV\x01".to_vec();
    data.push(if has_audio { 0x04 } else { 0 } | if has_video { 0x01 } else { 0 });
    data.extend_from_slice(&9u32.to_be_bytes());
    data.extend_from_slice(&0u32.to_be_bytes());
    data
}

fn tag(tag_type: u8, timestamp: u32, body: &[u8]) -> Vec<u8> {
    let size = body.len() as u32;
    let mut out = vec![tag_type];
    out.extend_from_slice(&size.to_be_bytes()[1..]);
    out.extend_from_slice(&timestamp.to_be_bytes()[1..]);
    out.push((timestamp >> 24) as u8);
    out.extend_from_slice(&[0, 0, 0]);
    out.extend_from_slice(body);
    out.extend_from_slice(&(11 + size).to_be_bytes());
    out
}

fn avc(timestamp: u32, key: bool, packet_type: u8, cts: i32, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![if key { 0x17 } else { 0x27 }, packet_type];
    body.extend_from_slice(&cts.to_be_bytes()[1..]);
    body.extend_from_slice(payload);
    tag(9, timestamp, &body)
}

fn aac(timestamp: u32, packet_type: u8, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0xAF, packet_type];
    body.extend_from_slice(payload);
    tag(8, timestamp, &body)
}

/// MP3, 44kHz, 16bit, 双声道
fn mp3(timestamp: u32, payload: &[u8]) -> Vec<u8> {
    let mut body = vec![0x2F];
    body.extend_from_slice(payload);
    tag(8, timestamp, &body)
}

fn on_meta_data(entries: &[(&str, f64)]) -> Vec<u8> {
    fn string(out: &mut Vec<u8>, s: &str) {
        out.extend_from_slice(&(s.len() as u16).to_be_bytes());
        out.extend_from_slice(s.as_bytes());
    }
    let mut body = vec![0x02];
    string(&mut body, "onMetaData");
    body.push(0x08);
    body.extend_from_slice(&(entries.len() as u32).to_be_bytes());
    for &(name, value) in entries {
        string(&mut body, name);
        body.push(0x00);
        body.extend_from_slice(&value.to_be_bytes());
    }
    body.extend_from_slice(&[0, 0, 0x09]);
    tag(18, 0, &body)
}

/// 直播推流常见的布局: 元数据, 两个 sequence header, 然后音视频交织
fn build_live_flv() -> Vec<u8> {
    let mut data = flv_header(true, true);
    data.extend(on_meta_data(&[
        ("duration", 2.5),
        ("width", 1280.0),
        ("height", 720.0),
        ("framerate", 30.0),
    ]));
    data.extend(avc(0, true, 0, 0, &AVC_CONFIG));
    data.extend(aac(0, 0, &AAC_CONFIG));
    data.extend(avc(0, true, 1, 0, &[0, 0, 0, 3, 0x65, 0x88, 0x84]));
    data.extend(aac(0, 1, &[0x21, 0x10, 0x04]));
    data.extend(avc(33, false, 1, 33, &[0, 0, 0, 2, 0x41, 0x9A]));
    data.extend(aac(23, 1, &[0x21, 0x10, 0x05]));
    data.extend(avc(67, false, 1, 0, &[0, 0, 0, 2, 0x41, 0x9B]));
    data
}

#[test]
fn test_flv_推送_音视频() {
    let data = build_live_flv();
    let result = common::demux_pushed(&data, 16, Some("live.flv"), DemuxConfig::default());
    assert_eq!(result.format_id, FormatId::Flv);

    assert_eq!(result.streams.len(), 2);
    let video = &result.streams[0];
    assert_eq!(video.media_type, MediaType::Video);
    assert_eq!(video.codec_id, CodecId::H264);
    assert_eq!(video.extra_data, AVC_CONFIG);
    assert_eq!(video.raw, RawTrack::Flv { codec_tag: 7 });
    match &video.params {
        StreamParams::Video(v) => {
            assert_eq!((v.width, v.height), (1280, 720));
            assert_eq!(v.frame_rate, Rational::new(30_000, 1000));
        }
        other => panic!("视频参数错误: {other:?}"),
    }
    let audio = &result.streams[1];
    assert_eq!(audio.codec_id, CodecId::Aac);
    assert_eq!(audio.extra_data, AAC_CONFIG);

    let summary: Vec<(usize, i64, i64, usize, bool)> = result
        .samples
        .iter()
        .map(|s| (s.stream_index, s.dts, s.cts, s.size, s.is_sync()))
        .collect();
    assert_eq!(
        summary,
        vec![
            (0, 0, 0, 7, true),
            (1, 0, 0, 3, true),
            (0, 33_000, 33_000, 6, false),
            (1, 23_000, 0, 3, true),
            (0, 67_000, 0, 6, false),
        ]
    );
    assert_eq!(result.samples[0].copy_to_vec(), vec![0, 0, 0, 3, 0x65, 0x88, 0x84]);
    assert_eq!(result.end_time, Some(2_500_000));
    assert!(result.released > 0);
}

#[test]
fn test_flv_任意分块大小结果一致() {
    let data = build_live_flv();
    let expected = common::sample_payloads(
        &common::demux_pushed(&data, data.len(), None, DemuxConfig::default()).samples,
    );
    assert_eq!(expected.len(), 5);
    for piece in [1, 11, 100] {
        let result = common::demux_pushed(&data, piece, None, DemuxConfig::default());
        assert_eq!(
            common::sample_payloads(&result.samples),
            expected,
            "分块大小 {piece} 的结果不一致"
        );
    }
}

#[test]
fn test_flv_纯音频_mp3() {
    let mut data = flv_header(true, false);
    for (i, ts) in [0u32, 26, 52].into_iter().enumerate() {
        data.extend(mp3(ts, &[0xFF, 0xFB, 0x90, i as u8]));
    }
    let result = common::demux_pushed(&data, 10, None, DemuxConfig::default());
    assert_eq!(result.streams.len(), 1);
    let audio = &result.streams[0];
    assert_eq!(audio.codec_id, CodecId::Mp3);
    match &audio.params {
        StreamParams::Audio(a) => {
            assert_eq!((a.sample_rate, a.channels, a.bits_per_sample), (44_100, 2, 16));
        }
        other => panic!("音频参数错误: {other:?}"),
    }
    let dts: Vec<i64> = result.samples.iter().map(|s| s.dts).collect();
    assert_eq!(dts, vec![0, 26_000, 52_000]);
    assert_eq!(result.samples[2].copy_to_vec(), vec![0xFF, 0xFB, 0x90, 2]);
    // 没有元数据, 推送源大小未知时无法外推结束时间
    assert!(result.metadata.is_empty());
    assert_eq!(result.end_time, None);
}

#[test]
fn test_flv_起始时间非零() {
    let mut data = flv_header(true, false);
    for ts in [5_000u32, 5_026] {
        data.extend(mp3(ts, &[0xFF, 0xFB, 0x90, 0x00]));
    }
    let result = common::demux_pushed(&data, 32, None, DemuxConfig::default());
    assert_eq!(result.streams[0].start_time, 5_000);
    let dts: Vec<i64> = result.samples.iter().map(|s| s.dts).collect();
    assert_eq!(dts, vec![0, 26_000]);
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(48))]

    /// 分块大小随机变化时样本与整块推入一致
    #[test]
    fn test_flv_随机分块结果一致(sizes in prop::collection::vec(1usize..600, 1..32)) {
        let data = build_live_flv();
        let expected = common::sample_payloads(
            &common::demux_pushed(&data, data.len(), None, DemuxConfig::default()).samples,
        );
        let result = common::demux_pushed_in(&data, &sizes, None, DemuxConfig::default());
        prop_assert_eq!(common::sample_payloads(&result.samples), expected);
    }
}
