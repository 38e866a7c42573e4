//! 集成测试共用的推送式喂入工具.

#![allow(dead_code)]

use liu_core::LiuError;
use liu_format::{
    ByteWindow, DemuxConfig, Demuxer, FormatId, FormatRegistry, PushHandle, PushSource, Sample,
    Stream,
};

/// 推送式解封装的结果
pub struct Demuxed {
    pub format_id: FormatId,
    pub streams: Vec<Stream>,
    pub samples: Vec<Sample>,
    pub metadata: Vec<(String, String)>,
    pub end_time: Option<i64>,
    /// 消费方已释放到的偏移
    pub released: u64,
}

/// 按给定的分块大小依次推送, 大小序列循环使用
struct Pusher<'a> {
    data: &'a [u8],
    sizes: &'a [usize],
    pos: usize,
    turn: usize,
    handle: PushHandle,
    finished: bool,
}

impl Pusher<'_> {
    fn feed(&mut self) {
        assert!(!self.finished, "数据已全部推入, 仍然返回数据不足");
        if self.pos < self.data.len() {
            let size = self.sizes[self.turn % self.sizes.len()].max(1);
            let end = (self.pos + size).min(self.data.len());
            self.handle.push(self.data[self.pos..end].to_vec()).unwrap();
            self.pos = end;
            self.turn += 1;
        } else {
            self.handle.finish().unwrap();
            self.finished = true;
        }
    }
}

pub fn registry(config: DemuxConfig) -> FormatRegistry {
    let mut registry = FormatRegistry::with_config(config);
    liu_format::register_all(&mut registry);
    registry
}

/// 把数据按 `piece` 字节分块推入, 探测格式后读出全部样本
pub fn demux_pushed(data: &[u8], piece: usize, filename: Option<&str>, config: DemuxConfig) -> Demuxed {
    demux_pushed_in(data, &[piece], filename, config)
}

/// 按 `sizes` 给出的分块大小 (循环使用) 推入数据, 探测格式后读出全部样本
///
/// 每次数据不足时都会再调用一次同一操作, 检查数据不足时的返回是幂等的.
pub fn demux_pushed_in(
    data: &[u8],
    sizes: &[usize],
    filename: Option<&str>,
    config: DemuxConfig,
) -> Demuxed {
    assert!(!sizes.is_empty());
    let (source, handle) = PushSource::new();
    let mut pusher = Pusher {
        data,
        sizes,
        pos: 0,
        turn: 0,
        handle: handle.clone(),
        finished: false,
    };
    let registry = registry(config);

    let mut window = ByteWindow::new(source);
    let probe = loop {
        match registry.probe_window(&mut window, filename) {
            Ok(result) => break result,
            Err(LiuError::NeedMoreData) => pusher.feed(),
            Err(e) => panic!("探测失败: {e}"),
        }
    };
    let mut demuxer = registry.create(probe.format_id, window).unwrap();

    loop {
        match demuxer.open() {
            Ok(()) => break,
            Err(LiuError::NeedMoreData) => {
                assert!(matches!(demuxer.open(), Err(LiuError::NeedMoreData)));
                pusher.feed();
            }
            Err(e) => panic!("打开失败: {e}"),
        }
    }

    let mut samples = Vec::new();
    loop {
        match demuxer.get_sample() {
            Ok(sample) => {
                samples.push(sample);
                demuxer.window_mut().drop_consumed();
            }
            Err(LiuError::NeedMoreData) => {
                let offset = demuxer.read_offset();
                assert!(matches!(demuxer.get_sample(), Err(LiuError::NeedMoreData)));
                assert_eq!(demuxer.read_offset(), offset, "数据不足时读取位置不应改变");
                pusher.feed();
            }
            Err(LiuError::Eof) => break,
            Err(e) => panic!("读取样本失败: {e}"),
        }
    }
    assert!(matches!(demuxer.get_sample(), Err(LiuError::Eof)));

    Demuxed {
        format_id: demuxer.format_id(),
        streams: demuxer.streams().to_vec(),
        samples,
        metadata: demuxer.metadata().to_vec(),
        end_time: demuxer.end_time(),
        released: handle.released(),
    }
}

/// 样本的 (轨道, dts, 数据)
pub fn sample_payloads(samples: &[Sample]) -> Vec<(usize, i64, Vec<u8>)> {
    samples
        .iter()
        .map(|s| (s.stream_index, s.dts, s.copy_to_vec()))
        .collect()
}
