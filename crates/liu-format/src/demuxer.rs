//! 解封装器 (Demuxer) trait 定义.
//!
//! 解封装器持有一个字节窗口, 从中增量解析容器并输出样本. 所有操作都是
//! 非阻塞的: 数据不足时返回 [`LiuError::NeedMoreData`], 内部状态保持不变,
//! 数据源补充后重新调用同一操作即可继续.

use liu_core::{LiuError, LiuResult};
use log::debug;

use crate::format_id::FormatId;
use crate::sample::Sample;
use crate::stream::Stream;
use crate::window::ByteWindow;

/// 打开状态
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OpenState {
    /// 尚未开始解析
    NotOpen,
    /// 正在解析容器头部
    HeaderScan,
    /// 正在预扫描数据区, 确定各轨道的起始时间与私有数据
    Priming,
    /// 已打开, 可以读取样本
    Opened,
}

/// 解封装器 trait
///
/// 使用流程:
/// 1. 反复调用 `open()` 直到返回 `Ok(())` (数据不足时返回 `NeedMoreData`)
/// 2. 调用 `streams()` 获取轨道信息
/// 3. 循环调用 `get_sample()` 读取样本, 直到返回 `Eof`
/// 4. 适时调用 `window_mut().drop_consumed()` 释放已消费的数据
pub trait Demuxer: Send {
    /// 获取格式标识
    fn format_id(&self) -> FormatId;

    /// 获取格式名称
    fn name(&self) -> &str;

    /// 当前打开状态
    fn state(&self) -> OpenState;

    /// 推进打开流程
    ///
    /// # 返回
    /// - `Ok(())`: 已打开
    /// - `Err(LiuError::NeedMoreData)`: 数据不足, 稍后重试
    /// - `Err(LiuError::InvalidData(_))`: 不是该格式或头部损坏, 状态回到 `NotOpen`
    fn open(&mut self) -> LiuResult<()>;

    /// 推进打开流程并返回是否已打开
    fn is_open(&mut self) -> bool {
        match self.open() {
            Ok(()) => true,
            Err(LiuError::NeedMoreData) => false,
            Err(e) => {
                debug!("{}: 打开失败: {}", self.name(), e);
                false
            }
        }
    }

    /// 关闭并清除解析状态, 可重复调用
    fn close(&mut self) -> LiuResult<()>;

    /// 获取所有轨道信息 (打开前为空)
    fn streams(&self) -> &[Stream];

    /// 获取指定轨道
    fn stream(&self, index: usize) -> LiuResult<&Stream> {
        if self.state() != OpenState::Opened {
            return Err(LiuError::NotOpen);
        }
        self.streams()
            .get(index)
            .ok_or(LiuError::StreamNotFound(index))
    }

    /// 轨道数
    fn track_count(&self) -> usize {
        self.streams().len()
    }

    /// 读取下一个样本 (按源中的完成顺序)
    ///
    /// # 返回
    /// - `Ok(sample)`: 一个完整的帧
    /// - `Err(LiuError::NeedMoreData)`: 数据不足, 稍后重试
    /// - `Err(LiuError::Eof)`: 全部样本已输出
    /// - `Err(LiuError::InvalidData(_))`: 数据区损坏, 状态回到 `NotOpen`
    fn get_sample(&mut self) -> LiuResult<Sample>;

    /// 最近输出样本的 DTS (微秒)
    fn current_time(&self) -> Option<i64>;

    /// 估计的结束时间 (微秒, 与样本时间戳同一零点)
    fn end_time(&self) -> Option<i64>;

    /// 定位到指定时间 (微秒), 目前只支持 0 (回到开头)
    fn seek(&mut self, time_us: i64) -> LiuResult<()>;

    /// 下一次读取样本时开始扫描的源偏移
    ///
    /// 该偏移之前的数据不会再被访问, 可以安全释放.
    fn read_offset(&self) -> u64;

    /// 字节窗口
    fn window(&self) -> &ByteWindow;

    /// 字节窗口 (可变)
    fn window_mut(&mut self) -> &mut ByteWindow;

    /// 获取容器元数据
    fn metadata(&self) -> &[(String, String)] {
        &[]
    }
}
