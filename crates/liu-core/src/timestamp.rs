//! 回绕计数器时间戳的归一化.
//!
//! 容器中的时间戳多为定宽计数器: MPEG-TS 的 PTS/DTS 为 33 位 90kHz,
//! FLV/ASF 为 32 位毫秒. 计数器溢出后会回绕到 0, 直接使用会让时间倒退.
//! [`TimestampNormalizer`] 把这些原始值展开成单调的 64 位时间线.

use log::trace;

/// 求两个回绕计数器值之间的有符号差 `to - from`
///
/// 差值对周期 `2^bits` 取模, 代表元取在 `(-P/2, P/2]` 区间内.
pub fn wrapping_delta(bits: u32, from: u64, to: u64) -> i64 {
    let period = 1u64 << bits;
    let mask = period - 1;
    let diff = to.wrapping_sub(from) & mask;
    if diff > period / 2 {
        diff as i64 - period as i64
    } else {
        diff as i64
    }
}

/// 回绕计数器归一化器
///
/// 每条轨道 (或每个容器) 持有一个实例, 按到达顺序喂入原始计数值.
/// 相邻两个值的真实间隔超过半个周期时会被误判方向, 这对于
/// 33 位 90kHz (约 13 小时周期) 和 32 位毫秒 (约 24 天周期) 计数器可以接受.
#[derive(Debug, Clone)]
pub struct TimestampNormalizer {
    /// 计数器位宽
    bits: u32,
    /// 上一次看到的原始值
    last_raw: Option<u64>,
    /// 当前归一化值
    value: i64,
}

impl TimestampNormalizer {
    /// 创建指定位宽的归一化器, 位宽须在 1..=62 之间
    pub const fn new(bits: u32) -> Self {
        Self {
            bits,
            last_raw: None,
            value: 0,
        }
    }

    /// 计数器位宽
    pub const fn bits(&self) -> u32 {
        self.bits
    }

    /// 计数器周期 (2^bits)
    pub const fn period(&self) -> u64 {
        1u64 << self.bits
    }

    /// 转换一个原始计数值
    ///
    /// 首次调用直接返回原始值作为起点; 之后累加与上一个值的有符号模差.
    pub fn transfer(&mut self, raw: u64) -> i64 {
        let raw = raw & (self.period() - 1);
        match self.last_raw {
            None => {
                self.value = raw as i64;
            }
            Some(last) => {
                let delta = wrapping_delta(self.bits, last, raw);
                if raw < last && delta > 0 {
                    trace!(
                        "时间戳回绕: bits={} last={last} raw={raw} delta={delta}",
                        self.bits
                    );
                }
                self.value += delta;
            }
        }
        self.last_raw = Some(raw);
        self.value
    }

    /// 按当前展开状态换算一个相关的原始值, 不更新内部状态
    ///
    /// 用于 PTS: 以刚转换过的 DTS 为锚点展开同一时钟上的 PTS.
    pub fn project(&self, raw: u64) -> i64 {
        let raw = raw & (self.period() - 1);
        match self.last_raw {
            None => raw as i64,
            Some(last) => self.value + wrapping_delta(self.bits, last, raw),
        }
    }

    /// 以已知的原始值与归一化值作为起点
    ///
    /// 同一容器的多条轨道共用一个起点, 各轨道的首个时间戳相对该起点展开.
    pub fn seed(&mut self, raw: u64, value: i64) {
        self.last_raw = Some(raw & (self.period() - 1));
        self.value = value;
    }

    /// 最近一次的归一化值
    pub fn last(&self) -> Option<i64> {
        self.last_raw.map(|_| self.value)
    }

    /// 清除状态, 下一次调用重新作为起点
    pub fn reset(&mut self) {
        self.last_raw = None;
        self.value = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_首次调用返回原始值() {
        let mut n = TimestampNormalizer::new(33);
        assert_eq!(n.transfer(90_000), 90_000);
        assert_eq!(n.last(), Some(90_000));
    }

    #[test]
    fn test_33位回绕后严格递增() {
        let period = 1u64 << 33;
        let d = 3_003u64;
        let mut n = TimestampNormalizer::new(33);
        let mut raw = period - 5 * d;
        let mut prev = n.transfer(raw);
        for _ in 0..20 {
            raw = (raw + d) % period;
            let cur = n.transfer(raw);
            assert_eq!(cur - prev, d as i64, "跨回绕点也应按 d 递增");
            prev = cur;
        }
        assert!(prev > period as i64);
    }

    #[test]
    fn test_32位毫秒回绕() {
        let mut n = TimestampNormalizer::new(32);
        assert_eq!(n.transfer(u64::from(u32::MAX) - 10), i64::from(u32::MAX) - 10);
        assert_eq!(n.transfer(20), i64::from(u32::MAX) + 21);
    }

    #[test]
    fn test_小幅回退不视为回绕() {
        let mut n = TimestampNormalizer::new(33);
        n.transfer(10_000);
        assert_eq!(n.transfer(9_000), 9_000);
        assert_eq!(n.transfer(12_000), 12_000);
    }

    #[test]
    fn test_project_不修改状态() {
        let period = 1u64 << 33;
        let mut n = TimestampNormalizer::new(33);
        let dts = n.transfer(period - 100);
        // PTS 已回绕而 DTS 未回绕
        assert_eq!(n.project(50), dts + 150);
        assert_eq!(n.last(), Some(dts));
    }

    #[test]
    fn test_reset() {
        let mut n = TimestampNormalizer::new(32);
        n.transfer(500);
        n.transfer(900);
        n.reset();
        assert_eq!(n.last(), None);
        assert_eq!(n.transfer(100), 100);
    }

    #[test]
    fn test_共用起点时跨回绕点的轨道保持顺序() {
        let period = 1u64 << 33;
        let anchor = period - 900;
        let mut video = TimestampNormalizer::new(33);
        let mut audio = TimestampNormalizer::new(33);
        video.seed(anchor, anchor as i64);
        audio.seed(anchor, anchor as i64);
        assert_eq!(video.transfer(anchor), anchor as i64);
        // 音频首个时间戳已回绕
        assert_eq!(audio.transfer(100), period as i64 + 100);
        assert_eq!(audio.last(), Some(period as i64 + 100));
    }

    #[test]
    fn test_wrapping_delta_半周期边界() {
        // P/2 取正, 超过 P/2 取负
        assert_eq!(wrapping_delta(4, 0, 8), 8);
        assert_eq!(wrapping_delta(4, 0, 9), -7);
        assert_eq!(wrapping_delta(4, 15, 1), 2);
    }
}
