//! 有理数类型, 用于时间基 (time_base) 与帧率.

use std::fmt;

/// 有理数, 由分子和分母组成
///
/// 例如: 时间基 1/90000 表示 90kHz 时钟 (MPEG-TS), 1/1000 表示毫秒 (FLV/ASF).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rational {
    /// 分子
    pub num: i32,
    /// 分母
    pub den: i32,
}

impl Rational {
    /// 创建新的有理数
    pub const fn new(num: i32, den: i32) -> Self {
        Self { num, den }
    }

    /// 零值
    pub const ZERO: Self = Self { num: 0, den: 1 };

    /// 未定义 (分母为 0)
    pub const UNDEFINED: Self = Self { num: 0, den: 0 };

    /// 常用时间基: 微秒 (1/1_000_000), 样本时间戳统一使用此单位
    pub const MICRO: Self = Self {
        num: 1,
        den: 1_000_000,
    };

    /// 常用时间基: 毫秒 (1/1_000)
    pub const MILLI: Self = Self { num: 1, den: 1_000 };

    /// 常用时间基: MPEG 90kHz 时钟
    pub const MPEG_CLOCK: Self = Self { num: 1, den: 90_000 };

    /// 判断是否有效 (分母不为 0)
    pub const fn is_valid(&self) -> bool {
        self.den != 0
    }

    /// 转换为 f64, 分母为 0 时返回 `f64::NAN`
    pub fn to_f64(self) -> f64 {
        if self.den == 0 {
            return f64::NAN;
        }
        f64::from(self.num) / f64::from(self.den)
    }

    /// 将以 `self` 为时间基的值转换到 `target` 时间基
    ///
    /// 通过 i128 交叉乘法避免精度损失, 结果向零取整:
    /// value * self.num * target.den / (self.den * target.num).
    /// 任一时间基无效时返回 `None`.
    pub fn rescale(self, value: i64, target: Rational) -> Option<i64> {
        if !self.is_valid() || !target.is_valid() || target.num == 0 {
            return None;
        }
        let num = i128::from(value) * i128::from(self.num) * i128::from(target.den);
        let den = i128::from(self.den) * i128::from(target.num);
        Some((num / den) as i64)
    }
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.num, self.den)
    }
}

impl Default for Rational {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<(i32, i32)> for Rational {
    fn from((num, den): (i32, i32)) -> Self {
        Self { num, den }
    }
}
