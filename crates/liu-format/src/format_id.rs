//! 容器格式标识符.

use std::fmt;

use serde::{Deserialize, Serialize};

/// 容器格式标识符
///
/// 标识引擎能解封装的容器格式.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[non_exhaustive]
pub enum FormatId {
    /// MPEG Transport Stream (TS / M2TS)
    MpegTs,
    /// Flash Video (FLV)
    Flv,
    /// ASF / WMV / WMA
    Asf,
}

impl FormatId {
    /// 所有已知格式标识的列表
    pub const ALL: &[FormatId] = &[Self::MpegTs, Self::Flv, Self::Asf];

    /// 获取格式的名称
    pub const fn name(&self) -> &'static str {
        match self {
            Self::MpegTs => "mpegts",
            Self::Flv => "flv",
            Self::Asf => "asf",
        }
    }

    /// 获取格式常用的文件扩展名
    pub const fn extensions(&self) -> &'static [&'static str] {
        match self {
            Self::MpegTs => &["ts", "m2ts", "mts", "m2t"],
            Self::Flv => &["flv"],
            Self::Asf => &["asf", "wmv", "wma"],
        }
    }

    /// 根据格式名称查找 (不区分大小写)
    pub fn from_name(name: &str) -> Option<FormatId> {
        let name = name.to_lowercase();
        Self::ALL.iter().find(|id| id.name() == name).copied()
    }

    /// 根据文件扩展名猜测格式
    ///
    /// # 参数
    /// - `ext`: 文件扩展名 (不含 `.`, 如 "ts", "flv")
    pub fn from_extension(ext: &str) -> Option<FormatId> {
        let ext_lower = ext.to_lowercase();
        Self::ALL
            .iter()
            .find(|id| id.extensions().contains(&ext_lower.as_str()))
            .copied()
    }

    /// 从文件路径猜测格式
    pub fn from_filename(filename: &str) -> Option<FormatId> {
        let ext = filename.rsplit('.').next()?;
        Self::from_extension(ext)
    }
}

impl fmt::Display for FormatId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
