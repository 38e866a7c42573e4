//! 解封装配置.
//!
//! 所有字段都有默认值, 可以从 JSON 部分覆盖:
//!
//! ```json
//! { "probe_limit": 1048576, "timestamp_origin": "track" }
//! ```

use liu_core::{LiuError, LiuResult};
use serde::{Deserialize, Serialize};

/// 样本时间戳的零点
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TimestampOrigin {
    /// 以所有轨道中最早的起始时间为零点, 轨道间保持同步
    #[default]
    Container,
    /// 以各轨道自身的起始时间为零点
    Track,
}

/// 解封装配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemuxConfig {
    /// 预扫描阶段最多读取的字节数 (从数据区起点算起)
    pub probe_limit: u64,
    /// 样本时间戳零点
    pub timestamp_origin: TimestampOrigin,
    /// 是否丢弃首个同步帧之前的视频帧
    pub sync_gating: bool,
    /// 重新寻找同步时最多跳过的字节数
    pub max_resync: u64,
    /// 预扫描时, 其它轨道累计完成这么多帧后仍未出现数据的轨道视为不存在
    pub absent_after_frames: usize,
}

impl Default for DemuxConfig {
    fn default() -> Self {
        Self {
            probe_limit: 8 * 1024 * 1024,
            timestamp_origin: TimestampOrigin::Container,
            sync_gating: true,
            max_resync: 64 * 1024,
            absent_after_frames: 64,
        }
    }
}

impl DemuxConfig {
    /// 从 JSON 文本解析配置, 缺省字段使用默认值
    pub fn from_json(text: &str) -> LiuResult<Self> {
        serde_json::from_str(text)
            .map_err(|e| LiuError::InvalidArgument(format!("解封装配置解析失败: {e}")))
    }

    /// 序列化为 JSON 文本
    pub fn to_json(&self) -> LiuResult<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| LiuError::Internal(format!("解封装配置序列化失败: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_默认值() {
        let cfg = DemuxConfig::default();
        assert_eq!(cfg.probe_limit, 8 * 1024 * 1024);
        assert_eq!(cfg.timestamp_origin, TimestampOrigin::Container);
        assert!(cfg.sync_gating);
    }

    #[test]
    fn test_部分覆盖() {
        let cfg = DemuxConfig::from_json(r#"{"timestamp_origin":"track","sync_gating":false}"#)
            .unwrap();
        assert_eq!(cfg.timestamp_origin, TimestampOrigin::Track);
        assert!(!cfg.sync_gating);
        assert_eq!(cfg.max_resync, 64 * 1024);
    }

    #[test]
    fn test_非法_json() {
        let err = DemuxConfig::from_json("{probe_limit:").unwrap_err();
        assert!(matches!(err, LiuError::InvalidArgument(_)));
    }

    #[test]
    fn test_json_往返() {
        let cfg = DemuxConfig {
            probe_limit: 4096,
            ..DemuxConfig::default()
        };
        let text = cfg.to_json().unwrap();
        assert_eq!(DemuxConfig::from_json(&text).unwrap(), cfg);
    }
}
