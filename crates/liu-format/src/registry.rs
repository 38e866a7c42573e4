//! 容器格式注册表.
//!
//! 管理所有已注册的解封装器构造函数与格式探测器, 支持按格式标识创建
//! 解封装器以及根据数据开头自动识别格式.

use std::collections::HashMap;

use liu_core::{LiuError, LiuResult};
use log::debug;

use crate::config::DemuxConfig;
use crate::demuxer::Demuxer;
use crate::format_id::FormatId;
use crate::probe::{FormatProbe, ProbeResult};
use crate::window::ByteWindow;

/// 探测时最多读取的字节数
const PROBE_SIZE: u64 = 8192;

/// 解封装器构造函数类型
pub type DemuxerConstructor =
    Box<dyn Fn(ByteWindow, &DemuxConfig) -> Box<dyn Demuxer> + Send + Sync>;

/// 解封装器注册条目
struct DemuxerEntry {
    /// 格式名称
    name: String,
    /// 构造函数
    constructor: DemuxerConstructor,
}

/// 容器格式注册表
pub struct FormatRegistry {
    /// 解封装器构造函数映射
    demuxers: HashMap<FormatId, DemuxerEntry>,
    /// 格式探测器列表
    probes: Vec<Box<dyn FormatProbe>>,
    /// 创建解封装器时使用的配置
    config: DemuxConfig,
}

impl FormatRegistry {
    /// 创建空的注册表
    pub fn new() -> Self {
        Self::with_config(DemuxConfig::default())
    }

    /// 创建使用指定配置的空注册表
    pub fn with_config(config: DemuxConfig) -> Self {
        Self {
            demuxers: HashMap::new(),
            probes: Vec::new(),
            config,
        }
    }

    /// 解封装配置
    pub fn config(&self) -> &DemuxConfig {
        &self.config
    }

    /// 替换解封装配置
    pub fn set_config(&mut self, config: DemuxConfig) {
        self.config = config;
    }

    /// 注册一个解封装器, 同一格式重复注册时替换旧的构造函数
    pub fn register<F>(&mut self, format_id: FormatId, name: impl Into<String>, constructor: F)
    where
        F: Fn(ByteWindow, &DemuxConfig) -> Box<dyn Demuxer> + Send + Sync + 'static,
    {
        self.demuxers.insert(
            format_id,
            DemuxerEntry {
                name: name.into(),
                constructor: Box::new(constructor),
            },
        );
    }

    /// 注册一个格式探测器
    pub fn register_probe(&mut self, probe: Box<dyn FormatProbe>) {
        self.probes.push(probe);
    }

    /// 是否注册了该格式
    pub fn contains(&self, format_id: FormatId) -> bool {
        self.demuxers.contains_key(&format_id)
    }

    /// 创建指定格式的解封装器, 字节窗口的所有权转移给解封装器
    pub fn create(&self, format_id: FormatId, window: ByteWindow) -> LiuResult<Box<dyn Demuxer>> {
        let entry = self.demuxers.get(&format_id).ok_or_else(|| {
            LiuError::FormatNotFound(format!("未找到 {} 的解封装器", format_id))
        })?;
        debug!("创建解封装器: {}", entry.name);
        Ok((entry.constructor)(window, &self.config))
    }

    /// 探测数据的容器格式
    ///
    /// 遍历所有已注册的探测器, 返回置信度最高的结果.
    pub fn probe(&self, data: &[u8], filename: Option<&str>) -> Option<ProbeResult> {
        let mut best: Option<ProbeResult> = None;
        for probe in &self.probes {
            if let Some(score) = probe.probe(data, filename) {
                let is_better = best.as_ref().is_none_or(|b| score > b.score);
                if is_better {
                    best = Some(ProbeResult {
                        format_id: probe.format_id(),
                        score,
                    });
                }
            }
        }
        best
    }

    /// 探测字节窗口开头的格式, 不移动读指针
    ///
    /// 数据不足 8KB 且数据源未结束时返回 `NeedMoreData`.
    pub fn probe_window(
        &self,
        window: &mut ByteWindow,
        filename: Option<&str>,
    ) -> LiuResult<ProbeResult> {
        let start = window.position();
        match window.fill_to(start + PROBE_SIZE) {
            Ok(()) | Err(LiuError::Eof) => {}
            Err(e) => return Err(e),
        }
        let len = (window.high() - start).min(PROBE_SIZE) as usize;
        let head = window.bytes_at(start, len)?;
        self.probe(&head, filename)
            .ok_or_else(|| LiuError::FormatNotFound("无法识别输入格式".to_string()))
    }

    /// 探测格式并创建对应的解封装器
    pub fn create_for_input(
        &self,
        mut window: ByteWindow,
        filename: Option<&str>,
    ) -> LiuResult<Box<dyn Demuxer>> {
        let result = self.probe_window(&mut window, filename)?;
        debug!(
            "探测到格式: {} (置信度 {})",
            result.format_id, result.score
        );
        self.create(result.format_id, window)
    }

    /// 获取所有已注册的解封装器名称
    pub fn list_demuxers(&self) -> Vec<(FormatId, &str)> {
        self.demuxers
            .iter()
            .map(|(id, entry)| (*id, entry.name.as_str()))
            .collect()
    }
}

impl Default for FormatRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemorySource;

    fn registry() -> FormatRegistry {
        let mut reg = FormatRegistry::new();
        crate::register_all(&mut reg);
        reg
    }

    #[test]
    fn test_注册全部格式() {
        let reg = registry();
        for id in FormatId::ALL {
            assert!(reg.contains(*id), "{id} 未注册");
        }
        assert_eq!(reg.list_demuxers().len(), 3);
    }

    #[test]
    fn test_创建解封装器() {
        let reg = registry();
        let demuxer = reg
            .create(FormatId::Flv, ByteWindow::from_bytes(Vec::new()))
            .unwrap();
        assert_eq!(demuxer.format_id(), FormatId::Flv);
        assert_eq!(demuxer.name(), "flv");
    }

    #[test]
    fn test_未注册格式() {
        let reg = FormatRegistry::new();
        let err = reg
            .create(FormatId::Asf, ByteWindow::from_bytes(Vec::new()))
            .err()
            .unwrap();
        assert!(matches!(err, LiuError::FormatNotFound(_)));
    }

    #[test]
    fn test_探测魔数() {
        let reg = registry();
        let mut flv = b"FLV\x01\x05\x00\x00\x00\x09\x00\x00\x00\x00".to_vec();
        flv.resize(64, 0);
        let result = reg.probe(&flv, None).unwrap();
        assert_eq!(result.format_id, FormatId::Flv);
        assert!(reg.probe(&[0u8; 32], None).is_none());
        assert_eq!(
            reg.probe(&[0u8; 32], Some("a.ts")).unwrap().format_id,
            FormatId::MpegTs
        );
    }

    #[test]
    fn test_探测窗口_数据不足() {
        let reg = registry();
        let mut w = ByteWindow::new(MemorySource::chunked(vec![0x46u8; 9000], 100));
        assert!(matches!(
            reg.probe_window(&mut w, None),
            Err(LiuError::NeedMoreData)
        ));
        assert_eq!(w.position(), 0);
    }

    #[test]
    fn test_按输入创建() {
        let reg = registry();
        let mut flv = b"FLV\x01\x05\x00\x00\x00\x09\x00\x00\x00\x00".to_vec();
        flv.resize(64, 0);
        let demuxer = reg.create_for_input(ByteWindow::from_bytes(flv), None).unwrap();
        assert_eq!(demuxer.format_id(), FormatId::Flv);
    }
}
