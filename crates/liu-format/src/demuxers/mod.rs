//! 解封装器实现模块.

pub mod amf;
pub mod asf;
pub mod flv;
pub mod mpegts;

use crate::format_id::FormatId;
use crate::registry::FormatRegistry;

/// 注册所有内置解封装器
pub fn register_all_demuxers(registry: &mut FormatRegistry) {
    registry.register(FormatId::MpegTs, "mpegts", mpegts::TsDemuxer::create);
    registry.register_probe(Box::new(mpegts::TsProbe));

    registry.register(FormatId::Flv, "flv", flv::FlvDemuxer::create);
    registry.register_probe(Box::new(flv::FlvProbe));

    registry.register(FormatId::Asf, "asf", asf::AsfDemuxer::create);
    registry.register_probe(Box::new(asf::AsfProbe));
}
