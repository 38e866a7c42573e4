//! CRC 校验和计算.
//!
//! 提供 CRC-32/MPEG-2, 用于 MPEG-TS PSI 表 (PAT/PMT) 的 section 校验.

/// CRC-32/MPEG-2 查找表 (多项式 0x04C11DB7, 不反射)
const CRC32_MPEG2_TABLE: [u32; 256] = {
    let mut table = [0u32; 256];
    let mut i = 0u32;
    while i < 256 {
        let mut crc = i << 24;
        let mut j = 0;
        while j < 8 {
            if crc & 0x8000_0000 != 0 {
                crc = (crc << 1) ^ 0x04C1_1DB7;
            } else {
                crc <<= 1;
            }
            j += 1;
        }
        table[i as usize] = crc;
        i += 1;
    }
    table
};

/// 计算 CRC-32/MPEG-2
///
/// 初始值 0xFFFFFFFF, 无输出异或. 对包含末尾 CRC 字段的完整 section
/// 计算结果为 0.
pub fn crc32_mpeg2(data: &[u8]) -> u32 {
    let mut crc: u32 = 0xFFFF_FFFF;
    for &byte in data {
        crc = (crc << 8) ^ CRC32_MPEG2_TABLE[((crc >> 24) as u8 ^ byte) as usize];
    }
    crc
}
