//! AMF0 (Action Message Format) 解析.
//!
//! FLV 的脚本 tag 以 AMF0 编码, 通常是一个字符串 (`onMetaData`) 加一个
//! ECMA 数组. 这里只解析, 不做序列化.

use std::io::{Cursor, Read};

use byteorder::{BigEndian, ReadBytesExt};
use liu_core::{LiuError, LiuResult};

/// AMF0 类型标记
const MARKER_NUMBER: u8 = 0x00;
const MARKER_BOOLEAN: u8 = 0x01;
const MARKER_STRING: u8 = 0x02;
const MARKER_OBJECT: u8 = 0x03;
const MARKER_NULL: u8 = 0x05;
const MARKER_UNDEFINED: u8 = 0x06;
const MARKER_REFERENCE: u8 = 0x07;
const MARKER_ECMA_ARRAY: u8 = 0x08;
const MARKER_OBJECT_END: u8 = 0x09;
const MARKER_STRICT_ARRAY: u8 = 0x0A;
const MARKER_DATE: u8 = 0x0B;
const MARKER_LONG_STRING: u8 = 0x0C;

/// 最大嵌套深度
const MAX_DEPTH: usize = 32;

/// AMF0 值
#[derive(Debug, Clone, PartialEq)]
pub enum AmfValue {
    Number(f64),
    Boolean(bool),
    String(String),
    /// 匿名对象
    Object(Vec<(String, AmfValue)>),
    Null,
    Undefined,
    /// 对象引用 (索引)
    Reference(u16),
    /// 关联数组, onMetaData 的常见形式
    EcmaArray(Vec<(String, AmfValue)>),
    StrictArray(Vec<AmfValue>),
    /// 毫秒时间戳
    Date(f64),
}

impl AmfValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(v) | Self::Date(v) => Some(*v),
            Self::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Boolean(b) => Some(*b),
            Self::Number(v) => Some(*v != 0.0),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// 对象或关联数组的属性
    pub fn properties(&self) -> Option<&[(String, AmfValue)]> {
        match self {
            Self::Object(props) | Self::EcmaArray(props) => Some(props),
            _ => None,
        }
    }

    /// 按名称查找属性
    pub fn get(&self, key: &str) -> Option<&AmfValue> {
        self.properties()?
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v)
    }

    /// 标量值的文本形式, 复合值返回 None
    pub fn to_text(&self) -> Option<String> {
        match self {
            Self::Number(v) | Self::Date(v) => Some(v.to_string()),
            Self::Boolean(b) => Some(b.to_string()),
            Self::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

fn truncated(_: std::io::Error) -> LiuError {
    LiuError::InvalidData("AMF0 数据不完整".into())
}

fn read_utf8(cursor: &mut Cursor<&[u8]>, len: usize) -> LiuResult<String> {
    let remaining = cursor.get_ref().len() - cursor.position() as usize;
    if len > remaining {
        return Err(LiuError::InvalidData(format!(
            "AMF0 字符串长度 {len} 超出剩余数据 {remaining}"
        )));
    }
    let mut buf = vec![0u8; len];
    cursor.read_exact(&mut buf).map_err(truncated)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn read_short_string(cursor: &mut Cursor<&[u8]>) -> LiuResult<String> {
    let len = cursor.read_u16::<BigEndian>().map_err(truncated)?;
    read_utf8(cursor, usize::from(len))
}

/// 读取属性列表, 直到对象结束标记 (空键 + 0x09)
fn read_properties(cursor: &mut Cursor<&[u8]>, depth: usize) -> LiuResult<Vec<(String, AmfValue)>> {
    let mut props = Vec::new();
    loop {
        // 部分编码器省略 ECMA 数组的结束标记
        if cursor.position() as usize >= cursor.get_ref().len() {
            return Ok(props);
        }
        let key = read_short_string(cursor)?;
        if key.is_empty() {
            let marker = cursor.read_u8().map_err(truncated)?;
            if marker == MARKER_OBJECT_END {
                return Ok(props);
            }
            return Err(LiuError::InvalidData(format!(
                "AMF0 空属性名后应为结束标记, 实际为 {marker:#04X}"
            )));
        }
        let value = read_value_at(cursor, depth + 1)?;
        props.push((key, value));
    }
}

fn read_value_at(cursor: &mut Cursor<&[u8]>, depth: usize) -> LiuResult<AmfValue> {
    if depth > MAX_DEPTH {
        return Err(LiuError::InvalidData("AMF0 嵌套过深".into()));
    }
    let marker = cursor.read_u8().map_err(truncated)?;
    let value = match marker {
        MARKER_NUMBER => AmfValue::Number(cursor.read_f64::<BigEndian>().map_err(truncated)?),
        MARKER_BOOLEAN => AmfValue::Boolean(cursor.read_u8().map_err(truncated)? != 0),
        MARKER_STRING => AmfValue::String(read_short_string(cursor)?),
        MARKER_OBJECT => AmfValue::Object(read_properties(cursor, depth)?),
        MARKER_NULL => AmfValue::Null,
        MARKER_UNDEFINED => AmfValue::Undefined,
        MARKER_REFERENCE => AmfValue::Reference(cursor.read_u16::<BigEndian>().map_err(truncated)?),
        MARKER_ECMA_ARRAY => {
            // 元素个数仅供参考, 以结束标记为准
            let _count = cursor.read_u32::<BigEndian>().map_err(truncated)?;
            AmfValue::EcmaArray(read_properties(cursor, depth)?)
        }
        MARKER_STRICT_ARRAY => {
            let count = cursor.read_u32::<BigEndian>().map_err(truncated)?;
            let mut items = Vec::new();
            for _ in 0..count {
                items.push(read_value_at(cursor, depth + 1)?);
            }
            AmfValue::StrictArray(items)
        }
        MARKER_DATE => {
            let ms = cursor.read_f64::<BigEndian>().map_err(truncated)?;
            let _timezone = cursor.read_i16::<BigEndian>().map_err(truncated)?;
            AmfValue::Date(ms)
        }
        MARKER_LONG_STRING => {
            let len = cursor.read_u32::<BigEndian>().map_err(truncated)?;
            AmfValue::String(read_utf8(cursor, len as usize)?)
        }
        other => {
            return Err(LiuError::InvalidData(format!(
                "不支持的 AMF0 类型: {other:#04X}"
            )));
        }
    };
    Ok(value)
}

/// 读取一个 AMF0 值
pub fn read_value(cursor: &mut Cursor<&[u8]>) -> LiuResult<AmfValue> {
    read_value_at(cursor, 0)
}

/// 解析脚本 tag: 返回事件名与参数
pub fn parse_script_data(data: &[u8]) -> LiuResult<(String, AmfValue)> {
    let mut cursor = Cursor::new(data);
    let name = match read_value(&mut cursor)? {
        AmfValue::String(s) => s,
        other => {
            return Err(LiuError::InvalidData(format!(
                "脚本 tag 应以字符串开头, 实际为 {other:?}"
            )));
        }
    };
    let value = read_value(&mut cursor)?;
    Ok((name, value))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn key(out: &mut Vec<u8>, name: &str) {
        out.extend_from_slice(&(name.len() as u16).to_be_bytes());
        out.extend_from_slice(name.as_bytes());
    }

    fn number(out: &mut Vec<u8>, v: f64) {
        out.push(MARKER_NUMBER);
        out.extend_from_slice(&v.to_be_bytes());
    }

    fn string(out: &mut Vec<u8>, s: &str) {
        out.push(MARKER_STRING);
        key(out, s);
    }

    #[test]
    fn test_解析_onmetadata() {
        let mut data = Vec::new();
        string(&mut data, "onMetaData");
        data.push(MARKER_ECMA_ARRAY);
        data.extend_from_slice(&3u32.to_be_bytes());
        key(&mut data, "duration");
        number(&mut data, 12.5);
        key(&mut data, "stereo");
        data.extend_from_slice(&[MARKER_BOOLEAN, 1]);
        key(&mut data, "info");
        data.push(MARKER_OBJECT);
        key(&mut data, "encoder");
        string(&mut data, "Lavf");
        data.extend_from_slice(&[0, 0, MARKER_OBJECT_END]);
        data.extend_from_slice(&[0, 0, MARKER_OBJECT_END]);

        let (name, value) = parse_script_data(&data).unwrap();
        assert_eq!(name, "onMetaData");
        assert_eq!(value.get("duration").and_then(AmfValue::as_f64), Some(12.5));
        assert_eq!(value.get("stereo").and_then(AmfValue::as_bool), Some(true));
        let info = value.get("info").unwrap();
        assert_eq!(info.get("encoder").and_then(AmfValue::as_str), Some("Lavf"));
        assert_eq!(info.to_text(), None);
    }

    #[test]
    fn test_缺少结束标记的数组() {
        let mut data = Vec::new();
        string(&mut data, "onMetaData");
        data.push(MARKER_ECMA_ARRAY);
        data.extend_from_slice(&1u32.to_be_bytes());
        key(&mut data, "width");
        number(&mut data, 640.0);
        let (_, value) = parse_script_data(&data).unwrap();
        assert_eq!(value.get("width").and_then(AmfValue::as_f64), Some(640.0));
    }

    #[test]
    fn test_截断与错误类型() {
        let mut data = Vec::new();
        string(&mut data, "onMetaData");
        data.push(MARKER_NUMBER);
        data.extend_from_slice(&[0x40, 0x00]);
        assert!(matches!(
            parse_script_data(&data),
            Err(LiuError::InvalidData(_))
        ));
        assert!(parse_script_data(&[MARKER_NUMBER, 0, 0, 0, 0, 0, 0, 0, 0]).is_err());
        assert!(read_value(&mut Cursor::new(&[0x42u8][..])).is_err());
    }

    #[test]
    fn test_嵌套深度限制() {
        let mut data = Vec::new();
        for _ in 0..(MAX_DEPTH + 2) {
            data.push(MARKER_STRICT_ARRAY);
            data.extend_from_slice(&1u32.to_be_bytes());
        }
        data.push(MARKER_NULL);
        assert!(read_value(&mut Cursor::new(&data[..])).is_err());
    }
}
