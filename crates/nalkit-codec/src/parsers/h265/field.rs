//! 解码字段与改写请求.

use std::fmt;

/// 字段编码方式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    /// u(n), 可原位改写
    FixedUnsigned(u32),
    /// ue(v)
    ExpGolombUnsigned,
    /// se(v)
    ExpGolombSigned,
    /// f(n), 必须等于规定模式
    FixedPattern { width: u32, pattern: u32 },
    /// 整体遍历的复合结构
    Composite,
    /// 未解析数据
    Opaque,
}

impl FieldKind {
    /// 描述符名称 (u(4), ue(v) ...)
    pub fn descriptor(&self) -> String {
        match self {
            Self::FixedUnsigned(n) => format!("u({n})"),
            Self::ExpGolombUnsigned => "ue(v)".into(),
            Self::ExpGolombSigned => "se(v)".into(),
            Self::FixedPattern { width, .. } => format!("f({width})"),
            Self::Composite => "composite".into(),
            Self::Opaque => "opaque".into(),
        }
    }
}

/// 字段值
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldValue {
    Int(i64),
    /// 复合结构摘要或未解析标记
    Text(String),
}

impl FieldValue {
    /// 从 `key=value` 形式的摘要中取出整数
    ///
    /// ```
    /// use nalkit_codec::parsers::h265::FieldValue;
    ///
    /// let v = FieldValue::Text("general_profile_idc=1 general_level_idc=93".into());
    /// assert_eq!(v.summary_entry("general_level_idc"), Some(93));
    /// assert_eq!(v.summary_entry("general_tier_flag"), None);
    /// ```
    pub fn summary_entry(&self, key: &str) -> Option<i64> {
        let Self::Text(text) = self else {
            return None;
        };
        text.split_whitespace()
            .filter_map(|pair| pair.split_once('='))
            .find(|(k, _)| *k == key)
            .and_then(|(_, v)| v.parse().ok())
    }
}

impl fmt::Display for FieldValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

/// 一个已解码的语法元素
///
/// `bit_offset` 以 RBSP 起点 (NAL 头部之后, 已移除防竞争字节) 为 0.
/// 循环中的元素名带下标, 如 `vps_max_dec_pic_buffering_minus1[0]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedField {
    pub name: String,
    pub value: FieldValue,
    pub kind: FieldKind,
    pub bit_offset: usize,
    pub bit_length: usize,
}

impl DecodedField {
    /// 整数值, 复合结构与未解析数据返回 `None`
    pub fn as_int(&self) -> Option<i64> {
        match self.value {
            FieldValue::Int(v) => Some(v),
            FieldValue::Text(_) => None,
        }
    }

    /// 是否可以原位改写为任意同位宽的值
    pub fn is_editable(&self) -> bool {
        matches!(self.kind, FieldKind::FixedUnsigned(_))
    }
}

/// 在字段列表中按名称查找整数值
pub fn field_value(fields: &[DecodedField], name: &str) -> Option<i64> {
    fields.iter().find(|f| f.name == name).and_then(DecodedField::as_int)
}

/// 改写请求: 把指定字段设为新值
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldEdit {
    pub field_name: String,
    pub new_value: i64,
}

impl FieldEdit {
    pub fn new(field_name: impl Into<String>, new_value: i64) -> Self {
        Self {
            field_name: field_name.into(),
            new_value,
        }
    }
}
