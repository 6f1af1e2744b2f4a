//! 探测结果的 JSON 结构与文本输出.

use serde::Serialize;

use nalkit_codec::parsers::h265::{
    DecodedField, FieldValue, HevcNalUnitType, HevcSpsInfo, NalUnitReport,
};

// ============================================================
// JSON 输出结构体
// ============================================================

/// 完整探测结果
#[derive(Serialize)]
pub struct ProbeOutput {
    pub filename: String,
    pub size: usize,
    pub nb_nal_units: usize,
    pub nal_units: Vec<NalUnitInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

/// NAL 单元信息
#[derive(Serialize)]
pub struct NalUnitInfo {
    pub index: usize,
    pub offset: usize,
    pub start_code_len: u8,
    pub length: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nal_unit_type: Option<u8>,
    pub type_name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuh_layer_id: Option<u8>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nuh_temporal_id_plus1: Option<u8>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
    pub fields: Vec<FieldInfo>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sps_summary: Option<SpsSummary>,
}

/// 字段值: 整数输出为数字, 其余为字符串
#[derive(Serialize)]
#[serde(untagged)]
pub enum FieldValueInfo {
    Int(i64),
    Text(String),
}

/// 语法元素信息
#[derive(Serialize)]
pub struct FieldInfo {
    pub name: String,
    pub value: FieldValueInfo,
    pub descriptor: String,
    pub bit_offset: usize,
    pub bit_length: usize,
    pub editable: bool,
}

/// SPS 推导信息
#[derive(Serialize)]
pub struct SpsSummary {
    pub profile: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub level: Option<f64>,
    pub width: u32,
    pub height: u32,
    pub coded_width: u32,
    pub coded_height: u32,
    pub chroma_format: String,
    pub bit_depth_luma: u32,
    pub bit_depth_chroma: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame_rate: Option<String>,
    pub sample_aspect_ratio: String,
}

impl From<&DecodedField> for FieldInfo {
    fn from(field: &DecodedField) -> Self {
        Self {
            name: field.name.clone(),
            value: match &field.value {
                FieldValue::Int(v) => FieldValueInfo::Int(*v),
                FieldValue::Text(s) => FieldValueInfo::Text(s.clone()),
            },
            descriptor: field.kind.descriptor(),
            bit_offset: field.bit_offset,
            bit_length: field.bit_length,
            editable: field.is_editable(),
        }
    }
}

impl From<&HevcSpsInfo> for SpsSummary {
    fn from(info: &HevcSpsInfo) -> Self {
        Self {
            profile: info.profile_name().to_string(),
            level: info.level(),
            width: info.width,
            height: info.height,
            coded_width: info.pic_width,
            coded_height: info.pic_height,
            chroma_format: info.chroma_format_name().to_string(),
            bit_depth_luma: info.bit_depth_luma,
            bit_depth_chroma: info.bit_depth_chroma,
            frame_rate: info.frame_rate.map(|r| r.to_string()),
            sample_aspect_ratio: format!("{}:{}", info.sar.0, info.sar.1),
        }
    }
}

/// 从解析报告构建 NAL 单元信息
pub fn build_nal_unit_info(report: &NalUnitReport) -> NalUnitInfo {
    let range = &report.range;
    let mut info = NalUnitInfo {
        index: report.index,
        offset: range.start_offset,
        start_code_len: range.start_code_len,
        length: range.nal_len(),
        nal_unit_type: None,
        type_name: "?".into(),
        nuh_layer_id: None,
        nuh_temporal_id_plus1: None,
        warnings: Vec::new(),
        fields: Vec::new(),
        error: None,
        sps_summary: None,
    };

    match &report.result {
        Ok(unit) => {
            let header = &unit.header;
            info.nal_unit_type = Some(header.nal_unit_type);
            info.type_name = header.nal_type().name();
            info.nuh_layer_id = Some(header.nuh_layer_id);
            info.nuh_temporal_id_plus1 = Some(header.nuh_temporal_id_plus1);
            info.warnings = unit.warnings.iter().map(ToString::to_string).collect();
            info.fields = unit.fields.iter().map(FieldInfo::from).collect();
            info.error = unit.payload_error.as_ref().map(ToString::to_string);
            if header.nal_type() == HevcNalUnitType::Sps && unit.payload_error.is_none() {
                info.sps_summary = HevcSpsInfo::from_fields(&unit.fields)
                    .as_ref()
                    .map(SpsSummary::from);
            }
        }
        Err(e) => info.error = Some(e.to_string()),
    }
    info
}

// ============================================================
// 文本输出
// ============================================================

pub fn print_text(output: &ProbeOutput) {
    println!("文件: {} ({} 字节, {} 个 NAL 单元)", output.filename, output.size, output.nb_nal_units);
    for unit in &output.nal_units {
        print_nal_unit_text(unit);
    }
    if let Some(ref path) = output.output {
        println!();
        println!("已写入: {path}");
    }
}

fn print_nal_unit_text(unit: &NalUnitInfo) {
    println!();
    print!(
        "[NAL #{}] @{} {} 长度={}",
        unit.index, unit.offset, unit.type_name, unit.length
    );
    if let (Some(t), Some(layer), Some(tid)) =
        (unit.nal_unit_type, unit.nuh_layer_id, unit.nuh_temporal_id_plus1)
    {
        print!(" (type={t} layer={layer} tid_plus1={tid})");
    }
    println!();

    for w in &unit.warnings {
        println!("  警告: {w}");
    }
    for field in &unit.fields {
        let value = match &field.value {
            FieldValueInfo::Int(v) => v.to_string(),
            FieldValueInfo::Text(s) => s.clone(),
        };
        println!(
            "  {:<48} {:<12} {:>6}+{:<4} {}",
            field.name, value, field.bit_offset, field.bit_length, field.descriptor
        );
    }
    if let Some(ref e) = unit.error {
        println!("  错误: {e}");
    }
    if let Some(ref s) = unit.sps_summary {
        print!(
            "  摘要: {} {}x{} ({}x{}) {} {}bit",
            s.profile,
            s.width,
            s.height,
            s.coded_width,
            s.coded_height,
            s.chroma_format,
            s.bit_depth_luma
        );
        if let Some(level) = s.level {
            print!(" level {level:.1}");
        }
        if let Some(ref fps) = s.frame_rate {
            print!(" {fps}");
        }
        println!(" SAR {}", s.sample_aspect_ratio);
    }
}
