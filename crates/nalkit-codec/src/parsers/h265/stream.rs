//! 码流级入口: 扫描、逐单元解析、改写与重组.
//!
//! 解析错误只影响所在的 NAL 单元; 改写错误整体返回, 不产生部分修改的数据.

use std::collections::BTreeMap;

use log::{debug, warn};
use nalkit_core::{NalError, NalResult};

use super::field::{DecodedField, FieldEdit};
use super::nal::{HeaderWarning, NalHeader};
use super::scanner::{NalUnitRange, NalUnitScanner};
use super::{assembler, parser, rbsp, rewriter};

/// 可在 `apply_edits` 中改写的头部字段
pub const HEADER_FIELDS: [&str; 4] = [
    "forbidden_zero_bit",
    "nal_unit_type",
    "nuh_layer_id",
    "nuh_temporal_id_plus1",
];

/// 一个 NAL 单元的解析结果
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedNalUnit {
    pub range: NalUnitRange,
    pub header: NalHeader,
    pub warnings: Vec<HeaderWarning>,
    /// 负载字段; 负载解析失败时为空, 不支持的类型为一个未解析标记
    pub fields: Vec<DecodedField>,
    pub payload_error: Option<NalError>,
}

/// 码流中一个 NAL 单元的报告
#[derive(Debug, Clone, PartialEq)]
pub struct NalUnitReport {
    pub index: usize,
    pub range: NalUnitRange,
    pub result: NalResult<ParsedNalUnit>,
}

/// 扫描 Annex B 码流
pub fn scan_nal_units(data: &[u8]) -> NalUnitScanner<'_> {
    NalUnitScanner::new(data)
}

fn range_error(start: usize, end: usize, len: usize) -> NalError {
    NalError::InvalidArgument(format!("NAL 范围 {start}..{end} 超出码流长度 {len}"))
}

fn nal_bytes<'a>(data: &'a [u8], range: &NalUnitRange) -> NalResult<&'a [u8]> {
    range
        .nal_bytes(data)
        .ok_or_else(|| range_error(range.header_offset, range.payload_end, data.len()))
}

/// 负载原始字节 (含防竞争字节)
fn payload_bytes<'a>(data: &'a [u8], range: &NalUnitRange) -> NalResult<&'a [u8]> {
    data.get(range.payload_start..range.payload_end)
        .ok_or_else(|| range_error(range.payload_start, range.payload_end, data.len()))
}

/// 解析一个 NAL 单元
///
/// 只有头部无法解码时返回错误; 负载错误记录在 `payload_error` 中.
pub fn parse_nal_unit(data: &[u8], range: &NalUnitRange) -> NalResult<ParsedNalUnit> {
    let nal = nal_bytes(data, range)?;
    let header = NalHeader::decode(nal)?;
    let warnings = header.warnings();
    for w in &warnings {
        warn!("NAL @{}: {}", range.start_offset, w);
    }

    let rbsp = rbsp::strip(payload_bytes(data, range)?);
    let (fields, payload_error) = match parser::parse(header.nal_unit_type, &rbsp) {
        Ok(fields) => (fields, None),
        Err(NalError::UnsupportedNalType(t)) => (
            vec![parser::opaque_payload(&rbsp)],
            Some(NalError::UnsupportedNalType(t)),
        ),
        Err(e) => {
            warn!("NAL @{} ({}) 负载解析失败: {}", range.start_offset, header.nal_type(), e);
            (Vec::new(), Some(e))
        }
    };
    debug!(
        "NAL @{}: {} 长度 {} 字节, {} 个字段",
        range.start_offset,
        header.nal_type(),
        range.nal_len(),
        fields.len()
    );

    Ok(ParsedNalUnit {
        range: *range,
        header,
        warnings,
        fields,
        payload_error,
    })
}

/// 解析码流中的所有 NAL 单元, 单元失败不影响后续单元
pub fn parse_stream(data: &[u8]) -> Vec<NalUnitReport> {
    scan_nal_units(data)
        .enumerate()
        .map(|(index, range)| NalUnitReport {
            index,
            range,
            result: parse_nal_unit(data, &range),
        })
        .collect()
}

fn apply_header_edit(header: &mut NalHeader, edit: &FieldEdit) -> NalResult<()> {
    let value = edit.new_value;
    match edit.field_name.as_str() {
        "nuh_layer_id" => {
            if !(0..=63).contains(&value) {
                return Err(NalError::ValueOutOfRange {
                    field: edit.field_name.clone(),
                    value,
                    bit_length: 6,
                });
            }
            header.nuh_layer_id = value as u8;
        }
        "nuh_temporal_id_plus1" => {
            if !(0..=7).contains(&value) {
                return Err(NalError::ValueOutOfRange {
                    field: edit.field_name.clone(),
                    value,
                    bit_length: 3,
                });
            }
            if value == 0 {
                return Err(NalError::UnsupportedRewrite {
                    field: edit.field_name.clone(),
                    reason: "nuh_temporal_id_plus1 不能为 0".into(),
                });
            }
            header.nuh_temporal_id_plus1 = value as u8;
        }
        name => {
            return Err(NalError::UnsupportedRewrite {
                field: name.to_string(),
                reason: "该头部字段决定 NAL 的解释方式, 不允许改写".into(),
            });
        }
    }
    Ok(())
}

/// 对一个 NAL 单元应用改写, 返回替换用的 NAL 数据 (头部 + 转义后的负载)
///
/// `fields` 必须是该单元负载的解析结果. 负载没有变化时原样返回原始字节;
/// 否则重新插入防竞争字节, 长度变化时拒绝.
pub fn apply_edits(
    data: &[u8],
    range: &NalUnitRange,
    fields: &[DecodedField],
    edits: &[FieldEdit],
) -> NalResult<Vec<u8>> {
    let nal = nal_bytes(data, range)?;
    let mut header = NalHeader::decode(nal)?;

    let (header_edits, payload_edits): (Vec<FieldEdit>, Vec<FieldEdit>) = edits
        .iter()
        .cloned()
        .partition(|e| HEADER_FIELDS.contains(&e.field_name.as_str()));
    for edit in &header_edits {
        apply_header_edit(&mut header, edit)?;
    }

    let raw_payload = payload_bytes(data, range)?;
    let payload = if payload_edits.is_empty() {
        raw_payload.to_vec()
    } else {
        let rbsp = rbsp::strip(raw_payload);
        let new_rbsp = rewriter::rewrite(header.nal_unit_type, &rbsp, fields, &payload_edits)?;
        if new_rbsp == rbsp {
            raw_payload.to_vec()
        } else {
            let escaped = rbsp::insert(&new_rbsp);
            if escaped.len() != raw_payload.len() {
                warn!(
                    "NAL @{}: 改写后转义长度 {} -> {}, 拒绝",
                    range.start_offset,
                    raw_payload.len(),
                    escaped.len()
                );
                return Err(NalError::EscapedLengthChanged {
                    expected: raw_payload.len(),
                    actual: escaped.len(),
                });
            }
            escaped
        }
    };

    let mut out = Vec::with_capacity(range.nal_len());
    out.extend_from_slice(&header.encode());
    out.extend_from_slice(&payload);
    Ok(out)
}

/// 用替换数据重建码流
pub fn rebuild_stream(
    data: &[u8],
    ranges: &[NalUnitRange],
    replacements: &BTreeMap<usize, Vec<u8>>,
) -> NalResult<Vec<u8>> {
    assembler::assemble(data, ranges, replacements)
}
