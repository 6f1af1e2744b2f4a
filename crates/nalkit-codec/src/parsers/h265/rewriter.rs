//! RBSP 字段原位改写.
//!
//! 只有定长无符号字段可以改为任意同位宽的值: Exp-Golomb 字段的码长随值变化,
//! 改写会移动其后所有字段. 改写后重新解析, 若字段布局发生变化
//! (例如改动了决定后续字段是否出现的标志), 整个请求被拒绝.

use std::collections::HashMap;

use log::debug;
use nalkit_core::bitwriter::patch_bits;
use nalkit_core::{NalError, NalResult};

use super::field::{DecodedField, FieldEdit, FieldKind};
use super::parser;

/// 一次待执行的覆写
struct Patch {
    bit_offset: usize,
    width: u32,
    value: u32,
}

/// 检查单个改写请求, 返回需要执行的覆写
fn plan_edit(field: &DecodedField, new_value: i64) -> NalResult<Patch> {
    match field.kind {
        FieldKind::FixedUnsigned(width) => {
            let max = (1i64 << width) - 1;
            if !(0..=max).contains(&new_value) {
                return Err(NalError::ValueOutOfRange {
                    field: field.name.clone(),
                    value: new_value,
                    bit_length: width,
                });
            }
            Ok(Patch {
                bit_offset: field.bit_offset,
                width,
                value: new_value as u32,
            })
        }
        FieldKind::FixedPattern { width, pattern } => {
            if new_value != i64::from(pattern) {
                return Err(NalError::UnsupportedRewrite {
                    field: field.name.clone(),
                    reason: format!("固定比特模式只能取 {pattern:#x}"),
                });
            }
            Ok(Patch {
                bit_offset: field.bit_offset,
                width,
                value: pattern,
            })
        }
        FieldKind::ExpGolombUnsigned | FieldKind::ExpGolombSigned => {
            Err(NalError::UnsupportedRewrite {
                field: field.name.clone(),
                reason: "Exp-Golomb 变长编码, 改值会改变码长".into(),
            })
        }
        FieldKind::Composite => Err(NalError::UnsupportedRewrite {
            field: field.name.clone(),
            reason: "复合结构只遍历, 不可编辑".into(),
        }),
        FieldKind::Opaque => Err(NalError::UnsupportedRewrite {
            field: field.name.clone(),
            reason: "未解析数据".into(),
        }),
    }
}

/// 第一个不一致的字段, 用于错误信息
fn describe_mismatch(expected: &[DecodedField], actual: &[DecodedField]) -> String {
    if expected.len() != actual.len() {
        return format!("字段数 {} 与 RBSP 解析结果 {} 不符", expected.len(), actual.len());
    }
    expected
        .iter()
        .zip(actual)
        .find(|(a, b)| a != b)
        .map(|(a, b)| format!("字段 {} 与 RBSP 中的 {} (位偏移 {}) 不符", a.name, b.name, b.bit_offset))
        .unwrap_or_default()
}

fn same_layout(a: &[DecodedField], b: &[DecodedField]) -> bool {
    a.len() == b.len()
        && a.iter().zip(b).all(|(x, y)| {
            x.name == y.name
                && x.kind == y.kind
                && x.bit_offset == y.bit_offset
                && x.bit_length == y.bit_length
        })
}

/// 在 RBSP 上应用改写请求
///
/// `fields` 必须是 `rbsp` 的解析结果. 所有请求先整体校验, 任何一个失败则
/// 不做任何修改; 同一字段出现多次时以最后一个为准.
/// 返回新的 RBSP, 长度与输入相同.
pub fn rewrite(
    nal_type: u8,
    rbsp: &[u8],
    fields: &[DecodedField],
    edits: &[FieldEdit],
) -> NalResult<Vec<u8>> {
    let reparsed = parser::parse(nal_type, rbsp)?;
    if reparsed != fields {
        return Err(NalError::StructuralMismatch(describe_mismatch(fields, &reparsed)));
    }
    if edits.is_empty() {
        return Ok(rbsp.to_vec());
    }

    let index: HashMap<&str, &DecodedField> =
        fields.iter().map(|f| (f.name.as_str(), f)).collect();
    let mut patches = Vec::with_capacity(edits.len());
    for edit in edits {
        let field = index
            .get(edit.field_name.as_str())
            .ok_or_else(|| NalError::FieldNotFound(edit.field_name.clone()))?;
        patches.push(plan_edit(field, edit.new_value)?);
    }

    let mut out = rbsp.to_vec();
    for patch in &patches {
        patch_bits(&mut out, patch.bit_offset, patch.width, patch.value)?;
    }

    // 改写不得改变其后字段的位置与编码方式
    let changed_layout = match parser::parse(nal_type, &out) {
        Ok(after) => !same_layout(fields, &after),
        Err(_) => true,
    };
    if changed_layout {
        let names: Vec<&str> = edits.iter().map(|e| e.field_name.as_str()).collect();
        return Err(NalError::UnsupportedRewrite {
            field: names.join(", "),
            reason: "新值会改变后续字段的语法结构".into(),
        });
    }

    debug!("NAL 类型 {nal_type}: 改写 {} 个字段", patches.len());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::h265::field::field_value;
    use nalkit_core::BitWriter;

    fn aud(pic_type: u32) -> Vec<u8> {
        let mut bw = BitWriter::new();
        bw.write_bits(pic_type, 3);
        bw.write_rbsp_trailing_bits();
        bw.finish()
    }

    /// PPS: 含 ue / se / 定长字段, 以及决定 diff_cu_qp_delta_depth 是否出现的标志
    fn pps() -> Vec<u8> {
        let mut bw = BitWriter::new();
        bw.write_ue(0);
        bw.write_ue(0);
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_bits(2, 3); // num_extra_slice_header_bits
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_ue(0);
        bw.write_ue(0);
        bw.write_se(3); // init_qp_minus26
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_bits(0, 1); // cu_qp_delta_enabled_flag
        bw.write_se(0);
        bw.write_se(0);
        for _ in 0..6 {
            bw.write_bits(0, 1);
        }
        bw.write_bits(1, 1);
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_ue(0);
        bw.write_bits(0, 1);
        bw.write_bits(0, 1);
        bw.write_rbsp_trailing_bits();
        bw.finish()
    }

    #[test]
    fn test_rewrite_定长字段() {
        let rbsp = aud(2);
        let fields = parser::parse(35, &rbsp).unwrap();
        for v in 0..8 {
            let out = rewrite(35, &rbsp, &fields, &[FieldEdit::new("pic_type", v)]).unwrap();
            assert_eq!(out.len(), rbsp.len());
            let after = parser::parse(35, &out).unwrap();
            assert_eq!(field_value(&after, "pic_type"), Some(v));
        }
    }

    #[test]
    fn test_rewrite_值超出范围() {
        let rbsp = aud(2);
        let fields = parser::parse(35, &rbsp).unwrap();
        for v in [8, -1, 1 << 40] {
            assert_eq!(
                rewrite(35, &rbsp, &fields, &[FieldEdit::new("pic_type", v)]),
                Err(NalError::ValueOutOfRange {
                    field: "pic_type".into(),
                    value: v,
                    bit_length: 3,
                })
            );
        }
    }

    #[test]
    fn test_rewrite_拒绝变长与未知字段() {
        let rbsp = pps();
        let fields = parser::parse(34, &rbsp).unwrap();

        let edits = [FieldEdit::new("init_qp_minus26", 3)];
        let err = rewrite(34, &rbsp, &fields, &edits).unwrap_err();
        assert!(matches!(
            err,
            NalError::UnsupportedRewrite { ref field, .. } if field == "init_qp_minus26"
        ));

        let edits = [FieldEdit::new("pps_pic_parameter_set_id", 0)];
        let err = rewrite(34, &rbsp, &fields, &edits).unwrap_err();
        assert!(matches!(err, NalError::UnsupportedRewrite { .. }));

        assert_eq!(
            rewrite(34, &rbsp, &fields, &[FieldEdit::new("no_such_field", 1)]),
            Err(NalError::FieldNotFound("no_such_field".into()))
        );
    }

    #[test]
    fn test_rewrite_全部校验后才修改() {
        let rbsp = pps();
        let fields = parser::parse(34, &rbsp).unwrap();
        let edits = [
            FieldEdit::new("num_extra_slice_header_bits", 5),
            FieldEdit::new("init_qp_minus26", 0),
        ];
        assert!(rewrite(34, &rbsp, &fields, &edits).is_err());

        let edits = [
            FieldEdit::new("num_extra_slice_header_bits", 5),
            FieldEdit::new("weighted_pred_flag", 1),
            FieldEdit::new("num_extra_slice_header_bits", 7),
        ];
        let out = rewrite(34, &rbsp, &fields, &edits).unwrap();
        let after = parser::parse(34, &out).unwrap();
        assert_eq!(field_value(&after, "num_extra_slice_header_bits"), Some(7));
        assert_eq!(field_value(&after, "weighted_pred_flag"), Some(1));
        assert_eq!(field_value(&after, "init_qp_minus26"), Some(3));
        // 未改写的字段逐位不变
        for (a, b) in fields.iter().zip(&after) {
            assert_eq!((a.bit_offset, a.bit_length), (b.bit_offset, b.bit_length));
        }
    }

    #[test]
    fn test_rewrite_改变语法结构被拒绝() {
        let rbsp = pps();
        let fields = parser::parse(34, &rbsp).unwrap();
        // cu_qp_delta_enabled_flag = 1 会让其后的位被解释为 diff_cu_qp_delta_depth
        let edits = [FieldEdit::new("cu_qp_delta_enabled_flag", 1)];
        let err = rewrite(34, &rbsp, &fields, &edits).unwrap_err();
        assert!(matches!(
            err,
            NalError::UnsupportedRewrite { ref field, .. } if field == "cu_qp_delta_enabled_flag"
        ));
    }

    #[test]
    fn test_rewrite_字段列表不匹配() {
        let rbsp = aud(2);
        let mut fields = parser::parse(35, &rbsp).unwrap();
        fields[0].bit_offset = 1;
        assert!(matches!(
            rewrite(35, &rbsp, &fields, &[FieldEdit::new("pic_type", 1)]),
            Err(NalError::StructuralMismatch(_))
        ));
    }

    #[test]
    fn test_rewrite_不支持的类型() {
        assert_eq!(
            rewrite(1, &[0x80], &[], &[FieldEdit::new("x", 1)]),
            Err(NalError::UnsupportedNalType(1))
        );
    }
}
