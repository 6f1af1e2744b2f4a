//! x265 编码器输出的参数集解析与改写测试

use std::collections::BTreeMap;

use nalkit_codec::parsers::h265::{
    FieldEdit, HevcNalUnitType, HevcSpsInfo, NalUnitRange, apply_edits, field_value, parse_stream,
    rebuild_stream, scan_nal_units,
};
use nalkit_core::NalError;

fn init_logger() {
    let _ = env_logger::builder().is_test(true).try_init();
}

/// Big Buck Bunny 1080p (x265) 的 VPS + SPS + PPS + IDR 片段开头
const BBB_1080_SAMPLE: &[u8] = &[
    // VPS
    0x00, 0x00, 0x00, 0x01, 0x40, 0x01, 0x0c, 0x01, 0xff, 0xff, 0x01, 0x60, 0x00, 0x00,
    0x03, 0x00, 0x90, 0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00, 0x78, 0x95, 0x98, 0x09,
    // SPS
    0x00, 0x00, 0x00, 0x01, 0x42, 0x01, 0x01, 0x01, 0x60, 0x00, 0x00, 0x03, 0x00, 0x90,
    0x00, 0x00, 0x03, 0x00, 0x00, 0x03, 0x00, 0x78, 0xa0, 0x03, 0xc0, 0x80, 0x10, 0xe5,
    0x96, 0x56, 0x69, 0x24, 0xca, 0xf0, 0x16, 0x9c, 0x20, 0x00, 0x00, 0x03, 0x00, 0x20,
    0x00, 0x00, 0x03, 0x03, 0xc1,
    // PPS
    0x00, 0x00, 0x00, 0x01, 0x44, 0x01, 0xc1, 0x72, 0xb4, 0x62, 0x40,
    // IDR_W_RADL
    0x00, 0x00, 0x00, 0x01, 0x26, 0x01, 0x88, 0x84, 0x21, 0x43, 0x02, 0x4C, 0x82, 0x54,
    0x2B, 0x8F, 0x2C, 0x8C, 0x54, 0x4A, 0x92, 0x54, 0x2B, 0x8F, 0x2C, 0x8C, 0x54, 0x4A,
];

#[test]
fn test_x265_参数集解析() {
    init_logger();
    let reports = parse_stream(BBB_1080_SAMPLE);
    assert_eq!(reports.len(), 4);

    let expected = [
        (HevcNalUnitType::Vps, 16),
        (HevcNalUnitType::Sps, 52),
        (HevcNalUnitType::Pps, 29),
    ];
    for (report, (nal_type, field_count)) in reports.iter().zip(expected) {
        let unit = report.result.as_ref().unwrap();
        assert_eq!(unit.header.nal_type(), nal_type);
        assert!(unit.payload_error.is_none(), "{nal_type}: {:?}", unit.payload_error);
        assert!(unit.warnings.is_empty());
        assert_eq!(unit.fields.len(), field_count, "{nal_type}");
    }

    let sps = reports[1].result.as_ref().unwrap();
    let info = HevcSpsInfo::from_fields(&sps.fields).unwrap();
    assert_eq!((info.width, info.height), (1920, 1080));
    assert_eq!(info.general_profile_idc, Some(1));
    assert_eq!(info.general_level_idc, Some(120));
    assert_eq!(info.chroma_format_name(), "4:2:0");
    assert_eq!((info.bit_depth_luma, info.bit_depth_chroma), (8, 8));

    // 片段数据不解析, 但单元本身正常报告
    let idr = reports[3].result.as_ref().unwrap();
    assert_eq!(idr.header.nal_type(), HevcNalUnitType::IdrWRadl);
    assert_eq!(idr.payload_error, Some(NalError::UnsupportedNalType(19)));
}

#[test]
fn test_x265_sps_改写后重组() {
    init_logger();
    let reports = parse_stream(BBB_1080_SAMPLE);
    let sps = reports[1].result.as_ref().unwrap();
    assert_eq!(field_value(&sps.fields, "sps_video_parameter_set_id"), Some(0));

    let edits = [FieldEdit::new("sps_video_parameter_set_id", 1)];
    let nal = apply_edits(BBB_1080_SAMPLE, &sps.range, &sps.fields, &edits).unwrap();
    let mut replacements = BTreeMap::new();
    replacements.insert(1, nal);
    let ranges: Vec<NalUnitRange> = scan_nal_units(BBB_1080_SAMPLE).collect();
    let out = rebuild_stream(BBB_1080_SAMPLE, &ranges, &replacements).unwrap();

    // 只有 SPS 负载的第一个字节变化, 防竞争字节原样保留
    assert_eq!(out.len(), BBB_1080_SAMPLE.len());
    let changed: Vec<usize> = (0..out.len())
        .filter(|&i| out[i] != BBB_1080_SAMPLE[i])
        .collect();
    assert_eq!(changed, vec![sps.range.payload_start]);
    assert_eq!(out[sps.range.payload_start], 0x11);

    let after = parse_stream(&out);
    let sps_after = after[1].result.as_ref().unwrap();
    assert_eq!(field_value(&sps_after.fields, "sps_video_parameter_set_id"), Some(1));
    assert_eq!(
        field_value(&sps_after.fields, "pic_width_in_luma_samples"),
        Some(1920)
    );
}
