//! 从 SPS 字段列表推导序列参数摘要.
//!
//! 分辨率、位深、帧率等不直接出现在码流中, 需要由多个语法元素组合得出.

use std::fmt;

use super::field::{DecodedField, field_value};

/// 预定义 SAR 表 (ITU-T H.265 表 E.1)
const HEVC_SAR_TABLE: [(u32, u32); 17] = [
    (0, 1),
    (1, 1),
    (12, 11),
    (10, 11),
    (16, 11),
    (40, 33),
    (24, 11),
    (20, 11),
    (32, 11),
    (80, 33),
    (18, 11),
    (15, 11),
    (64, 33),
    (160, 99),
    (4, 3),
    (3, 2),
    (2, 1),
];

/// 帧率 time_scale / num_units_in_tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameRate {
    pub time_scale: u32,
    pub num_units_in_tick: u32,
}

impl FrameRate {
    pub fn as_f64(&self) -> f64 {
        f64::from(self.time_scale) / f64::from(self.num_units_in_tick)
    }
}

impl fmt::Display for FrameRate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3} fps", self.as_f64())
    }
}

/// SPS 摘要
#[derive(Debug, Clone, PartialEq)]
pub struct HevcSpsInfo {
    /// SPS 所引用的 VPS ID
    pub vps_id: u8,
    /// SPS ID
    pub sps_id: u32,
    /// 最大子层数
    pub max_sub_layers: u8,
    pub general_profile_idc: Option<u8>,
    pub general_tier_flag: Option<bool>,
    pub general_level_idc: Option<u8>,
    /// 色度格式 (0=单色, 1=4:2:0, 2=4:2:2, 3=4:4:4)
    pub chroma_format_idc: u32,
    pub separate_colour_plane: bool,
    /// 亮度位深
    pub bit_depth_luma: u32,
    /// 色度位深
    pub bit_depth_chroma: u32,
    /// 编码宽度 (未裁剪)
    pub pic_width: u32,
    /// 编码高度 (未裁剪)
    pub pic_height: u32,
    /// 图像宽度 (已应用 conformance window)
    pub width: u32,
    /// 图像高度 (已应用 conformance window)
    pub height: u32,
    /// 帧率 (如果 VUI 中有 timing_info)
    pub frame_rate: Option<FrameRate>,
    /// SAR (Sample Aspect Ratio), 未指定时为 1:1
    pub sar: (u32, u32),
}

impl HevcSpsInfo {
    /// 从 SPS 字段列表推导摘要, 缺少必需字段时返回 `None`
    pub fn from_fields(fields: &[DecodedField]) -> Option<Self> {
        let get = |name: &str| field_value(fields, name);
        let get_u32 = |name: &str| get(name).and_then(|v| u32::try_from(v).ok());
        let or_zero = |name: &str| get_u32(name).unwrap_or(0);

        let chroma_format_idc = get_u32("chroma_format_idc")?;
        let separate_colour_plane = or_zero("separate_colour_plane_flag") != 0;
        let pic_width = get_u32("pic_width_in_luma_samples")?;
        let pic_height = get_u32("pic_height_in_luma_samples")?;

        // ChromaArrayType 为 0 (单色或独立色彩平面) 时裁剪单位为 1
        let chroma_array_type = if separate_colour_plane {
            0
        } else {
            chroma_format_idc
        };
        let sub_width_c: u32 = if chroma_array_type == 1 || chroma_array_type == 2 {
            2
        } else {
            1
        };
        let sub_height_c: u32 = if chroma_array_type == 1 { 2 } else { 1 };

        let crop_h =
            or_zero("conf_win_left_offset").saturating_add(or_zero("conf_win_right_offset"));
        let crop_v =
            or_zero("conf_win_top_offset").saturating_add(or_zero("conf_win_bottom_offset"));
        let width = pic_width.saturating_sub(sub_width_c.saturating_mul(crop_h));
        let height = pic_height.saturating_sub(sub_height_c.saturating_mul(crop_v));

        let frame_rate = match (get_u32("vui_num_units_in_tick"), get_u32("vui_time_scale")) {
            (Some(num_units_in_tick), Some(time_scale))
                if num_units_in_tick > 0 && time_scale > 0 =>
            {
                Some(FrameRate {
                    time_scale,
                    num_units_in_tick,
                })
            }
            _ => None,
        };

        let sar = match get_u32("aspect_ratio_idc") {
            Some(255) => match (get_u32("sar_width"), get_u32("sar_height")) {
                (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
                _ => (1, 1),
            },
            Some(idc) => HEVC_SAR_TABLE
                .get(idc as usize)
                .copied()
                .filter(|&(w, h)| w > 0 && h > 0)
                .unwrap_or((1, 1)),
            None => (1, 1),
        };

        let ptl = fields.iter().find(|f| f.name == "profile_tier_level");
        let ptl_entry = |key: &str| ptl.and_then(|f| f.value.summary_entry(key));

        Some(Self {
            vps_id: get("sps_video_parameter_set_id")? as u8,
            sps_id: get_u32("sps_seq_parameter_set_id")?,
            max_sub_layers: get("sps_max_sub_layers_minus1")? as u8 + 1,
            general_profile_idc: ptl_entry("general_profile_idc").map(|v| v as u8),
            general_tier_flag: ptl_entry("general_tier_flag").map(|v| v != 0),
            general_level_idc: ptl_entry("general_level_idc").map(|v| v as u8),
            chroma_format_idc,
            separate_colour_plane,
            bit_depth_luma: get_u32("bit_depth_luma_minus8")?.saturating_add(8),
            bit_depth_chroma: get_u32("bit_depth_chroma_minus8")?.saturating_add(8),
            pic_width,
            pic_height,
            width,
            height,
            frame_rate,
            sar,
        })
    }

    /// 色度格式名称
    pub fn chroma_format_name(&self) -> &'static str {
        match self.chroma_format_idc {
            0 => "4:0:0",
            1 => "4:2:0",
            2 => "4:2:2",
            3 => "4:4:4",
            _ => "unknown",
        }
    }

    /// profile 名称 (A.3)
    pub fn profile_name(&self) -> &'static str {
        match self.general_profile_idc {
            Some(1) => "Main",
            Some(2) => "Main 10",
            Some(3) => "Main Still Picture",
            Some(4) => "Format Range Extensions",
            Some(5) => "High Throughput",
            Some(9) => "Screen Content Coding",
            Some(_) => "Other",
            None => "unknown",
        }
    }

    /// level 数值, general_level_idc = 30 * level
    pub fn level(&self) -> Option<f64> {
        self.general_level_idc.map(|idc| f64::from(idc) / 30.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::h265::field::{FieldKind, FieldValue};

    fn int(name: &str, value: i64) -> DecodedField {
        DecodedField {
            name: name.into(),
            value: FieldValue::Int(value),
            kind: FieldKind::ExpGolombUnsigned,
            bit_offset: 0,
            bit_length: 1,
        }
    }

    fn base_fields() -> Vec<DecodedField> {
        vec![
            int("sps_video_parameter_set_id", 0),
            int("sps_max_sub_layers_minus1", 0),
            DecodedField {
                name: "profile_tier_level".into(),
                value: FieldValue::Text(
                    concat!(
                        "general_profile_space=0 general_tier_flag=0 ",
                        "general_profile_idc=2 general_level_idc=120 sub_layers=1"
                    )
                    .into(),
                ),
                kind: FieldKind::Composite,
                bit_offset: 8,
                bit_length: 96,
            },
            int("sps_seq_parameter_set_id", 0),
            int("chroma_format_idc", 1),
            int("pic_width_in_luma_samples", 1920),
            int("pic_height_in_luma_samples", 1088),
            int("conformance_window_flag", 1),
            int("conf_win_left_offset", 0),
            int("conf_win_right_offset", 0),
            int("conf_win_top_offset", 0),
            int("conf_win_bottom_offset", 4),
            int("bit_depth_luma_minus8", 2),
            int("bit_depth_chroma_minus8", 2),
        ]
    }

    #[test]
    fn test_sps_info_裁剪与位深() {
        let info = HevcSpsInfo::from_fields(&base_fields()).unwrap();
        assert_eq!((info.pic_width, info.pic_height), (1920, 1088));
        assert_eq!((info.width, info.height), (1920, 1080));
        assert_eq!(info.bit_depth_luma, 10);
        assert_eq!(info.chroma_format_name(), "4:2:0");
        assert_eq!(info.profile_name(), "Main 10");
        assert_eq!(info.level(), Some(4.0));
        assert_eq!(info.general_tier_flag, Some(false));
        assert_eq!(info.frame_rate, None);
        assert_eq!(info.sar, (1, 1));
    }

    #[test]
    fn test_sps_info_帧率与_sar() {
        let mut fields = base_fields();
        fields.push(int("aspect_ratio_idc", 14));
        fields.push(int("vui_num_units_in_tick", 1001));
        fields.push(int("vui_time_scale", 60000));
        let info = HevcSpsInfo::from_fields(&fields).unwrap();
        assert_eq!(info.sar, (4, 3));
        let fps = info.frame_rate.unwrap();
        assert!((fps.as_f64() - 59.94).abs() < 0.01);
        assert_eq!(fps.to_string(), "59.940 fps");
    }

    #[test]
    fn test_sps_info_独立色彩平面() {
        let mut fields = base_fields();
        fields[4] = int("chroma_format_idc", 3);
        fields.push(int("separate_colour_plane_flag", 1));
        let info = HevcSpsInfo::from_fields(&fields).unwrap();
        assert!(info.separate_colour_plane);
        assert_eq!(info.height, 1084);
    }

    #[test]
    fn test_sps_info_缺少字段() {
        let fields: Vec<_> = base_fields()
            .into_iter()
            .filter(|f| f.name != "pic_width_in_luma_samples")
            .collect();
        assert!(HevcSpsInfo::from_fields(&fields).is_none());
    }
}
