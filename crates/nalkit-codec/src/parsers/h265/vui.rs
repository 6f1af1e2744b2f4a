//! VUI 与 HRD 语法表 (ITU-T H.265 附录 E).
//!
//! hrd_parameters() 由 VPS 与 VUI 共用, 调用方先用 `Let` 给出
//! `common_inf_present_flag` 与 `max_num_sub_layers_minus1` 两个参数.
//! NAL 与 VCL 两份 sub_layer_hrd_parameters() 以 `nal_` / `vcl_` 前缀区分.

use super::syntax::Descriptor::{U, Ue};
use super::syntax::Expr::{Add, Const, Eq, Not, Or, Var};
use super::syntax::Syntax::{self, Field, For, If, IfElse, Include, Let};

/// sub_layer_hrd_parameters(), NAL HRD
static NAL_SUB_LAYER_HRD_SYNTAX: &[Syntax] = &[For(
    "k",
    Const(0),
    Add(&Var("cpb_cnt_minus1"), &Const(1)),
    &[
        Field("nal_bit_rate_value_minus1", Ue),
        Field("nal_cpb_size_value_minus1", Ue),
        If(
            Var("sub_pic_hrd_params_present_flag"),
            &[
                Field("nal_cpb_size_du_value_minus1", Ue),
                Field("nal_bit_rate_du_value_minus1", Ue),
            ],
        ),
        Field("nal_cbr_flag", U(1)),
    ],
)];

/// sub_layer_hrd_parameters(), VCL HRD
static VCL_SUB_LAYER_HRD_SYNTAX: &[Syntax] = &[For(
    "k",
    Const(0),
    Add(&Var("cpb_cnt_minus1"), &Const(1)),
    &[
        Field("vcl_bit_rate_value_minus1", Ue),
        Field("vcl_cpb_size_value_minus1", Ue),
        If(
            Var("sub_pic_hrd_params_present_flag"),
            &[
                Field("vcl_cpb_size_du_value_minus1", Ue),
                Field("vcl_bit_rate_du_value_minus1", Ue),
            ],
        ),
        Field("vcl_cbr_flag", U(1)),
    ],
)];

/// hrd_parameters(commonInfPresentFlag, maxNumSubLayersMinus1)
///
/// commonInfPresentFlag 为 0 时公共参数沿用上一个 hrd_parameters() 的值.
pub static HRD_SYNTAX: &[Syntax] = &[
    If(
        Var("common_inf_present_flag"),
        &[
            Field("nal_hrd_parameters_present_flag", U(1)),
            Field("vcl_hrd_parameters_present_flag", U(1)),
            IfElse(
                Or(
                    &Var("nal_hrd_parameters_present_flag"),
                    &Var("vcl_hrd_parameters_present_flag"),
                ),
                &[
                    Field("sub_pic_hrd_params_present_flag", U(1)),
                    If(
                        Var("sub_pic_hrd_params_present_flag"),
                        &[
                            Field("tick_divisor_minus2", U(8)),
                            Field("du_cpb_removal_delay_increment_length_minus1", U(5)),
                            Field("sub_pic_cpb_params_in_pic_timing_sei_flag", U(1)),
                            Field("dpb_output_delay_du_length_minus1", U(5)),
                        ],
                    ),
                    Field("bit_rate_scale", U(4)),
                    Field("cpb_size_scale", U(4)),
                    If(
                        Var("sub_pic_hrd_params_present_flag"),
                        &[Field("cpb_size_du_scale", U(4))],
                    ),
                    Field("initial_cpb_removal_delay_length_minus1", U(5)),
                    Field("au_cpb_removal_delay_length_minus1", U(5)),
                    Field("dpb_output_delay_length_minus1", U(5)),
                ],
                &[Let("sub_pic_hrd_params_present_flag", Const(0))],
            ),
        ],
    ),
    For(
        "i",
        Const(0),
        Add(&Var("max_num_sub_layers_minus1"), &Const(1)),
        &[
            Field("fixed_pic_rate_general_flag", U(1)),
            IfElse(
                Not(&Var("fixed_pic_rate_general_flag")),
                &[Field("fixed_pic_rate_within_cvs_flag", U(1))],
                &[Let("fixed_pic_rate_within_cvs_flag", Const(1))],
            ),
            IfElse(
                Var("fixed_pic_rate_within_cvs_flag"),
                &[
                    Field("elemental_duration_in_tc_minus1", Ue),
                    Let("low_delay_hrd_flag", Const(0)),
                ],
                &[Field("low_delay_hrd_flag", U(1))],
            ),
            IfElse(
                Not(&Var("low_delay_hrd_flag")),
                &[Field("cpb_cnt_minus1", Ue)],
                &[Let("cpb_cnt_minus1", Const(0))],
            ),
            If(
                Var("nal_hrd_parameters_present_flag"),
                &[Include(NAL_SUB_LAYER_HRD_SYNTAX)],
            ),
            If(
                Var("vcl_hrd_parameters_present_flag"),
                &[Include(VCL_SUB_LAYER_HRD_SYNTAX)],
            ),
        ],
    ),
];

/// vui_parameters()
pub static VUI_SYNTAX: &[Syntax] = &[
    Field("aspect_ratio_info_present_flag", U(1)),
    If(
        Var("aspect_ratio_info_present_flag"),
        &[
            Field("aspect_ratio_idc", U(8)),
            If(
                Eq(&Var("aspect_ratio_idc"), &Const(255)),
                &[Field("sar_width", U(16)), Field("sar_height", U(16))],
            ),
        ],
    ),
    Field("overscan_info_present_flag", U(1)),
    If(
        Var("overscan_info_present_flag"),
        &[Field("overscan_appropriate_flag", U(1))],
    ),
    Field("video_signal_type_present_flag", U(1)),
    If(
        Var("video_signal_type_present_flag"),
        &[
            Field("video_format", U(3)),
            Field("video_full_range_flag", U(1)),
            Field("colour_description_present_flag", U(1)),
            If(
                Var("colour_description_present_flag"),
                &[
                    Field("colour_primaries", U(8)),
                    Field("transfer_characteristics", U(8)),
                    Field("matrix_coeffs", U(8)),
                ],
            ),
        ],
    ),
    Field("chroma_loc_info_present_flag", U(1)),
    If(
        Var("chroma_loc_info_present_flag"),
        &[
            Field("chroma_sample_loc_type_top_field", Ue),
            Field("chroma_sample_loc_type_bottom_field", Ue),
        ],
    ),
    Field("neutral_chroma_indication_flag", U(1)),
    Field("field_seq_flag", U(1)),
    Field("frame_field_info_present_flag", U(1)),
    Field("default_display_window_flag", U(1)),
    If(
        Var("default_display_window_flag"),
        &[
            Field("def_disp_win_left_offset", Ue),
            Field("def_disp_win_right_offset", Ue),
            Field("def_disp_win_top_offset", Ue),
            Field("def_disp_win_bottom_offset", Ue),
        ],
    ),
    Field("vui_timing_info_present_flag", U(1)),
    If(
        Var("vui_timing_info_present_flag"),
        &[
            Field("vui_num_units_in_tick", U(32)),
            Field("vui_time_scale", U(32)),
            Field("vui_poc_proportional_to_timing_flag", U(1)),
            If(
                Var("vui_poc_proportional_to_timing_flag"),
                &[Field("vui_num_ticks_poc_diff_one_minus1", Ue)],
            ),
            Field("vui_hrd_parameters_present_flag", U(1)),
            If(
                Var("vui_hrd_parameters_present_flag"),
                &[
                    Let("common_inf_present_flag", Const(1)),
                    Let("max_num_sub_layers_minus1", Var("sps_max_sub_layers_minus1")),
                    Include(HRD_SYNTAX),
                ],
            ),
        ],
    ),
    Field("bitstream_restriction_flag", U(1)),
    If(
        Var("bitstream_restriction_flag"),
        &[
            Field("tiles_fixed_structure_flag", U(1)),
            Field("motion_vectors_over_pic_boundaries_flag", U(1)),
            Field("restricted_ref_pic_lists_flag", U(1)),
            Field("min_spatial_segmentation_idc", Ue),
            Field("max_bytes_per_pic_denom", Ue),
            Field("max_bits_per_min_cu_denom", Ue),
            Field("log2_max_mv_length_horizontal", Ue),
            Field("log2_max_mv_length_vertical", Ue),
        ],
    ),
];
