//! H.265 SPS (Sequence Parameter Set) 语法表.
//!
//! seq_parameter_set_rbsp(), ITU-T H.265 7.3.2.2.
//! 扩展部分只展开 sps_range_extension(), 其余扩展数据作为未解析数据保留.

use super::syntax::Descriptor::{U, Ue, Uv};
use super::syntax::Expr::{Add, Const, Eq, Or, Select, Var};
use super::syntax::Structure;
use super::syntax::Syntax::{self, Composite, Field, For, If, Include, Opaque, TrailingBits};
use super::vui::VUI_SYNTAX;

/// sps_range_extension()
static SPS_RANGE_EXTENSION_SYNTAX: &[Syntax] = &[
    Field("transform_skip_rotation_enabled_flag", U(1)),
    Field("transform_skip_context_enabled_flag", U(1)),
    Field("implicit_rdpcm_enabled_flag", U(1)),
    Field("explicit_rdpcm_enabled_flag", U(1)),
    Field("extended_precision_processing_flag", U(1)),
    Field("intra_smoothing_disabled_flag", U(1)),
    Field("high_precision_offsets_enabled_flag", U(1)),
    Field("persistent_rice_adaptation_enabled_flag", U(1)),
    Field("cabac_bypass_alignment_enabled_flag", U(1)),
];

/// seq_parameter_set_rbsp()
pub static SPS_SYNTAX: &[Syntax] = &[
    Field("sps_video_parameter_set_id", U(4)),
    Field("sps_max_sub_layers_minus1", U(3)),
    Field("sps_temporal_id_nesting_flag", U(1)),
    Composite(
        "profile_tier_level",
        Structure::ProfileTierLevel {
            max_sub_layers_minus1: Var("sps_max_sub_layers_minus1"),
        },
    ),
    Field("sps_seq_parameter_set_id", Ue),
    Field("chroma_format_idc", Ue),
    If(
        Eq(&Var("chroma_format_idc"), &Const(3)),
        &[Field("separate_colour_plane_flag", U(1))],
    ),
    Field("pic_width_in_luma_samples", Ue),
    Field("pic_height_in_luma_samples", Ue),
    Field("conformance_window_flag", U(1)),
    If(
        Var("conformance_window_flag"),
        &[
            Field("conf_win_left_offset", Ue),
            Field("conf_win_right_offset", Ue),
            Field("conf_win_top_offset", Ue),
            Field("conf_win_bottom_offset", Ue),
        ],
    ),
    Field("bit_depth_luma_minus8", Ue),
    Field("bit_depth_chroma_minus8", Ue),
    Field("log2_max_pic_order_cnt_lsb_minus4", Ue),
    Field("sps_sub_layer_ordering_info_present_flag", U(1)),
    For(
        "i",
        Select(
            &Var("sps_sub_layer_ordering_info_present_flag"),
            &Const(0),
            &Var("sps_max_sub_layers_minus1"),
        ),
        Add(&Var("sps_max_sub_layers_minus1"), &Const(1)),
        &[
            Field("sps_max_dec_pic_buffering_minus1", Ue),
            Field("sps_max_num_reorder_pics", Ue),
            Field("sps_max_latency_increase_plus1", Ue),
        ],
    ),
    Field("log2_min_luma_coding_block_size_minus3", Ue),
    Field("log2_diff_max_min_luma_coding_block_size", Ue),
    Field("log2_min_luma_transform_block_size_minus2", Ue),
    Field("log2_diff_max_min_luma_transform_block_size", Ue),
    Field("max_transform_hierarchy_depth_inter", Ue),
    Field("max_transform_hierarchy_depth_intra", Ue),
    Field("scaling_list_enabled_flag", U(1)),
    If(
        Var("scaling_list_enabled_flag"),
        &[
            Field("sps_scaling_list_data_present_flag", U(1)),
            If(
                Var("sps_scaling_list_data_present_flag"),
                &[Composite("scaling_list_data", Structure::ScalingListData)],
            ),
        ],
    ),
    Field("amp_enabled_flag", U(1)),
    Field("sample_adaptive_offset_enabled_flag", U(1)),
    Field("pcm_enabled_flag", U(1)),
    If(
        Var("pcm_enabled_flag"),
        &[
            Field("pcm_sample_bit_depth_luma_minus1", U(4)),
            Field("pcm_sample_bit_depth_chroma_minus1", U(4)),
            Field("log2_min_pcm_luma_coding_block_size_minus3", Ue),
            Field("log2_diff_max_min_pcm_luma_coding_block_size", Ue),
            Field("pcm_loop_filter_disabled_flag", U(1)),
        ],
    ),
    Field("num_short_term_ref_pic_sets", Ue),
    For(
        "i",
        Const(0),
        Var("num_short_term_ref_pic_sets"),
        &[Composite(
            "st_ref_pic_set",
            Structure::StRefPicSet {
                idx: Var("i"),
                num: Var("num_short_term_ref_pic_sets"),
            },
        )],
    ),
    Field("long_term_ref_pics_present_flag", U(1)),
    If(
        Var("long_term_ref_pics_present_flag"),
        &[
            Field("num_long_term_ref_pics_sps", Ue),
            For(
                "i",
                Const(0),
                Var("num_long_term_ref_pics_sps"),
                &[
                    Field(
                        "lt_ref_pic_poc_lsb_sps",
                        Uv(Add(&Var("log2_max_pic_order_cnt_lsb_minus4"), &Const(4))),
                    ),
                    Field("used_by_curr_pic_lt_sps_flag", U(1)),
                ],
            ),
        ],
    ),
    Field("sps_temporal_mvp_enabled_flag", U(1)),
    Field("strong_intra_smoothing_enabled_flag", U(1)),
    Field("vui_parameters_present_flag", U(1)),
    If(Var("vui_parameters_present_flag"), &[Include(VUI_SYNTAX)]),
    Field("sps_extension_present_flag", U(1)),
    If(
        Var("sps_extension_present_flag"),
        &[
            Field("sps_range_extension_flag", U(1)),
            Field("sps_multilayer_extension_flag", U(1)),
            Field("sps_3d_extension_flag", U(1)),
            Field("sps_scc_extension_flag", U(1)),
            Field("sps_extension_4bits", U(4)),
            If(
                Var("sps_range_extension_flag"),
                &[Include(SPS_RANGE_EXTENSION_SYNTAX)],
            ),
            If(
                Or(
                    &Var("sps_multilayer_extension_flag"),
                    &Or(
                        &Var("sps_3d_extension_flag"),
                        &Or(&Var("sps_scc_extension_flag"), &Var("sps_extension_4bits")),
                    ),
                ),
                &[Opaque("sps_extension_data")],
            ),
        ],
    ),
    TrailingBits,
];
