//! H.265 PPS (Picture Parameter Set) 语法表.
//!
//! pic_parameter_set_rbsp(), ITU-T H.265 7.3.2.3.

use super::syntax::Descriptor::{Se, U, Ue};
use super::syntax::Expr::{Add, Const, Not, Or, Var};
use super::syntax::Structure;
use super::syntax::Syntax::{self, Composite, Field, For, If, Include, Opaque, TrailingBits};

/// pps_range_extension()
static PPS_RANGE_EXTENSION_SYNTAX: &[Syntax] = &[
    If(
        Var("transform_skip_enabled_flag"),
        &[Field("log2_max_transform_skip_block_size_minus2", Ue)],
    ),
    Field("cross_component_prediction_enabled_flag", U(1)),
    Field("chroma_qp_offset_list_enabled_flag", U(1)),
    If(
        Var("chroma_qp_offset_list_enabled_flag"),
        &[
            Field("diff_cu_chroma_qp_offset_depth", Ue),
            Field("chroma_qp_offset_list_len_minus1", Ue),
            For(
                "i",
                Const(0),
                Add(&Var("chroma_qp_offset_list_len_minus1"), &Const(1)),
                &[Field("cb_qp_offset_list", Se), Field("cr_qp_offset_list", Se)],
            ),
        ],
    ),
    Field("log2_sao_offset_scale_luma", Ue),
    Field("log2_sao_offset_scale_chroma", Ue),
];

/// pic_parameter_set_rbsp()
pub static PPS_SYNTAX: &[Syntax] = &[
    Field("pps_pic_parameter_set_id", Ue),
    Field("pps_seq_parameter_set_id", Ue),
    Field("dependent_slice_segments_enabled_flag", U(1)),
    Field("output_flag_present_flag", U(1)),
    Field("num_extra_slice_header_bits", U(3)),
    Field("sign_data_hiding_enabled_flag", U(1)),
    Field("cabac_init_present_flag", U(1)),
    Field("num_ref_idx_l0_default_active_minus1", Ue),
    Field("num_ref_idx_l1_default_active_minus1", Ue),
    Field("init_qp_minus26", Se),
    Field("constrained_intra_pred_flag", U(1)),
    Field("transform_skip_enabled_flag", U(1)),
    Field("cu_qp_delta_enabled_flag", U(1)),
    If(
        Var("cu_qp_delta_enabled_flag"),
        &[Field("diff_cu_qp_delta_depth", Ue)],
    ),
    Field("pps_cb_qp_offset", Se),
    Field("pps_cr_qp_offset", Se),
    Field("pps_slice_chroma_qp_offsets_present_flag", U(1)),
    Field("weighted_pred_flag", U(1)),
    Field("weighted_bipred_flag", U(1)),
    Field("transquant_bypass_enabled_flag", U(1)),
    Field("tiles_enabled_flag", U(1)),
    Field("entropy_coding_sync_enabled_flag", U(1)),
    If(
        Var("tiles_enabled_flag"),
        &[
            Field("num_tile_columns_minus1", Ue),
            Field("num_tile_rows_minus1", Ue),
            Field("uniform_spacing_flag", U(1)),
            If(
                Not(&Var("uniform_spacing_flag")),
                &[
                    For(
                        "i",
                        Const(0),
                        Var("num_tile_columns_minus1"),
                        &[Field("column_width_minus1", Ue)],
                    ),
                    For(
                        "i",
                        Const(0),
                        Var("num_tile_rows_minus1"),
                        &[Field("row_height_minus1", Ue)],
                    ),
                ],
            ),
            Field("loop_filter_across_tiles_enabled_flag", U(1)),
        ],
    ),
    Field("pps_loop_filter_across_slices_enabled_flag", U(1)),
    Field("deblocking_filter_control_present_flag", U(1)),
    If(
        Var("deblocking_filter_control_present_flag"),
        &[
            Field("deblocking_filter_override_enabled_flag", U(1)),
            Field("pps_deblocking_filter_disabled_flag", U(1)),
            If(
                Not(&Var("pps_deblocking_filter_disabled_flag")),
                &[
                    Field("pps_beta_offset_div2", Se),
                    Field("pps_tc_offset_div2", Se),
                ],
            ),
        ],
    ),
    Field("pps_scaling_list_data_present_flag", U(1)),
    If(
        Var("pps_scaling_list_data_present_flag"),
        &[Composite("scaling_list_data", Structure::ScalingListData)],
    ),
    Field("lists_modification_present_flag", U(1)),
    Field("log2_parallel_merge_level_minus2", Ue),
    Field("slice_segment_header_extension_present_flag", U(1)),
    Field("pps_extension_present_flag", U(1)),
    If(
        Var("pps_extension_present_flag"),
        &[
            Field("pps_range_extension_flag", U(1)),
            Field("pps_multilayer_extension_flag", U(1)),
            Field("pps_3d_extension_flag", U(1)),
            Field("pps_scc_extension_flag", U(1)),
            Field("pps_extension_4bits", U(4)),
            If(
                Var("pps_range_extension_flag"),
                &[Include(PPS_RANGE_EXTENSION_SYNTAX)],
            ),
            If(
                Or(
                    &Var("pps_multilayer_extension_flag"),
                    &Or(
                        &Var("pps_3d_extension_flag"),
                        &Or(&Var("pps_scc_extension_flag"), &Var("pps_extension_4bits")),
                    ),
                ),
                &[Opaque("pps_extension_data")],
            ),
        ],
    ),
    TrailingBits,
];
