//! H.265 VPS (Video Parameter Set) 语法表.
//!
//! video_parameter_set_rbsp(), ITU-T H.265 7.3.2.1.

use super::syntax::Descriptor::{U, Ue};
use super::syntax::Expr::{Add, Const, Gt, Select, Var};
use super::syntax::Structure;
use super::syntax::Syntax::{
    self, Composite, Field, For, If, IfElse, Include, Let, Opaque, TrailingBits,
};
use super::vui::HRD_SYNTAX;

/// video_parameter_set_rbsp()
pub static VPS_SYNTAX: &[Syntax] = &[
    Field("vps_video_parameter_set_id", U(4)),
    // 早期版本合称 vps_reserved_three_2bits
    Field("vps_base_layer_internal_flag", U(1)),
    Field("vps_base_layer_available_flag", U(1)),
    Field("vps_max_layers_minus1", U(6)),
    Field("vps_max_sub_layers_minus1", U(3)),
    Field("vps_temporal_id_nesting_flag", U(1)),
    Field("vps_reserved_0xffff_16bits", U(16)),
    Composite(
        "profile_tier_level",
        Structure::ProfileTierLevel {
            max_sub_layers_minus1: Var("vps_max_sub_layers_minus1"),
        },
    ),
    Field("vps_sub_layer_ordering_info_present_flag", U(1)),
    For(
        "i",
        Select(
            &Var("vps_sub_layer_ordering_info_present_flag"),
            &Const(0),
            &Var("vps_max_sub_layers_minus1"),
        ),
        Add(&Var("vps_max_sub_layers_minus1"), &Const(1)),
        &[
            Field("vps_max_dec_pic_buffering_minus1", Ue),
            Field("vps_max_num_reorder_pics", Ue),
            Field("vps_max_latency_increase_plus1", Ue),
        ],
    ),
    Field("vps_max_layer_id", U(6)),
    Field("vps_num_layer_sets_minus1", Ue),
    For(
        "i",
        Const(1),
        Add(&Var("vps_num_layer_sets_minus1"), &Const(1)),
        &[For(
            "j",
            Const(0),
            Add(&Var("vps_max_layer_id"), &Const(1)),
            &[Field("layer_id_included_flag", U(1))],
        )],
    ),
    Field("vps_timing_info_present_flag", U(1)),
    If(
        Var("vps_timing_info_present_flag"),
        &[
            Field("vps_num_units_in_tick", U(32)),
            Field("vps_time_scale", U(32)),
            Field("vps_poc_proportional_to_timing_flag", U(1)),
            If(
                Var("vps_poc_proportional_to_timing_flag"),
                &[Field("vps_num_ticks_poc_diff_one_minus1", Ue)],
            ),
            Field("vps_num_hrd_parameters", Ue),
            For(
                "hrd_idx",
                Const(0),
                Var("vps_num_hrd_parameters"),
                &[
                    Field("hrd_layer_set_idx", Ue),
                    IfElse(
                        Gt(&Var("hrd_idx"), &Const(0)),
                        &[Field("cprms_present_flag", U(1))],
                        &[Let("cprms_present_flag", Const(1))],
                    ),
                    Let("common_inf_present_flag", Var("cprms_present_flag")),
                    Let("max_num_sub_layers_minus1", Var("vps_max_sub_layers_minus1")),
                    Include(HRD_SYNTAX),
                ],
            ),
        ],
    ),
    Field("vps_extension_flag", U(1)),
    If(Var("vps_extension_flag"), &[Opaque("vps_extension_data")]),
    TrailingBits,
];
