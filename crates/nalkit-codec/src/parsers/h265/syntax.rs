//! 声明式语法表.
//!
//! 每种参数集的 RBSP 语法用一组 [`Syntax`] 静态表描述, 由 [`super::parser`]
//! 统一解释执行. 表中只出现 H.265 规范的元素名与描述符, 条件与循环次数用
//! [`Expr`] 表示, 在已解码字段上下文中求值.
//!
//! 无法用表描述的结构 (profile_tier_level, scaling_list_data,
//! st_ref_pic_set) 作为 [`Structure`] 由解析器内置代码遍历.

use super::nal::HevcNalUnitType;
use super::{pps, sps, vps};

/// 整数表达式
///
/// 比较与逻辑运算结果为 0 / 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Expr {
    /// 常量
    Const(i64),
    /// 已解码元素或循环变量
    Var(&'static str),
    Add(&'static Expr, &'static Expr),
    Sub(&'static Expr, &'static Expr),
    Eq(&'static Expr, &'static Expr),
    Gt(&'static Expr, &'static Expr),
    Not(&'static Expr),
    And(&'static Expr, &'static Expr),
    Or(&'static Expr, &'static Expr),
    /// 条件选择: cond ? a : b
    Select(&'static Expr, &'static Expr, &'static Expr),
}

/// 字段描述符
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Descriptor {
    /// u(n)
    U(u32),
    /// u(v), 位宽由表达式给出
    Uv(Expr),
    /// ue(v)
    Ue,
    /// se(v)
    Se,
    /// f(n), 固定比特模式
    F(u32, u32),
}

/// 由解析器内置代码遍历的复合结构
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Structure {
    /// profile_tier_level(1, max_sub_layers_minus1)
    ProfileTierLevel { max_sub_layers_minus1: Expr },
    /// scaling_list_data()
    ScalingListData,
    /// st_ref_pic_set(idx), num 为 num_short_term_ref_pic_sets
    StRefPicSet { idx: Expr, num: Expr },
}

/// 语法表条目
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Syntax {
    /// 读取一个字段
    Field(&'static str, Descriptor),
    /// 条件为真时执行
    If(Expr, &'static [Syntax]),
    IfElse(Expr, &'static [Syntax], &'static [Syntax]),
    /// for (var = from; var < to; var++)
    For(&'static str, Expr, Expr, &'static [Syntax]),
    /// 推断值 (元素不出现时的默认值或派生变量), 不产生字段
    Let(&'static str, Expr),
    /// 嵌入子表 (hrd_parameters 等)
    Include(&'static [Syntax]),
    /// 复合结构
    Composite(&'static str, Structure),
    /// 从当前位置到 rbsp_stop_one_bit 之前的未解析数据
    Opaque(&'static str),
    /// rbsp_trailing_bits()
    TrailingBits,
}

/// access_unit_delimiter_rbsp()
pub static AUD_SYNTAX: &[Syntax] = &[
    Syntax::Field("pic_type", Descriptor::U(3)),
    Syntax::TrailingBits,
];

/// end_of_seq_rbsp() / end_of_bitstream_rbsp(), 负载为空
pub static EMPTY_SYNTAX: &[Syntax] = &[];

/// 查找 NAL 类型对应的语法表
///
/// 只有 VPS / SPS / PPS / AUD / EOS / EOB 有语法表, 其余类型返回 `None`.
pub fn syntax_table(nal_type: u8) -> Option<&'static [Syntax]> {
    match HevcNalUnitType::from_type_id(nal_type) {
        HevcNalUnitType::Vps => Some(vps::VPS_SYNTAX),
        HevcNalUnitType::Sps => Some(sps::SPS_SYNTAX),
        HevcNalUnitType::Pps => Some(pps::PPS_SYNTAX),
        HevcNalUnitType::Aud => Some(AUD_SYNTAX),
        HevcNalUnitType::Eos | HevcNalUnitType::Eob => Some(EMPTY_SYNTAX),
        _ => None,
    }
}
