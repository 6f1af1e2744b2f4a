//! 语法表解释器.
//!
//! 按 [`Syntax`] 表逐项读取 RBSP, 记录每个元素的值、编码方式、位偏移与位长.
//! 条件与循环次数在已解码元素上求值:
//! - 循环内的元素名带下标 (`cpb_cnt_minus1[0]`, `nal_cbr_flag[0][1]`)
//! - 查找变量时先匹配循环变量, 再从最完整的下标逐级去掉末尾下标,
//!   最后退回到该元素最近一次解码的值
//! - 循环次数超过剩余位数时直接报告截断, 损坏码流不会导致巨量循环

use std::collections::HashMap;
use std::fmt::Write as _;

use log::{debug, warn};
use nalkit_core::{BitReader, NalError, NalResult};

use super::field::{DecodedField, FieldKind, FieldValue};
use super::syntax::{self, Descriptor, Expr, Structure, Syntax};

/// 未解析数据的字段值
pub const OPAQUE_VALUE: &str = "未解析";

/// 不支持的 NAL 类型整体作为一个未解析字段
pub const UNPARSED_PAYLOAD: &str = "unparsed_payload";

/// 解析 RBSP, 返回按码流顺序排列的字段列表
///
/// `rbsp` 为 NAL 头部之后、已移除防竞争字节的数据.
/// 没有语法表的类型返回 [`NalError::UnsupportedNalType`].
pub fn parse(nal_type: u8, rbsp: &[u8]) -> NalResult<Vec<DecodedField>> {
    let table = syntax::syntax_table(nal_type).ok_or(NalError::UnsupportedNalType(nal_type))?;
    let mut parser = Parser::new(rbsp);
    parser.walk(table)?;
    debug!(
        "NAL 类型 {nal_type}: 解析 {} 个字段, 共 {} 位",
        parser.fields.len(),
        parser.br.bits_read()
    );
    Ok(parser.fields)
}

/// 整个 RBSP 的未解析标记
pub fn opaque_payload(rbsp: &[u8]) -> DecodedField {
    DecodedField {
        name: UNPARSED_PAYLOAD.into(),
        value: FieldValue::Text(OPAQUE_VALUE.into()),
        kind: FieldKind::Opaque,
        bit_offset: 0,
        bit_length: rbsp.len() * 8,
    }
}

fn truncated(err: NalError, field: &str, bit_offset: usize) -> NalError {
    match err {
        NalError::OutOfData { .. } => NalError::TruncatedPayload {
            field: field.to_string(),
            bit_offset,
        },
        other => other,
    }
}

/// 表中第一个字段名, 用于报告循环截断
fn first_field_name(table: &[Syntax]) -> Option<&'static str> {
    table.iter().find_map(|item| match *item {
        Syntax::Field(name, _) | Syntax::Composite(name, _) | Syntax::Opaque(name) => Some(name),
        Syntax::If(_, body) | Syntax::For(_, _, _, body) | Syntax::Include(body) => {
            first_field_name(body)
        }
        Syntax::IfElse(_, a, b) => first_field_name(a).or_else(|| first_field_name(b)),
        Syntax::Let(..) | Syntax::TrailingBits => None,
    })
}

/// 求值上下文
#[derive(Debug, Default)]
struct Context {
    /// 带下标的完整名称 -> 值
    values: HashMap<String, i64>,
    /// 元素名 -> 最近一次的值
    latest: HashMap<&'static str, i64>,
    /// 当前循环变量, 外层在前
    loops: Vec<(&'static str, i64)>,
}

impl Context {
    fn qualify_with(name: &str, loops: &[(&'static str, i64)]) -> String {
        let mut qualified = name.to_string();
        for (_, v) in loops {
            let _ = write!(qualified, "[{v}]");
        }
        qualified
    }

    fn qualify(&self, name: &str) -> String {
        Self::qualify_with(name, &self.loops)
    }

    fn set(&mut self, name: &'static str, qualified: String, value: i64) {
        self.values.insert(qualified, value);
        self.latest.insert(name, value);
    }

    fn get(&self, name: &'static str) -> NalResult<i64> {
        if let Some(&(_, v)) = self.loops.iter().rev().find(|(var, _)| *var == name) {
            return Ok(v);
        }
        for depth in (0..=self.loops.len()).rev() {
            let key = Self::qualify_with(name, &self.loops[..depth]);
            if let Some(&v) = self.values.get(&key) {
                return Ok(v);
            }
        }
        self.latest
            .get(name)
            .copied()
            .ok_or_else(|| NalError::InvalidArgument(format!("语法表引用了未定义的元素 {name}")))
    }

    fn eval(&self, expr: &Expr) -> NalResult<i64> {
        let value = match *expr {
            Expr::Const(v) => v,
            Expr::Var(name) => self.get(name)?,
            Expr::Add(a, b) => self.eval(a)?.saturating_add(self.eval(b)?),
            Expr::Sub(a, b) => self.eval(a)?.saturating_sub(self.eval(b)?),
            Expr::Eq(a, b) => i64::from(self.eval(a)? == self.eval(b)?),
            Expr::Gt(a, b) => i64::from(self.eval(a)? > self.eval(b)?),
            Expr::Not(a) => i64::from(self.eval(a)? == 0),
            Expr::And(a, b) => i64::from(self.eval(a)? != 0 && self.eval(b)? != 0),
            Expr::Or(a, b) => i64::from(self.eval(a)? != 0 || self.eval(b)? != 0),
            Expr::Select(cond, a, b) => {
                if self.eval(cond)? != 0 {
                    self.eval(a)?
                } else {
                    self.eval(b)?
                }
            }
        };
        Ok(value)
    }
}

/// 一个短期参考图像集的 DeltaPoc 列表, 供后续集合做 inter RPS 预测
#[derive(Debug, Clone, Default)]
struct ShortTermRps {
    delta_poc_s0: Vec<i64>,
    delta_poc_s1: Vec<i64>,
}

impl ShortTermRps {
    fn num_delta_pocs(&self) -> usize {
        self.delta_poc_s0.len() + self.delta_poc_s1.len()
    }
}

struct Parser<'a> {
    br: BitReader<'a>,
    ctx: Context,
    rps: Vec<ShortTermRps>,
    fields: Vec<DecodedField>,
}

impl<'a> Parser<'a> {
    fn new(rbsp: &'a [u8]) -> Self {
        Self {
            br: BitReader::new(rbsp),
            ctx: Context::default(),
            rps: Vec::new(),
            fields: Vec::new(),
        }
    }

    fn walk(&mut self, table: &'static [Syntax]) -> NalResult<()> {
        for item in table {
            match *item {
                Syntax::Field(name, desc) => self.read_field(name, desc)?,
                Syntax::If(cond, body) => {
                    if self.ctx.eval(&cond)? != 0 {
                        self.walk(body)?;
                    }
                }
                Syntax::IfElse(cond, then_body, else_body) => {
                    if self.ctx.eval(&cond)? != 0 {
                        self.walk(then_body)?;
                    } else {
                        self.walk(else_body)?;
                    }
                }
                Syntax::For(var, from, to, body) => self.walk_loop(var, from, to, body)?,
                Syntax::Let(name, expr) => {
                    let value = self.ctx.eval(&expr)?;
                    let qualified = self.ctx.qualify(name);
                    self.ctx.set(name, qualified, value);
                }
                Syntax::Include(body) => self.walk(body)?,
                Syntax::Composite(name, structure) => self.read_composite(name, structure)?,
                Syntax::Opaque(name) => self.read_opaque(name)?,
                Syntax::TrailingBits => self.check_trailing_bits(),
            }
        }
        Ok(())
    }

    fn walk_loop(
        &mut self,
        var: &'static str,
        from: Expr,
        to: Expr,
        body: &'static [Syntax],
    ) -> NalResult<()> {
        let from = self.ctx.eval(&from)?;
        let to = self.ctx.eval(&to)?;
        let count = usize::try_from(to.saturating_sub(from)).unwrap_or(0);
        // 每次迭代至少读 1 位
        if count > self.br.remaining_bits() {
            let name = first_field_name(body).unwrap_or(var);
            return Err(NalError::TruncatedPayload {
                field: self.ctx.qualify(name),
                bit_offset: self.br.bits_read(),
            });
        }

        for v in from..to {
            self.ctx.loops.push((var, v));
            let result = self.walk(body);
            self.ctx.loops.pop();
            result?;
        }
        Ok(())
    }

    fn read_field(&mut self, name: &'static str, desc: Descriptor) -> NalResult<()> {
        let qualified = self.ctx.qualify(name);
        let bit_offset = self.br.bits_read();

        let (value, kind) = match desc {
            Descriptor::U(n) => {
                let v = self.br.read_bits(n).map_err(|e| truncated(e, &qualified, bit_offset))?;
                (i64::from(v), FieldKind::FixedUnsigned(n))
            }
            Descriptor::Uv(width) => {
                let n = self.ctx.eval(&width)?;
                let n = u32::try_from(n)
                    .ok()
                    .filter(|&n| n <= 32)
                    .ok_or_else(|| NalError::InvalidData(format!("{qualified} 的位宽 {n} 无效")))?;
                let v = self.br.read_bits(n).map_err(|e| truncated(e, &qualified, bit_offset))?;
                (i64::from(v), FieldKind::FixedUnsigned(n))
            }
            Descriptor::Ue => {
                let v = self.br.read_ue().map_err(|e| truncated(e, &qualified, bit_offset))?;
                (i64::from(v), FieldKind::ExpGolombUnsigned)
            }
            Descriptor::Se => {
                let v = self.br.read_se().map_err(|e| truncated(e, &qualified, bit_offset))?;
                (i64::from(v), FieldKind::ExpGolombSigned)
            }
            Descriptor::F(width, pattern) => {
                let v = self
                    .br
                    .read_bits(width)
                    .map_err(|e| truncated(e, &qualified, bit_offset))?;
                if v != pattern {
                    warn!("{qualified} = {v:#x}, 与固定模式 {pattern:#x} 不符");
                }
                (i64::from(v), FieldKind::FixedPattern { width, pattern })
            }
        };

        let bit_length = self.br.bits_read() - bit_offset;
        self.ctx.set(name, qualified.clone(), value);
        self.fields.push(DecodedField {
            name: qualified,
            value: FieldValue::Int(value),
            kind,
            bit_offset,
            bit_length,
        });
        Ok(())
    }

    fn read_composite(&mut self, name: &'static str, structure: Structure) -> NalResult<()> {
        let qualified = self.ctx.qualify(name);
        let bit_offset = self.br.bits_read();

        let summary = match structure {
            Structure::ProfileTierLevel {
                max_sub_layers_minus1,
            } => {
                let max_sub_layers_minus1 = self.ctx.eval(&max_sub_layers_minus1)?;
                self.walk_profile_tier_level(max_sub_layers_minus1)
            }
            Structure::ScalingListData => self.walk_scaling_list_data(),
            Structure::StRefPicSet { idx, num } => {
                let idx = self.ctx.eval(&idx)?;
                let num = self.ctx.eval(&num)?;
                self.walk_st_ref_pic_set(&qualified, idx, num)
            }
        }
        .map_err(|e| truncated(e, &qualified, bit_offset))?;

        self.fields.push(DecodedField {
            name: qualified,
            value: FieldValue::Text(summary),
            kind: FieldKind::Composite,
            bit_offset,
            bit_length: self.br.bits_read() - bit_offset,
        });
        Ok(())
    }

    fn read_opaque(&mut self, name: &'static str) -> NalResult<()> {
        let qualified = self.ctx.qualify(name);
        let bit_offset = self.br.bits_read();
        let end = self
            .br
            .rbsp_stop_bit_position()
            .filter(|&stop| stop >= bit_offset)
            .unwrap_or(bit_offset);
        self.br.skip_bits(end - bit_offset)?;

        self.fields.push(DecodedField {
            name: qualified,
            value: FieldValue::Text(OPAQUE_VALUE.into()),
            kind: FieldKind::Opaque,
            bit_offset,
            bit_length: end - bit_offset,
        });
        Ok(())
    }

    fn check_trailing_bits(&self) {
        let pos = self.br.bits_read();
        match self.br.rbsp_stop_bit_position() {
            Some(stop) if stop == pos => {}
            Some(stop) => {
                warn!("rbsp_trailing_bits 位置异常: 语法结束于位 {pos}, rbsp_stop_one_bit 位于 {stop}")
            }
            None => warn!("缺少 rbsp_stop_one_bit: 语法结束于位 {pos}"),
        }
    }

    /// profile_tier_level(1, maxNumSubLayersMinus1)
    ///
    /// 通用部分 88 位 + general_level_idc 8 位; 有子层时再加 16 位
    /// present 标志与保留位, 以及每个子层可选的 88 位 profile 和 8 位 level.
    fn walk_profile_tier_level(&mut self, max_sub_layers_minus1: i64) -> NalResult<String> {
        let max_sub = usize::try_from(max_sub_layers_minus1)
            .ok()
            .filter(|&m| m <= 7)
            .ok_or_else(|| {
                NalError::InvalidData(format!("maxNumSubLayersMinus1 = {max_sub_layers_minus1} 无效"))
            })?;

        let br = &mut self.br;
        let profile_space = br.read_bits(2)?;
        let tier_flag = br.read_bits(1)?;
        let profile_idc = br.read_bits(5)?;
        // compatibility_flag[32], progressive/interlaced/non_packed/frame_only,
        // 43 位约束标志与保留位, general_inbld_flag
        br.skip_bits(32 + 4 + 43 + 1)?;
        let level_idc = br.read_bits(8)?;

        let mut present = [(false, false); 7];
        if max_sub > 0 {
            for flags in present.iter_mut().take(max_sub) {
                flags.0 = br.read_bit()? != 0;
                flags.1 = br.read_bit()? != 0;
            }
            // reserved_zero_2bits
            br.skip_bits(2 * (8 - max_sub))?;
        }
        for &(profile_present, level_present) in &present[..max_sub] {
            if profile_present {
                br.skip_bits(88)?;
            }
            if level_present {
                br.skip_bits(8)?;
            }
        }

        Ok(format!(
            "general_profile_space={profile_space} general_tier_flag={tier_flag} \
             general_profile_idc={profile_idc} general_level_idc={level_idc} sub_layers={}",
            max_sub + 1
        ))
    }

    /// scaling_list_data()
    fn walk_scaling_list_data(&mut self) -> NalResult<String> {
        let br = &mut self.br;
        let mut explicit = 0;
        let mut predicted = 0;
        for size_id in 0..4usize {
            let step = if size_id == 3 { 3 } else { 1 };
            for _matrix_id in (0..6).step_by(step) {
                // scaling_list_pred_mode_flag
                if br.read_bit()? == 0 {
                    br.read_ue()?; // scaling_list_pred_matrix_id_delta
                    predicted += 1;
                    continue;
                }
                let coef_num = 64.min(1usize << (4 + (size_id << 1)));
                if size_id > 1 {
                    br.read_se()?; // scaling_list_dc_coef_minus8
                }
                for _ in 0..coef_num {
                    br.read_se()?; // scaling_list_delta_coef
                }
                explicit += 1;
            }
        }
        Ok(format!("explicit_matrices={explicit} predicted_matrices={predicted}"))
    }

    /// st_ref_pic_set(stRpsIdx)
    ///
    /// inter RPS 预测的元素个数取决于被引用集合的 NumDeltaPocs,
    /// 因此每个集合解析后都按 (7-61) (7-62) 推导并保存 DeltaPoc 列表.
    fn walk_st_ref_pic_set(&mut self, name: &str, idx: i64, num: i64) -> NalResult<String> {
        let inter = idx != 0 && self.br.read_bit()? != 0;
        let rps = if inter {
            let delta_idx_minus1 = if idx == num {
                i64::from(self.br.read_ue()?)
            } else {
                0
            };
            let ref_idx = usize::try_from(idx - (delta_idx_minus1 + 1))
                .ok()
                .filter(|&r| r < self.rps.len())
                .ok_or_else(|| NalError::InvalidData(format!("{name} 引用了不存在的参考图像集")))?;
            let delta_rps_sign = self.br.read_bit()?;
            let abs_delta_rps_minus1 = i64::from(self.br.read_ue()?);
            let delta_rps = (1 - 2 * i64::from(delta_rps_sign)) * (abs_delta_rps_minus1 + 1);

            let reference = &self.rps[ref_idx];
            let count = reference.num_delta_pocs() + 1;
            let mut use_delta = Vec::with_capacity(count);
            for _ in 0..count {
                // used_by_curr_pic_flag 为 1 时 use_delta_flag 推断为 1
                let used_by_curr_pic_flag = self.br.read_bit()? != 0;
                use_delta.push(used_by_curr_pic_flag || self.br.read_bit()? != 0);
            }
            predict_rps(reference, delta_rps, &use_delta)
        } else {
            let num_negative = self.br.read_ue()? as usize;
            let num_positive = self.br.read_ue()? as usize;
            // 每个条目至少 2 位
            if num_negative.saturating_add(num_positive) > self.br.remaining_bits() / 2 {
                return Err(NalError::TruncatedPayload {
                    field: name.to_string(),
                    bit_offset: self.br.bits_read(),
                });
            }
            let mut rps = ShortTermRps::default();
            let mut poc = 0i64;
            for _ in 0..num_negative {
                poc -= i64::from(self.br.read_ue()?) + 1;
                self.br.read_bit()?; // used_by_curr_pic_s0_flag
                rps.delta_poc_s0.push(poc);
            }
            poc = 0;
            for _ in 0..num_positive {
                poc += i64::from(self.br.read_ue()?) + 1;
                self.br.read_bit()?; // used_by_curr_pic_s1_flag
                rps.delta_poc_s1.push(poc);
            }
            rps
        };

        let summary = format!(
            "inter_ref_pic_set_prediction_flag={} num_negative_pics={} num_positive_pics={}",
            u8::from(inter),
            rps.delta_poc_s0.len(),
            rps.delta_poc_s1.len()
        );
        self.rps.push(rps);
        Ok(summary)
    }
}

/// 由参考集合与 deltaRps 推导当前集合 (7-61, 7-62)
fn predict_rps(reference: &ShortTermRps, delta_rps: i64, use_delta: &[bool]) -> ShortTermRps {
    let num_negative = reference.delta_poc_s0.len();
    let num_delta_pocs = reference.num_delta_pocs();
    let mut rps = ShortTermRps::default();

    for (j, &poc) in reference.delta_poc_s1.iter().enumerate().rev() {
        let d = poc + delta_rps;
        if d < 0 && use_delta[num_negative + j] {
            rps.delta_poc_s0.push(d);
        }
    }
    if delta_rps < 0 && use_delta[num_delta_pocs] {
        rps.delta_poc_s0.push(delta_rps);
    }
    for (j, &poc) in reference.delta_poc_s0.iter().enumerate() {
        let d = poc + delta_rps;
        if d < 0 && use_delta[j] {
            rps.delta_poc_s0.push(d);
        }
    }

    for (j, &poc) in reference.delta_poc_s0.iter().enumerate().rev() {
        let d = poc + delta_rps;
        if d > 0 && use_delta[j] {
            rps.delta_poc_s1.push(d);
        }
    }
    if delta_rps > 0 && use_delta[num_delta_pocs] {
        rps.delta_poc_s1.push(delta_rps);
    }
    for (j, &poc) in reference.delta_poc_s1.iter().enumerate() {
        let d = poc + delta_rps;
        if d > 0 && use_delta[num_negative + j] {
            rps.delta_poc_s1.push(d);
        }
    }
    rps
}

#[cfg(test)]
mod tests {
    use super::*;
    use nalkit_core::BitWriter;

    fn aud(pic_type: u32) -> Vec<u8> {
        let mut bw = BitWriter::new();
        bw.write_bits(pic_type, 3);
        bw.write_rbsp_trailing_bits();
        bw.finish()
    }

    #[test]
    fn test_parse_aud() {
        let fields = parse(35, &aud(2)).unwrap();
        assert_eq!(
            fields,
            vec![DecodedField {
                name: "pic_type".into(),
                value: FieldValue::Int(2),
                kind: FieldKind::FixedUnsigned(3),
                bit_offset: 0,
                bit_length: 3,
            }]
        );
    }

    #[test]
    fn test_parse_空负载与不支持类型() {
        assert!(parse(36, &[]).unwrap().is_empty());
        assert!(parse(37, &[]).unwrap().is_empty());
        assert_eq!(parse(1, &[0xAF]), Err(NalError::UnsupportedNalType(1)));
        assert_eq!(parse(39, &[]), Err(NalError::UnsupportedNalType(39)));

        let marker = opaque_payload(&[1, 2, 3]);
        assert_eq!(marker.name, UNPARSED_PAYLOAD);
        assert_eq!(marker.bit_length, 24);
        assert_eq!(marker.kind, FieldKind::Opaque);
    }

    #[test]
    fn test_parse_截断负载() {
        assert_eq!(
            parse(35, &[]),
            Err(NalError::TruncatedPayload {
                field: "pic_type".into(),
                bit_offset: 0,
            })
        );
    }

    #[test]
    fn test_循环次数超过剩余位数() {
        // 损坏的计数值不应触发巨量循环
        static TABLE: &[Syntax] = &[
            Syntax::Field("n", Descriptor::Ue),
            Syntax::For(
                "i",
                Expr::Const(0),
                Expr::Var("n"),
                &[Syntax::Field("x", Descriptor::U(1))],
            ),
        ];
        let mut bw = BitWriter::new();
        bw.write_ue(1000);
        bw.write_bits(0, 5);
        let rbsp = bw.finish();
        let mut parser = Parser::new(&rbsp);
        assert_eq!(
            parser.walk(TABLE),
            Err(NalError::TruncatedPayload {
                field: "x".into(),
                bit_offset: 19,
            })
        );
    }

    #[test]
    fn test_名称解析() {
        static TABLE: &[Syntax] = &[
            Syntax::Field("flag", Descriptor::U(1)),
            Syntax::For(
                "i",
                Expr::Const(0),
                Expr::Const(2),
                &[
                    Syntax::Field("a", Descriptor::U(2)),
                    Syntax::For(
                        "j",
                        Expr::Const(0),
                        Expr::Var("a"),
                        &[Syntax::If(Expr::Var("flag"), &[Syntax::Field("b", Descriptor::U(1))])],
                    ),
                ],
            ),
            Syntax::Field("c", Descriptor::Uv(Expr::Add(&Expr::Var("a"), &Expr::Const(1)))),
        ];
        let mut bw = BitWriter::new();
        bw.write_bits(1, 1); // flag
        bw.write_bits(2, 2); // a[0]
        bw.write_bits(0b10, 2); // b[0][0], b[0][1]
        bw.write_bits(1, 2); // a[1]
        bw.write_bits(1, 1); // b[1][0]
        bw.write_bits(0b11, 2); // c: 最近一次 a = 1, 位宽 2
        bw.write_rbsp_trailing_bits();
        let rbsp = bw.finish();

        let mut parser = Parser::new(&rbsp);
        parser.walk(TABLE).unwrap();
        let names: Vec<_> = parser.fields.iter().map(|f| f.name.as_str()).collect();
        assert_eq!(
            names,
            ["flag", "a[0]", "b[0][0]", "b[0][1]", "a[1]", "b[1][0]", "c"]
        );
        assert_eq!(parser.fields[3].as_int(), Some(0));
        assert_eq!(parser.fields[6].as_int(), Some(3));
        assert_eq!(parser.fields[6].kind, FieldKind::FixedUnsigned(2));
    }

    #[test]
    fn test_固定模式不符只告警() {
        static TABLE: &[Syntax] = &[Syntax::Field("marker", Descriptor::F(4, 0xF))];
        let rbsp = [0b1010_1000];
        let mut parser = Parser::new(&rbsp);
        parser.walk(TABLE).unwrap();
        assert_eq!(parser.fields[0].as_int(), Some(0b1010));
        assert_eq!(
            parser.fields[0].kind,
            FieldKind::FixedPattern {
                width: 4,
                pattern: 0xF
            }
        );
    }

    #[test]
    fn test_scaling_list_data() {
        // 全部矩阵使用预测模式: 20 个 (flag=0, ue(0)) = 40 位
        let mut bw = BitWriter::new();
        for _ in 0..20 {
            bw.write_bits(0, 1);
            bw.write_ue(0);
        }
        bw.write_rbsp_trailing_bits();
        let rbsp = bw.finish();
        let mut parser = Parser::new(&rbsp);
        let summary = parser.walk_scaling_list_data().unwrap();
        assert_eq!(summary, "explicit_matrices=0 predicted_matrices=20");
        assert_eq!(parser.br.bits_read(), 40);

        // 第一个 4x4 矩阵显式给出 16 个系数 se(0)
        let mut bw = BitWriter::new();
        bw.write_bits(1, 1);
        for _ in 0..16 {
            bw.write_se(0);
        }
        for _ in 0..19 {
            bw.write_bits(0, 1);
            bw.write_ue(0);
        }
        bw.write_rbsp_trailing_bits();
        let rbsp = bw.finish();
        let mut parser = Parser::new(&rbsp);
        let summary = parser.walk_scaling_list_data().unwrap();
        assert_eq!(summary, "explicit_matrices=1 predicted_matrices=19");
        assert_eq!(parser.br.bits_read(), 1 + 16 + 38);
    }

    #[test]
    fn test_st_ref_pic_set_inter_预测() {
        // 集合 0: 两个负向图像 -1, -3; 集合 1: 以集合 0 预测, deltaRps = -1
        let mut bw = BitWriter::new();
        bw.write_ue(2);
        bw.write_ue(0);
        bw.write_ue(0);
        bw.write_bits(1, 1);
        bw.write_ue(1);
        bw.write_bits(1, 1);

        bw.write_bits(1, 1); // inter_ref_pic_set_prediction_flag
        bw.write_bits(1, 1); // delta_rps_sign
        bw.write_ue(0); // abs_delta_rps_minus1
        // NumDeltaPocs[0] + 1 = 3 组标志, 全部 used_by_curr_pic_flag = 1
        bw.write_bits(0b111, 3);

        // 集合 2: 以集合 1 (-1, -2, -4) 预测, deltaRps = +1, 只启用第一个
        bw.write_bits(1, 1);
        bw.write_bits(0, 1); // delta_rps_sign: 正
        bw.write_ue(0);
        bw.write_bits(1, 1); // [0] used
        bw.write_bits(0b00, 2); // [1] 不用
        bw.write_bits(0b00, 2); // [2]
        bw.write_bits(0b00, 2); // [3]
        bw.write_rbsp_trailing_bits();
        let rbsp = bw.finish();

        let mut parser = Parser::new(&rbsp);
        for idx in 0..3 {
            parser.walk_st_ref_pic_set("st_ref_pic_set", idx, 3).unwrap();
        }
        assert_eq!(parser.rps[0].delta_poc_s0, vec![-1, -3]);
        // 7-61: 参考 S0 各加 deltaRps, 再加上 deltaRps 本身
        assert_eq!(parser.rps[1].delta_poc_s0, vec![-1, -2, -4]);
        assert!(parser.rps[1].delta_poc_s1.is_empty());
        // use_delta_flag 只有 [0] 为 1: -1 + 1 = 0 不属于任何列表
        assert!(parser.rps[2].delta_poc_s0.is_empty());
        assert!(parser.rps[2].delta_poc_s1.is_empty());
        assert_eq!(parser.br.rbsp_stop_bit_position(), Some(parser.br.bits_read()));
    }
}
