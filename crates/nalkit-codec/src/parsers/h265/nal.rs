//! H.265/HEVC NAL 单元头部编解码.
//!
//! HEVC NAL 头部为 2 字节:
//! - forbidden_zero_bit (1 bit)
//! - nal_unit_type (6 bits)
//! - nuh_layer_id (6 bits)
//! - nuh_temporal_id_plus1 (3 bits)

use std::fmt;

use nalkit_core::{NalError, NalResult};

/// HEVC NAL 单元类型 (ITU-T H.265 表 7-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[non_exhaustive]
pub enum HevcNalUnitType {
    /// TRAIL_N (非参考尾随图像)
    TrailN,
    /// TRAIL_R (参考尾随图像)
    TrailR,
    /// TSA_N
    TsaN,
    /// TSA_R
    TsaR,
    /// STSA_N
    StsaN,
    /// STSA_R
    StsaR,
    /// RADL_N
    RadlN,
    /// RADL_R
    RadlR,
    /// RASL_N
    RaslN,
    /// RASL_R
    RaslR,
    /// BLA_W_LP (Broken Link Access)
    BlaWLp,
    /// BLA_W_RADL
    BlaWRadl,
    /// BLA_N_LP
    BlaNLp,
    /// IDR_W_RADL (Instantaneous Decoding Refresh)
    IdrWRadl,
    /// IDR_N_LP
    IdrNLp,
    /// CRA_NUT (Clean Random Access)
    Cra,
    /// VPS (Video Parameter Set)
    Vps,
    /// SPS (Sequence Parameter Set)
    Sps,
    /// PPS (Picture Parameter Set)
    Pps,
    /// AUD (Access Unit Delimiter)
    Aud,
    /// EOS (End of Sequence)
    Eos,
    /// EOB (End of Bitstream)
    Eob,
    /// FD (Filler Data)
    FillerData,
    /// PREFIX_SEI
    PrefixSei,
    /// SUFFIX_SEI
    SuffixSei,
    /// 保留或未定义类型
    Unknown(u8),
}

impl HevcNalUnitType {
    /// 从类型编号创建
    pub fn from_type_id(id: u8) -> Self {
        match id {
            0 => Self::TrailN,
            1 => Self::TrailR,
            2 => Self::TsaN,
            3 => Self::TsaR,
            4 => Self::StsaN,
            5 => Self::StsaR,
            6 => Self::RadlN,
            7 => Self::RadlR,
            8 => Self::RaslN,
            9 => Self::RaslR,
            16 => Self::BlaWLp,
            17 => Self::BlaWRadl,
            18 => Self::BlaNLp,
            19 => Self::IdrWRadl,
            20 => Self::IdrNLp,
            21 => Self::Cra,
            32 => Self::Vps,
            33 => Self::Sps,
            34 => Self::Pps,
            35 => Self::Aud,
            36 => Self::Eos,
            37 => Self::Eob,
            38 => Self::FillerData,
            39 => Self::PrefixSei,
            40 => Self::SuffixSei,
            _ => Self::Unknown(id),
        }
    }

    /// 获取类型编号
    pub fn type_id(&self) -> u8 {
        match self {
            Self::TrailN => 0,
            Self::TrailR => 1,
            Self::TsaN => 2,
            Self::TsaR => 3,
            Self::StsaN => 4,
            Self::StsaR => 5,
            Self::RadlN => 6,
            Self::RadlR => 7,
            Self::RaslN => 8,
            Self::RaslR => 9,
            Self::BlaWLp => 16,
            Self::BlaWRadl => 17,
            Self::BlaNLp => 18,
            Self::IdrWRadl => 19,
            Self::IdrNLp => 20,
            Self::Cra => 21,
            Self::Vps => 32,
            Self::Sps => 33,
            Self::Pps => 34,
            Self::Aud => 35,
            Self::Eos => 36,
            Self::Eob => 37,
            Self::FillerData => 38,
            Self::PrefixSei => 39,
            Self::SuffixSei => 40,
            Self::Unknown(id) => *id,
        }
    }

    /// 显示名称 (VPS, SPS, IDR_W_RADL ...)
    pub fn name(&self) -> String {
        let name = match self {
            Self::TrailN => "TRAIL_N",
            Self::TrailR => "TRAIL_R",
            Self::TsaN => "TSA_N",
            Self::TsaR => "TSA_R",
            Self::StsaN => "STSA_N",
            Self::StsaR => "STSA_R",
            Self::RadlN => "RADL_N",
            Self::RadlR => "RADL_R",
            Self::RaslN => "RASL_N",
            Self::RaslR => "RASL_R",
            Self::BlaWLp => "BLA_W_LP",
            Self::BlaWRadl => "BLA_W_RADL",
            Self::BlaNLp => "BLA_N_LP",
            Self::IdrWRadl => "IDR_W_RADL",
            Self::IdrNLp => "IDR_N_LP",
            Self::Cra => "CRA_NUT",
            Self::Vps => "VPS",
            Self::Sps => "SPS",
            Self::Pps => "PPS",
            Self::Aud => "AUD",
            Self::Eos => "EOS",
            Self::Eob => "EOB",
            Self::FillerData => "FD",
            Self::PrefixSei => "PREFIX_SEI",
            Self::SuffixSei => "SUFFIX_SEI",
            Self::Unknown(id) => return format!("NAL Type {id}"),
        };
        name.to_string()
    }

    /// 是否为 VCL (Video Coding Layer) NAL
    pub fn is_vcl(&self) -> bool {
        self.type_id() < 32
    }

    /// 是否为 IRAP (Intra Random Access Point) NAL
    pub fn is_irap(&self) -> bool {
        matches!(self.type_id(), 16..=23)
    }

    /// 是否为参数集 (VPS/SPS/PPS)
    pub fn is_parameter_set(&self) -> bool {
        matches!(self, Self::Vps | Self::Sps | Self::Pps)
    }
}

impl fmt::Display for HevcNalUnitType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// NAL 头部的非致命异常
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderWarning {
    /// forbidden_zero_bit 不为 0
    ForbiddenBitSet,
    /// nuh_temporal_id_plus1 为 0
    TemporalIdPlus1Zero,
}

impl fmt::Display for HeaderWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ForbiddenBitSet => f.write_str("forbidden_zero_bit 不为 0"),
            Self::TemporalIdPlus1Zero => f.write_str("nuh_temporal_id_plus1 为 0"),
        }
    }
}

/// HEVC NAL 单元头部
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NalHeader {
    /// forbidden_zero_bit
    pub forbidden_zero_bit: u8,
    /// nal_unit_type (0..63)
    pub nal_unit_type: u8,
    /// nuh_layer_id (0..63)
    pub nuh_layer_id: u8,
    /// nuh_temporal_id_plus1 (1..7)
    pub nuh_temporal_id_plus1: u8,
}

impl NalHeader {
    /// 头部字节数
    pub const SIZE: usize = 2;

    /// 从 NAL 单元前 2 字节解码
    pub fn decode(data: &[u8]) -> NalResult<Self> {
        if data.len() < Self::SIZE {
            return Err(NalError::TruncatedPayload {
                field: "nal_unit_header".into(),
                bit_offset: data.len() * 8,
            });
        }
        Ok(Self {
            forbidden_zero_bit: data[0] >> 7,
            nal_unit_type: (data[0] & 0x7E) >> 1,
            nuh_layer_id: ((data[0] & 0x01) << 5) | (data[1] >> 3),
            nuh_temporal_id_plus1: data[1] & 0x07,
        })
    }

    /// 编码为 2 字节
    pub fn encode(&self) -> [u8; 2] {
        let byte0 = ((self.forbidden_zero_bit & 1) << 7)
            | ((self.nal_unit_type & 0x3F) << 1)
            | ((self.nuh_layer_id >> 5) & 0x01);
        let byte1 = ((self.nuh_layer_id & 0x1F) << 3) | (self.nuh_temporal_id_plus1 & 0x07);
        [byte0, byte1]
    }

    /// NAL 类型
    pub fn nal_type(&self) -> HevcNalUnitType {
        HevcNalUnitType::from_type_id(self.nal_unit_type)
    }

    /// 检查头部约束, 违反项仅作为警告返回
    pub fn warnings(&self) -> Vec<HeaderWarning> {
        let mut warnings = Vec::new();
        if self.forbidden_zero_bit != 0 {
            warnings.push(HeaderWarning::ForbiddenBitSet);
        }
        if self.nuh_temporal_id_plus1 == 0 {
            warnings.push(HeaderWarning::TemporalIdPlus1Zero);
        }
        warnings
    }
}
