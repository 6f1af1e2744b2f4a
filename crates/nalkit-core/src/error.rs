//! 统一错误类型定义.
//!
//! 解析、改写与重组共用同一错误类型, 以便跨模块用 `?` 传播.

use thiserror::Error;

/// nalkit 统一错误类型
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum NalError {
    /// 比特流读取器在字段结束前耗尽
    #[error("数据不足: 需要 {needed} 位, 剩余 {remaining} 位")]
    OutOfData { needed: usize, remaining: usize },

    /// Exp-Golomb 前导零过长 (损坏数据或非 HEVC 码流)
    #[error("Exp-Golomb 码字异常: 前导零 {leading_zeros} 个")]
    MalformedCode { leading_zeros: u32 },

    /// NAL 负载比语法表要求的短
    #[error("负载被截断: 字段 {field} (位偏移 {bit_offset})")]
    TruncatedPayload { field: String, bit_offset: usize },

    /// 该 NAL 类型没有语法表
    #[error("不支持的 NAL 类型: {0}")]
    UnsupportedNalType(u8),

    /// 新值超出字段位宽
    #[error("字段 {field} 的值 {value} 超出 {bit_length} 位范围")]
    ValueOutOfRange {
        field: String,
        value: i64,
        bit_length: u32,
    },

    /// 字段无法原位改写
    #[error("字段 {field} 不支持原位改写: {reason}")]
    UnsupportedRewrite { field: String, reason: String },

    /// 字段列表与 RBSP 不一致
    #[error("字段列表与 RBSP 不匹配: {0}")]
    StructuralMismatch(String),

    /// 未找到要改写的字段
    #[error("未找到字段: {0}")]
    FieldNotFound(String),

    /// 重新插入防竞争字节后 NAL 长度发生变化
    #[error("防竞争字节重新插入后 NAL 长度由 {expected} 变为 {actual}")]
    EscapedLengthChanged { expected: usize, actual: usize },

    /// 替换数据与原 NAL 单元长度不一致
    #[error("NAL 单元 #{index} 的替换数据长度 {actual} 与原长度 {expected} 不一致")]
    ReplacementLengthMismatch {
        index: usize,
        expected: usize,
        actual: usize,
    },

    /// 无效数据 (损坏的码流等)
    #[error("无效数据: {0}")]
    InvalidData(String),

    /// 无效参数
    #[error("无效参数: {0}")]
    InvalidArgument(String),
}

/// nalkit 统一 Result 类型
pub type NalResult<T> = Result<T, NalError>;
