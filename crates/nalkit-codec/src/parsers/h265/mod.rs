//! H.265/HEVC 码流解析器.
//!
//! 提供对 H.265 HEVC Annex B 码流的解析与改写能力:
//! - NAL 单元分割与类型识别 (2 字节 NAL 头)
//! - RBSP 防竞争字节处理
//! - VPS / SPS / PPS / AUD 语法元素解析 (含比特位置)
//! - 定长字段原位改写与码流重组
//! - SPS 摘要 (分辨率、位深、帧率、SAR)
//!
//! # HEVC NAL 头部 (2 字节)
//! ```text
//! ┌────────────────────────────────────────────┐
//! │ forbidden(1) | type(6) | layer_id(6) | tid(3) │
//! └────────────────────────────────────────────┘
//! ```

pub mod assembler;
pub mod field;
pub mod nal;
pub mod parser;
pub mod pps;
pub mod rbsp;
pub mod rewriter;
pub mod scanner;
pub mod sps;
pub mod stream;
pub mod summary;
pub mod syntax;
pub mod vps;
pub mod vui;

pub use field::{DecodedField, FieldEdit, FieldKind, FieldValue, field_value};
pub use nal::{HeaderWarning, HevcNalUnitType, NalHeader};
pub use scanner::{NalUnitRange, NalUnitScanner};
pub use stream::{
    HEADER_FIELDS, NalUnitReport, ParsedNalUnit, apply_edits, parse_nal_unit, parse_stream,
    rebuild_stream, scan_nal_units,
};
pub use summary::{FrameRate, HevcSpsInfo};
