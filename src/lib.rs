//! # nalkit
//!
//! 纯 Rust 实现的 HEVC Annex B 参数集解析与原位改写工具.
//!
//! - **扫描**: 按起始码切分 NAL 单元, 记录每个单元在码流中的位置
//! - **解析**: VPS / SPS / PPS / AUD 的全部语法元素及其比特位置
//! - **改写**: 定长字段原位修改, 保证输出码流与输入等长
//!
//! # 快速开始
//!
//! ```rust
//! use nalkit::codec::parsers::h265::{field_value, parse_stream};
//!
//! let data = [0u8, 0, 0, 1, 0x46, 0x01, 0x50];
//! let reports = parse_stream(&data);
//! let unit = reports[0].result.as_ref().unwrap();
//! println!("{}: pic_type = {:?}", unit.header.nal_type(), field_value(&unit.fields, "pic_type"));
//! ```
//!
//! # Crate 结构
//!
//! | Crate | 功能 |
//! |-------|------|
//! | `nalkit-core` | 比特流读写与错误类型 |
//! | `nalkit-codec` | HEVC NAL 扫描、语法解析、改写与重组 |

/// 比特流读写与错误类型
pub use nalkit_core as core;

/// HEVC 码流解析与改写
pub use nalkit_codec as codec;

/// 获取 nalkit 版本号
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
