//! # nalkit-codec
//!
//! H.265/HEVC Annex B 码流解析与参数集改写.
//!
//! - 按起始码切分 NAL 单元, 解码 2 字节 NAL 头
//! - 去除/插入防竞争字节
//! - 以声明式语法表解析 VPS / SPS / PPS / AUD, 每个语法元素带比特位置
//! - 原位改写定长字段, 保持负载长度不变, 按原始布局重组码流
//!
//! ## 使用示例
//!
//! ```rust
//! use nalkit_codec::parsers::h265::{FieldEdit, apply_edits, parse_stream, rebuild_stream};
//! use std::collections::BTreeMap;
//!
//! // 一个 AUD, pic_type = 2
//! let data = [0u8, 0, 0, 1, 0x46, 0x01, 0x50];
//! let reports = parse_stream(&data);
//! let unit = reports[0].result.as_ref().unwrap();
//!
//! let edits = [FieldEdit::new("pic_type", 1)];
//! let nal = apply_edits(&data, &unit.range, &unit.fields, &edits).unwrap();
//! let mut replacements = BTreeMap::new();
//! replacements.insert(0, nal);
//! let ranges: Vec<_> = reports.iter().map(|r| r.range).collect();
//! let out = rebuild_stream(&data, &ranges, &replacements).unwrap();
//! assert_eq!(out, [0, 0, 0, 1, 0x46, 0x01, 0x30]);
//! ```

pub mod parsers;
