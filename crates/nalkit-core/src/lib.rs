//! # nalkit-core
//!
//! nalkit 核心库, 提供比特流读写与统一错误处理.
//!
//! - [`bitreader::BitReader`]: u(n) / ue(v) / se(v) 读取, more_rbsp_data 判断
//! - [`bitwriter::BitWriter`]: 位写入与 Exp-Golomb 编码
//! - [`bitwriter::patch_bits`]: 原位覆写定长字段

pub mod bitreader;
pub mod bitwriter;
pub mod error;

// 重导出常用类型
pub use bitreader::BitReader;
pub use bitwriter::BitWriter;
pub use error::{NalError, NalResult};
