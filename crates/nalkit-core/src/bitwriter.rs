//! 比特流写入器.
//!
//! 提供按位写入 (含 Exp-Golomb) 与原位覆写定长字段的能力, 与 BitReader 对应.
//!
//! 按大端位序写入 (MSB first).

use crate::{NalError, NalResult};

/// 比特流写入器
///
/// # 示例
/// ```
/// use nalkit_core::bitwriter::BitWriter;
///
/// let mut bw = BitWriter::new();
/// bw.write_bits(0b1011, 4);
/// bw.write_ue(0);
/// bw.write_rbsp_trailing_bits();
/// assert_eq!(bw.finish(), vec![0b1011_1100]);
/// ```
#[derive(Debug, Clone)]
pub struct BitWriter {
    /// 输出缓冲区
    data: Vec<u8>,
    /// 当前字节 (正在填充)
    current_byte: u8,
    /// 当前字节中已填充的位数 (0-7)
    bit_count: u8,
}

impl BitWriter {
    /// 创建新的比特流写入器
    pub fn new() -> Self {
        Self {
            data: Vec::new(),
            current_byte: 0,
            bit_count: 0,
        }
    }

    /// 获取已写入的总位数
    pub fn bits_written(&self) -> usize {
        self.data.len() * 8 + self.bit_count as usize
    }

    /// 写入 1 个位
    pub fn write_bit(&mut self, bit: u32) {
        self.current_byte = (self.current_byte << 1) | (bit & 1) as u8;
        self.bit_count += 1;
        if self.bit_count >= 8 {
            self.data.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// 写入 N 个位 (最多 32 位)
    ///
    /// 值的低 N 位被写入, 高位在前.
    pub fn write_bits(&mut self, value: u32, n: u32) {
        debug_assert!(n <= 32, "write_bits: n={} 超过 32 位", n);

        let mut remaining = n;
        while remaining > 0 {
            let available = 8 - self.bit_count as u32;
            let to_write = remaining.min(available);

            let shift = remaining - to_write;
            let mask = (1u32 << to_write) - 1;
            let bits = ((value >> shift) & mask) as u8;

            if to_write >= 8 {
                // 整字节写入 (bit_count 必定为 0)
                self.current_byte = bits;
            } else {
                self.current_byte = (self.current_byte << to_write) | bits;
            }
            self.bit_count += to_write as u8;

            if self.bit_count >= 8 {
                self.data.push(self.current_byte);
                self.current_byte = 0;
                self.bit_count = 0;
            }

            remaining -= to_write;
        }
    }

    /// 写入 ue(v)
    pub fn write_ue(&mut self, value: u32) {
        self.write_exp_golomb(u64::from(value));
    }

    /// 写入 se(v)
    pub fn write_se(&mut self, value: i32) {
        let value = i64::from(value);
        let code_num = if value > 0 { 2 * value - 1 } else { -2 * value };
        self.write_exp_golomb(code_num.unsigned_abs());
    }

    /// 前缀零、首位 1 与后缀分开写入; se(i32::MIN) 的 codeNum 为 2^32, 码字 33 位
    fn write_exp_golomb(&mut self, code_num: u64) {
        let code = code_num + 1;
        let suffix_len = 63 - code.leading_zeros();
        self.write_bits(0, suffix_len);
        self.write_bit(1);
        self.write_bits(code as u32, suffix_len);
    }

    /// 写入 rbsp_trailing_bits: 停止位 1, 再用 0 对齐
    pub fn write_rbsp_trailing_bits(&mut self) {
        self.write_bit(1);
        self.align_to_byte();
    }

    /// 对齐到字节边界 (用 0 填充)
    pub fn align_to_byte(&mut self) {
        if self.bit_count > 0 {
            let pad = 8 - self.bit_count;
            self.current_byte <<= pad;
            self.data.push(self.current_byte);
            self.current_byte = 0;
            self.bit_count = 0;
        }
    }

    /// 完成写入, 返回字节数据
    ///
    /// 如果当前不在字节边界, 自动用 0 填充.
    pub fn finish(mut self) -> Vec<u8> {
        self.align_to_byte();
        self.data
    }
}

impl Default for BitWriter {
    fn default() -> Self {
        Self::new()
    }
}

/// 在 `data` 的 `bit_offset` 处原位覆写 `n` 位
///
/// 先清零目标位再写入 `value` 的低 `n` 位, 其余位保持不变.
pub fn patch_bits(data: &mut [u8], bit_offset: usize, n: u32, value: u32) -> NalResult<()> {
    if n > 32 {
        return Err(NalError::InvalidArgument(format!(
            "patch_bits: n={n} 超过 32 位"
        )));
    }
    if n < 32 && value >> n != 0 {
        return Err(NalError::InvalidArgument(format!(
            "patch_bits: 值 {value} 超出 {n} 位"
        )));
    }
    let total = data.len() * 8;
    let needed = n as usize;
    if bit_offset + needed > total {
        return Err(NalError::OutOfData {
            needed,
            remaining: total.saturating_sub(bit_offset),
        });
    }

    for i in 0..needed {
        let bit = ((value >> (needed - 1 - i)) & 1) as u8;
        let pos = bit_offset + i;
        let shift = 7 - (pos % 8);
        let byte = &mut data[pos / 8];
        *byte = (*byte & !(1 << shift)) | (bit << shift);
    }
    Ok(())
}
