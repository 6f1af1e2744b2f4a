//! 比特流读取器.
//!
//! 在 RBSP 上按位读取定长字段与 Exp-Golomb 字段, 是参数集解析器的基础设施.
//!
//! 按大端位序读取 (MSB first). 读取失败时游标保持不变.

use crate::{NalError, NalResult};

/// ue(v) 允许的最大前导零个数, 超过即视为损坏码流
const MAX_EXP_GOLOMB_LEADING_ZEROS: u32 = 31;

/// 比特流读取器
///
/// # 示例
/// ```
/// use nalkit_core::bitreader::BitReader;
///
/// let data = [0b1011_0001, 0b0101_0101];
/// let mut br = BitReader::new(&data);
/// assert_eq!(br.read_bits(4).unwrap(), 0b1011);
/// // 0001 010 => 2^3 - 1 + 2
/// assert_eq!(br.read_ue().unwrap(), 9);
/// assert_eq!(br.bit_position(), (1, 3));
/// assert_eq!(br.bits_read(), 11);
/// ```
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    /// 源数据
    data: &'a [u8],
    /// 当前字节索引
    byte_pos: usize,
    /// 当前字节中的位位置 (0-7, 0 表示最高位)
    bit_pos: u8,
}

impl<'a> BitReader<'a> {
    /// 创建新的比特流读取器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            byte_pos: 0,
            bit_pos: 0,
        }
    }

    /// 获取已读取的总位数
    pub fn bits_read(&self) -> usize {
        self.byte_pos * 8 + self.bit_pos as usize
    }

    /// 当前游标 (字节索引, 字节内位索引)
    pub fn bit_position(&self) -> (usize, u8) {
        (self.byte_pos, self.bit_pos)
    }

    /// 获取剩余可读位数
    pub fn remaining_bits(&self) -> usize {
        (self.data.len() * 8).saturating_sub(self.bits_read())
    }

    /// 是否已到达末尾
    pub fn is_eof(&self) -> bool {
        self.remaining_bits() == 0
    }

    fn ensure(&self, needed: usize) -> NalResult<()> {
        let remaining = self.remaining_bits();
        if needed > remaining {
            return Err(NalError::OutOfData { needed, remaining });
        }
        Ok(())
    }

    /// 读取 1 个位
    pub fn read_bit(&mut self) -> NalResult<u32> {
        self.ensure(1)?;

        let bit = (self.data[self.byte_pos] >> (7 - self.bit_pos)) & 1;
        self.bit_pos += 1;
        if self.bit_pos >= 8 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }

        Ok(u32::from(bit))
    }

    /// 读取 N 个位 (最多 32 位), 对应语法描述符 u(n)
    pub fn read_bits(&mut self, n: u32) -> NalResult<u32> {
        if n == 0 {
            return Ok(0);
        }
        if n > 32 {
            return Err(NalError::InvalidArgument(format!(
                "read_bits: n={n} 超过 32 位"
            )));
        }
        self.ensure(n as usize)?;

        let mut result: u32 = 0;
        let mut remaining = n;

        while remaining > 0 {
            let available = 8 - self.bit_pos as u32;
            let to_read = remaining.min(available);

            let shift = available - to_read;
            let mask = ((1u32 << to_read) - 1) as u8;
            let bits = (self.data[self.byte_pos] >> shift) & mask;

            result = (result << to_read) | u32::from(bits);

            self.bit_pos += to_read as u8;
            if self.bit_pos >= 8 {
                self.bit_pos = 0;
                self.byte_pos += 1;
            }
            remaining -= to_read;
        }

        Ok(result)
    }

    /// 读取 N 个位 (最多 64 位)
    pub fn read_bits_u64(&mut self, n: u32) -> NalResult<u64> {
        if n <= 32 {
            return self.read_bits(n).map(u64::from);
        }
        if n > 64 {
            return Err(NalError::InvalidArgument(format!(
                "read_bits_u64: n={n} 超过 64 位"
            )));
        }
        self.ensure(n as usize)?;

        let high = u64::from(self.read_bits(n - 32)?);
        let low = u64::from(self.read_bits(32)?);
        Ok((high << 32) | low)
    }

    /// Exp-Golomb 无符号解码, 对应 ue(v)
    ///
    /// 前导零个数 k, 后缀 s: 值为 `(1 << k) - 1 + s`.
    pub fn read_ue(&mut self) -> NalResult<u32> {
        let saved = (self.byte_pos, self.bit_pos);
        let result = self.read_ue_inner();
        if result.is_err() {
            (self.byte_pos, self.bit_pos) = saved;
        }
        result
    }

    fn read_ue_inner(&mut self) -> NalResult<u32> {
        let mut leading_zeros = 0u32;
        while self.read_bit()? == 0 {
            leading_zeros += 1;
            if leading_zeros > MAX_EXP_GOLOMB_LEADING_ZEROS {
                return Err(NalError::MalformedCode { leading_zeros });
            }
        }
        if leading_zeros == 0 {
            return Ok(0);
        }
        let suffix = self.read_bits(leading_zeros)?;
        Ok((1u32 << leading_zeros) - 1 + suffix)
    }

    /// Exp-Golomb 有符号解码, 对应 se(v)
    ///
    /// 映射: 0→0, 1→1, 2→-1, 3→2, 4→-2 ...
    pub fn read_se(&mut self) -> NalResult<i32> {
        let code = i64::from(self.read_ue()?);
        let magnitude = (code + 1) / 2;
        let value = if code % 2 == 0 { -magnitude } else { magnitude };
        Ok(value as i32)
    }

    /// 窥视 N 个位 (不移动位置)
    pub fn peek_bits(&self, n: u32) -> NalResult<u32> {
        self.clone().read_bits(n)
    }

    /// 跳过 N 个位
    pub fn skip_bits(&mut self, n: usize) -> NalResult<()> {
        self.ensure(n)?;

        let total_bits = self.bit_pos as usize + n;
        self.byte_pos += total_bits / 8;
        self.bit_pos = (total_bits % 8) as u8;

        Ok(())
    }

    /// 对齐到下一个字节边界
    ///
    /// 如果当前已在字节边界, 则不做任何事.
    pub fn byte_align(&mut self) {
        if self.bit_pos > 0 {
            self.bit_pos = 0;
            self.byte_pos += 1;
        }
    }

    /// 是否已在字节边界
    pub fn is_byte_aligned(&self) -> bool {
        self.bit_pos == 0
    }

    /// 当前位置之后是否仍有 RBSP 数据 (more_rbsp_data)
    ///
    /// 最后一个值为 1 的位是 rbsp_stop_one_bit, 其后只允许对齐零位.
    pub fn has_more_rbsp_data(&self) -> bool {
        match self.rbsp_stop_bit_position() {
            Some(stop) => self.bits_read() < stop,
            None => false,
        }
    }

    /// rbsp_stop_one_bit 的位偏移 (整个缓冲区中最后一个 1)
    pub fn rbsp_stop_bit_position(&self) -> Option<usize> {
        let last = self.data.iter().rposition(|&b| b != 0)?;
        let trailing = self.data[last].trailing_zeros() as usize;
        Some(last * 8 + 7 - trailing)
    }

    /// 获取底层数据的引用
    pub fn data(&self) -> &'a [u8] {
        self.data
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 把 "0101..." 形式的位串打包为字节 (末尾补零)
    fn pack(bits: &str) -> Vec<u8> {
        let bits: Vec<u8> = bits.bytes().filter(|b| *b != b' ').collect();
        bits.chunks(8)
            .map(|chunk| {
                chunk.iter().enumerate().fold(0u8, |byte, (i, &c)| {
                    if c == b'1' { byte | (1 << (7 - i)) } else { byte }
                })
            })
            .collect()
    }

    #[test]
    fn test_read_bits_basic() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        assert_eq!(br.read_bits(1).unwrap(), 1);
        assert_eq!(br.read_bits(1).unwrap(), 0);
        assert_eq!(br.read_bits(2).unwrap(), 0b11);
        assert_eq!(br.read_bits(4).unwrap(), 0b0001);
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);

        assert!(br.is_eof());
    }

    #[test]
    fn test_read_bits_32_bit() {
        let data = [0xFF, 0x00, 0xFF, 0x00];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits(32).unwrap(), 0xFF00FF00);
    }

    #[test]
    fn test_read_bits_跨字节非对齐() {
        let data = [0x0F, 0xFF, 0xFF, 0xFF, 0xF0];
        let mut br = BitReader::new(&data);
        br.skip_bits(4).unwrap();
        assert_eq!(br.read_bits(32).unwrap(), 0xFFFF_FFFF);
        assert_eq!(br.bit_position(), (4, 4));
    }

    #[test]
    fn test_out_of_data_游标不动() {
        let data = [0xAB];
        let mut br = BitReader::new(&data);
        br.read_bits(3).unwrap();
        let err = br.read_bits(6).unwrap_err();
        assert_eq!(
            err,
            NalError::OutOfData {
                needed: 6,
                remaining: 5
            }
        );
        assert_eq!(br.bits_read(), 3);
        assert_eq!(br.read_bits(5).unwrap(), 0b01011);
    }

    #[test]
    fn test_read_ue_标准码字() {
        // 1, 010, 011, 00100, 00101, 00110, 00111
        let data = pack("1 010 011 00100 00101 00110 00111");
        let mut br = BitReader::new(&data);
        for expected in 0..=6 {
            assert_eq!(br.read_ue().unwrap(), expected);
        }
        assert_eq!(br.bits_read(), 1 + 3 + 3 + 5 + 5 + 5 + 5);
    }

    #[test]
    fn test_read_se_映射() {
        let data = pack("1 010 011 00100 00101 00110 00111");
        let mut br = BitReader::new(&data);
        let values: Vec<i32> = (0..7).map(|_| br.read_se().unwrap()).collect();
        assert_eq!(values, vec![0, 1, -1, 2, -2, 3, -3]);
    }

    #[test]
    fn test_read_ue_最大值() {
        // 31 个前导零 + 1 + 31 个 1 => 2^32 - 2
        let bits = format!("{}1{}", "0".repeat(31), "1".repeat(31));
        let data = pack(&bits);
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_ue().unwrap(), u32::MAX - 1);
    }

    #[test]
    fn test_read_ue_前导零过长() {
        let data = [0u8; 8];
        let mut br = BitReader::new(&data);
        assert_eq!(
            br.read_ue().unwrap_err(),
            NalError::MalformedCode { leading_zeros: 32 }
        );
        assert_eq!(br.bits_read(), 0);
    }

    #[test]
    fn test_read_ue_码字越界() {
        // 前缀 0001 后缀只剩 1 位
        let data = [0b0000_0001];
        let mut br = BitReader::new(&data);
        br.skip_bits(4).unwrap();
        assert!(matches!(br.read_ue(), Err(NalError::OutOfData { .. })));
        assert_eq!(br.bits_read(), 4);
    }

    #[test]
    fn test_peek_bits() {
        let data = [0b10110001];
        let mut br = BitReader::new(&data);

        assert_eq!(br.peek_bits(4).unwrap(), 0b1011);
        assert_eq!(br.peek_bits(4).unwrap(), 0b1011);
        assert_eq!(br.read_bits(4).unwrap(), 0b1011);
        assert_eq!(br.peek_bits(4).unwrap(), 0b0001);
    }

    #[test]
    fn test_byte_align() {
        let data = [0b10110001, 0b01010101];
        let mut br = BitReader::new(&data);

        br.read_bits(3).unwrap();
        assert!(!br.is_byte_aligned());
        br.byte_align();
        assert_eq!(br.bit_position(), (1, 0));
        br.byte_align();
        assert_eq!(br.read_bits(8).unwrap(), 0b01010101);
    }

    #[test]
    fn test_remaining_bits() {
        let data = [0x00, 0x00];
        let mut br = BitReader::new(&data);

        assert_eq!(br.remaining_bits(), 16);
        br.read_bits(5).unwrap();
        assert_eq!(br.remaining_bits(), 11);
        br.read_bits(11).unwrap();
        assert_eq!(br.remaining_bits(), 0);
        assert!(br.is_eof());
    }

    #[test]
    fn test_read_bits_u64() {
        let data = [0xFF, 0x00, 0xFF, 0x00, 0xAA, 0xBB, 0xCC, 0xDD];
        let mut br = BitReader::new(&data);
        assert_eq!(br.read_bits_u64(64).unwrap(), 0xFF00FF00AABBCCDD);
    }

    #[test]
    fn test_more_rbsp_data() {
        // 数据 101, 停止位在位 5, 之后对齐零
        let data = [0b1010_0100];
        let mut br = BitReader::new(&data);
        assert_eq!(br.rbsp_stop_bit_position(), Some(5));
        br.read_bits(3).unwrap();
        assert!(br.has_more_rbsp_data());
        br.read_bits(2).unwrap();
        assert!(!br.has_more_rbsp_data());

        // 停止位后有整字节零 (cabac_zero_word 之类)
        let data = [0x80, 0x00];
        let br = BitReader::new(&data);
        assert!(!br.has_more_rbsp_data());

        let br = BitReader::new(&[0u8, 0]);
        assert_eq!(br.rbsp_stop_bit_position(), None);
        assert!(!br.has_more_rbsp_data());
    }
}
