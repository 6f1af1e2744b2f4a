//! Annex B 起始码扫描.
//!
//! 单次从左到右扫描, 记录连续零字节个数; 遇到前面至少有两个 0x00 的 0x01
//! 即为起始码. 起始码长度记为 3 或 4, 更多的前导零归为
//! leading_zero_8bits / trailing_zero_8bits, 不属于任何 NAL 单元.

use log::debug;

/// NAL 单元在原始码流中的位置 (均为字节下标)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NalUnitRange {
    /// 起始码第一个字节
    pub start_offset: usize,
    /// NAL 头部第一个字节
    pub header_offset: usize,
    /// 负载 (头部之后) 第一个字节
    pub payload_start: usize,
    /// 负载结束位置 (不含), 不包括尾随零字节
    pub payload_end: usize,
    /// 起始码长度 (3 或 4)
    pub start_code_len: u8,
}

impl NalUnitRange {
    /// NAL 单元字节数 (头部 + 负载, 不含起始码)
    pub fn nal_len(&self) -> usize {
        self.payload_end - self.header_offset
    }

    /// NAL 单元数据 (头部 + 负载)
    pub fn nal_bytes<'a>(&self, data: &'a [u8]) -> Option<&'a [u8]> {
        data.get(self.header_offset..self.payload_end)
    }
}

/// NAL 单元扫描器, 惰性产出 [`NalUnitRange`]
///
/// 扫描器只前进不回退; 重新扫描需创建新实例.
#[derive(Debug, Clone)]
pub struct NalUnitScanner<'a> {
    data: &'a [u8],
    pos: usize,
    zero_run: usize,
    /// 已打开但尚未闭合的单元 (start_offset, header_offset, start_code_len)
    pending: Option<(usize, usize, u8)>,
}

impl<'a> NalUnitScanner<'a> {
    /// 创建扫描器
    pub fn new(data: &'a [u8]) -> Self {
        Self {
            data,
            pos: 0,
            zero_run: 0,
            pending: None,
        }
    }

    fn close(opened: (usize, usize, u8), end: usize) -> Option<NalUnitRange> {
        let (start_offset, header_offset, start_code_len) = opened;
        if header_offset >= end {
            debug!("跳过空 NAL 单元: offset={start_offset}");
            return None;
        }
        Some(NalUnitRange {
            start_offset,
            header_offset,
            payload_start: (header_offset + 2).min(end),
            payload_end: end,
            start_code_len,
        })
    }
}

impl Iterator for NalUnitScanner<'_> {
    type Item = NalUnitRange;

    fn next(&mut self) -> Option<NalUnitRange> {
        while self.pos < self.data.len() {
            let byte = self.data[self.pos];
            self.pos += 1;

            if byte == 0x00 {
                self.zero_run += 1;
                continue;
            }
            if byte == 0x01 && self.zero_run >= 2 {
                let one_pos = self.pos - 1;
                let start_code_len = self.zero_run.min(3) + 1;
                let opened = (one_pos + 1 - start_code_len, self.pos, start_code_len as u8);
                let prev_end = one_pos - self.zero_run;
                self.zero_run = 0;

                if let Some(prev) = self.pending.replace(opened) {
                    if let Some(range) = Self::close(prev, prev_end) {
                        return Some(range);
                    }
                }
                continue;
            }
            self.zero_run = 0;
        }

        // 码流结束: 闭合最后一个单元, 去掉末尾零字节
        let prev = self.pending.take()?;
        let end = self.data.len() - self.zero_run;
        Self::close(prev, end)
    }
}

/// 扫描 Annex B 码流中的所有 NAL 单元
pub fn scan(data: &[u8]) -> NalUnitScanner<'_> {
    NalUnitScanner::new(data)
}
